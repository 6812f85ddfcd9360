//! Cycle detection over finish-to-start predecessor links.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::task::Task;

/// Would making `candidate_id` a predecessor of `successor_id` close a cycle?
///
/// Walks depth-first from the candidate through each visited task's own
/// predecessors and answers `true` as soon as the walk reaches the successor.
/// The visited set keeps the walk finite on lists that are already cyclic.
/// A task listed as its own predecessor is always a cycle.
pub fn has_cycle(successor_id: &str, candidate_id: &str, all: &[Task]) -> bool {
    let index: HashMap<&str, &Task> = all.iter().map(|t| (t.id.as_str(), t)).collect();
    let mut visited: HashSet<&str> = HashSet::new();
    let mut stack = vec![candidate_id];

    while let Some(id) = stack.pop() {
        if id == successor_id {
            debug!(successor = successor_id, candidate = candidate_id, "dependency cycle found");
            return true;
        }
        if !visited.insert(id) {
            continue;
        }
        if let Some(&task) = index.get(id) {
            stack.extend(task.predecessor_ids().filter(|p| !visited.contains(p)));
        }
    }
    false
}
