//! Finding the tasks that depend on a given set of tasks.

use std::collections::HashSet;

use crate::task::Task;

/// A task that lists at least one of the target ids as a predecessor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependent {
    pub task: Task,
    /// The target ids this task references, in predecessor order.
    pub matched_predecessor_ids: Vec<String>,
}

/// Every task whose predecessor list intersects `target_ids`, in list order.
pub fn find_dependents(target_ids: &[&str], all: &[Task]) -> Vec<Dependent> {
    let targets: HashSet<&str> = target_ids.iter().copied().collect();
    all.iter()
        .filter_map(|task| {
            let matched: Vec<String> = task
                .predecessor_ids()
                .filter(|id| targets.contains(id))
                .map(str::to_string)
                .collect();
            (!matched.is_empty()).then(|| Dependent {
                task: task.clone(),
                matched_predecessor_ids: matched,
            })
        })
        .collect()
}
