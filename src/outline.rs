//! Structural edits on the flat, depth-first task list.
//!
//! Every operation returns a fresh, renumbered list. Edits that would break the
//! outline are clamped at their bounds rather than rejected.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::task::{position, Task};
use crate::wbs::renumber;

/// Indent a task one level, making it a child of the row above.
///
/// The level never exceeds the previous row's level plus one. The first row
/// cannot be indented. Unknown ids leave the list as is.
pub fn promote(task_id: &str, tasks: &[Task]) -> Vec<Task> {
    let mut out = tasks.to_vec();
    match position(&out, task_id) {
        Some(0) => debug!(task = task_id, "first row cannot be indented"),
        Some(i) => {
            let ceiling = out[i - 1].outline_level + 1;
            let level = (out[i].outline_level + 1).min(ceiling);
            out[i].outline_level = level;
        }
        None => warn!(task = task_id, "promote: task not found"),
    }
    renumber(&out)
}

/// Outdent a task one level, stopping at the root.
pub fn demote(task_id: &str, tasks: &[Task]) -> Vec<Task> {
    let mut out = tasks.to_vec();
    match position(&out, task_id) {
        Some(i) => out[i].outline_level = out[i].outline_level.saturating_sub(1),
        None => warn!(task = task_id, "demote: task not found"),
    }
    renumber(&out)
}

/// Splice `new_task` in right after `after_id`, at that task's outline level.
///
/// Without a reference task, or when the reference is not in the list, the new
/// task is appended at the end at level 0.
pub fn insert_after(new_task: Task, after_id: Option<&str>, tasks: &[Task]) -> Vec<Task> {
    let mut out = tasks.to_vec();
    let mut new_task = new_task;

    let anchor = after_id.and_then(|id| {
        let found = position(&out, id);
        if found.is_none() {
            warn!(task = id, "insert: reference task not found; appending");
        }
        found
    });

    match anchor {
        Some(i) => {
            new_task.outline_level = out[i].outline_level;
            out.insert(i + 1, new_task);
        }
        None => {
            new_task.outline_level = 0;
            out.push(new_task);
        }
    }
    renumber(&out)
}

/// Drop the given ids from the list.
///
/// Predecessor links that pointed at removed tasks are left in place; see
/// [`crate::dependents::find_dependents`] for finding them first.
pub fn remove(task_ids: &[&str], tasks: &[Task]) -> Vec<Task> {
    let doomed: HashSet<&str> = task_ids.iter().copied().collect();
    let kept: Vec<Task> = tasks
        .iter()
        .filter(|t| !doomed.contains(t.id.as_str()))
        .cloned()
        .collect();
    debug!(removed = tasks.len() - kept.len(), "removed tasks");
    renumber(&kept)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn schedule(levels: &[usize]) -> Vec<Task> {
        let tasks: Vec<Task> = levels
            .iter()
            .enumerate()
            .map(|(i, &l)| Task::new(format!("T{}", i + 1), format!("Task {}", i + 1), start()).with_level(l))
            .collect();
        renumber(&tasks)
    }

    fn levels(tasks: &[Task]) -> Vec<usize> {
        tasks.iter().map(|t| t.outline_level).collect()
    }

    fn codes(tasks: &[Task]) -> Vec<String> {
        tasks.iter().map(|t| t.wbs.clone()).collect()
    }

    #[test]
    fn test_promote_has_a_ceiling() {
        let mut tasks = schedule(&[0, 0]);
        for _ in 0..5 {
            tasks = promote("T2", &tasks);
        }
        assert_eq!(levels(&tasks), vec![0, 1]);
        assert_eq!(codes(&tasks), vec!["1", "1.1"]);
    }

    #[test]
    fn test_promote_first_row_is_noop() {
        let tasks = schedule(&[0, 1]);
        let out = promote("T1", &tasks);
        assert_eq!(out, tasks);
    }

    #[test]
    fn test_demote_floors_at_root() {
        let tasks = schedule(&[0, 1, 1]);
        let out = demote("T3", &tasks);
        assert_eq!(levels(&out), vec![0, 1, 0]);
        assert_eq!(codes(&out), vec!["1", "1.1", "2"]);

        let out = demote("T1", &out);
        assert_eq!(levels(&out), vec![0, 1, 0]);
    }

    #[test]
    fn test_demote_parent_clamps_orphaned_grandchild() {
        let tasks = schedule(&[0, 1, 2]);
        let out = demote("T2", &tasks);
        assert_eq!(levels(&out), vec![0, 0, 1]);
        assert_eq!(codes(&out), vec!["1", "2", "2.1"]);
    }

    #[test]
    fn test_insert_after_inherits_level() {
        let tasks = schedule(&[0, 1, 1]);
        let new = Task::new("N", "New", start()).with_level(3);
        let out = insert_after(new, Some("T2"), &tasks);
        let ids: Vec<&str> = out.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T1", "T2", "N", "T3"]);
        assert_eq!(codes(&out), vec!["1", "1.1", "1.2", "1.3"]);
    }

    #[test]
    fn test_insert_without_reference_appends_at_root() {
        let tasks = schedule(&[0, 1]);
        let new = Task::new("N", "New", start()).with_level(2);
        let out = insert_after(new.clone(), None, &tasks);
        assert_eq!(out.last().map(|t| t.wbs.as_str()), Some("2"));

        let out = insert_after(new, Some("missing"), &tasks);
        assert_eq!(out.last().map(|t| (t.id.as_str(), t.outline_level)), Some(("N", 0)));
    }

    #[test]
    fn test_remove_renumbers_survivors() {
        let tasks = schedule(&[0, 1, 0, 1]);
        let out = remove(&["T1", "T2"], &tasks);
        let ids: Vec<&str> = out.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["T3", "T4"]);
        assert_eq!(codes(&out), vec!["1", "1.1"]);
        // caller's list untouched
        assert_eq!(tasks.len(), 4);
        assert_eq!(tasks[2].wbs, "2");
    }

    #[test]
    fn test_remove_leaves_dangling_links() {
        let mut tasks = schedule(&[0, 0]);
        tasks[1] = tasks[1].clone().with_predecessor("T1");
        let out = remove(&["T1"], &tasks);
        assert!(out[0].depends_on("T1"));
        assert_eq!(out[0].predecessors[0].display_serial, None);
    }
}
