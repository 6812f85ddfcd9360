//! Field edits that keep a task's dates consistent with its predecessors.
//!
//! Each edit returns a fresh task: the field is applied, the end date is
//! recomputed and the start is pushed forward if a predecessor requires it.
//! Walking the fan-out to successors is up to the caller.

use chrono::NaiveDate;
use tracing::debug;

use crate::dates::{compute_end_date, propagate};
use crate::task::{Predecessor, Task};

/// Change the duration in days, keeping the current start date where allowed.
pub fn on_duration_change(task: &Task, new_duration: u32, all: &[Task]) -> Task {
    debug!(task = %task.id, from = task.duration, to = new_duration, "duration change");
    let mut edited = task.clone();
    edited.duration = new_duration;
    edited.end_date = compute_end_date(edited.start_date, new_duration);
    propagate(&edited, all)
}

/// Move the start date. A start earlier than the predecessors allow is corrected upward.
pub fn on_start_date_change(task: &Task, new_start: NaiveDate, all: &[Task]) -> Task {
    debug!(task = %task.id, from = %task.start_date, to = %new_start, "start date change");
    let mut edited = task.clone();
    edited.start_date = new_start;
    edited.end_date = compute_end_date(new_start, edited.duration);
    propagate(&edited, all)
}

/// Replace the predecessor list. Cycle checks must already have been done.
pub fn on_predecessors_change(task: &Task, predecessors: Vec<Predecessor>, all: &[Task]) -> Task {
    debug!(task = %task.id, count = predecessors.len(), "predecessors change");
    let mut edited = task.clone();
    edited.predecessors = predecessors;
    propagate(&edited, all)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn pair() -> Vec<Task> {
        vec![
            Task::new("A", "A", day("2024-01-01")).with_duration(5),
            Task::new("B", "B", day("2024-01-06"))
                .with_duration(3)
                .with_predecessor("A"),
        ]
    }

    #[test]
    fn test_duration_change_recomputes_end() {
        let all = pair();
        let b = on_duration_change(&all[1], 10, &all);
        assert_eq!(b.start_date, day("2024-01-06"));
        assert_eq!(b.end_date, day("2024-01-15"));
        assert_eq!(all[1].duration, 3);
    }

    #[test]
    fn test_start_change_is_corrected_upward() {
        let all = pair();
        let b = on_start_date_change(&all[1], day("2023-12-25"), &all);
        assert_eq!(b.start_date, day("2024-01-06"));
        assert_eq!(b.end_date, day("2024-01-08"));

        let b = on_start_date_change(&all[1], day("2024-02-01"), &all);
        assert_eq!(b.start_date, day("2024-02-01"));
        assert_eq!(b.end_date, day("2024-02-03"));
    }

    #[test]
    fn test_predecessor_change_pushes_start() {
        let all = vec![
            Task::new("A", "A", day("2024-01-01")).with_duration(5),
            Task::new("B", "B", day("2024-01-01")).with_duration(2),
        ];
        let b = on_predecessors_change(&all[1], vec![Predecessor::finish_to_start("A")], &all);
        assert_eq!(b.start_date, day("2024-01-06"));
        assert_eq!(b.end_date, day("2024-01-07"));

        let cleared = on_predecessors_change(&b, Vec::new(), &all);
        assert!(cleared.predecessors.is_empty());
        assert_eq!(cleared.start_date, day("2024-01-06"));
    }

    #[test]
    fn test_growing_predecessor_duration_needs_caller_fan_out() {
        let all = pair();
        let a = on_duration_change(&all[0], 8, &all);
        assert_eq!(a.end_date, day("2024-01-08"));

        let updated = vec![a, all[1].clone()];
        let b = propagate(&updated[1], &updated);
        assert_eq!(b.start_date, day("2024-01-09"));
    }
}
