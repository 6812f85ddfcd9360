//! Date arithmetic for finish-to-start scheduling.
//!
//! Durations are whole calendar days. A task of duration `n > 0` occupies `n`
//! days including its start date; a milestone (duration 0) ends on the day it
//! starts. A successor may start no earlier than the day after the latest end
//! date among its predecessors.

use chrono::{Duration, NaiveDate};
use tracing::{debug, warn};

use crate::error::{Result, ScheduleError};
use crate::task::{find, Task};

/// End date of a task starting on `start` that lasts `duration` days.
pub fn compute_end_date(start: NaiveDate, duration: u32) -> NaiveDate {
    if duration == 0 {
        return start;
    }
    start
        .checked_add_signed(Duration::days(i64::from(duration) - 1))
        .unwrap_or(NaiveDate::MAX)
}

/// Earliest allowed start for a task, plus the predecessor ids that did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Constraint {
    pub date: NaiveDate,
    pub dangling: Vec<String>,
}

/// Work out the earliest start date the task's predecessors allow.
///
/// Each resolved predecessor contributes its end date plus one day. A
/// predecessor id that is not in `all` contributes the task's own start date,
/// so a stale link never moves the task, and is reported in `dangling`.
/// Without predecessors the constraint is the task's current start date.
pub fn predecessor_constraint(task: &Task, all: &[Task]) -> Constraint {
    let mut dangling = Vec::new();
    let mut latest: Option<NaiveDate> = None;

    for pred in &task.predecessors {
        let bound = match find(all, &pred.task_id) {
            Some(p) => p.end_date.succ_opt().unwrap_or(NaiveDate::MAX),
            None => {
                warn!(
                    task = %task.id,
                    predecessor = %pred.task_id,
                    "predecessor not found; ignoring link"
                );
                dangling.push(pred.task_id.clone());
                task.start_date
            }
        };
        latest = Some(latest.map_or(bound, |l| l.max(bound)));
    }

    Constraint {
        date: latest.unwrap_or(task.start_date),
        dangling,
    }
}

/// Earliest start date the task's predecessors allow.
pub fn latest_predecessor_constraint(task: &Task, all: &[Task]) -> NaiveDate {
    predecessor_constraint(task, all).date
}

/// Push a task's start date forward so it satisfies its predecessors.
///
/// Never moves a task earlier. Returns a fresh copy; applying it twice gives the
/// same result as applying it once.
pub fn propagate(task: &Task, all: &[Task]) -> Task {
    let constraint = latest_predecessor_constraint(task, all);
    let mut out = task.clone();
    if out.start_date < constraint {
        debug!(
            task = %task.id,
            from = %task.start_date,
            to = %constraint,
            "start date pushed by predecessors"
        );
        out.start_date = constraint;
        out.end_date = compute_end_date(constraint, out.duration);
    }
    out
}

/// Parse a human-entered date relative to `today`.
///
/// Supports:
/// - "today", "tomorrow", "yesterday"
/// - "in 3d", "in 2w"
/// - "YYYY-MM-DD"
pub fn parse_date_input(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let invalid = || ScheduleError::InvalidDate(input.to_string());
    let shift = |delta: Option<Duration>| {
        delta
            .and_then(|d| today.checked_add_signed(d))
            .ok_or_else(invalid)
    };

    let s = input.trim().to_lowercase();
    match s.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return shift(Duration::try_days(1)),
        "yesterday" => return shift(Duration::try_days(-1)),
        _ => {}
    }

    if let Some(rest) = s.strip_prefix("in ") {
        if let Some(nd) = rest.strip_suffix('d') {
            if let Ok(days) = nd.trim().parse::<i64>() {
                return shift(Duration::try_days(days));
            }
        }
        if let Some(nw) = rest.strip_suffix('w') {
            if let Ok(weeks) = nw.trim().parse::<i64>() {
                return shift(Duration::try_weeks(weeks));
            }
        }
    }

    NaiveDate::parse_from_str(&s, "%Y-%m-%d").map_err(|_| invalid())
}
