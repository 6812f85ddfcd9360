//! Human-facing predecessor entry.
//!
//! People type predecessors as 1-based row numbers ("1,3"). Rows shift whenever
//! the list is reordered, so input is resolved to task ids the moment it is
//! entered. The serial stored on a link is only ever a display projection.

use crate::error::{Result, ScheduleError};
use crate::task::{find, Predecessor, Task};

/// Resolve a comma-separated list of row numbers (or task ids) to predecessor links.
///
/// Numeric entries are rows in the current list order; anything else must be
/// an exact task id. Duplicates are dropped and an empty input yields no links.
pub fn resolve_serials(input: &str, tasks: &[Task]) -> Result<Vec<Predecessor>> {
    let mut out: Vec<Predecessor> = Vec::new();
    for raw in input.split(',') {
        let entry = raw.trim();
        if entry.is_empty() {
            continue;
        }

        let (task, row) = match entry.parse::<usize>() {
            Ok(row) => {
                let task = row
                    .checked_sub(1)
                    .and_then(|i| tasks.get(i))
                    .ok_or_else(|| ScheduleError::InvalidSerial {
                        input: entry.to_string(),
                        reason: format!("rows run from 1 to {}", tasks.len()),
                    })?;
                (task, row)
            }
            Err(_) => {
                let task = find(tasks, entry).ok_or_else(|| ScheduleError::InvalidSerial {
                    input: entry.to_string(),
                    reason: "not a row number or task id".to_string(),
                })?;
                let row = tasks.iter().position(|t| t.id == task.id).map_or(0, |i| i + 1);
                (task, row)
            }
        };

        if out.iter().any(|p| p.task_id == task.id) {
            continue;
        }
        let mut link = Predecessor::finish_to_start(task.id.clone());
        link.display_serial = Some(row);
        out.push(link);
    }
    Ok(out)
}

/// Render a task's predecessors the way they are typed, e.g. `"1,3"`.
///
/// Dangling links show as `?`.
pub fn format_serials(task: &Task) -> String {
    task.predecessors
        .iter()
        .map(|p| p.display_serial.map_or_else(|| "?".to_string(), |s| s.to_string()))
        .collect::<Vec<_>>()
        .join(",")
}
