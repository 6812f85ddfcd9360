//! Work breakdown structure numbering.
//!
//! WBS codes are a pure function of list order and outline levels. They carry
//! no identity of their own and are regenerated in full after every structural
//! edit, together with the row serials cached on predecessor links.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::error::{Result, ScheduleError};
use crate::task::Task;

/// Recompute WBS codes for an ordered task list.
///
/// Walks the list once keeping one running counter per outline level. Going a
/// level deeper starts that level at 1, staying level bumps the counter, and
/// climbing back up truncates the code to the new depth and bumps the counter
/// there. So levels `[0, 1, 1, 0, 1]` number as `1, 1.1, 1.2, 2, 2.1`.
///
/// A level more than one deeper than the previous row (or a first row that is
/// not at level 0) is clamped, and the clamped level is written back.
///
/// Every predecessor link's `display_serial` is refreshed from the new order.
pub fn renumber(tasks: &[Task]) -> Vec<Task> {
    let mut counters: Vec<u32> = Vec::new();
    let mut out = Vec::with_capacity(tasks.len());

    for task in tasks {
        let mut task = task.clone();
        let ceiling = counters.len();
        if task.outline_level > ceiling {
            warn!(
                task = %task.id,
                level = task.outline_level,
                clamped = ceiling,
                "outline level jumps more than one step; clamping"
            );
            task.outline_level = ceiling;
        }

        let level = task.outline_level;
        if level == counters.len() {
            counters.push(1);
        } else {
            counters.truncate(level + 1);
            counters[level] += 1;
        }

        task.wbs = counters
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(".");
        out.push(task);
    }

    refresh_serials(&mut out);
    debug!(tasks = out.len(), "renumbered schedule");
    out
}

/// Re-derive the 1-based row serial cached on every predecessor link.
fn refresh_serials(tasks: &mut [Task]) {
    let rows: HashMap<String, usize> = tasks
        .iter()
        .enumerate()
        .map(|(i, t)| (t.id.clone(), i + 1))
        .collect();
    for task in tasks.iter_mut() {
        for pred in task.predecessors.iter_mut() {
            pred.display_serial = rows.get(&pred.task_id).copied();
        }
    }
}

/// Check that no outline level rises by more than one step.
///
/// For callers that would rather reject a malformed list than have
/// [`renumber`] clamp it.
pub fn validate_outline(tasks: &[Task]) -> Result<()> {
    let mut previous: Option<usize> = None;
    for task in tasks {
        let ceiling = previous.map_or(0, |p| p + 1);
        if task.outline_level > ceiling {
            return Err(ScheduleError::OutlineJump {
                task_id: task.id.clone(),
                previous: previous.unwrap_or(0),
                level: task.outline_level,
            });
        }
        previous = Some(task.outline_level);
    }
    Ok(())
}

/// Number of dotted segments in a WBS code.
pub fn depth(code: &str) -> usize {
    if code.is_empty() {
        0
    } else {
        code.split('.').count()
    }
}
