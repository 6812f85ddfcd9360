//! Task data structure and related functionality.
//!
//! A schedule is a flat `Vec<Task>` that encodes a tree: each task carries an
//! outline level (0 = root) and the list is kept in depth-first order, so a
//! parent always sits immediately before its first child. The WBS code and the
//! end date are derived fields; the engine regenerates them after every edit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::dates::compute_end_date;
use crate::fields::DependencyType;

/// A finish-to-start link from a successor to one of its predecessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Predecessor {
    pub task_id: String,
    #[serde(rename = "type", default)]
    pub kind: DependencyType,
    /// 1-based row of the referenced task as of the last renumber. Display only.
    #[serde(default)]
    pub display_serial: Option<usize>,
}

impl Predecessor {
    /// Finish-to-start link to `task_id`. The serial is filled in by the next renumber.
    pub fn finish_to_start(task_id: impl Into<String>) -> Self {
        Predecessor {
            task_id: task_id.into(),
            kind: DependencyType::FinishToStart,
            display_serial: None,
        }
    }
}

/// A single row of the schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub wbs: String,
    pub duration: u32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub outline_level: usize,
    #[serde(default)]
    pub predecessors: Vec<Predecessor>,
    #[serde(default, rename = "isMilestone")]
    pub milestone: bool,
    #[serde(default)]
    pub progress: u8,
    /// UI state. Carried through untouched.
    #[serde(default = "default_expanded")]
    pub expanded: bool,
}

fn default_expanded() -> bool {
    true
}

impl Task {
    /// Build a one-day root-level task starting on `start_date`.
    pub fn new(id: impl Into<String>, name: impl Into<String>, start_date: NaiveDate) -> Self {
        Task {
            id: id.into(),
            name: name.into(),
            wbs: String::new(),
            duration: 1,
            start_date,
            end_date: start_date,
            outline_level: 0,
            predecessors: Vec::new(),
            milestone: false,
            progress: 0,
            expanded: true,
        }
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = duration;
        self.end_date = compute_end_date(self.start_date, duration);
        self
    }

    pub fn with_level(mut self, outline_level: usize) -> Self {
        self.outline_level = outline_level;
        self
    }

    /// Add a finish-to-start predecessor link.
    pub fn with_predecessor(mut self, task_id: impl Into<String>) -> Self {
        self.predecessors.push(Predecessor::finish_to_start(task_id));
        self
    }

    pub fn predecessor_ids(&self) -> impl Iterator<Item = &str> {
        self.predecessors.iter().map(|p| p.task_id.as_str())
    }

    pub fn depends_on(&self, task_id: &str) -> bool {
        self.predecessor_ids().any(|p| p == task_id)
    }

    /// Toggle the milestone flag.
    ///
    /// A milestone always has zero duration and ends on its start date. Turning
    /// the flag off gives a zero-length task back a single day.
    pub fn set_milestone(mut self, milestone: bool) -> Self {
        self.milestone = milestone;
        if milestone {
            self.duration = 0;
        } else if self.duration == 0 {
            self.duration = 1;
        }
        self.end_date = compute_end_date(self.start_date, self.duration);
        self
    }
}

/// Look a task up by id.
pub fn find<'a>(tasks: &'a [Task], id: &str) -> Option<&'a Task> {
    tasks.iter().find(|t| t.id == id)
}

/// Position of a task in list order.
pub fn position(tasks: &[Task], id: &str) -> Option<usize> {
    tasks.iter().position(|t| t.id == id)
}
