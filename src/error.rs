//! Error types for the schedule store and its command surface.
//!
//! The scheduling engine itself is infallible: cycle checks are predicates and
//! structural edits saturate at their bounds. Errors only arise where user input
//! is parsed or where the task list touches the filesystem.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used across the crate.
pub type Result<T> = std::result::Result<T, ScheduleError>;

#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("Task {0} not found")]
    TaskNotFound(String),

    #[error("Invalid predecessor row '{input}': {reason}")]
    InvalidSerial { input: String, reason: String },

    #[error("Adding {predecessor} as a predecessor of {successor} would create a cycle")]
    CyclicDependency { successor: String, predecessor: String },

    #[error("Outline level jumps from {previous} to {level} at task {task_id}")]
    OutlineJump {
        task_id: String,
        previous: usize,
        level: usize,
    },

    #[error("Task id {0} appears more than once")]
    DuplicateId(String),

    #[error("No task ids left after {0}")]
    IdSpaceExhausted(String),

    #[error("Invalid task {task_id}: {reason}")]
    Validation { task_id: String, reason: String },

    #[error("{count} task(s) still reference the tasks being deleted; use --dependents keep or --dependents detach")]
    DanglingReferences { count: usize },

    #[error("Task {task_id} has {count} child task(s); use --cascade to delete them too")]
    HasChildren { task_id: String, count: usize },

    #[error("Task name '{name}' matches {count} tasks; use the id or WBS code instead")]
    AmbiguousName { name: String, count: usize },

    #[error("Could not understand date '{0}'")]
    InvalidDate(String),

    #[error("Nothing to {0}")]
    EmptyHistory(&'static str),

    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl ScheduleError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ScheduleError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn validation(task_id: &str, reason: impl Into<String>) -> Self {
        ScheduleError::Validation {
            task_id: task_id.to_string(),
            reason: reason.into(),
        }
    }
}
