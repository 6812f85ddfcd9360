//! Enumerations shared by the task model and the command line.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Dependency link type between two tasks.
///
/// Only finish-to-start is supported: the successor may not start before the
/// day after its predecessor ends.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DependencyType {
    #[default]
    #[serde(rename = "FS", alias = "fs")]
    FinishToStart,
}

impl DependencyType {
    /// Short code shown in tables and accepted on input.
    pub fn code(self) -> &'static str {
        match self {
            DependencyType::FinishToStart => "FS",
        }
    }
}

/// What a delete does with surviving tasks that still reference a deleted task.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
#[value(rename_all = "kebab-case")]
pub enum DependentsPolicy {
    /// Refuse the delete while any survivor references a deleted task.
    #[default]
    Refuse,
    /// Delete anyway and leave the references dangling.
    Keep,
    /// Strip the matching predecessor links from the survivors.
    Detach,
}

/// Output format for `list` and `export`.
#[derive(Debug, Clone, Copy, Default, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}
