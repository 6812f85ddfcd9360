//! Runtime settings resolved from command-line flags and the environment.

use std::path::{Path, PathBuf};

use crate::error::{Result, ScheduleError};

/// Snapshots kept for `undo` unless configured otherwise.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

const SCHEDULE_FILE: &str = "schedule.json";

#[derive(Debug, Clone)]
pub struct Settings {
    /// JSON file holding the task list and its history.
    pub db_path: PathBuf,
    pub history_depth: usize,
    /// `tracing` filter used when `PMS_LOG` is unset.
    pub log_filter: String,
}

impl Settings {
    /// Work out where the schedule lives.
    ///
    /// An explicit path wins, then `$PMS_DIR/schedule.json`, then
    /// `$HOME/.pms/schedule.json`. The parent directory is created if missing.
    pub fn resolve(db: Option<PathBuf>, history_depth: usize, verbose: bool) -> Result<Self> {
        let db_path = match db {
            Some(path) => path,
            None => data_dir().join(SCHEDULE_FILE),
        };
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir(parent)?;
        }

        Ok(Settings {
            db_path,
            history_depth: history_depth.max(1),
            log_filter: if verbose { "debug" } else { "warn" }.to_string(),
        })
    }
}

fn data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("PMS_DIR") {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".pms")
}

fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| ScheduleError::io(dir, e))
}
