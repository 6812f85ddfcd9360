use std::path::PathBuf;

use clap::Parser;

use crate::cmd::Commands;
use crate::config::DEFAULT_HISTORY_DEPTH;

/// Outline-based project schedule on the command line.
/// Storage defaults to ~/.pms/schedule.json or a path passed via --db.
#[derive(Parser)]
#[command(name = "pms", version, about = "WBS outline and finish-to-start scheduling CLI")]
pub struct Cli {
    /// Path to the JSON schedule file.
    #[arg(long, global = true, env = "PMS_DB")]
    pub db: Option<PathBuf>,

    /// Number of undo snapshots to keep.
    #[arg(long, global = true, env = "PMS_HISTORY_DEPTH", default_value_t = DEFAULT_HISTORY_DEPTH)]
    pub history_depth: usize,

    /// Log engine decisions to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}
