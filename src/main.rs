//! # pms - project schedule CLI
//!
//! Keeps an outline of tasks with WBS codes, durations and finish-to-start
//! predecessors in a local JSON file.
//!
//! ```bash
//! pms add "Foundations" --start 2024-01-01 --duration 5
//! pms add "Walls" --duration 3 --pred 1
//! pms add "Windows" --after Walls --child
//! pms list
//! pms duration Foundations 8     # successors move with it
//! pms undo
//! ```
//!
//! Data lives in `~/.pms/schedule.json` unless `--db`, `PMS_DB` or `PMS_DIR`
//! say otherwise. Set `PMS_LOG=debug` (or pass `-v`) to see propagation
//! decisions on stderr.

use clap::Parser;

use project_schedule::cli::Cli;
use project_schedule::cmd::run;
use project_schedule::config::Settings;
use project_schedule::logging;

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::resolve(cli.db, cli.history_depth, cli.verbose) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };
    logging::init(&settings.log_filter);

    if let Err(e) = run(cli.command, &settings) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
