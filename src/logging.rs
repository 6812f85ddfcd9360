//! Log setup for the `pms` binary.

use tracing_subscriber::EnvFilter;

/// Environment variable holding an `EnvFilter` directive, e.g. `project_schedule=debug`.
pub const LOG_ENV: &str = "PMS_LOG";

/// Install a stderr subscriber. Stdout is left to command output.
///
/// `PMS_LOG` takes precedence over `default_filter`. Calling this twice is harmless.
pub fn init(default_filter: &str) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
