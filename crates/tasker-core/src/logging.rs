//! File logging setup.
//!
//! Logs go to `${TASKER_HOME}/logs/tasker.log`; stdout and stderr are left to
//! the command output. The filter comes from `TASKER_LOG`, then `RUST_LOG`,
//! then defaults to `tasker=info`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

use crate::config::paths;

const LOG_FILE: &str = "tasker.log";
const DEFAULT_FILTER: &str = "tasker=info,tasker_core=info,tasker_ui=info";

/// Builds the filter from `TASKER_LOG`, `RUST_LOG`, or the default.
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env("TASKER_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber writing to the default log directory.
///
/// Keep the returned guard alive for the life of the process; dropping it
/// flushes pending lines.
///
/// # Errors
/// Returns an error if the log directory cannot be created.
pub fn init() -> Result<WorkerGuard> {
    init_in(&paths::logs_dir())
}

/// Installs the global subscriber writing to `dir/tasker.log`.
///
/// A subscriber installed earlier (tests) is left in place.
///
/// # Errors
/// Returns an error if `dir` cannot be created.
pub fn init_in(dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true);

    let _ = tracing_subscriber::registry()
        .with(env_filter())
        .with(file_layer)
        .try_init();

    Ok(guard)
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use super::*;

    #[test]
    fn test_init_creates_log_dir() {
        let dir = tempdir().unwrap();
        let logs = dir.path().join("logs");
        let guard = init_in(&logs).unwrap();
        assert!(logs.is_dir());
        drop(guard);
    }
}
