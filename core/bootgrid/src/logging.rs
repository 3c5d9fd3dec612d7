//! Logging setup.
//!
//! Logs go to stderr so they never mix with the grid on stdout. `--log-file`
//! sends them to a file through a non-blocking writer instead; the returned
//! guard must live until exit so buffered lines are flushed.

use std::env;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEBUG_ENV: &str = "BOOTGRID_DEBUG_LOG";

pub fn init(verbose: u8, log_file: Option<&Path>) -> Option<WorkerGuard> {
    let filter = build_filter(verbose);

    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let file_name = path.file_name().unwrap_or_else(|| "bootgrid.log".as_ref());
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            None
        }
    }
}

fn build_filter(verbose: u8) -> EnvFilter {
    let debug_enabled = env::var(DEBUG_ENV)
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);

    match (debug_enabled, verbose) {
        (true, _) | (false, 2..) => EnvFilter::new("debug"),
        (false, 1) => EnvFilter::new("info"),
        (false, 0) => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    }
}
