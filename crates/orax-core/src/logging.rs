//! Tracing initialization.
//!
//! TUI mode logs to daily files under ${ORAX_HOME}/logs since stderr is
//! owned by the alternate screen; one-shot commands log to stderr.
//! Filtering follows `RUST_LOG`, defaulting to `info`.

use std::path::Path;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Routes logs to a daily-rolling file in `logs_dir`.
///
/// The returned guard must be held for the process lifetime; dropping it
/// stops the background writer.
///
/// # Errors
/// Returns an error if the log directory cannot be created.
pub fn init_file_logging(logs_dir: &Path) -> Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("create log directory: {}", logs_dir.display()))?;

    let appender = tracing_appender::rolling::daily(logs_dir, "orax.log");
    let (writer, guard) = tracing_appender::non_blocking(appender);

    // try_init so tests that init twice don't panic.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init();

    Ok(guard)
}

/// Routes logs to stderr for one-shot commands.
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .try_init();
}
