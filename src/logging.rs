//! Tracing subscriber setup for the binary.
//!
//! Rendered content owns the terminal, so logs go to a daily-rolling file
//! under [`crate::app_dirs::logs_dir`] by default. `RUST_LOG` overrides the
//! configured filter.

use crate::config::LoggingConfig;
use crate::error::{AppError, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// File name prefix of the rolling log.
pub const LOG_FILE_PREFIX: &str = "daily-line.log";

/// Keeps the background log writer alive; drop it last to flush.
#[must_use = "dropping the guard stops the log writer"]
pub struct LogGuard {
    _worker: Option<WorkerGuard>,
}

/// Filter from `RUST_LOG`, falling back to `level`, then to `info`.
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber described by `config`.
///
/// # Errors
///
/// Returns [`AppError::Io`] if the log directory cannot be created and
/// [`AppError::Config`] if a subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<LogGuard> {
    init_in(config, &crate::app_dirs::logs_dir())
}

fn init_in(config: &LoggingConfig, logs_dir: &Path) -> Result<LogGuard> {
    let filter = env_filter(&config.level);

    if !config.file_logging {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| AppError::Config(format!("cannot install logger: {e}")))?;
        return Ok(LogGuard { _worker: None });
    }

    std::fs::create_dir_all(logs_dir)?;
    let appender = tracing_appender::rolling::daily(logs_dir, LOG_FILE_PREFIX);
    let (writer, worker) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| AppError::Config(format!("cannot install logger: {e}")))?;

    tracing::debug!(dir = %logs_dir.display(), "file logging enabled");
    Ok(LogGuard {
        _worker: Some(worker),
    })
}
