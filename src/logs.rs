//! Tracing subscriber setup.
//!
//! Reports and plots own stdout, so logs always go elsewhere: stderr for the
//! batch commands, a file for the TUI (which owns the whole terminal).
//! `RUST_LOG` overrides the default `warn` filter.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::fmt;

use crate::error::AppError;

const DEFAULT_FILTER: &str = "warn";
const LOG_FILE_NAME: &str = "diffcast.log";

/// Where log events are written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget<'a> {
    /// Human-readable lines on stderr.
    Stderr,
    /// One JSON object per event on stderr.
    StderrJson,
    /// JSON lines appended to `<dir>/diffcast.log`.
    File(&'a Path),
}

/// Install the global subscriber.
///
/// The returned guard must be kept alive for file logging to flush; it is
/// `None` for stderr targets.
pub fn init_logs(target: LogTarget<'_>) -> Result<Option<WorkerGuard>, AppError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let (result, guard) = match target {
        LogTarget::Stderr => {
            let subscriber = fmt::Subscriber::builder()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_env_filter(env_filter)
                .finish();
            (tracing::subscriber::set_global_default(subscriber), None)
        }
        LogTarget::StderrJson => {
            let subscriber = fmt::Subscriber::builder()
                .json()
                .flatten_event(true)
                .with_writer(std::io::stderr)
                .with_env_filter(env_filter)
                .finish();
            (tracing::subscriber::set_global_default(subscriber), None)
        }
        LogTarget::File(dir) => {
            std::fs::create_dir_all(dir).map_err(|e| {
                AppError::new(4, format!("Failed to create log directory '{}': {e}", dir.display()))
            })?;
            let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let subscriber = fmt::Subscriber::builder()
                .json()
                .flatten_event(true)
                .with_writer(writer)
                .with_ansi(false)
                .with_env_filter(env_filter)
                .finish();
            (tracing::subscriber::set_global_default(subscriber), Some(guard))
        }
    };

    result.map_err(|e| AppError::new(4, format!("Failed to install log subscriber: {e}")))?;
    Ok(guard)
}
