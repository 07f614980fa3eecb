use std::path::Path;
use std::sync::Once;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::{EnvFilter, fmt};

/// Directory log files are written to by [`init_tracing`].
pub const DEFAULT_LOG_DIR: &str = "logs";

/// Number of rotated log files kept on disk.
const MAX_LOG_FILES: usize = 3;

/// Log filter used when `RUST_LOG` is not set.
const DEFAULT_LOG_FILTER: &str = "info";

/// Errors that can occur while installing the tracing subscriber.
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("failed to create the log file appender: {0}")]
    Appender(#[from] InitError),

    #[error("failed to install the tracing subscriber: {0}")]
    Init(#[from] TryInitError),
}

/// Guard flushing buffered log lines when dropped.
///
/// Logs are written by background threads, so the guard must be kept alive until the process
/// is about to exit.
#[must_use = "dropping the flusher stops log output"]
#[derive(Debug)]
pub struct LogFlusher {
    _guards: Vec<WorkerGuard>,
}

/// Installs the global tracing subscriber for `app_name`.
///
/// Logs go to stdout and to a daily rotated file in [`DEFAULT_LOG_DIR`].
pub fn init_tracing(app_name: &str) -> Result<LogFlusher, TracingError> {
    init_tracing_in(app_name, DEFAULT_LOG_DIR)
}

/// Installs the global tracing subscriber for `app_name`, writing log files to `log_dir`.
///
/// The filter is read from `RUST_LOG` and defaults to `info`.
pub fn init_tracing_in<P: AsRef<Path>>(
    app_name: &str,
    log_dir: P,
) -> Result<LogFlusher, TracingError> {
    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(app_name)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(log_dir)?;

    let (file_writer, file_guard) = tracing_appender::non_blocking(file_appender);
    let (stdout_writer, stdout_guard) = tracing_appender::non_blocking(std::io::stdout());

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt::layer().with_writer(stdout_writer))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init()?;

    Ok(LogFlusher {
        _guards: vec![file_guard, stdout_guard],
    })
}

/// Installs a tracing subscriber for tests when `ENABLE_TRACING` is set.
///
/// Output goes through the test writer so it is captured per test. Calling this more than once
/// is a no-op.
pub fn init_test_tracing() {
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        if std::env::var("ENABLE_TRACING").is_err() {
            return;
        }

        // Another test harness may have installed a subscriber already, which is fine.
        let _ = tracing_subscriber::registry()
            .with(env_filter())
            .with(fmt::layer().with_test_writer())
            .try_init();
    });
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER))
}
