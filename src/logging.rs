use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

pub const LOG_FILE_NAME: &str = "todo.log";

/// Route tracing output to `<log_dir>/todo.log`.
///
/// The terminal belongs to the TUI, so nothing is written to stdout or
/// stderr. `RUST_LOG` overrides `default_level`. Keep the returned guard
/// alive until exit or buffered lines are lost.
pub fn init(log_dir: &Path, default_level: &str) -> std::io::Result<WorkerGuard> {
    std::fs::create_dir_all(log_dir)?;

    let appender = tracing_appender::rolling::never(log_dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("todo={default_level},warn")));

    // A second init (tests, embedding) keeps the existing subscriber
    let _ = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_env_filter(filter)
        .try_init();

    Ok(guard)
}
