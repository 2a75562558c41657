use std::path::Path;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::state::LOG_FILE_NAME;

/// Initialize stderr logging and, if `log_dir` is given, a plain-text log file.
/// Returns guards that must be kept alive until the program exits.
pub fn init_logging(level: Level, log_dir: Option<&Path>) -> Vec<WorkerGuard> {
    let mut guards = Vec::new();

    let (stderr_writer, stderr_guard) = tracing_appender::non_blocking(std::io::stderr());
    guards.push(stderr_guard);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .compact()
        .with_writer(stderr_writer)
        .with_filter(env_filter(level));

    let file_layer = log_dir.and_then(|log_dir| {
        let appender = match RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(LOG_FILE_NAME)
            .build(log_dir)
        {
            Ok(appender) => appender,
            Err(e) => {
                eprintln!("Warning: Failed to open log file in {:?}: {}", log_dir, e);
                return None;
            }
        };
        let (file_writer, file_guard) = tracing_appender::non_blocking(appender);
        guards.push(file_guard);

        Some(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(env_filter(level)),
        )
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();

    guards
}

fn env_filter(level: Level) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
}

/// Pick the log level: explicit flag, then config file, then `info`
pub fn resolve_level(flag: Option<&str>, config: Option<&str>) -> Level {
    flag.or(config)
        .and_then(|level| level.parse().ok())
        .unwrap_or(Level::INFO)
}
