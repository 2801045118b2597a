//! Tracing subscriber setup.
//!
//! Logs go to stderr filtered by `RUST_LOG` (default `warn`). With
//! `ANIMATEDFETCH_LOG=1` they are also written without color to
//! `animatedfetch.log` in the local data directory, at `debug` unless
//! `RUST_LOG` says otherwise. Stderr keeps its own filter so debug output
//! never lands on the terminal being drawn.

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable enabling the log file.
pub const LOG_ENV: &str = "ANIMATEDFETCH_LOG";

/// Default filter for stderr.
const STDERR_FILTER: &str = "warn";

/// Default filter for the log file.
const FILE_FILTER: &str = "debug";

/// Keeps the file writer flushing until dropped. Hold it in `main`.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// `RUST_LOG` if set and valid, else `default`.
fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Install the global subscriber.
pub fn init() -> LogGuard {
    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(env_filter(STDERR_FILTER));

    let file_guard = if std::env::var(LOG_ENV).as_deref() == Ok("1") {
        let dir = log_dir();
        let _ = std::fs::create_dir_all(&dir);
        let appender = tracing_appender::rolling::never(&dir, "animatedfetch.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let file_layer = fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_filter(env_filter(FILE_FILTER));

        tracing_subscriber::registry()
            .with(stderr_layer)
            .with(file_layer)
            .try_init()
            .ok();

        Some(guard)
    } else {
        tracing_subscriber::registry()
            .with(stderr_layer)
            .try_init()
            .ok();

        None
    };

    LogGuard {
        _file_guard: file_guard,
    }
}

fn log_dir() -> PathBuf {
    ProjectDirs::from("", "", "animatedfetch")
        .map(|dirs| dirs.data_local_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir)
}
