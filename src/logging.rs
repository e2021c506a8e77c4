use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Overrides the configured log level, e.g. `TASKTAB_LOG=debug`
pub const LOG_ENV: &str = "TASKTAB_LOG";

/// File the terminal menu logs to, inside the data directory
pub const LOG_FILE_NAME: &str = "tasktab.log";

/// `TASKTAB_LOG` if set and valid, otherwise `level`, otherwise `info`.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to stderr. Used by the one-shot subcommands.
pub fn init_stderr(level: &str) {
    let subscriber = tracing_subscriber::registry().with(env_filter(level)).with(
        tracing_subscriber::fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time(),
    );
    // a subscriber installed earlier (tests) wins
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Log to `tasktab.log` in `dir`, off the UI thread. The terminal owns
/// stdout/stderr while the menu is up. Keep the guard alive until exit or
/// buffered lines are lost.
pub fn init_file(dir: &Path, level: &str) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(dir) {
        eprintln!("warning: logging disabled: {}: {}", dir.display(), e);
        return None;
    }
    let appender = tracing_appender::rolling::never(dir, LOG_FILE_NAME);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let subscriber = tracing_subscriber::registry().with(env_filter(level)).with(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false)
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false),
    );
    tracing::subscriber::set_global_default(subscriber).ok()?;
    tracing::info!("logging to {}", dir.join(LOG_FILE_NAME).display());
    Some(guard)
}
