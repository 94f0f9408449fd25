//! File-backed `tracing` setup. The terminal belongs to the TUI, so logs
//! never go to stdout/stderr once the screen is up.

use std::fs;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use crate::config::{LoggingSettings, default_log_path};

/// Install the global subscriber. Keep the returned guard alive until exit
/// so buffered lines are flushed.
pub fn init(settings: &LoggingSettings) -> Option<WorkerGuard> {
    let path = settings.file.clone().or_else(default_log_path)?;
    let dir = path.parent()?;
    let file_name = path.file_name()?;

    if let Err(e) = fs::create_dir_all(dir) {
        eprintln!("tapdeck: cannot create log directory {}: {e}", dir.display());
        return None;
    }

    let appender = tracing_appender::rolling::never(dir, file_name);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    let filter = EnvFilter::try_from_env("TAPDECK_LOG")
        .unwrap_or_else(|_| EnvFilter::new(settings.level.as_str()));

    let installed = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_env_filter(filter)
        .try_init();
    if let Err(e) = installed {
        eprintln!("tapdeck: logging disabled: {e}");
        return None;
    }

    Some(guard)
}
