//! Logging setup

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Log file name for a run started at `started`
pub fn log_file_name(started: DateTime<Local>) -> String {
    format!("canvas_install_{}.log", started.format("%Y%m%d_%H%M%S"))
}

/// Create `log_dir` if needed and a fresh log file inside it
pub fn open_log_file(log_dir: &Path, started: DateTime<Local>) -> Result<(PathBuf, File)> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let path = log_dir.join(log_file_name(started));
    let file = File::create(&path)
        .with_context(|| format!("Failed to create log file {}", path.display()))?;
    Ok((path, file))
}

/// Install the global subscriber.
///
/// Everything at `RUST_LOG` level (default `info`) goes to a fresh log file
/// in `log_dir`; warnings and errors are echoed to stderr. Returns the log
/// file path.
pub fn init_logging(log_dir: &Path) -> Result<PathBuf> {
    let (path, file) = open_log_file(log_dir, Local::now())?;

    let file_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let file_layer = fmt::layer()
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .with_filter(file_filter);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .with_filter(LevelFilter::WARN);

    tracing_subscriber::registry()
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .context("Failed to set logging subscriber")?;

    Ok(path)
}
