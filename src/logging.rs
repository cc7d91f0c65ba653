//! Logging setup.
//!
//! Installs a global tracing subscriber writing to stdout and a per-launch
//! log file in the platform data directory. Old log files are pruned so the
//! directory stays bounded.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
    time::SystemTime,
};

use time::{OffsetDateTime, UtcOffset, format_description::FormatItem, macros::format_description};
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{EnvFilter, Registry, fmt, prelude::*};

const MAX_LOG_FILES: usize = 8;
const LOG_FILE_PREFIX: &str = "sentilens";

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    /// No platform data directory could be resolved for log files.
    #[error("No suitable data directory available for logs")]
    NoDataDir,
    #[error("Failed to prepare log directory {path}: {source}")]
    PrepareDir {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to format log filename time: {0}")]
    FormatTime(time::error::Format),
    #[error("Failed to install global tracing subscriber: {0}")]
    SetGlobal(tracing::subscriber::SetGlobalDefaultError),
}

/// Initialize tracing to stdout plus a per-launch file.
///
/// Subsequent calls are no-ops. Errors are returned so the embedding app
/// can degrade to stdout-only logging instead of aborting.
pub fn init() -> Result<(), LoggingError> {
    if LOG_GUARD.get().is_some() {
        return Ok(());
    }

    let log_dir = logs_dir()?;
    let file_name = log_file_name(now_local_or_utc())?;
    prune_old_logs(&log_dir, MAX_LOG_FILES);

    let (file_writer, guard) =
        tracing_appender::non_blocking(rolling::never(&log_dir, &file_name));

    let timer = build_timer();
    let stdout_layer = fmt::layer()
        .with_timer(timer.clone())
        .with_writer(std::io::stdout);
    let file_layer = fmt::layer()
        .with_ansi(false)
        .with_timer(timer)
        .with_writer(file_writer);

    let subscriber = Registry::default()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(stdout_layer)
        .with(file_layer);
    tracing::subscriber::set_global_default(subscriber).map_err(LoggingError::SetGlobal)?;
    let _ = LOG_GUARD.set(guard);

    tracing::info!(
        "Logging initialized; log file at {}",
        log_dir.join(file_name).display()
    );
    Ok(())
}

fn logs_dir() -> Result<PathBuf, LoggingError> {
    let dirs =
        directories::ProjectDirs::from("", "", "sentilens").ok_or(LoggingError::NoDataDir)?;
    let path = dirs.data_dir().join("logs");
    fs::create_dir_all(&path).map_err(|source| LoggingError::PrepareDir {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}

fn log_file_name(now: OffsetDateTime) -> Result<String, LoggingError> {
    const NAME_FORMAT: &[FormatItem<'_>] =
        format_description!("[year]-[month]-[day]_[hour]-[minute]-[second]");
    let stamp = now.format(NAME_FORMAT).map_err(LoggingError::FormatTime)?;
    Ok(format!("{LOG_FILE_PREFIX}_{stamp}.log"))
}

/// Remove the oldest `.log` files beyond `max_files`. Best effort; pruning
/// failures never block startup.
fn prune_old_logs(dir: &Path, max_files: usize) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    let mut logs: Vec<(SystemTime, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.path().extension().and_then(|ext| ext.to_str()) == Some("log")
                && entry.file_type().map(|ft| ft.is_file()).unwrap_or(false)
        })
        .map(|entry| {
            let modified = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            (modified, entry.path())
        })
        .collect();
    logs.sort_by_key(|(modified, _)| *modified);
    let excess = logs.len().saturating_sub(max_files);
    for (_, path) in logs.into_iter().take(excess) {
        if let Err(err) = fs::remove_file(&path) {
            tracing::warn!(path = %path.display(), %err, "failed to prune old log file");
        }
    }
}

fn build_timer() -> fmt::time::OffsetTime<time::format_description::BorrowedFormatItem<'static>> {
    const DISPLAY_FORMAT: &[FormatItem<'static>] =
        format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    fmt::time::OffsetTime::new(offset, DISPLAY_FORMAT.into())
}

fn now_local_or_utc() -> OffsetDateTime {
    OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc())
}
