//! Guaranteed-cleanup persistence for downloaded blobs.
//!
//! Downloads are staged in a temp file next to the destination and
//! persisted atomically on success. On any failure the temp file is
//! removed when the handle drops, so no partial download is left behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("download destination has no parent directory: {0}")]
    NoParentDir(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to persist download to {path}: {source}")]
    Persist {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Write `bytes` to `destination` via a staged temp file.
pub fn save_download(destination: &Path, bytes: &[u8]) -> Result<(), SaveError> {
    let parent = destination
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty())
        .ok_or_else(|| SaveError::NoParentDir(destination.to_path_buf()))?;
    let mut staged = NamedTempFile::new_in(parent)?;
    staged.write_all(bytes)?;
    staged.flush()?;
    staged
        .persist(destination)
        .map_err(|err| SaveError::Persist {
            path: destination.to_path_buf(),
            source: err.error,
        })?;
    tracing::debug!(path = %destination.display(), bytes = bytes.len(), "saved download");
    Ok(())
}
