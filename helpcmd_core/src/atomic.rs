//! Atomic file write operations using temporary files and atomic rename.
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Cannot determine parent directory for {0}")]
    ParentDir(PathBuf),
}

impl StoreError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Atomically write content to a file.
///
/// The content goes to a temporary file next to the target which is then
/// renamed over it, so readers never see a partially-written file. Missing
/// parent directories are created.
pub fn atomic_write(path: &Path, content: &str) -> Result<(), StoreError> {
    let parent_dir = match path.parent() {
        Some(p) if p.as_os_str().is_empty() => Path::new("."),
        Some(p) => p,
        None => {
            log::error!("[atomic] Cannot determine parent directory for {:?}", path);
            return Err(StoreError::ParentDir(path.to_path_buf()));
        }
    };

    std::fs::create_dir_all(parent_dir).map_err(|e| StoreError::io(parent_dir, e))?;

    let mut temp_file = NamedTempFile::new_in(parent_dir).map_err(|e| {
        log::error!("[atomic] Failed to create temporary file in {:?}", parent_dir);
        StoreError::io(parent_dir, e)
    })?;

    temp_file.write_all(content.as_bytes()).map_err(|e| {
        log::error!("[atomic] Failed to write temporary file for {:?}", path);
        StoreError::io(path, e)
    })?;

    temp_file.flush().map_err(|e| StoreError::io(path, e))?;

    temp_file.persist(path).map_err(|e| {
        log::error!("[atomic] Failed to persist temporary file to {:?}", path);
        StoreError::io(path, e.error)
    })?;

    Ok(())
}
