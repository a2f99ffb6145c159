use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::storage::error::StorageError;
use crate::storage::mmap::MmapFileHandle;

const TEMP_EXTENSION: &str = "tmp";

#[cfg(test)]
mod tests;

/// Writes opaque bytes to storage and returns a readable mmap handle.
pub trait StorageWriter: Send + Sync {
    /// Writes `data` under `key`.
    fn write(&self, key: &str, data: &[u8]) -> Result<MmapFileHandle, StorageError>;
}

/// Replaces `path` with `data` so readers see either the old or the new bytes, never a mix.
///
/// Bytes go to a sibling temp file, are fsynced, then renamed over `path`.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| StorageError::WriteFailed {
            key: path.display().to_string(),
            reason: "path has no file name".to_string(),
        })?
        .to_string_lossy();
    let temp_path = path.with_file_name(format!("{}.{}", file_name, TEMP_EXTENSION));

    {
        let mut file = File::create(&temp_path)?;
        file.write_all(data)?;
        file.sync_all()?;
    }
    fs::rename(&temp_path, path)?;

    // Persist the rename itself where the platform allows opening directories.
    if let Some(parent) = path.parent()
        && let Ok(dir) = File::open(parent)
        && let Err(e) = dir.sync_all()
    {
        warn!(
            path = %parent.display(),
            error = %e,
            "Failed to fsync directory after rename"
        );
    }

    debug!(path = %path.display(), bytes = data.len(), "Artifact written");
    Ok(())
}

/// Flat directory of files keyed by name.
#[derive(Debug, Clone)]
pub struct DirectoryWriter {
    root: PathBuf,
}

impl DirectoryWriter {
    /// Creates the directory (and parents) if needed.
    pub fn create<P: Into<PathBuf>>(root: P) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        if key.is_empty() || key.contains(['/', '\\']) || key == "." || key == ".." {
            return Err(StorageError::WriteFailed {
                key: key.to_string(),
                reason: "key must be a plain file name".to_string(),
            });
        }
        Ok(self.root.join(key))
    }
}

impl StorageWriter for DirectoryWriter {
    fn write(&self, key: &str, data: &[u8]) -> Result<MmapFileHandle, StorageError> {
        let path = self.key_path(key)?;
        write_atomic(&path, data)?;
        Ok(MmapFileHandle::open(&path)?)
    }
}
