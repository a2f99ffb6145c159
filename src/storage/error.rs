use thiserror::Error;

use super::mmap::MmapError;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("write failed for {key}: {reason}")]
    WriteFailed { key: String, reason: String },

    #[error(transparent)]
    Mmap(#[from] MmapError),
}
