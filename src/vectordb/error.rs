use std::path::PathBuf;

use thiserror::Error;

use crate::embedding::EmbeddingError;
use crate::storage::{MmapError, StorageError};

#[derive(Debug, Error)]
/// Errors returned by index build, persistence and search.
pub enum VectorDbError {
    /// Vector dimension disagrees with the index.
    #[error("invalid vector dimension: expected {expected}, got {actual}")]
    InvalidDimension {
        /// Dimension the index holds.
        expected: usize,
        /// Dimension supplied.
        actual: usize,
    },

    /// An index cannot hold zero-length vectors.
    #[error("vector dimension cannot be zero")]
    ZeroDimension,

    /// No published store at the location, or one of its artifacts is missing.
    #[error("vectorstore not found at {path}")]
    StoreNotFound {
        /// Missing path.
        path: PathBuf,
    },

    /// The artifacts exist but cannot be used together.
    #[error("vectorstore corrupt at {path}: {reason}")]
    StoreCorrupt {
        /// Offending path.
        path: PathBuf,
        /// What failed.
        reason: String,
    },

    /// A generation with this build id was already written.
    #[error("generation already exists at {path}")]
    GenerationExists {
        /// Existing generation directory.
        path: PathBuf,
    },

    /// Index and chunk table sizes differ.
    #[error("index holds {vectors} vectors but {chunks} chunks were supplied")]
    LengthMismatch {
        /// Vectors in the index.
        vectors: usize,
        /// Chunk records.
        chunks: usize,
    },

    /// rkyv serialization failed.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Artifact I/O failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The embedder failed.
    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

impl VectorDbError {
    /// Maps a read failure on `path` into the load error taxonomy.
    pub(crate) fn from_read(path: &std::path::Path, err: MmapError) -> Self {
        match err {
            MmapError::Io(e) if e.kind() == std::io::ErrorKind::NotFound => {
                VectorDbError::StoreNotFound {
                    path: path.to_path_buf(),
                }
            }
            other => VectorDbError::StoreCorrupt {
                path: path.to_path_buf(),
                reason: other.to_string(),
            },
        }
    }
}
