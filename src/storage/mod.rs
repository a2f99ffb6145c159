//! Artifact storage: atomic writes and mmap-backed rkyv reads.

pub mod error;
pub mod mmap;
pub mod writer;

pub use error::StorageError;
pub use mmap::{MmapError, MmapFileHandle};
pub use writer::{DirectoryWriter, StorageWriter, write_atomic};
