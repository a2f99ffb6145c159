use std::path::PathBuf;
use thiserror::Error;

/// Errors returned while turning page text into chunks.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// Window parameters cannot make progress.
    #[error("invalid chunker configuration: {reason}")]
    InvalidConfig { reason: String },

    /// The tokenizer file could not be loaded.
    #[error("failed to load chunk tokenizer from {path}: {reason}")]
    TokenizerLoadFailed { path: PathBuf, reason: String },

    /// Encoding text into tokens failed.
    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    /// Decoding a token window back to text failed.
    #[error("failed to decode token window: {reason}")]
    DecodeFailed { reason: String },
}
