//! Cross-cutting, shared constants.
//!
//! Prefer deriving secondary constants from primary ones to avoid drift.
//!
//! # Dimension Invariants
//!
//! The embedding dimension is a property of the embedding model, not of this crate. The
//! constant below is only the default for the bundled MiniLM-style encoder and the stub.
//! The persisted index records the dimension it was built with, and every query vector is
//! checked against it with [`validate_embedding_dim`].

/// Tokens per chunk window.
pub const DEFAULT_CHUNK_SIZE: usize = 500;

/// Tokens shared between consecutive windows.
pub const DEFAULT_CHUNK_OVERLAP: usize = 100;

/// Candidates returned by vector search.
pub const DEFAULT_TOP_K: usize = 5;

/// Candidates kept after reranking.
pub const DEFAULT_TOP_N: usize = 3;

/// Output dimension of `all-MiniLM-L6-v2` and of the stub encoder.
pub const DEFAULT_EMBEDDING_DIM: usize = 384;

/// Max tokens fed to the sentence encoder.
pub const DEFAULT_ENCODER_MAX_SEQ_LEN: usize = 256;

/// Max tokens fed to the cross-encoder for one (query, passage) pair.
pub const DEFAULT_RERANKER_MAX_SEQ_LEN: usize = 512;

/// Decimal places kept for `rerank_score` in responses.
pub const RERANK_SCORE_PRECISION: i32 = 3;

/// Decimal places kept for `latency_seconds` in responses.
pub const LATENCY_PRECISION: i32 = 2;

/// Error text returned to callers; the underlying detail is only logged.
pub const GENERIC_ERROR_MESSAGE: &str = "internal error occurred while processing the request";

/// Errors returned when a vector's dimension disagrees with the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DimValidationError {
    /// The dimension is zero.
    #[error("embedding dimension cannot be zero")]
    ZeroDimension,
    /// The dimension differs from the expected value.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    Mismatch {
        /// Dimension the index was built with.
        expected: usize,
        /// Dimension that was supplied.
        actual: usize,
    },
}

/// Checks that `actual` is a usable dimension equal to `expected`.
///
/// Mismatches fail fast; vectors are never padded or truncated to fit.
pub fn validate_embedding_dim(expected: usize, actual: usize) -> Result<(), DimValidationError> {
    if actual == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if expected != actual {
        return Err(DimValidationError::Mismatch { expected, actual });
    }
    Ok(())
}

/// Rounds `value` to `places` decimal places.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}
