//! Embedding and pairwise-scoring models.
//!
//! - [`encoder`] turns text into vectors for the index and for queries.
//! - [`reranker`] scores (query, passage) pairs for [`crate::scoring`].
//!
//! Both are injected into their consumers as trait objects ([`Embedder`], [`PairScorer`])
//! so the process owns one instance of each, and tests can swap in the stub backends.

/// BERT encoder and classifier wrappers.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
/// Sentence encoder (mean-pooled BERT).
pub mod encoder;
mod error;
/// Cross-encoder pair scorer.
pub mod reranker;
/// Tokenizer loading helpers.
pub mod utils;

pub use encoder::{EncoderConfig, SentenceEncoder};
pub use error::EmbeddingError;
pub use reranker::{CrossEncoder, RerankerConfig, RerankerError};

/// Maps text to fixed-dimension vectors.
///
/// Every vector returned by one instance has length [`Embedder::embedding_dim`].
pub trait Embedder: Send + Sync {
    /// Embeds each text, preserving order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// Output dimension.
    fn embedding_dim(&self) -> usize;

    /// Embeds a single text.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(&[text])?
            .pop()
            .ok_or(EmbeddingError::BatchSizeMismatch {
                expected: 1,
                actual: 0,
            })
    }

    /// Returns `true` for deterministic test backends.
    fn is_stub(&self) -> bool {
        false
    }
}

/// Scores how relevant each passage is to a query. Higher is more relevant.
pub trait PairScorer: Send + Sync {
    /// Returns one score per passage, in input order.
    fn score_pairs(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>, RerankerError>;

    /// Returns `true` for deterministic test backends.
    fn is_stub(&self) -> bool {
        false
    }
}
