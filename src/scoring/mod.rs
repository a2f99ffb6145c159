//! Cross-encoder reranking of retrieved chunks.
//!
//! Vector distance picks the top-K candidates cheaply; [`Reranker`] then scores each
//! (question, chunk text) pair with a [`PairScorer`](crate::embedding::PairScorer) and keeps
//! the best top-N. The sort is stable, so equal scores keep their retrieval order and the
//! same input always yields the same output. NaN scores rank last.

pub mod error;
pub mod scorer;
pub mod types;


pub use error::ScoringError;
pub use scorer::{Reranker, sort_by_score};
pub use types::ScoredChunk;
