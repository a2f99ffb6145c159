use thiserror::Error;

use crate::completion::CompletionError;
use crate::scoring::ScoringError;
use crate::vectordb::VectorDbError;

/// Any failure on the cache-miss path. Logged by the orchestrator, never returned to callers.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("retrieval failed: {0}")]
    Retrieval(#[from] VectorDbError),

    #[error("reranking failed: {0}")]
    Rerank(#[from] ScoringError),

    #[error("completion failed: {0}")]
    Completion(#[from] CompletionError),

    #[error("blocking task failed: {0}")]
    Task(String),
}
