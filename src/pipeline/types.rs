use serde::{Deserialize, Serialize};

use crate::cache::CacheStatus;
use crate::constants::{GENERIC_ERROR_MESSAGE, LATENCY_PRECISION, RERANK_SCORE_PRECISION, round_to};
use crate::scoring::ScoredChunk;
use crate::vectordb::SearchHit;

/// Body of `POST /ask`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

/// A retrieved page, in retrieval order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePage {
    pub page: u32,
}

/// A reranked page with its rounded relevance score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankedSource {
    pub page: u32,
    pub rerank_score: f64,
}

impl From<&SearchHit> for SourcePage {
    fn from(hit: &SearchHit) -> Self {
        Self {
            page: hit.chunk.page_number,
        }
    }
}

impl From<&ScoredChunk> for RerankedSource {
    fn from(scored: &ScoredChunk) -> Self {
        Self {
            page: scored.page(),
            rerank_score: round_to(f64::from(scored.rerank_score), RERANK_SCORE_PRECISION),
        }
    }
}

/// A completed answer. Stored in the answer cache as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub question: String,
    pub answer: String,
    pub sources: Vec<SourcePage>,
    pub reranked_sources: Vec<RerankedSource>,
    pub latency_seconds: f64,
    pub cache: CacheStatus,
}

impl AskResponse {
    /// Copy of this response marked as served from cache. Latency is the original's.
    pub fn as_hit(&self) -> Self {
        Self {
            cache: CacheStatus::Hit,
            ..self.clone()
        }
    }
}

/// Uniform failure payload. Carries no detail about the cause.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub latency_seconds: f64,
}

impl ErrorResponse {
    pub fn generic(latency_seconds: f64) -> Self {
        Self {
            error: GENERIC_ERROR_MESSAGE.to_string(),
            latency_seconds: round_to(latency_seconds.max(0.0), LATENCY_PRECISION),
        }
    }
}

/// Result of one `ask`: an answer or the generic error.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AskOutcome {
    Answered(AskResponse),
    Failed(ErrorResponse),
}

impl AskOutcome {
    pub fn is_answered(&self) -> bool {
        matches!(self, AskOutcome::Answered(_))
    }

    pub fn latency_seconds(&self) -> f64 {
        match self {
            AskOutcome::Answered(r) => r.latency_seconds,
            AskOutcome::Failed(e) => e.latency_seconds,
        }
    }

    pub fn cache_status(&self) -> Option<CacheStatus> {
        match self {
            AskOutcome::Answered(r) => Some(r.cache),
            AskOutcome::Failed(_) => None,
        }
    }

    pub fn answer(&self) -> Option<&AskResponse> {
        match self {
            AskOutcome::Answered(r) => Some(r),
            AskOutcome::Failed(_) => None,
        }
    }
}
