use std::sync::Arc;

use tracing::debug;

use crate::chunking::Chunk;
use crate::embedding::PairScorer;

use super::error::ScoringError;
use super::types::ScoredChunk;

/// Second-pass ranking of retrieved chunks with a pairwise scorer.
#[derive(Clone)]
pub struct Reranker {
    scorer: Arc<dyn PairScorer>,
}

impl std::fmt::Debug for Reranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reranker")
            .field("stub", &self.scorer.is_stub())
            .finish()
    }
}

impl Reranker {
    pub fn new(scorer: Arc<dyn PairScorer>) -> Self {
        Self { scorer }
    }

    pub fn is_stub(&self) -> bool {
        self.scorer.is_stub()
    }

    /// Scores every candidate against `question`, keeping retrieval order.
    pub fn score_candidates(
        &self,
        question: &str,
        candidates: Vec<Chunk>,
    ) -> Result<Vec<ScoredChunk>, ScoringError> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let texts: Vec<&str> = candidates.iter().map(|c| c.text.as_str()).collect();
        let scores = self.scorer.score_pairs(question, &texts)?;
        if scores.len() != candidates.len() {
            return Err(ScoringError::ScoreCountMismatch {
                expected: candidates.len(),
                actual: scores.len(),
            });
        }

        Ok(candidates
            .into_iter()
            .zip(scores)
            .enumerate()
            .map(|(rank, (chunk, score))| {
                let score = if score.is_nan() { f32::NEG_INFINITY } else { score };
                ScoredChunk::new(chunk, score, rank)
            })
            .collect())
    }

    /// Up to `top_n` candidates by descending score. Ties keep retrieval order.
    pub fn rerank(
        &self,
        question: &str,
        candidates: Vec<Chunk>,
        top_n: usize,
    ) -> Result<Vec<ScoredChunk>, ScoringError> {
        if top_n == 0 {
            return Ok(Vec::new());
        }

        let mut scored = self.score_candidates(question, candidates)?;
        sort_by_score(&mut scored);
        scored.truncate(top_n);

        debug!(
            kept = scored.len(),
            top_score = scored.first().map(|s| s.rerank_score),
            "Reranking complete"
        );
        Ok(scored)
    }
}

/// Stable descending sort on `rerank_score`.
pub fn sort_by_score(scored: &mut [ScoredChunk]) {
    scored.sort_by(|a, b| b.rerank_score.total_cmp(&a.rerank_score));
}
