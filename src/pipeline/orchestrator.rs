use std::sync::Arc;
use std::time::Instant;

use tracing::{Instrument, debug, error, info, info_span};
use uuid::Uuid;

use super::error::PipelineError;
use super::types::{AskOutcome, AskResponse, ErrorResponse, RerankedSource, SourcePage};
use crate::cache::{AnswerCache, CacheStatus};
use crate::completion::CompletionClient;
use crate::config::Config;
use crate::constants::{DEFAULT_TOP_K, DEFAULT_TOP_N, LATENCY_PRECISION, round_to};
use crate::hashing::cache_key;
use crate::prompt::build_prompt;
use crate::retrieval::Retriever;
use crate::scoring::{Reranker, ScoredChunk};

/// Runs one question through cache, retrieval, reranking, prompt assembly and completion.
///
/// Owns the process-wide components; build it once at startup and share it.
pub struct Orchestrator<C> {
    retriever: Retriever,
    reranker: Reranker,
    completion: C,
    cache: Arc<dyn AnswerCache>,
    top_k: usize,
    top_n: usize,
}

impl<C> std::fmt::Debug for Orchestrator<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("retriever", &self.retriever)
            .field("reranker", &self.reranker)
            .field("cached_answers", &self.cache.len())
            .field("top_k", &self.top_k)
            .field("top_n", &self.top_n)
            .finish()
    }
}

impl<C: CompletionClient> Orchestrator<C> {
    pub fn new(
        retriever: Retriever,
        reranker: Reranker,
        completion: C,
        cache: Arc<dyn AnswerCache>,
    ) -> Self {
        Self {
            retriever,
            reranker,
            completion,
            cache,
            top_k: DEFAULT_TOP_K,
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    /// Applies `top_k` / `top_n` from `config`.
    pub fn with_config(self, config: &Config) -> Self {
        self.with_top_k(config.top_k).with_top_n(config.top_n)
    }

    pub fn retriever(&self) -> &Retriever {
        &self.retriever
    }

    pub fn reranker(&self) -> &Reranker {
        &self.reranker
    }

    pub fn completion(&self) -> &C {
        &self.completion
    }

    pub fn cache(&self) -> &Arc<dyn AnswerCache> {
        &self.cache
    }

    /// Answers `question`.
    ///
    /// A cached answer comes back as a copy marked `hit`. On a miss the full pipeline runs and
    /// a successful response is stored before it is returned. Any failure on the miss path
    /// yields [`ErrorResponse::generic`] with the elapsed latency; the cause is only logged.
    pub async fn ask(&self, question: &str) -> AskOutcome {
        let request_id = Uuid::new_v4();
        let span = info_span!("ask", %request_id);
        self.ask_inner(question).instrument(span).await
    }

    async fn ask_inner(&self, question: &str) -> AskOutcome {
        let start = Instant::now();
        let key = cache_key(question);

        if let Some(stored) = self.cache.get(&key) {
            info!(key = %&key[..12], "Cache hit");
            return AskOutcome::Answered(stored.as_hit());
        }

        info!(question, "Cache miss");
        match self.answer_miss(question, start).await {
            Ok(response) => {
                let response = Arc::new(response);
                self.cache.insert(key, Arc::clone(&response));
                AskOutcome::Answered(Arc::unwrap_or_clone(response))
            }
            Err(e) => {
                let latency = start.elapsed().as_secs_f64();
                error!(question, latency, error = %e, "Request failed");
                AskOutcome::Failed(ErrorResponse::generic(latency))
            }
        }
    }

    async fn answer_miss(
        &self,
        question: &str,
        start: Instant,
    ) -> Result<AskResponse, PipelineError> {
        let (sources, reranked) = self.retrieve_and_rerank(question).await?;

        info!(
            reranked = ?reranked
                .iter()
                .map(|s| (s.page(), s.rerank_score))
                .collect::<Vec<_>>(),
            "Reranked candidates"
        );

        let prompt = build_prompt(&reranked, question);
        debug!(prompt_chars = prompt.len(), blocks = reranked.len(), "Prompt assembled");

        let completion_start = Instant::now();
        let answer = self.completion.complete(&prompt).await?;
        info!(
            completion_latency = completion_start.elapsed().as_secs_f64(),
            "Completion finished"
        );

        let latency_seconds = round_to(start.elapsed().as_secs_f64(), LATENCY_PRECISION);
        info!(latency_seconds, "Answer ready");

        Ok(AskResponse {
            question: question.to_string(),
            answer,
            sources,
            reranked_sources: reranked.iter().map(RerankedSource::from).collect(),
            latency_seconds,
            cache: CacheStatus::Miss,
        })
    }

    /// Vector search and reranking run on the blocking pool.
    async fn retrieve_and_rerank(
        &self,
        question: &str,
    ) -> Result<(Vec<SourcePage>, Vec<ScoredChunk>), PipelineError> {
        let retriever = self.retriever.clone();
        let reranker = self.reranker.clone();
        let question = question.to_string();
        let (top_k, top_n) = (self.top_k, self.top_n);
        let span = tracing::Span::current();

        tokio::task::spawn_blocking(move || {
            let _entered = span.enter();
            let hits = retriever.search(&question, top_k)?;
            let sources: Vec<SourcePage> = hits.iter().map(SourcePage::from).collect();
            debug!(
                pages = ?sources.iter().map(|s| s.page).collect::<Vec<_>>(),
                "Retrieved pages"
            );

            let candidates = hits.into_iter().map(|hit| hit.chunk).collect();
            let reranked = reranker.rerank(&question, candidates, top_n)?;
            Ok::<_, PipelineError>((sources, reranked))
        })
        .await
        .map_err(|e| PipelineError::Task(e.to_string()))?
    }
}
