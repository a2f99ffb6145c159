use std::sync::Arc;

use super::*;
use crate::cache::{AnswerCache, CacheStatus, MemoryAnswerCache};
use crate::chunking::{Chunker, Page};
use crate::completion::MockCompletionClient;
use crate::constants::GENERIC_ERROR_MESSAGE;
use crate::embedding::{CrossEncoder, Embedder, PairScorer, RerankerError, SentenceEncoder};
use crate::hashing::cache_key;
use crate::retrieval::Retriever;
use crate::scoring::Reranker;
use crate::vectordb::IndexBuilder;

struct FixedScorer(f32);

impl PairScorer for FixedScorer {
    fn score_pairs(&self, _query: &str, passages: &[&str]) -> Result<Vec<f32>, RerankerError> {
        Ok(vec![self.0; passages.len()])
    }
}

struct FailingScorer;

impl PairScorer for FailingScorer {
    fn score_pairs(&self, _query: &str, _passages: &[&str]) -> Result<Vec<f32>, RerankerError> {
        Err(RerankerError::InferenceFailed {
            reason: "device lost".to_string(),
        })
    }
}

fn pages() -> Vec<Page> {
    vec![
        Page::new(1, "Amazon S3 is object storage. Buckets hold objects."),
        Page::new(2, "Amazon EC2 provides resizable compute capacity."),
        Page::new(3, "AWS IAM manages users, groups, roles and policies."),
        Page::new(4, "Amazon RDS runs managed relational databases."),
        Page::new(5, "Amazon VPC isolates your network."),
        Page::new(6, "AWS Lambda runs code without provisioning servers."),
        Page::new(7, "Amazon CloudWatch collects metrics and logs."),
    ]
}

fn retriever_over(pages: &[Page]) -> Retriever {
    let embedder: Arc<dyn Embedder> = Arc::new(SentenceEncoder::stub());
    let chunks = Chunker::stub().process_pages(pages).unwrap();
    let (store, _) = IndexBuilder::new(Arc::clone(&embedder)).build(chunks).unwrap();
    Retriever::new(Arc::new(store), embedder).unwrap()
}

fn orchestrator_with(
    scorer: Arc<dyn PairScorer>,
    completion: Arc<MockCompletionClient>,
) -> (Orchestrator<Arc<MockCompletionClient>>, Arc<MemoryAnswerCache>) {
    let cache = Arc::new(MemoryAnswerCache::new());
    let orchestrator = Orchestrator::new(
        retriever_over(&pages()),
        Reranker::new(scorer),
        completion,
        Arc::clone(&cache) as Arc<dyn AnswerCache>,
    );
    (orchestrator, cache)
}

fn orchestrator(
    completion: Arc<MockCompletionClient>,
) -> (Orchestrator<Arc<MockCompletionClient>>, Arc<MemoryAnswerCache>) {
    orchestrator_with(Arc::new(CrossEncoder::stub()), completion)
}

#[tokio::test]
async fn test_miss_then_hit() {
    let completion = Arc::new(MockCompletionClient::new("S3 stores objects [source 1 | page 1]."));
    let (orchestrator, cache) = orchestrator(Arc::clone(&completion));

    let first = orchestrator.ask("What is Amazon S3 object storage?").await;
    let first = first.answer().cloned().expect("first call answers");
    assert_eq!(first.cache, CacheStatus::Miss);
    assert_eq!(first.question, "What is Amazon S3 object storage?");
    assert_eq!(first.answer, "S3 stores objects [source 1 | page 1].");
    assert_eq!(completion.calls(), 1);

    let second = orchestrator.ask("  what is amazon s3 OBJECT storage?  ").await;
    let second = second.answer().cloned().expect("second call answers");
    assert_eq!(second.cache, CacheStatus::Hit);
    assert_eq!(second.answer, first.answer);
    assert_eq!(second.latency_seconds, first.latency_seconds);
    assert_eq!(second.sources, first.sources);
    assert_eq!(second.reranked_sources, first.reranked_sources);
    assert_eq!(completion.calls(), 1);

    let stored = cache.get(&cache_key("What is Amazon S3 object storage?")).unwrap();
    assert_eq!(stored.cache, CacheStatus::Miss);
}

#[tokio::test]
async fn test_prompt_uses_reranked_top_n() {
    let completion = Arc::new(MockCompletionClient::new("answer"));
    let (orchestrator, _) = orchestrator(Arc::clone(&completion));
    let orchestrator = orchestrator.with_top_k(5).with_top_n(3);

    let outcome = orchestrator.ask("Which service runs code without servers?").await;
    let response = outcome.answer().expect("answered");
    assert_eq!(response.sources.len(), 5);
    assert_eq!(response.reranked_sources.len(), 3);

    let scores: Vec<f64> = response
        .reranked_sources
        .iter()
        .map(|s| s.rerank_score)
        .collect();
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));

    let retrieved: Vec<u32> = response.sources.iter().map(|s| s.page).collect();
    assert!(response
        .reranked_sources
        .iter()
        .all(|s| retrieved.contains(&s.page)));

    let prompt = completion.last_prompt().unwrap();
    assert!(prompt.contains("Which service runs code without servers?"));
    for (i, source) in response.reranked_sources.iter().enumerate() {
        assert!(prompt.contains(&format!("[source {} | page {}]", i + 1, source.page)));
    }
    assert!(!prompt.contains("[source 4"));
    assert_eq!(response.reranked_sources[0].page, 6);
}

#[tokio::test]
async fn test_completion_failure_returns_generic_error() {
    let completion = Arc::new(MockCompletionClient::failing("401 unauthorized: key sk-123"));
    let (orchestrator, cache) = orchestrator(Arc::clone(&completion));

    let outcome = orchestrator.ask("What is IAM?").await;
    let AskOutcome::Failed(error) = &outcome else {
        panic!("expected failure, got {:?}", outcome);
    };
    assert_eq!(error.error, GENERIC_ERROR_MESSAGE);
    assert!(error.latency_seconds >= 0.0);

    let body = serde_json::to_value(&outcome).unwrap();
    assert!(body.get("answer").is_none());
    assert!(body.get("error").is_some());
    assert!(body.get("latency_seconds").is_some());
    assert!(!body.to_string().contains("sk-123"));

    assert!(cache.is_empty());

    // Failures are not cached; the next call runs the pipeline again.
    orchestrator.ask("What is IAM?").await;
    assert_eq!(completion.calls(), 2);
}

#[tokio::test]
async fn test_scorer_failure_returns_generic_error() {
    let completion = Arc::new(MockCompletionClient::new("unused"));
    let (orchestrator, cache) = orchestrator_with(Arc::new(FailingScorer), Arc::clone(&completion));

    let outcome = orchestrator.ask("What is RDS?").await;
    assert!(!outcome.is_answered());
    assert_eq!(outcome.cache_status(), None);
    assert_eq!(completion.calls(), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_rerank_scores_are_rounded() {
    let completion = Arc::new(MockCompletionClient::new("a"));
    let (orchestrator, _) = orchestrator_with(Arc::new(FixedScorer(0.123456)), completion);

    let outcome = orchestrator.ask("networks").await;
    let response = outcome.answer().expect("answered");
    assert!(!response.reranked_sources.is_empty());
    assert!(response
        .reranked_sources
        .iter()
        .all(|s| s.rerank_score == 0.123));
}

#[tokio::test]
async fn test_tied_scores_keep_retrieval_order() {
    let completion = Arc::new(MockCompletionClient::new("a"));
    let (orchestrator, _) = orchestrator_with(Arc::new(FixedScorer(1.0)), completion);

    let outcome = orchestrator.ask("Amazon compute capacity").await;
    let response = outcome.answer().expect("answered");
    let retrieved: Vec<u32> = response.sources.iter().map(|s| s.page).collect();
    let reranked: Vec<u32> = response.reranked_sources.iter().map(|s| s.page).collect();
    assert_eq!(reranked, retrieved[..reranked.len()]);
}

#[tokio::test]
async fn test_empty_store_answers_without_sources() {
    let completion = Arc::new(MockCompletionClient::new("I don't know"));
    let orchestrator = Orchestrator::new(
        retriever_over(&[]),
        Reranker::new(Arc::new(CrossEncoder::stub())),
        Arc::clone(&completion),
        Arc::new(MemoryAnswerCache::new()),
    );

    let outcome = orchestrator.ask("anything").await;
    let response = outcome.answer().expect("answered");
    assert!(response.sources.is_empty());
    assert!(response.reranked_sources.is_empty());
    assert!(!completion.last_prompt().unwrap().contains("[source"));
}

#[tokio::test]
async fn test_empty_question_is_not_an_error() {
    let completion = Arc::new(MockCompletionClient::new("I don't know"));
    let (orchestrator, _) = orchestrator(completion);

    let outcome = orchestrator.ask("").await;
    assert!(outcome.is_answered());
}

#[tokio::test]
async fn test_with_config_applies_limits() {
    let config = crate::config::Config {
        top_k: 2,
        top_n: 1,
        ..Default::default()
    };
    let completion = Arc::new(MockCompletionClient::new("a"));
    let (orchestrator, _) = orchestrator(completion);
    let orchestrator = orchestrator.with_config(&config);

    let outcome = orchestrator.ask("Amazon").await;
    let response = outcome.answer().expect("answered");
    assert_eq!(response.sources.len(), 2);
    assert_eq!(response.reranked_sources.len(), 1);
}

#[test]
fn test_answer_serializes_with_cache_marker() {
    let outcome = AskOutcome::Answered(AskResponse {
        question: "q".to_string(),
        answer: "a".to_string(),
        sources: vec![SourcePage { page: 2 }],
        reranked_sources: vec![RerankedSource {
            page: 2,
            rerank_score: 0.5,
        }],
        latency_seconds: 0.42,
        cache: CacheStatus::Miss,
    });
    let body = serde_json::to_value(&outcome).unwrap();
    assert_eq!(
        body,
        serde_json::json!({
            "question": "q",
            "answer": "a",
            "sources": [{"page": 2}],
            "reranked_sources": [{"page": 2, "rerank_score": 0.5}],
            "latency_seconds": 0.42,
            "cache": "miss"
        })
    );
}

#[test]
fn test_generic_error_rounds_latency() {
    let error = ErrorResponse::generic(1.23789);
    assert_eq!(error.latency_seconds, 1.24);
    assert_eq!(error.error, GENERIC_ERROR_MESSAGE);
    assert_eq!(ErrorResponse::generic(-0.5).latency_seconds, 0.0);
}

#[tokio::test]
async fn test_missing_store_is_per_request_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let embedder: Arc<dyn Embedder> = Arc::new(SentenceEncoder::stub());
    let completion = Arc::new(MockCompletionClient::new("S3 stores objects [source 1 | page 1]"));
    let cache = Arc::new(MemoryAnswerCache::new());
    let orchestrator = Orchestrator::new(
        Retriever::open_lazy(dir.path(), Arc::clone(&embedder)),
        Reranker::new(Arc::new(CrossEncoder::stub())),
        Arc::clone(&completion),
        Arc::clone(&cache) as Arc<dyn AnswerCache>,
    );

    let outcome = orchestrator.ask("What is S3?").await;
    let AskOutcome::Failed(error) = &outcome else {
        panic!("expected failure, got {:?}", outcome);
    };
    assert_eq!(error.error, GENERIC_ERROR_MESSAGE);
    assert!(error.latency_seconds >= 0.0);
    assert_eq!(completion.calls(), 0);
    assert!(cache.is_empty());

    let chunks = Chunker::stub().process_pages(&pages()).unwrap();
    IndexBuilder::new(embedder)
        .build_and_persist(chunks, dir.path())
        .unwrap();

    let outcome = orchestrator.ask("What is S3?").await;
    assert!(outcome.is_answered());
    assert_eq!(outcome.cache_status(), Some(CacheStatus::Miss));
}
