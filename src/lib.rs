//! Ragcite library crate (used by the server binary and integration tests).
//!
//! Answers questions over a fixed document corpus with cited sources.
//!
//! # Pipeline
//!
//! ```text
//! ingest:  pages -> Chunker -> IndexBuilder (embed + flat L2 index) -> VectorStore on disk
//! query:   question -> AnswerCache -> Retriever (top-K) -> Reranker (top-N)
//!                   -> build_prompt -> CompletionClient -> AskResponse -> AnswerCache
//! ```
//!
//! ## Modules
//! - [`chunking`] - text cleaning and overlapping token windows
//! - [`embedding`] - sentence encoder and cross-encoder (model-backed or stub)
//! - [`storage`] - atomic artifact writes and mmap-backed rkyv reads
//! - [`vectordb`] - flat L2 index, persisted store, index builder
//! - [`retrieval`] - query-time nearest-chunk search
//! - [`scoring`] - cross-encoder reranking
//! - [`prompt`] - cited prompt assembly
//! - [`cache`] - answer cache keyed by question fingerprint
//! - [`completion`] - language-model client
//! - [`pipeline`] - request orchestration and response types
//! - [`gateway`] - HTTP transport
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod cache;
pub mod chunking;
pub mod completion;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod hashing;
pub mod pipeline;
pub mod prompt;
pub mod retrieval;
pub mod scoring;
pub mod storage;
pub mod vectordb;

pub use cache::{AnswerCache, CacheStatus, MemoryAnswerCache, RAGCITE_CACHE_HEADER};
pub use chunking::{Chunk, Chunker, ChunkerConfig, ChunkingError, ChunkTokenizer, Page, clean_text};
#[cfg(any(test, feature = "mock"))]
pub use completion::MockCompletionClient;
pub use completion::{CompletionClient, CompletionError, GenaiCompletionClient};
pub use config::{Config, ConfigError};
pub use constants::{
    DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE, DEFAULT_TOP_K, DEFAULT_TOP_N,
    DimValidationError, GENERIC_ERROR_MESSAGE, validate_embedding_dim,
};
pub use embedding::{
    CrossEncoder, Embedder, EmbeddingError, EncoderConfig, PairScorer, RerankerConfig,
    RerankerError, SentenceEncoder,
};
pub use gateway::{HandlerState, create_router_with_state};
pub use hashing::{cache_key, hash_question, normalize_question};
pub use pipeline::{
    AskOutcome, AskRequest, AskResponse, ErrorResponse, Orchestrator, PipelineError,
    RerankedSource, SourcePage,
};
pub use prompt::build_prompt;
pub use retrieval::Retriever;
pub use scoring::{Reranker, ScoredChunk, ScoringError};
pub use storage::{MmapFileHandle, StorageError};
pub use vectordb::{BuildSummary, FlatL2Index, IndexBuilder, SearchHit, VectorDbError, VectorStore};
