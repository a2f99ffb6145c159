use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::VectorDbError;
use super::flat::FlatL2Index;
use super::store::VectorStore;
use crate::chunking::Chunk;
use crate::embedding::{Embedder, EmbeddingError};
use crate::hashing::hash_corpus;

/// Chunks embedded per encoder call.
pub const DEFAULT_BUILD_BATCH_SIZE: usize = 64;

/// What a build produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuildSummary {
    /// Vectors in the index.
    pub vector_count: usize,
    /// Records in the chunk table.
    pub chunk_count: usize,
    /// Vector dimension.
    pub dimension: usize,
    /// Identifier stamped into both artifacts.
    pub build_id: String,
}

/// Embeds chunks and assembles them into a [`VectorStore`].
pub struct IndexBuilder {
    embedder: Arc<dyn Embedder>,
    batch_size: usize,
}

impl IndexBuilder {
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self {
            embedder,
            batch_size: DEFAULT_BUILD_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Builds an in-memory store. Vector `i` is the embedding of `chunks[i]`.
    pub fn build(&self, chunks: Vec<Chunk>) -> Result<(VectorStore, BuildSummary), VectorDbError> {
        let dimension = self.embedder.embedding_dim();
        let mut index = FlatL2Index::new(dimension)?;

        for (batch_no, batch) in chunks.chunks(self.batch_size).enumerate() {
            let texts: Vec<&str> = batch.iter().map(|c| c.text.as_str()).collect();
            let vectors = self.embedder.embed_batch(&texts)?;
            if vectors.len() != texts.len() {
                return Err(EmbeddingError::BatchSizeMismatch {
                    expected: texts.len(),
                    actual: vectors.len(),
                }
                .into());
            }
            index.add_all(&vectors)?;
            debug!(
                batch = batch_no,
                embedded = index.len(),
                total = chunks.len(),
                "Embedded batch"
            );
        }

        let build_id = make_build_id(&chunks);
        let summary = BuildSummary {
            vector_count: index.len(),
            chunk_count: chunks.len(),
            dimension,
            build_id: build_id.clone(),
        };
        let store = VectorStore::new(index, chunks, build_id)?;

        info!(
            vectors = summary.vector_count,
            dimension = summary.dimension,
            build_id = %summary.build_id,
            "Index built"
        );
        Ok((store, summary))
    }

    /// Builds and publishes the store under `root`. Nothing is published if any step fails.
    pub fn build_and_persist(
        &self,
        chunks: Vec<Chunk>,
        root: &Path,
    ) -> Result<(VectorStore, BuildSummary), VectorDbError> {
        let (store, summary) = self.build(chunks)?;
        store.persist(root)?;
        Ok((store, summary))
    }
}

/// `<utc timestamp, microseconds>-<corpus fingerprint prefix>`.
fn make_build_id(chunks: &[Chunk]) -> String {
    let fingerprint = hash_corpus(
        chunks
            .iter()
            .map(|c| (c.page_number, c.chunk_index, c.text.as_str())),
    );
    let hex: String = fingerprint[..6].iter().map(|b| format!("{:02x}", b)).collect();
    format!("{}-{}", chrono::Utc::now().format("%Y%m%dT%H%M%S%6fZ"), hex)
}
