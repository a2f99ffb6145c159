use crate::chunking::Chunk;

#[derive(Debug, Clone, PartialEq)]
/// A retrieved chunk with its cross-encoder relevance score.
pub struct ScoredChunk {
    /// The candidate chunk.
    pub chunk: Chunk,
    /// Pairwise relevance; higher is more relevant. No fixed range.
    pub rerank_score: f32,
    /// Zero-based position in the retrieval order.
    pub retrieval_rank: usize,
}

impl ScoredChunk {
    pub fn new(chunk: Chunk, rerank_score: f32, retrieval_rank: usize) -> Self {
        Self {
            chunk,
            rerank_score,
            retrieval_rank,
        }
    }

    /// Source page of the chunk.
    pub fn page(&self) -> u32 {
        self.chunk.page_number
    }
}
