//! Token codec used for chunk windowing.
//!
//! The model-backed codec wraps a HuggingFace `tokenizer.json`. The stub codec maps each
//! Unicode scalar to one token, which round-trips any slice exactly and needs no files.

use std::path::Path;
use std::sync::Arc;

use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use super::error::ChunkingError;
use crate::embedding::utils::load_tokenizer;

enum CodecBackend {
    Vocabulary(Arc<Tokenizer>),
    Chars,
}

/// Encodes text to token ids and decodes token windows back to text.
#[derive(Clone)]
pub struct ChunkTokenizer {
    backend: Arc<CodecBackend>,
}

impl std::fmt::Debug for ChunkTokenizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = match self.backend.as_ref() {
            CodecBackend::Vocabulary(_) => "vocabulary",
            CodecBackend::Chars => "stub",
        };
        f.debug_struct("ChunkTokenizer").field("mode", &mode).finish()
    }
}

impl ChunkTokenizer {
    /// Loads a vocabulary from `tokenizer.json` (or a directory containing it).
    ///
    /// Truncation and padding configured in the file are disabled; windowing needs the
    /// full token sequence.
    pub fn from_file(path: &Path) -> Result<Self, ChunkingError> {
        let mut tokenizer =
            load_tokenizer(path).map_err(|e| ChunkingError::TokenizerLoadFailed {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        tokenizer
            .with_truncation(None)
            .map_err(|e| ChunkingError::TokenizerLoadFailed {
                path: path.to_path_buf(),
                reason: format!("failed to disable truncation: {}", e),
            })?;
        tokenizer.with_padding(None);

        info!(path = %path.display(), "Chunk tokenizer loaded");

        Ok(Self {
            backend: Arc::new(CodecBackend::Vocabulary(Arc::new(tokenizer))),
        })
    }

    /// Char-level codec (one token per Unicode scalar). Lossless; for tests and model-less runs.
    pub fn stub() -> Self {
        Self {
            backend: Arc::new(CodecBackend::Chars),
        }
    }

    /// Loads from `path` when given, otherwise falls back to the stub codec.
    pub fn from_optional_path(path: Option<&Path>) -> Result<Self, ChunkingError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                warn!("No tokenizer configured, chunking with the char-level stub codec");
                Ok(Self::stub())
            }
        }
    }

    /// Returns `true` when running the char-level stub codec.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend.as_ref(), CodecBackend::Chars)
    }

    /// Encodes `text` without special tokens.
    pub fn encode(&self, text: &str) -> Result<Vec<u32>, ChunkingError> {
        match self.backend.as_ref() {
            CodecBackend::Vocabulary(tokenizer) => {
                let encoding = tokenizer.encode(text, false).map_err(|e| {
                    ChunkingError::TokenizationFailed {
                        reason: e.to_string(),
                    }
                })?;
                Ok(encoding.get_ids().to_vec())
            }
            CodecBackend::Chars => Ok(text.chars().map(u32::from).collect()),
        }
    }

    /// Decodes a token window back to text, skipping special tokens.
    pub fn decode(&self, ids: &[u32]) -> Result<String, ChunkingError> {
        match self.backend.as_ref() {
            CodecBackend::Vocabulary(tokenizer) => {
                tokenizer
                    .decode(ids, true)
                    .map_err(|e| ChunkingError::DecodeFailed {
                        reason: e.to_string(),
                    })
            }
            CodecBackend::Chars => {
                let text: String = ids.iter().filter_map(|&id| char::from_u32(id)).collect();
                if text.chars().count() != ids.len() {
                    debug!(
                        dropped = ids.len() - text.chars().count(),
                        "Dropped ids outside the Unicode scalar range"
                    );
                }
                Ok(text)
            }
        }
    }

    /// Number of tokens `text` encodes to.
    pub fn count(&self, text: &str) -> Result<usize, ChunkingError> {
        Ok(self.encode(text)?.len())
    }
}
