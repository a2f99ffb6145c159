//! Page text → overlapping token windows.
//!
//! Text is cleaned once ([`clean_text`]), tokenized, and cut into windows of at most
//! `size` tokens whose starts advance by `size - overlap`. Each window is decoded back
//! to text and tagged with its page number and a zero-based index within the page.

mod error;
pub mod tokenizer;


pub use error::ChunkingError;
pub use tokenizer::ChunkTokenizer;

use std::ops::Range;

use rkyv::{Archive, Deserialize as RkyvDeserialize, Serialize as RkyvSerialize};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::constants::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

/// One page of extracted source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based physical page number.
    #[serde(alias = "page")]
    pub page_number: u32,
    /// Raw extracted text.
    #[serde(alias = "raw_text")]
    pub text: String,
}

impl Page {
    /// Creates a page.
    pub fn new(page_number: u32, text: impl Into<String>) -> Self {
        Self {
            page_number,
            text: text.into(),
        }
    }
}

/// A token-bounded window of page text.
///
/// Stored in the persisted metadata table at the same position as its vector.
#[derive(
    Archive, RkyvSerialize, RkyvDeserialize, Serialize, Deserialize, Debug, Clone, PartialEq, Eq,
)]
pub struct Chunk {
    /// Source page.
    pub page_number: u32,
    /// Zero-based sequence number within the page.
    pub chunk_index: u32,
    /// Decoded window text.
    pub text: String,
}

/// Window parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkerConfig {
    /// Max tokens per window.
    pub size: usize,
    /// Tokens shared by consecutive windows. Must be smaller than `size`.
    pub overlap: usize,
}

impl Default for ChunkerConfig {
    fn default() -> Self {
        Self {
            size: DEFAULT_CHUNK_SIZE,
            overlap: DEFAULT_CHUNK_OVERLAP,
        }
    }
}

impl ChunkerConfig {
    /// Creates a config with explicit window size and overlap.
    pub fn new(size: usize, overlap: usize) -> Self {
        Self { size, overlap }
    }

    /// Tokens the window start advances by. Zero for configs that fail [`validate`](Self::validate).
    #[inline]
    pub fn stride(&self) -> usize {
        self.size.saturating_sub(self.overlap)
    }

    /// Rejects parameters under which the window loop would never advance.
    pub fn validate(&self) -> Result<(), ChunkingError> {
        if self.size == 0 {
            return Err(ChunkingError::InvalidConfig {
                reason: "size must be greater than zero".to_string(),
            });
        }
        if self.overlap >= self.size {
            return Err(ChunkingError::InvalidConfig {
                reason: format!(
                    "overlap ({}) must be smaller than size ({})",
                    self.overlap, self.size
                ),
            });
        }
        Ok(())
    }
}

/// Collapses every whitespace run (newlines included) to one space and trims the ends.
///
/// Idempotent: `clean_text(&clean_text(s)) == clean_text(s)`.
pub fn clean_text(text: &str) -> String {
    let mut cleaned = String::with_capacity(text.len());
    for word in text.split_whitespace() {
        if !cleaned.is_empty() {
            cleaned.push(' ');
        }
        cleaned.push_str(word);
    }
    cleaned
}

/// Token ranges for a sequence of `token_count` tokens.
///
/// Starts at 0 and advances by `size - overlap` until the start reaches the end. The
/// final window may be shorter than `size`. Zero tokens yield zero windows.
///
/// Fails on configs that [`ChunkerConfig::validate`] rejects.
pub fn window_ranges(
    token_count: usize,
    config: ChunkerConfig,
) -> Result<Vec<Range<usize>>, ChunkingError> {
    config.validate()?;
    Ok((0..token_count)
        .step_by(config.stride())
        .map(|start| start..(start + config.size).min(token_count))
        .collect())
}

/// Splits cleaned page text into token windows.
#[derive(Debug, Clone)]
pub struct Chunker {
    tokenizer: ChunkTokenizer,
    config: ChunkerConfig,
}

impl Chunker {
    /// Creates a chunker, validating the window parameters.
    pub fn new(tokenizer: ChunkTokenizer, config: ChunkerConfig) -> Result<Self, ChunkingError> {
        config.validate()?;
        Ok(Self { tokenizer, config })
    }

    /// Default windows over the char-level stub codec.
    pub fn stub() -> Self {
        Self {
            tokenizer: ChunkTokenizer::stub(),
            config: ChunkerConfig::default(),
        }
    }

    /// Returns the window parameters.
    pub fn config(&self) -> ChunkerConfig {
        self.config
    }

    /// Returns the token codec.
    pub fn tokenizer(&self) -> &ChunkTokenizer {
        &self.tokenizer
    }

    /// Cleans `text` and returns its windows in order.
    pub fn chunk(&self, text: &str) -> Result<Vec<String>, ChunkingError> {
        let cleaned = clean_text(text);
        let tokens = self.tokenizer.encode(&cleaned)?;

        window_ranges(tokens.len(), self.config)?
            .into_iter()
            .map(|range| self.tokenizer.decode(&tokens[range]))
            .collect()
    }

    /// Chunks one page, tagging each window with the page number and its index.
    pub fn chunk_page(&self, page: &Page) -> Result<Vec<Chunk>, ChunkingError> {
        let windows = self.chunk(&page.text)?;
        Ok(windows
            .into_iter()
            .enumerate()
            .map(|(i, text)| Chunk {
                page_number: page.page_number,
                chunk_index: i as u32,
                text,
            })
            .collect())
    }

    /// Chunks every page in order. Pages with no text after trimming are skipped.
    pub fn process_pages(&self, pages: &[Page]) -> Result<Vec<Chunk>, ChunkingError> {
        let mut all_chunks = Vec::new();
        let mut skipped = 0usize;

        for page in pages {
            if page.text.trim().is_empty() {
                skipped += 1;
                continue;
            }

            let chunks = self.chunk_page(page)?;
            debug!(
                page = page.page_number,
                chunks = chunks.len(),
                "Chunked page"
            );
            all_chunks.extend(chunks);
        }

        info!(
            pages = pages.len(),
            skipped,
            chunks = all_chunks.len(),
            size = self.config.size,
            overlap = self.config.overlap,
            "Chunking complete"
        );

        Ok(all_chunks)
    }
}
