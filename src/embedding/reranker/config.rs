use std::path::PathBuf;

use crate::constants::DEFAULT_RERANKER_MAX_SEQ_LEN;

/// Configuration for [`CrossEncoder`](super::CrossEncoder).
#[derive(Debug, Clone)]
pub struct RerankerConfig {
    /// Cross-encoder export directory. `None` selects the lexical stub.
    pub model_path: Option<PathBuf>,
    /// Max tokens for one (query, passage) pair; the longer side is truncated first.
    pub max_seq_len: usize,
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            max_seq_len: DEFAULT_RERANKER_MAX_SEQ_LEN,
        }
    }
}

impl RerankerConfig {
    pub fn new<P: Into<PathBuf>>(model_path: P) -> Self {
        Self {
            model_path: Some(model_path.into()),
            ..Default::default()
        }
    }

    pub fn stub() -> Self {
        Self::default()
    }

    pub fn with_max_seq_len(mut self, max_seq_len: usize) -> Self {
        self.max_seq_len = max_seq_len;
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_seq_len == 0 {
            return Err("max_seq_len must be greater than zero".to_string());
        }

        if let Some(ref path) = self.model_path
            && path.as_os_str().is_empty()
        {
            return Err("model_path cannot be empty when provided".to_string());
        }

        Ok(())
    }
}
