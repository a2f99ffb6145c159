pub mod config;
pub mod error;


pub use config::RerankerConfig;
pub use error::RerankerError;

use std::collections::HashSet;

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use super::PairScorer;
use crate::embedding::bert::BertClassifier;
use crate::embedding::device::{device_label, select_device};
use crate::embedding::utils::load_tokenizer_for_batches;

const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "do", "does", "did", "can",
    "could", "should", "would", "will", "to", "of", "in", "for", "on", "with", "at", "by",
    "from", "as", "into", "and", "or", "but", "if", "not", "no", "so", "than", "then", "what",
    "which", "who", "whom", "when", "where", "why", "how", "this", "that", "these", "those",
    "it", "its", "i", "you", "my", "your", "me",
];

/// Cross-encoder relevance scorer for (query, passage) pairs.
///
/// With a model loaded, the score is the raw relevance logit. The stub returns a lexical
/// overlap score in `[0, 1]`.
pub struct CrossEncoder {
    device: Device,
    config: RerankerConfig,
    model: Option<(BertClassifier, Tokenizer)>,
}

impl std::fmt::Debug for CrossEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CrossEncoder")
            .field("device", &device_label(&self.device))
            .field("config", &self.config)
            .field("model_loaded", &self.is_model_loaded())
            .finish()
    }
}

impl CrossEncoder {
    pub fn load(config: RerankerConfig) -> Result<Self, RerankerError> {
        if let Err(reason) = config.validate() {
            return Err(RerankerError::InvalidConfig { reason });
        }

        let Some(model_path) = config.model_path.clone() else {
            warn!("No reranker model configured, scoring with the lexical stub");
            return Ok(Self {
                device: Device::Cpu,
                config,
                model: None,
            });
        };

        for required in ["config.json", "model.safetensors"] {
            if !model_path.join(required).exists() {
                return Err(RerankerError::ModelLoadFailed {
                    reason: format!("missing {} in {}", required, model_path.display()),
                });
            }
        }

        let device = select_device()?;
        debug!(device = device_label(&device), "Selected compute device for reranker");

        let model = BertClassifier::load(&model_path, &device).map_err(|e| {
            RerankerError::ModelLoadFailed {
                reason: format!("failed to load BERT classifier: {}", e),
            }
        })?;
        let tokenizer =
            load_tokenizer_for_batches(&model_path, config.max_seq_len).map_err(|e| {
                RerankerError::ModelLoadFailed {
                    reason: format!("failed to load tokenizer: {}", e),
                }
            })?;

        info!(
            model_path = %model_path.display(),
            max_seq_len = config.max_seq_len,
            "Cross-encoder loaded"
        );

        Ok(Self {
            device,
            config,
            model: Some((model, tokenizer)),
        })
    }

    /// Lexical stub scorer.
    pub fn stub() -> Self {
        Self {
            device: Device::Cpu,
            config: RerankerConfig::stub(),
            model: None,
        }
    }

    /// Scores one pair.
    pub fn score(&self, query: &str, passage: &str) -> Result<f32, RerankerError> {
        self.score_pairs(query, &[passage])?
            .pop()
            .ok_or(RerankerError::ScoreCountMismatch {
                expected: 1,
                actual: 0,
            })
    }

    pub fn is_model_loaded(&self) -> bool {
        self.model.is_some()
    }

    pub fn config(&self) -> &RerankerConfig {
        &self.config
    }

    fn score_with_model(
        &self,
        query: &str,
        passages: &[&str],
        model: &BertClassifier,
        tokenizer: &Tokenizer,
    ) -> Result<Vec<f32>, RerankerError> {
        let pairs: Vec<(&str, &str)> = passages.iter().map(|p| (query, *p)).collect();
        let encodings = tokenizer.encode_batch(pairs, true).map_err(|e| {
            RerankerError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let batch = encodings.len();
        let seq_len = encodings.first().map_or(0, |e| e.get_ids().len());

        let mut ids = Vec::with_capacity(batch * seq_len);
        let mut type_ids = Vec::with_capacity(batch * seq_len);
        let mut mask = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            ids.extend_from_slice(encoding.get_ids());
            type_ids.extend_from_slice(encoding.get_type_ids());
            mask.extend_from_slice(encoding.get_attention_mask());
        }

        let input_ids = Tensor::from_vec(ids, (batch, seq_len), &self.device)?;
        let token_type_ids = Tensor::from_vec(type_ids, (batch, seq_len), &self.device)?;
        let attention_mask = Tensor::from_vec(mask, (batch, seq_len), &self.device)?;

        let logits = model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(|e| RerankerError::InferenceFailed {
                reason: e.to_string(),
            })?;

        Ok(logits.flatten_all()?.to_vec1::<f32>()?)
    }

    fn lexical_score(query: &str, passage: &str) -> f32 {
        fn terms(text: &str) -> HashSet<String> {
            text.to_lowercase()
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| !w.is_empty() && !STOP_WORDS.contains(w))
                .map(str::to_string)
                .collect()
        }

        let query_terms = terms(query);
        if query_terms.is_empty() {
            return 0.0;
        }
        let passage_terms = terms(passage);

        let matches = query_terms.intersection(&passage_terms).count();
        let union = query_terms.union(&passage_terms).count();
        let recall = matches as f32 / query_terms.len() as f32;
        let jaccard = matches as f32 / union.max(1) as f32;

        (0.8 * recall + 0.2 * jaccard).clamp(0.0, 1.0)
    }
}

impl PairScorer for CrossEncoder {
    fn score_pairs(&self, query: &str, passages: &[&str]) -> Result<Vec<f32>, RerankerError> {
        if passages.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            query_len = query.len(),
            passages = passages.len(),
            model_loaded = self.is_model_loaded(),
            "Scoring passages"
        );

        let scores = match &self.model {
            Some((model, tokenizer)) => self.score_with_model(query, passages, model, tokenizer)?,
            None => passages
                .iter()
                .map(|p| Self::lexical_score(query, p))
                .collect(),
        };

        if scores.len() != passages.len() {
            return Err(RerankerError::ScoreCountMismatch {
                expected: passages.len(),
                actual: scores.len(),
            });
        }
        Ok(scores)
    }

    fn is_stub(&self) -> bool {
        !self.is_model_loaded()
    }
}
