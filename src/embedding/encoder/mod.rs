//! Sentence encoder: BERT hidden states, mean-pooled over real tokens and L2-normalized.
//!
//! Use [`EncoderConfig::stub`] for tests and model-less runs. The stub hashes lowercase
//! words into signed buckets, so texts sharing words land close together.

/// Encoder configuration.
pub mod config;
mod pool;


pub use config::EncoderConfig;
pub use pool::masked_mean_l2;

use candle_core::{Device, Tensor};
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use super::Embedder;
use crate::embedding::bert::BertEncoder;
use crate::embedding::device::{device_label, select_device};
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::load_tokenizer_for_batches;

enum EncoderBackend {
    Model {
        model: BertEncoder,
        tokenizer: Tokenizer,
        device: Device,
    },
    Stub,
}

/// Text → unit-length embedding vector.
pub struct SentenceEncoder {
    backend: EncoderBackend,
    config: EncoderConfig,
    embedding_dim: usize,
}

impl std::fmt::Debug for SentenceEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let backend = match &self.backend {
            EncoderBackend::Model { device, .. } => format!("Model({})", device_label(device)),
            EncoderBackend::Stub => "Stub".to_string(),
        };
        f.debug_struct("SentenceEncoder")
            .field("backend", &backend)
            .field("embedding_dim", &self.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEncoder {
    /// Loads the model named by `config`, or the stub when no model path is set.
    pub fn load(config: EncoderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        let Some(model_path) = config.model_path.clone() else {
            warn!(
                embedding_dim = config.embedding_dim,
                "No embedding model configured, encoder running in STUB mode"
            );
            return Ok(Self::stub_with(config));
        };

        if !model_path.is_dir() {
            return Err(EmbeddingError::ModelNotFound { path: model_path });
        }
        for required in ["config.json", "model.safetensors"] {
            if !model_path.join(required).exists() {
                return Err(EmbeddingError::ModelLoadFailed {
                    reason: format!("missing {} in {}", required, model_path.display()),
                });
            }
        }

        let device = select_device()?;
        debug!(device = device_label(&device), "Selected compute device for encoder");

        let model = BertEncoder::load(&model_path, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("failed to load BERT encoder: {}", e),
            }
        })?;
        let tokenizer = load_tokenizer_for_batches(&model_path, config.max_seq_len).map_err(
            |e| EmbeddingError::TokenizationFailed {
                reason: format!("failed to load tokenizer: {}", e),
            },
        )?;

        let embedding_dim = model.hidden_size();
        info!(
            model_path = %model_path.display(),
            embedding_dim,
            max_seq_len = config.max_seq_len,
            "Sentence encoder loaded"
        );

        Ok(Self {
            backend: EncoderBackend::Model {
                model,
                tokenizer,
                device,
            },
            config,
            embedding_dim,
        })
    }

    /// Stub encoder with the default dimension.
    pub fn stub() -> Self {
        Self::stub_with(EncoderConfig::stub())
    }

    fn stub_with(config: EncoderConfig) -> Self {
        Self {
            backend: EncoderBackend::Stub,
            embedding_dim: config.embedding_dim,
            config,
        }
    }

    pub fn config(&self) -> &EncoderConfig {
        &self.config
    }

    fn encode_with_model(
        &self,
        texts: &[&str],
        model: &BertEncoder,
        tokenizer: &Tokenizer,
        device: &Device,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let encodings = tokenizer.encode_batch(texts.to_vec(), true).map_err(|e| {
            EmbeddingError::TokenizationFailed {
                reason: e.to_string(),
            }
        })?;

        let batch = encodings.len();
        let seq_len = encodings.first().map_or(0, |e| e.get_ids().len());
        if seq_len == 0 {
            return Ok(vec![vec![0.0; self.embedding_dim]; batch]);
        }

        let mut ids = Vec::with_capacity(batch * seq_len);
        let mut mask = Vec::with_capacity(batch * seq_len);
        for encoding in &encodings {
            ids.extend_from_slice(encoding.get_ids());
            mask.extend_from_slice(encoding.get_attention_mask());
        }

        let input_ids = Tensor::from_vec(ids, (batch, seq_len), device)?;
        let attention_mask = Tensor::from_vec(mask, (batch, seq_len), device)?;
        let token_type_ids = input_ids.zeros_like()?;

        debug!(batch, seq_len, "Encoder forward pass");

        let hidden = model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("encoder forward pass failed: {}", e),
            })?;

        let pooled = masked_mean_l2(&hidden, &attention_mask)?;
        Ok(pooled.to_vec2::<f32>()?)
    }

    fn embed_stub(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.embedding_dim];

        let lowered = text.to_lowercase();
        for word in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let digest = blake3::hash(word.as_bytes());
            let bytes = digest.as_bytes();
            let bucket = u64::from_le_bytes([
                bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
            ]) as usize
                % self.embedding_dim;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
            embedding[bucket] += sign;
        }

        let norm = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut embedding {
                *x /= norm;
            }
        }
        embedding
    }
}

impl Embedder for SentenceEncoder {
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let vectors = match &self.backend {
            EncoderBackend::Model {
                model,
                tokenizer,
                device,
            } => {
                let mut vectors = Vec::with_capacity(texts.len());
                for batch in texts.chunks(self.config.batch_size) {
                    vectors.extend(self.encode_with_model(batch, model, tokenizer, device)?);
                }
                vectors
            }
            EncoderBackend::Stub => texts.iter().map(|t| self.embed_stub(t)).collect(),
        };

        if vectors.len() != texts.len() {
            return Err(EmbeddingError::BatchSizeMismatch {
                expected: texts.len(),
                actual: vectors.len(),
            });
        }
        Ok(vectors)
    }

    fn embedding_dim(&self) -> usize {
        self.embedding_dim
    }

    fn is_stub(&self) -> bool {
        matches!(self.backend, EncoderBackend::Stub)
    }
}
