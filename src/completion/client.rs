use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use tracing::{debug, instrument};

use super::{CompletionClient, CompletionError};
use crate::config::{Config, DEFAULT_LLM_MODEL, DEFAULT_SYSTEM_PROMPT};

/// Chat-completion client over [`genai`].
///
/// Sends the system prompt and the assembled prompt as a two-message chat. Provider
/// credentials come from the environment, as `genai` resolves them per model.
#[derive(Clone)]
pub struct GenaiCompletionClient {
    client: Client,
    model: String,
    temperature: f64,
    system_prompt: String,
    mock_provider: bool,
}

impl std::fmt::Debug for GenaiCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiCompletionClient")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("mock_provider", &self.mock_provider)
            .finish()
    }
}

impl GenaiCompletionClient {
    pub fn new(model: impl Into<String>, temperature: f64, system_prompt: impl Into<String>) -> Self {
        Self {
            client: Client::default(),
            model: model.into(),
            temperature,
            system_prompt: system_prompt.into(),
            mock_provider: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.llm_model.clone(),
            config.llm_temperature,
            config.system_prompt.clone(),
        )
        .with_mock_provider(config.mock_provider)
    }

    /// Answers locally with a deterministic placeholder instead of calling the provider.
    pub fn with_mock_provider(mut self, mock_provider: bool) -> Self {
        self.mock_provider = mock_provider;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_mock_provider(&self) -> bool {
        self.mock_provider
    }

    fn chat_request(&self, prompt: &str) -> ChatRequest {
        ChatRequest::new(vec![
            ChatMessage::system(self.system_prompt.clone()),
            ChatMessage::user(prompt.to_string()),
        ])
    }
}

impl Default for GenaiCompletionClient {
    fn default() -> Self {
        Self::new(DEFAULT_LLM_MODEL, 0.2, DEFAULT_SYSTEM_PROMPT)
    }
}

impl CompletionClient for GenaiCompletionClient {
    #[instrument(skip(self, prompt), fields(model = %self.model, prompt_chars = prompt.len()))]
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        if self.mock_provider {
            debug!("Mock provider enabled - returning mock completion");
            return Ok(mock_completion(prompt));
        }

        let options = ChatOptions::default().with_temperature(self.temperature);
        let response = self
            .client
            .exec_chat(&self.model, self.chat_request(prompt), Some(&options))
            .await
            .map_err(|e| CompletionError::Provider {
                model: self.model.clone(),
                message: e.to_string(),
            })?;

        let text = response
            .first_text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CompletionError::EmptyResponse {
                model: self.model.clone(),
            })?;

        debug!(answer_chars = text.len(), "Completion received");
        Ok(text.to_string())
    }
}

/// Placeholder answer keyed to the prompt, citing the first source.
pub fn mock_completion(prompt: &str) -> String {
    let digest = blake3::hash(prompt.as_bytes()).to_hex();
    format!("Mock response [source 1] ({})", &digest[..12])
}
