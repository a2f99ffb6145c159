use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;

use super::{CompletionClient, CompletionError};

/// Scripted completion client for tests.
///
/// Answers with a fixed text (or fails), counts calls and remembers the last prompt.
#[derive(Debug, Default)]
pub struct MockCompletionClient {
    answer: Option<String>,
    failure: Option<String>,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockCompletionClient {
    /// Answers every prompt with `answer`.
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: Some(answer.into()),
            ..Self::default()
        }
    }

    /// Fails every call with [`CompletionError::Unavailable`].
    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            failure: Some(reason.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt.lock().clone()
    }
}

impl CompletionClient for MockCompletionClient {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_prompt.lock() = Some(prompt.to_string());

        if let Some(reason) = &self.failure {
            return Err(CompletionError::Unavailable(reason.clone()));
        }
        Ok(self
            .answer
            .clone()
            .unwrap_or_else(|| super::client::mock_completion(prompt)))
    }
}
