//! Text completion over an assembled prompt.
//!
//! [`CompletionClient`] is the seam the orchestrator calls; [`GenaiCompletionClient`] talks to
//! a hosted model. Failures are returned as-is and never retried here.

pub mod error;
pub mod client;

#[cfg(any(test, feature = "mock"))]
pub mod mock;


pub use error::CompletionError;
pub use client::{GenaiCompletionClient, mock_completion};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockCompletionClient;

use std::sync::Arc;

/// `prompt -> answer` capability.
pub trait CompletionClient: Send + Sync {
    fn complete(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, CompletionError>> + Send;
}

impl<C: CompletionClient> CompletionClient for Arc<C> {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
        self.as_ref().complete(prompt).await
    }
}
