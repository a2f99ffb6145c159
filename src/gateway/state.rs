use std::path::PathBuf;
use std::sync::Arc;

use crate::completion::CompletionClient;
use crate::pipeline::Orchestrator;

/// Shared state for the HTTP handlers.
pub struct HandlerState<C> {
    pub orchestrator: Arc<Orchestrator<C>>,

    pub vectorstore_path: PathBuf,
}

impl<C> Clone for HandlerState<C> {
    fn clone(&self) -> Self {
        Self {
            orchestrator: Arc::clone(&self.orchestrator),
            vectorstore_path: self.vectorstore_path.clone(),
        }
    }
}

impl<C: CompletionClient> HandlerState<C> {
    pub fn new(orchestrator: Orchestrator<C>, vectorstore_path: PathBuf) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            vectorstore_path,
        }
    }
}
