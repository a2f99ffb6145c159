//! Query-time nearest-chunk lookup over a loaded [`VectorStore`].
//!
//! A retriever opened with [`Retriever::open_lazy`] may start without a store. Each search
//! retries the load, so a store published after startup is picked up, and a missing or
//! corrupt store fails that search only.


use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, warn};

use crate::constants::validate_embedding_dim;
use crate::embedding::Embedder;
use crate::vectordb::{SearchHit, VectorDbError, VectorStore};

/// Embeds queries and searches a shared, read-only store.
#[derive(Clone)]
pub struct Retriever {
    root: Option<PathBuf>,
    store: Arc<RwLock<Option<Arc<VectorStore>>>>,
    embedder: Arc<dyn Embedder>,
}

impl std::fmt::Debug for Retriever {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let store = self.store();
        f.debug_struct("Retriever")
            .field("root", &self.root)
            .field("build_id", &store.as_ref().map(|s| s.build_id().to_string()))
            .field("vectors", &store.as_ref().map(|s| s.len()))
            .finish()
    }
}

fn check_dimension(store: &VectorStore, embedder: &dyn Embedder) -> Result<(), VectorDbError> {
    validate_embedding_dim(store.dimension(), embedder.embedding_dim()).map_err(|_| {
        VectorDbError::InvalidDimension {
            expected: store.dimension(),
            actual: embedder.embedding_dim(),
        }
    })
}

impl Retriever {
    /// Pairs a store with the embedder used to build it.
    ///
    /// Fails if the embedder's dimension differs from the store's.
    pub fn new(store: Arc<VectorStore>, embedder: Arc<dyn Embedder>) -> Result<Self, VectorDbError> {
        check_dimension(&store, embedder.as_ref())?;
        Ok(Self {
            root: None,
            store: Arc::new(RwLock::new(Some(store))),
            embedder,
        })
    }

    /// Loads the published store under `root`, failing if it cannot be used.
    pub fn open(root: &Path, embedder: Arc<dyn Embedder>) -> Result<Self, VectorDbError> {
        let retriever = Self::unloaded(root, embedder);
        retriever.current_store()?;
        Ok(retriever)
    }

    /// Like [`open`](Self::open), but starts unloaded when the store is unusable.
    pub fn open_lazy(root: &Path, embedder: Arc<dyn Embedder>) -> Self {
        let retriever = Self::unloaded(root, embedder);
        if let Err(e) = retriever.current_store() {
            warn!(
                path = %root.display(),
                error = %e,
                "Vectorstore unavailable; requests fail until `ragcite build-index` publishes one"
            );
        }
        retriever
    }

    fn unloaded(root: &Path, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            root: Some(root.to_path_buf()),
            store: Arc::new(RwLock::new(None)),
            embedder,
        }
    }

    /// The loaded store, if any. Never touches the filesystem.
    pub fn store(&self) -> Option<Arc<VectorStore>> {
        self.store.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.store.read().is_some()
    }

    pub fn is_embedder_stub(&self) -> bool {
        self.embedder.is_stub()
    }

    /// Returns the loaded store, loading it from `root` first if needed.
    pub fn current_store(&self) -> Result<Arc<VectorStore>, VectorDbError> {
        if let Some(store) = self.store() {
            return Ok(store);
        }

        let Some(root) = &self.root else {
            return Err(VectorDbError::StoreNotFound {
                path: PathBuf::new(),
            });
        };

        let mut slot = self.store.write();
        if let Some(store) = slot.as_ref() {
            return Ok(Arc::clone(store));
        }

        let store = Arc::new(VectorStore::load(root)?);
        check_dimension(&store, self.embedder.as_ref())?;
        info!(
            path = %root.display(),
            build_id = %store.build_id(),
            vectors = store.len(),
            "Retriever ready"
        );
        *slot = Some(Arc::clone(&store));
        Ok(store)
    }

    /// Up to `top_k` chunks closest to `query`, closest first.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchHit>, VectorDbError> {
        let store = self.current_store()?;
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let vector = self.embedder.embed(query)?;
        let hits = store.search(&vector, top_k)?;

        debug!(
            top_k,
            returned = hits.len(),
            pages = ?hits.iter().map(|h| h.chunk.page_number).collect::<Vec<_>>(),
            "Retrieved candidates"
        );
        Ok(hits)
    }
}
