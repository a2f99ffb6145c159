//! In-memory answer cache keyed by question fingerprint.

use std::sync::Arc;

use moka::sync::Cache;

use crate::hashing::cache_key;
use crate::pipeline::AskResponse;

/// Get/put capability over completed responses.
///
/// Stored values are shared and never modified; writers replace a whole entry at once.
pub trait AnswerCache: Send + Sync {
    /// Returns the stored response for `key`, if any.
    fn get(&self, key: &str) -> Option<Arc<AskResponse>>;

    /// Stores `response` under `key`, replacing any previous entry.
    fn insert(&self, key: String, response: Arc<AskResponse>);

    /// Number of stored entries.
    fn len(&self) -> u64;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Looks up by question text, normalizing and hashing it first.
    fn lookup(&self, question: &str) -> Option<Arc<AskResponse>> {
        self.get(&cache_key(question))
    }
}

/// Process-lifetime answer cache backed by [`moka`].
///
/// Unbounded unless built with [`MemoryAnswerCache::with_capacity`]. Nothing is persisted;
/// a restart starts empty.
#[derive(Clone)]
pub struct MemoryAnswerCache {
    entries: Cache<String, Arc<AskResponse>>,
    capacity: Option<u64>,
}

impl MemoryAnswerCache {
    /// Creates an unbounded cache.
    #[inline]
    pub fn new() -> Self {
        Self {
            entries: Cache::builder().build(),
            capacity: None,
        }
    }

    /// Creates a cache holding at most `capacity` entries (moka's TinyLFU eviction).
    #[inline]
    pub fn with_capacity(capacity: u64) -> Self {
        Self {
            entries: Cache::builder().max_capacity(capacity).build(),
            capacity: Some(capacity),
        }
    }

    /// Bounded when `capacity` is `Some`, unbounded otherwise.
    pub fn from_capacity(capacity: Option<u64>) -> Self {
        match capacity {
            Some(n) => Self::with_capacity(n),
            None => Self::new(),
        }
    }

    pub fn capacity(&self) -> Option<u64> {
        self.capacity
    }

    /// Returns `true` if an entry exists for `key`.
    #[inline]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Clears all entries.
    pub fn clear(&self) {
        self.entries.invalidate_all();
        self.entries.run_pending_tasks();
    }
}

impl Default for MemoryAnswerCache {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerCache for MemoryAnswerCache {
    #[inline]
    fn get(&self, key: &str) -> Option<Arc<AskResponse>> {
        self.entries.get(key)
    }

    #[inline]
    fn insert(&self, key: String, response: Arc<AskResponse>) {
        self.entries.insert(key, response);
    }

    fn len(&self) -> u64 {
        // entry_count lags behind writes until maintenance runs.
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }
}

impl std::fmt::Debug for MemoryAnswerCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryAnswerCache")
            .field("entries", &self.entries.entry_count())
            .field("capacity", &self.capacity)
            .finish()
    }
}
