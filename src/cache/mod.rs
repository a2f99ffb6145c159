//! Answer cache.
//!
//! Completed responses are stored under the fingerprint of their normalized question (see
//! [`crate::hashing::cache_key`]). An entry is written once per miss as a whole
//! `Arc<AskResponse>`; concurrent misses for the same key both write and the last one wins.
//! Hits hand back a copy marked [`CacheStatus::Hit`], never the stored value itself.

pub mod answer;
pub mod types;

#[cfg(test)]
mod tests;

pub use answer::{AnswerCache, MemoryAnswerCache};
pub use types::{CacheStatus, RAGCITE_CACHE_HEADER};
