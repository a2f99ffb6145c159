//! Exact vector search over a persisted chunk corpus.
//!
//! - [`flat`]: brute-force squared-L2 index.
//! - [`store`]: index + chunk table, persisted and loaded as one pair.
//! - [`builder`]: embeds chunks and produces a store.

pub mod builder;
pub mod error;
pub mod flat;
pub mod store;


pub use builder::{BuildSummary, DEFAULT_BUILD_BATCH_SIZE, IndexBuilder};
pub use error::VectorDbError;
pub use flat::{FlatL2Index, Neighbor, squared_l2};
pub use store::{CURRENT_FILE, INDEX_FILE, METADATA_FILE, SearchHit, VectorStore};
