//! Request orchestration.
//!
//! ```text
//! question -> cache lookup -> HIT: copy marked "hit"
//!                          -> MISS: retrieve top-K -> rerank top-N -> prompt -> complete
//!                                   -> store -> "miss"
//!                                   (any failure -> generic error + latency)
//! ```
//!
//! [`Orchestrator::ask`] is the single boundary where miss-path errors are caught.

pub mod error;
pub mod orchestrator;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::PipelineError;
pub use orchestrator::Orchestrator;
pub use types::{AskOutcome, AskRequest, AskResponse, ErrorResponse, RerankedSource, SourcePage};
