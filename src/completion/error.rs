use thiserror::Error;

/// Errors from a completion call.
#[derive(Debug, Error)]
pub enum CompletionError {
    /// Provider call failed (network, auth, rate limit, ...).
    #[error("completion provider request failed for model {model}: {message}")]
    Provider { model: String, message: String },

    /// Provider answered with no text.
    #[error("completion provider returned no text for model {model}")]
    EmptyResponse { model: String },

    /// Client could not serve the request.
    #[error("completion client unavailable: {0}")]
    Unavailable(String),
}
