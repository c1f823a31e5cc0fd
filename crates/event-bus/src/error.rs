//! Publish error types.

use thiserror::Error;

/// Errors that can occur when publishing an event.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The payload could not be encoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The transport refused the envelope.
    #[error("Event bus unavailable: {0}")]
    Unavailable(String),
}
