//! Client error types.

use thiserror::Error;

/// Errors returned by downstream service calls.
///
/// A missing record is not an error: lookups return `Ok(None)` for it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request never produced a response (connect failure, timeout).
    #[error("{service} unreachable: {detail}")]
    Transport {
        service: &'static str,
        detail: String,
    },

    /// The service answered with a non-success status.
    #[error("{service} rejected the request ({status}): {detail}")]
    Rejected {
        service: &'static str,
        status: u16,
        detail: String,
    },

    /// The response body could not be understood.
    #[error("{service} returned an unexpected response: {detail}")]
    UnexpectedResponse {
        service: &'static str,
        detail: String,
    },
}

impl ClientError {
    /// Returns the HTTP status of a rejection.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns true if the service was reached and said no.
    pub fn is_rejection(&self) -> bool {
        matches!(self, ClientError::Rejected { .. })
    }

    /// Returns the human-readable reason without the service prefix.
    pub fn detail(&self) -> &str {
        match self {
            ClientError::Transport { detail, .. }
            | ClientError::Rejected { detail, .. }
            | ClientError::UnexpectedResponse { detail, .. } => detail,
        }
    }
}
