//! Transport error types.

use thiserror::Error;

/// Errors that prevent a request from producing an HTTP response.
///
/// An HTTP error status is not a transport failure: 4xx and 5xx responses
/// come back as a [`crate::Response`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// No response reached the client (connect failure, reset, timeout).
    #[error("Network error: {0}")]
    Network(String),

    /// The request could not be built (bad URL, unencodable body).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl TransportError {
    /// Check if this error came from the network rather than the caller.
    pub fn is_network(&self) -> bool {
        matches!(self, TransportError::Network(_))
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        TransportError::InvalidRequest(format!("JSON encoding failed: {}", e))
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            TransportError::InvalidRequest(e.to_string())
        } else if e.is_timeout() {
            TransportError::Network(format!("request timed out: {}", e))
        } else {
            TransportError::Network(e.to_string())
        }
    }
}
