//! Session errors.

use thiserror::Error;

/// Session error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The access token is not a decodable JWT.
    #[error("malformed access token: {0}")]
    MalformedToken(String),

    /// No credential is held.
    #[error("not authenticated")]
    NotAuthenticated,
}
