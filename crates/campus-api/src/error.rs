//! API error types.

use campus_cache::CacheError;
use campus_client::{ClientError, ErrorKind};
use thiserror::Error;

/// Errors returned by [`crate::CampusApi`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The call reached the client and failed there.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// A path or tag placeholder had no value.
    #[error("Missing parameter `{param}` for {operation}")]
    MissingParam {
        operation: &'static str,
        param: &'static str,
    },

    /// The call's body does not fit the endpoint.
    #[error("Invalid input for {operation}: {reason}")]
    InvalidInput {
        operation: &'static str,
        reason: String,
    },

    /// Configuration could not be loaded or used.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ApiError {
    /// Category of the error, for presentation. Caller mistakes count as
    /// validation errors.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Client(e) => e.kind(),
            ApiError::MissingParam { .. } | ApiError::InvalidInput { .. } => ErrorKind::Validation,
            ApiError::Config(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller must send the user back to the login view.
    pub fn requires_login(&self) -> bool {
        matches!(self, ApiError::Client(e) if e.requires_login())
    }

    /// Display string for the presentation layer.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Client(e) => e.user_message(),
            other => other.to_string(),
        }
    }

    /// The underlying client error, if any.
    pub fn as_client(&self) -> Option<&ClientError> {
        match self {
            ApiError::Client(e) => Some(e),
            _ => None,
        }
    }
}

impl From<CacheError> for ApiError {
    fn from(e: CacheError) -> Self {
        ApiError::Client(ClientError::Internal(e.to_string()))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Client(ClientError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_failure_is_internal() {
        let err = ApiError::from(CacheError::LoaderAborted {
            key: "getAllEvents()".into(),
            reason: "panicked".into(),
        });
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(matches!(err.as_client(), Some(ClientError::Internal(_))));
    }

    #[test]
    fn test_requires_login_delegates() {
        let err = ApiError::Client(ClientError::Unauthenticated { message: None });
        assert!(err.requires_login());
        assert!(!ApiError::Config("bad".into()).requires_login());
    }

    #[test]
    fn test_missing_param_message() {
        let err = ApiError::MissingParam {
            operation: "getEventById",
            param: "id",
        };
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.user_message(), "Missing parameter `id` for getEventById");
    }
}
