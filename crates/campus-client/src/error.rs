//! Client error taxonomy.

use std::collections::HashMap;

use campus_transport::{Response, TransportError};
use thiserror::Error;

/// Broad category of a [`ClientError`], for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Authentication,
    Validation,
    Authorization,
    NotFound,
    Server,
    Decode,
    Internal,
}

/// Error returned by the reauthenticating client and everything above it.
///
/// Every HTTP status other than 2xx is classified here. 401 only surfaces
/// when refresh-and-retry could not recover it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    /// No response reached the client.
    #[error("Network error: {0}")]
    Network(#[from] TransportError),

    /// The credential is gone or was refused after a refresh.
    #[error("Authentication required: {}", .message.as_deref().unwrap_or("please sign in again"))]
    Unauthenticated { message: Option<String> },

    /// The server rejected the input (4xx other than 401/403/404).
    #[error("Validation failed ({status}): {}", .message.as_deref().unwrap_or("invalid request"))]
    Validation {
        status: u16,
        message: Option<String>,
        fields: HashMap<String, String>,
    },

    /// 403.
    #[error("Forbidden: {}", .message.as_deref().unwrap_or("not allowed"))]
    Forbidden { message: Option<String> },

    /// 404.
    #[error("Not found: {}", .message.as_deref().unwrap_or("resource does not exist"))]
    NotFound { message: Option<String> },

    /// 5xx.
    #[error("Server error ({status}): {}", .message.as_deref().unwrap_or("try again later"))]
    Server {
        status: u16,
        message: Option<String>,
    },

    /// A 2xx body that did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// A background task failed.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ClientError {
    /// Classify a non-2xx response.
    pub fn from_response(response: &Response) -> Self {
        let body = response.error_body();
        let message = body.message;
        match response.status {
            401 => ClientError::Unauthenticated { message },
            403 => ClientError::Forbidden { message },
            404 => ClientError::NotFound { message },
            status @ 500..=599 => ClientError::Server { status, message },
            status => ClientError::Validation {
                status,
                message,
                fields: body.errors,
            },
        }
    }

    /// Category of the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ClientError::Network(_) => ErrorKind::Network,
            ClientError::Unauthenticated { .. } => ErrorKind::Authentication,
            ClientError::Validation { .. } => ErrorKind::Validation,
            ClientError::Forbidden { .. } => ErrorKind::Authorization,
            ClientError::NotFound { .. } => ErrorKind::NotFound,
            ClientError::Server { .. } => ErrorKind::Server,
            ClientError::Decode(_) => ErrorKind::Decode,
            ClientError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Whether the caller must send the user back to the login view.
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::Unauthenticated { .. })
    }

    /// Server-provided message when there is one, else a generic message
    /// for the error's kind.
    pub fn user_message(&self) -> String {
        let server = match self {
            ClientError::Unauthenticated { message }
            | ClientError::Validation { message, .. }
            | ClientError::Forbidden { message }
            | ClientError::NotFound { message }
            | ClientError::Server { message, .. } => message.clone(),
            _ => None,
        };
        server.unwrap_or_else(|| {
            match self.kind() {
                ErrorKind::Network => "Unable to reach the server. Check your connection.",
                ErrorKind::Authentication => "Your session has expired. Please sign in again.",
                ErrorKind::Validation => "Some of the submitted information is invalid.",
                ErrorKind::Authorization => "You do not have permission to do that.",
                ErrorKind::NotFound => "The requested item could not be found.",
                ErrorKind::Server => "The server ran into a problem. Please try again later.",
                ErrorKind::Decode | ErrorKind::Internal => "Something went wrong.",
            }
            .to_string()
        })
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(e: serde_json::Error) -> Self {
        ClientError::Decode(e.to_string())
    }
}
