//! Single-call HTTP transport for the campus services API.
//!
//! The transport performs exactly one HTTP call per [`Transport::send`]:
//! no retry, no auth semantics, no caching. Every HTTP status comes back as
//! a [`Response`]; only connectivity problems (including timeouts) are
//! [`TransportError`]s.
//!
//! # Example
//!
//! ```rust,ignore
//! use campus_transport::{HttpTransport, RequestDescriptor, Transport, TransportConfig};
//!
//! let transport = HttpTransport::new(TransportConfig::new("https://campus.example.edu/api/v1"))?;
//!
//! let response = transport
//!     .send(&RequestDescriptor::get("/events/all"), Some(token.as_str()))
//!     .await?;
//! ```

mod error;
mod http;
mod request;
mod response;

#[cfg(any(test, feature = "test-util"))]
pub mod mock;

use async_trait::async_trait;

pub use error::TransportError;
pub use http::{HttpTransport, TransportConfig};
pub use request::{AuthMode, FieldValue, Method, MultipartForm, RequestBody, RequestDescriptor, Upload};
pub use response::{Envelope, ErrorBody, Response};

/// Performs one HTTP call.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send `request`, attaching `Authorization: Bearer <credential>` when a
    /// credential is given.
    async fn send(
        &self,
        request: &RequestDescriptor,
        credential: Option<&str>,
    ) -> Result<Response, TransportError>;
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Method, MultipartForm, RequestDescriptor, Response, Transport, TransportError, Upload,
    };
}
