//! Cache error types.

use thiserror::Error;

/// Errors raised by the cache itself rather than by a loader.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The loader task panicked or was aborted before producing a result.
    #[error("loader aborted for {key}: {reason}")]
    LoaderAborted { key: String, reason: String },
}
