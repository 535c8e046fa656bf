//! Reauthenticating API client.
//!
//! This crate provides:
//! - `ReauthClient` - attaches the session's bearer token and recovers from
//!   expired tokens with a single-flight refresh-and-retry
//! - `ClientError` - classification of every non-2xx outcome
//! - `AuthConfig` - refresh endpoint configuration

mod client;
mod config;
mod error;
mod refresh;

pub use client::*;
pub use config::*;
pub use error::*;
