//! Session store for the campus services client.
//!
//! Holds the current bearer token and signed-in identity in process memory.
//! The long-lived refresh credential never passes through here: the server
//! keeps it in an HTTP-only cookie.

mod error;
mod session;
mod store;
mod token;
mod user;

pub use error::SessionError;
pub use session::{Credentials, Session};
pub use store::{ListenerHandle, SessionStore};
pub use token::{AccessToken, TokenClaims};
pub use user::{Identity, Role};
