//! Session snapshot.

use serde::{Deserialize, Serialize};

use crate::token::AccessToken;
use crate::user::Identity;

/// The current credential and identity.
///
/// `is_authenticated` is true iff `access_token` is present; the store keeps
/// the two in step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Bearer token for API calls.
    pub access_token: Option<AccessToken>,
    /// Signed-in user.
    pub user: Option<Identity>,
    /// Whether a credential is held.
    pub is_authenticated: bool,
}

impl Session {
    /// The empty, signed-out session.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Signed-in user, if any.
    pub fn user(&self) -> Option<&Identity> {
        self.user.as_ref()
    }
}

/// Payload of a successful login or refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    /// New bearer token.
    #[serde(alias = "access_token")]
    pub access_token: AccessToken,
    /// Updated identity; `None` keeps the current one.
    #[serde(default)]
    pub user: Option<Identity>,
}

impl Credentials {
    /// Credentials carrying only a token.
    pub fn token(access_token: impl Into<AccessToken>) -> Self {
        Self {
            access_token: access_token.into(),
            user: None,
        }
    }

    /// Attach an identity.
    pub fn with_user(mut self, user: Identity) -> Self {
        self.user = Some(user);
        self
    }
}
