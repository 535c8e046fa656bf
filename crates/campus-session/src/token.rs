//! Bearer access tokens.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::SessionError;

/// Short-lived bearer credential.
///
/// `Debug` never prints the token itself.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccessToken(String);

impl AccessToken {
    /// Wrap a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Get the token as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decode the JWT payload without verifying the signature.
    ///
    /// The server remains the authority on validity; this is only used to
    /// show who is signed in and when the token runs out.
    pub fn claims(&self) -> Result<TokenClaims, SessionError> {
        let payload = self
            .0
            .split('.')
            .nth(1)
            .ok_or_else(|| SessionError::MalformedToken("missing payload segment".into()))?;
        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| SessionError::MalformedToken(e.to_string()))?;
        serde_json::from_slice(&bytes).map_err(|e| SessionError::MalformedToken(e.to_string()))
    }

    /// Whether the token's `exp` claim is at or before `now`.
    ///
    /// Opaque tokens (no decodable `exp`) are never considered expired.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.claims().ok().and_then(|c| c.expires_at()) {
            Some(exp) => exp <= now,
            None => false,
        }
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AccessToken(***{} chars)", self.0.len())
    }
}

impl From<String> for AccessToken {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for AccessToken {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Claims read from an access token payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (user ID).
    #[serde(default, alias = "_id")]
    pub sub: Option<String>,
    /// Expiry as Unix seconds.
    #[serde(default)]
    pub exp: Option<i64>,
    /// Issue time as Unix seconds.
    #[serde(default)]
    pub iat: Option<i64>,
}

impl TokenClaims {
    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|s| Utc.timestamp_opt(s, 0).single())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt(payload: &str) -> AccessToken {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.as_bytes());
        AccessToken::new(format!("{}.{}.sig", header, body))
    }

    #[test]
    fn test_claims_decode() {
        let token = jwt(r#"{"_id":"u1","exp":1700000000,"iat":1699999000}"#);
        let claims = token.claims().unwrap();
        assert_eq!(claims.sub.as_deref(), Some("u1"));
        assert_eq!(claims.exp, Some(1_700_000_000));
        assert_eq!(
            claims.expires_at().unwrap(),
            Utc.timestamp_opt(1_700_000_000, 0).unwrap()
        );
    }

    #[test]
    fn test_is_expired_at() {
        let token = jwt(r#"{"exp":1700000000}"#);
        let before = Utc.timestamp_opt(1_699_999_999, 0).unwrap();
        let after = Utc.timestamp_opt(1_700_000_001, 0).unwrap();
        assert!(!token.is_expired_at(before));
        assert!(token.is_expired_at(after));
    }

    #[test]
    fn test_opaque_token() {
        let token = AccessToken::new("opaque-token");
        assert!(matches!(token.claims(), Err(SessionError::MalformedToken(_))));
        assert!(!token.is_expired_at(Utc::now()));
    }

    #[test]
    fn test_debug_redacts() {
        let token = AccessToken::new("secret-value");
        let dbg = format!("{:?}", token);
        assert!(!dbg.contains("secret"));
    }
}
