//! Authentication configuration.

use serde::{Deserialize, Serialize};

/// Where and how credentials are refreshed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Path of the refresh endpoint, relative to the base URL.
    #[serde(default = "default_refresh_path")]
    pub refresh_path: String,
}

fn default_refresh_path() -> String {
    "/refresh-token".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            refresh_path: default_refresh_path(),
        }
    }
}

impl AuthConfig {
    /// Use a different refresh path.
    pub fn with_refresh_path(mut self, path: impl Into<String>) -> Self {
        self.refresh_path = path.into();
        self
    }
}
