//! Client configuration.

use std::path::Path;

use campus_cache::CacheConfig;
use campus_client::AuthConfig;
use campus_transport::TransportConfig;
use serde::{Deserialize, Serialize};

use crate::ApiError;

/// Environment variable overriding `api.base_url`.
pub const API_URL_ENV: &str = "CAMPUS_API_URL";

/// Complete configuration of the data-access layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CampusConfig {
    /// Backend location and timeouts.
    #[serde(default)]
    pub api: TransportConfig,

    /// Token refresh.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Read cache.
    #[serde(default)]
    pub cache: CacheConfig,
}

impl CampusConfig {
    /// Config for the given base URL with every other setting defaulted.
    pub fn for_url(base_url: impl Into<String>) -> Self {
        Self {
            api: TransportConfig::new(base_url),
            ..Self::default()
        }
    }

    /// Load config from a file. `.json` files are parsed as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ApiError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ApiError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::parse(&content, is_json(path))
            .map_err(|e| ApiError::Config(format!("failed to parse {}: {}", path.display(), e)))
    }

    /// Load `path` if given, else defaults, then apply environment overrides.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ApiError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.apply_base_url(&url);
        }
        Ok(config)
    }

    /// Override the base URL. Blank values are ignored.
    pub fn apply_base_url(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.api.base_url = url.to_string();
        }
    }

    /// Save config to a file, in the format its extension names.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ApiError> {
        let path = path.as_ref();
        let content = self.render(is_json(path))?;
        std::fs::write(path, content)
            .map_err(|e| ApiError::Config(format!("failed to write {}: {}", path.display(), e)))
    }

    /// Serialize to TOML or pretty JSON.
    pub fn render(&self, json: bool) -> Result<String, ApiError> {
        if json {
            serde_json::to_string_pretty(self).map_err(|e| ApiError::Config(e.to_string()))
        } else {
            toml::to_string_pretty(self).map_err(|e| ApiError::Config(e.to_string()))
        }
    }

    fn parse(content: &str, json: bool) -> Result<Self, String> {
        if json {
            serde_json::from_str(content).map_err(|e| e.to_string())
        } else {
            toml::from_str(content).map_err(|e| e.to_string())
        }
    }
}

fn is_json(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "json")
}
