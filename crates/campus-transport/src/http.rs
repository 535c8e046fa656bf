//! reqwest-backed transport.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::request::{FieldValue, Method, MultipartForm, RequestBody, RequestDescriptor};
use crate::{Response, Transport, TransportError};

/// Transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Origin all request paths are relative to.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Total request timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Connection timeout in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    /// User-Agent header value.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_base_url() -> String {
    "http://localhost:8000/api/v1".to_string()
}

fn default_timeout_ms() -> u64 {
    15_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_user_agent() -> String {
    concat!("campus-client/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            user_agent: default_user_agent(),
        }
    }
}

impl TransportConfig {
    /// Create a config for the given origin with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Total timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Connection timeout.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    /// Join a path onto the base URL. Every path is treated as relative to
    /// the base, so requests never leave the configured origin.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// HTTP transport over a shared `reqwest::Client`.
///
/// The client keeps a cookie jar, so an HTTP-only refresh cookie set by the
/// login response is replayed on later calls without application code
/// touching it.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    config: TransportConfig,
}

impl HttpTransport {
    /// Build a transport from configuration.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        Ok(Self { client, config })
    }

    /// The active configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    fn build(
        &self,
        request: &RequestDescriptor,
        credential: Option<&str>,
    ) -> Result<reqwest::RequestBuilder, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let url = reqwest::Url::parse(&self.config.url_for(&request.path))
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {}", request.path, e)))?;

        let mut builder = self
            .client
            .request(method, url)
            .header(reqwest::header::ACCEPT, "application/json");

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = credential {
            builder = builder.bearer_auth(token);
        }

        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(form) => builder.multipart(to_form(form)?),
        };

        Ok(builder)
    }
}

fn to_form(form: &MultipartForm) -> Result<Form, TransportError> {
    let mut out = Form::new();
    for (name, value) in form.fields() {
        out = match value {
            FieldValue::Text(text) => out.text(name.clone(), text.clone()),
            FieldValue::File(upload) => {
                let part = Part::bytes(upload.bytes.clone())
                    .file_name(upload.file_name.clone())
                    .mime_str(&upload.content_type)
                    .map_err(|e| {
                        TransportError::InvalidRequest(format!(
                            "bad content type for {}: {}",
                            name, e
                        ))
                    })?;
                out.part(name.clone(), part)
            }
        };
    }
    Ok(out)
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        credential: Option<&str>,
    ) -> Result<Response, TransportError> {
        let builder = self.build(request, credential)?;

        debug!(method = %request.method, path = %request.path, "sending request");
        let response = builder.send().await?;

        let status = response.status().as_u16();
        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("").to_string()))
            .collect();
        let body = response.bytes().await?.to_vec();

        debug!(
            method = %request.method,
            path = %request.path,
            status,
            bytes = body.len(),
            "response received"
        );
        Ok(Response::new(status, headers, body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Upload;

    #[test]
    fn test_url_for_joins_slashes() {
        let config = TransportConfig::new("https://campus.example.edu/api/v1/");
        assert_eq!(
            config.url_for("/events/all"),
            "https://campus.example.edu/api/v1/events/all"
        );
        assert_eq!(
            config.url_for("notifications"),
            "https://campus.example.edu/api/v1/notifications"
        );
    }

    #[test]
    fn test_url_for_keeps_absolute_urls_under_base() {
        let config = TransportConfig::new("https://campus.example.edu/api/v1");
        assert_eq!(
            config.url_for("https://cdn.example.edu/x"),
            "https://campus.example.edu/api/v1/https://cdn.example.edu/x"
        );
        let url = reqwest::Url::parse(&config.url_for("https://cdn.example.edu/x")).unwrap();
        assert_eq!(url.host_str(), Some("campus.example.edu"));
    }

    #[test]
    fn test_config_defaults_from_empty_toml_like_json() {
        let config: TransportConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.timeout(), Duration::from_secs(15));
        assert_eq!(config.connect_timeout(), Duration::from_secs(5));
        assert!(config.user_agent.starts_with("campus-client/"));
    }

    #[test]
    fn test_build_rejects_bad_base_url() {
        let transport = HttpTransport::new(TransportConfig::new("not a url")).unwrap();
        let err = transport
            .build(&RequestDescriptor::get("/events/all"), None)
            .unwrap_err();
        assert!(matches!(err, TransportError::InvalidRequest(_)));
    }

    #[test]
    fn test_to_form_rejects_bad_mime() {
        let form = MultipartForm::new().file("image", Upload::new("x", "not a mime", vec![1]));
        assert!(to_form(&form).is_err());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_network_error() {
        let mut config = TransportConfig::new("http://127.0.0.1:9");
        config.connect_timeout_ms = 200;
        config.timeout_ms = 500;
        let transport = HttpTransport::new(config).unwrap();
        let err = transport
            .send(&RequestDescriptor::get("/events/all"), Some("tok"))
            .await
            .unwrap_err();
        assert!(err.is_network());
    }
}
