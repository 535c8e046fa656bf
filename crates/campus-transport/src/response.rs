//! HTTP response handling.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Standard success envelope returned by the backend: `{ data, message? }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    /// The payload.
    pub data: T,
    /// Optional human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error body returned with non-2xx statuses: `{ message, errors? }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Server-provided message.
    #[serde(default)]
    pub message: Option<String>,
    /// Field-level messages, when the server provides them.
    #[serde(default)]
    pub errors: HashMap<String, String>,
}

/// An HTTP response.
#[derive(Debug, Clone)]
pub struct Response {
    /// The HTTP status code.
    pub status: u16,
    /// The response headers.
    pub headers: HashMap<String, String>,
    /// The response body.
    pub body: Vec<u8>,
}

impl Response {
    /// Create a new response.
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a response with a JSON body.
    pub fn json_body(status: u16, value: &serde_json::Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        Self::new(status, headers, value.to_string().into_bytes())
    }

    /// Check if the response was successful (2xx status).
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if the response was a client error (4xx status).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status)
    }

    /// Check if the response was a server error (5xx status).
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.status)
    }

    /// Check for an authentication failure.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }

    /// Get the response body as text.
    pub fn text(&self) -> Result<String, serde_json::Error> {
        String::from_utf8(self.body.clone())
            .map_err(|e| serde::de::Error::custom(format!("Invalid UTF-8: {}", e)))
    }

    /// Parse the response body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }

    /// Parse the body as a `{ data, message? }` envelope.
    pub fn envelope<T: DeserializeOwned>(&self) -> Result<Envelope<T>, serde_json::Error> {
        self.json()
    }

    /// Parse the body as an error body. Never fails: a non-JSON body
    /// becomes the message verbatim, an empty body yields no message.
    pub fn error_body(&self) -> ErrorBody {
        if self.body.is_empty() {
            return ErrorBody::default();
        }
        match self.json::<ErrorBody>() {
            Ok(body) => body,
            Err(_) => ErrorBody {
                message: self.text().ok().filter(|t| !t.trim().is_empty()),
                errors: HashMap::new(),
            },
        }
    }

    /// Get the raw response body.
    pub fn bytes(&self) -> &[u8] {
        &self.body
    }

    /// Get a header value.
    pub fn header(&self, key: &str) -> Option<&str> {
        // Case-insensitive header lookup
        let key_lower = key.to_lowercase();
        self.headers
            .iter()
            .find(|(k, _)| k.to_lowercase() == key_lower)
            .map(|(_, v)| v.as_str())
    }

    /// Get the Content-Type header.
    pub fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_response(status: u16, body: &[u8]) -> Response {
        Response::new(status, HashMap::new(), body.to_vec())
    }

    // === Status Check Tests ===

    #[test]
    fn test_response_is_success() {
        assert!(make_response(200, b"").is_success());
        assert!(make_response(201, b"").is_success());
        assert!(make_response(299, b"").is_success());
        assert!(!make_response(199, b"").is_success());
        assert!(!make_response(300, b"").is_success());
    }

    #[test]
    fn test_response_error_classes() {
        assert!(make_response(404, b"").is_client_error());
        assert!(!make_response(500, b"").is_client_error());
        assert!(make_response(503, b"").is_server_error());
        assert!(make_response(401, b"").is_unauthorized());
        assert!(!make_response(403, b"").is_unauthorized());
    }

    // === Body Tests ===

    #[test]
    fn test_response_text_invalid_utf8() {
        let resp = make_response(200, &[0xff, 0xfe]);
        assert!(resp.text().is_err());
    }

    #[test]
    fn test_response_envelope() {
        let resp = Response::json_body(200, &json!({"data": [1, 2, 3], "message": "ok"}));
        let env: Envelope<Vec<i32>> = resp.envelope().unwrap();
        assert_eq!(env.data, vec![1, 2, 3]);
        assert_eq!(env.message.as_deref(), Some("ok"));
    }

    #[test]
    fn test_response_envelope_without_message() {
        let resp = Response::json_body(200, &json!({"data": {"id": "7"}}));
        let env: Envelope<serde_json::Value> = resp.envelope().unwrap();
        assert_eq!(env.data["id"], "7");
        assert!(env.message.is_none());
    }

    #[test]
    fn test_error_body_with_fields() {
        let resp = Response::json_body(
            409,
            &json!({"message": "User exists", "errors": {"email": "taken"}}),
        );
        let body = resp.error_body();
        assert_eq!(body.message.as_deref(), Some("User exists"));
        assert_eq!(body.errors.get("email").map(String::as_str), Some("taken"));
    }

    #[test]
    fn test_error_body_plain_text_and_empty() {
        let body = make_response(502, b"Bad Gateway").error_body();
        assert_eq!(body.message.as_deref(), Some("Bad Gateway"));

        let body = make_response(500, b"").error_body();
        assert!(body.message.is_none());
    }

    // === Header Tests ===

    #[test]
    fn test_response_header_case_insensitive() {
        let resp = Response::json_body(200, &json!({}));
        assert_eq!(resp.header("content-type"), Some("application/json"));
        assert_eq!(resp.content_type(), Some("application/json"));
        assert_eq!(resp.header("X-Missing"), None);
    }
}
