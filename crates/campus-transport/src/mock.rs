//! Scripted in-memory transport for tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::request::{Method, RequestDescriptor};
use crate::{Response, Transport, TransportError};

/// One call observed by [`MockTransport`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    /// The descriptor as sent.
    pub request: RequestDescriptor,
    /// Bearer credential attached to the call.
    pub credential: Option<String>,
}

type Handler = Arc<dyn Fn(&RecordedCall) -> Result<Response, TransportError> + Send + Sync>;

struct Route {
    method: Method,
    path: String,
    handler: Handler,
}

/// Transport that answers from per-route handlers and journals every call.
///
/// Calls are journaled when they start, so in-flight calls are already
/// counted. Unrouted calls answer 404.
#[derive(Default)]
pub struct MockTransport {
    routes: Mutex<Vec<Route>>,
    calls: Mutex<Vec<RecordedCall>>,
    latency: Mutex<Duration>,
}

impl MockTransport {
    /// Create a transport with no routes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every response by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.set_latency(latency);
        self
    }

    /// Change the response delay.
    pub fn set_latency(&self, latency: Duration) {
        *lock(&self.latency) = latency;
    }

    /// Route `method path` to a handler, replacing any previous handler.
    pub fn on<F>(&self, method: Method, path: impl Into<String>, handler: F)
    where
        F: Fn(&RecordedCall) -> Result<Response, TransportError> + Send + Sync + 'static,
    {
        let path = path.into();
        let mut routes = lock(&self.routes);
        routes.retain(|r| !(r.method == method && r.path == path));
        routes.push(Route {
            method,
            path,
            handler: Arc::new(handler),
        });
    }

    /// Route `method path` to a fixed JSON response.
    pub fn respond_json(&self, method: Method, path: impl Into<String>, status: u16, body: Value) {
        self.on(method, path, move |_| Ok(Response::json_body(status, &body)));
    }

    /// All calls so far, in start order.
    pub fn calls(&self) -> Vec<RecordedCall> {
        lock(&self.calls).clone()
    }

    /// Number of calls to `method path`.
    pub fn call_count(&self, method: Method, path: &str) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|c| c.request.method == method && c.request.path == path)
            .count()
    }

    /// Total number of calls.
    pub fn total_calls(&self) -> usize {
        lock(&self.calls).len()
    }

    fn handler_for(&self, method: Method, path: &str) -> Option<Handler> {
        lock(&self.routes)
            .iter()
            .find(|r| r.method == method && r.path == path)
            .map(|r| r.handler.clone())
    }
}

fn lock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    m.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(
        &self,
        request: &RequestDescriptor,
        credential: Option<&str>,
    ) -> Result<Response, TransportError> {
        let call = RecordedCall {
            request: request.clone(),
            credential: credential.map(str::to_string),
        };
        lock(&self.calls).push(call.clone());

        let latency = *lock(&self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        match self.handler_for(request.method, &request.path) {
            Some(handler) => handler(&call),
            None => Ok(Response::json_body(
                404,
                &serde_json::json!({ "message": format!("no route for {}", request) }),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_routes_and_journal() {
        let mock = MockTransport::new();
        mock.respond_json(Method::Get, "/events/all", 200, json!({"data": []}));

        let resp = mock
            .send(&RequestDescriptor::get("/events/all"), Some("t1"))
            .await
            .unwrap();
        assert_eq!(resp.status, 200);

        let resp = mock
            .send(&RequestDescriptor::get("/nowhere"), None)
            .await
            .unwrap();
        assert_eq!(resp.status, 404);

        assert_eq!(mock.call_count(Method::Get, "/events/all"), 1);
        assert_eq!(mock.total_calls(), 2);
        assert_eq!(mock.calls()[0].credential.as_deref(), Some("t1"));
        assert!(mock.calls()[1].credential.is_none());
    }

    #[tokio::test]
    async fn test_route_replacement() {
        let mock = MockTransport::new();
        mock.respond_json(Method::Get, "/x", 200, json!({"data": 1}));
        mock.respond_json(Method::Get, "/x", 500, json!({"message": "boom"}));
        let resp = mock.send(&RequestDescriptor::get("/x"), None).await.unwrap();
        assert_eq!(resp.status, 500);
    }
}
