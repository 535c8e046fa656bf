//! Reauthenticating client.

use std::sync::Arc;

use campus_session::{AccessToken, SessionStore};
use campus_transport::{RequestDescriptor, Response, Transport};
use tracing::{debug, warn};

use crate::config::AuthConfig;
use crate::refresh::{spawn_refresh, RefreshSlot};
use crate::ClientError;

/// Where one request is in the refresh-and-retry protocol.
enum RequestState {
    /// Not yet sent.
    Idle,
    /// A response arrived. `replayed` is set once the request has been
    /// re-issued after a refresh.
    Sent {
        response: Response,
        used_token: Option<AccessToken>,
        replayed: bool,
    },
    /// First attempt came back 401.
    AuthFailed { used_token: Option<AccessToken> },
    /// Waiting on the shared refresh.
    RefreshPending,
    /// About to replay with a fresh credential.
    Retrying { token: AccessToken },
}

struct Inner {
    transport: Arc<dyn Transport>,
    session: SessionStore,
    refresh: Arc<RefreshSlot>,
    config: AuthConfig,
}

/// Client that attaches the session's bearer token to every call and
/// recovers from expired tokens.
///
/// On a 401 the client refreshes the token (at most one refresh in flight
/// for all requests sharing this client) and replays the original request
/// once. Cloning yields another handle to the same client.
#[derive(Clone)]
pub struct ReauthClient {
    inner: Arc<Inner>,
}

impl ReauthClient {
    /// Create a client over `transport` and `session`.
    pub fn new(transport: Arc<dyn Transport>, session: SessionStore, config: AuthConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                transport,
                session,
                refresh: Arc::new(RefreshSlot::default()),
                config,
            }),
        }
    }

    /// The session store this client reads credentials from.
    pub fn session(&self) -> &SessionStore {
        &self.inner.session
    }

    /// Authentication configuration.
    pub fn config(&self) -> &AuthConfig {
        &self.inner.config
    }

    /// Number of refresh calls this client has started.
    pub fn refresh_count(&self) -> u64 {
        self.inner.refresh.started()
    }

    /// Whether a refresh is in flight.
    pub fn is_refreshing(&self) -> bool {
        self.inner.refresh.is_pending()
    }

    /// Execute `request`, returning the 2xx response or the classified
    /// error.
    pub async fn execute(&self, request: &RequestDescriptor) -> Result<Response, ClientError> {
        let mut state = RequestState::Idle;
        loop {
            state = match state {
                RequestState::Idle => {
                    let token = if request.wants_credential() {
                        self.inner.session.access_token()
                    } else {
                        None
                    };
                    let response = self.send(request, token.as_ref()).await?;
                    RequestState::Sent {
                        response,
                        used_token: token,
                        replayed: false,
                    }
                }
                RequestState::Sent { response, .. } if !response.is_unauthorized() => {
                    return finish(request, response);
                }
                RequestState::Sent {
                    response,
                    replayed: true,
                    ..
                } => {
                    warn!(%request, "request refused again after refresh");
                    return Err(ClientError::Unauthenticated {
                        message: response.error_body().message,
                    });
                }
                RequestState::Sent {
                    response,
                    used_token,
                    replayed: false,
                } => {
                    if !self.may_reauthenticate(request) {
                        return Err(ClientError::Unauthenticated {
                            message: response.error_body().message,
                        });
                    }
                    RequestState::AuthFailed { used_token }
                }
                RequestState::AuthFailed { used_token } => {
                    match self.inner.session.access_token() {
                        // A refresh finished while this request was out;
                        // replay with its token instead of refreshing again.
                        Some(current) if used_token.as_ref() != Some(&current) => {
                            debug!(%request, "token changed in flight, replaying");
                            RequestState::Retrying { token: current }
                        }
                        _ => RequestState::RefreshPending,
                    }
                }
                RequestState::RefreshPending => RequestState::Retrying {
                    token: self.refresh().await?,
                },
                RequestState::Retrying { token } => {
                    let response = self.send(request, Some(&token)).await?;
                    RequestState::Sent {
                        response,
                        used_token: Some(token),
                        replayed: true,
                    }
                }
            };
        }
    }

    /// Refresh the access token now, joining a refresh already in flight.
    ///
    /// On failure the session has been cleared.
    pub async fn refresh(&self) -> Result<AccessToken, ClientError> {
        let inner = &self.inner;
        let shared = inner.refresh.join_or_start(|id| {
            spawn_refresh(
                id,
                inner.refresh.clone(),
                inner.transport.clone(),
                inner.session.clone(),
                inner.config.refresh_path.clone(),
            )
        });
        shared.await
    }

    fn may_reauthenticate(&self, request: &RequestDescriptor) -> bool {
        request.wants_credential() && request.path != self.inner.config.refresh_path
    }

    async fn send(
        &self,
        request: &RequestDescriptor,
        token: Option<&AccessToken>,
    ) -> Result<Response, ClientError> {
        let response = self
            .inner
            .transport
            .send(request, token.map(AccessToken::as_str))
            .await?;
        debug!(%request, status = response.status, "request completed");
        Ok(response)
    }
}

fn finish(request: &RequestDescriptor, response: Response) -> Result<Response, ClientError> {
    if response.is_success() {
        Ok(response)
    } else {
        let err = ClientError::from_response(&response);
        debug!(%request, status = response.status, error = %err, "request failed");
        Err(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use campus_session::Credentials;
    use campus_transport::mock::MockTransport;
    use campus_transport::{Method, TransportError};
    use futures::future::join_all;
    use serde_json::json;
    use std::time::Duration;

    fn setup(mock: MockTransport) -> (Arc<MockTransport>, ReauthClient) {
        let mock = Arc::new(mock);
        let session = SessionStore::new();
        session.set_credentials(Credentials::token("old"));
        let client = ReauthClient::new(mock.clone(), session, AuthConfig::default());
        (mock, client)
    }

    /// `/events/all` answers 200 for token "new", 401 otherwise.
    fn route_protected(mock: &MockTransport) {
        mock.on(Method::Get, "/events/all", |call| {
            if call.credential.as_deref() == Some("new") {
                Ok(Response::json_body(200, &json!({"data": ["e1"]})))
            } else {
                Ok(Response::json_body(401, &json!({"message": "jwt expired"})))
            }
        });
    }

    fn route_refresh_ok(mock: &MockTransport) {
        mock.respond_json(
            Method::Post,
            "/refresh-token",
            200,
            json!({"data": {"accessToken": "new"}}),
        );
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let (mock, client) = setup(MockTransport::new());
        mock.respond_json(Method::Get, "/notifications", 200, json!({"data": []}));

        client
            .execute(&RequestDescriptor::get("/notifications"))
            .await
            .unwrap();
        assert_eq!(mock.calls()[0].credential.as_deref(), Some("old"));
    }

    #[tokio::test]
    async fn test_anonymous_request_has_no_token() {
        let (mock, client) = setup(MockTransport::new());
        mock.respond_json(Method::Post, "/login", 200, json!({"data": {}}));

        client
            .execute(&RequestDescriptor::post("/login").anonymous())
            .await
            .unwrap();
        assert!(mock.calls()[0].credential.is_none());
    }

    #[tokio::test]
    async fn test_domain_errors_pass_through() {
        let (mock, client) = setup(MockTransport::new());
        mock.respond_json(Method::Get, "/events/view/9", 404, json!({"message": "Event not found"}));
        mock.respond_json(Method::Delete, "/events/delete/9", 403, json!({"message": "Admins only"}));

        let err = client
            .execute(&RequestDescriptor::get("/events/view/9"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::NotFound {
                message: Some("Event not found".into())
            }
        );

        let err = client
            .execute(&RequestDescriptor::delete("/events/delete/9"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Forbidden { .. }));
        assert_eq!(client.refresh_count(), 0);
    }

    #[tokio::test]
    async fn test_network_error_is_not_auth_failure() {
        let (mock, client) = setup(MockTransport::new());
        mock.on(Method::Get, "/events/all", |_| {
            Err(TransportError::Network("connection refused".into()))
        });

        let err = client
            .execute(&RequestDescriptor::get("/events/all"))
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert_eq!(client.refresh_count(), 0);
        assert!(client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_refresh_and_replay() {
        let (mock, client) = setup(MockTransport::new());
        route_protected(&mock);
        route_refresh_ok(&mock);

        let resp = client
            .execute(&RequestDescriptor::get("/events/all"))
            .await
            .unwrap();
        assert_eq!(resp.status, 200);
        assert_eq!(client.refresh_count(), 1);
        assert_eq!(client.session().access_token().unwrap().as_str(), "new");

        let calls = mock.calls();
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].request.path, "/refresh-token");
        assert!(calls[1].credential.is_none());
        assert_eq!(calls[2].credential.as_deref(), Some("new"));
    }

    #[tokio::test]
    async fn test_concurrent_401s_share_one_refresh() {
        let (mock, client) = setup(MockTransport::new().with_latency(Duration::from_millis(20)));
        route_protected(&mock);
        route_refresh_ok(&mock);

        let request = RequestDescriptor::get("/events/all");
        let results = join_all((0..5).map(|_| client.execute(&request))).await;

        assert!(results.iter().all(|r| r.is_ok()));
        assert_eq!(mock.call_count(Method::Post, "/refresh-token"), 1);
        assert_eq!(client.refresh_count(), 1);
        assert!(!client.is_refreshing());
    }

    #[tokio::test]
    async fn test_replayed_401_is_terminal() {
        let (mock, client) = setup(MockTransport::new());
        mock.respond_json(Method::Get, "/events/all", 401, json!({"message": "nope"}));
        route_refresh_ok(&mock);

        let err = client
            .execute(&RequestDescriptor::get("/events/all"))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::Unauthenticated {
                message: Some("nope".into())
            }
        );
        assert_eq!(mock.call_count(Method::Get, "/events/all"), 2);
        assert_eq!(mock.call_count(Method::Post, "/refresh-token"), 1);
    }

    #[tokio::test]
    async fn test_refresh_failure_clears_session() {
        let (mock, client) = setup(MockTransport::new());
        route_protected(&mock);
        mock.respond_json(
            Method::Post,
            "/refresh-token",
            401,
            json!({"message": "Refresh token expired"}),
        );

        let err = client
            .execute(&RequestDescriptor::get("/events/all"))
            .await
            .unwrap_err();
        assert!(err.requires_login());
        assert!(!client.session().is_authenticated());
        assert!(client.session().access_token().is_none());
        assert_eq!(mock.call_count(Method::Get, "/events/all"), 1);
    }

    #[tokio::test]
    async fn test_refresh_network_failure_clears_session() {
        let (mock, client) = setup(MockTransport::new());
        route_protected(&mock);
        mock.on(Method::Post, "/refresh-token", |_| {
            Err(TransportError::Network("timed out".into()))
        });

        let err = client
            .execute(&RequestDescriptor::get("/events/all"))
            .await
            .unwrap_err();
        assert!(err.requires_login());
        assert!(!client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_refresh_call_never_recurses() {
        let (mock, client) = setup(MockTransport::new());
        mock.respond_json(Method::Post, "/refresh-token", 401, json!({"message": "no cookie"}));

        // Even when sent with bearer mode, the refresh path is not reauthenticated.
        let err = client
            .execute(&RequestDescriptor::post("/refresh-token"))
            .await
            .unwrap_err();
        assert!(err.requires_login());
        assert_eq!(mock.total_calls(), 1);
        assert_eq!(client.refresh_count(), 0);
    }

    #[tokio::test]
    async fn test_anonymous_401_does_not_refresh() {
        let (mock, client) = setup(MockTransport::new());
        mock.respond_json(Method::Post, "/login", 401, json!({"message": "Invalid credentials"}));

        let err = client
            .execute(&RequestDescriptor::post("/login").anonymous())
            .await
            .unwrap_err();
        assert_eq!(err.user_message(), "Invalid credentials");
        assert_eq!(client.refresh_count(), 0);
        assert!(client.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_stale_token_replays_without_refresh() {
        let mock = Arc::new(MockTransport::new());
        let session = SessionStore::new();
        session.set_credentials(Credentials::token("old"));
        let client = ReauthClient::new(mock.clone(), session.clone(), AuthConfig::default());

        // A parallel refresh lands while this request is in flight.
        let rotating = session.clone();
        mock.on(Method::Get, "/events/all", move |call| {
            if call.credential.as_deref() == Some("new") {
                Ok(Response::json_body(200, &json!({"data": []})))
            } else {
                rotating.set_credentials(Credentials::token("new"));
                Ok(Response::json_body(401, &json!({})))
            }
        });

        client
            .execute(&RequestDescriptor::get("/events/all"))
            .await
            .unwrap();
        assert_eq!(client.refresh_count(), 0);
        assert_eq!(mock.call_count(Method::Post, "/refresh-token"), 0);
    }

    #[tokio::test]
    async fn test_refresh_survives_cancelled_caller() {
        let (mock, client) = setup(MockTransport::new().with_latency(Duration::from_millis(30)));
        route_protected(&mock);
        route_refresh_ok(&mock);

        // Give up while the refresh is in flight.
        let request = RequestDescriptor::get("/events/all");
        let outcome =
            tokio::time::timeout(Duration::from_millis(45), client.execute(&request)).await;
        assert!(outcome.is_err());

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(client.session().access_token().unwrap().as_str(), "new");
        assert!(!client.is_refreshing());
    }

    #[tokio::test]
    async fn test_explicit_refresh_joins_inflight() {
        let (mock, client) = setup(MockTransport::new().with_latency(Duration::from_millis(20)));
        route_refresh_ok(&mock);

        let (a, b) = tokio::join!(client.refresh(), client.refresh());
        assert_eq!(a.unwrap().as_str(), "new");
        assert_eq!(b.unwrap().as_str(), "new");
        assert_eq!(mock.call_count(Method::Post, "/refresh-token"), 1);
    }
}
