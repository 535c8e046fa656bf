//! Generic executor over the endpoint table.

use std::sync::Arc;

use campus_cache::{loader, Loader, ReadOptions, Subscription, TagCache};
use campus_client::ReauthClient;
use campus_session::{Credentials, SessionStore};
use campus_transport::{HttpTransport, Response, Transport};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::auth::Auth;
use crate::complaints::Complaints;
use crate::config::CampusConfig;
use crate::events::Events;
use crate::lost_found::LostFound;
use crate::notifications::Notifications;
use crate::params::Call;
use crate::placements::Placements;
use crate::registry::{user_scoped_tags, EndpointKind, EndpointSpec, SessionEffect};
use crate::ApiError;

/// Cache of decoded response payloads.
pub type ResponseCache = TagCache<Arc<Value>, ApiError>;

/// Live view of one query.
pub type Watch = Subscription<Arc<Value>, ApiError>;

/// Options for a cached read.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryOptions {
    /// Skip cached data and fetch again.
    pub force_refresh: bool,
}

impl QueryOptions {
    /// Options that bypass the cache.
    pub fn fresh() -> Self {
        Self {
            force_refresh: true,
        }
    }
}

impl From<QueryOptions> for ReadOptions {
    fn from(options: QueryOptions) -> Self {
        ReadOptions {
            force_refresh: options.force_refresh,
        }
    }
}

struct Inner {
    client: ReauthClient,
    cache: ResponseCache,
}

/// Entry point to the campus services backend.
///
/// Queries are served through the tag-indexed cache; mutations go straight
/// to the client and, once they succeed, invalidate the tags their endpoint
/// names. Cloning yields another handle to the same session and cache.
#[derive(Clone)]
pub struct CampusApi {
    inner: Arc<Inner>,
}

impl CampusApi {
    /// Assemble from an existing client and cache.
    pub fn new(client: ReauthClient, cache: ResponseCache) -> Self {
        Self {
            inner: Arc::new(Inner { client, cache }),
        }
    }

    /// Build an HTTP-backed API with a fresh session.
    pub fn from_config(config: &CampusConfig) -> Result<Self, ApiError> {
        let transport = HttpTransport::new(config.api.clone())
            .map_err(|e| ApiError::Config(e.to_string()))?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    /// Build over any transport with a fresh session.
    pub fn with_transport(transport: Arc<dyn Transport>, config: &CampusConfig) -> Self {
        let client = ReauthClient::new(transport, SessionStore::new(), config.auth.clone());
        Self::new(client, TagCache::new(config.cache.clone()))
    }

    /// Session store shared with the client.
    pub fn session(&self) -> &SessionStore {
        self.inner.client.session()
    }

    /// The reauthenticating client.
    pub fn client(&self) -> &ReauthClient {
        &self.inner.client
    }

    /// Response cache for queries.
    pub fn cache(&self) -> &ResponseCache {
        &self.inner.cache
    }

    /// Sign-in and account operations.
    pub fn auth(&self) -> Auth<'_> {
        Auth::new(self)
    }

    /// Event operations.
    pub fn events(&self) -> Events<'_> {
        Events::new(self)
    }

    /// Complaint operations.
    pub fn complaints(&self) -> Complaints<'_> {
        Complaints::new(self)
    }

    /// Lost-and-found operations.
    pub fn lost_found(&self) -> LostFound<'_> {
        LostFound::new(self)
    }

    /// Placement operations.
    pub fn placements(&self) -> Placements<'_> {
        Placements::new(self)
    }

    /// Notification operations.
    pub fn notifications(&self) -> Notifications<'_> {
        Notifications::new(self)
    }

    /// Run `call` and return its payload: the envelope's `data`, or the
    /// whole body when the response is not enveloped.
    pub async fn execute(&self, call: Call, options: QueryOptions) -> Result<Arc<Value>, ApiError> {
        let spec = call.spec();
        if spec.path == self.inner.client.config().refresh_path {
            return self.refresh_token().await;
        }
        match spec.kind {
            EndpointKind::Query { .. } => self.query(&call, spec, options).await,
            EndpointKind::Mutation { .. } => self.mutate(&call, spec).await.map(Arc::new),
        }
    }

    /// Run `call` and decode its payload as `T`.
    pub async fn execute_as<T: DeserializeOwned>(
        &self,
        call: Call,
        options: QueryOptions,
    ) -> Result<T, ApiError> {
        let data = self.execute(call, options).await?;
        Ok(T::deserialize(&*data)?)
    }

    /// Subscribe to a query and load it.
    ///
    /// While the returned handle lives, any mutation invalidating the
    /// query's tags re-fetches it immediately; follow along with
    /// [`Subscription::changed`] and [`Subscription::snapshot`].
    pub async fn watch(&self, call: Call) -> Result<Watch, ApiError> {
        let spec = call.spec();
        if !spec.is_query() {
            return Err(ApiError::InvalidInput {
                operation: spec.name(),
                reason: "only queries can be watched".to_string(),
            });
        }
        let subscription = self.inner.cache.subscribe(call.cache_key());
        self.query(&call, spec, QueryOptions::default()).await?;
        Ok(subscription)
    }

    async fn query(
        &self,
        call: &Call,
        spec: &'static EndpointSpec,
        options: QueryOptions,
    ) -> Result<Arc<Value>, ApiError> {
        let request = call.descriptor()?;
        let tags = spec.provided_tags(&call.params)?;
        let client = self.inner.client.clone();
        let load: Loader<Arc<Value>, ApiError> = loader(move || {
            let client = client.clone();
            let request = request.clone();
            async move {
                let response = client.execute(&request).await?;
                Ok::<_, ApiError>(Arc::new(payload(&response)?))
            }
        });
        self.inner
            .cache
            .read(call.cache_key(), tags, load, options.into())
            .await
    }

    async fn mutate(&self, call: &Call, spec: &'static EndpointSpec) -> Result<Value, ApiError> {
        let request = call.descriptor()?;
        let tags = spec.invalidated_tags(&call.params)?;

        let result = self.inner.client.execute(&request).await;

        if spec.session == SessionEffect::Clear {
            self.end_session();
        }
        let data = payload(&result?)?;

        if spec.session == SessionEffect::SetCredentials {
            let credentials: Credentials = serde_json::from_value(data.clone())?;
            self.session().set_credentials(credentials);
            let affected = self.inner.cache.invalidate(&user_scoped_tags());
            info!(operation = spec.name(), affected, "signed in");
        }
        if !tags.is_empty() {
            let affected = self.inner.cache.invalidate(&tags);
            debug!(operation = spec.name(), affected, "mutation invalidated cache entries");
        }
        Ok(data)
    }

    async fn refresh_token(&self) -> Result<Arc<Value>, ApiError> {
        let token = self.inner.client.refresh().await?;
        let user = self.session().current().user;
        Ok(Arc::new(json!({
            "accessToken": token.as_str(),
            "user": user,
        })))
    }

    /// Drop local credentials and every cached user-scoped read.
    fn end_session(&self) {
        self.session().clear();
        let cleared = self.inner.cache.clear_tags(&user_scoped_tags());
        info!(cleared, "signed out");
    }
}

/// Payload of a 2xx response.
fn payload(response: &Response) -> Result<Value, ApiError> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    match response.json::<Value>()? {
        Value::Object(mut map) if map.contains_key("data") => {
            Ok(map.remove("data").unwrap_or(Value::Null))
        }
        other => Ok(other),
    }
}
