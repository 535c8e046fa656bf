//! Single-flight credential refresh.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use campus_session::{AccessToken, Credentials, SessionStore};
use campus_transport::{Envelope, RequestDescriptor, Transport};
use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{info, warn};

use crate::ClientError;

pub(crate) type RefreshOutcome = Result<AccessToken, ClientError>;
pub(crate) type SharedRefresh = Shared<BoxFuture<'static, RefreshOutcome>>;

/// The one refresh slot of a client.
///
/// Holds the in-flight refresh, if any. Every caller that finds it occupied
/// awaits the same shared future; the refresh task empties the slot when it
/// finishes.
#[derive(Default)]
pub(crate) struct RefreshSlot {
    current: Mutex<Option<(u64, SharedRefresh)>>,
    next_id: AtomicU64,
    started: AtomicU64,
}

impl RefreshSlot {
    /// Join the in-flight refresh, or start one with `start`.
    ///
    /// `start` runs under the slot lock, so a refresh that completes
    /// immediately still finds itself installed when it calls `finish`.
    pub(crate) fn join_or_start<F>(&self, start: F) -> SharedRefresh
    where
        F: FnOnce(u64) -> BoxFuture<'static, RefreshOutcome>,
    {
        let mut slot = self.lock();
        if let Some((_, inflight)) = slot.as_ref() {
            return inflight.clone();
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.started.fetch_add(1, Ordering::Relaxed);
        let fut = start(id).shared();
        *slot = Some((id, fut.clone()));
        fut
    }

    /// Empty the slot if it still holds refresh `id`.
    pub(crate) fn finish(&self, id: u64) {
        let mut slot = self.lock();
        if matches!(slot.as_ref(), Some((current, _)) if *current == id) {
            *slot = None;
        }
    }

    /// Whether a refresh is in flight.
    pub(crate) fn is_pending(&self) -> bool {
        self.lock().is_some()
    }

    /// Number of refresh calls started so far.
    pub(crate) fn started(&self) -> u64 {
        self.started.load(Ordering::Relaxed)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<(u64, SharedRefresh)>> {
        self.current
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Spawn the refresh call for slot entry `id`.
///
/// The call runs in its own task so it completes, and updates the session,
/// even if every request waiting on it is dropped.
pub(crate) fn spawn_refresh(
    id: u64,
    slot: Arc<RefreshSlot>,
    transport: Arc<dyn Transport>,
    session: SessionStore,
    refresh_path: String,
) -> BoxFuture<'static, RefreshOutcome> {
    let task_slot = slot.clone();
    let handle = tokio::spawn(async move {
        let outcome = run_refresh(transport.as_ref(), &session, &refresh_path).await;
        task_slot.finish(id);
        outcome
    });

    async move {
        let outcome = handle
            .await
            .unwrap_or_else(|e| Err(ClientError::Internal(format!("refresh task failed: {}", e))));
        slot.finish(id);
        outcome
    }
    .boxed()
}

/// Call the refresh endpoint and apply the outcome to the session.
///
/// Any failure clears the session and becomes `Unauthenticated`.
async fn run_refresh(
    transport: &dyn Transport,
    session: &SessionStore,
    refresh_path: &str,
) -> RefreshOutcome {
    let request = RequestDescriptor::post(refresh_path).anonymous();
    info!(path = refresh_path, "refreshing access token");

    let failure = match transport.send(&request, None).await {
        Ok(response) if response.is_success() => {
            let credentials = response
                .envelope::<Credentials>()
                .map(|env: Envelope<Credentials>| env.data)
                .or_else(|_| response.json::<Credentials>());
            match credentials {
                Ok(credentials) => {
                    let token = credentials.access_token.clone();
                    session.set_credentials(credentials);
                    info!("access token refreshed");
                    return Ok(token);
                }
                Err(e) => Some(format!("malformed refresh response: {}", e)),
            }
        }
        Ok(response) => response.error_body().message,
        Err(e) => Some(e.to_string()),
    };

    warn!(reason = failure.as_deref().unwrap_or("refused"), "token refresh failed");
    session.clear();
    Err(ClientError::Unauthenticated { message: failure })
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::future;

    #[tokio::test]
    async fn test_join_shares_inflight() {
        let slot = RefreshSlot::default();
        let (tx, rx) = tokio::sync::oneshot::channel::<()>();

        let first = slot.join_or_start(move |_| {
            async move {
                let _ = rx.await;
                Ok(AccessToken::new("t"))
            }
            .boxed()
        });
        let second = slot.join_or_start(|_| future::ready(Ok(AccessToken::new("other"))).boxed());

        assert!(slot.is_pending());
        assert_eq!(slot.started(), 1);

        tx.send(()).unwrap();
        let (a, b) = future::join(first, second).await;
        assert_eq!(a.unwrap().as_str(), "t");
        assert_eq!(b.unwrap().as_str(), "t");
    }

    #[test]
    fn test_finish_ignores_other_ids() {
        let slot = RefreshSlot::default();
        let _ = slot.join_or_start(|_| future::ready(Ok(AccessToken::new("t"))).boxed());
        slot.finish(99);
        assert!(slot.is_pending());
        slot.finish(0);
        assert!(!slot.is_pending());
        let _ = slot.join_or_start(|id| {
            assert_eq!(id, 1);
            future::ready(Ok(AccessToken::new("t2"))).boxed()
        });
        assert_eq!(slot.started(), 2);
    }
}
