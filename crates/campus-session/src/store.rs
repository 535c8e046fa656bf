//! Process-wide session store.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use tracing::{debug, info};

use crate::session::{Credentials, Session};
use crate::token::AccessToken;

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

struct Inner {
    session: RwLock<Session>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener: AtomicU64,
}

/// Holder of the current credential and identity.
///
/// Cloning yields another handle to the same store. The store is built
/// explicitly and handed to whoever needs it; there is no global instance.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<Inner>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore")
            .field("session", &self.current())
            .finish()
    }
}

impl SessionStore {
    /// Create a store holding the empty session.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                session: RwLock::new(Session::empty()),
                listeners: Mutex::new(Vec::new()),
                next_listener: AtomicU64::new(0),
            }),
        }
    }

    /// Snapshot of the current session.
    pub fn current(&self) -> Session {
        self.read().clone()
    }

    /// Current bearer token, if any.
    pub fn access_token(&self) -> Option<AccessToken> {
        self.read().access_token.clone()
    }

    /// Whether a credential is held.
    pub fn is_authenticated(&self) -> bool {
        self.read().is_authenticated
    }

    /// Merge new credentials onto the session.
    ///
    /// The token is always replaced; the user is replaced only when the
    /// credentials carry one.
    pub fn set_credentials(&self, credentials: Credentials) {
        let snapshot = {
            let mut session = self.write();
            session.access_token = Some(credentials.access_token);
            if let Some(user) = credentials.user {
                session.user = Some(user);
            }
            session.is_authenticated = true;
            session.clone()
        };
        debug!(
            user = snapshot.user.as_ref().map(|u| u.username.as_str()),
            "session credentials set"
        );
        self.notify(&snapshot);
    }

    /// Reset to the empty session.
    pub fn clear(&self) {
        let was_authenticated = {
            let mut session = self.write();
            let was = session.is_authenticated;
            *session = Session::empty();
            was
        };
        if was_authenticated {
            info!("session cleared");
        }
        self.notify(&Session::empty());
    }

    /// Register a change listener.
    ///
    /// The listener runs after every `set_credentials` and `clear`, outside
    /// the store's locks. It stays registered until the returned handle is
    /// dropped or unsubscribed.
    pub fn on_change<F>(&self, listener: F) -> ListenerHandle
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        let id = self.inner.next_listener.fetch_add(1, Ordering::Relaxed);
        self.listeners().push((id, Arc::new(listener)));
        ListenerHandle {
            store: Arc::downgrade(&self.inner),
            id,
        }
    }

    /// Number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.listeners().len()
    }

    fn notify(&self, session: &Session) {
        let listeners: Vec<Listener> = self.listeners().iter().map(|(_, l)| l.clone()).collect();
        for listener in listeners {
            listener(session);
        }
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Session> {
        self.inner
            .session
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Session> {
        self.inner
            .session
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn listeners(&self) -> std::sync::MutexGuard<'_, Vec<(u64, Listener)>> {
        lock_listeners(&self.inner)
    }
}

fn lock_listeners(inner: &Inner) -> std::sync::MutexGuard<'_, Vec<(u64, Listener)>> {
    inner
        .listeners
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Registration returned by [`SessionStore::on_change`].
///
/// Dropping the handle removes the listener.
#[must_use = "dropping the handle unregisters the listener"]
pub struct ListenerHandle {
    store: Weak<Inner>,
    id: u64,
}

impl ListenerHandle {
    /// Remove the listener now.
    pub fn unsubscribe(self) {}
}

impl Drop for ListenerHandle {
    fn drop(&mut self) {
        if let Some(inner) = self.store.upgrade() {
            lock_listeners(&inner).retain(|(id, _)| *id != self.id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::Identity;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_set_credentials_authenticates() {
        let store = SessionStore::new();
        assert!(!store.is_authenticated());

        store.set_credentials(Credentials::token("t1").with_user(Identity::new("u1", "ana")));
        let session = store.current();
        assert!(session.is_authenticated);
        assert_eq!(session.access_token.unwrap().as_str(), "t1");
        assert_eq!(session.user.unwrap().username, "ana");
    }

    #[test]
    fn test_set_credentials_merges_user() {
        let store = SessionStore::new();
        store.set_credentials(Credentials::token("t1").with_user(Identity::new("u1", "ana")));
        store.set_credentials(Credentials::token("t2"));

        let session = store.current();
        assert_eq!(session.access_token.unwrap().as_str(), "t2");
        assert_eq!(session.user.unwrap().id, "u1");
    }

    #[test]
    fn test_clear_resets() {
        let store = SessionStore::new();
        store.set_credentials(Credentials::token("t1"));
        store.clear();
        assert_eq!(store.current(), Session::empty());
        assert!(store.access_token().is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let store = SessionStore::new();
        let other = store.clone();
        store.set_credentials(Credentials::token("t1"));
        assert!(other.is_authenticated());
    }

    #[test]
    fn test_listener_notified_until_dropped() {
        let store = SessionStore::new();
        let seen = Arc::new(AtomicUsize::new(0));

        let counter = seen.clone();
        let handle = store.on_change(move |session| {
            assert_eq!(session.is_authenticated, session.access_token.is_some());
            counter.fetch_add(1, Ordering::SeqCst);
        });
        assert_eq!(store.listener_count(), 1);

        store.set_credentials(Credentials::token("t1"));
        store.clear();
        assert_eq!(seen.load(Ordering::SeqCst), 2);

        handle.unsubscribe();
        assert_eq!(store.listener_count(), 0);
        store.set_credentials(Credentials::token("t2"));
        assert_eq!(seen.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_listener_may_read_store() {
        let store = SessionStore::new();
        let reader = store.clone();
        let _handle = store.on_change(move |session| {
            assert_eq!(reader.current(), *session);
        });
        store.set_credentials(Credentials::token("t1"));
    }
}
