//! Cache entries.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use futures::future::{BoxFuture, Shared};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::key::CacheKey;
use crate::store::Loader;
use crate::tag::Tag;

/// Lifecycle of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Known key, never loaded (or cleared).
    Idle,
    /// Loader running.
    Pending,
    /// Holds fresh data.
    Fulfilled,
    /// Invalidated; must be re-fetched before it is trusted.
    Stale,
    /// Last load failed.
    Failed,
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Pending => write!(f, "PENDING"),
            Self::Fulfilled => write!(f, "FULFILLED"),
            Self::Stale => write!(f, "STALE"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

pub(crate) type InFlight<V, E> = Shared<BoxFuture<'static, Result<V, E>>>;

pub(crate) struct Entry<V, E> {
    pub(crate) tags: BTreeSet<Tag>,
    pub(crate) status: EntryStatus,
    pub(crate) data: Option<V>,
    pub(crate) error: Option<E>,
    pub(crate) subscribers: usize,
    pub(crate) last_updated: Option<DateTime<Utc>>,
    /// Last read, settle or unsubscribe; drives eviction.
    pub(crate) touched: Instant,
    pub(crate) loader: Option<Loader<V, E>>,
    pub(crate) inflight: Option<InFlight<V, E>>,
    /// Load detached by invalidation that may still be running. The next
    /// load waits for it before calling the loader.
    pub(crate) detached: Option<(u64, InFlight<V, E>)>,
    /// Bumped whenever an in-flight load is superseded.
    pub(crate) generation: u64,
    pub(crate) notify: watch::Sender<EntryStatus>,
}

impl<V: Clone, E: Clone> Entry<V, E> {
    pub(crate) fn new() -> Self {
        Self {
            tags: BTreeSet::new(),
            status: EntryStatus::Idle,
            data: None,
            error: None,
            subscribers: 0,
            last_updated: None,
            touched: Instant::now(),
            loader: None,
            inflight: None,
            detached: None,
            generation: 0,
            notify: watch::channel(EntryStatus::Idle).0,
        }
    }

    /// Stop storing the result of the current load, keeping it as the
    /// predecessor of the next one.
    pub(crate) fn detach(&mut self) {
        if let Some(inflight) = self.inflight.take() {
            self.detached = Some((self.generation, inflight));
        }
        self.generation += 1;
    }

    pub(crate) fn set_status(&mut self, status: EntryStatus) {
        self.status = status;
        self.notify.send_replace(status);
    }

    pub(crate) fn snapshot(&self, key: &CacheKey) -> EntrySnapshot<V, E> {
        EntrySnapshot {
            key: key.clone(),
            tags: self.tags.iter().cloned().collect(),
            status: self.status,
            data: self.data.clone(),
            error: self.error.clone(),
            subscriber_count: self.subscribers,
            last_updated: self.last_updated,
        }
    }
}

/// Point-in-time view of an entry.
#[derive(Debug, Clone)]
pub struct EntrySnapshot<V, E> {
    pub key: CacheKey,
    pub tags: Vec<Tag>,
    pub status: EntryStatus,
    /// Last loaded data. Only trustworthy when `status` is `Fulfilled`.
    pub data: Option<V>,
    pub error: Option<E>,
    pub subscriber_count: usize,
    pub last_updated: Option<DateTime<Utc>>,
}
