//! Tag-indexed cache.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use chrono::Utc;
use futures::future::{BoxFuture, FutureExt};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::config::CacheConfig;
use crate::entry::{Entry, EntrySnapshot, EntryStatus, InFlight};
use crate::key::CacheKey;
use crate::tag::{intersects, Tag};
use crate::CacheError;

/// Re-runnable load function for one read.
pub type Loader<V, E> = Arc<dyn Fn() -> BoxFuture<'static, Result<V, E>> + Send + Sync>;

/// Wrap an async closure as a [`Loader`].
pub fn loader<V, E, F, Fut>(f: F) -> Loader<V, E>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
{
    Arc::new(move || f().boxed())
}

/// Options for a single read.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReadOptions {
    /// Bypass fulfilled data and load again. An in-flight load is still
    /// shared.
    pub force_refresh: bool,
}

impl ReadOptions {
    /// Options that bypass cached data.
    pub fn force_refresh() -> Self {
        Self {
            force_refresh: true,
        }
    }
}

struct Inner<V, E> {
    entries: Mutex<HashMap<CacheKey, Entry<V, E>>>,
    config: CacheConfig,
}

/// Keyed store of read results with dependency tags.
///
/// - Fulfilled entries are served without calling the loader.
/// - Concurrent reads of one key share a single loader call.
/// - [`TagCache::invalidate`] marks matching entries stale and reloads the
///   ones that have subscribers.
///
/// Loads run in spawned tasks, so a load completes and updates the cache
/// even when every reader waiting on it has gone away. Cloning yields
/// another handle to the same cache.
pub struct TagCache<V, E> {
    inner: Arc<Inner<V, E>>,
}

impl<V, E> Clone for TagCache<V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<V, E> TagCache<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<CacheError> + 'static,
{
    /// Create an empty cache.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                entries: Mutex::new(HashMap::new()),
                config,
            }),
        }
    }

    /// Cache configuration.
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Read `key`, loading it with `loader` when there is no fresh data.
    ///
    /// `tags` are the tags the result provides; they replace the entry's
    /// tags whenever a new load starts.
    pub async fn read(
        &self,
        key: CacheKey,
        tags: impl IntoIterator<Item = Tag>,
        loader: Loader<V, E>,
        options: ReadOptions,
    ) -> Result<V, E> {
        let inflight = {
            let mut entries = self.inner.lock();
            let now = Instant::now();
            self.inner.sweep(&mut entries, now);

            let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
            entry.touched = now;

            if let Some(inflight) = &entry.inflight {
                trace!(%key, "joining in-flight load");
                inflight.clone()
            } else {
                let hit = match &entry.data {
                    Some(data)
                        if entry.status == EntryStatus::Fulfilled && !options.force_refresh =>
                    {
                        Some(data.clone())
                    }
                    _ => None,
                };
                if let Some(data) = hit {
                    trace!(%key, "cache hit");
                    return Ok(data);
                }
                entry.tags = tags.into_iter().collect();
                entry.loader = Some(loader);
                start_load(&self.inner, &key, entry)
            }
        };
        inflight.await
    }

    /// Mark every entry whose tags intersect `tags` stale.
    ///
    /// A matching entry's in-flight load is detached: readers already
    /// waiting on it still get its result, but the result is not stored,
    /// and the next load of the key starts only once it has settled.
    /// Entries with subscribers reload immediately; the rest reload on
    /// their next read. Returns the number of entries affected.
    pub fn invalidate(&self, tags: &[Tag]) -> usize {
        if tags.is_empty() {
            return 0;
        }
        let mut entries = self.inner.lock();
        let mut affected = 0;
        let mut reloaded = 0;

        for (key, entry) in entries.iter_mut() {
            if !intersects(tags, &entry.tags) {
                continue;
            }
            affected += 1;
            entry.detach();
            entry.set_status(EntryStatus::Stale);

            if entry.subscribers > 0 && entry.loader.is_some() {
                let _ = start_load(&self.inner, key, entry);
                reloaded += 1;
            }
        }

        debug!(
            tags = %display_tags(tags),
            affected,
            reloaded,
            "invalidated cache entries"
        );
        affected
    }

    /// Drop the data of every entry whose tags intersect `tags` without
    /// reloading anything. Returns the number of entries affected.
    pub fn clear_tags(&self, tags: &[Tag]) -> usize {
        if tags.is_empty() {
            return 0;
        }
        let mut entries = self.inner.lock();
        let mut affected = 0;
        for entry in entries.values_mut() {
            if !intersects(tags, &entry.tags) {
                continue;
            }
            affected += 1;
            entry.detach();
            entry.data = None;
            entry.error = None;
            entry.last_updated = None;
            entry.set_status(EntryStatus::Idle);
        }
        debug!(tags = %display_tags(tags), affected, "cleared cache entries");
        affected
    }

    /// Register interest in `key`.
    ///
    /// While at least one subscription is alive the entry is never evicted
    /// and is reloaded as soon as it is invalidated.
    pub fn subscribe(&self, key: CacheKey) -> Subscription<V, E> {
        let mut entries = self.inner.lock();
        let now = Instant::now();
        self.inner.sweep(&mut entries, now);

        let entry = entries.entry(key.clone()).or_insert_with(Entry::new);
        entry.subscribers += 1;
        entry.touched = now;
        trace!(%key, subscribers = entry.subscribers, "subscribed");

        Subscription {
            cache: Arc::downgrade(&self.inner),
            status: entry.notify.subscribe(),
            key,
        }
    }

    /// Snapshot of one entry.
    pub fn snapshot(&self, key: &CacheKey) -> Option<EntrySnapshot<V, E>> {
        self.inner.lock().get(key).map(|e| e.snapshot(key))
    }

    /// Evict entries past the retention window. Returns the number evicted.
    pub fn purge_expired(&self) -> usize {
        let mut entries = self.inner.lock();
        self.inner.sweep(&mut entries, Instant::now())
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V, E> Inner<V, E> {
    fn lock(&self) -> MutexGuard<'_, HashMap<CacheKey, Entry<V, E>>> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Drop entries nobody subscribes to, nothing is loading, and that have
    /// been untouched for longer than the retention window.
    fn sweep(&self, entries: &mut HashMap<CacheKey, Entry<V, E>>, now: Instant) -> usize {
        let retention = self.config.retention();
        let before = entries.len();
        entries.retain(|_, e| {
            e.subscribers > 0
                || e.inflight.is_some()
                || e.detached.is_some()
                || now.saturating_duration_since(e.touched) < retention
        });
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "evicted expired cache entries");
        }
        evicted
    }
}

impl<V: Clone, E: Clone> Inner<V, E> {
    /// Store the outcome of load `generation` unless it was superseded.
    fn settle(&self, key: &CacheKey, generation: u64, result: &Result<V, E>) {
        let mut entries = self.lock();
        let Some(entry) = entries.get_mut(key) else {
            return;
        };
        if entry.generation != generation {
            if matches!(entry.detached, Some((g, _)) if g == generation) {
                entry.detached = None;
            }
            trace!(%key, "discarding superseded load");
            return;
        }
        entry.inflight = None;
        entry.detached = None;
        entry.touched = Instant::now();
        match result {
            Ok(data) => {
                entry.data = Some(data.clone());
                entry.error = None;
                entry.last_updated = Some(Utc::now());
                entry.set_status(EntryStatus::Fulfilled);
            }
            Err(err) => {
                entry.error = Some(err.clone());
                entry.set_status(EntryStatus::Failed);
            }
        }
        trace!(%key, status = %entry.status, "load settled");
    }
}

/// Start a load for `entry`, which must already hold its loader.
///
/// Called with the entries lock held; the spawned task settles through a
/// weak handle once it can take the lock.
fn start_load<V, E>(inner: &Arc<Inner<V, E>>, key: &CacheKey, entry: &mut Entry<V, E>) -> InFlight<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + From<CacheError> + 'static,
{
    entry.generation += 1;
    let generation = entry.generation;

    let Some(loader) = entry.loader.clone() else {
        let err = E::from(CacheError::LoaderAborted {
            key: key.to_string(),
            reason: "no loader registered".to_string(),
        });
        return futures::future::ready(Err(err)).boxed().shared();
    };

    debug!(%key, generation, "loading");
    let predecessor = entry.detached.take();
    let weak: Weak<Inner<V, E>> = Arc::downgrade(inner);
    let task_key = key.clone();
    let handle = tokio::spawn(async move {
        if let Some((_, predecessor)) = predecessor {
            trace!(key = %task_key, "waiting for detached load");
            let _ = predecessor.await;
        }
        let result = loader().await;
        if let Some(inner) = weak.upgrade() {
            inner.settle(&task_key, generation, &result);
        }
        result
    });

    let weak = Arc::downgrade(inner);
    let wait_key = key.clone();
    let inflight = async move {
        match handle.await {
            Ok(result) => result,
            Err(join_err) => {
                let err = E::from(CacheError::LoaderAborted {
                    key: wait_key.to_string(),
                    reason: join_err.to_string(),
                });
                let result = Err(err);
                if let Some(inner) = weak.upgrade() {
                    inner.settle(&wait_key, generation, &result);
                }
                result
            }
        }
    }
    .boxed()
    .shared();

    entry.inflight = Some(inflight.clone());
    entry.set_status(EntryStatus::Pending);
    inflight
}

fn display_tags(tags: &[Tag]) -> String {
    tags.iter()
        .map(Tag::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Live interest in one cache key.
///
/// Dropping the subscription, or calling [`Subscription::unsubscribe`],
/// decrements the entry's subscriber count. It never cancels a load.
#[must_use = "dropping the subscription unsubscribes immediately"]
#[derive(Debug)]
pub struct Subscription<V, E> {
    cache: Weak<Inner<V, E>>,
    status: watch::Receiver<EntryStatus>,
    key: CacheKey,
}

impl<V: Clone, E: Clone> Subscription<V, E> {
    /// The subscribed key.
    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Current status of the entry.
    pub fn status(&self) -> EntryStatus {
        *self.status.borrow()
    }

    /// Wait for the next status change. Returns `None` once the entry is
    /// gone.
    pub async fn changed(&mut self) -> Option<EntryStatus> {
        self.status.changed().await.ok()?;
        let status = *self.status.borrow_and_update();
        Some(status)
    }

    /// Wait until the entry reaches `Fulfilled` or `Failed`.
    pub async fn settled(&mut self) -> Option<EntryStatus> {
        loop {
            let status = *self.status.borrow_and_update();
            if matches!(status, EntryStatus::Fulfilled | EntryStatus::Failed) {
                return Some(status);
            }
            self.status.changed().await.ok()?;
        }
    }

    /// Snapshot of the entry.
    pub fn snapshot(&self) -> Option<EntrySnapshot<V, E>> {
        let inner = self.cache.upgrade()?;
        let entries = inner.lock();
        entries.get(&self.key).map(|e| e.snapshot(&self.key))
    }

    /// Drop the subscription now.
    pub fn unsubscribe(self) {}
}

impl<V, E> Drop for Subscription<V, E> {
    fn drop(&mut self) {
        let Some(inner) = self.cache.upgrade() else {
            return;
        };
        let mut entries = inner.lock();
        if let Some(entry) = entries.get_mut(&self.key) {
            entry.subscribers = entry.subscribers.saturating_sub(1);
            if entry.subscribers == 0 {
                entry.touched = Instant::now();
            }
            trace!(key = %self.key, subscribers = entry.subscribers, "unsubscribed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum TestError {
        Load(String),
        Cache(CacheError),
    }

    impl From<CacheError> for TestError {
        fn from(e: CacheError) -> Self {
            TestError::Cache(e)
        }
    }

    type Cache = TagCache<String, TestError>;

    fn cache() -> Cache {
        TagCache::new(CacheConfig::default())
    }

    /// Loader returning `"<prefix>-<n>"` where n counts calls, after `delay`.
    fn counting(prefix: &'static str, delay: Duration) -> (Arc<AtomicUsize>, Loader<String, TestError>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let load = loader(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                Ok(format!("{}-{}", prefix, n))
            }
        });
        (calls, load)
    }

    fn events_key() -> CacheKey {
        CacheKey::new("getAllEvents()")
    }

    fn events_tags() -> Vec<Tag> {
        vec![Tag::collection("Events")]
    }

    #[tokio::test]
    async fn test_second_read_is_a_hit() {
        let cache = cache();
        let (calls, load) = counting("events", Duration::ZERO);

        let a = cache
            .read(events_key(), events_tags(), load.clone(), ReadOptions::default())
            .await
            .unwrap();
        let b = cache
            .read(events_key(), events_tags(), load, ReadOptions::default())
            .await
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let snap = cache.snapshot(&events_key()).unwrap();
        assert_eq!(snap.status, EntryStatus::Fulfilled);
        assert!(snap.last_updated.is_some());
    }

    #[tokio::test]
    async fn test_concurrent_reads_share_one_load() {
        let cache = cache();
        let (calls, load) = counting("event7", Duration::from_millis(20));
        let key = CacheKey::new(r#"getEventById({"id":"7"})"#);
        let tags = vec![Tag::item("Events", "7")];

        let (a, b) = tokio::join!(
            cache.read(key.clone(), tags.clone(), load.clone(), ReadOptions::default()),
            cache.read(key.clone(), tags.clone(), load.clone(), ReadOptions::default()),
        );
        assert_eq!(a.unwrap(), "event7-1");
        assert_eq!(b.unwrap(), "event7-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_hit() {
        let cache = cache();
        let (calls, load) = counting("events", Duration::ZERO);

        cache
            .read(events_key(), events_tags(), load.clone(), ReadOptions::default())
            .await
            .unwrap();
        let fresh = cache
            .read(events_key(), events_tags(), load, ReadOptions::force_refresh())
            .await
            .unwrap();
        assert_eq!(fresh, "events-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_load_is_retried() {
        let cache = cache();
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let load: Loader<String, TestError> = loader(move || {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(TestError::Load("server down".into()))
                } else {
                    Ok("ok".to_string())
                }
            }
        });

        let err = cache
            .read(events_key(), events_tags(), load.clone(), ReadOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err, TestError::Load("server down".into()));
        assert_eq!(cache.snapshot(&events_key()).unwrap().status, EntryStatus::Failed);

        let ok = cache
            .read(events_key(), events_tags(), load, ReadOptions::default())
            .await
            .unwrap();
        assert_eq!(ok, "ok");
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_marks_unsubscribed_stale() {
        let cache = cache();
        let (calls, load) = counting("events", Duration::ZERO);

        cache
            .read(events_key(), events_tags(), load.clone(), ReadOptions::default())
            .await
            .unwrap();
        assert_eq!(cache.invalidate(&[Tag::item("Events", "42")]), 1);
        assert_eq!(cache.snapshot(&events_key()).unwrap().status, EntryStatus::Stale);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let again = cache
            .read(events_key(), events_tags(), load, ReadOptions::default())
            .await
            .unwrap();
        assert_eq!(again, "events-2");
    }

    #[tokio::test]
    async fn test_invalidate_ignores_unrelated_entries() {
        let cache = cache();
        let (_, load) = counting("events", Duration::ZERO);
        cache
            .read(events_key(), events_tags(), load, ReadOptions::default())
            .await
            .unwrap();

        assert_eq!(cache.invalidate(&[Tag::collection("Placements")]), 0);
        assert_eq!(cache.invalidate(&[]), 0);
        assert_eq!(cache.snapshot(&events_key()).unwrap().status, EntryStatus::Fulfilled);
    }

    #[tokio::test]
    async fn test_invalidate_reloads_subscribed_entries() {
        let cache = cache();
        let (calls, load) = counting("events", Duration::from_millis(5));

        let mut sub = cache.subscribe(events_key());
        cache
            .read(events_key(), events_tags(), load.clone(), ReadOptions::default())
            .await
            .unwrap();

        cache.invalidate(&[Tag::collection("Events")]);
        assert_eq!(sub.status(), EntryStatus::Pending);
        assert_eq!(sub.settled().await, Some(EntryStatus::Fulfilled));
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        // The reload is now cached; reading does not load again.
        let data = cache
            .read(events_key(), events_tags(), load, ReadOptions::default())
            .await
            .unwrap();
        assert_eq!(data, "events-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(sub.snapshot().unwrap().subscriber_count, 1);
    }

    #[tokio::test]
    async fn test_invalidate_detaches_pending_load() {
        let cache = cache();
        let (calls, load) = counting("events", Duration::from_millis(30));

        let early = {
            let cache = cache.clone();
            let load = load.clone();
            tokio::spawn(async move {
                cache
                    .read(events_key(), events_tags(), load, ReadOptions::default())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert_eq!(cache.snapshot(&events_key()).unwrap().status, EntryStatus::Pending);

        cache.invalidate(&events_tags());
        let late = cache
            .read(events_key(), events_tags(), load, ReadOptions::default())
            .await
            .unwrap();

        assert_eq!(early.await.unwrap().unwrap(), "events-1");
        assert_eq!(late, "events-2");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            cache.snapshot(&events_key()).unwrap().data.as_deref(),
            Some("events-2")
        );
    }

    #[tokio::test]
    async fn test_reload_after_invalidate_waits_for_detached_load() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let live = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let load = {
            let (calls, live, peak) = (calls.clone(), live.clone(), peak.clone());
            loader(move || {
                let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
                let (live, peak) = (live.clone(), peak.clone());
                async move {
                    let now = live.fetch_add(1, Ordering::SeqCst) + 1;
                    peak.fetch_max(now, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    live.fetch_sub(1, Ordering::SeqCst);
                    Ok::<_, TestError>(format!("events-{}", n))
                }
            })
        };

        let mut sub = cache.subscribe(events_key());
        let first = {
            let cache = cache.clone();
            let load = load.clone();
            tokio::spawn(async move {
                cache
                    .read(events_key(), events_tags(), load, ReadOptions::default())
                    .await
            })
        };
        tokio::time::sleep(Duration::from_millis(5)).await;

        // Subscribed, so this starts a reload while the first call runs.
        cache.invalidate(&events_tags());
        let second = cache
            .read(events_key(), events_tags(), load, ReadOptions::default())
            .await
            .unwrap();

        assert_eq!(first.await.unwrap().unwrap(), "events-1");
        assert_eq!(second, "events-2");
        assert_eq!(sub.settled().await, Some(EntryStatus::Fulfilled));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(peak.load(Ordering::SeqCst), 1);
        assert_eq!(
            cache.snapshot(&events_key()).unwrap().data.as_deref(),
            Some("events-2")
        );
    }

    #[tokio::test]
    async fn test_dropped_reader_does_not_cancel_load() {
        let cache = cache();
        let (calls, load) = counting("events", Duration::from_millis(20));

        let gave_up = tokio::time::timeout(
            Duration::from_millis(5),
            cache.read(events_key(), events_tags(), load.clone(), ReadOptions::default()),
        )
        .await;
        assert!(gave_up.is_err());

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(cache.snapshot(&events_key()).unwrap().status, EntryStatus::Fulfilled);

        let data = cache
            .read(events_key(), events_tags(), load, ReadOptions::default())
            .await
            .unwrap();
        assert_eq!(data, "events-1");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_clear_tags_drops_data_without_reload() {
        let cache = cache();
        let (calls, load) = counting("notes", Duration::ZERO);
        let key = CacheKey::new("getComplaintNotifications()");
        let tags = vec![Tag::collection("Notifications")];

        let _sub = cache.subscribe(key.clone());
        cache
            .read(key.clone(), tags.clone(), load.clone(), ReadOptions::default())
            .await
            .unwrap();

        assert_eq!(cache.clear_tags(&tags), 1);
        let snap = cache.snapshot(&key).unwrap();
        assert_eq!(snap.status, EntryStatus::Idle);
        assert!(snap.data.is_none());
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let next = cache
            .read(key, tags, load, ReadOptions::default())
            .await
            .unwrap();
        assert_eq!(next, "notes-2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_unsubscribed_entries_evicted_after_retention() {
        let cache: Cache = TagCache::new(CacheConfig::default().with_retention(Duration::from_secs(60)));
        let (_, load) = counting("x", Duration::ZERO);

        cache
            .read(CacheKey::new("a"), Vec::<Tag>::new(), load.clone(), ReadOptions::default())
            .await
            .unwrap();
        let sub = cache.subscribe(CacheKey::new("b"));
        cache
            .read(CacheKey::new("b"), Vec::<Tag>::new(), load, ReadOptions::default())
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.purge_expired(), 0);

        tokio::time::advance(Duration::from_secs(31)).await;
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.snapshot(&CacheKey::new("a")).is_none());
        assert!(cache.snapshot(&CacheKey::new("b")).is_some());

        sub.unsubscribe();
        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(cache.purge_expired(), 1);
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_subscription_counts() {
        let cache = cache();
        let a = cache.subscribe(events_key());
        let b = cache.subscribe(events_key());
        assert_eq!(cache.snapshot(&events_key()).unwrap().subscriber_count, 2);
        drop(a);
        assert_eq!(b.snapshot().unwrap().subscriber_count, 1);
        assert_eq!(b.status(), EntryStatus::Idle);
    }
}
