// ── Generic keyed query cache ──
//
// One `QueryCache<T>` per payload type. Each key owns a `watch` channel
// holding its `QueryState`, a fetch lock that collapses concurrent
// fetches into one network call, and the most recent fetcher so an
// invalidation can refetch without the caller.

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use futures_util::future::BoxFuture;
use tokio::sync::{Mutex, watch};
use tracing::{debug, trace, warn};

use super::key::{QueryFamily, QueryKey};
use crate::error::CoreError;
use crate::stream::QueryObserver;

/// Produces one fetch of a query's payload.
pub type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<'static, Result<T, CoreError>> + Send + Sync>;

// ── QueryState ───────────────────────────────────────────────────────

/// Cached state of one query key.
#[derive(Debug)]
pub struct QueryState<T> {
    /// Last successfully fetched payload. Survives later failures.
    pub data: Option<Arc<T>>,
    /// Error from the most recent fetch, cleared by the next success.
    pub error: Option<Arc<CoreError>>,
    pub fetched_at: Option<DateTime<Utc>>,
    /// Set by invalidation until a fetch started afterwards settles.
    pub is_stale: bool,
    pub is_fetching: bool,
    /// Number of settled fetches.
    pub version: u64,
    /// Bumped by every invalidation. A fetch that started under an older
    /// generation leaves the entry stale.
    generation: u64,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            fetched_at: None,
            is_stale: false,
            is_fetching: false,
            version: 0,
            generation: 0,
        }
    }
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            fetched_at: self.fetched_at,
            is_stale: self.is_stale,
            is_fetching: self.is_fetching,
            version: self.version,
            generation: self.generation,
        }
    }
}

impl<T> QueryState<T> {
    /// Whether a read must go to the network.
    ///
    /// A cached error counts as settled: it is served until the key is
    /// invalidated or explicitly refetched.
    fn needs_fetch(&self, stale_time: Duration, now: DateTime<Utc>) -> bool {
        if self.is_stale || self.version == 0 {
            return true;
        }
        if self.error.is_some() {
            return false;
        }
        match self.fetched_at {
            Some(at) => chrono::Duration::from_std(stale_time).is_ok_and(|ttl| now - at >= ttl),
            None => true,
        }
    }
}

// ── QueryResult ──────────────────────────────────────────────────────

/// What a read returns: the shape every view consumes.
#[derive(Debug)]
pub struct QueryResult<T> {
    pub data: Option<Arc<T>>,
    /// Nothing has settled for this key yet.
    pub is_loading: bool,
    pub error: Option<Arc<CoreError>>,
    pub is_stale: bool,
}

impl<T> QueryResult<T> {
    /// The result of a disabled query: loading, no data, no error.
    pub fn loading() -> Self {
        Self {
            data: None,
            is_loading: true,
            error: None,
            is_stale: false,
        }
    }

    /// Data if present, otherwise the cached error, otherwise `NotReady`.
    pub fn into_result(self) -> Result<Arc<T>, Arc<CoreError>> {
        match (self.data, self.error) {
            (Some(data), _) => Ok(data),
            (None, Some(err)) => Err(err),
            (None, None) => Err(Arc::new(CoreError::NotReady)),
        }
    }
}

impl<T> Clone for QueryResult<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            is_loading: self.is_loading,
            error: self.error.clone(),
            is_stale: self.is_stale,
        }
    }
}

impl<T> From<&QueryState<T>> for QueryResult<T> {
    fn from(state: &QueryState<T>) -> Self {
        Self {
            data: state.data.clone(),
            is_loading: state.data.is_none() && state.error.is_none(),
            error: state.error.clone(),
            is_stale: state.is_stale,
        }
    }
}

// ── Entry ────────────────────────────────────────────────────────────

struct Entry<T> {
    state: watch::Sender<QueryState<T>>,
    fetch_lock: Mutex<()>,
    fetcher: RwLock<Option<Fetcher<T>>>,
}

impl<T: Send + Sync + 'static> Entry<T> {
    fn new() -> Self {
        let (state, _) = watch::channel(QueryState::default());
        Self {
            state,
            fetch_lock: Mutex::new(()),
            fetcher: RwLock::new(None),
        }
    }

    fn set_fetcher(&self, fetcher: Fetcher<T>) {
        *self.fetcher.write().unwrap_or_else(PoisonError::into_inner) = Some(fetcher);
    }

    fn fetcher(&self) -> Option<Fetcher<T>> {
        self.fetcher
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn result(&self) -> QueryResult<T> {
        QueryResult::from(&*self.state.borrow())
    }

    /// Run the stored fetcher unless a fetch that settled after
    /// `seen_version` already produced a usable result.
    async fn fetch(&self, key: &QueryKey, seen_version: u64) -> QueryResult<T> {
        let _guard = self.fetch_lock.lock().await;

        let generation = {
            let state = self.state.borrow();
            if state.version > seen_version && !state.is_stale {
                trace!(%key, "joined in-flight fetch");
                return QueryResult::from(&*state);
            }
            state.generation
        };

        let Some(fetcher) = self.fetcher() else {
            return self.result();
        };

        self.state.send_modify(|s| s.is_fetching = true);
        debug!(%key, "fetching");

        let outcome = fetcher().await;
        if let Err(e) = &outcome {
            warn!(%key, error = %e, "query failed; keeping last data");
        }

        self.state.send_modify(|s| {
            s.is_fetching = false;
            s.version += 1;
            s.is_stale = s.generation != generation;
            match outcome {
                Ok(data) => {
                    s.data = Some(Arc::new(data));
                    s.error = None;
                    s.fetched_at = Some(Utc::now());
                }
                Err(e) => s.error = Some(Arc::new(e)),
            }
        });

        self.result()
    }
}

// ── PendingQuery ─────────────────────────────────────────────────────

/// A read bound to one cache entry. See [`QueryCache::prepare`].
pub struct PendingQuery<T> {
    key: QueryKey,
    entry: Arc<Entry<T>>,
    stale_time: Duration,
}

impl<T: Send + Sync + 'static> PendingQuery<T> {
    pub async fn run(self) -> QueryResult<T> {
        let seen = {
            let state = self.entry.state.borrow();
            if !state.needs_fetch(self.stale_time, Utc::now()) {
                trace!(key = %self.key, "cache hit");
                return QueryResult::from(&*state);
            }
            state.version
        };

        self.entry.fetch(&self.key, seen).await
    }
}

// ── QueryCache ───────────────────────────────────────────────────────

/// Keyed cache for one payload type.
pub struct QueryCache<T> {
    entries: DashMap<QueryKey, Arc<Entry<T>>>,
    stale_time: Duration,
}

impl<T: Send + Sync + 'static> QueryCache<T> {
    pub fn new(stale_time: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            stale_time,
        }
    }

    fn entry(&self, key: &QueryKey) -> Arc<Entry<T>> {
        if let Some(entry) = self.entries.get(key) {
            return Arc::clone(entry.value());
        }
        Arc::clone(
            self.entries
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Entry::new()))
                .value(),
        )
    }

    fn existing(&self, key: &QueryKey) -> Option<Arc<Entry<T>>> {
        self.entries.get(key).map(|e| Arc::clone(e.value()))
    }

    /// Read `key`, fetching only when nothing fresh is cached.
    ///
    /// Concurrent calls for the same key share one fetch.
    pub async fn query(&self, key: &QueryKey, fetcher: Fetcher<T>) -> QueryResult<T> {
        self.prepare(key, fetcher).run().await
    }

    /// Bind a read to the current entry for `key` without running it.
    ///
    /// A `clear` after this point detaches the entry, so the read settles
    /// where nothing new can see it.
    pub fn prepare(&self, key: &QueryKey, fetcher: Fetcher<T>) -> PendingQuery<T> {
        let entry = self.entry(key);
        entry.set_fetcher(fetcher);
        PendingQuery {
            key: key.clone(),
            entry,
            stale_time: self.stale_time,
        }
    }

    /// Re-run the stored fetcher for `key` regardless of freshness.
    ///
    /// `None` when the key has never been queried.
    pub async fn refetch(&self, key: &QueryKey) -> Option<QueryResult<T>> {
        let entry = self.existing(key)?;
        let seen = entry.state.borrow().version;
        Some(entry.fetch(key, seen).await)
    }

    /// Current cached result without touching the network.
    pub fn peek(&self, key: &QueryKey) -> QueryResult<T> {
        self.existing(key)
            .map_or_else(QueryResult::loading, |entry| entry.result())
    }

    /// Subscribe to state changes of `key`. A live observer makes
    /// invalidation refetch in the background.
    pub fn observe(&self, key: &QueryKey) -> QueryObserver<T> {
        QueryObserver::new(self.entry(key).state.subscribe())
    }

    /// Mark `key` stale.
    pub fn invalidate(&self, key: &QueryKey) {
        if let Some(entry) = self.existing(key) {
            Self::invalidate_entry(key.clone(), entry);
        }
    }

    /// Mark every key of `family` stale.
    pub fn invalidate_family(&self, family: QueryFamily) {
        let matching: Vec<(QueryKey, Arc<Entry<T>>)> = self
            .entries
            .iter()
            .filter(|e| e.key().family() == family)
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect();

        for (key, entry) in matching {
            Self::invalidate_entry(key, entry);
        }
    }

    fn invalidate_entry(key: QueryKey, entry: Arc<Entry<T>>) {
        let mut seen = 0;
        entry.state.send_modify(|s| {
            s.is_stale = true;
            s.generation += 1;
            seen = s.version;
        });
        debug!(%key, "invalidated");

        if entry.state.receiver_count() == 0 || entry.fetcher().is_none() {
            return;
        }
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            trace!(%key, "no runtime; refetch deferred to next read");
            return;
        };
        runtime.spawn(async move {
            entry.fetch(&key, seen).await;
        });
    }

    /// Drop every entry. Observers see an empty state, and fetches still
    /// in flight settle into detached entries.
    pub fn clear(&self) {
        for entry in &self.entries {
            entry.value().state.send_modify(|s| {
                *s = QueryState {
                    generation: s.generation + 1,
                    ..QueryState::default()
                };
            });
        }
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use futures_util::FutureExt;

    use super::*;

    fn counting(calls: &Arc<AtomicUsize>, value: u32) -> Fetcher<u32> {
        let calls = Arc::clone(calls);
        Arc::new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Ok(value) }.boxed()
        })
    }

    fn failing(calls: &Arc<AtomicUsize>) -> Fetcher<u32> {
        let calls = Arc::clone(calls);
        Arc::new(move || {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(CoreError::Remote {
                    message: "boom".into(),
                    status: Some(500),
                })
            }
            .boxed()
        })
    }

    fn cache() -> QueryCache<u32> {
        QueryCache::new(Duration::from_secs(60))
    }

    #[tokio::test]
    async fn fresh_data_is_served_from_cache() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let first = cache.query(&QueryKey::AllBirdData, counting(&calls, 7)).await;
        let second = cache.query(&QueryKey::AllBirdData, counting(&calls, 8)).await;

        assert_eq!(*first.data.unwrap(), 7);
        assert_eq!(*second.data.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn concurrent_reads_share_one_fetch() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let slow: Fetcher<u32> = {
            let calls = Arc::clone(&calls);
            Arc::new(move || {
                calls.fetch_add(1, Ordering::SeqCst);
                async {
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Ok(1)
                }
                .boxed()
            })
        };

        let key = QueryKey::AllLocations;
        let (a, b) = tokio::join!(
            cache.query(&key, Arc::clone(&slow)),
            cache.query(&key, Arc::clone(&slow))
        );

        assert_eq!(*a.data.unwrap(), 1);
        assert_eq!(*b.data.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn error_keeps_last_data_and_is_not_retried() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::AllBirdData;

        cache.query(&key, counting(&calls, 3)).await;
        cache.invalidate(&key);
        let failed = cache.query(&key, failing(&calls)).await;

        assert_eq!(*failed.data.clone().unwrap(), 3);
        assert!(failed.error.is_some());
        assert!(!failed.is_loading);

        let again = cache.query(&key, failing(&calls)).await;
        assert!(again.error.is_some());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidated_key_refetches_on_next_read() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::CallerRole;

        cache.query(&key, counting(&calls, 1)).await;
        cache.invalidate(&key);
        assert!(cache.peek(&key).is_stale);

        let result = cache.query(&key, counting(&calls, 2)).await;
        assert_eq!(*result.data.unwrap(), 2);
        assert!(!result.is_stale);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn family_invalidation_covers_every_name() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let a = QueryKey::BirdDetails("a".into());
        let b = QueryKey::BirdDetails("b".into());

        cache.query(&a, counting(&calls, 1)).await;
        cache.query(&b, counting(&calls, 2)).await;
        cache.invalidate_family(QueryFamily::BirdDetails);

        assert!(cache.peek(&a).is_stale);
        assert!(cache.peek(&b).is_stale);
    }

    #[tokio::test]
    async fn observed_invalidation_refetches_once() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::FileReferences;

        cache.query(&key, counting(&calls, 1)).await;
        let mut observer = cache.observe(&key);

        cache.invalidate(&key);
        let refreshed = loop {
            let state = observer.changed().await.unwrap();
            if !state.is_stale && state.data.is_some() {
                break state;
            }
        };

        assert_eq!(*refreshed.data.unwrap(), 1);
        let _ = cache.query(&key, counting(&calls, 1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidation_during_fetch_leaves_entry_stale() {
        let cache = Arc::new(cache());
        let key = QueryKey::AllBirdData;
        let started = Arc::new(tokio::sync::Notify::new());
        let release = Arc::new(tokio::sync::Notify::new());

        let gated: Fetcher<u32> = {
            let started = Arc::clone(&started);
            let release = Arc::clone(&release);
            Arc::new(move || {
                let started = Arc::clone(&started);
                let release = Arc::clone(&release);
                async move {
                    started.notify_one();
                    release.notified().await;
                    Ok(1)
                }
                .boxed()
            })
        };

        let reader = {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            tokio::spawn(async move { cache.query(&key, gated).await })
        };

        started.notified().await;
        cache.invalidate(&key);
        release.notify_one();
        let settled = reader.await.unwrap();

        assert_eq!(*settled.data.unwrap(), 1);
        assert!(settled.is_stale);
    }

    #[tokio::test]
    async fn clear_resets_entries() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        cache.query(&QueryKey::AllBirdData, counting(&calls, 1)).await;

        cache.clear();

        assert!(cache.is_empty());
        assert!(cache.peek(&QueryKey::AllBirdData).is_loading);
    }

    #[tokio::test]
    async fn late_response_after_clear_stays_detached() {
        let cache = Arc::new(cache());
        let key = QueryKey::AllBirdData;
        let started = Arc::new(tokio::sync::Notify::new());
        let release = Arc::new(tokio::sync::Notify::new());

        let gated: Fetcher<u32> = {
            let started = Arc::clone(&started);
            let release = Arc::clone(&release);
            Arc::new(move || {
                let started = Arc::clone(&started);
                let release = Arc::clone(&release);
                async move {
                    started.notify_one();
                    release.notified().await;
                    Ok(1)
                }
                .boxed()
            })
        };

        let reader = {
            let cache = Arc::clone(&cache);
            let key = key.clone();
            tokio::spawn(async move { cache.query(&key, gated).await })
        };

        started.notified().await;
        cache.clear();
        release.notify_one();
        reader.await.unwrap();

        assert!(cache.is_empty());
        assert!(cache.peek(&key).is_loading);

        let calls = Arc::new(AtomicUsize::new(0));
        let fresh = cache.query(&key, counting(&calls, 2)).await;
        assert_eq!(*fresh.data.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn prepared_read_runs_on_the_entry_it_bound() {
        let cache = cache();
        let calls = Arc::new(AtomicUsize::new(0));
        let key = QueryKey::CallerRole;

        let pending = cache.prepare(&key, counting(&calls, 5));
        cache.clear();
        let settled = pending.run().await;

        assert_eq!(*settled.data.unwrap(), 5);
        assert!(cache.is_empty());
        assert!(cache.peek(&key).is_loading);
    }

    #[test]
    fn unqueried_key_peeks_as_loading() {
        let cache = cache();
        let result = cache.peek(&QueryKey::CallerProfile);
        assert!(result.is_loading);
        assert!(matches!(
            result.into_result().unwrap_err().as_ref(),
            CoreError::NotReady
        ));
    }

    #[test]
    fn error_state_is_settled_but_stale_is_not() {
        let now = Utc::now();
        let errored = QueryState::<u32> {
            error: Some(Arc::new(CoreError::NotReady)),
            version: 1,
            ..QueryState::default()
        };
        assert!(!errored.needs_fetch(Duration::from_secs(60), now));

        let stale = QueryState::<u32> {
            is_stale: true,
            ..errored
        };
        assert!(stale.needs_fetch(Duration::from_secs(60), now));
    }

    #[test]
    fn data_expires_after_stale_time() {
        let fetched_at = Utc::now();
        let state = QueryState::<u32> {
            data: Some(Arc::new(1)),
            fetched_at: Some(fetched_at),
            version: 1,
            ..QueryState::default()
        };
        assert!(!state.needs_fetch(Duration::from_secs(60), fetched_at));
        assert!(state.needs_fetch(
            Duration::from_secs(60),
            fetched_at + chrono::Duration::seconds(61)
        ));
    }
}
