//! Keyed single-flight query cache.
//!
//! Each key owns a `watch` channel carrying its [`QueryState`]. Key
//! transitions happen under the map's entry lock, so two consumers racing on
//! a cold key can never both start a fetch. Fetches run on spawned tasks and
//! are applied only while their generation is still the slot's generation.
//! A loader that panics settles its key as an error instead of leaving it
//! loading.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use metrics::{counter, histogram};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, error};

use crate::cms::error::CmsError;

use super::config::CacheConfig;
use super::keys::QueryKey;
use super::state::QueryState;

pub const METRIC_CACHE_HIT: &str = "sleekblog_query_cache_hit_total";
pub const METRIC_CACHE_MISS: &str = "sleekblog_query_cache_miss_total";
pub const METRIC_CACHE_JOINED: &str = "sleekblog_query_cache_joined_total";
pub const METRIC_CACHE_DISCARDED: &str = "sleekblog_query_cache_discarded_total";
pub const METRIC_FETCH_MS: &str = "sleekblog_query_fetch_ms";

const SOURCE: &str = "cache::store";

struct Slot<V> {
    generation: u64,
    tx: watch::Sender<QueryState<V>>,
    settled_at: Option<Instant>,
}

struct Inner<V> {
    slots: DashMap<QueryKey, Slot<V>>,
    generation: AtomicU64,
    config: CacheConfig,
}

enum Claim<V> {
    Settled(QueryState<V>),
    Joined(watch::Receiver<QueryState<V>>),
    Started {
        rx: watch::Receiver<QueryState<V>>,
        generation: u64,
    },
}

pub struct QueryCache<V> {
    inner: Arc<Inner<V>>,
}

impl<V> Clone for QueryCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> Default for QueryCache<V>
where
    V: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<V> QueryCache<V>
where
    V: Send + Sync + 'static,
{
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                slots: DashMap::new(),
                generation: AtomicU64::new(0),
                config,
            }),
        }
    }

    /// Current state of `key`; [`QueryState::Idle`] when the key is unknown.
    pub fn get(&self, key: &QueryKey) -> QueryState<V> {
        self.inner
            .slots
            .get(key)
            .map(|slot| slot.tx.borrow().clone())
            .unwrap_or_default()
    }

    /// Observe every transition of an existing key.
    pub fn subscribe(&self, key: &QueryKey) -> Option<watch::Receiver<QueryState<V>>> {
        self.inner.slots.get(key).map(|slot| slot.tx.subscribe())
    }

    /// Settled state for `key`, fetching it at most once across all callers.
    ///
    /// Joins a fetch already in flight, returns a fresh settled value as is,
    /// and otherwise starts `loader` on a background task. Failures are
    /// terminal until [`QueryCache::refetch`] is called.
    pub async fn ensure<F, Fut>(&self, key: QueryKey, loader: F) -> QueryState<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, CmsError>> + Send + 'static,
    {
        self.run(key, false, loader).await
    }

    /// Fetch `key` again regardless of its settled state. An in-flight fetch
    /// is joined instead of duplicated.
    pub async fn refetch<F, Fut>(&self, key: QueryKey, loader: F) -> QueryState<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, CmsError>> + Send + 'static,
    {
        self.run(key, true, loader).await
    }

    /// Drop `key`. A fetch still running for it will be discarded on arrival.
    pub fn forget(&self, key: &QueryKey) -> bool {
        let removed = self.inner.slots.remove(key).is_some();
        if removed {
            debug!(target_module = SOURCE, key = %key, "forgot query");
        }
        removed
    }

    pub fn clear(&self) {
        self.inner.slots.clear();
    }

    pub fn len(&self) -> usize {
        self.inner.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.slots.is_empty()
    }

    async fn run<F, Fut>(&self, key: QueryKey, force: bool, loader: F) -> QueryState<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, CmsError>> + Send + 'static,
    {
        let rx = match self.claim(&key, force) {
            Claim::Settled(state) => return state,
            Claim::Joined(rx) => rx,
            Claim::Started { rx, generation } => {
                self.spawn_fetch(key, generation, loader());
                rx
            }
        };
        settled(rx).await
    }

    fn claim(&self, key: &QueryKey, force: bool) -> Claim<V> {
        match self.inner.slots.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let slot = entry.get_mut();
                let current = slot.tx.borrow().clone();
                match current {
                    QueryState::Loading => {
                        counter!(METRIC_CACHE_JOINED, "intent" => key.intent()).increment(1);
                        Claim::Joined(slot.tx.subscribe())
                    }
                    QueryState::Success(_) if !force && !self.is_stale(slot) => {
                        counter!(METRIC_CACHE_HIT, "intent" => key.intent()).increment(1);
                        Claim::Settled(current)
                    }
                    QueryState::Error(_) if !force => {
                        counter!(METRIC_CACHE_HIT, "intent" => key.intent()).increment(1);
                        Claim::Settled(current)
                    }
                    _ => {
                        counter!(METRIC_CACHE_MISS, "intent" => key.intent()).increment(1);
                        let generation = self.next_generation();
                        slot.generation = generation;
                        slot.settled_at = None;
                        slot.tx.send_replace(QueryState::Loading);
                        Claim::Started {
                            rx: slot.tx.subscribe(),
                            generation,
                        }
                    }
                }
            }
            Entry::Vacant(entry) => {
                counter!(METRIC_CACHE_MISS, "intent" => key.intent()).increment(1);
                let generation = self.next_generation();
                let (tx, rx) = watch::channel(QueryState::Loading);
                entry.insert(Slot {
                    generation,
                    tx,
                    settled_at: None,
                });
                Claim::Started { rx, generation }
            }
        }
    }

    fn is_stale(&self, slot: &Slot<V>) -> bool {
        slot.settled_at
            .is_some_and(|at| self.inner.config.is_stale(at.elapsed()))
    }

    fn next_generation(&self) -> u64 {
        self.inner.generation.fetch_add(1, Ordering::Relaxed) + 1
    }

    fn spawn_fetch<Fut>(&self, key: QueryKey, generation: u64, fetch: Fut)
    where
        Fut: Future<Output = Result<V, CmsError>> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        debug!(target_module = SOURCE, key = %key, generation, "starting query fetch");
        tokio::spawn(async move {
            let started = Instant::now();
            let result = match tokio::spawn(fetch).await {
                Ok(result) => result,
                Err(err) => {
                    error!(
                        target_module = SOURCE,
                        key = %key,
                        generation,
                        error = %err,
                        "query fetch task failed"
                    );
                    Err(CmsError::from(err))
                }
            };
            histogram!(
                METRIC_FETCH_MS,
                "intent" => key.intent(),
                "outcome" => if result.is_ok() { "success" } else { "error" }
            )
            .record(started.elapsed().as_secs_f64() * 1000.0);
            inner.complete(&key, generation, result);
        });
    }
}

impl<V> Inner<V> {
    fn complete(&self, key: &QueryKey, generation: u64, result: Result<V, CmsError>) {
        let state = match result {
            Ok(value) => QueryState::Success(Arc::new(value)),
            Err(err) => QueryState::Error(Arc::new(err)),
        };

        match self.slots.get_mut(key) {
            Some(mut slot) if slot.generation == generation => {
                slot.settled_at = Some(Instant::now());
                slot.tx.send_replace(state);
            }
            _ => {
                counter!(METRIC_CACHE_DISCARDED, "intent" => key.intent()).increment(1);
                debug!(
                    target_module = SOURCE,
                    key = %key,
                    generation,
                    "discarding late query result"
                );
            }
        }
    }
}

/// Wait until the key leaves `Loading`. A key removed meanwhile reads as idle.
async fn settled<V>(mut rx: watch::Receiver<QueryState<V>>) -> QueryState<V> {
    match rx.wait_for(|state| !state.is_loading()).await {
        Ok(state) => state.clone(),
        Err(_) => QueryState::Idle,
    }
}
