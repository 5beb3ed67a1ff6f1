// Keyed query cache with in-flight request deduplication
//
// One entry per query key. A read either hits a fresh entry, joins the
// request already in flight for the key, or starts a new shared request.
// Every request start and every invalidation bumps the entry generation, and
// a response is only written back if the generation it started with is still
// current, so a response that lost the race never overwrites newer state.

use std::any::Any;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Instant;

use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::RwLock;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::CacheConfig;
use crate::error::ApiError;

pub type CachedValue = Arc<dyn Any + Send + Sync>;
pub type FetchOutcome = Result<CachedValue, String>;
type SharedFetch = Shared<BoxFuture<'static, FetchOutcome>>;

// Ordered key tuple, e.g. ["payments", cinema_id, start, end]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<Option<String>>);

impl QueryKey {
    pub fn new(resource: &str) -> Self {
        Self(vec![Some(resource.to_string())])
    }

    pub fn with(mut self, part: impl ToString) -> Self {
        self.0.push(Some(part.to_string()));
        self
    }

    // Absent parameters stay in the tuple so they never collide with present ones
    pub fn with_optional<P: ToString>(mut self, part: Option<P>) -> Self {
        self.0.push(part.map(|p| p.to_string()));
        self
    }

    pub fn resource(&self) -> Option<&str> {
        self.0.first().and_then(|part| part.as_deref())
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self
            .0
            .iter()
            .map(|part| part.as_deref().unwrap_or("_"))
            .collect();
        write!(f, "{}", parts.join(":"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryStatus {
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Default)]
pub struct CacheStats {
    pub hit_count: AtomicUsize,
    pub miss_count: AtomicUsize,
    pub dedup_count: AtomicUsize,
    pub fetch_count: AtomicUsize,
    pub invalidation_count: AtomicUsize,
    pub eviction_count: AtomicUsize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStatsReport {
    pub items_count: usize,
    pub hit_count: usize,
    pub miss_count: usize,
    pub dedup_count: usize,
    pub fetch_count: usize,
    pub invalidation_count: usize,
    pub eviction_count: usize,
}

// Point-in-time view of one entry
#[derive(Clone)]
pub struct EntrySnapshot {
    pub status: QueryStatus,
    pub value: Option<CachedValue>,
    pub error: Option<String>,
    pub is_fetching: bool,
}

impl EntrySnapshot {
    fn idle() -> Self {
        Self {
            status: QueryStatus::Idle,
            value: None,
            error: None,
            is_fetching: false,
        }
    }
}

struct CacheEntry {
    status: QueryStatus,
    value: Option<CachedValue>,
    error: Option<String>,
    updated_at: Option<Instant>,
    last_accessed: Instant,
    stale: bool,
    generation: u64,
    in_flight: Option<SharedFetch>,
}

impl CacheEntry {
    fn new() -> Self {
        Self {
            status: QueryStatus::Idle,
            value: None,
            error: None,
            updated_at: None,
            last_accessed: Instant::now(),
            stale: false,
            generation: 0,
            in_flight: None,
        }
    }

    fn is_fresh(&self, config: &CacheConfig) -> bool {
        !self.stale
            && self.status == QueryStatus::Success
            && self
                .updated_at
                .map_or(false, |at| at.elapsed() < config.stale_time)
    }

    // Status once nothing is in flight any more
    fn settled_status(&self) -> QueryStatus {
        if self.error.is_some() {
            QueryStatus::Error
        } else if self.value.is_some() {
            QueryStatus::Success
        } else {
            QueryStatus::Idle
        }
    }

    fn snapshot(&self) -> EntrySnapshot {
        EntrySnapshot {
            status: self.status,
            value: self.value.clone(),
            error: self.error.clone(),
            is_fetching: self.in_flight.is_some(),
        }
    }
}

enum Lookup {
    Hit(CachedValue),
    Join(SharedFetch, u64),
}

pub struct QueryCache {
    entries: Arc<DashMap<QueryKey, CacheEntry>>,
    generation: AtomicU64,
    config: RwLock<CacheConfig>,
    stats: CacheStats,
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
            generation: AtomicU64::new(0),
            config: RwLock::new(config),
            stats: CacheStats::default(),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.config.read().clone()
    }

    // Reads `key`, calling `fetcher` only when no fresh value and no
    // in-flight request exist for it.
    //
    // Concurrent callers with the same key share one request and all receive
    // its outcome. The request runs to completion and is written back even
    // if every caller goes away. Errors are reduced to their display message.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, fetcher: F) -> FetchOutcome
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        let config = self.config();
        let found = {
            let mut entry = self.entries.entry(key.clone()).or_insert_with(CacheEntry::new);
            self.lookup(&mut entry, &key, &config)
        };

        let (request, generation) = match found {
            Some(Lookup::Hit(value)) => return Ok(value),
            Some(Lookup::Join(request, generation)) => (request, generation),
            None => {
                // Built without holding the shard lock, the fetcher may read the cache
                let future = fetcher();
                let started = {
                    let mut entry = self.entries.entry(key.clone()).or_insert_with(CacheEntry::new);
                    match self.lookup(&mut entry, &key, &config) {
                        Some(Lookup::Hit(value)) => return Ok(value),
                        Some(Lookup::Join(request, generation)) => Err((request, generation)),
                        None => {
                            self.stats.miss_count.fetch_add(1, Ordering::SeqCst);
                            self.stats.fetch_count.fetch_add(1, Ordering::SeqCst);
                            debug!(key = %key, "Query cache miss, fetching");

                            let request: SharedFetch = async move {
                                future
                                    .await
                                    .map(|value| Arc::new(value) as CachedValue)
                                    .map_err(|e| e.to_string())
                            }
                            .boxed()
                            .shared();

                            entry.generation = self.next_generation();
                            entry.status = QueryStatus::Loading;
                            entry.in_flight = Some(request.clone());
                            Ok((request, entry.generation))
                        }
                    }
                };
                match started {
                    Ok((request, generation)) => {
                        self.drive(key.clone(), generation, request.clone());
                        (request, generation)
                    }
                    Err(joined) => joined,
                }
            }
        };

        self.evict_if_needed();

        let outcome = request.await;
        settle(&self.entries, &key, generation, &outcome);
        outcome
    }

    // A fresh value or the request already in flight, if either exists
    fn lookup(&self, entry: &mut CacheEntry, key: &QueryKey, config: &CacheConfig) -> Option<Lookup> {
        entry.last_accessed = Instant::now();

        if entry.is_fresh(config) {
            if let Some(value) = entry.value.clone() {
                self.stats.hit_count.fetch_add(1, Ordering::SeqCst);
                debug!(key = %key, "Query cache hit");
                return Some(Lookup::Hit(value));
            }
        }

        let in_flight = entry.in_flight.clone()?;
        self.stats.dedup_count.fetch_add(1, Ordering::SeqCst);
        debug!(key = %key, "Joining in-flight request");
        Some(Lookup::Join(in_flight, entry.generation))
    }

    // Generations are unique across the cache, so a request started for an
    // entry that was removed never matches its replacement
    fn next_generation(&self) -> u64 {
        self.generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    // Settles the entry once the request finishes, with or without callers
    fn drive(&self, key: QueryKey, generation: u64, request: SharedFetch) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(key = %key, "No runtime to drive request, callers settle it");
            return;
        };
        let entries = Arc::clone(&self.entries);
        runtime.spawn(async move {
            let outcome = request.await;
            settle(&entries, &key, generation, &outcome);
        });
    }

    pub fn snapshot(&self, key: &QueryKey) -> EntrySnapshot {
        self.entries
            .get(key)
            .map(|entry| entry.snapshot())
            .unwrap_or_else(EntrySnapshot::idle)
    }

    pub fn status(&self, key: &QueryKey) -> QueryStatus {
        self.snapshot(key).status
    }

    // Marks every entry under `prefix` stale so the next read refetches.
    //
    // Requests still in flight for those entries are detached: their
    // responses reach their callers but are not written back.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut count = 0;
        for mut entry in self.entries.iter_mut() {
            if !entry.key().starts_with(prefix) {
                continue;
            }
            entry.stale = true;
            entry.generation = self.next_generation();
            if entry.in_flight.take().is_some() {
                entry.status = entry.settled_status();
            }
            count += 1;
        }

        self.stats
            .invalidation_count
            .fetch_add(count, Ordering::SeqCst);
        debug!(prefix = %prefix, count, "Invalidated query cache entries");
        count
    }

    pub fn remove(&self, key: &QueryKey) -> bool {
        self.entries.remove(key).is_some()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // Drops entries nobody read for `gc_time`; in-flight entries always stay
    pub fn collect_garbage(&self) -> usize {
        let gc_time = self.config.read().gc_time;
        let mut removed = 0;
        self.entries.retain(|_, entry| {
            let keep = entry.in_flight.is_some() || entry.last_accessed.elapsed() < gc_time;
            if !keep {
                removed += 1;
            }
            keep
        });

        if removed > 0 {
            self.stats
                .eviction_count
                .fetch_add(removed, Ordering::SeqCst);
            debug!(removed, "Collected unused query cache entries");
        }
        removed
    }

    // Background garbage collection; stops once the cache is dropped
    pub fn spawn_cleanup(self: &Arc<Self>) -> JoinHandle<()> {
        let cache: Weak<Self> = Arc::downgrade(self);
        let period = self.config.read().cleanup_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match cache.upgrade() {
                    Some(cache) => {
                        cache.collect_garbage();
                    }
                    None => break,
                }
            }
        })
    }

    // Shrinking may evict the least recently read entries
    pub fn resize(&self, max_entries: usize) {
        self.config.write().max_entries = max_entries;
        self.evict_if_needed();
    }

    fn evict_if_needed(&self) {
        let max_entries = self.config.read().max_entries;
        while self.entries.len() > max_entries {
            if !self.remove_least_recently_used() {
                break;
            }
        }
    }

    fn remove_least_recently_used(&self) -> bool {
        let oldest_key = self
            .entries
            .iter()
            .filter(|entry| entry.in_flight.is_none())
            .min_by_key(|entry| entry.last_accessed)
            .map(|entry| entry.key().clone());

        match oldest_key {
            Some(key) => {
                self.entries.remove(&key);
                self.stats.eviction_count.fetch_add(1, Ordering::SeqCst);
                debug!(key = %key, "Evicted least recently used query");
                true
            }
            None => false,
        }
    }

    pub fn stats(&self) -> CacheStatsReport {
        CacheStatsReport {
            items_count: self.entries.len(),
            hit_count: self.stats.hit_count.load(Ordering::SeqCst),
            miss_count: self.stats.miss_count.load(Ordering::SeqCst),
            dedup_count: self.stats.dedup_count.load(Ordering::SeqCst),
            fetch_count: self.stats.fetch_count.load(Ordering::SeqCst),
            invalidation_count: self.stats.invalidation_count.load(Ordering::SeqCst),
            eviction_count: self.stats.eviction_count.load(Ordering::SeqCst),
        }
    }
}

fn settle(
    entries: &DashMap<QueryKey, CacheEntry>,
    key: &QueryKey,
    generation: u64,
    outcome: &FetchOutcome,
) {
    let Some(mut entry) = entries.get_mut(key) else {
        return;
    };
    if entry.generation != generation {
        debug!(key = %key, "Discarding superseded response");
        return;
    }
    // Another caller sharing the request already wrote it back
    if entry.in_flight.is_none() {
        return;
    }

    entry.in_flight = None;
    entry.updated_at = Some(Instant::now());
    match outcome {
        Ok(value) => {
            entry.value = Some(value.clone());
            entry.error = None;
            entry.stale = false;
            entry.status = QueryStatus::Success;
        }
        // The previous value is kept next to the error
        Err(message) => {
            entry.error = Some(message.clone());
            entry.status = QueryStatus::Error;
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
