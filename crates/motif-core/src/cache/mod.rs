//! Bounded, time-limited, single-flight cache.
//!
//! [`TtlCache`] stores decoded values under a size budget. Every entry carries an expiry
//! instant; expired entries are treated as misses and removed the moment they are
//! observed. Lookups through [`TtlCache::fetch_or_compute`] coalesce: for a missing key,
//! exactly one fill runs and every concurrent caller receives its outcome.
//!
//! # Key State Machine
//!
//! ```text
//! ┌───────┐  miss   ┌─────────┐  Ok(v)   ┌───────┐  ttl elapsed  ┌─────────┐
//! │ Empty │ ──────► │ Pending │ ───────► │ Valid │ ────────────► │ Expired │
//! └───────┘         └─────────┘          └───────┘               └────┬────┘
//!     ▲                  │ Err(e)                                     │ next read
//!     └──────────────────┴────────────────────────────────────────────┘
//! ```
//!
//! # Locking
//!
//! All state sits behind one `parking_lot::Mutex`. Critical sections are bookkeeping
//! only; the fill future runs on its own task with the lock released, so a slow node
//! call never blocks lookups of unrelated keys.
//!
//! # Eviction
//!
//! When an insertion would push the estimated footprint over the budget, entries are
//! removed in `(expires_at, insertion sequence)` order: nearest expiry first, ties broken
//! by oldest insertion. Keys with a fill in progress are skipped. If the budget still
//! cannot be met, the new value is returned to the caller but not stored.

mod background;
mod config;
mod fetch_guard;
mod size;


pub use config::{CacheError, TtlCacheConfig};
pub use size::{EstimateSize, ENTRY_OVERHEAD};

use ahash::RandomState;
use parking_lot::Mutex;
use serde::Serialize;
use std::{
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    future::Future,
    hash::Hash,
    sync::Arc,
    time::Duration,
};
use tokio::{
    sync::{broadcast, watch},
    task::JoinHandle,
    time::Instant,
};

use crate::metrics;
use fetch_guard::{FetchGuard, PendingFetch};

struct CacheEntry<V> {
    value: V,
    inserted_at: Instant,
    expires_at: Instant,
    seq: u64,
    size: usize,
}

#[derive(Debug, Default, Clone, Copy)]
struct Counters {
    hits: u64,
    misses: u64,
    coalesced: u64,
    inserts: u64,
    evictions: u64,
    expirations: u64,
    rejected: u64,
}

struct CacheState<K, V, E> {
    entries: HashMap<K, CacheEntry<V>, RandomState>,
    expiry_index: BTreeMap<(Instant, u64), K>,
    pending: HashMap<K, PendingFetch<V, E>, RandomState>,
    occupied: usize,
    next_seq: u64,
    next_fetch_id: u64,
    counters: Counters,
}

enum Lookup<V> {
    Hit(V),
    Expired,
    Miss,
}

impl<K, V, E> CacheState<K, V, E>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn new() -> Self {
        Self {
            entries: HashMap::with_hasher(RandomState::new()),
            expiry_index: BTreeMap::new(),
            pending: HashMap::with_hasher(RandomState::new()),
            occupied: 0,
            next_seq: 0,
            next_fetch_id: 0,
            counters: Counters::default(),
        }
    }

    fn remove_entry(&mut self, key: &K) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.expiry_index.remove(&(entry.expires_at, entry.seq));
        self.occupied = self.occupied.saturating_sub(entry.size);
        Some(entry)
    }

    /// Returns a live value, or removes an expired one.
    fn lookup(&mut self, key: &K, now: Instant) -> Lookup<V> {
        match self.entries.get(key) {
            None => Lookup::Miss,
            Some(entry) if entry.expires_at > now => Lookup::Hit(entry.value.clone()),
            Some(_) => {
                self.remove_entry(key);
                self.counters.expirations += 1;
                Lookup::Expired
            }
        }
    }

    /// Picks victims in eviction order until `needed` bytes fit. Returns `None` when the
    /// budget cannot be met without touching keys that have a fill in progress.
    fn plan_eviction(&self, needed: usize, max: usize) -> Option<Vec<(Instant, u64)>> {
        let mut projected = self.occupied;
        let mut victims = Vec::new();
        for (slot, key) in &self.expiry_index {
            if projected + needed <= max {
                break;
            }
            if self.pending.contains_key(key) {
                continue;
            }
            if let Some(entry) = self.entries.get(key) {
                projected = projected.saturating_sub(entry.size);
                victims.push(*slot);
            }
        }
        (projected + needed <= max).then_some(victims)
    }

    /// Removes expired entries in expiry order. Returns the number removed.
    fn purge_expired(&mut self, now: Instant) -> u64 {
        let mut removed = 0;
        while let Some((&(expires_at, _), _)) = self.expiry_index.first_key_value() {
            if expires_at > now {
                break;
            }
            if let Some((_, key)) = self.expiry_index.pop_first() {
                if let Some(entry) = self.entries.remove(&key) {
                    self.occupied = self.occupied.saturating_sub(entry.size);
                    removed += 1;
                }
            }
        }
        self.counters.expirations += removed;
        removed
    }
}

/// Point-in-time view of cache counters and occupancy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Lookups answered from a live entry.
    pub hits: u64,
    /// Lookups that started a fill.
    pub misses: u64,
    /// Lookups that joined a fill already in progress.
    pub coalesced: u64,
    /// Values stored by `set` or a successful fill.
    pub inserts: u64,
    /// Entries removed to make room.
    pub evictions: u64,
    /// Entries removed because their TTL elapsed.
    pub expirations: u64,
    /// Values larger than what the budget could make room for.
    pub rejected: u64,
    /// Live and not-yet-swept entries currently stored.
    pub entries: usize,
    /// Fills in flight.
    pub pending_fetches: usize,
    /// Estimated bytes held by stored entries.
    pub occupied_bytes: usize,
    /// Configured memory budget.
    pub max_size_bytes: usize,
}

impl CacheStats {
    /// Fraction of lookups served without a node call.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn hit_rate(&self) -> f64 {
        let served = self.hits + self.coalesced;
        let total = served + self.misses;
        if total == 0 {
            0.0
        } else {
            served as f64 / total as f64
        }
    }
}

/// In-memory key/value cache with TTL expiry, a size budget and single-flight fills.
///
/// `E` is the fill error type. It must be `Clone` so one failed fill can be handed to
/// every waiter, and must absorb [`CacheError`] for fills that die without an outcome.
pub struct TtlCache<K, V, E> {
    name: &'static str,
    config: TtlCacheConfig,
    state: Mutex<CacheState<K, V, E>>,
}

enum Admission<V, E> {
    Leader { fetch_id: u64, sender: watch::Sender<Option<Result<V, E>>> },
    Follower,
}

impl<K, V, E> TtlCache<K, V, E>
where
    K: Eq + Hash + Clone + Debug + EstimateSize + Send + Sync + 'static,
    V: Clone + EstimateSize + Send + Sync + 'static,
    E: Clone + From<CacheError> + Send + Sync + 'static,
{
    /// Creates a cache; `name` labels its metrics and log lines.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] if the configuration is invalid.
    pub fn new(name: &'static str, config: TtlCacheConfig) -> Result<Self, CacheError> {
        config.validate()?;
        Ok(Self { name, config, state: Mutex::new(CacheState::new()) })
    }

    #[must_use]
    pub fn config(&self) -> &TtlCacheConfig {
        &self.config
    }

    /// Returns the live value for `key`. An expired entry is removed and reported as a miss.
    pub fn get(&self, key: &K) -> Option<V> {
        let mut state = self.state.lock();
        match state.lookup(key, Instant::now()) {
            Lookup::Hit(value) => {
                state.counters.hits += 1;
                drop(state);
                metrics::record_cache_hit(self.name);
                Some(value)
            }
            Lookup::Expired => {
                state.counters.misses += 1;
                drop(state);
                metrics::record_cache_eviction(self.name, "expired", 1);
                metrics::record_cache_miss(self.name);
                None
            }
            Lookup::Miss => {
                state.counters.misses += 1;
                drop(state);
                metrics::record_cache_miss(self.name);
                None
            }
        }
    }

    /// Stores `value` with `ttl` (or the default TTL). Returns whether it was stored.
    pub fn set(&self, key: K, value: V, ttl: Option<Duration>) -> bool {
        let ttl = ttl.unwrap_or(self.config.default_ttl);
        let mut state = self.state.lock();
        self.insert_locked(&mut state, key, value, ttl, Instant::now())
    }

    /// Removes `key`. Returns whether an entry was present.
    pub fn invalidate(&self, key: &K) -> bool {
        self.state.lock().remove_entry(key).is_some()
    }

    /// Drops every stored entry. Fills in progress are unaffected and will still insert.
    pub fn clear(&self) {
        let mut state = self.state.lock();
        state.entries.clear();
        state.expiry_index.clear();
        state.occupied = 0;
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn occupied_bytes(&self) -> usize {
        self.state.lock().occupied
    }

    #[must_use]
    pub fn pending_fetches(&self) -> usize {
        self.state.lock().pending.len()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let state = self.state.lock();
        let c = state.counters;
        CacheStats {
            hits: c.hits,
            misses: c.misses,
            coalesced: c.coalesced,
            inserts: c.inserts,
            evictions: c.evictions,
            expirations: c.expirations,
            rejected: c.rejected,
            entries: state.entries.len(),
            pending_fetches: state.pending.len(),
            occupied_bytes: state.occupied,
            max_size_bytes: self.config.max_size_bytes,
        }
    }

    /// Removes every expired entry now. Returns the number removed.
    pub fn purge_expired(&self) -> u64 {
        let (removed, entries, occupied) = {
            let mut state = self.state.lock();
            let removed = state.purge_expired(Instant::now());
            (removed, state.entries.len(), state.occupied)
        };
        metrics::record_cache_eviction(self.name, "expired", removed);
        metrics::record_cache_occupancy(self.name, entries, occupied);
        removed
    }

    /// Returns the cached value for `key`, or runs `compute` once for all concurrent
    /// callers and caches a successful result for `ttl` (or the default TTL).
    ///
    /// The fill runs on a spawned task. Dropping the returned future does not cancel it;
    /// a fill outlives an impatient caller and still populates the cache. A failed fill
    /// stores nothing and every waiter receives the same error.
    ///
    /// # Errors
    ///
    /// The error produced by `compute`, or [`CacheError::FetchAbandoned`] (converted into
    /// `E`) when the fill task dies without an outcome.
    pub async fn fetch_or_compute<F, Fut>(
        self: &Arc<Self>,
        key: K,
        ttl: Option<Duration>,
        compute: F,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let (mut receiver, admission, expired) = {
            let mut state = self.state.lock();
            let now = Instant::now();
            let expired = match state.lookup(&key, now) {
                Lookup::Hit(value) => {
                    state.counters.hits += 1;
                    drop(state);
                    metrics::record_cache_hit(self.name);
                    return Ok(value);
                }
                Lookup::Expired => true,
                Lookup::Miss => false,
            };

            if let Some(pending) = state.pending.get(&key) {
                let receiver = pending.receiver.clone();
                state.counters.coalesced += 1;
                (receiver, Admission::Follower, expired)
            } else {
                state.counters.misses += 1;
                state.next_fetch_id += 1;
                let fetch_id = state.next_fetch_id;
                let (sender, receiver) = watch::channel(None);
                state.pending.insert(
                    key.clone(),
                    PendingFetch { fetch_id, receiver: receiver.clone(), started_at: now },
                );
                (receiver, Admission::Leader { fetch_id, sender }, expired)
            }
        };

        if expired {
            metrics::record_cache_eviction(self.name, "expired", 1);
        }

        match admission {
            Admission::Leader { fetch_id, sender } => {
                metrics::record_cache_miss(self.name);
                tracing::trace!(cache = self.name, key = ?key, fetch_id, "starting cache fill");
                self.spawn_fill(key.clone(), fetch_id, ttl, sender, compute);
            }
            Admission::Follower => {
                metrics::record_cache_coalesced(self.name);
                tracing::trace!(cache = self.name, key = ?key, "joining cache fill in progress");
            }
        }

        let outcome = match receiver.wait_for(Option::is_some).await {
            Ok(slot) => Option::clone(&slot),
            Err(_) => None,
        };
        outcome.unwrap_or_else(|| Err(CacheError::FetchAbandoned(format!("{key:?}")).into()))
    }

    fn spawn_fill<F, Fut>(
        self: &Arc<Self>,
        key: K,
        fetch_id: u64,
        ttl: Option<Duration>,
        sender: watch::Sender<Option<Result<V, E>>>,
        compute: F,
    ) where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let guard = {
                let cache = Arc::clone(&cache);
                let key = key.clone();
                FetchGuard::new(move || {
                    cache.release_pending(&key, fetch_id);
                })
            };

            let outcome = compute().await;
            guard.disarm();

            cache.complete_fill(key, fetch_id, ttl, &outcome);
            sender.send_replace(Some(outcome));
        });
    }

    /// Clears the pending marker if it still belongs to `fetch_id`.
    fn release_pending(&self, key: &K, fetch_id: u64) -> bool {
        let mut state = self.state.lock();
        if state.pending.get(key).is_some_and(|p| p.fetch_id == fetch_id) {
            state.pending.remove(key);
            true
        } else {
            false
        }
    }

    fn complete_fill(&self, key: K, fetch_id: u64, ttl: Option<Duration>, outcome: &Result<V, E>) {
        let ttl = ttl.unwrap_or(self.config.default_ttl);
        let mut state = self.state.lock();
        if state.pending.get(&key).is_some_and(|p| p.fetch_id == fetch_id) {
            state.pending.remove(&key);
        }
        if let Ok(value) = outcome {
            self.insert_locked(&mut state, key, value.clone(), ttl, Instant::now());
        }
    }

    fn insert_locked(
        &self,
        state: &mut CacheState<K, V, E>,
        key: K,
        value: V,
        ttl: Duration,
        now: Instant,
    ) -> bool {
        let size = key.estimated_size() + value.estimated_size() + ENTRY_OVERHEAD;
        let max = self.config.max_size_bytes;

        // The replaced value is stale either way.
        state.remove_entry(&key);

        let Some(victims) = (size <= max).then(|| state.plan_eviction(size, max)).flatten()
        else {
            state.counters.rejected += 1;
            tracing::debug!(
                cache = self.name,
                key = ?key,
                size = size,
                occupied = state.occupied,
                max = max,
                "entry does not fit cache budget, not stored"
            );
            return false;
        };

        let mut evicted = 0;
        let mut expired = 0;
        for slot in victims {
            if let Some(victim) = state.expiry_index.remove(&slot) {
                if let Some(entry) = state.entries.remove(&victim) {
                    state.occupied = state.occupied.saturating_sub(entry.size);
                    if entry.expires_at <= now {
                        expired += 1;
                    } else {
                        evicted += 1;
                        tracing::trace!(
                            cache = self.name,
                            key = ?victim,
                            age_ms = now.duration_since(entry.inserted_at).as_millis(),
                            "evicted entry for capacity"
                        );
                    }
                }
            }
        }
        state.counters.evictions += evicted;
        state.counters.expirations += expired;

        state.next_seq += 1;
        let seq = state.next_seq;
        let expires_at = now + ttl;
        state.expiry_index.insert((expires_at, seq), key.clone());
        state.entries.insert(key, CacheEntry { value, inserted_at: now, expires_at, seq, size });
        state.occupied += size;
        state.counters.inserts += 1;

        metrics::record_cache_eviction(self.name, "capacity", evicted);
        metrics::record_cache_eviction(self.name, "expired", expired);
        true
    }

    /// Starts the background expiry sweeper if `sweep_interval` is non-zero.
    ///
    /// The task holds only a weak reference; it exits on shutdown or once the cache is
    /// dropped.
    pub fn start_background_tasks(
        self: &Arc<Self>,
        shutdown_tx: &broadcast::Sender<()>,
    ) -> Option<JoinHandle<()>> {
        if self.config.sweep_interval.is_zero() {
            tracing::debug!(cache = self.name, "expiry sweeper disabled");
            return None;
        }
        let weak = Arc::downgrade(self);
        let interval = self.config.sweep_interval;
        let shutdown_rx = shutdown_tx.subscribe();
        Some(tokio::spawn(background::run_expiry_sweeper(weak, interval, shutdown_rx)))
    }

    /// Keys whose fill has been running longer than `threshold`.
    pub(crate) fn stale_fills(&self, threshold: Duration) -> Vec<(K, Duration)> {
        let now = Instant::now();
        self.state
            .lock()
            .pending
            .iter()
            .filter_map(|(key, pending)| {
                let elapsed = now.duration_since(pending.started_at);
                (elapsed > threshold).then(|| (key.clone(), elapsed))
            })
            .collect()
    }

    pub(crate) fn name(&self) -> &'static str {
        self.name
    }
}
