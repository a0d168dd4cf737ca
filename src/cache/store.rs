//! Cache Store Module
//!
//! The main cache engine: a bounded HashMap table with LRU eviction, lazy
//! TTL expiry, and usage statistics, guarded by a single reader/writer
//! lock per instance. Each instance owns a background sweeper that purges
//! expired entries independently of read/write traffic.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use crate::cache::stats::StatsCounters;
use crate::cache::{
    CacheEntry, CacheStats, CacheValue, LruTracker, ENTRY_OVERHEAD_BYTES,
    VALUE_SIZE_FALLBACK_BYTES,
};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_sweeper;

// == Memory Cache ==
/// A TTL-expiring, capacity-bounded, LRU-evicting key/value table.
///
/// Construction validates the configuration, spawns the instance's sweeper,
/// and hands back an `Arc`; all operations take `&self` and synchronize on
/// the internal lock, so clones of the `Arc` can be shared freely across
/// tasks. `get` takes the write lock because every successful read mutates
/// access bookkeeping.
///
/// Lifecycle: Active until [`MemoryCache::destroy`], which stops the
/// sweeper and empties the table. After destroy, `set` is rejected and
/// read operations behave as on a permanently empty cache.
#[derive(Debug)]
pub struct MemoryCache<T> {
    /// Entry table, recency order, and counters behind one lock
    inner: RwLock<Inner<T>>,
    /// Bounds this instance was created with
    config: CacheConfig,
    /// Set once by `destroy`; writes check it under the lock
    destroyed: AtomicBool,
    /// Handle of the background sweeper, taken and aborted by `destroy`
    sweeper: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Debug)]
struct Inner<T> {
    entries: HashMap<String, CacheEntry<T>>,
    lru: LruTracker,
    counters: StatsCounters,
}

impl<T: CacheValue> MemoryCache<T> {
    // == Constructor ==
    /// Creates a new cache and starts its sweeper.
    ///
    /// Must be called from within a tokio runtime. Fails with
    /// [`CacheError::InvalidConfig`] if any bound is zero.
    pub fn new(config: CacheConfig) -> Result<Arc<Self>> {
        config.validate()?;

        let cache = Arc::new(Self {
            inner: RwLock::new(Inner {
                entries: HashMap::new(),
                lru: LruTracker::new(),
                counters: StatsCounters::default(),
            }),
            destroyed: AtomicBool::new(false),
            sweeper: Mutex::new(None),
            config,
        });

        // The sweeper holds a Weak handle, so dropping the last Arc without
        // calling destroy still ends the task at its next tick.
        let handle = spawn_sweeper(Arc::downgrade(&cache), cache.config.sweep_interval);
        *cache.sweeper.lock() = Some(handle);

        Ok(cache)
    }

    /// The configuration this instance was created with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// An entry found expired is removed on the spot (lazy expiry) and
    /// counted as a miss and an eviction. A live entry has its access
    /// bookkeeping and recency bumped and is counted as a hit. Absence is
    /// a normal outcome, never an error.
    pub async fn get(&self, key: &str) -> Option<T> {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                inner.counters.record_miss();
                return None;
            }
        };

        if expired {
            inner.entries.remove(key);
            inner.lru.remove(key);
            inner.counters.record_miss();
            inner.counters.record_eviction();
            return None;
        }

        let value = inner.entries.get_mut(key).map(|entry| entry.touch().clone());
        inner.counters.record_hit();
        inner.lru.touch(key);
        value
    }

    // == Set ==
    /// Stores a key-value pair.
    ///
    /// `ttl` of None applies the instance's default TTL; an explicit zero
    /// TTL is rejected with [`CacheError::ZeroTtl`]. If the key is new and
    /// the table is full, the least recently used entry is evicted first;
    /// overwriting an existing key never evicts. Overwrites replace the
    /// entry wholesale, resetting its expiry and access bookkeeping.
    pub async fn set(
        &self,
        key: impl Into<String>,
        value: T,
        ttl: Option<Duration>,
    ) -> Result<()> {
        let ttl = ttl.unwrap_or(self.config.default_ttl);
        if ttl.is_zero() {
            return Err(CacheError::ZeroTtl);
        }

        let key = key.into();
        let mut guard = self.inner.write().await;
        if self.destroyed.load(Ordering::SeqCst) {
            return Err(CacheError::Destroyed);
        }
        let inner = &mut *guard;

        let is_overwrite = inner.entries.contains_key(&key);
        if !is_overwrite && inner.entries.len() >= self.config.max_items {
            if let Some(victim) = inner.lru.evict_oldest() {
                inner.entries.remove(&victim);
                inner.counters.record_eviction();
                trace!(key = %victim, "evicted least recently used entry");
            }
        }

        inner.entries.insert(key.clone(), CacheEntry::new(value, ttl));
        inner.lru.touch(&key);
        inner.counters.record_set();

        Ok(())
    }

    // == Delete ==
    /// Removes an entry by key, returning whether anything was removed.
    ///
    /// Records a delete only on success.
    pub async fn delete(&self, key: &str) -> bool {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        if inner.entries.remove(key).is_some() {
            inner.lru.remove(key);
            inner.counters.record_delete();
            true
        } else {
            false
        }
    }

    // == Has ==
    /// Existence probe with the same lazy-expiry check as `get`.
    ///
    /// Removes an entry found expired (recording the eviction) but never
    /// touches hit/miss counters or access bookkeeping, so probing does not
    /// protect an entry from LRU eviction.
    pub async fn has(&self, key: &str) -> bool {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let expired = match inner.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };

        if expired {
            inner.entries.remove(key);
            inner.lru.remove(key);
            inner.counters.record_eviction();
            return false;
        }

        true
    }

    // == Clear ==
    /// Removes all entries.
    ///
    /// Records deletes equal to the prior entry count; cumulative
    /// hit/miss/set counters are left intact.
    pub async fn clear(&self) {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let removed = inner.entries.len() as u64;
        inner.entries.clear();
        inner.lru.clear();
        inner.counters.record_deletes(removed);
    }

    // == Keys ==
    /// Snapshot of the keys currently in the table.
    pub async fn keys(&self) -> Vec<String> {
        self.inner.read().await.entries.keys().cloned().collect()
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.entries.is_empty()
    }

    // == Stats ==
    /// Captures a statistics snapshot.
    ///
    /// `total_items` and `estimated_memory_bytes` are recomputed here
    /// rather than incrementally maintained.
    pub async fn stats(&self) -> CacheStats {
        let guard = self.inner.read().await;
        let estimated: usize = guard
            .entries
            .iter()
            .map(|(key, entry)| estimate_entry_bytes(key, entry))
            .sum();
        guard.counters.snapshot(guard.entries.len(), estimated)
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, recording each as an eviction.
    ///
    /// This is the sweep body; it is idempotent with the lazy expiry in
    /// `get` and `has`: whichever observes an expired entry first performs
    /// the removal and records the eviction. Returns the number removed.
    pub async fn cleanup_expired(&self) -> usize {
        let mut guard = self.inner.write().await;
        let inner = &mut *guard;

        let expired: Vec<String> = inner
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            inner.entries.remove(key);
            inner.lru.remove(key);
            inner.counters.record_eviction();
        }

        expired.len()
    }

    // == Destroy ==
    /// Stops the sweeper and empties the table. Idempotent.
    ///
    /// The sweeper is aborted before the table is cleared under the write
    /// lock, so no sweep runs after this returns. Subsequent `set` calls
    /// are rejected; reads behave as on an empty cache.
    pub async fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }

        if let Some(handle) = self.sweeper.lock().take() {
            handle.abort();
        }

        let mut guard = self.inner.write().await;
        let inner = &mut *guard;
        let dropped = inner.entries.len();
        inner.entries.clear();
        inner.lru.clear();
        debug!(dropped, "cache destroyed");
    }

    /// Whether `destroy` has been called on this instance.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

// == Memory Estimation ==
/// Approximates one entry's footprint: key bytes plus serialized value
/// bytes plus a fixed bookkeeping overhead.
///
/// A heuristic for operational visibility, not an accounting measurement.
/// Values that cannot be serialized are charged a fixed conservative size
/// instead; this function never fails.
fn estimate_entry_bytes<T: Serialize>(key: &str, entry: &CacheEntry<T>) -> usize {
    let value_bytes = serde_json::to_vec(entry.value())
        .map(|encoded| encoded.len())
        .unwrap_or(VALUE_SIZE_FALLBACK_BYTES);
    key.len() + value_bytes + ENTRY_OVERHEAD_BYTES
}
