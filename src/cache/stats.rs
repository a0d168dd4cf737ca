//! Cache Statistics Module
//!
//! Monotonic operation counters plus point-in-time snapshots.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Stats ==
/// A point-in-time view of one cache instance's counters and gauges.
///
/// Counters (hits, misses, sets, deletes, evictions) only ever grow;
/// `total_items` and `estimated_memory_bytes` are recomputed at capture
/// time rather than incrementally maintained, so they cannot drift.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of insert/overwrite operations
    pub sets: u64,
    /// Number of explicit removals, including those performed by `clear`
    pub deletes: u64,
    /// Number of entries removed by LRU pressure or expiry
    pub evictions: u64,
    /// Current number of entries in the cache
    pub total_items: usize,
    /// Approximate memory footprint of the current entries, in bytes
    pub estimated_memory_bytes: usize,
    /// When this snapshot was captured
    pub captured_at: DateTime<Utc>,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

// == Stats Counters ==
/// The monotonic counters, mutated under the owning cache's lock.
#[derive(Debug, Default)]
pub(crate) struct StatsCounters {
    hits: u64,
    misses: u64,
    sets: u64,
    deletes: u64,
    evictions: u64,
}

impl StatsCounters {
    pub(crate) fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub(crate) fn record_set(&mut self) {
        self.sets += 1;
    }

    pub(crate) fn record_delete(&mut self) {
        self.deletes += 1;
    }

    /// Bulk-records removals, used by `clear`.
    pub(crate) fn record_deletes(&mut self, count: u64) {
        self.deletes += count;
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    // == Snapshot ==
    /// Captures the counters together with freshly computed gauges.
    pub(crate) fn snapshot(&self, total_items: usize, estimated_memory_bytes: usize) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            sets: self.sets,
            deletes: self.deletes,
            evictions: self.evictions,
            total_items,
            estimated_memory_bytes,
            captured_at: Utc::now(),
        }
    }
}
