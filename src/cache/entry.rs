//! Cache Entry Module
//!
//! Defines the structure for individual cache entries: the stored value
//! plus expiry and access bookkeeping.

use std::time::Duration;

use tokio::time::Instant;

// == Cache Entry ==
/// A single cache entry parameterized by the stored value type.
///
/// Every entry carries an expiration instant (`created_at + ttl`); there is
/// no "never expires" state. Access bookkeeping (`access_count`,
/// `last_accessed_at`) is updated on every successful read and drives LRU
/// victim selection.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The stored value, opaque to the cache
    value: T,
    /// Instant the entry was inserted
    created_at: Instant,
    /// Instant past which the entry must no longer be returned
    expires_at: Instant,
    /// Number of successful reads of this entry
    access_count: u64,
    /// Instant of the most recent successful read; starts at `created_at`
    last_accessed_at: Instant,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry expiring `ttl` from now.
    ///
    /// Callers are responsible for rejecting zero TTLs before this point;
    /// the store validates them so `expires_at > created_at` always holds.
    pub fn new(value: T, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: now + ttl,
            access_count: 0,
            last_accessed_at: now,
        }
    }

    /// Returns a reference to the stored value without touching access
    /// bookkeeping.
    pub fn value(&self) -> &T {
        &self.value
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to the expiration instant, so an entry whose
    /// TTL has fully elapsed is never returned.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, saturating to zero once expired.
    ///
    /// Useful for diagnostics and statistics.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }

    /// Number of successful reads so far.
    pub fn access_count(&self) -> u64 {
        self.access_count
    }

    /// Instant the entry was inserted.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Instant past which the entry is expired.
    pub fn expires_at(&self) -> Instant {
        self.expires_at
    }

    /// Instant of the most recent successful read.
    pub fn last_accessed_at(&self) -> Instant {
        self.last_accessed_at
    }

    // == Touch ==
    /// Records a successful read: bumps the access count, refreshes the
    /// last-access instant, and hands back the value.
    pub(crate) fn touch(&mut self) -> &T {
        self.access_count += 1;
        self.last_accessed_at = Instant::now();
        &self.value
    }
}
