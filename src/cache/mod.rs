//! Cache Module
//!
//! Provides in-memory caching with TTL expiration and LRU eviction.

mod entry;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::MemoryCache;

use serde::Serialize;

// == Public Constants ==
/// Fixed per-entry bookkeeping overhead charged by memory estimation
pub const ENTRY_OVERHEAD_BYTES: usize = 64;

/// Bytes charged for a value that cannot be serialized for estimation
pub const VALUE_SIZE_FALLBACK_BYTES: usize = 256;

// == Cache Value ==
/// Bounds required of values stored in a [`MemoryCache`].
///
/// `Clone` because reads hand back an owned copy while the table keeps the
/// original; `Serialize` so memory estimation can size values without the
/// cache inspecting them. Blanket-implemented, so any suitable type is a
/// cache value without opting in.
pub trait CacheValue: Clone + Serialize + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Clone + Serialize + Send + Sync + 'static {}
