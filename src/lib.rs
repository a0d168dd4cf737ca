//! Event Cache - an in-process caching layer
//!
//! TTL-expiring, capacity-bounded, LRU-evicting key/value stores with
//! usage statistics, grouped under a named-cache manager. Used to shield
//! the primary data store from repeated reads of hot entities (users,
//! events, tickets, sessions, analytics snapshots).
//!
//! The host application constructs a [`CacheManager`] at startup, obtains
//! named caches from it, and calls [`CacheManager::destroy`] at shutdown.
//! Keys are caller-chosen opaque strings; the surrounding application's
//! convention is a colon-delimited namespace such as `"user:<id>"`.

pub mod cache;
pub mod config;
pub mod error;
pub mod manager;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, CacheValue, MemoryCache};
pub use config::CacheConfig;
pub use error::CacheError;
pub use manager::CacheManager;
