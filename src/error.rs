//! Error types for the caching layer
//!
//! Provides unified error handling using thiserror.
//!
//! A cache miss, an expired entry, and a deleted key are all normal
//! outcomes surfaced as `Option::None` or `false`, never as errors. The
//! variants here cover the few conditions that are genuine caller bugs.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the caching layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Cache construction was attempted with invalid bounds
    #[error("invalid cache configuration: {0}")]
    InvalidConfig(String),

    /// A zero-length TTL was supplied to `set`
    #[error("ttl must be a positive duration")]
    ZeroTtl,

    /// The cache or manager has been destroyed and no longer accepts writes
    #[error("cache has been destroyed")]
    Destroyed,

    /// A named cache was requested with a value type other than the one it
    /// was created with
    #[error("cache '{name}' holds a different value type")]
    TypeMismatch { name: String },
}

// == Result Type Alias ==
/// Convenience Result type for the caching layer.
pub type Result<T> = std::result::Result<T, CacheError>;
