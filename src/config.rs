//! Configuration Module
//!
//! Per-instance cache bounds with sensible defaults, environment-variable
//! overrides, and fail-fast validation.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Default maximum number of entries per cache instance.
pub const DEFAULT_MAX_ITEMS: usize = 1000;

/// Default TTL applied to entries stored without an explicit TTL.
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default interval between background sweeps of expired entries.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Bounds and timing for a single cache instance.
///
/// All values can be overridden via environment variables or the `with_*`
/// setters. A config with any zero field is rejected at cache construction
/// by [`CacheConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_items: usize,
    /// TTL for entries stored without an explicit TTL
    pub default_ttl: Duration,
    /// Interval between background sweeps
    pub sweep_interval: Duration,
}

impl CacheConfig {
    /// Creates a CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ITEMS` - Maximum entries per cache (default: 1000)
    /// - `CACHE_DEFAULT_TTL_SECS` - Default TTL in seconds (default: 300)
    /// - `CACHE_SWEEP_INTERVAL_SECS` - Sweep frequency in seconds (default: 60)
    pub fn from_env() -> Self {
        Self {
            max_items: env::var("CACHE_MAX_ITEMS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_ITEMS),
            default_ttl: env::var("CACHE_DEFAULT_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TTL),
            sweep_interval: env::var("CACHE_SWEEP_INTERVAL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_SWEEP_INTERVAL),
        }
    }

    /// Sets the maximum number of entries.
    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Sets the TTL applied when `set` is called without one.
    pub fn with_default_ttl(mut self, default_ttl: Duration) -> Self {
        self.default_ttl = default_ttl;
        self
    }

    /// Sets the interval between background sweeps.
    pub fn with_sweep_interval(mut self, sweep_interval: Duration) -> Self {
        self.sweep_interval = sweep_interval;
        self
    }

    /// Validates the configuration.
    ///
    /// A cache with zero capacity or a zero duration anywhere is a
    /// configuration error, caught here before any resource is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.max_items == 0 {
            return Err(CacheError::InvalidConfig(
                "max_items must be greater than zero".to_string(),
            ));
        }
        if self.default_ttl.is_zero() {
            return Err(CacheError::InvalidConfig(
                "default_ttl must be a positive duration".to_string(),
            ));
        }
        if self.sweep_interval.is_zero() {
            return Err(CacheError::InvalidConfig(
                "sweep_interval must be a positive duration".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            default_ttl: DEFAULT_TTL,
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
        }
    }
}
