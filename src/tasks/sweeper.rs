//! TTL Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use crate::cache::{CacheValue, MemoryCache};

/// Spawns the recurring sweep for one cache instance.
///
/// The task ticks on a fixed interval and invokes the cache's expired-entry
/// cleanup under its write lock. A tick that comes due while a sweep is
/// still running is delayed until the sweep finishes, so sweeps never
/// overlap on the same instance.
///
/// Only a `Weak` handle to the cache is held: if the last strong reference
/// is dropped without an explicit destroy, the next tick fails to upgrade
/// and the task exits. Explicit destroy aborts the task through the
/// returned [`JoinHandle`].
///
/// # Arguments
/// * `cache` - Weak reference to the cache to sweep
/// * `period` - Interval between sweeps; must be non-zero (validated by
///   the cache configuration)
pub fn spawn_sweeper<T: CacheValue>(
    cache: Weak<MemoryCache<T>>,
    period: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        debug!(period_secs = period.as_secs(), "sweeper started");

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; consume it so the first
        // sweep happens one full period after startup.
        ticker.tick().await;

        loop {
            ticker.tick().await;

            let Some(cache) = cache.upgrade() else {
                break;
            };

            let removed = cache.cleanup_expired().await;
            if removed > 0 {
                info!(removed, "sweep removed expired entries");
            } else {
                debug!("sweep found no expired entries");
            }
        }

        debug!("sweeper stopped");
    })
}
