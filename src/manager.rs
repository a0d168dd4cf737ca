//! Cache Manager Module
//!
//! A registry mapping logical names ("users", "events", "tickets", ...) to
//! independently configured cache instances. The host application
//! constructs one manager at startup, threads it through request handling,
//! and destroys it at shutdown; nothing here is process-global.
//!
//! Each name is bound to the value type it was first created with, so a
//! cache of users and a cache of events are distinct, type-checked
//! instances behind one registry.

use std::any::Any;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::cache::{CacheStats, CacheValue, MemoryCache};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Managed Cache ==
/// Type-erased admin surface over one registered instance, for operations
/// that do not need the value type.
#[async_trait]
trait ManagedCache: Send + Sync {
    async fn stats(&self) -> CacheStats;
    async fn clear(&self);
    async fn destroy(&self);
}

#[async_trait]
impl<T: CacheValue> ManagedCache for MemoryCache<T> {
    async fn stats(&self) -> CacheStats {
        MemoryCache::stats(self).await
    }

    async fn clear(&self) {
        MemoryCache::clear(self).await
    }

    async fn destroy(&self) {
        MemoryCache::destroy(self).await
    }
}

// == Registered Instance ==
/// One registry slot: the typed handle for downcasting plus the erased
/// admin handle for aggregate operations.
struct Registered {
    typed: Arc<dyn Any + Send + Sync>,
    admin: Arc<dyn ManagedCache>,
}

impl Registered {
    fn new<T: CacheValue>(cache: &Arc<MemoryCache<T>>) -> Self {
        let typed: Arc<dyn Any + Send + Sync> = cache.clone();
        let admin: Arc<dyn ManagedCache> = cache.clone();
        Self { typed, admin }
    }
}

fn downcast<T: CacheValue>(name: &str, registered: &Registered) -> Result<Arc<MemoryCache<T>>> {
    registered
        .typed
        .clone()
        .downcast::<MemoryCache<T>>()
        .map_err(|_| CacheError::TypeMismatch {
            name: name.to_string(),
        })
}

// == Cache Manager ==
/// Registry of named cache instances with lazy, exactly-once construction.
///
/// Lifecycle mirrors the instances it owns: Active until
/// [`CacheManager::destroy`], which tears down every registered cache and
/// rejects further `get_cache`/`create_cache` calls. Destroy is
/// idempotent.
pub struct CacheManager {
    /// name -> instance; guarded so concurrent lookups for the same name
    /// construct at most one instance
    registry: RwLock<HashMap<String, Registered>>,
    /// Configuration applied to lazily created instances
    defaults: CacheConfig,
    destroyed: AtomicBool,
}

impl CacheManager {
    // == Constructor ==
    /// Creates a manager whose lazily created caches use `defaults`.
    ///
    /// Fails fast on an invalid default configuration.
    pub fn new(defaults: CacheConfig) -> Result<Self> {
        defaults.validate()?;
        Ok(Self {
            registry: RwLock::new(HashMap::new()),
            defaults,
            destroyed: AtomicBool::new(false),
        })
    }

    // == Get Cache ==
    /// Returns the cache registered under `name`, lazily constructing a
    /// default-configured instance on first reference.
    ///
    /// Idempotent: repeated calls with the same name return the same
    /// instance. Requesting a name with a different value type than it was
    /// created with fails with [`CacheError::TypeMismatch`].
    pub async fn get_cache<T: CacheValue>(&self, name: &str) -> Result<Arc<MemoryCache<T>>> {
        self.ensure_active()?;

        {
            let registry = self.registry.read().await;
            if let Some(registered) = registry.get(name) {
                return downcast::<T>(name, registered);
            }
        }

        // Re-check under the write lock so racing callers construct at
        // most one instance per name.
        let mut registry = self.registry.write().await;
        if let Some(registered) = registry.get(name) {
            return downcast::<T>(name, registered);
        }

        let cache = MemoryCache::new(self.defaults.clone())?;
        registry.insert(name.to_string(), Registered::new(&cache));
        debug!(name, "created cache with default configuration");
        Ok(cache)
    }

    // == Create Cache ==
    /// Explicitly constructs (or replaces) the cache registered under
    /// `name` with custom bounds.
    ///
    /// Intended to be called once per namespace at startup, not per
    /// request. A replaced instance is destroyed: its sweeper stops and
    /// any handles still held read as empty.
    pub async fn create_cache<T: CacheValue>(
        &self,
        name: &str,
        config: CacheConfig,
    ) -> Result<Arc<MemoryCache<T>>> {
        self.ensure_active()?;

        let cache = MemoryCache::new(config)?;
        let replaced = {
            let mut registry = self.registry.write().await;
            registry.insert(name.to_string(), Registered::new(&cache))
        };

        if let Some(old) = replaced {
            old.admin.destroy().await;
            debug!(name, "replaced existing cache");
        }

        Ok(cache)
    }

    // == Aggregate Stats ==
    /// Captures a statistics snapshot for every registered instance,
    /// keyed by cache name.
    pub async fn get_all_stats(&self) -> HashMap<String, CacheStats> {
        let handles: Vec<(String, Arc<dyn ManagedCache>)> = {
            let registry = self.registry.read().await;
            registry
                .iter()
                .map(|(name, registered)| (name.clone(), registered.admin.clone()))
                .collect()
        };

        let mut stats = HashMap::with_capacity(handles.len());
        for (name, admin) in handles {
            stats.insert(name, admin.stats().await);
        }
        stats
    }

    // == Clear All ==
    /// Clears every registered instance without destroying any of them.
    pub async fn clear_all(&self) {
        let handles: Vec<Arc<dyn ManagedCache>> = {
            let registry = self.registry.read().await;
            registry.values().map(|r| r.admin.clone()).collect()
        };

        for admin in handles {
            admin.clear().await;
        }
    }

    // == Destroy ==
    /// Destroys every registered instance and renders the manager
    /// unusable. Idempotent: later calls are no-ops.
    pub async fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }

        let drained: Vec<Registered> = {
            let mut registry = self.registry.write().await;
            registry.drain().map(|(_, registered)| registered).collect()
        };

        for registered in &drained {
            registered.admin.destroy().await;
        }
        info!(caches = drained.len(), "cache manager destroyed");
    }

    /// Whether `destroy` has been called on this manager.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    fn ensure_active(&self) -> Result<()> {
        if self.destroyed.load(Ordering::SeqCst) {
            Err(CacheError::Destroyed)
        } else {
            Ok(())
        }
    }
}

impl Default for CacheManager {
    fn default() -> Self {
        Self {
            registry: RwLock::new(HashMap::new()),
            defaults: CacheConfig::default(),
            destroyed: AtomicBool::new(false),
        }
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_new_rejects_invalid_defaults() {
        let result = CacheManager::new(CacheConfig::default().with_max_items(0));
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_new_accepts_valid_defaults() {
        let manager = CacheManager::new(CacheConfig::default().with_max_items(50)).unwrap();
        assert!(!manager.is_destroyed());
    }

    #[tokio::test]
    async fn test_get_cache_is_lazily_created_once() {
        let manager = CacheManager::default();

        let users_a = manager.get_cache::<String>("users").await.unwrap();
        let users_b = manager.get_cache::<String>("users").await.unwrap();

        assert!(Arc::ptr_eq(&users_a, &users_b));
        assert_eq!(users_a.config(), &CacheConfig::default());
    }

    #[tokio::test]
    async fn test_named_caches_are_independent() {
        let manager = CacheManager::default();

        let users = manager.get_cache::<String>("users").await.unwrap();
        let events = manager.get_cache::<String>("events").await.unwrap();

        users.set("user:1", "alice".to_string(), None).await.unwrap();

        assert_eq!(events.len().await, 0);
        assert_eq!(users.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_cache_type_mismatch() {
        let manager = CacheManager::default();

        manager.get_cache::<String>("users").await.unwrap();
        let result = manager.get_cache::<u64>("users").await;

        assert_eq!(
            result.err(),
            Some(CacheError::TypeMismatch {
                name: "users".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_create_cache_custom_bounds() {
        let manager = CacheManager::default();

        let tickets = manager
            .create_cache::<String>(
                "tickets",
                CacheConfig::default()
                    .with_max_items(2)
                    .with_default_ttl(Duration::from_secs(5)),
            )
            .await
            .unwrap();

        tickets.set("t1", "a".to_string(), None).await.unwrap();
        tickets.set("t2", "b".to_string(), None).await.unwrap();
        tickets.set("t3", "c".to_string(), None).await.unwrap();

        assert_eq!(tickets.len().await, 2);

        // get_cache now returns the custom-bounded instance
        let again = manager.get_cache::<String>("tickets").await.unwrap();
        assert!(Arc::ptr_eq(&tickets, &again));
    }

    #[tokio::test]
    async fn test_create_cache_rejects_invalid_config() {
        let manager = CacheManager::default();

        let result = manager
            .create_cache::<String>("bad", CacheConfig::default().with_max_items(0))
            .await;

        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_create_cache_replacement_destroys_old() {
        let manager = CacheManager::default();

        let old = manager.get_cache::<String>("users").await.unwrap();
        old.set("user:1", "alice".to_string(), None).await.unwrap();

        let new = manager
            .create_cache::<String>("users", CacheConfig::default().with_max_items(10))
            .await
            .unwrap();

        assert!(!Arc::ptr_eq(&old, &new));
        assert!(old.is_destroyed());
        assert_eq!(old.len().await, 0);
    }

    #[tokio::test]
    async fn test_get_all_stats_covers_every_namespace() {
        let manager = CacheManager::default();

        let users = manager.get_cache::<String>("users").await.unwrap();
        let events = manager.get_cache::<String>("events").await.unwrap();

        users.set("user:1", "alice".to_string(), None).await.unwrap();
        users.get("user:1").await.unwrap();
        events.get("event:1").await;

        let stats = manager.get_all_stats().await;
        assert_eq!(stats.len(), 2);
        assert_eq!(stats["users"].hits, 1);
        assert_eq!(stats["users"].total_items, 1);
        assert_eq!(stats["events"].misses, 1);
    }

    #[tokio::test]
    async fn test_clear_all_keeps_instances() {
        let manager = CacheManager::default();

        let users = manager.get_cache::<String>("users").await.unwrap();
        users.set("user:1", "alice".to_string(), None).await.unwrap();

        manager.clear_all().await;

        assert_eq!(users.len().await, 0);

        // The instance is still usable
        users.set("user:2", "bob".to_string(), None).await.unwrap();
        assert_eq!(users.len().await, 1);
    }

    #[tokio::test]
    async fn test_destroy_is_idempotent_and_terminal() {
        let manager = CacheManager::default();

        let users = manager.get_cache::<String>("users").await.unwrap();
        users.set("user:1", "alice".to_string(), None).await.unwrap();

        manager.destroy().await;
        manager.destroy().await;

        assert!(manager.is_destroyed());
        assert!(users.is_destroyed());
        assert_eq!(users.len().await, 0);

        let result = manager.get_cache::<String>("users").await;
        assert_eq!(result.err(), Some(CacheError::Destroyed));
        assert!(manager.get_all_stats().await.is_empty());
    }
}
