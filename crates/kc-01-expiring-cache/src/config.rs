//! Configuration for expiring caches.

use serde::{Deserialize, Serialize};
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::{ExpiringCache, Janitor};

/// TTL and sweep settings for one cache instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// TTL applied when an entry is set with the default expiration
    /// (zero = never expires)
    #[serde(with = "humantime_serde")]
    pub default_ttl: Duration,
    /// How often expired entries are swept
    #[serde(with = "humantime_serde")]
    pub clean_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(20 * 60),
            clean_interval: Duration::from_secs(30),
        }
    }
}

impl CacheConfig {
    /// Build a cache and start its janitor.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<K, V>(&self) -> (Arc<ExpiringCache<K, V>>, Janitor)
    where
        K: Eq + Hash + Clone + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let cache = Arc::new(ExpiringCache::new(self.default_ttl));
        let janitor = Janitor::spawn(&cache, self.clean_interval);
        (cache, janitor)
    }
}
