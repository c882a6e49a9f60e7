//! # Expiring Cache
//!
//! Generic TTL key/value store.
//!
//! ## Expiry Model
//!
//! - **Lazy on read**: `get` treats an entry whose deadline has passed as
//!   absent, whether or not the sweep has removed it yet.
//! - **Eager in bulk**: `clear_expired` removes every expired entry. It runs
//!   in two phases so writers are blocked only for the delete pass:
//!
//! ```text
//! [read lock]  scan entries ──→ expired keys
//! [write lock] re-check + remove expired keys
//! ```

use parking_lot::RwLock;
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

/// Pass as `ttl` to use the cache's configured default.
pub const DEFAULT_EXPIRATION: Duration = Duration::ZERO;

/// A cached value and its absolute deadline (`None` = never expires).
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    pub value: V,
    pub expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        matches!(self.expires_at, Some(deadline) if now > deadline)
    }
}

/// TTL key/value store guarded by a read/write lock.
#[derive(Debug)]
pub struct ExpiringCache<K, V> {
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
    default_ttl: Duration,
}

impl<K, V> ExpiringCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache. A zero `default_ttl` means entries set with
    /// [`DEFAULT_EXPIRATION`] never expire.
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    /// Default TTL applied when `set` is called with [`DEFAULT_EXPIRATION`].
    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Insert or overwrite `key`.
    ///
    /// A zero `ttl` falls back to the default; if that is also zero the
    /// entry never expires.
    pub fn set(&self, key: K, value: V, ttl: Duration) {
        let ttl = if ttl.is_zero() { self.default_ttl } else { ttl };
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Some(Instant::now() + ttl)
        };
        self.insert_entry(key, CacheEntry { value, expires_at });
    }

    /// Insert with the default TTL.
    pub fn set_default(&self, key: K, value: V) {
        self.set(key, value, DEFAULT_EXPIRATION);
    }

    pub(crate) fn insert_entry(&self, key: K, entry: CacheEntry<V>) {
        self.entries.write().insert(key, entry);
    }

    /// Look up `key`. Expired entries read as absent.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        let entries = self.entries.read();
        match entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            _ => None,
        }
    }

    /// Whether `key` is present and unexpired.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let now = Instant::now();
        self.entries
            .read()
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Remove `key` immediately.
    pub fn delete<Q>(&self, key: &Q)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries.write().remove(key);
    }

    /// Remove every expired entry. Returns how many were removed.
    pub fn clear_expired(&self) -> usize {
        let now = Instant::now();

        let expired: Vec<K> = {
            let entries = self.entries.read();
            entries
                .iter()
                .filter(|(_, entry)| entry.is_expired(now))
                .map(|(key, _)| key.clone())
                .collect()
        };

        if expired.is_empty() {
            return 0;
        }

        let mut entries = self.entries.write();
        let mut removed = 0;
        for key in expired {
            // A writer may have refreshed the key between the two passes.
            if entries.get(&key).is_some_and(|entry| entry.is_expired(now)) {
                entries.remove(&key);
                removed += 1;
            }
        }
        removed
    }

    /// Number of stored entries, including expired ones not yet swept.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Whether the cache holds no entries at all.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
