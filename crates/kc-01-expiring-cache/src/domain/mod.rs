//! Domain layer for the expiring cache.

pub mod cache;
pub mod janitor;

pub use cache::{CacheEntry, ExpiringCache, DEFAULT_EXPIRATION};
pub use janitor::Janitor;
