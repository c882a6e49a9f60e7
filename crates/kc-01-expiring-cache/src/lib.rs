//! # kc-01-expiring-cache
//!
//! Generic TTL key/value store used to avoid redundant verification calls
//! and to track transmission locks.
//!
//! ## Overview
//!
//! - **Lazy expiry**: reads after the deadline behave as absent
//! - **Bulk eviction**: a [`Janitor`] sweeps expired entries on a timer
//! - **Short write windows**: sweeps collect under the read lock and delete
//!   under a brief write lock
//!
//! ## Example
//!
//! ```rust,ignore
//! use kc_01_expiring_cache::{CacheConfig, DEFAULT_EXPIRATION};
//!
//! let (cache, janitor) = CacheConfig::default().spawn::<String, u64>();
//! cache.set("x".into(), 5, Duration::from_millis(50));
//! assert_eq!(cache.get("x"), Some(5));
//! janitor.stop();
//! ```

pub mod config;
pub mod domain;

pub use config::CacheConfig;
pub use domain::{CacheEntry, ExpiringCache, Janitor, DEFAULT_EXPIRATION};
