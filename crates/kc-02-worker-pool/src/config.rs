//! Worker pool configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use shared_types::supervisor::DEFAULT_COOLDOWN;

use crate::error::{PoolError, PoolResult};

/// Sizing and timing for a [`WorkerPool`](crate::WorkerPool).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Maximum concurrently running workers
    pub max_workers: usize,
    /// Capacity of the submission channel
    pub queue_capacity: usize,
    /// With no submissions for this long, one idle worker is retired
    #[serde(with = "humantime_serde")]
    pub idle_timeout: Duration,
    /// Grace window used when `submit_or_fail` is given none
    #[serde(with = "humantime_serde")]
    pub submit_grace: Duration,
    /// Pause before restarting a dispatcher that panicked
    #[serde(with = "humantime_serde")]
    pub supervisor_cooldown: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_workers: 10,
            queue_capacity: 10,
            idle_timeout: Duration::from_secs(1),
            submit_grace: Duration::from_millis(50),
            supervisor_cooldown: DEFAULT_COOLDOWN,
        }
    }
}

impl PoolConfig {
    /// Config with `max_workers` workers and defaults elsewhere.
    pub fn with_workers(max_workers: usize) -> Self {
        Self {
            max_workers,
            ..Self::default()
        }
    }

    /// Reject sizes and windows the dispatcher cannot run with.
    pub fn validate(&self) -> PoolResult<()> {
        if self.max_workers == 0 {
            return Err(PoolError::InvalidConfig("max_workers cannot be 0".into()));
        }
        if self.queue_capacity == 0 {
            return Err(PoolError::InvalidConfig("queue_capacity cannot be 0".into()));
        }
        if self.idle_timeout.is_zero() {
            return Err(PoolError::InvalidConfig("idle_timeout cannot be 0".into()));
        }
        if self.submit_grace.is_zero() {
            return Err(PoolError::InvalidConfig("submit_grace cannot be 0".into()));
        }
        Ok(())
    }
}
