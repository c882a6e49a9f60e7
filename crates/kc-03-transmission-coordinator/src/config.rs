//! Transmission Coordinator configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use shared_types::supervisor::DEFAULT_COOLDOWN;

use crate::error::{CoordinatorError, CoordinatorResult};

/// Coordinator tunables.
///
/// `min_confirmations` and `poll_cadence` vary per chain, so neither is
/// hard-coded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoordinatorConfig {
    /// How long an accepted identifier stays locked without a confirmation
    #[serde(with = "humantime_serde")]
    pub lockout_window: Duration,
    /// How long accepted/confirmed key records are kept
    #[serde(with = "humantime_serde")]
    pub confirmation_ttl: Duration,
    /// Depth a perform log needs before its identifier unlocks
    pub min_confirmations: u64,
    /// Target interval between perform log polls
    #[serde(with = "humantime_serde")]
    pub poll_cadence: Duration,
    /// Wait before the next poll when one overran the cadence
    #[serde(with = "humantime_serde")]
    pub overrun_retry_delay: Duration,
    /// Sweep interval for both caches
    #[serde(with = "humantime_serde")]
    pub cache_clean_interval: Duration,
    /// Pause before restarting a poller that panicked
    #[serde(with = "humantime_serde")]
    pub supervisor_cooldown: Duration,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            lockout_window: Duration::from_secs(20 * 60),
            confirmation_ttl: Duration::from_secs(60 * 60),
            min_confirmations: 1,
            poll_cadence: Duration::from_secs(1),
            overrun_retry_delay: Duration::from_millis(10),
            cache_clean_interval: Duration::from_secs(30),
            supervisor_cooldown: DEFAULT_COOLDOWN,
        }
    }
}

impl CoordinatorConfig {
    /// Validate configuration
    pub fn validate(&self) -> CoordinatorResult<()> {
        if self.min_confirmations == 0 {
            return Err(CoordinatorError::InvalidConfig(
                "min_confirmations cannot be 0".into(),
            ));
        }
        if self.poll_cadence.is_zero() {
            return Err(CoordinatorError::InvalidConfig(
                "poll_cadence cannot be 0".into(),
            ));
        }
        if self.lockout_window < self.poll_cadence {
            return Err(CoordinatorError::InvalidConfig(format!(
                "lockout_window {:?} is shorter than poll_cadence {:?}",
                self.lockout_window, self.poll_cadence
            )));
        }
        if self.cache_clean_interval.is_zero() {
            return Err(CoordinatorError::InvalidConfig(
                "cache_clean_interval cannot be 0".into(),
            ));
        }
        Ok(())
    }
}
