//! Sampling Verifier and keeper-wide configuration.
//!
//! Every field has a default, so a config file only needs the values it
//! changes. Durations use humantime strings.
//!
//! ```toml
//! [coordinator]
//! lockout_window = "20m"
//! min_confirmations = 3
//! poll_cadence = "1s"
//!
//! [verifier]
//! batch_size = 10
//! sample_ratio = 0.3
//! round_timeout = "10s"
//!
//! [verifier.cache]
//! default_ttl = "20m"
//!
//! [verifier.pool]
//! max_workers = 10
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use kc_01_expiring_cache::CacheConfig;
use kc_02_worker_pool::PoolConfig;
use kc_03_transmission_coordinator::CoordinatorConfig;
use shared_types::supervisor::DEFAULT_COOLDOWN;

use crate::adapters::SampleRatio;
use crate::error::{VerifierError, VerifierResult};

/// Verifier tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerifierConfig {
    /// Keys per registry call (and per pool task)
    pub batch_size: usize,
    /// Fraction of the active set sampled each round
    pub sample_ratio: f64,
    /// Deadline applied to a whole round, RPCs included
    #[serde(with = "humantime_serde")]
    pub round_timeout: Duration,
    /// Result cache (TTL and sweep interval)
    pub cache: CacheConfig,
    /// Pause before restarting a round loop that panicked
    #[serde(with = "humantime_serde")]
    pub supervisor_cooldown: Duration,
    pub pool: PoolConfig,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            batch_size: 10,
            sample_ratio: 0.3,
            round_timeout: Duration::from_secs(10),
            cache: CacheConfig::default(),
            supervisor_cooldown: DEFAULT_COOLDOWN,
            pool: PoolConfig::default(),
        }
    }
}

impl VerifierConfig {
    /// Ratio policy built from `sample_ratio`.
    pub fn ratio(&self) -> SampleRatio {
        SampleRatio::new(self.sample_ratio)
    }

    /// Validate configuration
    pub fn validate(&self) -> VerifierResult<()> {
        if self.batch_size == 0 {
            return Err(VerifierError::InvalidConfig(
                "batch_size cannot be 0".into(),
            ));
        }
        self.pool
            .validate()
            .map_err(|e| VerifierError::InvalidConfig(format!("pool: {}", e)))?;
        if !(0.0..=1.0).contains(&self.sample_ratio) {
            return Err(VerifierError::InvalidConfig(format!(
                "sample_ratio {} is outside [0, 1]",
                self.sample_ratio
            )));
        }
        if self.round_timeout.is_zero() {
            return Err(VerifierError::InvalidConfig(
                "round_timeout cannot be 0".into(),
            ));
        }
        if self.cache.clean_interval.is_zero() {
            return Err(VerifierError::InvalidConfig(
                "cache.clean_interval cannot be 0".into(),
            ));
        }
        Ok(())
    }
}

/// Whole-keeper configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeeperConfig {
    pub coordinator: CoordinatorConfig,
    pub verifier: VerifierConfig,
}

impl KeeperConfig {
    /// Load and validate configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed or validated.
    pub fn load<P: AsRef<Path>>(path: P) -> VerifierResult<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| VerifierError::ConfigIo {
            path: path.as_ref().display().to_string(),
            reason: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(content: &str) -> VerifierResult<Self> {
        let config: Self =
            toml::from_str(content).map_err(|e| VerifierError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validate both sections.
    pub fn validate(&self) -> VerifierResult<()> {
        self.coordinator
            .validate()
            .map_err(|e| VerifierError::InvalidConfig(e.to_string()))?;
        self.verifier.validate()
    }
}
