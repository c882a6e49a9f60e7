//! # Verifier Metrics
//!
//! Prometheus metrics for sampling rounds and the result cache.
//!
//! ## Usage
//!
//! Enable with the `metrics` feature:
//! ```toml
//! kc-04-sampling-verifier = { path = "...", features = ["metrics"] }
//! ```
//!
//! ## Metrics Exported
//!
//! - `keeper_rounds_total` - Counter of rounds, labeled by outcome
//! - `keeper_round_duration_seconds` - Histogram of round wall time
//! - `keeper_eligible_upkeeps` - Gauge of eligible upkeeps staged by the last round
//! - `keeper_failed_batches_total` - Counter of registry batches that failed
//! - `keeper_cache_hits_total` / `keeper_cache_misses_total` - `check_keys` cache lookups

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
use prometheus::{
    register_histogram, register_int_counter, register_int_counter_vec, register_int_gauge,
    Histogram, IntCounter, IntCounterVec, IntGauge,
};

#[cfg(feature = "metrics")]
lazy_static! {
    /// Rounds run, labeled by outcome
    pub static ref ROUNDS: IntCounterVec = register_int_counter_vec!(
        "keeper_rounds_total",
        "Total number of sampling rounds",
        &["outcome"]
    )
    .expect("Failed to create ROUNDS metric");

    /// Round wall time
    pub static ref ROUND_DURATION: Histogram = register_histogram!(
        "keeper_round_duration_seconds",
        "Wall time of a sampling round"
    )
    .expect("Failed to create ROUND_DURATION metric");

    /// Eligible upkeeps staged by the last completed round
    pub static ref ELIGIBLE_UPKEEPS: IntGauge = register_int_gauge!(
        "keeper_eligible_upkeeps",
        "Eligible upkeeps staged by the last completed round"
    )
    .expect("Failed to create ELIGIBLE_UPKEEPS metric");

    /// Registry batches that failed
    pub static ref FAILED_BATCHES: IntCounter = register_int_counter!(
        "keeper_failed_batches_total",
        "Total number of failed registry batches"
    )
    .expect("Failed to create FAILED_BATCHES metric");

    pub static ref CACHE_HITS: IntCounter = register_int_counter!(
        "keeper_cache_hits_total",
        "Result cache hits in check_keys"
    )
    .expect("Failed to create CACHE_HITS metric");

    pub static ref CACHE_MISSES: IntCounter = register_int_counter!(
        "keeper_cache_misses_total",
        "Result cache misses in check_keys"
    )
    .expect("Failed to create CACHE_MISSES metric");
}

// =============================================================================
// METRIC RECORDING FUNCTIONS
// =============================================================================

/// Record a completed round
#[cfg(feature = "metrics")]
pub fn record_round_completed(eligible: usize, failed_batches: usize, seconds: f64) {
    ROUNDS.with_label_values(&["completed"]).inc();
    ROUND_DURATION.observe(seconds);
    ELIGIBLE_UPKEEPS.set(eligible as i64);
    FAILED_BATCHES.inc_by(failed_batches as u64);
}

/// Record a round that failed outright
#[cfg(feature = "metrics")]
pub fn record_round_failed(reason: &str, failed_batches: usize) {
    ROUNDS.with_label_values(&[reason]).inc();
    FAILED_BATCHES.inc_by(failed_batches as u64);
}

/// Record cache lookups from `check_keys`
#[cfg(feature = "metrics")]
pub fn record_cache_lookups(hits: usize, misses: usize) {
    CACHE_HITS.inc_by(hits as u64);
    CACHE_MISSES.inc_by(misses as u64);
}

// =============================================================================
// NO-OP IMPLEMENTATIONS (when metrics feature disabled)
// =============================================================================

#[cfg(not(feature = "metrics"))]
pub fn record_round_completed(_eligible: usize, _failed_batches: usize, _seconds: f64) {}

#[cfg(not(feature = "metrics"))]
pub fn record_round_failed(_reason: &str, _failed_batches: usize) {}

#[cfg(not(feature = "metrics"))]
pub fn record_cache_lookups(_hits: usize, _misses: usize) {}
