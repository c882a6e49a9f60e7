//! Per-round bookkeeping.

use std::time::Duration;

use shared_types::BlockKey;

/// What one sampling round did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundSummary {
    pub block: BlockKey,
    /// Size of the active upkeep set
    pub population: usize,
    /// Keys drawn for verification
    pub sampled: usize,
    pub batches: usize,
    pub failed_batches: usize,
    /// Eligible upkeeps staged
    pub eligible: usize,
    pub elapsed: Duration,
}

impl RoundSummary {
    /// Whether every batch failed (and at least one was attempted).
    pub fn is_exhausted(&self) -> bool {
        self.batches > 0 && self.failed_batches >= self.batches
    }
}
