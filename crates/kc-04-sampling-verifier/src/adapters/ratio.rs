//! Fixed sampling ratio.

use serde::{Deserialize, Serialize};

use crate::ports::outbound::RatioPolicy;

/// Samples `ceil(ratio * n)` keys, clamped to `n`.
///
/// Ratios outside `[0, 1]` are clamped; a zero ratio samples nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SampleRatio(pub f64);

impl SampleRatio {
    pub fn new(ratio: f64) -> Self {
        Self(ratio)
    }

    fn clamped(&self) -> f64 {
        if self.0.is_nan() {
            0.0
        } else {
            self.0.clamp(0.0, 1.0)
        }
    }
}

impl Default for SampleRatio {
    fn default() -> Self {
        Self(1.0)
    }
}

impl RatioPolicy for SampleRatio {
    fn of_int(&self, n: usize) -> usize {
        let ratio = self.clamped();
        if n == 0 || ratio == 0.0 {
            return 0;
        }
        ((ratio * n as f64).ceil() as usize).min(n)
    }
}
