//! Driving Ports (API - Inbound)

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use shared_types::{BlockKey, CancelToken, UpkeepIdentifier, UpkeepKey, UpkeepResult};

use crate::error::VerifierResult;

/// Eligible upkeeps from the most recently completed round.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    /// Head the round was sampled at (empty before the first round)
    pub block: BlockKey,
    /// Eligible identifiers that are neither pending nor locked
    pub identifiers: Vec<UpkeepIdentifier>,
}

/// API consumed by the reporting layer.
#[async_trait]
pub trait VerifierApi: Send + Sync {
    /// Current round's eligible set, filtered at read time.
    fn observe(&self) -> Observation;

    /// Check specific keys, served from cache where possible.
    ///
    /// Results come back in the order of `keys`.
    async fn check_keys(
        &self,
        cancel: &CancelToken,
        keys: &[UpkeepKey],
    ) -> VerifierResult<Vec<UpkeepResult>>;
}
