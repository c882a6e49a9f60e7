//! Driven Ports (SPI - Outbound Dependencies)
//!
//! Everything the verifier consumes but does not implement: the eligibility
//! logic itself, the active upkeep set, the sampling ratio and the reporting
//! layer's view of pending and locked upkeeps.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::mpsc;

use shared_types::{
    BlockKey, CancelToken, CollaboratorError, IdentifierResolver, UpkeepIdentifier, UpkeepKey,
    UpkeepResult,
};

/// Stream of new heads; each head triggers one sampling round.
pub type HeadStream = mpsc::Receiver<BlockKey>;

/// Registry that evaluates upkeep eligibility.
#[async_trait]
pub trait UpkeepRegistry: IdentifierResolver {
    /// Check every key in one batched call.
    ///
    /// The call should honour `cancel`'s deadline.
    async fn check_upkeeps(
        &self,
        cancel: &CancelToken,
        keys: &[UpkeepKey],
    ) -> Result<Vec<UpkeepResult>, CollaboratorError>;
}

/// Source of the full active upkeep set at the latest head.
#[async_trait]
pub trait ActiveKeyProvider: Send + Sync {
    /// Every active upkeep key.
    async fn active_keys(&self, cancel: &CancelToken) -> Result<Vec<UpkeepKey>, CollaboratorError>;
}

/// Sampling ratio: returns `m` such that `m / n` approximates the ratio.
pub trait RatioPolicy: Send + Sync {
    fn of_int(&self, n: usize) -> usize;
}

/// Reports whether a key already has a report pending.
pub trait PendingChecker: Send + Sync {
    fn is_pending(&self, key: &UpkeepKey) -> Result<bool, CollaboratorError>;
}

/// Read-time filter for staged upkeeps (`true` = keep).
pub trait UpkeepFilter: Send + Sync {
    fn is_eligible(&self, key: &UpkeepKey) -> bool;
}

/// Builds the key an identifier has at a given block.
pub trait KeyBuilder: Send + Sync {
    fn make_key(&self, block: &BlockKey, id: &UpkeepIdentifier) -> UpkeepKey;
}

/// Every collaborator the verifier needs.
#[derive(Clone)]
pub struct Collaborators {
    pub registry: Arc<dyn UpkeepRegistry>,
    pub keys: Arc<dyn ActiveKeyProvider>,
    /// Overrides the configured `sample_ratio` when set
    pub ratio: Option<Arc<dyn RatioPolicy>>,
    pub pending: Arc<dyn PendingChecker>,
    pub filter: Arc<dyn UpkeepFilter>,
    pub key_builder: Arc<dyn KeyBuilder>,
}
