//! Driven Ports (SPI - Outbound Dependencies)

use async_trait::async_trait;
use shared_types::{CancelToken, CollaboratorError, PerformLog};

/// Source of perform logs observed on the ledger.
///
/// Logs are polled repeatedly; a log below the confirmation threshold is
/// expected to reappear with a higher depth on a later poll.
#[async_trait]
pub trait PerformLogProvider: Send + Sync {
    /// Fetch the perform logs currently visible.
    async fn perform_logs(&self, cancel: &CancelToken) -> Result<Vec<PerformLog>, CollaboratorError>;
}
