//! In-memory collaborators.
//!
//! Each one records how often it was called so tests can assert on RPC
//! counts.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use kc_03_transmission_coordinator::PerformLogProvider;
use kc_04_sampling_verifier::{
    ActiveKeyProvider, Collaborators, DelimitedKeyBuilder, PendingChecker, UpkeepFilter,
    UpkeepRegistry,
};
use keeper_telemetry::TelemetryConfig;
use shared_types::{
    BlockKey, CancelToken, CollaboratorError, IdentifierResolver, PerformLog, UpkeepIdentifier,
    UpkeepKey, UpkeepResult,
};

/// Install a subscriber for the test binary. Later calls are no-ops.
pub fn init_logging() {
    let config = TelemetryConfig::from_env();
    let _ = keeper_telemetry::init_logging(&config);
}

/// Keys `<block>|<id>` for every id in `ids`.
pub fn keys_at(block: u64, ids: impl IntoIterator<Item = u64>) -> Vec<UpkeepKey> {
    let block = BlockKey::from(block);
    ids.into_iter()
        .map(|id| UpkeepKey::new(&block, &UpkeepIdentifier::new(id.to_string())))
        .collect()
}

/// Registry with a fixed eligible set.
#[derive(Default)]
pub struct StaticRegistry {
    eligible: HashSet<String>,
    calls: AtomicUsize,
}

impl StaticRegistry {
    pub fn new<I: IntoIterator<Item = u64>>(eligible: I) -> Self {
        Self {
            eligible: eligible.into_iter().map(|id| id.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// `check_upkeeps` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl IdentifierResolver for StaticRegistry {
    fn identifier_from_key(&self, key: &UpkeepKey) -> Result<UpkeepIdentifier, CollaboratorError> {
        Ok(key.split()?.1)
    }
}

#[async_trait]
impl UpkeepRegistry for StaticRegistry {
    async fn check_upkeeps(
        &self,
        _cancel: &CancelToken,
        keys: &[UpkeepKey],
    ) -> Result<Vec<UpkeepResult>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        keys.iter()
            .map(|key| -> Result<UpkeepResult, CollaboratorError> {
                let (_, id) = key.split()?;
                Ok(if self.eligible.contains(id.as_str()) {
                    UpkeepResult::eligible(key.clone(), id.as_str().as_bytes().to_vec())
                } else {
                    UpkeepResult::skipped(key.clone())
                })
            })
            .collect()
    }
}

/// Active key set the test can swap between rounds.
#[derive(Default)]
pub struct StaticKeys {
    keys: Mutex<Vec<UpkeepKey>>,
}

impl StaticKeys {
    pub fn set(&self, keys: Vec<UpkeepKey>) {
        *self.keys.lock() = keys;
    }
}

#[async_trait]
impl ActiveKeyProvider for StaticKeys {
    async fn active_keys(&self, _cancel: &CancelToken) -> Result<Vec<UpkeepKey>, CollaboratorError> {
        Ok(self.keys.lock().clone())
    }
}

/// Pending set maintained by the test.
#[derive(Default)]
pub struct PendingSet {
    pending: Mutex<HashSet<UpkeepKey>>,
}

impl PendingSet {
    pub fn mark(&self, key: UpkeepKey) {
        self.pending.lock().insert(key);
    }

    pub fn clear(&self) {
        self.pending.lock().clear();
    }
}

impl PendingChecker for PendingSet {
    fn is_pending(&self, key: &UpkeepKey) -> Result<bool, CollaboratorError> {
        Ok(self.pending.lock().contains(key))
    }
}

/// Perform logs queued by the test, returned on every poll.
#[derive(Default)]
pub struct QueuedLogs {
    logs: Mutex<Vec<PerformLog>>,
    polls: AtomicUsize,
}

impl QueuedLogs {
    pub fn push(&self, key: UpkeepKey, transmit_block: u64, confirmations: u64) {
        self.logs.lock().push(PerformLog {
            key,
            transmit_block: BlockKey::from(transmit_block),
            confirmations,
        });
    }

    pub fn polls(&self) -> usize {
        self.polls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PerformLogProvider for QueuedLogs {
    async fn perform_logs(&self, _cancel: &CancelToken) -> Result<Vec<PerformLog>, CollaboratorError> {
        self.polls.fetch_add(1, Ordering::SeqCst);
        Ok(self.logs.lock().clone())
    }
}

/// Collaborators with the given filter. Sampling follows the verifier's
/// configured `sample_ratio`.
pub fn collaborators(
    registry: Arc<StaticRegistry>,
    keys: Arc<StaticKeys>,
    pending: Arc<PendingSet>,
    filter: Arc<dyn UpkeepFilter>,
) -> Collaborators {
    Collaborators {
        registry,
        keys,
        ratio: None,
        pending,
        filter,
        key_builder: Arc::new(DelimitedKeyBuilder),
    }
}
