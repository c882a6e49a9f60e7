//! A single pool worker.
//!
//! ```text
//! [AVAILABLE] ──assigned──→ [RUNNING] ──result──→ [AVAILABLE]
//!                               │
//!                               ├──panicked──→ log ──→ [AVAILABLE]
//!                               └──pool stopped──→ [EXITED]
//! ```
//!
//! A panicking task yields no result; callers waiting on its id see it as
//! outstanding until their own deadline.

use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, error, trace};

use shared_types::{panic_message, CancelToken};

use super::work::{WorkRecord, WorkResult};

/// A named execution slot. Runs exactly one task at a time.
#[derive(Debug)]
pub struct Worker {
    name: String,
}

impl Worker {
    pub fn new(name: String) -> Self {
        Self { name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Run `record`, publish its result, then rejoin the available set
    /// unless the pool has stopped.
    pub async fn run<T, E>(
        self,
        record: WorkRecord<T, E>,
        results: mpsc::UnboundedSender<WorkResult<T, E>>,
        available: mpsc::Sender<Worker>,
        pool_stop: CancelToken,
    ) where
        T: Send + 'static,
        E: Send + 'static,
    {
        let WorkRecord {
            id,
            task,
            cancel,
            submitted_at,
        } = record;

        let started = Instant::now();
        let queued = started.saturating_duration_since(submitted_at);

        let outcome = tokio::select! {
            biased;
            _ = pool_stop.cancelled() => {
                debug!(worker = %self.name, task_id = id, "[kc-02] Pool stopped; abandoning task");
                return;
            }
            _ = cancel.cancelled() => None,
            value = AssertUnwindSafe(async { task(cancel.clone()).await }).catch_unwind() => Some(value),
        };

        match outcome {
            Some(Ok(value)) => {
                let result = WorkResult {
                    task_id: id,
                    worker_name: self.name.clone(),
                    value,
                    duration: started.elapsed(),
                    queued,
                };
                if results.send(result).is_err() {
                    trace!(worker = %self.name, task_id = id, "[kc-02] Results stream closed");
                }
            }
            Some(Err(panic)) => {
                error!(
                    worker = %self.name,
                    task_id = id,
                    panic = %panic_message(panic),
                    "[kc-02] Task panicked; no result emitted"
                );
            }
            None => {
                debug!(worker = %self.name, task_id = id, "[kc-02] Caller cancelled; result dropped");
            }
        }

        if pool_stop.is_cancelled() {
            return;
        }
        // Capacity equals max workers, so this never waits.
        let _ = available.send(self).await;
    }
}
