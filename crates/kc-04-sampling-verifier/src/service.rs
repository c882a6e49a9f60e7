//! Sampling Verifier Service
//!
//! Runs one sampling round per head and serves cached eligibility checks.
//!
//! ## Round Flow
//!
//! ```text
//! head ──→ active_keys ──→ shuffle + slice ──→ prepare_next(block)
//!                                                   │
//!            ┌──────────────────────────────────────┘
//!            ↓
//!     batches of N keys ──submit──→ Worker Pool ──→ registry.check_upkeeps
//!                                                   │
//!            ┌──────────── results stream ←─────────┘
//!            ↓
//!     cache every result, push eligible ids to next
//!            │
//!            ├── every batch failed ──→ TooManyErrors (next discarded)
//!            └── otherwise ──────────→ advance() (next becomes current)
//! ```
//!
//! Only `advance()` makes a round visible, so `observe()` never returns a
//! partially built round.

use parking_lot::Mutex;
use rand::rngs::OsRng;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use async_trait::async_trait;
use kc_01_expiring_cache::{ExpiringCache, Janitor};
use kc_02_worker_pool::{task, TaskId, WorkResult, WorkerPool};
use keeper_telemetry::{log_round_event, log_upkeep_event};
use shared_types::{
    supervise, BlockKey, CancelHandle, CancelToken, CollaboratorError, UpkeepKey, UpkeepResult,
};

use crate::config::VerifierConfig;
use crate::domain::{batch_keys, sample_keys, RoundSummary, StagedRound};
use crate::error::{VerifierError, VerifierResult};
use crate::metrics;
use crate::ports::inbound::{Observation, VerifierApi};
use crate::ports::outbound::{Collaborators, HeadStream, RatioPolicy, UpkeepRegistry};

type BatchResult = WorkResult<Vec<UpkeepResult>, CollaboratorError>;

/// Shared state reachable from the round loop.
struct VerifierState {
    config: VerifierConfig,
    deps: Collaborators,
    /// `deps.ratio`, or the configured `sample_ratio`
    ratio: Arc<dyn RatioPolicy>,
    /// key -> last check result
    cache: Arc<ExpiringCache<UpkeepKey, UpkeepResult>>,
    pool: WorkerPool<Vec<UpkeepResult>, CollaboratorError>,
    /// Held for a whole round so only one round claims results at a time.
    results: AsyncMutex<mpsc::UnboundedReceiver<BatchResult>>,
    stage: StagedRound,
    heads: AsyncMutex<HeadStream>,
    stop: CancelToken,
}

impl VerifierState {
    async fn run(self: Arc<Self>) {
        loop {
            let block = {
                let mut heads = self.heads.lock().await;
                let mut block = match self.stop.run_until_cancelled(heads.recv()).await {
                    Some(Some(block)) => block,
                    Some(None) => {
                        info!("[kc-04] Head stream closed");
                        break;
                    }
                    None => break,
                };
                // Rounds for heads that arrived while we were busy are skipped.
                let mut skipped = 0usize;
                while let Ok(newer) = heads.try_recv() {
                    block = newer;
                    skipped += 1;
                }
                if skipped > 0 {
                    debug!(skipped, block = %block, "[kc-04] Coalesced stale heads");
                }
                block
            };

            match self.sample_round(block.clone()).await {
                Ok(summary) => log_round_event!(
                    info,
                    "kc-04",
                    "[kc-04] Round complete",
                    summary.block,
                    population = summary.population,
                    sampled = summary.sampled,
                    batches = summary.batches,
                    failed_batches = summary.failed_batches,
                    eligible = summary.eligible,
                    elapsed_ms = summary.elapsed.as_millis() as u64
                ),
                Err(VerifierError::Cancelled) if self.stop.is_cancelled() => break,
                Err(err @ VerifierError::TooManyErrors { .. }) => {
                    log_round_event!(error, "kc-04", "[kc-04] Round failed", block, error = %err)
                }
                Err(err) => {
                    log_round_event!(warn, "kc-04", "[kc-04] Round abandoned", block, error = %err)
                }
            }
        }
        debug!("[kc-04] Round loop exited");
    }

    async fn sample_round(&self, block: BlockKey) -> VerifierResult<RoundSummary> {
        let started = Instant::now();
        let mut results = self.results.lock().await;
        let round = self.stop.with_timeout(self.config.round_timeout);

        let population = round
            .run_until_cancelled(self.deps.keys.active_keys(&round))
            .await
            .ok_or(VerifierError::Cancelled)?
            .map_err(VerifierError::KeyProvider)?;
        let population_size = population.len();

        let sampled = sample_keys(population, self.ratio.as_ref(), &mut OsRng);
        let sampled_size = sampled.len();
        self.stage.prepare_next(block.clone());

        let batches = batch_keys(sampled, self.config.batch_size);
        let total = batches.len();
        let mut failed = 0usize;
        let mut in_flight: HashSet<TaskId> = HashSet::with_capacity(total);

        let mut batches = batches.into_iter();
        while let Some(batch) = batches.next() {
            let registry = Arc::clone(&self.deps.registry);
            let work = task(move |token| check_batch(registry, token, batch));
            match self.pool.submit(work, &round).await {
                Ok(id) => {
                    in_flight.insert(id);
                }
                Err(err) => {
                    let dropped = 1 + batches.len();
                    warn!(block = %block, dropped, error = %err, "[kc-04] Batch submission failed");
                    failed += dropped;
                    break;
                }
            }
        }

        let mut eligible = 0usize;
        while !in_flight.is_empty() {
            let Some(Some(result)) = round.run_until_cancelled(results.recv()).await else {
                break;
            };
            if !in_flight.remove(&result.task_id) {
                trace!(task_id = result.task_id, "[kc-04] Ignoring result from an earlier round");
                continue;
            }
            match result.value {
                Ok(checked) => eligible += self.merge(checked),
                Err(err) => {
                    failed += 1;
                    warn!(
                        block = %block,
                        worker = %result.worker_name,
                        error = %err,
                        "[kc-04] Batch check failed"
                    );
                }
            }
        }

        if self.stop.is_cancelled() {
            return Err(VerifierError::Cancelled);
        }
        if !in_flight.is_empty() {
            warn!(
                block = %block,
                abandoned = in_flight.len(),
                "[kc-04] Round deadline reached with batches outstanding"
            );
            failed += in_flight.len();
        }

        let summary = RoundSummary {
            block,
            population: population_size,
            sampled: sampled_size,
            batches: total,
            failed_batches: failed,
            eligible,
            elapsed: started.elapsed(),
        };
        if summary.is_exhausted() {
            metrics::record_round_failed("too_many_errors", failed);
            return Err(VerifierError::TooManyErrors { failed, total });
        }

        self.stage.advance();
        metrics::record_round_completed(
            summary.eligible,
            summary.failed_batches,
            summary.elapsed.as_secs_f64(),
        );
        Ok(summary)
    }

    /// Cache every result and stage eligible identifiers. Returns how many
    /// were staged.
    fn merge(&self, checked: Vec<UpkeepResult>) -> usize {
        let mut staged = 0;
        for result in checked {
            if result.is_eligible() {
                match self.deps.registry.identifier_from_key(&result.key) {
                    Ok(id) => {
                        self.stage.push_next(id);
                        staged += 1;
                    }
                    Err(err) => log_upkeep_event!(
                        warn,
                        "kc-04",
                        "[kc-04] Dropping eligible result",
                        result.key,
                        error = %err
                    ),
                }
            }
            self.cache.set_default(result.key.clone(), result);
        }
        staged
    }

    fn observe(&self) -> Observation {
        let (block, ids) = self.stage.current();
        let identifiers = ids
            .into_iter()
            .filter(|id| {
                let key = self.deps.key_builder.make_key(&block, id);
                match self.deps.pending.is_pending(&key) {
                    Ok(true) => false,
                    Ok(false) => self.deps.filter.is_eligible(&key),
                    Err(err) => {
                        warn!(upkeep_key = %key, error = %err, "[kc-04] Pending check failed; excluding");
                        false
                    }
                }
            })
            .collect();
        Observation { block, identifiers }
    }

    async fn check_keys(
        &self,
        cancel: &CancelToken,
        keys: &[UpkeepKey],
    ) -> VerifierResult<Vec<UpkeepResult>> {
        let mut found: HashMap<UpkeepKey, UpkeepResult> = HashMap::with_capacity(keys.len());
        let mut misses = Vec::new();
        let mut seen = HashSet::with_capacity(keys.len());

        for key in keys {
            if !seen.insert(key) {
                continue;
            }
            match self.cache.get(key) {
                Some(result) => {
                    found.insert(key.clone(), result);
                }
                None => misses.push(key.clone()),
            }
        }
        metrics::record_cache_lookups(found.len(), misses.len());

        if !misses.is_empty() {
            let checked = cancel
                .run_until_cancelled(self.deps.registry.check_upkeeps(cancel, &misses))
                .await
                .ok_or(VerifierError::Cancelled)?
                .map_err(VerifierError::Registry)?;
            for result in checked {
                self.cache.set_default(result.key.clone(), result.clone());
                found.insert(result.key.clone(), result);
            }
        }

        keys.iter()
            .map(|key| {
                found
                    .get(key)
                    .cloned()
                    .ok_or_else(|| VerifierError::MissingResult { key: key.clone() })
            })
            .collect()
    }
}

async fn check_batch(
    registry: Arc<dyn UpkeepRegistry>,
    token: CancelToken,
    batch: Vec<UpkeepKey>,
) -> Result<Vec<UpkeepResult>, CollaboratorError> {
    let checked = registry.check_upkeeps(&token, &batch).await?;
    for result in &checked {
        log_upkeep_event!(
            debug,
            "kc-04",
            "[kc-04] Upkeep checked",
            result.key,
            eligible = result.is_eligible()
        );
    }
    Ok(checked)
}

/// Samples the active upkeep set each head and stages the eligible ones.
///
/// Must be created inside a tokio runtime. Stops on [`stop`](Self::stop) or drop.
pub struct SamplingVerifier {
    state: Arc<VerifierState>,
    stop_handle: CancelHandle,
    started: AtomicBool,
    round_loop: Mutex<Option<JoinHandle<()>>>,
    janitor: Janitor,
}

impl SamplingVerifier {
    /// Validate `config` and build a verifier. The worker pool and cache
    /// sweeper start immediately; the round loop starts on
    /// [`start`](Self::start).
    ///
    /// Without an explicit `deps.ratio`, sampling follows `config.sample_ratio`.
    ///
    /// # Errors
    ///
    /// `VerifierError::InvalidConfig` if `config` does not validate.
    pub fn new(config: VerifierConfig, deps: Collaborators, heads: HeadStream) -> VerifierResult<Self> {
        config.validate()?;
        let ratio: Arc<dyn RatioPolicy> = match &deps.ratio {
            Some(ratio) => Arc::clone(ratio),
            None => Arc::new(config.ratio()),
        };

        let (cache, janitor) = config.cache.spawn();
        let pool = WorkerPool::new(config.pool.clone())?;
        let results = pool.take_results().ok_or(kc_02_worker_pool::PoolError::Stopped)?;
        let (stop_handle, stop) = CancelToken::new();

        Ok(Self {
            state: Arc::new(VerifierState {
                config,
                deps,
                ratio,
                cache,
                pool,
                results: AsyncMutex::new(results),
                stage: StagedRound::new(),
                heads: AsyncMutex::new(heads),
                stop,
            }),
            stop_handle,
            started: AtomicBool::new(false),
            round_loop: Mutex::new(None),
            janitor,
        })
    }

    /// Start consuming heads. Only the first call has an effect.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) || self.stop_handle.is_cancelled() {
            return;
        }
        let state = Arc::clone(&self.state);
        let handle = supervise(
            "kc-04-round-loop",
            self.state.config.supervisor_cooldown,
            self.state.stop.clone(),
            move || Arc::clone(&state).run(),
        );
        *self.round_loop.lock() = Some(handle);
        info!(
            batch_size = self.state.config.batch_size,
            max_workers = self.state.config.pool.max_workers,
            round_timeout_ms = self.state.config.round_timeout.as_millis() as u64,
            "[kc-04] Sampling verifier started"
        );
    }

    /// Stop the round loop, the worker pool and the cache sweeper. Idempotent.
    pub fn stop(&self) {
        if self.stop_handle.is_cancelled() {
            return;
        }
        self.stop_handle.cancel();
        self.state.pool.stop();
        self.janitor.stop();
        info!("[kc-04] Sampling verifier stopped");
    }

    /// Whether the round loop has exited (or was never started).
    pub fn is_finished(&self) -> bool {
        self.round_loop
            .lock()
            .as_ref()
            .map_or(true, JoinHandle::is_finished)
    }

    /// Run one round at `block` without waiting for a head.
    ///
    /// # Errors
    ///
    /// - `VerifierError::KeyProvider` - the active key fetch failed
    /// - `VerifierError::TooManyErrors` - every batch failed
    /// - `VerifierError::Cancelled` - the verifier stopped, or the round
    ///   deadline fired before keys were fetched
    pub async fn sample_round(&self, block: BlockKey) -> VerifierResult<RoundSummary> {
        self.state.sample_round(block).await
    }

    /// Results currently cached.
    pub fn cached_results(&self) -> usize {
        self.state.cache.len()
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.state.config
    }
}

#[async_trait]
impl VerifierApi for SamplingVerifier {
    fn observe(&self) -> Observation {
        self.state.observe()
    }

    async fn check_keys(
        &self,
        cancel: &CancelToken,
        keys: &[UpkeepKey],
    ) -> VerifierResult<Vec<UpkeepResult>> {
        self.state.check_keys(cancel, keys).await
    }
}

impl Drop for SamplingVerifier {
    fn drop(&mut self) {
        self.stop_handle.cancel();
        self.state.pool.stop();
    }
}
