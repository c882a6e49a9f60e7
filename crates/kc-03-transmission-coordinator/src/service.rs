//! Transmission Coordinator Service
//!
//! Tracks which identifiers are locked awaiting a report and which exact
//! keys have been confirmed on the ledger.
//!
//! ## State Machine (per identifier)
//!
//! ```text
//!             accept(key)
//! [UNLOCKED] ────────────→ [LOCKED]
//!     ↑                       │
//!     │   perform log with    │
//!     │   depth ≥ min_confs   │
//!     ├───────────────────────┘
//!     │
//!     └──── lockout window elapses (report dropped) ────
//! ```
//!
//! Both the lock table and the key table are expiring caches, so an
//! identifier whose report never lands unlocks on its own after the
//! lockout window.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use kc_01_expiring_cache::{ExpiringCache, Janitor, DEFAULT_EXPIRATION};
use keeper_telemetry::log_upkeep_event;
use shared_types::{
    supervise, CancelHandle, CancelToken, IdentifierResolver, PerformLog, UpkeepIdentifier,
    UpkeepKey,
};

use crate::config::CoordinatorConfig;
use crate::error::{CoordinatorError, CoordinatorResult};
use crate::ports::inbound::TransmissionApi;
use crate::ports::outbound::PerformLogProvider;

/// Shared state reachable from the poll loop.
struct CoordinatorState<L, R> {
    config: CoordinatorConfig,
    /// identifier -> locked
    locks: Arc<ExpiringCache<UpkeepIdentifier, bool>>,
    /// key -> confirmed
    transmissions: Arc<ExpiringCache<UpkeepKey, bool>>,
    logs: Arc<L>,
    resolver: Arc<R>,
    /// Serialises accept's check-then-set.
    accept_lock: Mutex<()>,
    stop: CancelToken,
}

impl<L, R> CoordinatorState<L, R>
where
    L: PerformLogProvider,
    R: IdentifierResolver,
{
    fn is_eligible(&self, key: &UpkeepKey) -> bool {
        match self.resolver.identifier_from_key(key) {
            Ok(id) => !self.locks.contains(&id),
            Err(err) => {
                trace!(upkeep_key = %key, error = %err, "[kc-03] Filtering unresolvable key");
                false
            }
        }
    }

    fn process_logs(&self, logs: &[PerformLog]) -> usize {
        let mut confirmed = 0;
        for log in logs {
            if log.confirmations < self.config.min_confirmations {
                trace!(
                    upkeep_key = %log.key,
                    confirmations = log.confirmations,
                    "[kc-03] Perform log below confirmation threshold"
                );
                continue;
            }

            let id = match self.resolver.identifier_from_key(&log.key) {
                Ok(id) => id,
                Err(err) => {
                    log_upkeep_event!(
                        warn,
                        "kc-03",
                        "[kc-03] Skipping perform log",
                        log.key,
                        error = %err
                    );
                    continue;
                }
            };

            self.locks.delete(&id);
            self.transmissions
                .set(log.key.clone(), true, DEFAULT_EXPIRATION);
            confirmed += 1;
            log_upkeep_event!(
                debug,
                "kc-03",
                "[kc-03] Transmission confirmed",
                log.key,
                transmit_block = %log.transmit_block,
                confirmations = log.confirmations
            );
        }
        confirmed
    }

    async fn poll_once(&self) -> CoordinatorResult<usize> {
        let logs = self
            .logs
            .perform_logs(&self.stop)
            .await
            .map_err(CoordinatorError::LogProvider)?;
        Ok(self.process_logs(&logs))
    }

    async fn run(self: Arc<Self>) {
        let cadence = self.config.poll_cadence;
        let mut wait = cadence;

        loop {
            if self
                .stop
                .run_until_cancelled(tokio::time::sleep(wait))
                .await
                .is_none()
            {
                break;
            }

            let started = Instant::now();
            match self.stop.run_until_cancelled(self.poll_once()).await {
                None => break,
                Some(Ok(confirmed)) if confirmed > 0 => {
                    debug!(confirmed, "[kc-03] Processed perform logs");
                }
                Some(Ok(_)) => {}
                Some(Err(err)) => warn!(error = %err, "[kc-03] Perform log poll failed"),
            }

            let elapsed = started.elapsed();
            wait = if elapsed > cadence {
                warn!(
                    elapsed_ms = elapsed.as_millis() as u64,
                    cadence_ms = cadence.as_millis() as u64,
                    "[kc-03] Perform log poll exceeded cadence"
                );
                self.config.overrun_retry_delay
            } else {
                cadence - elapsed
            };
        }

        debug!("[kc-03] Perform log poller exited");
    }
}

/// Prevents an upkeep from being reported again while a prior report is in
/// flight.
///
/// Must be created inside a tokio runtime. Stops on [`stop`](Self::stop) or drop.
pub struct TransmissionCoordinator<L, R> {
    state: Arc<CoordinatorState<L, R>>,
    stop_handle: CancelHandle,
    started: AtomicBool,
    poller: Mutex<Option<JoinHandle<()>>>,
    janitors: [Janitor; 2],
}

impl<L, R> TransmissionCoordinator<L, R>
where
    L: PerformLogProvider + 'static,
    R: IdentifierResolver + 'static,
{
    /// Validate `config` and create a coordinator. The cache sweepers start
    /// immediately; the perform log poller starts on [`start`](Self::start).
    ///
    /// # Errors
    ///
    /// `CoordinatorError::InvalidConfig` if `config` does not validate.
    pub fn new(config: CoordinatorConfig, logs: Arc<L>, resolver: Arc<R>) -> CoordinatorResult<Self> {
        config.validate()?;
        let locks = Arc::new(ExpiringCache::new(config.lockout_window));
        let transmissions = Arc::new(ExpiringCache::new(config.confirmation_ttl));
        let janitors = [
            Janitor::spawn(&locks, config.cache_clean_interval),
            Janitor::spawn(&transmissions, config.cache_clean_interval),
        ];
        let (stop_handle, stop) = CancelToken::new();

        Ok(Self {
            state: Arc::new(CoordinatorState {
                config,
                locks,
                transmissions,
                logs,
                resolver,
                accept_lock: Mutex::new(()),
                stop,
            }),
            stop_handle,
            started: AtomicBool::new(false),
            poller: Mutex::new(None),
            janitors,
        })
    }

    /// Start polling perform logs. Only the first call has an effect.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) || self.stop_handle.is_cancelled() {
            return;
        }
        let state = Arc::clone(&self.state);
        let handle = supervise(
            "kc-03-perform-log-poller",
            self.state.config.supervisor_cooldown,
            self.state.stop.clone(),
            move || Arc::clone(&state).run(),
        );
        *self.poller.lock() = Some(handle);
        info!(
            min_confirmations = self.state.config.min_confirmations,
            cadence_ms = self.state.config.poll_cadence.as_millis() as u64,
            "[kc-03] Transmission coordinator started"
        );
    }

    /// Stop the poller and both cache sweepers. Idempotent.
    pub fn stop(&self) {
        if self.stop_handle.is_cancelled() {
            return;
        }
        self.stop_handle.cancel();
        for janitor in &self.janitors {
            janitor.stop();
        }
        info!("[kc-03] Transmission coordinator stopped");
    }

    /// Whether the poller has exited (or was never started).
    pub fn is_finished(&self) -> bool {
        self.poller
            .lock()
            .as_ref()
            .map_or(true, JoinHandle::is_finished)
    }

    /// Closure form of [`TransmissionApi::is_eligible`], detached from `self`.
    pub fn filter(&self) -> impl Fn(&UpkeepKey) -> bool + Send + Sync + 'static {
        let state = Arc::clone(&self.state);
        move |key: &UpkeepKey| state.is_eligible(key)
    }

    /// Apply perform logs directly, without waiting for the poller.
    ///
    /// Returns how many logs met the confirmation threshold.
    pub fn process_logs(&self, logs: &[PerformLog]) -> usize {
        self.state.process_logs(logs)
    }

    /// Fetch and apply perform logs once.
    ///
    /// # Errors
    ///
    /// `CoordinatorError::LogProvider` if the fetch fails.
    pub async fn poll_once(&self) -> CoordinatorResult<usize> {
        self.state.poll_once().await
    }

    /// Lockout window applied to accepted identifiers.
    pub fn lockout_window(&self) -> Duration {
        self.state.config.lockout_window
    }
}

impl<L, R> TransmissionApi for TransmissionCoordinator<L, R>
where
    L: PerformLogProvider + 'static,
    R: IdentifierResolver + 'static,
{
    fn accept(&self, key: &UpkeepKey) -> CoordinatorResult<()> {
        let id = self
            .state
            .resolver
            .identifier_from_key(key)
            .map_err(CoordinatorError::Identifier)?;

        let _guard = self.state.accept_lock.lock();
        if self.state.locks.contains(&id) || self.state.transmissions.contains(key) {
            return Err(CoordinatorError::AlreadySet { key: key.clone() });
        }
        self.state.locks.set(id.clone(), true, DEFAULT_EXPIRATION);
        self.state
            .transmissions
            .set(key.clone(), false, DEFAULT_EXPIRATION);

        log_upkeep_event!(debug, "kc-03", "[kc-03] Transmission accepted", key, identifier = %id);
        Ok(())
    }

    fn is_eligible(&self, key: &UpkeepKey) -> bool {
        self.state.is_eligible(key)
    }

    fn is_transmission_confirmed(&self, key: &UpkeepKey) -> bool {
        // Keys this node never accepted are not awaiting anything.
        self.state.transmissions.get(key).unwrap_or(true)
    }
}

impl<L, R> Drop for TransmissionCoordinator<L, R> {
    fn drop(&mut self) {
        self.stop_handle.cancel();
    }
}
