//! Worker Pool Service
//!
//! A single dispatcher task owns the submission queue and the set of
//! available workers. Callers and workers only talk to it through channels.
//!
//! ```text
//! submit ──queue──→ [Dispatcher] ──spawn──→ Worker ──result──→ results stream
//!                        ↑                    │
//!                        └────available───────┘
//! ```
//!
//! ## Sizing
//!
//! - Growth: a new worker is created for each accepted task until
//!   `max_workers` exist; after that tasks wait for a worker to return.
//! - Shrink: each idle window without a submission retires exactly one
//!   available worker. Scale-down is deliberately slower than scale-up.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use shared_types::{supervise, CancelHandle, CancelToken};

use crate::config::PoolConfig;
use crate::domain::{Task, TaskId, WorkRecord, WorkResult, Worker};
use crate::error::{PoolError, PoolResult};

/// State the dispatcher rebuilds from after a restart.
struct Dispatcher<T, E> {
    queue: AsyncMutex<mpsc::Receiver<WorkRecord<T, E>>>,
    available_rx: AsyncMutex<mpsc::Receiver<Worker>>,
    available_tx: mpsc::Sender<Worker>,
    results: mpsc::UnboundedSender<WorkResult<T, E>>,
    active: Arc<AtomicUsize>,
    spawned: AtomicU64,
    max_workers: usize,
    idle_timeout: Duration,
    stop: CancelToken,
}

impl<T, E> Dispatcher<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    async fn run(self: Arc<Self>) {
        let mut queue = self.queue.lock().await;
        let mut available = self.available_rx.lock().await;

        loop {
            tokio::select! {
                biased;
                _ = self.stop.cancelled() => break,
                record = queue.recv() => {
                    let Some(record) = record else { break };
                    let worker = if self.active.load(Ordering::SeqCst) < self.max_workers {
                        self.active.fetch_add(1, Ordering::SeqCst);
                        let n = self.spawned.fetch_add(1, Ordering::Relaxed);
                        Worker::new(format!("worker-{}", n))
                    } else {
                        tokio::select! {
                            biased;
                            _ = self.stop.cancelled() => break,
                            worker = available.recv() => match worker {
                                Some(worker) => worker,
                                None => break,
                            },
                        }
                    };
                    tokio::spawn(worker.run(
                        record,
                        self.results.clone(),
                        self.available_tx.clone(),
                        self.stop.clone(),
                    ));
                }
                _ = tokio::time::sleep(self.idle_timeout) => {
                    if let Ok(worker) = available.try_recv() {
                        let remaining = self.active.fetch_sub(1, Ordering::SeqCst) - 1;
                        debug!(worker = %worker.name(), remaining, "[kc-02] Retired idle worker");
                    }
                }
            }
        }

        debug!("[kc-02] Dispatcher exited");
    }
}

/// Bounded concurrent task executor.
///
/// Must be created inside a tokio runtime. Stops on [`stop`](Self::stop) or drop.
pub struct WorkerPool<T, E> {
    config: PoolConfig,
    queue: mpsc::Sender<WorkRecord<T, E>>,
    results: Mutex<Option<mpsc::UnboundedReceiver<WorkResult<T, E>>>>,
    active: Arc<AtomicUsize>,
    next_task: AtomicU64,
    stop_handle: CancelHandle,
    stop: CancelToken,
    dispatcher: JoinHandle<()>,
}

impl<T, E> WorkerPool<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Create a pool and start its dispatcher.
    ///
    /// # Errors
    ///
    /// - `PoolError::InvalidConfig` - a zero size or window in `config`
    pub fn new(config: PoolConfig) -> PoolResult<Self> {
        config.validate()?;
        let max_workers = config.max_workers;
        let (queue_tx, queue_rx) = mpsc::channel(config.queue_capacity);
        let (available_tx, available_rx) = mpsc::channel(max_workers);
        let (results_tx, results_rx) = mpsc::unbounded_channel();
        let (stop_handle, stop) = CancelToken::new();
        let active = Arc::new(AtomicUsize::new(0));

        let dispatcher = Arc::new(Dispatcher {
            queue: AsyncMutex::new(queue_rx),
            available_rx: AsyncMutex::new(available_rx),
            available_tx,
            results: results_tx,
            active: Arc::clone(&active),
            spawned: AtomicU64::new(0),
            max_workers,
            idle_timeout: config.idle_timeout,
            stop: stop.clone(),
        });

        let dispatcher = supervise(
            "kc-02-dispatcher",
            config.supervisor_cooldown,
            stop.clone(),
            move || Arc::clone(&dispatcher).run(),
        );

        info!(max_workers, "[kc-02] Worker pool started");

        Ok(Self {
            config,
            queue: queue_tx,
            results: Mutex::new(Some(results_rx)),
            active,
            next_task: AtomicU64::new(0),
            stop_handle,
            stop,
            dispatcher,
        })
    }

    /// Take the shared results stream. Returns `None` after the first call.
    pub fn take_results(&self) -> Option<mpsc::UnboundedReceiver<WorkResult<T, E>>> {
        self.results.lock().take()
    }

    /// Workers currently alive (busy or idle).
    pub fn active_workers(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Pool configuration.
    pub fn config(&self) -> &PoolConfig {
        &self.config
    }

    /// Wait until the task is accepted or `cancel` fires.
    ///
    /// # Errors
    ///
    /// - `PoolError::Cancelled` - `cancel` fired first
    /// - `PoolError::Stopped` - the pool has been stopped
    pub async fn submit(&self, task: Task<T, E>, cancel: &CancelToken) -> PoolResult<TaskId> {
        let (id, record) = self.record(task, cancel)?;
        match cancel.run_until_cancelled(self.queue.send(record)).await {
            None => Err(PoolError::Cancelled),
            Some(Ok(())) => Ok(id),
            Some(Err(_)) => Err(PoolError::Stopped),
        }
    }

    /// Like [`submit`](Self::submit) but fails fast once `grace` elapses.
    /// With `None` the configured `submit_grace` applies.
    ///
    /// # Errors
    ///
    /// - `PoolError::QueueFull` - not accepted within `grace`
    /// - `PoolError::Cancelled` - `cancel` fired first
    /// - `PoolError::Stopped` - the pool has been stopped
    pub async fn submit_or_fail(
        &self,
        task: Task<T, E>,
        cancel: &CancelToken,
        grace: Option<Duration>,
    ) -> PoolResult<TaskId> {
        let grace = grace.unwrap_or(self.config.submit_grace);
        let (id, record) = self.record(task, cancel)?;
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(PoolError::Cancelled),
            sent = self.queue.send(record) => match sent {
                Ok(()) => Ok(id),
                Err(_) => Err(PoolError::Stopped),
            },
            _ = tokio::time::sleep(grace) => Err(PoolError::QueueFull { grace }),
        }
    }

    fn record(&self, task: Task<T, E>, cancel: &CancelToken) -> PoolResult<(TaskId, WorkRecord<T, E>)> {
        if self.stop.is_cancelled() {
            return Err(PoolError::Stopped);
        }
        if cancel.is_cancelled() {
            return Err(PoolError::Cancelled);
        }
        let id = self.next_task.fetch_add(1, Ordering::Relaxed);
        Ok((
            id,
            WorkRecord {
                id,
                task,
                cancel: cancel.clone(),
                submitted_at: Instant::now(),
            },
        ))
    }

    /// Stop the dispatcher and every in-flight worker. Idempotent.
    pub fn stop(&self) {
        if !self.stop_handle.is_cancelled() {
            self.stop_handle.cancel();
            info!("[kc-02] Worker pool stopped");
        }
    }

    /// Whether the dispatcher (and its supervisor) has exited.
    pub fn is_finished(&self) -> bool {
        self.dispatcher.is_finished()
    }
}

impl<T, E> Drop for WorkerPool<T, E> {
    fn drop(&mut self) {
        self.stop_handle.cancel();
    }
}
