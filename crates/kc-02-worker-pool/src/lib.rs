//! # kc-02-worker-pool
//!
//! Bounded concurrent task executor with backpressure and graceful
//! degradation.
//!
//! ## Overview
//!
//! - **Two submission modes**: [`WorkerPool::submit`] waits for acceptance
//!   or cancellation; [`WorkerPool::submit_or_fail`] also gives up after a
//!   grace window with [`PoolError::QueueFull`]
//! - **Shared results stream**: every task produces one [`WorkResult`]
//!   tagged with the [`TaskId`] returned at submission
//! - **Message passing only**: the dispatcher owns the queue and the
//!   available-worker set; nothing is shared behind a lock
//! - **Supervised**: the dispatcher restarts after a panic; a panicking
//!   task is logged and its worker rejoins the pool
//!
//! ## Example
//!
//! ```rust,ignore
//! use kc_02_worker_pool::{task, PoolConfig, WorkerPool};
//!
//! let pool: WorkerPool<u64, String> = WorkerPool::new(PoolConfig::with_workers(2))?;
//! let mut results = pool.take_results().unwrap();
//! let id = pool.submit(task(|_| async { Ok(42) }), &CancelToken::never()).await?;
//! let result = results.recv().await.unwrap();
//! assert_eq!(result.task_id, id);
//! ```

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::PoolConfig;
pub use domain::{task, Task, TaskFuture, TaskId, WorkResult};
pub use error::{PoolError, PoolResult};
pub use service::WorkerPool;
