//! Error types for the worker pool.
//!
//! Task-level failures never surface here; they travel inside
//! [`WorkResult::value`](crate::domain::WorkResult).

use std::time::Duration;
use thiserror::Error;

/// Submission errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// The caller's token fired before the task was accepted
    #[error("context cancelled before task was accepted")]
    Cancelled,

    /// No capacity freed up within the grace window
    #[error("worker queue full: task not accepted within {grace:?}")]
    QueueFull { grace: Duration },

    /// The pool has been stopped
    #[error("worker pool stopped")]
    Stopped,

    /// Configuration rejected at construction
    #[error("Invalid pool configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for pool operations
pub type PoolResult<T> = Result<T, PoolError>;
