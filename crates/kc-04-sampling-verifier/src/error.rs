//! Error types for the Sampling Verifier
//!
//! Per-batch failures inside a round are recovered locally and never appear
//! here; only whole-round exhaustion does.

use kc_02_worker_pool::PoolError;
use shared_types::{CollaboratorError, UpkeepKey};
use thiserror::Error;

/// Sampling Verifier errors
#[derive(Debug, Error)]
pub enum VerifierError {
    /// Caller or round deadline fired before completion
    #[error("Operation cancelled")]
    Cancelled,

    /// Batched registry check failed
    #[error("Registry check failed: {0}")]
    Registry(#[source] CollaboratorError),

    /// Registry answered without a result for a requested key
    #[error("Registry returned no result for key {key}")]
    MissingResult { key: UpkeepKey },

    /// Active key fetch failed
    #[error("Active key fetch failed: {0}")]
    KeyProvider(#[source] CollaboratorError),

    /// Every batch in the round failed
    #[error("Too many errors: {failed} of {total} batches failed")]
    TooManyErrors { failed: usize, total: usize },

    /// Worker pool rejected a submission
    #[error("Worker pool error: {0}")]
    Pool(#[from] PoolError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Config file could not be read
    #[error("Failed to read config {path}: {reason}")]
    ConfigIo { path: String, reason: String },

    /// Config file could not be parsed
    #[error("Failed to parse config: {0}")]
    ConfigParse(String),
}

/// Result type for verifier operations
pub type VerifierResult<T> = Result<T, VerifierError>;
