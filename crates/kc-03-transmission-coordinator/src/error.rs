//! Error types for the Transmission Coordinator

use shared_types::{CollaboratorError, UpkeepKey};
use thiserror::Error;

/// Coordinator errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    /// Key (or its identifier) already accepted and still locked
    #[error("Transmission already set for key {key}")]
    AlreadySet { key: UpkeepKey },

    /// Key could not be resolved to an identifier
    #[error("Identifier resolution failed: {0}")]
    Identifier(#[source] CollaboratorError),

    /// Perform log fetch failed
    #[error("Perform log fetch failed: {0}")]
    LogProvider(#[source] CollaboratorError),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type for coordinator operations
pub type CoordinatorResult<T> = Result<T, CoordinatorError>;
