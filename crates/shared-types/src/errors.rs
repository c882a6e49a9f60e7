//! # Error Types
//!
//! Defines error types used across subsystems.

use thiserror::Error;

/// Errors from building or decomposing keys.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// Key is not in `<block>|<identifier>` form.
    #[error("Malformed upkeep key: {key:?}")]
    Malformed { key: String },
}

/// Failure reported by an external collaborator (registry, log provider, ...).
///
/// The engine never inspects these beyond logging and propagating them.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{source_name} failed: {reason}")]
pub struct CollaboratorError {
    /// Which collaborator failed.
    pub source_name: &'static str,
    /// Collaborator-provided reason.
    pub reason: String,
}

impl CollaboratorError {
    /// Create a new collaborator error.
    pub fn new(source_name: &'static str, reason: impl Into<String>) -> Self {
        Self {
            source_name,
            reason: reason.into(),
        }
    }
}

impl From<KeyError> for CollaboratorError {
    fn from(err: KeyError) -> Self {
        Self::new("key decoder", err.to_string())
    }
}
