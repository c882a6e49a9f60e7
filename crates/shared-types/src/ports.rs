//! # Shared Ports
//!
//! Collaborator interfaces used by more than one subsystem.

use crate::entities::{UpkeepIdentifier, UpkeepKey};
use crate::errors::CollaboratorError;

/// Resolves the version-independent identifier of a key.
pub trait IdentifierResolver: Send + Sync {
    /// Identifier that `key` locks on.
    fn identifier_from_key(&self, key: &UpkeepKey) -> Result<UpkeepIdentifier, CollaboratorError>;
}

/// Resolver for canonical `<block>|<identifier>` keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct DelimitedKeys;

impl IdentifierResolver for DelimitedKeys {
    fn identifier_from_key(&self, key: &UpkeepKey) -> Result<UpkeepIdentifier, CollaboratorError> {
        Ok(key.split()?.1)
    }
}
