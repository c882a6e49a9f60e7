//! # Core Domain Entities
//!
//! Defines the keeper entities shared by every subsystem.
//!
//! ## Clusters
//!
//! - **Keys**: `BlockKey`, `UpkeepIdentifier`, `UpkeepKey`
//! - **Check Results**: `UpkeepResult`, `UpkeepState`
//! - **Transmission**: `PerformLog`
//!
//! Keys are opaque to the engine. The only structure it relies on is the
//! canonical `<block>|<identifier>` form produced by [`UpkeepKey::new`].

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::KeyError;

/// Separator between the block and identifier halves of an [`UpkeepKey`].
pub const KEY_SEPARATOR: char = '|';

// =============================================================================
// CLUSTER A: KEYS
// =============================================================================

/// A block (or tick) at which a round was sampled.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BlockKey(String);

impl BlockKey {
    /// Wrap a raw block value.
    pub fn new(block: impl Into<String>) -> Self {
        Self(block.into())
    }

    /// Borrow the raw block value.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether no block has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<u64> for BlockKey {
    fn from(height: u64) -> Self {
        Self(height.to_string())
    }
}

impl fmt::Display for BlockKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies an upkeep independent of the block it was checked at.
///
/// Many [`UpkeepKey`]s map to one identifier; locking happens at this level.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UpkeepIdentifier(String);

impl UpkeepIdentifier {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UpkeepIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One upkeep at one block. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UpkeepKey(String);

impl UpkeepKey {
    /// Build the canonical `<block>|<identifier>` key.
    pub fn new(block: &BlockKey, id: &UpkeepIdentifier) -> Self {
        Self(format!("{}{}{}", block, KEY_SEPARATOR, id))
    }

    /// Wrap a key produced elsewhere without inspecting it.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow the raw key.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split a canonical key into its block and identifier.
    ///
    /// # Errors
    ///
    /// `KeyError::Malformed` if the separator is missing or either half is empty.
    pub fn split(&self) -> Result<(BlockKey, UpkeepIdentifier), KeyError> {
        match self.0.split_once(KEY_SEPARATOR) {
            Some((block, id)) if !block.is_empty() && !id.is_empty() => {
                Ok((BlockKey::new(block), UpkeepIdentifier::new(id)))
            }
            _ => Err(KeyError::Malformed {
                key: self.0.clone(),
            }),
        }
    }
}

impl fmt::Display for UpkeepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// CLUSTER B: CHECK RESULTS
// =============================================================================

/// Outcome of an eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UpkeepState {
    /// The upkeep should be performed.
    Eligible,
    /// Nothing to do at this block.
    Skipped,
}

/// Result of checking one [`UpkeepKey`] against the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpkeepResult {
    /// Key that was checked.
    pub key: UpkeepKey,
    /// Whether the upkeep is eligible.
    pub state: UpkeepState,
    /// Registry-provided reason when the check did not pass.
    pub failure_reason: u8,
    /// Gas consumed by the simulated perform.
    pub gas_used: u64,
    /// Opaque payload handed to the perform call.
    pub perform_data: Vec<u8>,
    /// Block the check was executed against.
    pub check_block: BlockKey,
}

impl UpkeepResult {
    /// An eligible result with the given perform data.
    pub fn eligible(key: UpkeepKey, perform_data: Vec<u8>) -> Self {
        let check_block = key.split().map(|(b, _)| b).unwrap_or_default();
        Self {
            key,
            state: UpkeepState::Eligible,
            failure_reason: 0,
            gas_used: 0,
            perform_data,
            check_block,
        }
    }

    /// A skipped result.
    pub fn skipped(key: UpkeepKey) -> Self {
        let check_block = key.split().map(|(b, _)| b).unwrap_or_default();
        Self {
            key,
            state: UpkeepState::Skipped,
            failure_reason: 0,
            gas_used: 0,
            perform_data: Vec::new(),
            check_block,
        }
    }

    /// Whether the result should be staged for reporting.
    pub fn is_eligible(&self) -> bool {
        self.state == UpkeepState::Eligible
    }
}

// =============================================================================
// CLUSTER C: TRANSMISSION
// =============================================================================

/// A perform observed on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerformLog {
    /// Key that was reported and performed.
    pub key: UpkeepKey,
    /// Block in which the perform transaction landed.
    pub transmit_block: BlockKey,
    /// Number of blocks observed on top of `transmit_block`.
    pub confirmations: u64,
}
