//! Key construction for staged identifiers.

use shared_types::{BlockKey, UpkeepIdentifier, UpkeepKey};

use crate::ports::outbound::KeyBuilder;

/// Builds keys in the canonical `<block>|<identifier>` form.
#[derive(Debug, Default, Clone, Copy)]
pub struct DelimitedKeyBuilder;

impl KeyBuilder for DelimitedKeyBuilder {
    fn make_key(&self, block: &BlockKey, id: &UpkeepIdentifier) -> UpkeepKey {
        UpkeepKey::new(block, id)
    }
}
