//! # Staged Round
//!
//! Double buffer separating the round being built from the round callers
//! can read.
//!
//! ```text
//! prepare_next(block) ──→ push_next(id)* ──→ advance()
//!                                               │
//!                 current ←─────────────────────┘ (atomic swap)
//! ```
//!
//! Readers of `current` never see a partially built round.

use parking_lot::RwLock;
use std::mem;

use shared_types::{BlockKey, UpkeepIdentifier};

#[derive(Debug, Default, Clone)]
struct Buffer {
    block: BlockKey,
    identifiers: Vec<UpkeepIdentifier>,
}

#[derive(Debug, Default)]
struct Buffers {
    current: Buffer,
    next: Buffer,
}

/// Current/next buffers behind one lock scoped to buffer access only.
#[derive(Debug, Default)]
pub struct StagedRound {
    buffers: RwLock<Buffers>,
}

impl StagedRound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reset the next buffer for a round sampled at `block`.
    pub fn prepare_next(&self, block: BlockKey) {
        let mut buffers = self.buffers.write();
        buffers.next = Buffer {
            block,
            identifiers: Vec::new(),
        };
    }

    /// Append an eligible identifier to the next buffer.
    pub fn push_next(&self, id: UpkeepIdentifier) {
        self.buffers.write().next.identifiers.push(id);
    }

    /// Promote next to current and clear next.
    pub fn advance(&self) {
        let mut buffers = self.buffers.write();
        buffers.current = mem::take(&mut buffers.next);
    }

    /// Snapshot of the current buffer.
    pub fn current(&self) -> (BlockKey, Vec<UpkeepIdentifier>) {
        let buffers = self.buffers.read();
        (
            buffers.current.block.clone(),
            buffers.current.identifiers.clone(),
        )
    }
}
