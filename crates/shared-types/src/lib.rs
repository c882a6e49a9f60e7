//! # Shared Types Crate
//!
//! This crate contains the keeper entities and the runtime primitives shared
//! by every Keeper-Chain subsystem.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: All cross-subsystem types are defined here.
//! - **Opaque Keys**: Subsystems never parse keys beyond the canonical
//!   `<block>|<identifier>` split.
//! - **Owned Lifetimes**: Every background loop is started with, and stops on,
//!   a [`CancelToken`] owned by the service that spawned it.

pub mod cancel;
pub mod entities;
pub mod errors;
pub mod ports;
pub mod supervisor;

pub use cancel::{CancelHandle, CancelToken};
pub use entities::*;
pub use errors::*;
pub use ports::{DelimitedKeys, IdentifierResolver};
pub use supervisor::{panic_message, supervise};
