//! Adapters layer: default implementations of the verifier's driven ports.

pub mod coordinator;
pub mod keys;
pub mod ratio;

pub use coordinator::{CoordinatorFilter, FnFilter};
pub use keys::DelimitedKeyBuilder;
pub use ratio::SampleRatio;
