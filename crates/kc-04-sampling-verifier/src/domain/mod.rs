//! Domain layer for the sampling verifier.

pub mod round;
pub mod sampling;
pub mod stage;

pub use round::RoundSummary;
pub use sampling::{batch_keys, sample_keys};
pub use stage::StagedRound;
