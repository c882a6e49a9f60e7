//! # kc-04-sampling-verifier
//!
//! Samples the active upkeep set on every new head, verifies the sample in
//! parallel and stages the eligible upkeeps for the reporting layer.
//!
//! ## Overview
//!
//! - **Sample**: shuffle the active set with the OS RNG and keep the share
//!   the ratio policy asks for
//! - **Verify**: split the sample into batches, one worker pool task per
//!   batch, each a single registry call
//! - **Stage**: results land in a `next` buffer that only becomes visible
//!   when the whole round completes
//! - **Serve**: `check_keys` answers from the result cache and fetches
//!   only the misses, in one call
//!
//! ## Architecture
//!
//! ```text
//!                    ┌──────────────── SamplingVerifier ────────────────┐
//! Head stream ──────→│ round loop ──→ Worker Pool ──→ Registry          │
//!                    │     │                              │             │
//!                    │     └──→ StagedRound ←── merge ────┤             │
//!                    │              │         Expiring Cache ←──────────┤
//!                    └──────────────┼─────────────────────┼─────────────┘
//!                                   ↓                     ↓
//!                  observe() ── pending + coordinator   check_keys()
//!                               filters
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use kc_04_sampling_verifier::{Collaborators, SamplingVerifier, VerifierApi, VerifierConfig};
//!
//! let verifier = SamplingVerifier::new(VerifierConfig::default(), deps, head_rx)?;
//! verifier.start();
//! let observation = verifier.observe();
//! let results = verifier.check_keys(&cancel, &observed_keys).await?;
//! verifier.stop();
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::{CoordinatorFilter, DelimitedKeyBuilder, FnFilter, SampleRatio};
pub use config::{KeeperConfig, VerifierConfig};
pub use domain::{RoundSummary, StagedRound};
pub use error::{VerifierError, VerifierResult};
pub use ports::inbound::{Observation, VerifierApi};
pub use ports::outbound::{
    ActiveKeyProvider, Collaborators, HeadStream, KeyBuilder, PendingChecker, RatioPolicy,
    UpkeepFilter, UpkeepRegistry,
};
pub use service::SamplingVerifier;
