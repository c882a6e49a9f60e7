//! # kc-03-transmission-coordinator
//!
//! Keeps the same upkeep from being verified and reported more than once
//! while a prior report is still in flight.
//!
//! ## Overview
//!
//! - **Lock on accept**: accepting a key locks its identifier for the
//!   lockout window; every key of that identifier is filtered out
//! - **Unlock on confirmation**: a perform log with enough confirmations
//!   releases the lock and marks that exact key confirmed
//! - **Self-healing**: locks are expiring cache entries, so a dropped report
//!   unlocks after the lockout window without any log
//!
//! ## Architecture
//!
//! ```text
//! Reporting layer ──accept(key)──→ Coordinator ←──perform logs── Log Provider
//!                                      │
//! Sampling Verifier ──is_eligible──────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use kc_03_transmission_coordinator::{CoordinatorConfig, TransmissionApi, TransmissionCoordinator};
//!
//! let coordinator = TransmissionCoordinator::new(CoordinatorConfig::default(), logs, resolver)?;
//! coordinator.start();
//! coordinator.accept(&key)?;
//! assert!(!coordinator.is_eligible(&key));
//! coordinator.stop();
//! ```

pub mod config;
pub mod error;
pub mod ports;
pub mod service;

pub use config::CoordinatorConfig;
pub use error::{CoordinatorError, CoordinatorResult};
pub use ports::inbound::TransmissionApi;
pub use ports::outbound::PerformLogProvider;
pub use service::TransmissionCoordinator;
