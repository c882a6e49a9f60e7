//! # Keeper-Chain Test Suite
//!
//! Unified test crate for flows that cross subsystem boundaries.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # In-memory collaborators shared by tests and benches
//! └── integration/
//!     ├── scenarios.rs  # Cache, coordinator and pool acceptance scenarios
//!     └── flows.rs      # Full rounds: verifier + coordinator + reporting
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p kc-tests
//!
//! # By category
//! cargo test -p kc-tests integration::scenarios
//! cargo test -p kc-tests integration::flows
//!
//! # Benchmarks
//! cargo bench -p kc-tests
//! ```

pub mod fixtures;
pub mod integration;
