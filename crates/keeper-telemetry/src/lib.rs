//! # Keeper Telemetry
//!
//! Logging setup shared by every Keeper-Chain binary and test harness.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use keeper_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("Failed to init logging");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `KC_LOG_LEVEL` | `RUST_LOG`, then `info` | Filter directive |
//! | `KC_JSON_LOGS` | `false` | JSON output |
//! | `KC_SERVICE_NAME` | `keeper-chain` | Service name |
//! | `KC_NODE_ID` | `0` | Node identifier |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum TelemetryError {
    #[error("A global subscriber is already installed")]
    AlreadyInitialised,

    #[error("Invalid configuration: {0}")]
    Config(String),
}
