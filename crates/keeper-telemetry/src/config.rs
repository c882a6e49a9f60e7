//! Telemetry configuration from environment variables.

use std::env;

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TelemetryConfig {
    /// Service name attached to every event
    pub service_name: String,

    /// Node identifier, for telling keepers apart in shared log stores
    pub node_id: String,

    /// Filter directive (`info`, `kc_04_sampling_verifier=debug`, ...)
    pub log_level: String,

    /// Emit JSON instead of human-readable lines
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "keeper-chain".to_string(),
            node_id: "0".to_string(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `KC_SERVICE_NAME`: Service name (default: keeper-chain)
    /// - `KC_NODE_ID`: Node identifier (default: 0)
    /// - `KC_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `KC_JSON_LOGS`: Enable JSON logs (default: false)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a custom variable source.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            service_name: lookup("KC_SERVICE_NAME").unwrap_or(defaults.service_name),
            node_id: lookup("KC_NODE_ID").unwrap_or(defaults.node_id),
            log_level: lookup("KC_LOG_LEVEL")
                .or_else(|| lookup("RUST_LOG"))
                .unwrap_or(defaults.log_level),
            json_logs: lookup("KC_JSON_LOGS")
                .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
                .unwrap_or(defaults.json_logs),
        }
    }
}
