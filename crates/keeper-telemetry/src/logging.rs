//! Structured logging.
//!
//! Every event carries the subsystem prefix in its message (`[kc-04] ...`)
//! plus structured fields. JSON output keeps those fields machine readable
//! for log shippers.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Install the global subscriber.
///
/// # Errors
///
/// - `TelemetryError::Config` - `log_level` is not a valid filter directive
/// - `TelemetryError::AlreadyInitialised` - a global subscriber already exists
pub fn init_logging(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.log_level)
        .map_err(|e| TelemetryError::Config(format!("log level {:?}: {}", config.log_level, e)))?;

    let installed = if config.json_logs {
        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true);
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer)
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()
    };
    installed.map_err(|_| TelemetryError::AlreadyInitialised)?;

    tracing::info!(
        service = %config.service_name,
        node_id = %config.node_id,
        json_logs = config.json_logs,
        "Logging initialised"
    );
    Ok(())
}

/// Log an upkeep-related event with standard fields.
///
/// ```rust,ignore
/// log_upkeep_event!(info, "kc-03", "Transmission accepted", key, identifier = %id);
/// ```
#[macro_export]
macro_rules! log_upkeep_event {
    ($level:ident, $subsystem:expr, $msg:expr, $key:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            upkeep_key = %$key,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a round-related event with standard fields.
#[macro_export]
macro_rules! log_round_event {
    ($level:ident, $subsystem:expr, $msg:expr, $block:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            block = %$block,
            $($($field)*,)?
            $msg
        )
    };
}
