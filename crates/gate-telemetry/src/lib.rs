//! # Gate Telemetry
//!
//! Logging bootstrap for services embedding the authorization pipeline.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use gate_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     init_telemetry(&TelemetryConfig::from_env())?;
//!
//!     // Spans and events from gate-authorization are now emitted
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `GATE_SERVICE_NAME` | `command-gate` | Service name in the startup log |
//! | `GATE_LOG_LEVEL` | `info` | Log level filter (falls back to `RUST_LOG`) |
//! | `GATE_JSON_LOGS` | `false` | JSON output (defaults to `true` in containers) |
//! | `GATE_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

mod config;
mod logging;

pub use config::TelemetryConfig;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Install the global `tracing` subscriber.
///
/// # Errors
/// `TelemetryError::SubscriberInit` if a global subscriber is already set,
/// `TelemetryError::Config` if the log filter does not parse.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    logging::init_logging(config)?;

    tracing::info!(
        service = %config.service_name,
        json_logs = config.json_logs,
        "Telemetry initialized"
    );

    Ok(())
}

/// Route logs to the test harness output. Safe to call from every test.
pub fn init_test_logging() {
    logging::init_test_logging();
}

/// Convenience macro for creating a span around one authorization step.
///
/// # Example
///
/// ```rust,ignore
/// use gate_telemetry::gate_span;
///
/// let _span = gate_span!("dispatch", command = %name, user = ctx.user).entered();
/// ```
#[macro_export]
macro_rules! gate_span {
    ($name:expr) => {
        tracing::info_span!($name)
    };
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
