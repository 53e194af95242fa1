//! Telemetry error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Logging initialization failed: {0}")]
    LoggingInit(String),

    #[error("Unknown log format: {0}")]
    UnknownFormat(String),
}

pub type TelemetryResult<T> = Result<T, TelemetryError>;
