//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Action error: {0}")]
    Core(#[from] intelayer_core::CoreError),

    #[error("Signer error: {0}")]
    Signer(#[from] intelayer_signer::SignerError),

    #[error("Key error: {0}")]
    Key(#[from] intelayer_signer::KeyError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] intelayer_telemetry::TelemetryError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Gateway error: {0}")]
    Gateway(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
