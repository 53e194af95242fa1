//! `intelayer` command-line application.
//!
//! Loads configuration, signs actions with a local key and optionally posts
//! them to the exchange gateway.

pub mod commands;
pub mod config;
pub mod error;
pub mod gateway;

pub use commands::{Cli, Command, InfoQuery, Runner, SignOpts};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use gateway::{GatewayClient, GatewayResponse};
