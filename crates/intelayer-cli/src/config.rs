//! Application configuration.
//!
//! Loaded from a TOML file and layered with `INTELAYER__*` environment
//! overrides, e.g. `INTELAYER__NETWORK=mainnet` or
//! `INTELAYER__KEY__VAR_NAME=AGENT_KEY`.

use std::time::Duration;

use alloy::primitives::Address;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use intelayer_core::protocol::DEFAULT_EXCHANGE_ID;
use intelayer_core::Network;
use intelayer_signer::{parse_vault_address, KeySource};
use intelayer_telemetry::LogFormat;

use crate::error::{AppError, AppResult};

/// Used when neither `--config` nor `INTELAYER_CONFIG` is given.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Environment variable naming the config file.
pub const CONFIG_PATH_ENV: &str = "INTELAYER_CONFIG";

/// Prefix for per-field environment overrides.
pub const ENV_PREFIX: &str = "INTELAYER";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Network the phantom agent source and connect chain are derived from.
    #[serde(default)]
    pub network: Network,

    /// Value of the `exchange` field in request bodies.
    #[serde(default = "default_exchange_id")]
    pub exchange_id: String,

    /// Gateway base URL; `/exchange` and `/info` are appended. Required for
    /// `--submit` and `info`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gateway_url: Option<String>,

    /// Default vault (sub-account) to act on behalf of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vault_address: Option<String>,

    /// Log output. Default: `json` when `RUST_ENV=production`, else `pretty`.
    #[serde(default = "LogFormat::from_env")]
    pub log_format: LogFormat,

    /// HTTP timeout for gateway requests (ms). Default: 10,000.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Where to load the signing key from. Without it only unsigned
    /// commands (`typed-data`, `info`) work.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<KeySource>,
}

fn default_exchange_id() -> String {
    DEFAULT_EXCHANGE_ID.to_string()
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            exchange_id: default_exchange_id(),
            gateway_url: None,
            vault_address: None,
            log_format: LogFormat::from_env(),
            request_timeout_ms: default_request_timeout_ms(),
            key: None,
        }
    }
}

impl AppConfig {
    /// Resolve the config path: CLI arg > `INTELAYER_CONFIG` > default.
    ///
    /// The flag is `true` when the path was given explicitly and must exist.
    pub fn resolve_path(cli_path: Option<&str>) -> (String, bool) {
        match cli_path
            .map(str::to_string)
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
        {
            Some(path) => (path, true),
            None => (DEFAULT_CONFIG_PATH.to_string(), false),
        }
    }

    /// Load the config file with environment overrides applied.
    ///
    /// A missing default file falls back to defaults; a missing explicit file
    /// is an error.
    pub fn load(cli_path: Option<&str>) -> AppResult<Self> {
        let (path, required) = Self::resolve_path(cli_path);

        let builder = Config::builder()
            .add_source(File::new(&path, FileFormat::Toml).required(required))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            );
        Self::build(builder)
    }

    /// Parse a TOML document without environment overrides.
    pub fn from_toml_str(content: &str) -> AppResult<Self> {
        Self::build(Config::builder().add_source(File::from_str(content, FileFormat::Toml)))
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> AppResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?
            .try_deserialize()
            .map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check values serde cannot check.
    pub fn validate(&self) -> AppResult<()> {
        if self.exchange_id.trim().is_empty() {
            return Err(AppError::Config("exchange_id must not be empty".to_string()));
        }
        if let Some(url) = &self.gateway_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(AppError::Config(format!(
                    "gateway_url must be an http(s) URL, got {url}"
                )));
            }
        }
        if self.request_timeout_ms == 0 {
            return Err(AppError::Config("request_timeout_ms must be positive".to_string()));
        }
        self.vault()
            .map_err(|e| AppError::Config(format!("vault_address: {e}")))?;
        Ok(())
    }

    /// The configured vault, parsed.
    pub fn vault(&self) -> AppResult<Option<Address>> {
        self.vault_address
            .as_deref()
            .map(parse_vault_address)
            .transpose()
            .map_err(AppError::from)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> AppResult<String> {
        toml::to_string_pretty(self)
            .map_err(|e| AppError::Config(format!("Failed to render config: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults_from_empty_file() {
        let config = AppConfig::from_toml_str("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.network, Network::Testnet);
        assert_eq!(config.exchange_id, "hyperliquid");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_log_format_defaults_to_environment() {
        let config = AppConfig::from_toml_str(r#"network = "mainnet""#).unwrap();
        assert_eq!(config.log_format, LogFormat::from_env());
    }

    #[test]
    fn test_full_file() {
        let config = AppConfig::from_toml_str(
            r#"
            network = "mainnet"
            exchange_id = "hyperliquid"
            gateway_url = "https://gateway.example.com/api"
            vault_address = "0x4242424242424242424242424242424242424242"
            log_format = "json"
            request_timeout_ms = 2500

            [key]
            source = "env_var"
            var_name = "AGENT_KEY"
            "#,
        )
        .unwrap();

        assert_eq!(config.network, Network::Mainnet);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.request_timeout_ms, 2500);
        assert_eq!(config.vault().unwrap(), Some(Address::repeat_byte(0x42)));
        assert_eq!(
            config.key,
            Some(KeySource::EnvVar {
                var_name: "AGENT_KEY".to_string()
            })
        );
    }

    #[test]
    fn test_toml_round_trip() {
        let config = AppConfig {
            network: Network::Mainnet,
            gateway_url: Some("http://localhost:8080".to_string()),
            key: Some(KeySource::File {
                path: PathBuf::from("/run/secrets/agent_key"),
            }),
            ..AppConfig::default()
        };

        let rendered = config.to_toml().unwrap();
        assert_eq!(AppConfig::from_toml_str(&rendered).unwrap(), config);
        assert!(!rendered.contains("vault_address"));
    }

    #[test]
    fn test_rejects_short_vault() {
        let result = AppConfig::from_toml_str(r#"vault_address = "0x4242""#);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_rejects_non_http_gateway() {
        let result = AppConfig::from_toml_str(r#"gateway_url = "ftp://example.com""#);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_rejects_empty_exchange_id() {
        let result = AppConfig::from_toml_str(r#"exchange_id = " ""#);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_rejects_unknown_network() {
        let result = AppConfig::from_toml_str(r#"network = "devnet""#);
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let result = AppConfig::load(Some("/nonexistent/intelayer.toml"));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_resolve_path_prefers_cli_arg() {
        let (path, required) = AppConfig::resolve_path(Some("custom.toml"));
        assert_eq!(path, "custom.toml");
        assert!(required);
    }
}
