//! HTTP client for the exchange gateway.
//!
//! Signed request envelopes go to `{base}/exchange`, unsigned info bodies to
//! `{base}/info`. Every reply has the shape `{success, data, msg, error_type}`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

use intelayer_core::InfoRequest;
use intelayer_signer::RequestEnvelope;

use crate::error::{AppError, AppResult};

/// Reply envelope returned by the gateway.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct GatewayResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub error_type: Option<String>,
}

impl GatewayResponse {
    /// `data` on success, otherwise a gateway error built from `msg` and
    /// `error_type`.
    pub fn into_result(self) -> AppResult<Value> {
        if self.success {
            return Ok(self.data.unwrap_or(Value::Null));
        }
        let msg = self.msg.unwrap_or_else(|| "request failed".to_string());
        Err(AppError::Gateway(match self.error_type {
            Some(kind) => format!("{kind}: {msg}"),
            None => msg,
        }))
    }
}

/// Client for posting to the gateway.
pub struct GatewayClient {
    /// HTTP client.
    client: Client,
    /// Base URL without trailing slash.
    base_url: String,
}

impl GatewayClient {
    /// Create a client for `base_url` with a per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Gateway(format!("Failed to create HTTP client: {e}")))?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn exchange_url(&self) -> String {
        format!("{}/exchange", self.base_url)
    }

    pub fn info_url(&self) -> String {
        format!("{}/info", self.base_url)
    }

    /// Submit a signed request.
    pub async fn submit<A: Serialize>(&self, envelope: &RequestEnvelope<A>) -> AppResult<Value> {
        let url = self.exchange_url();
        info!(
            url = %url,
            nonce = envelope.nonce,
            has_vault = envelope.vault_address.is_some(),
            "Submitting signed request"
        );
        self.post(&url, envelope).await
    }

    /// Run an info query.
    pub async fn info(&self, request: &InfoRequest) -> AppResult<Value> {
        let url = self.info_url();
        info!(url = %url, request_type = %request.request_type, "Querying info");
        self.post(&url, request).await
    }

    async fn post<T: Serialize + ?Sized>(&self, url: &str, body: &T) -> AppResult<Value> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(|e| AppError::Gateway(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, "Gateway returned error status");
            return Err(AppError::Gateway(format!("HTTP {status}: {body}")));
        }

        let reply: GatewayResponse = response
            .json()
            .await
            .map_err(|e| AppError::Gateway(format!("Failed to parse response: {e}")))?;

        debug!(success = reply.success, "Gateway response received");
        reply.into_result()
    }
}
