//! Informational query bodies for the gateway's `/info` endpoint.
//!
//! Queries are unsigned: `{exchange, type, ...params}`.

use serde::Serialize;
use serde_json::{Map, Value};

/// Body of an `/info` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InfoRequest {
    /// Exchange the gateway should route to.
    pub exchange: String,

    /// Query type, e.g. "subAccounts".
    #[serde(rename = "type")]
    pub request_type: String,

    /// Query parameters, flattened next to `type`.
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl InfoRequest {
    /// Query with no parameters.
    pub fn new(exchange: impl Into<String>, request_type: impl Into<String>) -> Self {
        Self {
            exchange: exchange.into(),
            request_type: request_type.into(),
            params: Map::new(),
        }
    }

    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn sub_accounts(exchange: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new(exchange, "subAccounts").with_param("user", user.into())
    }

    pub fn historical_orders(exchange: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new(exchange, "historicalOrders").with_param("user", user.into())
    }

    pub fn user_fees(exchange: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new(exchange, "userFees").with_param("user", user.into())
    }

    pub fn spot_meta(exchange: impl Into<String>) -> Self {
        Self::new(exchange, "spotMeta")
    }

    pub fn candle_snapshot(exchange: impl Into<String>, req: &CandleSnapshotRequest) -> Self {
        Self::new(exchange, "candleSnapshot").with_param("req", req.to_params())
    }
}

/// Candle range query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleSnapshotRequest {
    pub coin: String,
    /// Candle interval, e.g. "1m", "1h".
    pub interval: String,
    /// Start of the range, ms since epoch.
    pub start_time: u64,
    /// End of the range, ms since epoch.
    pub end_time: u64,
}

impl CandleSnapshotRequest {
    fn to_params(&self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("coin".to_string(), Value::from(self.coin.as_str()));
        params.insert("interval".to_string(), Value::from(self.interval.as_str()));
        params.insert("startTime".to_string(), Value::from(self.start_time));
        params.insert("endTime".to_string(), Value::from(self.end_time));
        params
    }
}
