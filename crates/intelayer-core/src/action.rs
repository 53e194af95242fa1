//! Typed action schemas.
//!
//! Each schema encodes its fields in declaration order, and that order is the
//! canonical wire order the exchange hashes. Do not reorder fields.
//!
//! `Option<T>` fields use `skip_serializing_if` so an absent key is omitted
//! from the msgpack map instead of being encoded as `nil`.

use alloy::primitives::{Address, B256};
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};

use crate::amount::{to_micros, usd_to_micros};
use crate::error::Result;
use crate::network::{Chain, Network};
use crate::protocol::{DomainProfile, CONNECT_AGENT_SOURCE};

/// An exchange action.
///
/// The `type` tag is always the first key of the encoded map.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Action {
    Order(BulkOrder),
    Cancel(BulkCancel),
    UpdateLeverage(UpdateLeverage),
    UpdateIsolatedMargin(UpdateIsolatedMargin),
    CreateSubAccount(CreateSubAccount),
    SubAccountModify(SubAccountModify),
    SubAccountTransfer(SubAccountTransfer),
    Connect(ConnectAction),
    ApproveAgent(ApproveAgent),
}

impl Action {
    /// Wire name of the action, as written in the `type` key.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Action::Order(_) => "order",
            Action::Cancel(_) => "cancel",
            Action::UpdateLeverage(_) => "updateLeverage",
            Action::UpdateIsolatedMargin(_) => "updateIsolatedMargin",
            Action::CreateSubAccount(_) => "createSubAccount",
            Action::SubAccountModify(_) => "subAccountModify",
            Action::SubAccountTransfer(_) => "subAccountTransfer",
            Action::Connect(_) => "connect",
            Action::ApproveAgent(_) => "approveAgent",
        }
    }

    /// Agent approvals are signed directly; every other action is hashed.
    #[must_use]
    pub fn is_agent_approval(&self) -> bool {
        matches!(self, Action::Connect(_) | Action::ApproveAgent(_))
    }

    pub fn create_sub_account(name: impl Into<String>) -> Self {
        Action::CreateSubAccount(CreateSubAccount { name: name.into() })
    }

    pub fn sub_account_modify(sub_account_user: impl Into<String>, name: impl Into<String>) -> Self {
        Action::SubAccountModify(SubAccountModify {
            sub_account_user: sub_account_user.into(),
            name: name.into(),
        })
    }

    /// Move USD between the master account and a sub-account.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidAmount` if `usd` is negative or more precise
    /// than micro-units.
    pub fn sub_account_transfer(
        sub_account_user: impl Into<String>,
        is_deposit: bool,
        usd: Decimal,
    ) -> Result<Self> {
        Ok(Action::SubAccountTransfer(SubAccountTransfer {
            sub_account_user: sub_account_user.into(),
            is_deposit,
            usd: usd_to_micros(usd)?,
        }))
    }

    /// Add (positive) or remove (negative) isolated margin.
    ///
    /// # Errors
    /// Returns `CoreError::InvalidAmount` if `margin` is more precise than
    /// micro-units.
    pub fn update_isolated_margin(asset: u32, is_buy: bool, margin: Decimal) -> Result<Self> {
        Ok(Action::UpdateIsolatedMargin(UpdateIsolatedMargin {
            asset,
            is_buy,
            ntli: to_micros(margin)?,
        }))
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Batch of orders.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BulkOrder {
    pub orders: Vec<OrderWire>,
    pub grouping: Grouping,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub builder: Option<BuilderInfo>,
}

impl BulkOrder {
    /// Orders that are not linked to each other.
    pub fn ungrouped(orders: Vec<OrderWire>) -> Self {
        Self {
            orders,
            grouping: Grouping::Na,
            builder: None,
        }
    }
}

/// How the orders of a batch relate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Grouping {
    #[default]
    Na,
    NormalTpsl,
    PositionTpsl,
}

impl Grouping {
    pub fn as_str(self) -> &'static str {
        match self {
            Grouping::Na => "na",
            Grouping::NormalTpsl => "normalTpsl",
            Grouping::PositionTpsl => "positionTpsl",
        }
    }
}

impl Serialize for Grouping {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Builder fee attached to an order batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BuilderInfo {
    /// Builder address, 0x-prefixed.
    #[serde(rename = "b")]
    pub address: String,
    /// Fee in tenths of a basis point.
    #[serde(rename = "f")]
    pub fee: u64,
}

/// Single order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderWire {
    #[serde(rename = "a")]
    pub asset: u32,

    #[serde(rename = "b")]
    pub is_buy: bool,

    /// Limit price, no trailing zeros.
    #[serde(rename = "p")]
    pub limit_px: String,

    /// Size, no trailing zeros.
    #[serde(rename = "s")]
    pub sz: String,

    #[serde(rename = "r")]
    pub reduce_only: bool,

    #[serde(rename = "t")]
    pub order_type: OrderTypeWire,

    /// Client order id, 0x-prefixed 16 bytes.
    #[serde(rename = "c", skip_serializing_if = "Option::is_none")]
    pub cloid: Option<String>,
}

impl OrderWire {
    /// Limit order with price and size rendered in their shortest exact form.
    pub fn limit(asset: u32, is_buy: bool, px: Decimal, sz: Decimal, tif: Tif) -> Self {
        Self {
            asset,
            is_buy,
            limit_px: format_decimal(px),
            sz: format_decimal(sz),
            reduce_only: false,
            order_type: OrderTypeWire::limit(tif),
            cloid: None,
        }
    }

    #[must_use]
    pub fn reduce_only(mut self) -> Self {
        self.reduce_only = true;
        self
    }

    #[must_use]
    pub fn with_cloid(mut self, cloid: impl Into<String>) -> Self {
        self.cloid = Some(cloid.into());
        self
    }
}

/// "1.50" and "1.5" hash differently, so amounts are always normalized.
fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

/// Order type: `{"limit": {...}}` or `{"trigger": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum OrderTypeWire {
    Limit { limit: LimitOrderType },
    Trigger { trigger: TriggerOrderType },
}

impl OrderTypeWire {
    pub fn limit(tif: Tif) -> Self {
        Self::Limit {
            limit: LimitOrderType { tif },
        }
    }

    pub fn trigger(trigger_px: Decimal, is_market: bool, tpsl: Tpsl) -> Self {
        Self::Trigger {
            trigger: TriggerOrderType {
                is_market,
                trigger_px: format_decimal(trigger_px),
                tpsl,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LimitOrderType {
    pub tif: Tif,
}

/// Time in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tif {
    Gtc,
    Ioc,
    Alo,
}

impl Tif {
    pub fn as_str(self) -> &'static str {
        match self {
            Tif::Gtc => "Gtc",
            Tif::Ioc => "Ioc",
            Tif::Alo => "Alo",
        }
    }
}

impl Serialize for Tif {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Trigger order. Wire order: isMarket, triggerPx, tpsl.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TriggerOrderType {
    #[serde(rename = "isMarket")]
    pub is_market: bool,

    #[serde(rename = "triggerPx")]
    pub trigger_px: String,

    pub tpsl: Tpsl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tpsl {
    Tp,
    Sl,
}

impl Serialize for Tpsl {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(match self {
            Tpsl::Tp => "tp",
            Tpsl::Sl => "sl",
        })
    }
}

// =============================================================================
// Cancels and account actions
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulkCancel {
    pub cancels: Vec<CancelWire>,
}

/// `{"a": asset, "o": oid}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CancelWire {
    #[serde(rename = "a")]
    pub asset: u32,
    #[serde(rename = "o")]
    pub oid: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLeverage {
    pub asset: u32,
    pub is_cross: bool,
    pub leverage: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateIsolatedMargin {
    pub asset: u32,
    pub is_buy: bool,
    /// Margin delta in micro-USD.
    pub ntli: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSubAccount {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAccountModify {
    pub sub_account_user: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubAccountTransfer {
    pub sub_account_user: String,
    pub is_deposit: bool,
    /// Amount in micro-USD.
    pub usd: u64,
}

// =============================================================================
// Agent approval
// =============================================================================

/// Approve an agent key to trade on behalf of the signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectAction {
    pub chain: Chain,
    pub agent: ConnectAgent,
    pub agent_address: String,
}

impl ConnectAction {
    /// Build the approval for `agent`, optionally under a named slot.
    pub fn new(network: Network, agent: Address, agent_name: Option<&str>) -> Self {
        Self {
            chain: network.chain(),
            agent: ConnectAgent::for_agent(agent, agent_name),
            agent_address: agent.to_checksum(None),
        }
    }
}

/// The struct signed by a `connect` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectAgent {
    pub source: String,
    #[serde(serialize_with = "serialize_b256")]
    pub connection_id: B256,
}

impl ConnectAgent {
    /// `connectionId = keccak256(abi.encode(agent[, name]))`.
    pub fn for_agent(agent: Address, agent_name: Option<&str>) -> Self {
        use alloy::primitives::keccak256;
        use alloy::sol_types::SolValue;

        let encoded = match agent_name {
            Some(name) => (agent, name.to_string()).abi_encode_params(),
            None => agent.abi_encode(),
        };
        Self {
            source: CONNECT_AGENT_SOURCE.to_string(),
            connection_id: keccak256(encoded),
        }
    }
}

/// Approve an agent key through a user-signed transaction.
///
/// Signed as `HyperliquidTransaction:ApproveAgent` under the user-signed
/// domain. The nonce inside the action must equal the request nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAgent {
    /// Chain id of the signing domain, written as 0x-hex.
    #[serde(serialize_with = "serialize_hex_u64")]
    pub signature_chain_id: u64,
    /// "Mainnet" or "Testnet".
    pub hyperliquid_chain: String,
    #[serde(serialize_with = "serialize_address")]
    pub agent_address: Address,
    /// Signed even when empty, but omitted from the wire action then.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub agent_name: String,
    pub nonce: u64,
}

impl ApproveAgent {
    /// Approval of `agent` on `network`; a blank name approves the unnamed slot.
    pub fn new(network: Network, agent: Address, agent_name: Option<&str>, nonce: u64) -> Self {
        Self {
            signature_chain_id: DomainProfile::UserSigned.chain_id(network),
            hyperliquid_chain: network.chain_name().to_string(),
            agent_address: agent,
            agent_name: agent_name.map(str::trim).unwrap_or_default().to_string(),
            nonce,
        }
    }
}

fn serialize_hex_u64<S: Serializer>(value: &u64, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{value:#x}"))
}

fn serialize_address<S: Serializer>(value: &Address, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{}", hex::encode(value)))
}

fn serialize_b256<S: Serializer>(value: &B256, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{}", hex::encode(value)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn msgpack_hex<T: Serialize>(value: &T) -> String {
        hex::encode(rmp_serde::to_vec_named(value).unwrap())
    }

    #[test]
    fn test_order_msgpack_matches_exchange_encoding() {
        let action = Action::Order(BulkOrder::ungrouped(vec![OrderWire::limit(
            110027,
            true,
            dec!(105.00),
            dec!(0.2),
            Tif::Ioc,
        )
        .with_cloid("0x0de3e244a8f44fc28a6b7bc852d66d19")]));

        // type, orders, grouping; each order a, b, p, s, r, t, c
        let expected = "83a474797065a56f72646572a66f72646572739187a161ce0001adcba162c3a170a63130352e3030a173a3302e32a172c2a17481a56c696d697481a3746966a3496f63a163d92230783064653365323434613866343466633238613662376263383532643636643139a867726f7570696e67a26e61";

        // 105.00 normalizes to "105", so rebuild with the literal exchange string
        let mut literal = action.clone();
        if let Action::Order(ref mut bulk) = literal {
            bulk.orders[0].limit_px = "105.00".to_string();
        }
        assert_eq!(msgpack_hex(&literal), expected);

        if let Action::Order(bulk) = action {
            assert_eq!(bulk.orders[0].limit_px, "105");
        }
    }

    #[test]
    fn test_create_sub_account_encoding() {
        let action = Action::create_sub_account("Sub1");
        assert_eq!(
            msgpack_hex(&action),
            "82a474797065b06372656174655375624163636f756e74a46e616d65a453756231"
        );
        assert_eq!(
            serde_json::to_string(&action).unwrap(),
            r#"{"type":"createSubAccount","name":"Sub1"}"#
        );
    }

    #[test]
    fn test_sub_account_actions_field_order() {
        let modify = Action::sub_account_modify("0xabc", "Renamed");
        assert_eq!(
            serde_json::to_string(&modify).unwrap(),
            r#"{"type":"subAccountModify","subAccountUser":"0xabc","name":"Renamed"}"#
        );

        let transfer = Action::sub_account_transfer("0xabc", true, dec!(25.5)).unwrap();
        assert_eq!(
            serde_json::to_string(&transfer).unwrap(),
            r#"{"type":"subAccountTransfer","subAccountUser":"0xabc","isDeposit":true,"usd":25500000}"#
        );
    }

    #[test]
    fn test_cancel_and_leverage_encoding() {
        let cancel = Action::Cancel(BulkCancel {
            cancels: vec![CancelWire { asset: 5, oid: 123 }],
        });
        assert_eq!(
            serde_json::to_string(&cancel).unwrap(),
            r#"{"type":"cancel","cancels":[{"a":5,"o":123}]}"#
        );

        let leverage = Action::UpdateLeverage(UpdateLeverage {
            asset: 3,
            is_cross: false,
            leverage: 10,
        });
        assert_eq!(
            serde_json::to_string(&leverage).unwrap(),
            r#"{"type":"updateLeverage","asset":3,"isCross":false,"leverage":10}"#
        );
    }

    #[test]
    fn test_isolated_margin_accepts_negative_delta() {
        let action = Action::update_isolated_margin(1, true, dec!(-10)).unwrap();
        assert_eq!(
            serde_json::to_string(&action).unwrap(),
            r#"{"type":"updateIsolatedMargin","asset":1,"isBuy":true,"ntli":-10000000}"#
        );
    }

    #[test]
    fn test_trigger_order_field_order() {
        let order_type = OrderTypeWire::trigger(dec!(99.50), true, Tpsl::Sl);
        assert_eq!(
            serde_json::to_string(&order_type).unwrap(),
            r#"{"trigger":{"isMarket":true,"triggerPx":"99.5","tpsl":"sl"}}"#
        );
    }

    #[test]
    fn test_builder_omitted_when_absent() {
        let action = Action::Order(BulkOrder::ungrouped(vec![]));
        let json = serde_json::to_string(&action).unwrap();
        assert_eq!(json, r#"{"type":"order","orders":[],"grouping":"na"}"#);
    }

    #[test]
    fn test_connect_action_shape() {
        let agent = Address::repeat_byte(0x11);
        let action = Action::Connect(ConnectAction::new(Network::Mainnet, agent, None));
        assert!(action.is_agent_approval());

        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["type"], "connect");
        assert_eq!(json["chain"], "Arbitrum");
        assert_eq!(json["agent"]["source"], "https://hyperliquid.xyz");
        assert_eq!(
            json["agentAddress"],
            "0x1111111111111111111111111111111111111111"
        );
        let connection_id = json["agent"]["connectionId"].as_str().unwrap();
        assert!(connection_id.starts_with("0x"));
        assert_eq!(connection_id.len(), 66);
    }

    #[test]
    fn test_approve_agent_shape() {
        let action = Action::ApproveAgent(ApproveAgent::new(
            Network::Testnet,
            Address::repeat_byte(0x33),
            Some(" bot "),
            1_700_000_000_000,
        ));
        assert!(action.is_agent_approval());
        assert_eq!(action.type_name(), "approveAgent");
        assert_eq!(
            serde_json::to_string(&action).unwrap(),
            r#"{"type":"approveAgent","signatureChainId":"0x66eee","hyperliquidChain":"Testnet","agentAddress":"0x3333333333333333333333333333333333333333","agentName":"bot","nonce":1700000000000}"#
        );
    }

    #[test]
    fn test_approve_agent_blank_name_is_omitted() {
        let approve = ApproveAgent::new(Network::Mainnet, Address::repeat_byte(0x33), Some("  "), 7);
        assert!(approve.agent_name.is_empty());

        let json = serde_json::to_value(Action::ApproveAgent(approve)).unwrap();
        assert_eq!(json["signatureChainId"], "0xa4b1");
        assert_eq!(json["hyperliquidChain"], "Mainnet");
        assert!(json.get("agentName").is_none());
    }

    #[test]
    fn test_type_name_matches_wire_tag() {
        let actions = [
            Action::create_sub_account("Sub1"),
            Action::sub_account_modify("0xabc", "x"),
            Action::Cancel(BulkCancel { cancels: vec![] }),
            Action::Connect(ConnectAction::new(Network::Testnet, Address::ZERO, None)),
        ];
        for action in actions {
            let json = serde_json::to_value(&action).unwrap();
            assert_eq!(json["type"], action.type_name());
        }
    }

    #[test]
    fn test_connect_agent_name_changes_connection_id() {
        let agent = Address::repeat_byte(0x22);
        let unnamed = ConnectAgent::for_agent(agent, None);
        let named = ConnectAgent::for_agent(agent, Some("bot"));
        assert_ne!(unnamed.connection_id, named.connection_id);
    }
}
