//! Core domain types for exchange action signing.
//!
//! This crate provides the values that flow through the signing pipeline:
//! - `Network` / `Chain`: which exchange deployment an action targets
//! - `protocol`: every typed-data constant, in one place
//! - `Action`: typed action schemas with a fixed wire field order
//! - `ActionValue`: caller-ordered generic action payloads
//! - `InfoRequest`: unsigned informational query bodies

pub mod action;
pub mod amount;
pub mod error;
pub mod info;
pub mod network;
pub mod protocol;
pub mod value;

pub use action::{
    Action, ApproveAgent, BuilderInfo, BulkCancel, BulkOrder, CancelWire, ConnectAction, ConnectAgent,
    CreateSubAccount, Grouping, LimitOrderType, OrderTypeWire, OrderWire, SubAccountModify,
    SubAccountTransfer, Tif, Tpsl, TriggerOrderType, UpdateIsolatedMargin, UpdateLeverage,
};
pub use amount::{to_micros, usd_to_micros};
pub use error::{CoreError, Result};
pub use info::{CandleSnapshotRequest, InfoRequest};
pub use network::{Chain, Network};
pub use protocol::DomainProfile;
pub use value::ActionValue;
