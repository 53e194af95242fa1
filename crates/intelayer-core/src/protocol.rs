//! Typed-data protocol constants.
//!
//! Every constant that feeds a domain separator lives here. Call sites must
//! not restate these literals: a single diverging value makes every signature
//! fail verification on the exchange.

use alloy::primitives::Address;

use crate::network::Network;

/// EIP-712 domain name of L1 actions and `connect`.
pub const EXCHANGE_DOMAIN_NAME: &str = "Exchange";
/// EIP-712 domain name of user-signed actions (`approveAgent`).
pub const USER_SIGNED_DOMAIN_NAME: &str = "HyperliquidSignTransaction";
/// EIP-712 domain version.
pub const EXCHANGE_DOMAIN_VERSION: &str = "1";
/// EIP-712 verifying contract (unused by the verifier, fixed to zero).
pub const EXCHANGE_VERIFYING_CONTRACT: Address = Address::ZERO;

/// Chain id of the L1 action domain, identical on both networks.
pub const L1_ACTION_CHAIN_ID: u64 = 1337;
/// Arbitrum One.
pub const ARBITRUM_CHAIN_ID: u64 = 42161;
/// Arbitrum Sepolia.
pub const ARBITRUM_TESTNET_CHAIN_ID: u64 = 421614;

/// Phantom agent source tag for mainnet.
pub const MAINNET_SOURCE: &str = "a";
/// Phantom agent source tag for testnet.
pub const TESTNET_SOURCE: &str = "b";
/// Agent source used by the `connect` action.
pub const CONNECT_AGENT_SOURCE: &str = "https://hyperliquid.xyz";

/// EIP-712 primary type of the phantom agent and `connect` envelopes.
pub const AGENT_PRIMARY_TYPE: &str = "Agent";
/// EIP-712 primary type of `approveAgent`.
pub const APPROVE_AGENT_PRIMARY_TYPE: &str = "HyperliquidTransaction:ApproveAgent";
/// EIP-712 type string of `approveAgent`, hashed into its type hash.
pub const APPROVE_AGENT_TYPE: &str = "HyperliquidTransaction:ApproveAgent(string hyperliquidChain,address agentAddress,string agentName,uint64 nonce)";

/// `hyperliquidChain` value of user-signed actions on mainnet.
pub const MAINNET_CHAIN_NAME: &str = "Mainnet";
/// `hyperliquidChain` value of user-signed actions on testnet.
pub const TESTNET_CHAIN_NAME: &str = "Testnet";

/// Exchange identifier sent to the gateway when none is configured.
pub const DEFAULT_EXCHANGE_ID: &str = "hyperliquid";

/// Decimal places of USD amounts on the wire.
pub const USD_DECIMALS: u32 = 6;

/// Constant set used to build a typed-data domain.
///
/// Hashed L1 actions sign against a fixed chain id and carry the network in
/// the phantom agent source tag. Agent approval (`connect`) signs the agent
/// directly against the settlement chain id of the network. User-signed
/// actions (`approveAgent`) sign the action itself under their own domain
/// name, also against the settlement chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainProfile {
    L1Action,
    AgentConnect,
    UserSigned,
}

impl DomainProfile {
    /// Chain id of the domain for the given network.
    #[must_use]
    pub fn chain_id(self, network: Network) -> u64 {
        match (self, network) {
            (DomainProfile::L1Action, _) => L1_ACTION_CHAIN_ID,
            (DomainProfile::AgentConnect | DomainProfile::UserSigned, Network::Mainnet) => {
                ARBITRUM_CHAIN_ID
            }
            (DomainProfile::AgentConnect | DomainProfile::UserSigned, Network::Testnet) => {
                ARBITRUM_TESTNET_CHAIN_ID
            }
        }
    }

    #[must_use]
    pub fn domain_name(self) -> &'static str {
        match self {
            DomainProfile::L1Action | DomainProfile::AgentConnect => EXCHANGE_DOMAIN_NAME,
            DomainProfile::UserSigned => USER_SIGNED_DOMAIN_NAME,
        }
    }
}
