//! Phantom agent and EIP-712 typed-data envelope.
//!
//! The exchange never sees the action hash signed directly. It is wrapped in
//! an `Agent { source, connectionId }` struct and signed as EIP-712 typed data:
//!
//! ```text
//! signing_hash = keccak256(0x1901 || domain_separator || hash_struct(Agent))
//! ```
//!
//! `approveAgent` is the exception: the action's own fields are the message,
//! signed as `HyperliquidTransaction:ApproveAgent` under the user-signed domain.

use alloy::primitives::{keccak256, Address, B256};
use alloy::sol;
use alloy::sol_types::{eip712_domain, Eip712Domain, SolStruct, SolValue};
use serde::{Serialize, Serializer};

use intelayer_core::protocol::{
    AGENT_PRIMARY_TYPE, APPROVE_AGENT_PRIMARY_TYPE, APPROVE_AGENT_TYPE, EXCHANGE_DOMAIN_VERSION,
    EXCHANGE_VERIFYING_CONTRACT,
};
use intelayer_core::{ApproveAgent, ConnectAgent, DomainProfile, Network};

sol! {
    #[derive(Debug)]
    struct Agent {
        string source;
        bytes32 connectionId;
    }
}

/// The message signed for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhantomAgent {
    /// "a" (mainnet) or "b" (testnet); the agent source URL for `connect`.
    pub source: String,
    /// Action hash, or the agent connection id for `connect`.
    #[serde(serialize_with = "serialize_hex")]
    pub connection_id: B256,
}

impl PhantomAgent {
    pub fn new(action_hash: B256, network: Network) -> Self {
        Self {
            source: network.source_tag().to_string(),
            connection_id: action_hash,
        }
    }

    fn to_sol(&self) -> Agent {
        Agent {
            source: self.source.clone(),
            connectionId: self.connection_id,
        }
    }
}

impl From<&ConnectAgent> for PhantomAgent {
    fn from(agent: &ConnectAgent) -> Self {
        Self {
            source: agent.source.clone(),
            connection_id: agent.connection_id,
        }
    }
}

/// EIP-712 domain fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataDomain {
    pub name: &'static str,
    pub version: &'static str,
    pub chain_id: u64,
    #[serde(serialize_with = "serialize_hex")]
    pub verifying_contract: Address,
}

impl TypedDataDomain {
    pub fn for_profile(profile: DomainProfile, network: Network) -> Self {
        Self::with_chain_id(profile, profile.chain_id(network))
    }

    fn with_chain_id(profile: DomainProfile, chain_id: u64) -> Self {
        Self {
            name: profile.domain_name(),
            version: EXCHANGE_DOMAIN_VERSION,
            chain_id,
            verifying_contract: EXCHANGE_VERIFYING_CONTRACT,
        }
    }

    pub fn eip712_domain(&self) -> Eip712Domain {
        eip712_domain! {
            name: self.name,
            version: self.version,
            chain_id: self.chain_id,
            verifying_contract: self.verifying_contract,
        }
    }
}

/// One member of an EIP-712 struct type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypedDataField {
    pub name: &'static str,
    #[serde(rename = "type")]
    pub field_type: &'static str,
}

/// Type definitions of the envelope, in `eth_signTypedData_v4` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AgentTypes {
    #[serde(rename = "EIP712Domain")]
    pub domain: [TypedDataField; 4],
    #[serde(rename = "Agent")]
    pub agent: [TypedDataField; 2],
}

const DOMAIN_FIELDS: [TypedDataField; 4] = [
    TypedDataField { name: "name", field_type: "string" },
    TypedDataField { name: "version", field_type: "string" },
    TypedDataField { name: "chainId", field_type: "uint256" },
    TypedDataField { name: "verifyingContract", field_type: "address" },
];

pub const AGENT_TYPES: AgentTypes = AgentTypes {
    domain: DOMAIN_FIELDS,
    agent: [
        TypedDataField { name: "source", field_type: "string" },
        TypedDataField { name: "connectionId", field_type: "bytes32" },
    ],
};

/// Typed-data envelope handed to a signing identity.
///
/// Derived entirely from protocol constants and the agent message. Serializes
/// to the JSON accepted by `eth_signTypedData_v4`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypedDataEnvelope {
    pub domain: TypedDataDomain,
    pub types: AgentTypes,
    pub primary_type: &'static str,
    pub message: PhantomAgent,
}

impl TypedDataEnvelope {
    fn new(profile: DomainProfile, network: Network, message: PhantomAgent) -> Self {
        Self {
            domain: TypedDataDomain::for_profile(profile, network),
            types: AGENT_TYPES,
            primary_type: AGENT_PRIMARY_TYPE,
            message,
        }
    }

    /// Envelope for an approved agent key (`connect`).
    pub fn for_connect(agent: &ConnectAgent, network: Network) -> Self {
        Self::new(DomainProfile::AgentConnect, network, PhantomAgent::from(agent))
    }

    /// `hash_struct(EIP712Domain)`.
    pub fn domain_separator(&self) -> B256 {
        self.domain.eip712_domain().hash_struct()
    }

    /// Digest handed to the signing identity.
    pub fn signing_hash(&self) -> B256 {
        self.message
            .to_sol()
            .eip712_signing_hash(&self.domain.eip712_domain())
    }
}

/// Type definitions of the `approveAgent` envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ApproveAgentTypes {
    #[serde(rename = "EIP712Domain")]
    pub domain: [TypedDataField; 4],
    #[serde(rename = "HyperliquidTransaction:ApproveAgent")]
    pub approve_agent: [TypedDataField; 4],
}

pub const APPROVE_AGENT_TYPES: ApproveAgentTypes = ApproveAgentTypes {
    domain: DOMAIN_FIELDS,
    approve_agent: [
        TypedDataField { name: "hyperliquidChain", field_type: "string" },
        TypedDataField { name: "agentAddress", field_type: "address" },
        TypedDataField { name: "agentName", field_type: "string" },
        TypedDataField { name: "nonce", field_type: "uint64" },
    ],
};

/// The signed fields of an `approveAgent` action.
///
/// Unlike the wire action, an empty `agentName` is kept: it is part of the
/// struct hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAgentMessage {
    pub hyperliquid_chain: String,
    #[serde(serialize_with = "serialize_hex")]
    pub agent_address: Address,
    pub agent_name: String,
    pub nonce: u64,
}

impl From<&ApproveAgent> for ApproveAgentMessage {
    fn from(action: &ApproveAgent) -> Self {
        Self {
            hyperliquid_chain: action.hyperliquid_chain.clone(),
            agent_address: action.agent_address,
            agent_name: action.agent_name.clone(),
            nonce: action.nonce,
        }
    }
}

impl ApproveAgentMessage {
    /// `hash_struct(HyperliquidTransaction:ApproveAgent)`.
    ///
    /// The primary type name contains a colon, which `sol!` cannot express, so
    /// the struct is encoded by hand: strings as their keccak256, static
    /// members as 32-byte words.
    pub fn hash_struct(&self) -> B256 {
        let items = (
            keccak256(APPROVE_AGENT_TYPE),
            keccak256(&self.hyperliquid_chain),
            self.agent_address,
            keccak256(&self.agent_name),
            self.nonce,
        );
        keccak256(items.abi_encode())
    }
}

/// Typed data of an `approveAgent` action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveAgentEnvelope {
    pub domain: TypedDataDomain,
    pub types: ApproveAgentTypes,
    pub primary_type: &'static str,
    pub message: ApproveAgentMessage,
}

impl ApproveAgentEnvelope {
    /// Envelope for `action`, on the chain id named by its `signatureChainId`.
    pub fn new(action: &ApproveAgent) -> Self {
        Self {
            domain: TypedDataDomain::with_chain_id(
                DomainProfile::UserSigned,
                action.signature_chain_id,
            ),
            types: APPROVE_AGENT_TYPES,
            primary_type: APPROVE_AGENT_PRIMARY_TYPE,
            message: ApproveAgentMessage::from(action),
        }
    }

    pub fn domain_separator(&self) -> B256 {
        self.domain.eip712_domain().hash_struct()
    }

    /// `keccak256(0x1901 || domain_separator || hash_struct(message))`.
    pub fn signing_hash(&self) -> B256 {
        let mut data = [0u8; 66];
        data[0] = 0x19;
        data[1] = 0x01;
        data[2..34].copy_from_slice(self.domain_separator().as_slice());
        data[34..].copy_from_slice(self.message.hash_struct().as_slice());
        keccak256(data)
    }
}

/// Whatever typed data an action is signed as.
///
/// Serializes to the inner envelope's `eth_signTypedData_v4` JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SigningPayload {
    /// Phantom agent (hashed actions) or `connect` agent.
    Agent(TypedDataEnvelope),
    ApproveAgent(ApproveAgentEnvelope),
}

impl SigningPayload {
    pub fn domain(&self) -> &TypedDataDomain {
        match self {
            SigningPayload::Agent(envelope) => &envelope.domain,
            SigningPayload::ApproveAgent(envelope) => &envelope.domain,
        }
    }

    pub fn primary_type(&self) -> &'static str {
        match self {
            SigningPayload::Agent(envelope) => envelope.primary_type,
            SigningPayload::ApproveAgent(envelope) => envelope.primary_type,
        }
    }

    /// Digest handed to the signing identity.
    pub fn signing_hash(&self) -> B256 {
        match self {
            SigningPayload::Agent(envelope) => envelope.signing_hash(),
            SigningPayload::ApproveAgent(envelope) => envelope.signing_hash(),
        }
    }

    /// The phantom agent or `connect` envelope, if that is what this is.
    pub fn as_agent(&self) -> Option<&TypedDataEnvelope> {
        match self {
            SigningPayload::Agent(envelope) => Some(envelope),
            SigningPayload::ApproveAgent(_) => None,
        }
    }
}

impl From<TypedDataEnvelope> for SigningPayload {
    fn from(envelope: TypedDataEnvelope) -> Self {
        SigningPayload::Agent(envelope)
    }
}

impl From<ApproveAgentEnvelope> for SigningPayload {
    fn from(envelope: ApproveAgentEnvelope) -> Self {
        SigningPayload::ApproveAgent(envelope)
    }
}

/// Wrap an action hash for signing on `network`.
pub fn build_envelope(hash: B256, network: Network) -> TypedDataEnvelope {
    TypedDataEnvelope::new(
        DomainProfile::L1Action,
        network,
        PhantomAgent::new(hash, network),
    )
}

fn serialize_hex<T: AsRef<[u8]>, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("0x{}", hex::encode(value)))
}
