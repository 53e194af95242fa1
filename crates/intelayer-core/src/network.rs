//! Network identity.
//!
//! The exchange runs a production and a test deployment. The network decides
//! the phantom agent source tag and, for agent approval, the chain id.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::protocol::{MAINNET_CHAIN_NAME, MAINNET_SOURCE, TESTNET_CHAIN_NAME, TESTNET_SOURCE};

/// Target exchange deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Testnet,
}

impl Network {
    #[must_use]
    pub fn is_mainnet(self) -> bool {
        matches!(self, Network::Mainnet)
    }

    /// Phantom agent `source` tag: "a" on mainnet, "b" on testnet.
    #[must_use]
    pub fn source_tag(self) -> &'static str {
        match self {
            Network::Mainnet => MAINNET_SOURCE,
            Network::Testnet => TESTNET_SOURCE,
        }
    }

    /// `hyperliquidChain` value of user-signed actions.
    #[must_use]
    pub fn chain_name(self) -> &'static str {
        if self.is_mainnet() {
            MAINNET_CHAIN_NAME
        } else {
            TESTNET_CHAIN_NAME
        }
    }

    /// Settlement chain the deployment is bridged to.
    #[must_use]
    pub fn chain(self) -> Chain {
        match self {
            Network::Mainnet => Chain::Arbitrum,
            Network::Testnet => Chain::ArbitrumTestnet,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => write!(f, "mainnet"),
            Network::Testnet => write!(f, "testnet"),
        }
    }
}

impl FromStr for Network {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            other => Err(CoreError::UnknownNetwork(other.to_string())),
        }
    }
}

/// Chain name as it appears in the `connect` action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Chain {
    Arbitrum,
    ArbitrumTestnet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_tags_are_distinct() {
        assert_eq!(Network::Mainnet.source_tag(), "a");
        assert_eq!(Network::Testnet.source_tag(), "b");
    }

    #[test]
    fn test_chain_names() {
        assert_eq!(Network::Mainnet.chain_name(), "Mainnet");
        assert_eq!(Network::Testnet.chain_name(), "Testnet");
    }

    #[test]
    fn test_parse_network() {
        assert_eq!("Mainnet".parse::<Network>().unwrap(), Network::Mainnet);
        assert_eq!(" testnet ".parse::<Network>().unwrap(), Network::Testnet);
        assert!(matches!(
            "devnet".parse::<Network>(),
            Err(CoreError::UnknownNetwork(_))
        ));
    }

    #[test]
    fn test_chain_serializes_as_name() {
        let json = serde_json::to_string(&Network::Testnet.chain()).unwrap();
        assert_eq!(json, r#""ArbitrumTestnet""#);
    }
}
