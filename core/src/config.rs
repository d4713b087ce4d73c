//! # Configuration Options
//!
//! Configuration for any Bergamot target. Options can be read from a
//! TOML file; file contents are described by [`BridgeConfig`].

use crate::builder::address::Network;
use crate::errors::BridgeError;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration options for the bridge engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Bitcoin network to work on.
    pub network: Network,
    /// Base URL of the Esplora chain-data endpoint.
    pub esplora_url: String,
    /// Number of confirmations an SPV proof must demonstrate.
    pub required_confirmations: u32,
    /// Seconds after deposit creation at which the refund key becomes
    /// usable.
    pub refund_locktime_duration: u32,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            network: Network::Testnet,
            esplora_url: "https://blockstream.info/testnet/api".to_string(),
            required_confirmations: 6,
            // 30 days.
            refund_locktime_duration: 2_592_000,
        }
    }
}

impl BridgeConfig {
    /// Parses configuration from a TOML string.
    pub fn try_parse_toml(input: &str) -> Result<Self, BridgeError> {
        toml::from_str(input).map_err(|e| BridgeError::Config(e.to_string()))
    }

    /// Reads and parses a TOML configuration file.
    pub fn try_parse_file(path: &Path) -> Result<Self, BridgeError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| BridgeError::Config(format!("cannot read {}: {e}", path.display())))?;
        Self::try_parse_toml(&contents)
    }
}
