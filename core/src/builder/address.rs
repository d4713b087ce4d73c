//! # Addresses
//!
//! Encoding and decoding of the four standard address types the engine
//! touches: P2PKH, P2WPKH, P2SH and P2WSH. Base58check carries the
//! per-network version byte; segwit addresses use the per-network bech32
//! human-readable part with witness version 0.

use crate::builder::script::{
    deposit_script_hash, p2pkh_script, p2sh_script, p2wpkh_script, p2wsh_script,
};
use crate::deposit::DepositScriptParameters;
use bech32::{segwit, Hrp};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Bitcoin network to work on.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Bitcoin,
    Testnet,
    Regtest,
}

impl Network {
    fn p2pkh_version(self) -> u8 {
        match self {
            Network::Bitcoin => 0x00,
            Network::Testnet | Network::Regtest => 0x6f,
        }
    }

    fn p2sh_version(self) -> u8 {
        match self {
            Network::Bitcoin => 0x05,
            Network::Testnet | Network::Regtest => 0xc4,
        }
    }

    fn hrp(self) -> Hrp {
        match self {
            Network::Bitcoin => bech32::hrp::BC,
            Network::Testnet => bech32::hrp::TB,
            Network::Regtest => bech32::hrp::BCRT,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Network::Bitcoin => "bitcoin",
            Network::Testnet => "testnet",
            Network::Regtest => "regtest",
        };
        write!(f, "{name}")
    }
}

impl FromStr for Network {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bitcoin" | "mainnet" => Ok(Network::Bitcoin),
            "testnet" => Ok(Network::Testnet),
            "regtest" => Ok(Network::Regtest),
            other => Err(AddressError::Malformed(format!(
                "unknown network {other}"
            ))),
        }
    }
}

/// Errors raised while encoding or decoding addresses.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum AddressError {
    /// The address is valid but not one of the four standard types.
    #[error("address must be P2PKH, P2WPKH, P2SH or P2WSH")]
    UnsupportedType,

    /// The address belongs to a different network.
    #[error("address does not match the {0} network")]
    NetworkMismatch(Network),

    /// The address could not be parsed at all.
    #[error("malformed address: {0}")]
    Malformed(String),
}

/// Encodes a public key hash into a P2PKH address.
pub fn encode_p2pkh(public_key_hash: &[u8; 20], network: Network) -> String {
    encode_base58check(network.p2pkh_version(), public_key_hash)
}

/// Encodes a script hash into a P2SH address.
pub fn encode_p2sh(script_hash: &[u8; 20], network: Network) -> String {
    encode_base58check(network.p2sh_version(), script_hash)
}

/// Encodes a public key hash into a P2WPKH address.
pub fn encode_p2wpkh(public_key_hash: &[u8; 20], network: Network) -> String {
    segwit::encode_v0(network.hrp(), public_key_hash).expect("20-byte program is valid")
}

/// Encodes a witness script hash into a P2WSH address.
pub fn encode_p2wsh(script_hash: &[u8; 32], network: Network) -> String {
    segwit::encode_v0(network.hrp(), script_hash).expect("32-byte program is valid")
}

/// Derives the deposit address for the given parameters: P2WSH when
/// `witness`, P2SH otherwise. Deterministic per [`DepositScriptParameters`].
pub fn deposit_address(
    parameters: &DepositScriptParameters,
    network: Network,
    witness: bool,
) -> String {
    let script_hash = deposit_script_hash(parameters, witness);
    if witness {
        encode_p2wsh(
            &script_hash.try_into().expect("sha256 output is 32 bytes"),
            network,
        )
    } else {
        encode_p2sh(
            &script_hash.try_into().expect("hash160 output is 20 bytes"),
            network,
        )
    }
}

/// Decodes an address of any of the four standard types into the output
/// script that pays to it.
pub fn decode_address(address: &str, network: Network) -> Result<Vec<u8>, AddressError> {
    if let Ok((hrp, version, program)) = segwit::decode(address) {
        if hrp != network.hrp() {
            return Err(AddressError::NetworkMismatch(network));
        }
        if version.to_u8() != 0 {
            return Err(AddressError::UnsupportedType);
        }
        return match program.len() {
            20 => Ok(p2wpkh_script(
                &program.try_into().expect("length checked"),
            )),
            32 => Ok(p2wsh_script(
                &program.try_into().expect("length checked"),
            )),
            _ => Err(AddressError::UnsupportedType),
        };
    }

    let payload = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .map_err(|e| AddressError::Malformed(e.to_string()))?;

    if payload.len() != 21 {
        return Err(AddressError::UnsupportedType);
    }
    let hash: [u8; 20] = payload[1..].try_into().expect("length checked");

    match payload[0] {
        version if version == network.p2pkh_version() => Ok(p2pkh_script(&hash)),
        version if version == network.p2sh_version() => Ok(p2sh_script(&hash)),
        _ => Err(AddressError::NetworkMismatch(network)),
    }
}

fn encode_base58check(version: u8, hash: &[u8; 20]) -> String {
    let mut payload = [0u8; 21];
    payload[0] = version;
    payload[1..].copy_from_slice(hash);
    bs58::encode(payload).with_check().into_string()
}
