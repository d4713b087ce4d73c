//! Bitcoin block header codec and compact-target arithmetic.

use borsh::{BorshDeserialize, BorshSerialize};
use crypto_bigint::{Encoding, U256};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::chain::HeaderChainError;

/// Length of a serialized block header.
pub const BLOCK_HEADER_LENGTH: usize = 80;

/// The difficulty-1 target: the highest (easiest) target accepted on the
/// Bitcoin mainnet. Difficulty is defined as this value divided by the
/// current target.
pub const DIFFICULTY_1_TARGET: U256 =
    U256::from_be_hex("00000000FFFF0000000000000000000000000000000000000000000000000000");

/// A Bitcoin block header.
///
/// Fixed 80-byte serialization: 4-byte version, 32-byte previous block
/// hash, 32-byte Merkle root, 4-byte time, 4-byte bits and 4-byte nonce,
/// all integers little-endian.
#[derive(Serialize, Deserialize, Eq, PartialEq, Clone, Debug, BorshDeserialize, BorshSerialize)]
pub struct BlockHeader {
    pub version: i32,
    pub prev_block_hash: [u8; 32],
    pub merkle_root: [u8; 32],
    pub time: u32,
    pub bits: u32,
    pub nonce: u32,
}

impl BlockHeader {
    /// Deserializes a header from its raw 80-byte form.
    pub fn from_slice(raw: &[u8; BLOCK_HEADER_LENGTH]) -> Self {
        BlockHeader {
            version: i32::from_le_bytes(raw[0..4].try_into().expect("fixed layout")),
            prev_block_hash: raw[4..36].try_into().expect("fixed layout"),
            merkle_root: raw[36..68].try_into().expect("fixed layout"),
            time: u32::from_le_bytes(raw[68..72].try_into().expect("fixed layout")),
            bits: u32::from_le_bytes(raw[72..76].try_into().expect("fixed layout")),
            nonce: u32::from_le_bytes(raw[76..80].try_into().expect("fixed layout")),
        }
    }

    /// Serializes the header into its raw 80-byte form. Round-trip exact
    /// with [`BlockHeader::from_slice`].
    pub fn as_bytes(&self) -> [u8; BLOCK_HEADER_LENGTH] {
        let mut output = [0u8; BLOCK_HEADER_LENGTH];
        output[0..4].copy_from_slice(&self.version.to_le_bytes());
        output[4..36].copy_from_slice(&self.prev_block_hash);
        output[36..68].copy_from_slice(&self.merkle_root);
        output[68..72].copy_from_slice(&self.time.to_le_bytes());
        output[72..76].copy_from_slice(&self.bits.to_le_bytes());
        output[76..80].copy_from_slice(&self.nonce.to_le_bytes());
        output
    }

    /// Computes the double SHA-256 hash of the serialized header.
    pub fn compute_block_hash(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hasher.update(self.as_bytes());
        let first = hasher.finalize_reset();
        hasher.update(first);
        hasher.finalize().into()
    }
}

/// Splits a concatenation of raw block headers into [`BlockHeader`]s.
///
/// The input length must be a multiple of 80 bytes.
pub fn split_headers(headers: &[u8]) -> Result<Vec<BlockHeader>, HeaderChainError> {
    if headers.is_empty() || headers.len() % BLOCK_HEADER_LENGTH != 0 {
        return Err(HeaderChainError::MalformedHeaders {
            length: headers.len(),
        });
    }

    Ok(headers
        .chunks_exact(BLOCK_HEADER_LENGTH)
        .map(|chunk| BlockHeader::from_slice(chunk.try_into().expect("exact chunks")))
        .collect())
}

/// Expands the compact target representation ("bits") into the full
/// 32-byte big-endian target the block hash is compared against.
///
/// The mantissa is signed in Bitcoin Core; a set sign bit yields a zero
/// target, matching `arith_uint256::SetCompact`.
pub fn bits_to_target(bits: u32) -> [u8; 32] {
    let size = (bits >> 24) as usize;
    let mantissa = bits & 0x00ff_ffff;

    if mantissa > 0x7F_FFFF {
        return [0; 32];
    }

    let target = if size <= 3 {
        U256::from(mantissa >> (8 * (3 - size)))
    } else {
        U256::from(mantissa) << (8 * (size - 3))
    };
    target.to_be_bytes()
}

/// Converts a 32-byte big-endian target into a difficulty, normalized
/// against [`DIFFICULTY_1_TARGET`].
///
/// A zero target (which only arises from a malformed compact form) maps to
/// the maximum difficulty so it can never satisfy an epoch equality check.
pub fn target_to_difficulty(target: &[u8; 32]) -> U256 {
    let target = U256::from_be_bytes(*target);
    if target == U256::ZERO {
        return U256::MAX;
    }
    DIFFICULTY_1_TARGET.wrapping_div(&target)
}
