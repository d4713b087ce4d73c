//! Header-chain validation: linkage, proof-of-work and epoch-difficulty
//! continuity over a caller-supplied window of confirmations.

use crypto_bigint::{Encoding, U256};
use thiserror::Error;

use crate::header::{bits_to_target, split_headers, target_to_difficulty, BLOCK_HEADER_LENGTH};

/// Errors returned by header-chain validation. All of them are fatal for
/// the proof attempt at hand: re-validating the same bytes will fail the
/// same way.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum HeaderChainError {
    /// The headers chain has the wrong total length for the requested
    /// number of confirmations.
    #[error("incorrect length of the headers chain: got {actual} bytes, expected {expected}")]
    Length { expected: usize, actual: usize },

    /// The headers chain is not a non-empty multiple of 80 bytes.
    #[error("headers chain of {length} bytes is not a multiple of 80")]
    MalformedHeaders { length: usize },

    /// A header does not reference the hash of its predecessor.
    #[error("invalid headers chain: header {index} does not extend its predecessor")]
    ChainBroken { index: usize },

    /// A header hash does not meet the target decoded from its own bits.
    #[error("insufficient work in header {index}")]
    InsufficientWork { index: usize },

    /// A header difficulty matches neither the previous nor the current
    /// epoch difficulty.
    #[error("header {index} difficulty is at neither the current nor the previous epoch difficulty")]
    EpochMismatch { index: usize },
}

/// Validates a chain of consecutive block headers.
///
/// The chain must consist of exactly `required_confirmations` 80-byte
/// headers, each header must reference the hash of its predecessor, each
/// header hash (as a little-endian integer) must be at or below the target
/// decoded from its own `bits`, and every header's difficulty must equal
/// either `previous_difficulty` or `current_difficulty`. The window may
/// therefore straddle at most one retarget boundary, and no fabricated
/// difficulty is accepted.
///
/// When both supplied difficulties equal 1 the per-header difficulty check
/// is skipped: the Bitcoin testnet's emergency-difficulty rule lets
/// individual headers fall to difficulty 1 regardless of the epoch.
pub fn validate_chain(
    headers: &[u8],
    required_confirmations: usize,
    previous_difficulty: U256,
    current_difficulty: U256,
) -> Result<(), HeaderChainError> {
    let expected = required_confirmations * BLOCK_HEADER_LENGTH;
    if headers.len() != expected {
        return Err(HeaderChainError::Length {
            expected,
            actual: headers.len(),
        });
    }

    let headers = split_headers(headers)?;
    let testnet_minimum = previous_difficulty == U256::ONE && current_difficulty == U256::ONE;

    let mut previous_block_hash: Option<[u8; 32]> = None;

    for (index, header) in headers.iter().enumerate() {
        if let Some(previous) = previous_block_hash {
            if header.prev_block_hash != previous {
                return Err(HeaderChainError::ChainBroken { index });
            }
        }

        let target = bits_to_target(header.bits);
        let block_hash = header.compute_block_hash();

        // The hash bytes come out of SHA-256 in the opposite byte order to
        // the big-endian target, hence the asymmetric conversions.
        if U256::from_le_bytes(block_hash) > U256::from_be_bytes(target) {
            return Err(HeaderChainError::InsufficientWork { index });
        }

        previous_block_hash = Some(block_hash);

        if testnet_minimum {
            continue;
        }

        let difficulty = target_to_difficulty(&target);
        if difficulty != previous_difficulty && difficulty != current_difficulty {
            return Err(HeaderChainError::EpochMismatch { index });
        }
    }

    Ok(())
}
