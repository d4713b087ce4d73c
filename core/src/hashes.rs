//! Hash primitives shared across the engine.
//!
//! Every function returns bytes in the order produced by the hash
//! function. The reversed, human-readable form is applied only at
//! formatting boundaries (see [`crate::tx::Txid`]).

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Single SHA-256.
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Double SHA-256, used for transaction and block header hashing.
pub fn hash256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// SHA-256 followed by RIPEMD-160, used for address and script hashing.
pub fn hash160(data: &[u8]) -> [u8; 20] {
    Ripemd160::digest(Sha256::digest(data)).into()
}
