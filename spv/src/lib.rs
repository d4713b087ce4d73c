//! # Bergamot SPV
//!
//! Pure verification primitives for Simplified Payment Verification: the
//! 80-byte block header codec, compact-target arithmetic, header-chain
//! validation and Merkle inclusion proofs.
//!
//! This crate performs no I/O and holds no state. Everything operates on
//! caller-supplied bytes so the same logic can be reused in constrained
//! environments. All 32-byte hashes are kept in the byte order produced by
//! the hash function; the human-readable (reversed) form never appears
//! below the formatting boundary.

pub mod chain;
pub mod header;
pub mod merkle;

pub use chain::{validate_chain, HeaderChainError};
pub use header::{
    bits_to_target, split_headers, target_to_difficulty, BlockHeader, BLOCK_HEADER_LENGTH,
};
pub use merkle::{assemble_proof, verify_proof, MerkleError};
