//! Merkle inclusion proofs for transactions within a block.

use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors returned by Merkle proof verification.
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum MerkleError {
    /// The proof is empty while the transaction is not the only one in the
    /// block, or its length is not a multiple of 32 bytes.
    #[error("invalid merkle tree: proof of {length} bytes cannot be walked")]
    MalformedProof { length: usize },

    /// Walking the proof from the leaf does not arrive at the block's
    /// Merkle root.
    #[error("transaction merkle proof is not valid for provided header and transaction hash")]
    RootMismatch,
}

/// Assembles a transaction inclusion proof by concatenating the sibling
/// hashes of the branch, deepest pairing first.
///
/// Siblings must already be in the canonical (hash-output) byte order;
/// conversion from the reversed display form is a formatting-boundary
/// concern of whoever fetched the branch.
pub fn assemble_proof(siblings: &[[u8; 32]]) -> Vec<u8> {
    let mut proof = Vec::with_capacity(siblings.len() * 32);
    for sibling in siblings {
        proof.extend_from_slice(sibling);
    }
    proof
}

/// Verifies a transaction inclusion proof against a block's Merkle root.
///
/// Walks from the leaf up: at each level the sibling is concatenated on
/// the left when the running index is odd and on the right when it is
/// even, the pair is double-SHA-256 hashed, and the index halves. The
/// proof holds iff the final value equals `merkle_root`.
///
/// An empty proof is the single-transaction block case and is valid iff
/// the transaction hash is itself the Merkle root.
pub fn verify_proof(
    proof: &[u8],
    tx_hash: &[u8; 32],
    position: u32,
    merkle_root: &[u8; 32],
) -> Result<(), MerkleError> {
    if proof.is_empty() {
        return if tx_hash == merkle_root && position == 0 {
            Ok(())
        } else {
            Err(MerkleError::MalformedProof { length: 0 })
        };
    }

    if proof.len() % 32 != 0 {
        return Err(MerkleError::MalformedProof {
            length: proof.len(),
        });
    }

    let mut current = *tx_hash;
    let mut index = position;

    for sibling in proof.chunks_exact(32) {
        let mut pair = [0u8; 64];
        if index % 2 == 1 {
            pair[..32].copy_from_slice(sibling);
            pair[32..].copy_from_slice(&current);
        } else {
            pair[..32].copy_from_slice(&current);
            pair[32..].copy_from_slice(sibling);
        }
        current = hash256(&pair);
        index >>= 1;
    }

    if current == *merkle_root {
        Ok(())
    } else {
        Err(MerkleError::RootMismatch)
    }
}

fn hash256(data: &[u8]) -> [u8; 32] {
    let digest: [u8; 32] = Sha256::digest(data).into();
    Sha256::digest(digest).into()
}
