//! # SPV proofs
//!
//! Assembly of complete SPV proofs against the chain-data collaborator,
//! and an independent end-to-end re-validation of the same materials.
//! Validation here is a cheap local pre-check before the expensive
//! on-chain verification; it exercises the same Merkle and header-chain
//! rules the external verifier enforces.

use crate::client::BitcoinClient;
use crate::errors::BridgeError;
use crate::hashes::sha256;
use crate::tx::{Transaction, Txid};
use bergamot_spv::{merkle, validate_chain, BlockHeader, BLOCK_HEADER_LENGTH};
use borsh::{BorshDeserialize, BorshSerialize};
use crypto_bigint::U256;
use serde::{Deserialize, Serialize};

/// Proof that a transaction is included in a block buried under the
/// required number of confirmations.
///
/// `bitcoin_headers` holds `required_confirmations` 80-byte headers,
/// lowest height first; the proven block is the first confirmation. The
/// coinbase materials let the verifier independently corroborate the
/// block's claimed difficulty: `coinbase_preimage` is the single SHA-256
/// of the coinbase transaction, whose second hash is the coinbase txid
/// proven by `coinbase_proof` at position 0.
#[derive(
    Clone, Debug, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize,
)]
pub struct SpvProof {
    #[serde(with = "hex::serde")]
    pub merkle_proof: Vec<u8>,
    pub tx_index_in_block: u32,
    #[serde(with = "hex::serde")]
    pub bitcoin_headers: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub coinbase_preimage: [u8; 32],
    #[serde(with = "hex::serde")]
    pub coinbase_proof: Vec<u8>,
}

/// Assembles a proof that the given transaction is included in the
/// blockchain and has accumulated the required number of confirmations.
///
/// Fails with [`BridgeError::InsufficientConfirmations`] while the chain
/// is not yet deep enough; that error is transient and worth retrying
/// with fresh chain data.
#[tracing::instrument(skip(client), err(level = tracing::Level::WARN))]
pub async fn assemble_transaction_proof<C: BitcoinClient + ?Sized>(
    tx_hash: Txid,
    required_confirmations: u32,
    client: &C,
) -> Result<(Transaction, SpvProof), BridgeError> {
    let confirmed = client.get_transaction(tx_hash).await?;
    if confirmed.confirmations < required_confirmations {
        return Err(BridgeError::InsufficientConfirmations {
            actual: confirmed.confirmations,
            required: required_confirmations,
        });
    }

    let latest_block_height = client.latest_block_height().await?;
    let tx_block_height = latest_block_height - u64::from(confirmed.confirmations) + 1;

    let headers = client
        .get_headers_chain(tx_block_height, required_confirmations)
        .await?;

    let merkle_branch = client
        .get_transaction_merkle_branch(tx_hash, tx_block_height)
        .await?;
    let merkle_proof = merkle::assemble_proof(&merkle_branch.siblings);

    let coinbase_hash = client.get_coinbase_tx_hash(tx_block_height).await?;
    let coinbase_raw = client.get_raw_transaction(coinbase_hash).await?;
    let coinbase = Transaction::from_bytes(&coinbase_raw.0)?;
    let coinbase_preimage = sha256(&coinbase.serialize_no_witness());

    let coinbase_branch = client
        .get_transaction_merkle_branch(coinbase_hash, tx_block_height)
        .await?;
    let coinbase_proof = merkle::assemble_proof(&coinbase_branch.siblings);

    let proof = SpvProof {
        merkle_proof,
        tx_index_in_block: merkle_branch.position,
        bitcoin_headers: headers,
        coinbase_preimage,
        coinbase_proof,
    };

    Ok((confirmed.transaction, proof))
}

/// Re-fetches the proof materials for the given transaction and verifies
/// them end to end: the headers chain (linkage, proof-of-work, epoch
/// continuity against the supplied difficulties) and the Merkle
/// inclusion of both the subject transaction and the block's coinbase
/// transaction.
#[tracing::instrument(skip(client), err(level = tracing::Level::WARN))]
pub async fn validate_transaction_proof<C: BitcoinClient + ?Sized>(
    tx_hash: Txid,
    required_confirmations: u32,
    previous_difficulty: U256,
    current_difficulty: U256,
    client: &C,
) -> Result<(), BridgeError> {
    if required_confirmations < 1 {
        return Err(BridgeError::Config(
            "the number of required confirmations must be at least 1".to_string(),
        ));
    }

    let (_, proof) = assemble_transaction_proof(tx_hash, required_confirmations, client).await?;

    validate_chain(
        &proof.bitcoin_headers,
        required_confirmations as usize,
        previous_difficulty,
        current_difficulty,
    )?;

    let first_header = BlockHeader::from_slice(
        proof.bitcoin_headers[..BLOCK_HEADER_LENGTH]
            .try_into()
            .expect("length validated by the chain check"),
    );

    merkle::verify_proof(
        &proof.merkle_proof,
        &tx_hash.0,
        proof.tx_index_in_block,
        &first_header.merkle_root,
    )?;

    let coinbase_hash = sha256(&proof.coinbase_preimage);
    merkle::verify_proof(&proof.coinbase_proof, &coinbase_hash, 0, &first_header.merkle_root)?;

    Ok(())
}
