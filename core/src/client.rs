//! # Chain-data collaborator
//!
//! The engine's only window onto the Bitcoin network. Implementations
//! wrap whatever indexer or node API is available; the engine itself
//! defines no timeout or retry policy, and I/O failures propagate
//! unchanged for the caller to handle.

use crate::errors::BridgeError;
use crate::tx::{RawTransaction, Transaction, Txid};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An unspent transaction output. Ephemeral: fetched per call and never
/// persisted by the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub tx_hash: Txid,
    pub output_index: u32,
    /// Unspent value in satoshis.
    pub value: u64,
}

/// A UTXO together with the raw transaction that created it, so the
/// spender can classify and commit to the previous output script without
/// a second fetch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UtxoWithRaw {
    pub utxo: Utxo,
    pub raw_transaction: RawTransaction,
}

/// A transaction along with the number of confirmations it has
/// accumulated so far.
#[derive(Clone, Debug)]
pub struct ConfirmedTransaction {
    pub transaction: Transaction,
    pub confirmations: u32,
}

/// The Merkle branch of a confirmed transaction, siblings in canonical
/// byte order and deepest pairing first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MerkleBranch {
    /// Height of the block the transaction was confirmed in.
    pub block_height: u64,
    pub siblings: Vec<[u8; 32]>,
    /// 0-based index of the transaction's position in the block.
    pub position: u32,
}

/// A Bitcoin chain-data provider.
#[async_trait]
pub trait BitcoinClient: Send + Sync {
    /// Finds all unspent transaction outputs for the given address.
    async fn find_unspent_outputs(&self, address: &str) -> Result<Vec<Utxo>, BridgeError>;

    /// Gets the transaction together with its confirmation count.
    async fn get_transaction(&self, tx_hash: Txid) -> Result<ConfirmedTransaction, BridgeError>;

    /// Gets the raw transaction data for the given transaction hash.
    async fn get_raw_transaction(&self, tx_hash: Txid) -> Result<RawTransaction, BridgeError>;

    /// Gets the height of the latest mined block.
    async fn latest_block_height(&self) -> Result<u64, BridgeError>;

    /// Gets `chain_length` concatenated 80-byte headers starting at
    /// `block_height`, lowest height first.
    async fn get_headers_chain(
        &self,
        block_height: u64,
        chain_length: u32,
    ) -> Result<Vec<u8>, BridgeError>;

    /// Gets the Merkle branch for a transaction confirmed at the given
    /// block height.
    async fn get_transaction_merkle_branch(
        &self,
        tx_hash: Txid,
        block_height: u64,
    ) -> Result<MerkleBranch, BridgeError>;

    /// Gets the hash of the coinbase transaction of the block at the
    /// given height.
    async fn get_coinbase_tx_hash(&self, block_height: u64) -> Result<Txid, BridgeError>;

    /// Broadcasts the given transaction over the network.
    async fn broadcast(&self, transaction: &RawTransaction) -> Result<(), BridgeError>;
}
