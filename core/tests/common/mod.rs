//! Shared test helpers: an in-memory chain-data mock and fixture
//! utilities.
#![allow(dead_code)]

use async_trait::async_trait;
use bergamot_core::client::{
    BitcoinClient, ConfirmedTransaction, MerkleBranch, Utxo, UtxoWithRaw,
};
use bergamot_core::errors::BridgeError;
use bergamot_core::tx::{RawTransaction, Transaction, Txid};
use std::collections::HashMap;
use std::sync::Mutex;

/// An in-memory [`BitcoinClient`] serving pre-seeded chain data. Lookups
/// that were not seeded fail the way a missing transaction would.
#[derive(Default)]
pub struct MockBitcoinClient {
    pub raw_transactions: HashMap<Txid, RawTransaction>,
    pub confirmations: HashMap<Txid, u32>,
    pub latest_height: u64,
    pub headers_chain: Vec<u8>,
    pub merkle_branches: HashMap<Txid, MerkleBranch>,
    pub coinbase_hashes: HashMap<u64, Txid>,
    pub utxos: HashMap<String, Vec<Utxo>>,
    pub broadcast_log: Mutex<Vec<RawTransaction>>,
}

fn missing(what: &str) -> BridgeError {
    BridgeError::client_msg(format!("mock has no {what}"))
}

#[async_trait]
impl BitcoinClient for MockBitcoinClient {
    async fn find_unspent_outputs(&self, address: &str) -> Result<Vec<Utxo>, BridgeError> {
        Ok(self.utxos.get(address).cloned().unwrap_or_default())
    }

    async fn get_transaction(&self, tx_hash: Txid) -> Result<ConfirmedTransaction, BridgeError> {
        let raw = self.get_raw_transaction(tx_hash).await?;
        Ok(ConfirmedTransaction {
            transaction: Transaction::from_bytes(&raw.0)?,
            confirmations: self
                .confirmations
                .get(&tx_hash)
                .copied()
                .ok_or_else(|| missing("confirmations"))?,
        })
    }

    async fn get_raw_transaction(&self, tx_hash: Txid) -> Result<RawTransaction, BridgeError> {
        self.raw_transactions
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| missing("raw transaction"))
    }

    async fn latest_block_height(&self) -> Result<u64, BridgeError> {
        Ok(self.latest_height)
    }

    async fn get_headers_chain(
        &self,
        _block_height: u64,
        _chain_length: u32,
    ) -> Result<Vec<u8>, BridgeError> {
        Ok(self.headers_chain.clone())
    }

    async fn get_transaction_merkle_branch(
        &self,
        tx_hash: Txid,
        _block_height: u64,
    ) -> Result<MerkleBranch, BridgeError> {
        self.merkle_branches
            .get(&tx_hash)
            .cloned()
            .ok_or_else(|| missing("merkle branch"))
    }

    async fn get_coinbase_tx_hash(&self, block_height: u64) -> Result<Txid, BridgeError> {
        self.coinbase_hashes
            .get(&block_height)
            .copied()
            .ok_or_else(|| missing("coinbase hash"))
    }

    async fn broadcast(&self, transaction: &RawTransaction) -> Result<(), BridgeError> {
        self.broadcast_log
            .lock()
            .expect("broadcast log lock")
            .push(transaction.clone());
        Ok(())
    }
}

/// Parses a display-order transaction hash.
pub fn txid(display: &str) -> Txid {
    Txid::from_display_hex(display).expect("valid display hash")
}

/// Builds a UTXO together with its raw funding transaction.
pub fn utxo_with_raw(display_hash: &str, output_index: u32, value: u64, raw_hex: &str) -> UtxoWithRaw {
    UtxoWithRaw {
        utxo: Utxo {
            tx_hash: txid(display_hash),
            output_index,
            value,
        },
        raw_transaction: RawTransaction::from_hex(raw_hex).expect("valid raw transaction hex"),
    }
}

/// Parses a display-order 32-byte hash into canonical order.
pub fn canonical_hash(display: &str) -> [u8; 32] {
    txid(display).0
}
