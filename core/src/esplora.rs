//! # Esplora client
//!
//! [`BitcoinClient`] implementation backed by an Esplora REST endpoint
//! (blockstream.info or any self-hosted instance).

use crate::client::{BitcoinClient, ConfirmedTransaction, MerkleBranch, Utxo};
use crate::config::BridgeConfig;
use crate::errors::BridgeError;
use crate::tx::{RawTransaction, Transaction, Txid};
use async_trait::async_trait;
use serde::Deserialize;

/// Esplora-backed chain-data provider.
#[derive(Debug, Clone)]
pub struct EsploraClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct EsploraUtxo {
    txid: String,
    vout: u32,
    value: u64,
}

#[derive(Debug, Deserialize)]
struct EsploraTxStatus {
    confirmed: bool,
    block_height: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct EsploraMerkleProof {
    block_height: u64,
    merkle: Vec<String>,
    pos: u32,
}

impl EsploraClient {
    pub fn new(base_url: &str) -> Self {
        EsploraClient {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self::new(&config.esplora_url)
    }

    /// Client for the public mainnet endpoint.
    pub fn mainnet() -> Self {
        Self::new("https://blockstream.info/api")
    }

    /// Client for the public testnet endpoint.
    pub fn testnet() -> Self {
        Self::new("https://blockstream.info/testnet/api")
    }

    async fn get_text(&self, path: &str) -> Result<String, BridgeError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(BridgeError::client)?;

        if !response.status().is_success() {
            return Err(BridgeError::client_msg(format!(
                "esplora returned {} for {url}",
                response.status()
            )));
        }
        response.text().await.map_err(BridgeError::client)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, BridgeError> {
        let text = self.get_text(path).await?;
        serde_json::from_str(&text).map_err(BridgeError::client)
    }

    async fn block_hash_at(&self, block_height: u64) -> Result<String, BridgeError> {
        self.get_text(&format!("/block-height/{block_height}")).await
    }
}

#[async_trait]
impl BitcoinClient for EsploraClient {
    #[tracing::instrument(skip(self), err(level = tracing::Level::WARN))]
    async fn find_unspent_outputs(&self, address: &str) -> Result<Vec<Utxo>, BridgeError> {
        let utxos: Vec<EsploraUtxo> = self.get_json(&format!("/address/{address}/utxo")).await?;

        utxos
            .into_iter()
            .map(|utxo| {
                Ok(Utxo {
                    tx_hash: Txid::from_display_hex(&utxo.txid)?,
                    output_index: utxo.vout,
                    value: utxo.value,
                })
            })
            .collect()
    }

    #[tracing::instrument(skip(self), err(level = tracing::Level::WARN))]
    async fn get_transaction(&self, tx_hash: Txid) -> Result<ConfirmedTransaction, BridgeError> {
        let raw = self.get_raw_transaction(tx_hash).await?;
        let transaction = Transaction::from_bytes(&raw.0)?;

        let status: EsploraTxStatus = self.get_json(&format!("/tx/{tx_hash}/status")).await?;
        let confirmations = match (status.confirmed, status.block_height) {
            (true, Some(block_height)) => {
                let tip = self.latest_block_height().await?;
                (tip.saturating_sub(block_height) + 1) as u32
            }
            _ => 0,
        };

        Ok(ConfirmedTransaction {
            transaction,
            confirmations,
        })
    }

    #[tracing::instrument(skip(self), err(level = tracing::Level::WARN))]
    async fn get_raw_transaction(&self, tx_hash: Txid) -> Result<RawTransaction, BridgeError> {
        let hex = self.get_text(&format!("/tx/{tx_hash}/hex")).await?;
        Ok(RawTransaction::from_hex(hex.trim())?)
    }

    #[tracing::instrument(skip(self), err(level = tracing::Level::WARN))]
    async fn latest_block_height(&self) -> Result<u64, BridgeError> {
        let text = self.get_text("/blocks/tip/height").await?;
        text.trim()
            .parse()
            .map_err(|e| BridgeError::client_msg(format!("invalid tip height {text:?}: {e}")))
    }

    #[tracing::instrument(skip(self), err(level = tracing::Level::WARN))]
    async fn get_headers_chain(
        &self,
        block_height: u64,
        chain_length: u32,
    ) -> Result<Vec<u8>, BridgeError> {
        let mut headers = Vec::with_capacity(chain_length as usize * 80);

        for height in block_height..block_height + u64::from(chain_length) {
            let block_hash = self.block_hash_at(height).await?;
            let header_hex = self.get_text(&format!("/block/{block_hash}/header")).await?;
            let header = hex::decode(header_hex.trim())
                .map_err(|e| BridgeError::client_msg(format!("invalid header hex: {e}")))?;
            headers.extend_from_slice(&header);
        }

        Ok(headers)
    }

    #[tracing::instrument(skip(self), err(level = tracing::Level::WARN))]
    async fn get_transaction_merkle_branch(
        &self,
        tx_hash: Txid,
        block_height: u64,
    ) -> Result<MerkleBranch, BridgeError> {
        let proof: EsploraMerkleProof = self.get_json(&format!("/tx/{tx_hash}/merkle-proof")).await?;

        // Esplora serves sibling hashes in display order; flip them to
        // the canonical order here, at the fetch boundary.
        let siblings = proof
            .merkle
            .iter()
            .map(|sibling| Ok(Txid::from_display_hex(sibling)?.0))
            .collect::<Result<Vec<_>, BridgeError>>()?;

        Ok(MerkleBranch {
            block_height: proof.block_height,
            siblings,
            position: proof.pos,
        })
    }

    #[tracing::instrument(skip(self), err(level = tracing::Level::WARN))]
    async fn get_coinbase_tx_hash(&self, block_height: u64) -> Result<Txid, BridgeError> {
        let block_hash = self.block_hash_at(block_height).await?;
        let txid = self.get_text(&format!("/block/{block_hash}/txid/0")).await?;
        Ok(Txid::from_display_hex(txid.trim())?)
    }

    #[tracing::instrument(skip(self, transaction), err(level = tracing::Level::WARN))]
    async fn broadcast(&self, transaction: &RawTransaction) -> Result<(), BridgeError> {
        let url = format!("{}/tx", self.base_url);
        let response = self
            .client
            .post(&url)
            .body(transaction.to_hex())
            .send()
            .await
            .map_err(BridgeError::client)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(BridgeError::client_msg(format!(
                "broadcast rejected with {status}: {body}"
            )));
        }

        Ok(())
    }
}
