//! # Wallet operations
//!
//! Orchestration of the transaction builders against the chain-data
//! collaborator: gather the UTXOs and raw previous transactions a build
//! needs, assemble, sign and broadcast. Each function is a thin
//! request/response flow; retrying a failed broadcast is the caller's
//! decision.

use crate::actor::Signer;
use crate::builder::address::{encode_p2pkh, encode_p2wpkh, Network};
use crate::builder::transaction::{
    create_deposit_transaction, create_redemption_transaction, create_sweep_transaction,
    DepositTxOutcome, RedemptionRequest, RedemptionTxOutcome, SweepTxOutcome,
};
use crate::client::{BitcoinClient, Utxo, UtxoWithRaw};
use crate::deposit::{Deposit, DepositScriptParameters};
use crate::errors::BridgeError;
use crate::hashes::hash160;

/// P2PKH or P2WPKH address of the signer's own key.
fn signer_address(signer: &impl Signer, network: Network, witness: bool) -> String {
    let public_key_hash = hash160(&signer.public_key().serialize());
    if witness {
        encode_p2wpkh(&public_key_hash, network)
    } else {
        encode_p2pkh(&public_key_hash, network)
    }
}

/// Attaches the raw creating transaction to each UTXO.
async fn attach_raw_transactions<C: BitcoinClient + ?Sized>(
    utxos: &[Utxo],
    client: &C,
) -> Result<Vec<UtxoWithRaw>, BridgeError> {
    let mut with_raw = Vec::with_capacity(utxos.len());
    for utxo in utxos {
        let raw_transaction = client.get_raw_transaction(utxo.tx_hash).await?;
        with_raw.push(UtxoWithRaw {
            utxo: *utxo,
            raw_transaction,
        });
    }
    Ok(with_raw)
}

/// Makes a deposit: funds the deposit script from the depositor's own
/// UTXOs and broadcasts the resulting P2(W)SH transaction. Change
/// returns to the depositor's address.
#[tracing::instrument(skip(signer, client), err(level = tracing::Level::WARN))]
pub async fn submit_deposit_transaction<C: BitcoinClient + ?Sized>(
    deposit: &Deposit,
    fee: u64,
    network: Network,
    signer: &impl Signer,
    witness: bool,
    client: &C,
) -> Result<DepositTxOutcome, BridgeError> {
    let depositor_address = signer_address(signer, network, true);
    let utxos = client.find_unspent_outputs(&depositor_address).await?;
    let utxos = attach_raw_transactions(&utxos, client).await?;

    let outcome = create_deposit_transaction(
        deposit,
        &utxos,
        fee,
        &depositor_address,
        network,
        signer,
        witness,
    )?;

    client.broadcast(&outcome.raw_transaction).await?;
    Ok(outcome)
}

/// Sweeps deposit UTXOs (plus the previous wallet main UTXO, when one
/// exists) into a fresh wallet main UTXO and broadcasts the result.
///
/// Two concurrent sweeps drawing on the same wallet UTXO set race to
/// spend the same inputs; serializing them is the caller's contract.
#[tracing::instrument(skip_all, err(level = tracing::Level::WARN))]
pub async fn submit_sweep_transaction<C: BitcoinClient + ?Sized>(
    fee: u64,
    signer: &impl Signer,
    deposits: &[(Utxo, DepositScriptParameters)],
    main_utxo: Option<Utxo>,
    witness: bool,
    client: &C,
) -> Result<SweepTxOutcome, BridgeError> {
    let deposit_utxos: Vec<Utxo> = deposits.iter().map(|(utxo, _)| *utxo).collect();
    let deposit_utxos = attach_raw_transactions(&deposit_utxos, client).await?;
    let deposits: Vec<(UtxoWithRaw, DepositScriptParameters)> = deposit_utxos
        .into_iter()
        .zip(deposits.iter().map(|(_, parameters)| parameters.clone()))
        .collect();

    let main_utxo = match main_utxo {
        Some(utxo) => Some(
            attach_raw_transactions(&[utxo], client)
                .await?
                .pop()
                .expect("one UTXO in, one out"),
        ),
        None => None,
    };

    let outcome = create_sweep_transaction(fee, signer, &deposits, main_utxo.as_ref(), witness)?;

    client.broadcast(&outcome.raw_transaction).await?;
    Ok(outcome)
}

/// Pays out redemption requests from the wallet's main UTXO and
/// broadcasts the result.
#[tracing::instrument(skip_all, err(level = tracing::Level::WARN))]
pub async fn submit_redemption_transaction<C: BitcoinClient + ?Sized>(
    signer: &impl Signer,
    main_utxo: Utxo,
    requests: &[RedemptionRequest],
    network: Network,
    witness: bool,
    client: &C,
) -> Result<RedemptionTxOutcome, BridgeError> {
    let main_utxo = attach_raw_transactions(&[main_utxo], client)
        .await?
        .pop()
        .expect("one UTXO in, one out");

    let outcome =
        create_redemption_transaction(signer, &main_utxo, requests, network, witness)?;

    client.broadcast(&outcome.raw_transaction).await?;
    Ok(outcome)
}
