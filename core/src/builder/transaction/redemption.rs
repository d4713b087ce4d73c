//! Redemption transaction assembly.

use crate::actor::Signer;
use crate::builder::address::{decode_address, Network};
use crate::builder::script::{p2pkh_script, p2wpkh_script};
use crate::builder::transaction::{
    previous_output, sign_plain_input, TxError, DEFAULT_SEQUENCE,
};
use crate::client::{Utxo, UtxoWithRaw};
use crate::hashes::hash160;
use crate::tx::{OutPoint, RawTransaction, Transaction, TxIn, TxOut, Txid};
use serde::{Deserialize, Serialize};

/// A single redemption to fulfill.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedemptionRequest {
    /// Recipient of the redeemed coins. Must be a P2PKH, P2WPKH, P2SH or
    /// P2WSH address.
    pub address: String,
    /// Requested amount in satoshis; the actual output value is reduced
    /// by the fee share and the treasury fee.
    pub amount: u64,
    /// This request's contribution to the transaction fee.
    pub fee_share: u64,
    /// Treasury fee withheld from the redeemed amount.
    pub treasury_fee: u64,
}

/// Outcome of a redemption: the transaction plus the wallet's new main
/// UTXO, if a change output was created.
#[derive(Clone, Debug)]
pub struct RedemptionTxOutcome {
    pub transaction_hash: Txid,
    pub new_main_utxo: Option<Utxo>,
    pub raw_transaction: RawTransaction,
}

/// Creates a transaction paying out redemption requests from the
/// wallet's main UTXO.
///
/// The main UTXO is the single input. Each request becomes one output
/// worth `amount - fee_share - treasury_fee`, in request order, followed
/// by a change output back to the wallet when the remainder is positive.
/// The transaction fee is the sum of the fee shares.
pub fn create_redemption_transaction(
    signer: &impl Signer,
    main_utxo: &UtxoWithRaw,
    requests: &[RedemptionRequest],
    network: Network,
    witness: bool,
) -> Result<RedemptionTxOutcome, TxError> {
    if requests.is_empty() {
        return Err(TxError::NoRedemptionRequests);
    }

    let spent = previous_output(main_utxo)?;

    let mut transaction_fee: u64 = 0;
    let mut total_output_value: u64 = 0;
    let mut output = Vec::with_capacity(requests.len() + 1);

    for request in requests {
        let value = request
            .amount
            .checked_sub(request.fee_share)
            .and_then(|value| value.checked_sub(request.treasury_fee))
            .ok_or(TxError::FeesExceedAmount)?;
        total_output_value += value;
        transaction_fee += request.fee_share;

        output.push(TxOut {
            value,
            script_pubkey: decode_address(&request.address, network)?,
        });
    }

    let required = total_output_value + transaction_fee;
    if spent.value < required {
        return Err(TxError::InsufficientFunds {
            available: spent.value,
            required,
        });
    }

    let wallet_public_key_hash = hash160(&signer.public_key().serialize());
    let change = spent.value - required;
    if change > 0 {
        output.push(TxOut {
            value: change,
            script_pubkey: if witness {
                p2wpkh_script(&wallet_public_key_hash)
            } else {
                p2pkh_script(&wallet_public_key_hash)
            },
        });
    }

    let mut transaction = Transaction {
        version: 1,
        input: vec![TxIn {
            previous_output: OutPoint {
                txid: main_utxo.utxo.tx_hash,
                vout: main_utxo.utxo.output_index,
            },
            script_sig: Vec::new(),
            sequence: DEFAULT_SEQUENCE,
            witness: Vec::new(),
        }],
        output,
        lock_time: 0,
    };

    sign_plain_input(&mut transaction, 0, &spent, signer)?;

    let transaction_hash = transaction.txid();
    let new_main_utxo = (change > 0).then_some(Utxo {
        tx_hash: transaction_hash,
        output_index: requests.len() as u32,
        value: change,
    });

    Ok(RedemptionTxOutcome {
        transaction_hash,
        new_main_utxo,
        raw_transaction: transaction.to_raw(),
    })
}
