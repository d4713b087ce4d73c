//! Deposit sweep transaction assembly.

use crate::actor::Signer;
use crate::builder::script::{p2pkh_script, p2wpkh_script};
use crate::builder::transaction::{
    previous_output, sign_deposit_input, sign_plain_input, TxError, DEFAULT_SEQUENCE,
};
use crate::client::{Utxo, UtxoWithRaw};
use crate::deposit::DepositScriptParameters;
use crate::hashes::hash160;
use crate::tx::{OutPoint, RawTransaction, Transaction, TxIn, TxOut, Txid};

/// Outcome of a sweep: the transaction plus the wallet's new main UTXO.
#[derive(Clone, Debug)]
pub struct SweepTxOutcome {
    pub transaction_hash: Txid,
    pub new_main_utxo: Utxo,
    pub raw_transaction: RawTransaction,
}

/// Creates a transaction sweeping deposit UTXOs into the wallet's single
/// main UTXO.
///
/// Input order is a strict contract, not an implementation detail:
/// downstream verifiers depend on byte-exact transaction hashes. The
/// previous wallet main UTXO (when present) is spent first as a plain
/// P2(W)PKH input, followed by each deposit UTXO in the given order,
/// spent through the wallet-key branch of its deposit script. The single
/// output pays `sum(inputs) - fee` to the wallet's own key.
pub fn create_sweep_transaction(
    fee: u64,
    signer: &impl Signer,
    deposits: &[(UtxoWithRaw, DepositScriptParameters)],
    main_utxo: Option<&UtxoWithRaw>,
    witness: bool,
) -> Result<SweepTxOutcome, TxError> {
    if deposits.is_empty() {
        return Err(TxError::NoDeposits);
    }

    let mut spent_utxos: Vec<&UtxoWithRaw> = Vec::with_capacity(deposits.len() + 1);
    if let Some(main) = main_utxo {
        spent_utxos.push(main);
    }
    spent_utxos.extend(deposits.iter().map(|(utxo, _)| utxo));

    let previous_outputs = spent_utxos
        .iter()
        .map(|utxo| previous_output(utxo))
        .collect::<Result<Vec<_>, _>>()?;

    let available: u64 = previous_outputs.iter().map(|output| output.value).sum();
    if available <= fee {
        return Err(TxError::InsufficientFunds {
            available,
            required: fee,
        });
    }

    let input = spent_utxos
        .iter()
        .map(|utxo| TxIn {
            previous_output: OutPoint {
                txid: utxo.utxo.tx_hash,
                vout: utxo.utxo.output_index,
            },
            script_sig: Vec::new(),
            sequence: DEFAULT_SEQUENCE,
            witness: Vec::new(),
        })
        .collect();

    let wallet_public_key_hash = hash160(&signer.public_key().serialize());
    let wallet_script_pubkey = if witness {
        p2wpkh_script(&wallet_public_key_hash)
    } else {
        p2pkh_script(&wallet_public_key_hash)
    };

    let output_value = available - fee;
    let mut transaction = Transaction {
        version: 1,
        input,
        output: vec![TxOut {
            value: output_value,
            script_pubkey: wallet_script_pubkey,
        }],
        lock_time: 0,
    };

    let deposit_offset = usize::from(main_utxo.is_some());
    for (index, spent) in previous_outputs.iter().enumerate() {
        if index < deposit_offset {
            sign_plain_input(&mut transaction, index, spent, signer)?;
        } else {
            let (_, parameters) = &deposits[index - deposit_offset];
            sign_deposit_input(&mut transaction, index, parameters, spent, signer)?;
        }
    }

    let transaction_hash = transaction.txid();

    Ok(SweepTxOutcome {
        transaction_hash,
        new_main_utxo: Utxo {
            tx_hash: transaction_hash,
            output_index: 0,
            value: output_value,
        },
        raw_transaction: transaction.to_raw(),
    })
}
