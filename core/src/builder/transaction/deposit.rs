//! Deposit funding transaction assembly.

use crate::actor::Signer;
use crate::builder::address::{decode_address, Network};
use crate::builder::script::{deposit_script_hash, p2sh_script, p2wsh_script};
use crate::builder::transaction::{
    previous_output, sign_plain_input, TxError, DEFAULT_SEQUENCE,
};
use crate::client::{Utxo, UtxoWithRaw};
use crate::deposit::Deposit;
use crate::tx::{OutPoint, RawTransaction, Transaction, TxIn, TxOut, Txid};

/// Outcome of a deposit funding transaction: the transaction itself plus
/// the freshly created deposit UTXO the sweep will later consume.
#[derive(Clone, Debug)]
pub struct DepositTxOutcome {
    pub transaction_hash: Txid,
    pub deposit_utxo: Utxo,
    pub raw_transaction: RawTransaction,
}

/// Creates a P2(W)SH deposit funding transaction.
///
/// Output 0 locks `deposit.amount` at the deposit script hash; all
/// supplied UTXOs are consumed as inputs, in order, with the change
/// (minus the explicit `fee`) returned to `change_address`. Fails with
/// [`TxError::InsufficientFunds`] when the inputs cannot cover
/// `amount + fee`; no partial transaction is ever emitted.
pub fn create_deposit_transaction(
    deposit: &Deposit,
    utxos: &[UtxoWithRaw],
    fee: u64,
    change_address: &str,
    network: Network,
    signer: &impl Signer,
    witness: bool,
) -> Result<DepositTxOutcome, TxError> {
    let previous_outputs = utxos
        .iter()
        .map(previous_output)
        .collect::<Result<Vec<_>, _>>()?;

    let available: u64 = previous_outputs.iter().map(|output| output.value).sum();
    let required = deposit.amount + fee;
    if available < required {
        return Err(TxError::InsufficientFunds {
            available,
            required,
        });
    }

    let input = utxos
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

    let script_hash = deposit_script_hash(&deposit.parameters, witness);
    let deposit_script_pubkey = if witness {
        p2wsh_script(&script_hash.try_into().expect("sha256 output is 32 bytes"))
    } else {
        p2sh_script(&script_hash.try_into().expect("hash160 output is 20 bytes"))
    };

    let mut output = vec![TxOut {
        value: deposit.amount,
        script_pubkey: deposit_script_pubkey,
    }];

    let change = available - required;
    if change > 0 {
        output.push(TxOut {
            value: change,
            script_pubkey: decode_address(change_address, network)?,
        });
    }

    let mut transaction = Transaction {
        version: 1,
        input,
        output,
        lock_time: 0,
    };

    for (index, spent) in previous_outputs.iter().enumerate() {
        sign_plain_input(&mut transaction, index, spent, signer)?;
    }

    let transaction_hash = transaction.txid();

    Ok(DepositTxOutcome {
        transaction_hash,
        deposit_utxo: Utxo {
            tx_hash: transaction_hash,
            output_index: 0,
            value: deposit.amount,
        },
        raw_transaction: transaction.to_raw(),
    })
}
