//! # Transaction builders
//!
//! Assembly and signing of the transactions the bridge wallet emits:
//! deposit funding transactions, deposit sweeps and redemptions. Each
//! input is signed with the sighash algorithm its previous output script
//! requires. Nothing here estimates fees or selects coins: callers pass
//! exact UTXOs and an exact fee, and either a complete transaction comes
//! back or a typed error does.

mod deposit;
mod redemption;
mod sweep;

pub use deposit::{create_deposit_transaction, DepositTxOutcome};
pub use redemption::{create_redemption_transaction, RedemptionRequest, RedemptionTxOutcome};
pub use sweep::{create_sweep_transaction, SweepTxOutcome};

use crate::actor::{Signer, SignerError};
use crate::builder::script::{deposit_script, p2pkh_script, ScriptBuilder};
use crate::builder::sighash::{legacy_sighash, witness_v0_sighash, SIGHASH_ALL};
use crate::client::UtxoWithRaw;
use crate::deposit::DepositScriptParameters;
use crate::hashes::hash160;
use crate::tx::{DecodeError, Transaction, TxOut};
use thiserror::Error;

/// Default sequence number of every input the engine emits.
pub const DEFAULT_SEQUENCE: u32 = 0xffffffff;

/// Errors raised while assembling or signing a transaction.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TxError {
    /// The supplied inputs cannot cover the requested amount plus fee. No
    /// partial transaction is ever emitted.
    #[error("insufficient funds: inputs are worth {available} sats but {required} sats are needed")]
    InsufficientFunds { available: u64, required: u64 },

    /// The signer's public key does not hash to the wallet public key
    /// hash committed in the deposit script.
    #[error("wallet public key does not correspond to wallet private key")]
    WalletKeyMismatch,

    /// A spent output does not pay to the signing key.
    #[error("UTXO does not belong to the wallet")]
    ForeignUtxo,

    /// The previous output script is not one the engine can spend.
    #[error("unsupported UTXO script type")]
    UnsupportedScriptType,

    /// A UTXO references an output its raw transaction does not have.
    #[error("previous output {vout} not found in transaction {txid}")]
    MissingPreviousOutput { txid: crate::tx::Txid, vout: u32 },

    /// There is nothing to spend or to build.
    #[error("there must be at least one deposit UTXO to sweep")]
    NoDeposits,

    /// A redemption was requested without any requests.
    #[error("there must be at least one request to redeem")]
    NoRedemptionRequests,

    /// A redemption request's fees exceed its amount.
    #[error("redemption fees exceed the requested amount")]
    FeesExceedAmount,

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Address(#[from] crate::builder::address::AddressError),
}

/// Script type of a previous output, as far as the engine can spend it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum SpentOutputType {
    PubkeyHash,
    WitnessPubkeyHash,
    ScriptHash,
    WitnessScriptHash,
}

/// Classifies an output script into one of the four spendable types.
pub(crate) fn classify_script(script: &[u8]) -> Option<SpentOutputType> {
    match script {
        [0x76, 0xa9, 0x14, .., 0x88, 0xac] if script.len() == 25 => {
            Some(SpentOutputType::PubkeyHash)
        }
        [0x00, 0x14, ..] if script.len() == 22 => Some(SpentOutputType::WitnessPubkeyHash),
        [0xa9, 0x14, .., 0x87] if script.len() == 23 => Some(SpentOutputType::ScriptHash),
        [0x00, 0x20, ..] if script.len() == 34 => Some(SpentOutputType::WitnessScriptHash),
        _ => None,
    }
}

/// Looks up the output a UTXO points at inside its raw transaction.
pub(crate) fn previous_output(utxo: &UtxoWithRaw) -> Result<TxOut, TxError> {
    let transaction = Transaction::from_bytes(&utxo.raw_transaction.0)?;
    transaction
        .output
        .get(utxo.utxo.output_index as usize)
        .cloned()
        .ok_or(TxError::MissingPreviousOutput {
            txid: utxo.utxo.tx_hash,
            vout: utxo.utxo.output_index,
        })
}

/// Appends the `SIGHASH_ALL` type byte to a DER signature.
fn signature_with_hash_type(der: Vec<u8>) -> Vec<u8> {
    let mut signature = der;
    signature.push(SIGHASH_ALL as u8);
    signature
}

/// Signs a plain P2PKH or P2WPKH input owned by the signer. Fails with
/// [`TxError::ForeignUtxo`] when the previous output pays somebody else.
pub(crate) fn sign_plain_input(
    transaction: &mut Transaction,
    input_index: usize,
    previous_output: &TxOut,
    signer: &impl Signer,
) -> Result<(), TxError> {
    let public_key = signer.public_key().serialize();
    let public_key_hash = hash160(&public_key);

    match classify_script(&previous_output.script_pubkey) {
        Some(SpentOutputType::PubkeyHash) => {
            if previous_output.script_pubkey[3..23] != public_key_hash {
                return Err(TxError::ForeignUtxo);
            }
            let sighash =
                legacy_sighash(transaction, input_index, &previous_output.script_pubkey);
            let signature = signature_with_hash_type(signer.sign(sighash)?);
            transaction.input[input_index].script_sig = ScriptBuilder::new()
                .push_slice(&signature)
                .push_slice(&public_key)
                .into_bytes();
        }
        Some(SpentOutputType::WitnessPubkeyHash) => {
            if previous_output.script_pubkey[2..22] != public_key_hash {
                return Err(TxError::ForeignUtxo);
            }
            let script_code = p2pkh_script(&public_key_hash);
            let sighash = witness_v0_sighash(
                transaction,
                input_index,
                &script_code,
                previous_output.value,
            );
            let signature = signature_with_hash_type(signer.sign(sighash)?);
            transaction.input[input_index].witness = vec![signature, public_key.to_vec()];
        }
        _ => return Err(TxError::UnsupportedScriptType),
    }

    Ok(())
}

/// Signs a deposit input by satisfying its deposit script through the
/// wallet-key `CHECKSIG` branch. The unlocking data is the signature,
/// the wallet public key and the revealed deposit script, as a scriptSig
/// for P2SH outputs or a witness stack for P2WSH outputs.
pub(crate) fn sign_deposit_input(
    transaction: &mut Transaction,
    input_index: usize,
    parameters: &DepositScriptParameters,
    previous_output: &TxOut,
    signer: &impl Signer,
) -> Result<(), TxError> {
    let public_key = signer.public_key().serialize();
    if hash160(&public_key) != parameters.wallet_public_key_hash {
        return Err(TxError::WalletKeyMismatch);
    }

    let script = deposit_script(parameters);

    match classify_script(&previous_output.script_pubkey) {
        Some(SpentOutputType::ScriptHash) => {
            let sighash = legacy_sighash(transaction, input_index, &script);
            let signature = signature_with_hash_type(signer.sign(sighash)?);
            transaction.input[input_index].script_sig = ScriptBuilder::new()
                .push_slice(&signature)
                .push_slice(&public_key)
                .push_slice(&script)
                .into_bytes();
        }
        Some(SpentOutputType::WitnessScriptHash) => {
            let sighash =
                witness_v0_sighash(transaction, input_index, &script, previous_output.value);
            let signature = signature_with_hash_type(signer.sign(sighash)?);
            transaction.input[input_index].witness =
                vec![signature, public_key.to_vec(), script];
        }
        _ => return Err(TxError::UnsupportedScriptType),
    }

    Ok(())
}
