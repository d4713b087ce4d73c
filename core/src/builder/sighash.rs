//! # Sighash
//!
//! Signature hash computation for the two input generations the engine
//! spends: the legacy (pre-segwit) algorithm for P2PKH and P2SH inputs
//! and the BIP-143 algorithm for P2WPKH and P2WSH inputs. Only
//! `SIGHASH_ALL` is produced; the bridge never emits partial commitments.

use crate::hashes::hash256;
use crate::tx::{push_compact_size, Transaction};

/// The only sighash type the engine signs with.
pub const SIGHASH_ALL: u32 = 0x01;

/// Computes the legacy signature hash for `input_index`.
///
/// The scriptSig of the signed input is replaced by `script_code` (the
/// previous output script for P2PKH, the redeem script for P2SH) and all
/// other scriptSigs are emptied before hashing.
pub fn legacy_sighash(
    transaction: &Transaction,
    input_index: usize,
    script_code: &[u8],
) -> [u8; 32] {
    let mut preimage = Vec::new();

    preimage.extend_from_slice(&transaction.version.to_le_bytes());

    push_compact_size(&mut preimage, transaction.input.len());
    for (index, input) in transaction.input.iter().enumerate() {
        preimage.extend_from_slice(&input.previous_output.txid.0);
        preimage.extend_from_slice(&input.previous_output.vout.to_le_bytes());
        if index == input_index {
            push_compact_size(&mut preimage, script_code.len());
            preimage.extend_from_slice(script_code);
        } else {
            push_compact_size(&mut preimage, 0);
        }
        preimage.extend_from_slice(&input.sequence.to_le_bytes());
    }

    push_compact_size(&mut preimage, transaction.output.len());
    for output in &transaction.output {
        preimage.extend_from_slice(&output.value.to_le_bytes());
        push_compact_size(&mut preimage, output.script_pubkey.len());
        preimage.extend_from_slice(&output.script_pubkey);
    }

    preimage.extend_from_slice(&transaction.lock_time.to_le_bytes());
    preimage.extend_from_slice(&SIGHASH_ALL.to_le_bytes());

    hash256(&preimage)
}

/// Computes the BIP-143 signature hash for `input_index`.
///
/// `script_code` is the previous output's implied P2PKH script for
/// P2WPKH spends or the witness script for P2WSH spends; `value` is the
/// amount of the output being spent.
pub fn witness_v0_sighash(
    transaction: &Transaction,
    input_index: usize,
    script_code: &[u8],
    value: u64,
) -> [u8; 32] {
    let mut prevouts = Vec::new();
    let mut sequences = Vec::new();
    for input in &transaction.input {
        prevouts.extend_from_slice(&input.previous_output.txid.0);
        prevouts.extend_from_slice(&input.previous_output.vout.to_le_bytes());
        sequences.extend_from_slice(&input.sequence.to_le_bytes());
    }
    let hash_prevouts = hash256(&prevouts);
    let hash_sequence = hash256(&sequences);

    let mut outputs = Vec::new();
    for output in &transaction.output {
        outputs.extend_from_slice(&output.value.to_le_bytes());
        push_compact_size(&mut outputs, output.script_pubkey.len());
        outputs.extend_from_slice(&output.script_pubkey);
    }
    let hash_outputs = hash256(&outputs);

    let input = &transaction.input[input_index];

    let mut preimage = Vec::new();
    preimage.extend_from_slice(&transaction.version.to_le_bytes());
    preimage.extend_from_slice(&hash_prevouts);
    preimage.extend_from_slice(&hash_sequence);
    preimage.extend_from_slice(&input.previous_output.txid.0);
    preimage.extend_from_slice(&input.previous_output.vout.to_le_bytes());
    push_compact_size(&mut preimage, script_code.len());
    preimage.extend_from_slice(script_code);
    preimage.extend_from_slice(&value.to_le_bytes());
    preimage.extend_from_slice(&input.sequence.to_le_bytes());
    preimage.extend_from_slice(&hash_outputs);
    preimage.extend_from_slice(&transaction.lock_time.to_le_bytes());
    preimage.extend_from_slice(&SIGHASH_ALL.to_le_bytes());

    hash256(&preimage)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tx::Transaction;
    use hex_literal::hex;

    // The native P2WPKH example of BIP-143: the second input of the
    // unsigned transaction is spent with SIGHASH_ALL.
    #[test]
    fn bip143_native_p2wpkh_example() {
        let unsigned = hex!(
            "0100000002fff7f7881a8099afa6940d42d1e7f6362bec38171ea3edf433541db4e4ad969f"
            "0000000000eeffffffef51e1b804cc89d182d279655c3aa89e815b1b309fe287d9b2b55d57"
            "b90ec68a0100000000ffffffff02202cb206000000001976a9148280b37df378db99f66f85"
            "c95a783a76ac7a6d5988ac9093510d000000001976a9143bde42dbee7e4dbe6a21b2d50ce2"
            "f0167faa815988ac11000000"
        );
        let transaction = Transaction::from_bytes(&unsigned).expect("valid transaction");

        let script_code = hex!("76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac");
        let sighash = witness_v0_sighash(&transaction, 1, &script_code, 600_000_000);

        assert_eq!(
            sighash,
            hex!("c37af31116d1b27caf68aae9e3ac82f1477929014d5b917657d0eb49478cb670")
        );
    }

    #[test]
    fn legacy_sighash_empties_other_script_sigs() {
        let unsigned = hex!(
            "0100000002fff7f7881a8099afa6940d42d1e7f6362bec38171ea3edf433541db4e4ad969f"
            "0000000000eeffffffef51e1b804cc89d182d279655c3aa89e815b1b309fe287d9b2b55d57"
            "b90ec68a0100000000ffffffff02202cb206000000001976a9148280b37df378db99f66f85"
            "c95a783a76ac7a6d5988ac9093510d000000001976a9143bde42dbee7e4dbe6a21b2d50ce2"
            "f0167faa815988ac11000000"
        );
        let transaction = Transaction::from_bytes(&unsigned).expect("valid transaction");
        let script_code = hex!("76a9141d0f172a0ecb48aee1be1f2687d2963ae33f71a188ac");

        // Signing different inputs commits to different preimages.
        assert_ne!(
            legacy_sighash(&transaction, 0, &script_code),
            legacy_sighash(&transaction, 1, &script_code)
        );
        // But the same input is deterministic.
        assert_eq!(
            legacy_sighash(&transaction, 1, &script_code),
            legacy_sighash(&transaction, 1, &script_code)
        );
    }
}
