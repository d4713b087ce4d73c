//! # Script Builder
//!
//! Builds the deposit locking script and the standard output scripts the
//! engine needs. Scripts are raw byte vectors; pushes always use the
//! minimal encoding so that identical parameters yield byte-identical
//! scripts.

use crate::deposit::DepositScriptParameters;
use crate::hashes::{hash160, sha256};

pub(crate) mod opcodes {
    pub const OP_PUSHDATA1: u8 = 0x4c;
    pub const OP_PUSHDATA2: u8 = 0x4d;
    pub const OP_DUP: u8 = 0x76;
    pub const OP_DROP: u8 = 0x75;
    pub const OP_EQUAL: u8 = 0x87;
    pub const OP_EQUALVERIFY: u8 = 0x88;
    pub const OP_HASH160: u8 = 0xa9;
    pub const OP_IF: u8 = 0x63;
    pub const OP_ELSE: u8 = 0x67;
    pub const OP_ENDIF: u8 = 0x68;
    pub const OP_CHECKSIG: u8 = 0xac;
    pub const OP_CHECKLOCKTIMEVERIFY: u8 = 0xb1;
}

use opcodes::*;

/// Incremental script writer with minimal push encoding.
#[derive(Default)]
pub struct ScriptBuilder {
    bytes: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        ScriptBuilder::default()
    }

    pub fn push_opcode(mut self, opcode: u8) -> Self {
        self.bytes.push(opcode);
        self
    }

    /// Pushes arbitrary data with the minimal push prefix: a direct
    /// length byte up to 75 bytes, `OP_PUSHDATA1`/`OP_PUSHDATA2` beyond.
    pub fn push_slice(mut self, data: &[u8]) -> Self {
        match data.len() {
            0..=0x4b => self.bytes.push(data.len() as u8),
            0x4c..=0xff => {
                self.bytes.push(OP_PUSHDATA1);
                self.bytes.push(data.len() as u8);
            }
            _ => {
                self.bytes.push(OP_PUSHDATA2);
                self.bytes
                    .extend_from_slice(&(data.len() as u16).to_le_bytes());
            }
        }
        self.bytes.extend_from_slice(data);
        self
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Builds the deposit locking script.
///
/// The wallet key can always spend; after the refund locktime the refund
/// key can reclaim funds the wallet never moved. The depositor identity
/// and blinding factor are committed (and immediately dropped) so the
/// script hash is unique per deposit.
pub fn deposit_script(parameters: &DepositScriptParameters) -> Vec<u8> {
    ScriptBuilder::new()
        .push_slice(&parameters.depositor.0)
        .push_opcode(OP_DROP)
        .push_slice(&parameters.blinding_factor)
        .push_opcode(OP_DROP)
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(&parameters.wallet_public_key_hash)
        .push_opcode(OP_EQUAL)
        .push_opcode(OP_IF)
        .push_opcode(OP_CHECKSIG)
        .push_opcode(OP_ELSE)
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(&parameters.refund_public_key_hash)
        .push_opcode(OP_EQUALVERIFY)
        .push_slice(&parameters.refund_locktime)
        .push_opcode(OP_CHECKLOCKTIMEVERIFY)
        .push_opcode(OP_DROP)
        .push_opcode(OP_CHECKSIG)
        .push_opcode(OP_ENDIF)
        .into_bytes()
}

/// Hash of the deposit script: HASH160 for P2SH, SHA-256 for P2WSH.
pub fn deposit_script_hash(parameters: &DepositScriptParameters, witness: bool) -> Vec<u8> {
    let script = deposit_script(parameters);
    if witness {
        sha256(&script).to_vec()
    } else {
        hash160(&script).to_vec()
    }
}

/// `OP_DUP OP_HASH160 <pkh> OP_EQUALVERIFY OP_CHECKSIG`
pub fn p2pkh_script(public_key_hash: &[u8; 20]) -> Vec<u8> {
    ScriptBuilder::new()
        .push_opcode(OP_DUP)
        .push_opcode(OP_HASH160)
        .push_slice(public_key_hash)
        .push_opcode(OP_EQUALVERIFY)
        .push_opcode(OP_CHECKSIG)
        .into_bytes()
}

/// `OP_0 <pkh>`
pub fn p2wpkh_script(public_key_hash: &[u8; 20]) -> Vec<u8> {
    ScriptBuilder::new()
        .push_opcode(0x00)
        .push_slice(public_key_hash)
        .into_bytes()
}

/// `OP_HASH160 <script hash> OP_EQUAL`
pub fn p2sh_script(script_hash: &[u8; 20]) -> Vec<u8> {
    ScriptBuilder::new()
        .push_opcode(OP_HASH160)
        .push_slice(script_hash)
        .push_opcode(OP_EQUAL)
        .into_bytes()
}

/// `OP_0 <script hash>`
pub fn p2wsh_script(script_hash: &[u8; 32]) -> Vec<u8> {
    ScriptBuilder::new()
        .push_opcode(0x00)
        .push_slice(script_hash)
        .into_bytes()
}
