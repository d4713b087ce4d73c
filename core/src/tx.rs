//! Bitcoin transaction wire codec.
//!
//! An explicit internal codec for the raw transaction format: fixed-width
//! little-endian version/locktime fields, compact-size-prefixed input and
//! output vectors and the optional BIP-144 witness section. Only the
//! 1-byte compact size form is supported; the 3/5/9-byte forms are
//! rejected explicitly.
//!
//! Hashes are kept in the byte order produced by the hash function
//! throughout. [`Txid`] applies the conventional reversal exclusively in
//! its `Display`/`FromStr` implementations, which keeps the two orderings
//! from ever mixing below the formatting boundary.

use crate::hashes::hash256;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced while decoding wire bytes.
#[derive(Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum DecodeError {
    /// The data ended before the announced structure was complete.
    #[error("unexpected end of data at byte {offset}")]
    UnexpectedEof { offset: usize },

    /// A compact size uint with a multi-byte discriminant was found.
    #[error("support for {0}-byte compact size uints is not implemented")]
    CompactSizeUnsupported(usize),

    /// The segwit flag byte had an unknown value.
    #[error("unsupported segwit flag 0x{0:02x}")]
    SegwitFlag(u8),

    /// Bytes remained after the locktime field.
    #[error("{0} trailing bytes after the locktime field")]
    TrailingBytes(usize),

    /// A hex string could not be decoded.
    #[error("invalid hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// A hash field had the wrong length.
    #[error("invalid hash length {0}, expected 32 bytes")]
    HashLength(usize),
}

/// A transaction hash in the canonical (hash-output) byte order.
///
/// Block explorers and the rest of the human-facing world use the
/// reversed order; that conversion happens in `Display` and `FromStr`
/// only.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Txid(pub [u8; 32]);

impl Txid {
    /// Parses a transaction hash from its display (reversed) hex form.
    pub fn from_display_hex(s: &str) -> Result<Self, DecodeError> {
        let bytes = hex::decode(s)?;
        if bytes.len() != 32 {
            return Err(DecodeError::HashLength(bytes.len()));
        }
        let mut hash: [u8; 32] = bytes.try_into().expect("length checked");
        hash.reverse();
        Ok(Txid(hash))
    }

    pub fn to_byte_array(self) -> [u8; 32] {
        self.0
    }
}

impl fmt::Display for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut reversed = self.0;
        reversed.reverse();
        write!(f, "{}", hex::encode(reversed))
    }
}

impl fmt::Debug for Txid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Txid({self})")
    }
}

impl FromStr for Txid {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Txid::from_display_hex(s)
    }
}

impl Serialize for Txid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Txid {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Txid::from_display_hex(&s).map_err(de::Error::custom)
    }
}

/// The canonical wire encoding of a transaction.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawTransaction(#[serde(with = "hex::serde")] pub Vec<u8>);

impl RawTransaction {
    pub fn from_hex(s: &str) -> Result<Self, DecodeError> {
        Ok(RawTransaction(hex::decode(s)?))
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }
}

impl fmt::Debug for RawTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RawTransaction({})", self.to_hex())
    }
}

/// A reference to an output of a previous transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub txid: Txid,
    pub vout: u32,
}

/// A transaction input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxIn {
    pub previous_output: OutPoint,
    pub script_sig: Vec<u8>,
    pub sequence: u32,
    pub witness: Vec<Vec<u8>>,
}

/// A transaction output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxOut {
    pub value: u64,
    pub script_pubkey: Vec<u8>,
}

/// A parsed Bitcoin transaction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: i32,
    pub input: Vec<TxIn>,
    pub output: Vec<TxOut>,
    pub lock_time: u32,
}

/// A raw transaction decomposed into the four fields the downstream
/// verifier consumes.
///
/// Concatenating the fields reproduces the non-witness serialization of
/// the transaction bit-for-bit: for legacy transactions that is the
/// original raw encoding, for segwit transactions it is the txid
/// preimage.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecomposedTransaction {
    #[serde(with = "hex::serde")]
    pub version: [u8; 4],
    #[serde(with = "hex::serde")]
    pub inputs: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub outputs: Vec<u8>,
    #[serde(with = "hex::serde")]
    pub locktime: [u8; 4],
}

impl DecomposedTransaction {
    /// Concatenates the four fields back into transaction bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes =
            Vec::with_capacity(4 + self.inputs.len() + self.outputs.len() + 4);
        bytes.extend_from_slice(&self.version);
        bytes.extend_from_slice(&self.inputs);
        bytes.extend_from_slice(&self.outputs);
        bytes.extend_from_slice(&self.locktime);
        bytes
    }
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Reader { data, offset: 0 }
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.offset + n > self.data.len() {
            return Err(DecodeError::UnexpectedEof {
                offset: self.offset,
            });
        }
        let slice = &self.data[self.offset..self.offset + n];
        self.offset += n;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    fn u32_le(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(
            self.take(4)?.try_into().expect("4 bytes"),
        ))
    }

    fn i32_le(&mut self) -> Result<i32, DecodeError> {
        Ok(i32::from_le_bytes(
            self.take(4)?.try_into().expect("4 bytes"),
        ))
    }

    fn u64_le(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(
            self.take(8)?.try_into().expect("8 bytes"),
        ))
    }

    fn hash(&mut self) -> Result<[u8; 32], DecodeError> {
        Ok(self.take(32)?.try_into().expect("32 bytes"))
    }

    /// Reads the leading compact size uint. Only the 1-byte form is
    /// supported; the `0xfd`/`0xfe`/`0xff` discriminants announce the
    /// 3/5/9-byte forms and are rejected.
    fn compact_size(&mut self) -> Result<usize, DecodeError> {
        match self.u8()? {
            0xfd => Err(DecodeError::CompactSizeUnsupported(3)),
            0xfe => Err(DecodeError::CompactSizeUnsupported(5)),
            0xff => Err(DecodeError::CompactSizeUnsupported(9)),
            value => Ok(value as usize),
        }
    }

    fn var_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let length = self.compact_size()?;
        Ok(self.take(length)?.to_vec())
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }
}

pub(crate) fn push_compact_size(buffer: &mut Vec<u8>, value: usize) {
    assert!(
        value <= 0xfc,
        "compact size {value} exceeds the supported 1-byte form"
    );
    buffer.push(value as u8);
}

fn push_input(buffer: &mut Vec<u8>, input: &TxIn) {
    buffer.extend_from_slice(&input.previous_output.txid.0);
    buffer.extend_from_slice(&input.previous_output.vout.to_le_bytes());
    push_compact_size(buffer, input.script_sig.len());
    buffer.extend_from_slice(&input.script_sig);
    buffer.extend_from_slice(&input.sequence.to_le_bytes());
}

fn push_output(buffer: &mut Vec<u8>, output: &TxOut) {
    buffer.extend_from_slice(&output.value.to_le_bytes());
    push_compact_size(buffer, output.script_pubkey.len());
    buffer.extend_from_slice(&output.script_pubkey);
}

impl Transaction {
    /// Parses a transaction from its wire encoding, witness data
    /// included when present.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = Reader::new(raw);

        let version = reader.i32_le()?;

        let mut input_count = reader.compact_size()?;
        let segwit = input_count == 0;
        if segwit {
            let flag = reader.u8()?;
            if flag != 0x01 {
                return Err(DecodeError::SegwitFlag(flag));
            }
            input_count = reader.compact_size()?;
        }

        let mut input = Vec::with_capacity(input_count);
        for _ in 0..input_count {
            let txid = Txid(reader.hash()?);
            let vout = reader.u32_le()?;
            let script_sig = reader.var_bytes()?;
            let sequence = reader.u32_le()?;
            input.push(TxIn {
                previous_output: OutPoint { txid, vout },
                script_sig,
                sequence,
                witness: Vec::new(),
            });
        }

        let output_count = reader.compact_size()?;
        let mut output = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            let value = reader.u64_le()?;
            let script_pubkey = reader.var_bytes()?;
            output.push(TxOut {
                value,
                script_pubkey,
            });
        }

        if segwit {
            for item in input.iter_mut() {
                let witness_items = reader.compact_size()?;
                let mut witness = Vec::with_capacity(witness_items);
                for _ in 0..witness_items {
                    witness.push(reader.var_bytes()?);
                }
                item.witness = witness;
            }
        }

        let lock_time = reader.u32_le()?;

        if reader.remaining() != 0 {
            return Err(DecodeError::TrailingBytes(reader.remaining()));
        }

        Ok(Transaction {
            version,
            input,
            output,
            lock_time,
        })
    }

    /// Serializes the transaction, using the BIP-144 layout iff any input
    /// carries witness data.
    pub fn to_bytes(&self) -> Vec<u8> {
        let segwit = self.input.iter().any(|input| !input.witness.is_empty());
        let mut bytes = Vec::new();

        bytes.extend_from_slice(&self.version.to_le_bytes());
        if segwit {
            bytes.push(0x00);
            bytes.push(0x01);
        }

        push_compact_size(&mut bytes, self.input.len());
        for input in &self.input {
            push_input(&mut bytes, input);
        }

        push_compact_size(&mut bytes, self.output.len());
        for output in &self.output {
            push_output(&mut bytes, output);
        }

        if segwit {
            for input in &self.input {
                push_compact_size(&mut bytes, input.witness.len());
                for item in &input.witness {
                    push_compact_size(&mut bytes, item.len());
                    bytes.extend_from_slice(item);
                }
            }
        }

        bytes.extend_from_slice(&self.lock_time.to_le_bytes());
        bytes
    }

    /// Serializes the transaction without marker, flag or witness data.
    /// This is the txid preimage.
    pub fn serialize_no_witness(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&self.version.to_le_bytes());
        push_compact_size(&mut bytes, self.input.len());
        for input in &self.input {
            push_input(&mut bytes, input);
        }
        push_compact_size(&mut bytes, self.output.len());
        for output in &self.output {
            push_output(&mut bytes, output);
        }
        bytes.extend_from_slice(&self.lock_time.to_le_bytes());
        bytes
    }

    /// The transaction hash in canonical byte order.
    pub fn txid(&self) -> Txid {
        Txid(hash256(&self.serialize_no_witness()))
    }

    pub fn to_raw(&self) -> RawTransaction {
        RawTransaction(self.to_bytes())
    }
}

/// Decomposes a raw transaction into version, input vector, output vector
/// and locktime.
pub fn decompose_raw_transaction(
    raw: &RawTransaction,
) -> Result<DecomposedTransaction, DecodeError> {
    let transaction = Transaction::from_bytes(&raw.0)?;

    let mut inputs = Vec::new();
    push_compact_size(&mut inputs, transaction.input.len());
    for input in &transaction.input {
        push_input(&mut inputs, input);
    }

    let mut outputs = Vec::new();
    push_compact_size(&mut outputs, transaction.output.len());
    for output in &transaction.output {
        push_output(&mut outputs, output);
    }

    Ok(DecomposedTransaction {
        version: transaction.version.to_le_bytes(),
        inputs,
        outputs,
        locktime: transaction.lock_time.to_le_bytes(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // Legacy testnet transaction
    // 1c42b0568d88bb4d21ae138769fd06199dd3ec689911972792e678be8516d58d.
    const LEGACY_TX: &str = "010000000126847a3c22a8a87a16195b0c45f7a14dd309afb3804edc1b68cd33719d89dd4c00000000c9483045022100d0e9c2e38db714c29c6b48eaf6369adb4b33fbc73fe63fbc03d28bebf3a41122022051bdfd31829571b69b788f84defcb256a7de7db3b7bdb2356100ccfd1c16378f012103989d253b17a6a0f41838b84ff0d20e8898f9d7b1a98f2564da4cc29dcf8581d94c5c14934b98637ca318a4d6e7ca6ffd1690b8e77df6377508f9f0c90d000395237576a9148db50eb52063ea9d98b3eac91489a90f738986f68763ac6776a914e257eccafbc07c381642ce6e7e55120fb077fbed880448f2b262b175ac68ffffffff0158340000000000001976a9148db50eb52063ea9d98b3eac91489a90f738986f688ac00000000";

    // Segwit testnet transaction
    // 9eb901fc68f0d9bcaf575f23783b7d30ac5dd8d95f3c83dceaa13dce17de816a.
    const SEGWIT_TX: &str = "010000000001018348cdeb551134fe1f19d378a8adec9b146671cb67b945b71bf56b20dc2b952f0100000000ffffffff021027000000000000220020df74a2e385542c87acfafa564ea4bc4fc4eb87d2b6a37d6c3b64722be83c636f10d73b00000000001600147ac2d9378a1c47e589dfb8095ca95ed2140d272602483045022100ac3d41482338262654418825c37a4c7b327ed4e0b1dfb80eba0c98f264a6cc2e02201cd321f1b806cc946141d71b229dd0a440917c9f429b5f8840f7be59d70dbfee012102ee067a0273f2e3ba88d23140a24fdb290f27bbcd0f94117a9c65be3911c5c04e00000000";

    #[test]
    fn legacy_roundtrip_is_exact() {
        let raw = RawTransaction::from_hex(LEGACY_TX).expect("valid hex");
        let transaction = Transaction::from_bytes(&raw.0).expect("valid transaction");

        assert_eq!(transaction.to_bytes(), raw.0);
        assert_eq!(transaction.serialize_no_witness(), raw.0);

        // For a legacy transaction the decomposed fields concatenate back
        // into the original bytes.
        let decomposed = decompose_raw_transaction(&raw).expect("decomposes");
        assert_eq!(decomposed.to_bytes(), raw.0);
    }

    #[test]
    fn segwit_roundtrip_is_exact() {
        let raw = RawTransaction::from_hex(SEGWIT_TX).expect("valid hex");
        let transaction = Transaction::from_bytes(&raw.0).expect("valid transaction");

        assert_eq!(transaction.to_bytes(), raw.0);
        assert_eq!(transaction.input.len(), 1);
        assert_eq!(transaction.input[0].witness.len(), 2);
        assert_eq!(transaction.output.len(), 2);
        assert_eq!(transaction.output[0].value, 10000);
    }

    #[test]
    fn decomposition_hashes_to_txid() {
        let raw = RawTransaction::from_hex(SEGWIT_TX).expect("valid hex");
        let transaction = Transaction::from_bytes(&raw.0).expect("valid transaction");
        let decomposed = decompose_raw_transaction(&raw).expect("decomposes");

        assert_eq!(decomposed.version, [0x01, 0x00, 0x00, 0x00]);
        assert_eq!(decomposed.locktime, [0x00; 4]);
        assert_eq!(
            Txid(crate::hashes::hash256(&decomposed.to_bytes())),
            transaction.txid()
        );
        assert_eq!(
            transaction.txid().to_string(),
            "9eb901fc68f0d9bcaf575f23783b7d30ac5dd8d95f3c83dceaa13dce17de816a"
        );
    }

    #[test]
    fn txid_display_reverses_bytes() {
        let display = "74d0e353cdba99a6c17ce2cfeab62a26c09b5eb756eccdcfb83dbc12e67b18bc";
        let txid = Txid::from_display_hex(display).expect("valid txid");
        assert_eq!(txid.0[0], 0xbc);
        assert_eq!(txid.to_string(), display);
    }

    #[test]
    fn rejects_truncated_transaction() {
        let raw = RawTransaction::from_hex(LEGACY_TX).expect("valid hex");
        let result = Transaction::from_bytes(&raw.0[..raw.0.len() - 3]);
        assert!(matches!(result, Err(DecodeError::UnexpectedEof { .. })));
    }

    #[test]
    fn rejects_trailing_bytes() {
        let mut bytes = RawTransaction::from_hex(LEGACY_TX).expect("valid hex").0;
        bytes.push(0x00);
        assert_eq!(
            Transaction::from_bytes(&bytes),
            Err(DecodeError::TrailingBytes(1))
        );
    }

    #[test]
    fn rejects_multi_byte_compact_sizes() {
        // A version field followed by a 0xfd input-count discriminant.
        let bytes = [0x01, 0x00, 0x00, 0x00, 0xfd, 0x01, 0x00];
        assert_eq!(
            Transaction::from_bytes(&bytes),
            Err(DecodeError::CompactSizeUnsupported(3))
        );

        let bytes = [0x01, 0x00, 0x00, 0x00, 0xfe];
        assert_eq!(
            Transaction::from_bytes(&bytes),
            Err(DecodeError::CompactSizeUnsupported(5))
        );

        let bytes = [0x01, 0x00, 0x00, 0x00, 0xff];
        assert_eq!(
            Transaction::from_bytes(&bytes),
            Err(DecodeError::CompactSizeUnsupported(9))
        );
    }
}
