//! Deposit receipt types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 20-byte identity of the depositor on the token ledger, used for
/// accounting once the deposit is swept.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DepositorId(#[serde(with = "hex::serde")] pub [u8; 20]);

impl fmt::Display for DepositorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

impl fmt::Debug for DepositorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DepositorId({self})")
    }
}

/// Parameters that fully determine a deposit locking script.
///
/// Identical parameters always yield an identical script and address, so
/// the external verifier can recompute both from revealed parameters. The
/// blinding factor is only checked for length; uniqueness is the caller's
/// responsibility.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositScriptParameters {
    /// Depositor identity committed into the script.
    pub depositor: DepositorId,
    /// 8-byte number making the script unique per (depositor, wallet,
    /// refund) triple.
    #[serde(with = "hex::serde")]
    pub blinding_factor: [u8; 8],
    /// HASH160 of the custodial wallet's compressed public key.
    #[serde(with = "hex::serde")]
    pub wallet_public_key_hash: [u8; 20],
    /// HASH160 of the refund public key usable after the locktime.
    #[serde(with = "hex::serde")]
    pub refund_public_key_hash: [u8; 20],
    /// 4-byte little-endian locktime after which the refund key can
    /// reclaim an unswept deposit.
    #[serde(with = "hex::serde")]
    pub refund_locktime: [u8; 4],
}

/// A deposit: the script parameters together with the deposited amount.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    #[serde(flatten)]
    pub parameters: DepositScriptParameters,
    /// Deposit amount in satoshis.
    pub amount: u64,
}

/// Computes the refund locktime as the 4-byte little-endian encoding of
/// `created_at + duration`, the form pushed into the deposit script.
pub fn refund_locktime(created_at: u32, duration: u32) -> [u8; 4] {
    (created_at + duration).to_le_bytes()
}
