//! # Builders
//!
//! Construction of the Bitcoin artifacts the bridge emits: locking
//! scripts, addresses, sighashes and complete deposit, sweep and
//! redemption transactions.

pub mod address;
pub mod script;
pub mod sighash;
pub mod transaction;
