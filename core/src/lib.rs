//! # Bergamot Core
//!
//! The Bitcoin-side engine of a cross-chain bridge that lets custodied BTC
//! back a token minted on another ledger. The engine builds the Bitcoin
//! scripts and transactions that create, sweep and redeem deposits, and
//! assembles and independently validates SPV proofs that a transaction is
//! buried under sufficient proof-of-work on the canonical chain.
//!
//! The engine is a pure, stateless transform over data supplied by a
//! [`client::BitcoinClient`] collaborator: it holds no persistent state,
//! performs no locking and schedules no background work. Concurrent calls
//! are safe by construction; serializing sweeps that draw on the same
//! wallet UTXO set is the caller's responsibility, since the engine never
//! observes UTXO state beyond what is passed in.

pub mod actor;
pub mod builder;
pub mod client;
pub mod config;
pub mod deposit;
pub mod errors;
pub mod esplora;
pub mod hashes;
pub mod spv;
pub mod tx;
pub mod utils;
pub mod wallet;

pub use builder::address::Network;
pub use errors::BridgeError;
pub use tx::{RawTransaction, Transaction, Txid};
