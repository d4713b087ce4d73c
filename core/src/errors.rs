//! # Errors
//!
//! Domain-specific errors live next to the code that raises them
//! ([`crate::tx::DecodeError`], [`crate::builder::transaction::TxError`],
//! [`bergamot_spv::MerkleError`], [`bergamot_spv::HeaderChainError`]);
//! [`BridgeError`] is the top-level wrapper callers match on. Validation
//! failures always surface as one of these typed variants so callers can
//! distinguish "not ready yet" from "this proof is wrong" without parsing
//! strings; no third-party error type crosses the engine boundary.

use thiserror::Error;

/// Errors returned by the bridge engine.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum BridgeError {
    /// Malformed wire bytes.
    #[error(transparent)]
    Decode(#[from] crate::tx::DecodeError),

    /// Transaction construction or signing failure.
    #[error(transparent)]
    Tx(#[from] crate::builder::transaction::TxError),

    /// Address encoding or decoding failure.
    #[error(transparent)]
    Address(#[from] crate::builder::address::AddressError),

    /// A Merkle inclusion proof is structurally invalid. Fatal for the
    /// proof attempt; the caller must re-fetch and reassemble.
    #[error(transparent)]
    Merkle(#[from] bergamot_spv::MerkleError),

    /// A headers chain is structurally invalid. Fatal for the proof
    /// attempt; the caller must re-fetch and reassemble.
    #[error(transparent)]
    HeaderChain(#[from] bergamot_spv::HeaderChainError),

    /// The chain is not yet deep enough. Transient: retry later with
    /// fresh data.
    #[error(
        "transaction confirmations number [{actual}] is not enough, required [{required}]"
    )]
    InsufficientConfirmations { actual: u32, required: u32 },

    /// Invalid secp256k1 key material.
    #[error("invalid key material: {0}")]
    Key(#[from] secp256k1::Error),

    /// Invalid configuration.
    #[error("configuration error: {0}")]
    Config(String),

    /// An I/O failure of the chain-data collaborator, propagated
    /// unchanged. Retry policy is the caller's responsibility.
    #[error("bitcoin client error: {0}")]
    Client(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl BridgeError {
    /// Wraps a chain-data collaborator failure.
    pub fn client<E: std::error::Error + Send + Sync + 'static>(error: E) -> Self {
        BridgeError::Client(Box::new(error))
    }

    /// Wraps a chain-data collaborator failure described by a message,
    /// for transports whose failures are not error values (HTTP status
    /// codes, malformed payloads).
    pub fn client_msg(message: impl Into<String>) -> Self {
        #[derive(Debug, Error)]
        #[error("{0}")]
        struct Message(String);

        BridgeError::Client(Box::new(Message(message.into())))
    }
}
