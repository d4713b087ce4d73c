//! Signing capability for transaction inputs.
//!
//! The engine depends only on the [`Signer`] seam: something that exposes
//! a compressed public key and signs 32-byte sighashes. [`Actor`] is the
//! in-process secp256k1 implementation; a remote or threshold signer can
//! implement the same trait.

use crate::hashes::hash160;
use crate::utils::SECP;
use secp256k1::{Message, PublicKey, SecretKey};
use thiserror::Error;

/// Returned when a signer cannot produce a valid signature for an input.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("signer failed to produce a signature: {0}")]
pub struct SignerError(pub String);

/// Minimal signing capability required by the transaction builders.
pub trait Signer {
    /// The signer's compressed public key.
    fn public_key(&self) -> PublicKey;

    /// Signs a sighash, returning a DER-encoded ECDSA signature without
    /// the sighash-type byte.
    fn sign(&self, sighash: [u8; 32]) -> Result<Vec<u8>, SignerError>;
}

/// An in-process signer holding a secp256k1 keypair.
#[derive(Clone)]
pub struct Actor {
    secret_key: SecretKey,
    public_key: PublicKey,
}

impl Actor {
    pub fn new(secret_key: SecretKey) -> Self {
        let public_key = PublicKey::from_secret_key(&SECP, &secret_key);
        Actor {
            secret_key,
            public_key,
        }
    }

    /// Creates an actor from 32 raw secret key bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, secp256k1::Error> {
        Ok(Actor::new(SecretKey::from_slice(bytes)?))
    }

    /// HASH160 of the compressed public key, as committed into P2PKH and
    /// P2WPKH output scripts.
    pub fn public_key_hash(&self) -> [u8; 20] {
        hash160(&self.public_key.serialize())
    }
}

impl std::fmt::Debug for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Actor({})", self.public_key)
    }
}

impl Signer for Actor {
    fn public_key(&self) -> PublicKey {
        self.public_key
    }

    fn sign(&self, sighash: [u8; 32]) -> Result<Vec<u8>, SignerError> {
        let message = Message::from_digest(sighash);
        Ok(SECP
            .sign_ecdsa(&message, &self.secret_key)
            .serialize_der()
            .to_vec())
    }
}
