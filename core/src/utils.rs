//! Shared context and process bootstrap helpers.

use crate::errors::BridgeError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

lazy_static::lazy_static! {
    /// Global secp context.
    pub static ref SECP: secp256k1::Secp256k1<secp256k1::All> = secp256k1::Secp256k1::new();
}

/// Initializes the global `tracing` subscriber. The `RUST_LOG`
/// environment variable overrides the default directive.
pub fn initialize_logger(default_directive: &str) -> Result<(), BridgeError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .map_err(|e| BridgeError::Config(format!("invalid log directive: {e}")))?;

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .try_init()
        .map_err(|e| BridgeError::Config(format!("logger already initialized: {e}")))?;

    Ok(())
}
