//! Cosigner accounts.
//!
//! A cosigner attests to the auction parameters of a priority order by
//! signing a 32 byte digest. Production deployments back this with a KMS;
//! [`implementations::local::LocalCosigner`] holds the key in process.

use alloy_primitives::{Address, B256};
use async_trait::async_trait;
use relay_types::{ConfigSchema, Signature};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod local;
}

pub use implementations::local::{create_cosigner, LocalCosigner};

#[derive(Debug, Error)]
pub enum AccountError {
	#[error("Signing failed: {0}")]
	SigningFailed(String),
	#[error("Invalid key: {0}")]
	InvalidKey(String),
}

impl AccountError {
	/// A failed signature may succeed on a later attempt; a bad key never will.
	pub fn is_retryable(&self) -> bool {
		matches!(self, AccountError::SigningFailed(_))
	}
}

/// Signer of cosignature digests.
#[async_trait]
pub trait CosignerInterface: Send + Sync {
	/// Schema of the configuration table this cosigner is built from.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Address the reactor checks cosignatures against.
	async fn address(&self) -> Result<Address, AccountError>;

	/// Signs a prehashed digest, without any message prefix.
	async fn sign_digest(&self, digest: &B256) -> Result<Signature, AccountError>;
}
