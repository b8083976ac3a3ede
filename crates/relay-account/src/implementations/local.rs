//! Cosigner backed by a private key held in memory.

use crate::{AccountError, CosignerInterface};
use alloy_primitives::{Address, B256};
use alloy_signer::Signer;
use alloy_signer_local::PrivateKeySigner;
use async_trait::async_trait;
use relay_types::{ConfigSchema, Field, FieldType, Schema, Signature, ValidationError};
use std::sync::Arc;
use tracing::debug;

/// Local wallet cosigner using alloy's signer.
///
/// Suited to development and tests; the key lives in process memory.
pub struct LocalCosigner {
	signer: PrivateKeySigner,
}

impl LocalCosigner {
	/// Creates a cosigner from a hex-encoded private key, with or without `0x`.
	pub fn new(private_key_hex: &str) -> Result<Self, AccountError> {
		let signer = private_key_hex
			.parse::<PrivateKeySigner>()
			.map_err(|e| AccountError::InvalidKey(format!("Invalid private key: {}", e)))?;

		Ok(Self { signer })
	}

	pub fn address(&self) -> Address {
		self.signer.address()
	}
}

/// Configuration schema for LocalCosigner.
pub struct LocalCosignerSchema;

impl ConfigSchema for LocalCosignerSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("private_key", FieldType::String).with_validator(|value| {
					let key = value.as_str().unwrap_or_default();
					let key_without_prefix = key.strip_prefix("0x").unwrap_or(key);

					if key_without_prefix.len() != 64 {
						return Err("Private key must be 64 hex characters (32 bytes)".to_string());
					}

					if hex::decode(key_without_prefix).is_err() {
						return Err("Private key must be valid hexadecimal".to_string());
					}

					Ok(())
				}),
			],
			vec![Field::new("implementation", FieldType::String)],
		);

		schema.validate(config)
	}
}

#[async_trait]
impl CosignerInterface for LocalCosigner {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(LocalCosignerSchema)
	}

	async fn address(&self) -> Result<Address, AccountError> {
		Ok(self.signer.address())
	}

	async fn sign_digest(&self, digest: &B256) -> Result<Signature, AccountError> {
		let signature = self
			.signer
			.sign_hash(digest)
			.await
			.map_err(|e| AccountError::SigningFailed(format!("Failed to sign digest: {}", e)))?;

		debug!(cosigner = %self.signer.address(), %digest, "Signed digest");
		Ok(signature.into())
	}
}

/// Factory function to create a cosigner from configuration.
///
/// Configuration parameters:
/// - `private_key`: 32 byte hex private key
pub fn create_cosigner(config: &toml::Value) -> Result<Arc<dyn CosignerInterface>, AccountError> {
	LocalCosignerSchema
		.validate(config)
		.map_err(|e| AccountError::InvalidKey(e.to_string()))?;

	let private_key = config
		.get("private_key")
		.and_then(|v| v.as_str())
		.ok_or_else(|| AccountError::InvalidKey("private_key is required".to_string()))?;

	Ok(Arc::new(LocalCosigner::new(private_key)?))
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, keccak256};

	// Well-known development key (anvil account 0)
	const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn config(private_key: &str) -> toml::Value {
		let mut table = toml::Table::new();
		table.insert(
			"private_key".to_string(),
			toml::Value::String(private_key.to_string()),
		);
		toml::Value::Table(table)
	}

	#[test]
	fn test_address_from_key() {
		let cosigner = LocalCosigner::new(DEV_KEY).unwrap();
		assert_eq!(
			cosigner.address(),
			address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
		);
	}

	#[tokio::test]
	async fn test_signature_recovers_to_cosigner() {
		let cosigner = LocalCosigner::new(DEV_KEY).unwrap();
		let digest = keccak256(b"cosigner data");

		let signature = cosigner.sign_digest(&digest).await.unwrap();
		assert_eq!(signature.0.len(), 65);
		assert!(matches!(signature.0[64], 27 | 28));
		assert_eq!(signature.recover_address(&digest), Some(cosigner.address()));

		// Digests are signed raw, so a different digest recovers elsewhere
		let other = keccak256(b"other data");
		assert_ne!(signature.recover_address(&other), Some(cosigner.address()));
	}

	#[tokio::test]
	async fn test_create_from_config() {
		let cosigner = create_cosigner(&config(DEV_KEY)).unwrap();
		assert_eq!(
			cosigner.address().await.unwrap(),
			address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
		);
		assert!(cosigner.config_schema().validate(&config(DEV_KEY)).is_ok());
	}

	#[test]
	fn test_rejects_bad_keys() {
		let not_hex = "zz".repeat(32);
		for key in ["0x1234", "not-a-key", not_hex.as_str()] {
			let err = create_cosigner(&config(key)).err().unwrap();
			assert!(matches!(err, AccountError::InvalidKey(_)));
			assert!(!err.is_retryable());
		}

		let empty = toml::Value::Table(toml::Table::new());
		assert!(create_cosigner(&empty).is_err());
	}
}
