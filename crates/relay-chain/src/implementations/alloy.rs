//! JSON-RPC chain reader backed by an alloy HTTP provider.

use crate::{ChainError, ChainReader};
use alloy_provider::{Provider, RootProvider};
use alloy_transport_http::Http;
use async_trait::async_trait;
use relay_types::{http_url_validator, ConfigSchema, Field, FieldType, Schema, ValidationError};
use std::sync::Arc;
use tracing::debug;

/// Reads block heights over HTTP JSON-RPC.
pub struct AlloyChainReader {
	chain_id: u64,
	provider: RootProvider<Http<reqwest::Client>>,
}

impl AlloyChainReader {
	/// Creates a reader for `chain_id` talking to `rpc_url`.
	///
	/// No request is made here; connectivity problems surface on the first read.
	pub fn new(chain_id: u64, rpc_url: &str) -> Result<Self, ChainError> {
		let provider = RootProvider::new_http(rpc_url.parse().map_err(|e| {
			ChainError::InvalidConfig(format!("Invalid RPC URL for chain {}: {}", chain_id, e))
		})?);

		Ok(Self { chain_id, provider })
	}
}

/// Configuration schema for AlloyChainReader.
pub struct AlloyChainReaderSchema;

impl ConfigSchema for AlloyChainReaderSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![Field::new("rpc_url", FieldType::String).with_validator(http_url_validator)],
			vec![Field::new("name", FieldType::String)],
		);

		schema.validate(config)
	}
}

#[async_trait]
impl ChainReader for AlloyChainReader {
	fn chain_id(&self) -> u64 {
		self.chain_id
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(AlloyChainReaderSchema)
	}

	async fn current_height(&self) -> Result<u64, ChainError> {
		let height = self
			.provider
			.get_block_number()
			.await
			.map_err(|e| ChainError::Network {
				chain_id: self.chain_id,
				message: format!("Failed to get block number: {}", e),
			})?;

		debug!(chain_id = self.chain_id, height, "Read chain height");
		Ok(height)
	}
}

/// Factory function to create a chain reader from configuration.
///
/// Configuration parameters:
/// - `rpc_url`: HTTP(S) JSON-RPC endpoint of the chain
/// - `name`: optional label used in logs
pub fn create_chain_reader(
	chain_id: u64,
	config: &toml::Value,
) -> Result<Arc<dyn ChainReader>, ChainError> {
	AlloyChainReaderSchema
		.validate(config)
		.map_err(|e| ChainError::InvalidConfig(format!("chain {}: {}", chain_id, e)))?;

	let rpc_url = config
		.get("rpc_url")
		.and_then(|v| v.as_str())
		.ok_or_else(|| ChainError::InvalidConfig("rpc_url is required".to_string()))?;

	Ok(Arc::new(AlloyChainReader::new(chain_id, rpc_url)?))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn table(source: &str) -> toml::Value {
		toml::Value::Table(toml::from_str(source).unwrap())
	}

	#[test]
	fn test_create_from_config() {
		let config = table(
			r#"
name = "base"
rpc_url = "https://mainnet.base.org"
"#,
		);
		let reader = create_chain_reader(8453, &config).unwrap();
		assert_eq!(reader.chain_id(), 8453);
		assert!(reader.config_schema().validate(&config).is_ok());
	}

	#[test]
	fn test_rejects_missing_or_bad_url() {
		let missing = table(r#"name = "base""#);
		assert!(matches!(
			create_chain_reader(8453, &missing),
			Err(ChainError::InvalidConfig(_))
		));

		let websocket = table(r#"rpc_url = "wss://mainnet.base.org""#);
		assert!(matches!(
			create_chain_reader(8453, &websocket),
			Err(ChainError::InvalidConfig(_))
		));
	}

	#[tokio::test]
	async fn test_unreachable_node_is_a_network_error() {
		// Nothing listens on the discard port
		let reader = AlloyChainReader::new(1, "http://127.0.0.1:9").unwrap();
		let err = reader.current_height().await.unwrap_err();

		assert!(matches!(err, ChainError::Network { chain_id: 1, .. }));
		assert!(err.is_retryable());
	}
}
