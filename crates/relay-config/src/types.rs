//! Configuration types for the relay.

use crate::serde_helpers::{deserialize_chain_id_map, serialize_chain_id_map};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete relay configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelayConfig {
	/// Service identity and logging.
	#[serde(default)]
	pub relay: RelaySettings,
	/// Cosign workflow parameters.
	#[serde(default)]
	pub cosign: CosignSettings,
	/// Cosigner backend.
	pub cosigner: CosignerConfig,
	/// Chains the relay can read heights from, keyed by chain id.
	#[serde(
		default,
		deserialize_with = "deserialize_chain_id_map",
		serialize_with = "serialize_chain_id_map"
	)]
	pub chains: HashMap<u64, ChainConfig>,
	/// Entity storage backend.
	#[serde(default)]
	pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RelaySettings {
	#[serde(default = "default_name")]
	pub name: String,
	/// `tracing` filter directive, e.g. `info` or `relay_core=debug`.
	#[serde(default = "default_log_level")]
	pub log_level: String,
}

impl Default for RelaySettings {
	fn default() -> Self {
		Self {
			name: default_name(),
			log_level: default_log_level(),
		}
	}
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CosignSettings {
	/// Blocks added to the current height to pick the auction target block.
	#[serde(default = "default_target_block_buffer")]
	pub target_block_buffer: u64,
	/// Upper bound on time spent retrying a cosign. Zero disables retries.
	#[serde(default = "default_max_retry_elapsed_secs")]
	pub max_retry_elapsed_secs: u64,
}

impl Default for CosignSettings {
	fn default() -> Self {
		Self {
			target_block_buffer: default_target_block_buffer(),
			max_retry_elapsed_secs: default_max_retry_elapsed_secs(),
		}
	}
}

/// Cosigner selection plus the implementation's own settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CosignerConfig {
	#[serde(default = "default_cosigner_implementation")]
	pub implementation: String,
	#[serde(flatten)]
	pub settings: toml::Table,
}

impl CosignerConfig {
	/// Implementation settings as handed to the cosigner factory.
	pub fn as_toml(&self) -> toml::Value {
		toml::Value::Table(self.settings.clone())
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChainConfig {
	/// Label used in logs.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub name: Option<String>,
	/// HTTP(S) JSON-RPC endpoint.
	pub rpc_url: String,
}

impl ChainConfig {
	/// Settings as handed to the chain reader factory.
	pub fn as_toml(&self) -> toml::Value {
		let mut table = toml::Table::new();
		table.insert(
			"rpc_url".to_string(),
			toml::Value::String(self.rpc_url.clone()),
		);
		if let Some(name) = &self.name {
			table.insert("name".to_string(), toml::Value::String(name.clone()));
		}
		toml::Value::Table(table)
	}
}

/// Storage backend selection plus the backend's own settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
	#[serde(default = "default_storage_backend")]
	pub backend: String,
	#[serde(flatten)]
	pub settings: toml::Table,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			backend: default_storage_backend(),
			settings: toml::Table::new(),
		}
	}
}

impl StorageConfig {
	pub fn as_toml(&self) -> toml::Value {
		toml::Value::Table(self.settings.clone())
	}
}

fn default_name() -> String {
	"uniswapx-relay".to_string()
}

fn default_log_level() -> String {
	"info".to_string()
}

fn default_target_block_buffer() -> u64 {
	3
}

fn default_max_retry_elapsed_secs() -> u64 {
	30
}

fn default_cosigner_implementation() -> String {
	"local".to_string()
}

fn default_storage_backend() -> String {
	"file".to_string()
}
