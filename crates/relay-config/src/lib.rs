//! Configuration loading for the relay.
//!
//! Configuration is a TOML file. `${VAR}` references are substituted from
//! the environment before parsing, the raw document is checked against a
//! schema, and a few settings can be overridden with prefixed environment
//! variables (`RELAY_` by default):
//!
//! - `RELAY_LOG_LEVEL`
//! - `RELAY_TARGET_BLOCK_BUFFER`
//! - `RELAY_COSIGNER_KEY`
//! - `RELAY_RPC_URL_<chain id>`

use anyhow::Context;
use regex::Regex;
use relay_types::{http_url_validator, Field, FieldType, Schema};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

pub mod serde_helpers;
pub mod types;

pub use types::*;

const SUPPORTED_COSIGNERS: &[&str] = &["local"];
const SUPPORTED_STORAGE: &[&str] = &["file", "memory"];

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Environment variable not found: {0}")]
	EnvVarNotFound(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader {
	file_path: Option<PathBuf>,
	env_prefix: String,
}

impl Default for ConfigLoader {
	fn default() -> Self {
		Self::new()
	}
}

impl ConfigLoader {
	pub fn new() -> Self {
		Self {
			file_path: None,
			env_prefix: "RELAY_".to_string(),
		}
	}

	pub fn with_file<P: AsRef<Path>>(mut self, path: P) -> Self {
		self.file_path = Some(path.as_ref().to_path_buf());
		self
	}

	pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.env_prefix = prefix.into();
		self
	}

	/// Reads, substitutes, overrides and validates the configured file.
	pub async fn load(&self) -> Result<RelayConfig, ConfigError> {
		let file_path = self.file_path.as_ref().ok_or_else(|| {
			ConfigError::FileNotFound("No configuration file specified".to_string())
		})?;

		info!("Loading configuration from {:?}", file_path);
		let content = match tokio::fs::read_to_string(file_path).await {
			Ok(content) => content,
			Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
				return Err(ConfigError::FileNotFound(file_path.display().to_string()))
			}
			Err(e) => return Err(e.into()),
		};

		self.parse_str(&content)
	}

	/// Same pipeline as [`load`](Self::load) for configuration already in memory.
	pub fn parse_str(&self, content: &str) -> Result<RelayConfig, ConfigError> {
		let substituted = self.substitute_env_vars(content)?;

		let raw: toml::Table =
			toml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))?;
		relay_config_schema()
			.validate(&toml::Value::Table(raw))
			.map_err(|e| ConfigError::ValidationError(e.to_string()))?;

		let mut config: RelayConfig =
			toml::from_str(&substituted).map_err(|e| ConfigError::ParseError(e.to_string()))?;

		self.apply_env_overrides(&mut config)?;
		validate_config(&config)?;

		Ok(config)
	}

	fn substitute_env_vars(&self, content: &str) -> Result<String, ConfigError> {
		let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ConfigError::ParseError(e.to_string()))?;
		let mut result = content.to_string();

		for cap in re.captures_iter(content) {
			let full_match = &cap[0];
			let var_name = &cap[1];

			let env_value = env::var(var_name)
				.map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;

			result = result.replace(full_match, &env_value);
		}

		Ok(result)
	}

	fn apply_env_overrides(&self, config: &mut RelayConfig) -> Result<(), ConfigError> {
		let var = |name: &str| env::var(format!("{}{}", self.env_prefix, name)).ok();

		if let Some(log_level) = var("LOG_LEVEL") {
			debug!("Overriding log level from environment");
			config.relay.log_level = log_level;
		}

		if let Some(buffer) = var("TARGET_BLOCK_BUFFER") {
			config.cosign.target_block_buffer = buffer.parse().map_err(|e| {
				ConfigError::ValidationError(format!("Invalid target block buffer: {}", e))
			})?;
		}

		if let Some(key) = var("COSIGNER_KEY") {
			debug!("Overriding cosigner key from environment");
			config
				.cosigner
				.settings
				.insert("private_key".to_string(), toml::Value::String(key));
		}

		let rpc_prefix = format!("{}RPC_URL_", self.env_prefix);
		for (name, url) in env::vars() {
			let Some(chain_id) = name.strip_prefix(&rpc_prefix) else {
				continue;
			};
			let chain_id: u64 = chain_id.parse().map_err(|_| {
				ConfigError::ValidationError(format!("Invalid chain id in {}", name))
			})?;

			debug!(chain_id, "Overriding RPC URL from environment");
			config
				.chains
				.entry(chain_id)
				.and_modify(|chain| chain.rpc_url = url.clone())
				.or_insert(ChainConfig {
					name: None,
					rpc_url: url,
				});
		}

		Ok(())
	}
}

/// Shape of the raw document, checked before typed deserialization.
fn relay_config_schema() -> Schema {
	let relay = Schema::new(
		vec![],
		vec![
			Field::new("name", FieldType::String),
			Field::new("log_level", FieldType::String),
		],
	);
	let cosign = Schema::new(
		vec![],
		vec![
			Field::new(
				"target_block_buffer",
				FieldType::Integer {
					min: Some(0),
					max: None,
				},
			),
			Field::new(
				"max_retry_elapsed_secs",
				FieldType::Integer {
					min: Some(0),
					max: Some(3600),
				},
			),
		],
	);
	let cosigner = Schema::new(vec![], vec![Field::new("implementation", FieldType::String)]);
	let storage = Schema::new(
		vec![],
		vec![
			Field::new("backend", FieldType::String),
			Field::new("storage_path", FieldType::String),
		],
	);

	Schema::new(
		vec![Field::new("cosigner", FieldType::Table(cosigner))],
		vec![
			Field::new("relay", FieldType::Table(relay)),
			Field::new("cosign", FieldType::Table(cosign)),
			Field::new("storage", FieldType::Table(storage)),
			Field::new("chains", FieldType::Table(Schema::new(vec![], vec![])))
				.with_validator(validate_chains),
		],
	)
}

fn validate_chains(value: &toml::Value) -> Result<(), String> {
	let chain_schema = Schema::new(
		vec![Field::new("rpc_url", FieldType::String).with_validator(http_url_validator)],
		vec![Field::new("name", FieldType::String)],
	);

	let chains = value.as_table().ok_or("chains must be a table")?;
	for (chain_id, chain) in chains {
		chain_schema
			.validate(chain)
			.map_err(|e| format!("chain {}: {}", chain_id, e))?;
	}
	Ok(())
}

/// Cross-field checks on the typed configuration.
fn validate_config(config: &RelayConfig) -> Result<(), ConfigError> {
	if config.relay.log_level.trim().is_empty() {
		return Err(ConfigError::ValidationError(
			"relay.log_level must not be empty".to_string(),
		));
	}

	if !SUPPORTED_COSIGNERS.contains(&config.cosigner.implementation.as_str()) {
		return Err(ConfigError::ValidationError(format!(
			"Unsupported cosigner implementation '{}'",
			config.cosigner.implementation
		)));
	}

	if !SUPPORTED_STORAGE.contains(&config.storage.backend.as_str()) {
		return Err(ConfigError::ValidationError(format!(
			"Unsupported storage backend '{}'",
			config.storage.backend
		)));
	}

	for (chain_id, chain) in &config.chains {
		http_url_validator(&toml::Value::String(chain.rpc_url.clone()))
			.map_err(|e| ConfigError::ValidationError(format!("chain {}: {}", chain_id, e)))?;
	}

	Ok(())
}

/// Loads configuration from `path`, or from the standard locations.
///
/// Without an explicit path the file named by `RELAY_CONFIG` is used, then
/// `./config.toml`, then `./config/relay.toml`.
pub async fn load_config(path: Option<&Path>) -> anyhow::Result<RelayConfig> {
	let path = match path {
		Some(path) => path.to_path_buf(),
		None => default_config_path().context("No configuration file found")?,
	};

	ConfigLoader::new()
		.with_file(&path)
		.load()
		.await
		.with_context(|| format!("Failed to load configuration from {:?}", path))
}

fn default_config_path() -> Option<PathBuf> {
	if let Ok(path) = env::var("RELAY_CONFIG") {
		return Some(PathBuf::from(path));
	}

	["./config.toml", "./config/relay.toml"]
		.iter()
		.map(PathBuf::from)
		.find(|path| path.exists())
}
