//! In-memory storage backend.

use crate::{StorageError, StorageInterface};
use async_trait::async_trait;
use dashmap::DashMap;
use relay_types::{ConfigSchema, Schema, ValidationError};

/// Process-local storage. Contents are lost when the process exits.
#[derive(Default)]
pub struct MemoryStorage {
	data: DashMap<String, Vec<u8>>,
}

impl MemoryStorage {
	pub fn new() -> Self {
		Self::default()
	}
}

/// Configuration schema for MemoryStorage. It takes no settings.
pub struct MemoryStorageSchema;

impl ConfigSchema for MemoryStorageSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		Schema::new(vec![], vec![]).validate(config)
	}
}

#[async_trait]
impl StorageInterface for MemoryStorage {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemoryStorageSchema)
	}

	async fn get_bytes(&self, key: &str) -> Result<Vec<u8>, StorageError> {
		self.data
			.get(key)
			.map(|entry| entry.value().clone())
			.ok_or_else(|| StorageError::NotFound(key.to_string()))
	}

	async fn set_bytes(&self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
		self.data.insert(key.to_string(), value);
		Ok(())
	}

	async fn exists(&self, key: &str) -> Result<bool, StorageError> {
		Ok(self.data.contains_key(key))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn test_memory_storage() {
		let storage = MemoryStorage::new();

		storage.set_bytes("orders:0x1", vec![1, 2, 3]).await.unwrap();
		assert_eq!(storage.get_bytes("orders:0x1").await.unwrap(), vec![1, 2, 3]);
		assert!(storage.exists("orders:0x1").await.unwrap());

		storage.set_bytes("orders:0x1", vec![4]).await.unwrap();
		assert_eq!(storage.get_bytes("orders:0x1").await.unwrap(), vec![4]);
		assert!(matches!(
			storage.get_bytes("orders:0x2").await,
			Err(StorageError::NotFound(_))
		));
	}

	#[test]
	fn test_schema_accepts_empty_table() {
		let storage = MemoryStorage::new();
		let config = toml::Value::Table(toml::Table::new());
		assert!(storage.config_schema().validate(&config).is_ok());
	}
}
