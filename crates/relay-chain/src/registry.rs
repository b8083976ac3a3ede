//! Registry of chain readers keyed by chain id.

use crate::implementations::alloy::create_chain_reader;
use crate::{ChainError, ChainReader};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Collection of chain readers, one per chain id.
///
/// Readers are stored as `Arc<dyn ChainReader>` so the registry can hand
/// them to concurrent cosign workflows.
#[derive(Default, Clone)]
pub struct ChainRegistry {
	readers: HashMap<u64, Arc<dyn ChainReader>>,
}

impl ChainRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers a reader. Fails if its chain is already registered.
	pub fn register(&mut self, reader: Arc<dyn ChainReader>) -> Result<(), ChainError> {
		let chain_id = reader.chain_id();
		if self.readers.contains_key(&chain_id) {
			return Err(ChainError::InvalidConfig(format!(
				"Chain {} already registered",
				chain_id
			)));
		}

		info!(chain_id, "Registered chain reader");
		self.readers.insert(chain_id, reader);
		Ok(())
	}

	pub fn get(&self, chain_id: u64) -> Option<Arc<dyn ChainReader>> {
		self.readers.get(&chain_id).cloned()
	}

	/// Like [`get`](Self::get) but reports unknown chains as an error.
	pub fn get_required(&self, chain_id: u64) -> Result<Arc<dyn ChainReader>, ChainError> {
		self.get(chain_id)
			.ok_or(ChainError::UnsupportedChain(chain_id))
	}

	/// Registered chain ids in ascending order.
	pub fn chains(&self) -> Vec<u64> {
		let mut chains: Vec<u64> = self.readers.keys().copied().collect();
		chains.sort_unstable();
		chains
	}

	/// Builds a registry with an HTTP reader per configured chain.
	pub fn from_config<'a, I>(chains: I) -> Result<Self, ChainError>
	where
		I: IntoIterator<Item = (u64, &'a toml::Value)>,
	{
		let mut registry = Self::new();
		for (chain_id, config) in chains {
			registry.register(create_chain_reader(chain_id, config)?)?;
		}
		Ok(registry)
	}
}
