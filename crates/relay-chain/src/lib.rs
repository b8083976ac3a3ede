//! Chain access for the relay.
//!
//! The relay only needs one thing from a chain: its current block height,
//! which anchors the auction target block of a priority order. Readers are
//! registered per chain id in a [`ChainRegistry`].

use async_trait::async_trait;
use relay_types::ConfigSchema;
use thiserror::Error;

pub mod registry;

/// Re-export implementations
pub mod implementations {
	pub mod alloy;
}

pub use registry::ChainRegistry;

/// Errors that can occur while reading chain state.
#[derive(Debug, Error)]
pub enum ChainError {
	/// The node could not be reached or returned an error.
	#[error("Network error on chain {chain_id}: {message}")]
	Network { chain_id: u64, message: String },
	/// No reader is registered for the chain.
	#[error("Chain {0} is not configured")]
	UnsupportedChain(u64),
	/// The reader configuration is unusable.
	#[error("Invalid chain configuration: {0}")]
	InvalidConfig(String),
}

impl ChainError {
	/// Network failures are transient; everything else needs operator action.
	pub fn is_retryable(&self) -> bool {
		matches!(self, ChainError::Network { .. })
	}
}

/// Read access to one chain.
#[async_trait]
pub trait ChainReader: Send + Sync {
	/// Chain this reader is connected to.
	fn chain_id(&self) -> u64;

	/// Schema of the configuration table this reader is built from.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Latest block number known to the node.
	async fn current_height(&self) -> Result<u64, ChainError>;
}
