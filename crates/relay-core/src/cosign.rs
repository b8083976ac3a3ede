//! Cosign workflow for priority orders.
//!
//! The workflow reads the current height of the order's chain, picks an
//! auction target block a few blocks ahead, and asks the cosigner to sign
//! the resulting cosigner data. The order is only touched once the
//! signature is in hand, so every failure leaves it exactly as it was.

use relay_account::{AccountError, CosignerInterface};
use relay_chain::{ChainError, ChainReader};
use relay_config::CosignSettings;
use relay_order::{OrderError, OrderInterface, PriorityOrder};
use relay_types::CosignerData;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// Parameters of the cosign workflow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CosignConfig {
	/// Blocks added to the current height to get the auction target block.
	pub target_block_buffer: u64,
	/// Upper bound on time spent retrying transient failures.
	pub max_retry_elapsed: Duration,
	/// First delay between retries; later delays grow exponentially.
	pub initial_retry_interval: Duration,
}

impl Default for CosignConfig {
	fn default() -> Self {
		Self {
			target_block_buffer: 3,
			max_retry_elapsed: Duration::from_secs(30),
			initial_retry_interval: Duration::from_millis(500),
		}
	}
}

impl From<&CosignSettings> for CosignConfig {
	fn from(settings: &CosignSettings) -> Self {
		Self {
			target_block_buffer: settings.target_block_buffer,
			max_retry_elapsed: Duration::from_secs(settings.max_retry_elapsed_secs),
			..Default::default()
		}
	}
}

/// Errors that abort one run of the cosign workflow.
#[derive(Debug, Error)]
pub enum CosignError {
	#[error("Failed to read height of chain {chain_id} for order {order_hash}: {source}")]
	ChainRead {
		order_hash: String,
		chain_id: u64,
		#[source]
		source: ChainError,
	},

	#[error("Failed to sign cosigner data for order {order_hash} on chain {chain_id}: {source}")]
	Signing {
		order_hash: String,
		chain_id: u64,
		#[source]
		source: AccountError,
	},

	#[error(transparent)]
	Order(#[from] OrderError),
}

impl CosignError {
	/// Whether running the whole workflow again may succeed.
	pub fn is_retryable(&self) -> bool {
		match self {
			CosignError::ChainRead { source, .. } => source.is_retryable(),
			CosignError::Signing { source, .. } => source.is_retryable(),
			CosignError::Order(_) => false,
		}
	}
}

/// Auction target block for a chain at `height`.
///
/// Never earlier than the auction start block, and saturates instead of
/// wrapping near `u64::MAX`.
pub fn target_block(height: u64, auction_start_block: u64, buffer: u64) -> u64 {
	height.saturating_add(buffer).max(auction_start_block)
}

/// Assigns a fresh auction target block to `order` and cosigns it.
///
/// Runs to completion or leaves `order` unmodified. Calling it again on an
/// already cosigned order re-prices it against the then current height.
pub async fn reparameterize_and_cosign(
	order: &mut PriorityOrder,
	chain: &dyn ChainReader,
	cosigner: &dyn CosignerInterface,
	config: &CosignConfig,
) -> Result<CosignerData, CosignError> {
	let order_hash = order.order_hash();
	let chain_id = order.chain_id();

	if chain.chain_id() != chain_id {
		return Err(CosignError::ChainRead {
			order_hash,
			chain_id,
			source: ChainError::UnsupportedChain(chain_id),
		});
	}

	let height = chain
		.current_height()
		.await
		.map_err(|source| CosignError::ChainRead {
			order_hash: order_hash.clone(),
			chain_id,
			source,
		})?;

	let cosigner_data = CosignerData {
		auction_target_block: target_block(
			height,
			order.auction_start_block(),
			config.target_block_buffer,
		),
	};
	debug!(
		%order_hash,
		chain_id,
		height,
		target_block = cosigner_data.auction_target_block,
		"Assigned auction target block"
	);

	let digest = order.cosignature_hash(&cosigner_data);
	let cosignature =
		cosigner
			.sign_digest(&digest)
			.await
			.map_err(|source| CosignError::Signing {
				order_hash: order_hash.clone(),
				chain_id,
				source,
			})?;

	order.apply_cosignature(cosigner_data, &cosignature)?;

	info!(
		%order_hash,
		chain_id,
		target_block = cosigner_data.auction_target_block,
		"Cosigned priority order"
	);
	Ok(cosigner_data)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::test_support::{
		cosigner_address, priority_order, FlakyCosigner, ScriptedChain, CHAIN_ID,
	};
	use relay_order::CosignState;

	fn config(buffer: u64) -> CosignConfig {
		CosignConfig {
			target_block_buffer: buffer,
			..Default::default()
		}
	}

	#[test]
	fn test_target_block() {
		assert_eq!(target_block(1050, 1000, 5), 1055);
		assert_eq!(target_block(990, 1000, 5), 1000);
		assert_eq!(target_block(1000, 1000, 0), 1000);
		assert_eq!(target_block(u64::MAX - 1, 0, 5), u64::MAX);
	}

	#[tokio::test]
	async fn test_cosigns_at_height_plus_buffer() {
		let mut order = priority_order(1000);
		let chain = ScriptedChain::new(CHAIN_ID, vec![Ok(1050)]);
		let cosigner = FlakyCosigner::reliable();

		let data = reparameterize_and_cosign(&mut order, &chain, &cosigner, &config(5))
			.await
			.unwrap();

		assert_eq!(data.auction_target_block, 1055);
		assert_eq!(order.cosigner_data(), data);
		assert_eq!(order.cosign_state(), CosignState::Cosigned);

		let signature = relay_types::Signature(
			relay_order::sdk::decode_hex(&order.cosignature()).unwrap(),
		);
		let digest = order.cosignature_hash(&CosignerData {
			auction_target_block: 1055,
		});
		assert_eq!(signature.recover_address(&digest), Some(cosigner_address()));
	}

	#[tokio::test]
	async fn test_target_is_clamped_to_auction_start() {
		let mut order = priority_order(1000);
		let chain = ScriptedChain::new(CHAIN_ID, vec![Ok(900)]);

		let data = reparameterize_and_cosign(
			&mut order,
			&chain,
			&FlakyCosigner::reliable(),
			&config(5),
		)
		.await
		.unwrap();

		assert_eq!(data.auction_target_block, 1000);
	}

	#[tokio::test]
	async fn test_buffer_comes_from_config() {
		for buffer in [0, 1, 12] {
			let mut order = priority_order(1000);
			let chain = ScriptedChain::new(CHAIN_ID, vec![Ok(2000)]);

			let data = reparameterize_and_cosign(
				&mut order,
				&chain,
				&FlakyCosigner::reliable(),
				&config(buffer),
			)
			.await
			.unwrap();

			assert_eq!(data.auction_target_block, 2000 + buffer);
		}
	}

	#[tokio::test]
	async fn test_chain_failure_leaves_order_untouched() {
		let mut order = priority_order(1000);
		let before = order.clone();
		let chain = ScriptedChain::new(CHAIN_ID, vec![Err("connection refused".to_string())]);
		let cosigner = FlakyCosigner::reliable();

		let err = reparameterize_and_cosign(&mut order, &chain, &cosigner, &config(5))
			.await
			.unwrap_err();

		assert!(matches!(
			&err,
			CosignError::ChainRead { chain_id, .. } if *chain_id == CHAIN_ID
		));
		assert!(err.is_retryable());
		assert_eq!(order, before);
		assert_eq!(cosigner.calls(), 0);
	}

	#[tokio::test]
	async fn test_signing_failure_then_reinvoke_reprices() {
		let mut order = priority_order(1000);
		let before = order.clone();
		let chain = ScriptedChain::new(CHAIN_ID, vec![Ok(1050), Ok(1060)]);
		let cosigner = FlakyCosigner::failing(1);

		let err = reparameterize_and_cosign(&mut order, &chain, &cosigner, &config(5))
			.await
			.unwrap_err();
		assert!(matches!(err, CosignError::Signing { .. }));
		assert!(err.is_retryable());
		assert_eq!(order, before);

		let data = reparameterize_and_cosign(&mut order, &chain, &cosigner, &config(5))
			.await
			.unwrap();
		assert_eq!(data.auction_target_block, 1065);
		assert_eq!(chain.calls(), 2);
	}

	#[tokio::test]
	async fn test_recosign_replaces_both_fields() {
		let mut order = priority_order(1000);
		let chain = ScriptedChain::new(CHAIN_ID, vec![Ok(1050), Ok(1100)]);
		let cosigner = FlakyCosigner::reliable();
		let hash = order.order_hash();

		reparameterize_and_cosign(&mut order, &chain, &cosigner, &config(5))
			.await
			.unwrap();
		let first = order.cosignature();

		reparameterize_and_cosign(&mut order, &chain, &cosigner, &config(5))
			.await
			.unwrap();

		assert_eq!(order.cosigner_data().auction_target_block, 1105);
		assert_ne!(order.cosignature(), first);
		assert_eq!(order.order_hash(), hash);
	}

	#[tokio::test]
	async fn test_permanent_signing_failure_is_not_retryable() {
		let mut order = priority_order(1000);
		let chain = ScriptedChain::new(CHAIN_ID, vec![Ok(1050)]);

		let err = reparameterize_and_cosign(
			&mut order,
			&chain,
			&FlakyCosigner::broken(),
			&config(5),
		)
		.await
		.unwrap_err();

		assert!(!err.is_retryable());
	}

	#[tokio::test]
	async fn test_rejects_reader_for_other_chain() {
		let mut order = priority_order(1000);
		let chain = ScriptedChain::new(1, vec![Ok(1050)]);

		let err = reparameterize_and_cosign(
			&mut order,
			&chain,
			&FlakyCosigner::reliable(),
			&config(5),
		)
		.await
		.unwrap_err();

		assert!(matches!(
			err,
			CosignError::ChainRead {
				source: ChainError::UnsupportedChain(CHAIN_ID),
				..
			}
		));
		assert_eq!(chain.calls(), 0);
	}

	#[test]
	fn test_config_from_settings() {
		let settings = CosignSettings {
			target_block_buffer: 7,
			max_retry_elapsed_secs: 0,
		};
		let config = CosignConfig::from(&settings);

		assert_eq!(config.target_block_buffer, 7);
		assert_eq!(config.max_retry_elapsed, Duration::ZERO);
	}
}
