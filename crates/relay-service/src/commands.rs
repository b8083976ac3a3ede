//! Command handlers. Each returns the value printed as JSON.

use crate::cli::SubmitArgs;
use anyhow::{Context, Result};
use relay_config::RelayConfig;
use relay_core::{OrderRelay, OrderSubmission};
use relay_types::{OrderResponse, OrderType};
use serde::Serialize;
use tracing::info;

/// What a valid configuration resolves to.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
	pub name: String,
	pub cosigner: String,
	pub chains: Vec<u64>,
	pub storage_backend: String,
	pub target_block_buffer: u64,
}

pub async fn validate(relay: &OrderRelay, config: &RelayConfig) -> Result<ConfigSummary> {
	let cosigner = relay
		.cosigner_address()
		.await
		.context("Failed to resolve cosigner address")?;

	info!("Configuration is valid");
	Ok(ConfigSummary {
		name: config.relay.name.clone(),
		cosigner,
		chains: relay.chains(),
		storage_backend: config.storage.backend.clone(),
		target_block_buffer: relay.cosign_config().target_block_buffer,
	})
}

/// Stores the order and, for priority orders, cosigns it unless told not to.
pub async fn submit(relay: &OrderRelay, args: SubmitArgs) -> Result<OrderResponse> {
	let order_type = OrderType::from(args.order_type);
	let response = relay
		.submit_order(OrderSubmission {
			order_type,
			encoded_order: args.encoded_order,
			signature: args.signature,
			chain_id: args.chain_id,
			quote_id: args.quote_id,
			request_id: args.request_id,
		})
		.await
		.context("Failed to submit order")?;

	if order_type != OrderType::Priority || args.no_cosign {
		return Ok(response);
	}

	cosign(relay, response.order_hash()).await
}

pub async fn cosign(relay: &OrderRelay, order_hash: &str) -> Result<OrderResponse> {
	relay
		.cosign_order(order_hash)
		.await
		.with_context(|| format!("Failed to cosign order {}", order_hash))
}

pub async fn get(relay: &OrderRelay, order_hash: &str) -> Result<OrderResponse> {
	relay
		.get_order(order_hash)
		.await
		.with_context(|| format!("Failed to load order {}", order_hash))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::cli::CliOrderType;
	use alloy_primitives::{address, Address, Bytes, U256};
	use relay_config::ConfigLoader;
	use relay_order::{sdk, OrderInterface, PriorityOrder};

	const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

	fn config(storage_path: &std::path::Path) -> RelayConfig {
		let content = format!(
			r#"
[relay]
name = "cli-test"

[cosign]
max_retry_elapsed_secs = 0

[cosigner]
private_key = "{}"

[chains.8453]
rpc_url = "http://127.0.0.1:9"

[storage]
backend = "file"
storage_path = "{}"
"#,
			DEV_KEY,
			storage_path.display()
		);
		ConfigLoader::new()
			.with_env_prefix("RELAY_SERVICE_TEST_")
			.parse_str(&content)
			.unwrap()
	}

	fn encoded_priority_order() -> String {
		let inner = sdk::PriorityOrder {
			info: sdk::OrderInfo {
				reactor: address!("000000001Ec5656dcdB24D90DFa42742738De729"),
				swapper: address!("6000dA47483062A0D734Ba3dc7576Ce6A0B645C4"),
				nonce: U256::from(42u64),
				deadline: U256::from(1_700_000_000u64),
				additionalValidationContract: Address::ZERO,
				additionalValidationData: Bytes::new(),
			},
			cosigner: address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266"),
			auctionStartBlock: U256::from(1000u64),
			baselinePriorityFeeWei: U256::ZERO,
			input: sdk::PriorityInput {
				token: address!("4200000000000000000000000000000000000006"),
				amount: U256::from(1_000_000u64),
				mpsPerPriorityFeeWei: U256::ZERO,
			},
			outputs: vec![sdk::PriorityOutput {
				token: address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
				amount: U256::from(2_500u64),
				mpsPerPriorityFeeWei: U256::from(1u64),
				recipient: address!("6000dA47483062A0D734Ba3dc7576Ce6A0B645C4"),
			}],
			cosignerData: sdk::PriorityCosignerData {
				auctionTargetBlock: U256::ZERO,
			},
			cosignature: Bytes::new(),
		};
		PriorityOrder::new(inner, "0xswappersig", 8453)
			.unwrap()
			.serialize()
	}

	fn submit_args(no_cosign: bool) -> SubmitArgs {
		SubmitArgs {
			order_type: CliOrderType::Priority,
			encoded_order: encoded_priority_order(),
			signature: "0xswappersig".to_string(),
			chain_id: 8453,
			quote_id: None,
			request_id: Some("req-1".to_string()),
			no_cosign,
		}
	}

	#[tokio::test]
	async fn test_validate_summary() {
		let dir = tempfile::tempdir().unwrap();
		let config = config(dir.path());
		let relay = OrderRelay::from_config(&config).unwrap();

		let summary = validate(&relay, &config).await.unwrap();
		assert_eq!(summary.name, "cli-test");
		assert_eq!(summary.cosigner, "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
		assert_eq!(summary.chains, vec![8453]);
		assert_eq!(summary.storage_backend, "file");
		assert_eq!(summary.target_block_buffer, 3);
	}

	#[tokio::test]
	async fn test_submitted_order_survives_restart() {
		let dir = tempfile::tempdir().unwrap();
		let config = config(dir.path());

		let submitted = {
			let relay = OrderRelay::from_config(&config).unwrap();
			submit(&relay, submit_args(true)).await.unwrap()
		};

		let relay = OrderRelay::from_config(&config).unwrap();
		let fetched = get(&relay, submitted.order_hash()).await.unwrap();
		assert_eq!(fetched, submitted);

		let json = serde_json::to_value(&fetched).unwrap();
		assert_eq!(json["type"], "Priority");
		assert_eq!(json["requestId"], "req-1");
		assert!(json.get("quoteId").is_none());
	}

	#[tokio::test]
	async fn test_cosign_failure_keeps_order_uncosigned() {
		let dir = tempfile::tempdir().unwrap();
		let config = config(dir.path());
		let relay = OrderRelay::from_config(&config).unwrap();

		// Nothing listens on the configured node
		let err = submit(&relay, submit_args(false)).await.unwrap_err();
		assert!(err.to_string().contains("Failed to cosign order"));

		let hash = PriorityOrder::parse(&encoded_priority_order(), "0xswappersig", 8453)
			.unwrap()
			.order_hash();
		match get(&relay, &hash).await.unwrap() {
			OrderResponse::Priority(response) => {
				assert_eq!(response.cosigner_data.auction_target_block, 0);
				assert_eq!(response.cosignature, "");
			}
			OrderResponse::Decay(_) => panic!("expected a priority response"),
		}
	}
}
