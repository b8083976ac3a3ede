//! Orders and collaborator fakes shared by the unit tests.

use alloy_primitives::{address, Address, Bytes, B256, U256};
use async_trait::async_trait;
use relay_account::{AccountError, CosignerInterface, LocalCosigner};
use relay_chain::{ChainError, ChainReader};
use relay_order::sdk::{self, PriorityCosignerData};
use relay_order::{DecayOrder, OrderInterface, PriorityOrder};
use relay_types::{ConfigSchema, OrderType, Signature, ValidationError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

pub const CHAIN_ID: u64 = 8453;

const DEV_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

pub fn cosigner_address() -> Address {
	address!("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
}

fn order_info(nonce: u64) -> sdk::OrderInfo {
	sdk::OrderInfo {
		reactor: address!("000000001Ec5656dcdB24D90DFa42742738De729"),
		swapper: address!("6000dA47483062A0D734Ba3dc7576Ce6A0B645C4"),
		nonce: U256::from(nonce),
		deadline: U256::from(1_700_000_000u64),
		additionalValidationContract: Address::ZERO,
		additionalValidationData: Bytes::new(),
	}
}

pub fn sdk_priority_order(auction_start_block: u64, nonce: u64) -> sdk::PriorityOrder {
	sdk::PriorityOrder {
		info: order_info(nonce),
		cosigner: cosigner_address(),
		auctionStartBlock: U256::from(auction_start_block),
		baselinePriorityFeeWei: U256::ZERO,
		input: sdk::PriorityInput {
			token: address!("4200000000000000000000000000000000000006"),
			amount: U256::from(10u64).pow(U256::from(18u64)),
			mpsPerPriorityFeeWei: U256::ZERO,
		},
		outputs: vec![sdk::PriorityOutput {
			token: address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
			amount: U256::from(2_500_000_000u64),
			mpsPerPriorityFeeWei: U256::from(1u64),
			recipient: address!("6000dA47483062A0D734Ba3dc7576Ce6A0B645C4"),
		}],
		cosignerData: PriorityCosignerData {
			auctionTargetBlock: U256::ZERO,
		},
		cosignature: Bytes::new(),
	}
}

pub fn priority_order(auction_start_block: u64) -> PriorityOrder {
	PriorityOrder::new(
		sdk_priority_order(auction_start_block, 1),
		"0xswappersig",
		CHAIN_ID,
	)
	.unwrap()
}

pub fn encoded_priority_order(auction_start_block: u64, nonce: u64) -> String {
	PriorityOrder::new(
		sdk_priority_order(auction_start_block, nonce),
		"0xswappersig",
		CHAIN_ID,
	)
	.unwrap()
	.serialize()
}

pub fn encoded_dutch_order() -> String {
	let inner = sdk::DutchOrder {
		info: order_info(7),
		decayStartTime: U256::from(1_699_999_000u64),
		decayEndTime: U256::from(1_699_999_600u64),
		exclusiveFiller: Address::ZERO,
		exclusivityOverrideBps: U256::ZERO,
		input: sdk::DutchInput {
			token: address!("4200000000000000000000000000000000000006"),
			startAmount: U256::from(1_000u64),
			endAmount: U256::from(1_000u64),
		},
		outputs: vec![sdk::DutchOutput {
			token: address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"),
			startAmount: U256::from(2_000u64),
			endAmount: U256::from(1_900u64),
			recipient: address!("6000dA47483062A0D734Ba3dc7576Ce6A0B645C4"),
		}],
	};
	DecayOrder::new(inner, OrderType::Dutch, "0xswappersig", CHAIN_ID)
		.unwrap()
		.serialize()
}

struct AnySettings;

impl ConfigSchema for AnySettings {
	fn validate(&self, _config: &toml::Value) -> Result<(), ValidationError> {
		Ok(())
	}
}

/// Chain reader that answers from a script, one entry per call.
///
/// `Err` entries become network errors. An exhausted script keeps failing.
pub struct ScriptedChain {
	chain_id: u64,
	script: Mutex<VecDeque<Result<u64, String>>>,
	calls: AtomicUsize,
	gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl ScriptedChain {
	pub fn new(chain_id: u64, script: Vec<Result<u64, String>>) -> Self {
		Self {
			chain_id,
			script: Mutex::new(script.into()),
			calls: AtomicUsize::new(0),
			gate: None,
		}
	}

	/// Every read first signals `entered`, then waits for `release`.
	pub fn gated(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
		self.gate = Some((entered, release));
		self
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl ChainReader for ScriptedChain {
	fn chain_id(&self) -> u64 {
		self.chain_id
	}

	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(AnySettings)
	}

	async fn current_height(&self) -> Result<u64, ChainError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if let Some((entered, release)) = &self.gate {
			entered.notify_one();
			release.notified().await;
		}

		let next = self.script.lock().unwrap().pop_front();
		match next {
			Some(Ok(height)) => Ok(height),
			Some(Err(message)) => Err(ChainError::Network {
				chain_id: self.chain_id,
				message,
			}),
			None => Err(ChainError::Network {
				chain_id: self.chain_id,
				message: "script exhausted".to_string(),
			}),
		}
	}
}

/// Local cosigner that fails a configurable number of times first.
pub struct FlakyCosigner {
	inner: LocalCosigner,
	failures_left: AtomicUsize,
	permanent: bool,
	calls: AtomicUsize,
}

impl FlakyCosigner {
	fn with(failures: usize, permanent: bool) -> Self {
		Self {
			inner: LocalCosigner::new(DEV_KEY).unwrap(),
			failures_left: AtomicUsize::new(failures),
			permanent,
			calls: AtomicUsize::new(0),
		}
	}

	pub fn reliable() -> Self {
		Self::with(0, false)
	}

	/// Fails the first `failures` signatures with a transient error.
	pub fn failing(failures: usize) -> Self {
		Self::with(failures, false)
	}

	/// Never signs.
	pub fn broken() -> Self {
		Self::with(0, true)
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

#[async_trait]
impl CosignerInterface for FlakyCosigner {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		self.inner.config_schema()
	}

	async fn address(&self) -> Result<Address, AccountError> {
		Ok(self.inner.address())
	}

	async fn sign_digest(&self, digest: &B256) -> Result<Signature, AccountError> {
		self.calls.fetch_add(1, Ordering::SeqCst);
		if self.permanent {
			return Err(AccountError::InvalidKey("key revoked".to_string()));
		}
		let remaining = self.failures_left.load(Ordering::SeqCst);
		if remaining > 0 {
			self.failures_left.store(remaining - 1, Ordering::SeqCst);
			return Err(AccountError::SigningFailed("signer unavailable".to_string()));
		}
		CosignerInterface::sign_digest(&self.inner, digest).await
	}
}
