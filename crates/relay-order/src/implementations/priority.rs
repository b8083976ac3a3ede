//! Priority orders.
//!
//! A priority order's amounts are scaled by the priority fee paid at the
//! auction target block. The swapper signs the order without the target
//! block; a cosigner later attests to the target block by signing
//! [`PriorityOrder::cosignature_hash`]. Only the cosigned order is fillable.

use alloy_primitives::{Address, Bytes, B256, U256};
use relay_types::{
	CosignerData, CosignerDataResponse, GetPriorityOrderResponse, OrderEntity, OrderStatus,
	OrderType, PriorityOrderEntity, PriorityOrderInput, PriorityOrderInputResponse,
	PriorityOrderOutput, PriorityOrderOutputResponse, Signature,
};
use tracing::debug;

use crate::sdk::{self, lower_address, PriorityCosignerData};
use crate::{OrderError, OrderInterface, OrderMetadata};

/// Position of an order in the cosigning protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CosignState {
	/// No target block and no cosignature.
	Uncosigned,
	/// A target block is present but nothing attests to it.
	TargetAssigned,
	/// A cosignature is present, whatever the target block, including 0.
	Cosigned,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityOrder {
	inner: sdk::PriorityOrder,
	signature: String,
	chain_id: u64,
	pub metadata: OrderMetadata,
}

fn decode_error(chain_id: u64, reason: impl Into<String>) -> OrderError {
	OrderError::Decode {
		order_type: OrderType::Priority,
		chain_id,
		reason: reason.into(),
	}
}

/// Block numbers and deadlines are exposed as u64; reject anything wider.
fn check_bounds(inner: &sdk::PriorityOrder, chain_id: u64) -> Result<(), OrderError> {
	let fields = [
		("deadline", inner.info.deadline),
		("auctionStartBlock", inner.auctionStartBlock),
		(
			"cosignerData.auctionTargetBlock",
			inner.cosignerData.auctionTargetBlock,
		),
	];
	for (field, value) in fields {
		if u64::try_from(value).is_err() {
			return Err(decode_error(
				chain_id,
				format!("{} {} does not fit in 64 bits", field, value),
			));
		}
	}
	Ok(())
}

fn as_u64(value: U256) -> u64 {
	u64::try_from(value).unwrap_or(u64::MAX)
}

impl PriorityOrder {
	/// Wraps a decoded order. Fails if a block number or deadline is out of range.
	pub fn new(
		inner: sdk::PriorityOrder,
		signature: impl Into<String>,
		chain_id: u64,
	) -> Result<Self, OrderError> {
		check_bounds(&inner, chain_id)?;
		Ok(Self {
			inner,
			signature: signature.into(),
			chain_id,
			metadata: OrderMetadata::default(),
		})
	}

	/// Decodes an encoded priority order for `chain_id`.
	pub fn parse(encoded_order: &str, signature: &str, chain_id: u64) -> Result<Self, OrderError> {
		let inner = sdk::decode_canonical::<sdk::PriorityOrder>(encoded_order)
			.map_err(|e| decode_error(chain_id, e.to_string()))?;
		Self::new(inner, signature, chain_id)
	}

	pub fn with_metadata(mut self, metadata: OrderMetadata) -> Self {
		self.metadata = metadata;
		self
	}

	pub fn inner(&self) -> &sdk::PriorityOrder {
		&self.inner
	}

	pub fn swapper(&self) -> Address {
		self.inner.info.swapper
	}

	pub fn cosigner(&self) -> Address {
		self.inner.cosigner
	}

	pub fn deadline(&self) -> u64 {
		as_u64(self.inner.info.deadline)
	}

	pub fn auction_start_block(&self) -> u64 {
		as_u64(self.inner.auctionStartBlock)
	}

	pub fn cosigner_data(&self) -> CosignerData {
		CosignerData {
			auction_target_block: as_u64(self.inner.cosignerData.auctionTargetBlock),
		}
	}

	/// Hex cosignature, empty until the order is cosigned.
	pub fn cosignature(&self) -> String {
		if self.inner.cosignature.is_empty() {
			String::new()
		} else {
			sdk::encode_hex(&self.inner.cosignature)
		}
	}

	pub fn cosign_state(&self) -> CosignState {
		if !self.inner.cosignature.is_empty() {
			CosignState::Cosigned
		} else if self.inner.cosignerData.auctionTargetBlock.is_zero() {
			CosignState::Uncosigned
		} else {
			CosignState::TargetAssigned
		}
	}

	/// Only cosigned orders can be filled by the reactor.
	pub fn is_fillable(&self) -> bool {
		self.cosign_state() == CosignState::Cosigned
	}

	/// Digest the cosigner signs for the given auction parameters.
	pub fn cosignature_hash(&self, cosigner_data: &CosignerData) -> B256 {
		let data = PriorityCosignerData {
			auctionTargetBlock: U256::from(cosigner_data.auction_target_block),
		};
		sdk::cosignature_hash(self.hash(), self.chain_id, &data)
	}

	/// Replaces cosigner data and cosignature together.
	///
	/// The caller is responsible for `cosignature` being a signature over
	/// `cosignature_hash(&cosigner_data)`.
	pub fn apply_cosignature(
		&mut self,
		cosigner_data: CosignerData,
		cosignature: &Signature,
	) -> Result<(), OrderError> {
		let auction_start_block = self.auction_start_block();
		if cosigner_data.auction_target_block < auction_start_block {
			return Err(OrderError::InvalidTargetBlock {
				order_hash: self.order_hash(),
				target_block: cosigner_data.auction_target_block,
				auction_start_block,
			});
		}

		self.inner.cosignerData = PriorityCosignerData {
			auctionTargetBlock: U256::from(cosigner_data.auction_target_block),
		};
		self.inner.cosignature = Bytes::from(cosignature.0.clone());

		debug!(
			order_hash = %self.order_hash(),
			target_block = cosigner_data.auction_target_block,
			"Attached cosignature"
		);
		Ok(())
	}

	/// Read-only projection to the API response.
	pub fn to_get_response(&self) -> GetPriorityOrderResponse {
		let info = &self.inner.info;
		let input = &self.inner.input;

		GetPriorityOrderResponse {
			order_type: OrderType::Priority,
			order_status: self.metadata.status,
			signature: self.signature.clone(),
			encoded_order: self.serialize(),
			chain_id: self.chain_id,
			nonce: info.nonce.to_string(),
			tx_hash: self.metadata.tx_hash.clone(),
			order_hash: self.order_hash(),
			swapper: info.swapper.to_checksum(None),
			reactor: info.reactor.to_checksum(None),
			deadline: self.deadline(),
			auction_start_block: self.auction_start_block(),
			baseline_priority_fee_wei: self.inner.baselinePriorityFeeWei.to_string(),
			input: PriorityOrderInputResponse {
				token: input.token.to_checksum(None),
				amount: input.amount.to_string(),
				mps_per_priority_fee_wei: input.mpsPerPriorityFeeWei.to_string(),
			},
			outputs: self
				.inner
				.outputs
				.iter()
				.map(|output| PriorityOrderOutputResponse {
					token: output.token.to_checksum(None),
					amount: output.amount.to_string(),
					mps_per_priority_fee_wei: output.mpsPerPriorityFeeWei.to_string(),
					recipient: output.recipient.to_checksum(None),
				})
				.collect(),
			cosigner_data: CosignerDataResponse {
				auction_target_block: self.cosigner_data().auction_target_block,
			},
			cosignature: self.cosignature(),
			quote_id: self.metadata.quote_id.clone(),
			request_id: self.metadata.request_id.clone(),
			created_at: self.metadata.created_at,
		}
	}
}

impl OrderInterface for PriorityOrder {
	type Entity = PriorityOrderEntity;

	fn order_type(&self) -> OrderType {
		OrderType::Priority
	}

	fn chain_id(&self) -> u64 {
		self.chain_id
	}

	fn signature(&self) -> &str {
		&self.signature
	}

	fn serialize(&self) -> String {
		use alloy_sol_types::SolValue;
		sdk::encode_hex(self.inner.abi_encode())
	}

	fn hash(&self) -> B256 {
		self.inner.order_hash()
	}

	fn to_entity(&self, status: OrderStatus) -> Result<PriorityOrderEntity, OrderError> {
		let order_hash = self.order_hash();
		let missing = |field: &str| OrderError::Conversion {
			order_hash: order_hash.clone(),
			field: field.to_string(),
		};

		if self.signature.is_empty() {
			return Err(missing("signature"));
		}
		if self.inner.outputs.is_empty() {
			return Err(missing("outputs"));
		}

		let info = &self.inner.info;
		let input = &self.inner.input;

		Ok(PriorityOrderEntity {
			order: OrderEntity {
				order_type: OrderType::Priority,
				encoded_order: self.serialize(),
				signature: self.signature.clone(),
				nonce: info.nonce.to_string(),
				order_hash: order_hash.clone(),
				chain_id: self.chain_id,
				order_status: status,
				offerer: lower_address(&info.swapper),
				reactor: lower_address(&info.reactor),
				filler: String::new(),
				deadline: self.deadline(),
				tx_hash: self.metadata.tx_hash.clone(),
				quote_id: self.metadata.quote_id.clone(),
				request_id: self.metadata.request_id.clone(),
				created_at: self.metadata.created_at,
			},
			cosigner: lower_address(&self.inner.cosigner),
			auction_start_block: self.auction_start_block(),
			baseline_priority_fee_wei: self.inner.baselinePriorityFeeWei.to_string(),
			input: PriorityOrderInput {
				token: lower_address(&input.token),
				amount: input.amount.to_string(),
				mps_per_priority_fee_wei: input.mpsPerPriorityFeeWei.to_string(),
			},
			outputs: self
				.inner
				.outputs
				.iter()
				.map(|output| PriorityOrderOutput {
					token: lower_address(&output.token),
					amount: output.amount.to_string(),
					mps_per_priority_fee_wei: output.mpsPerPriorityFeeWei.to_string(),
					recipient: lower_address(&output.recipient),
				})
				.collect(),
			cosigner_data: self.cosigner_data(),
			cosignature: self.cosignature(),
		})
	}

	fn from_entity(entity: &PriorityOrderEntity) -> Result<Self, OrderError> {
		let chain_id = entity.order.chain_id;
		if entity.order.order_type != OrderType::Priority {
			return Err(decode_error(
				chain_id,
				format!("entity is declared as {}", entity.order.order_type),
			));
		}

		let order = Self::parse(&entity.order.encoded_order, &entity.order.signature, chain_id)?
			.with_metadata(OrderMetadata::from_entity(&entity.order));

		let order_hash = order.order_hash();
		if !order_hash.eq_ignore_ascii_case(&entity.order.order_hash) {
			return Err(decode_error(
				chain_id,
				format!(
					"stored order hash {} does not match decoded hash {}",
					entity.order.order_hash, order_hash
				),
			));
		}

		if order.cosigner_data() != entity.cosigner_data
			|| !order.cosignature().eq_ignore_ascii_case(&entity.cosignature)
		{
			return Err(decode_error(
				chain_id,
				format!("cosigner fields of {} disagree with the encoded order", order_hash),
			));
		}

		Ok(order)
	}
}
