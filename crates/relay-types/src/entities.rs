//! Order entity model.
//!
//! Entities are the storage and wire neutral form of an order. They hold no
//! behaviour beyond [`validate`](UniswapXOrderEntity::validate): numbers are
//! decimal strings, addresses are lower-cased `0x` strings, and the encoded
//! order is kept verbatim so it can be decoded again later.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::validation::{
	check_address, check_decimal, check_hash, check_optional_address, require, FieldError,
};

/// Discriminator for the order families the relay accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderType {
	/// Exclusive Dutch order whose amounts decay over a time window.
	Dutch,
	/// Decay order whose start and end amounts are equal.
	Limit,
	/// Order priced by a priority-fee auction at a cosigned target block.
	Priority,
}

impl OrderType {
	/// Whether orders of this type use the decay entity shape.
	pub fn is_decay(&self) -> bool {
		matches!(self, OrderType::Dutch | OrderType::Limit)
	}
}

impl fmt::Display for OrderType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			OrderType::Dutch => write!(f, "Dutch"),
			OrderType::Limit => write!(f, "Limit"),
			OrderType::Priority => write!(f, "Priority"),
		}
	}
}

/// Status tag of an order. Transitions are driven outside this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderStatus {
	Open,
	Filled,
	Cancelled,
	Expired,
	Error,
	InsufficientFunds,
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let tag = match self {
			OrderStatus::Open => "open",
			OrderStatus::Filled => "filled",
			OrderStatus::Cancelled => "cancelled",
			OrderStatus::Expired => "expired",
			OrderStatus::Error => "error",
			OrderStatus::InsufficientFunds => "insufficient-funds",
		};
		write!(f, "{}", tag)
	}
}

/// Fields shared by every order entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderEntity {
	#[serde(rename = "type")]
	pub order_type: OrderType,
	/// `0x` hex of the canonical ABI encoding of the order.
	pub encoded_order: String,
	/// Swapper signature over the encoded order.
	pub signature: String,
	/// Replay-protection nonce as a decimal string.
	pub nonce: String,
	/// Lower-case hash of the swapper-signed payload. Primary key.
	pub order_hash: String,
	pub chain_id: u64,
	pub order_status: OrderStatus,
	pub offerer: String,
	pub reactor: String,
	/// Exclusive filler. Empty means open to any filler.
	#[serde(default)]
	pub filler: String,
	pub deadline: u64,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tx_hash: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub quote_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub request_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at: Option<DateTime<Utc>>,
}

impl OrderEntity {
	/// Validates the shape of the common fields.
	pub fn validate(&self) -> Result<(), FieldError> {
		require("encodedOrder", &self.encoded_order)?;
		require("signature", &self.signature)?;
		check_decimal("nonce", &self.nonce)?;
		check_hash("orderHash", &self.order_hash)?;
		check_address("offerer", &self.offerer)?;
		check_address("reactor", &self.reactor)?;
		check_optional_address("filler", &self.filler)?;
		Ok(())
	}
}

/// Input side of a decay order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayOrderInput {
	pub token: String,
	pub start_amount: String,
	pub end_amount: String,
}

/// One output of a decay order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayOrderOutput {
	pub token: String,
	pub start_amount: String,
	pub end_amount: String,
	pub recipient: String,
}

/// Entity for Dutch and limit orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayOrderEntity {
	#[serde(flatten)]
	pub order: OrderEntity,
	pub decay_start_time: u64,
	pub decay_end_time: u64,
	pub input: DecayOrderInput,
	pub outputs: Vec<DecayOrderOutput>,
}

impl DecayOrderEntity {
	pub fn validate(&self) -> Result<(), FieldError> {
		self.order.validate()?;

		if !self.order.order_type.is_decay() {
			return Err(FieldError::Inconsistent {
				field: "type".to_string(),
				message: format!("{} is not a decay order type", self.order.order_type),
			});
		}

		if self.decay_start_time > self.decay_end_time {
			return Err(FieldError::Inconsistent {
				field: "decayStartTime".to_string(),
				message: format!(
					"decay starts at {} after it ends at {}",
					self.decay_start_time, self.decay_end_time
				),
			});
		}

		check_address("input.token", &self.input.token)?;
		check_decimal("input.startAmount", &self.input.start_amount)?;
		check_decimal("input.endAmount", &self.input.end_amount)?;

		if self.outputs.is_empty() {
			return Err(FieldError::Missing("outputs".to_string()));
		}
		for (i, output) in self.outputs.iter().enumerate() {
			check_address(&format!("outputs[{}].token", i), &output.token)?;
			check_decimal(&format!("outputs[{}].startAmount", i), &output.start_amount)?;
			check_decimal(&format!("outputs[{}].endAmount", i), &output.end_amount)?;
			check_address(&format!("outputs[{}].recipient", i), &output.recipient)?;
		}

		Ok(())
	}
}

/// Input side of a priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityOrderInput {
	pub token: String,
	pub amount: String,
	pub mps_per_priority_fee_wei: String,
}

/// One output of a priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityOrderOutput {
	pub token: String,
	pub amount: String,
	pub mps_per_priority_fee_wei: String,
	pub recipient: String,
}

/// Auction parameters attested by the cosigner.
///
/// Whether they are attested is decided by the presence of a cosignature;
/// block 0 is a valid target on a fresh chain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosignerData {
	pub auction_target_block: u64,
}

/// Entity for priority orders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityOrderEntity {
	#[serde(flatten)]
	pub order: OrderEntity,
	/// Address whose signature the reactor expects on the cosigner data.
	pub cosigner: String,
	pub auction_start_block: u64,
	pub baseline_priority_fee_wei: String,
	pub input: PriorityOrderInput,
	pub outputs: Vec<PriorityOrderOutput>,
	pub cosigner_data: CosignerData,
	/// Cosigner signature over `cosigner_data`. Empty until cosigned.
	#[serde(default)]
	pub cosignature: String,
}

impl PriorityOrderEntity {
	pub fn validate(&self) -> Result<(), FieldError> {
		self.order.validate()?;

		if self.order.order_type != OrderType::Priority {
			return Err(FieldError::Inconsistent {
				field: "type".to_string(),
				message: format!("{} is not a priority order type", self.order.order_type),
			});
		}

		check_address("cosigner", &self.cosigner)?;
		check_decimal("baselinePriorityFeeWei", &self.baseline_priority_fee_wei)?;

		check_address("input.token", &self.input.token)?;
		check_decimal("input.amount", &self.input.amount)?;
		check_decimal(
			"input.mpsPerPriorityFeeWei",
			&self.input.mps_per_priority_fee_wei,
		)?;

		if self.outputs.is_empty() {
			return Err(FieldError::Missing("outputs".to_string()));
		}
		for (i, output) in self.outputs.iter().enumerate() {
			check_address(&format!("outputs[{}].token", i), &output.token)?;
			check_decimal(&format!("outputs[{}].amount", i), &output.amount)?;
			check_decimal(
				&format!("outputs[{}].mpsPerPriorityFeeWei", i),
				&output.mps_per_priority_fee_wei,
			)?;
			check_address(&format!("outputs[{}].recipient", i), &output.recipient)?;
		}

		let target = self.cosigner_data.auction_target_block;
		let assigned = target != 0 || !self.cosignature.is_empty();
		if assigned && target < self.auction_start_block {
			return Err(FieldError::Inconsistent {
				field: "cosignerData.auctionTargetBlock".to_string(),
				message: format!(
					"target block {} is before auction start block {}",
					target, self.auction_start_block
				),
			});
		}

		Ok(())
	}
}

/// Closed set of entity shapes, tagged by order family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniswapXOrderEntity {
	Decay(DecayOrderEntity),
	Priority(PriorityOrderEntity),
}

impl UniswapXOrderEntity {
	/// Common fields of the wrapped entity.
	pub fn order(&self) -> &OrderEntity {
		match self {
			UniswapXOrderEntity::Decay(entity) => &entity.order,
			UniswapXOrderEntity::Priority(entity) => &entity.order,
		}
	}

	pub fn order_hash(&self) -> &str {
		&self.order().order_hash
	}

	pub fn chain_id(&self) -> u64 {
		self.order().chain_id
	}

	pub fn order_type(&self) -> OrderType {
		self.order().order_type
	}

	pub fn validate(&self) -> Result<(), FieldError> {
		match self {
			UniswapXOrderEntity::Decay(entity) => entity.validate(),
			UniswapXOrderEntity::Priority(entity) => entity.validate(),
		}
	}
}

impl From<DecayOrderEntity> for UniswapXOrderEntity {
	fn from(entity: DecayOrderEntity) -> Self {
		UniswapXOrderEntity::Decay(entity)
	}
}

impl From<PriorityOrderEntity> for UniswapXOrderEntity {
	fn from(entity: PriorityOrderEntity) -> Self {
		UniswapXOrderEntity::Priority(entity)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const SWAPPER: &str = "0x6000da47483062a0d734ba3dc7576ce6a0b645c4";
	const REACTOR: &str = "0x000000001ec5656dcdb24d90dfa42742738de729";
	const TOKEN: &str = "0x4200000000000000000000000000000000000006";

	fn common(order_type: OrderType) -> OrderEntity {
		OrderEntity {
			order_type,
			encoded_order: "0x00".to_string(),
			signature: "0x01".to_string(),
			nonce: "42".to_string(),
			order_hash: format!("0x{}", "1f".repeat(32)),
			chain_id: 8453,
			order_status: OrderStatus::Open,
			offerer: SWAPPER.to_string(),
			reactor: REACTOR.to_string(),
			filler: String::new(),
			deadline: 1_700_000_000,
			tx_hash: None,
			quote_id: None,
			request_id: None,
			created_at: None,
		}
	}

	fn priority_entity() -> PriorityOrderEntity {
		PriorityOrderEntity {
			order: common(OrderType::Priority),
			cosigner: SWAPPER.to_string(),
			auction_start_block: 1000,
			baseline_priority_fee_wei: "0".to_string(),
			input: PriorityOrderInput {
				token: TOKEN.to_string(),
				amount: "1000000000000000000".to_string(),
				mps_per_priority_fee_wei: "0".to_string(),
			},
			outputs: vec![PriorityOrderOutput {
				token: TOKEN.to_string(),
				amount: "123456789012345678901234567890123".to_string(),
				mps_per_priority_fee_wei: "1".to_string(),
				recipient: SWAPPER.to_string(),
			}],
			cosigner_data: CosignerData::default(),
			cosignature: String::new(),
		}
	}

	fn decay_entity() -> DecayOrderEntity {
		DecayOrderEntity {
			order: common(OrderType::Dutch),
			decay_start_time: 10,
			decay_end_time: 20,
			input: DecayOrderInput {
				token: TOKEN.to_string(),
				start_amount: "100".to_string(),
				end_amount: "100".to_string(),
			},
			outputs: vec![DecayOrderOutput {
				token: TOKEN.to_string(),
				start_amount: "200".to_string(),
				end_amount: "150".to_string(),
				recipient: SWAPPER.to_string(),
			}],
		}
	}

	#[test]
	fn test_valid_entities() {
		assert!(priority_entity().validate().is_ok());
		assert!(decay_entity().validate().is_ok());
	}

	#[test]
	fn test_rejects_bad_numbers() {
		let mut entity = priority_entity();
		entity.outputs[0].amount = "1.5e30".to_string();
		assert_eq!(
			entity.validate(),
			Err(FieldError::InvalidNumber {
				field: "outputs[0].amount".to_string(),
				value: "1.5e30".to_string(),
			})
		);

		let mut entity = decay_entity();
		entity.order.nonce = "-1".to_string();
		assert!(matches!(
			entity.validate(),
			Err(FieldError::InvalidNumber { field, .. }) if field == "nonce"
		));
	}

	#[test]
	fn test_rejects_mixed_case_addresses() {
		let mut entity = priority_entity();
		entity.order.offerer = "0x6000DA47483062a0d734ba3dc7576ce6a0b645c4".to_string();
		assert!(matches!(
			entity.validate(),
			Err(FieldError::InvalidAddress { field, .. }) if field == "offerer"
		));
	}

	#[test]
	fn test_rejects_missing_fields() {
		let mut entity = decay_entity();
		entity.order.signature.clear();
		assert_eq!(
			entity.validate(),
			Err(FieldError::Missing("signature".to_string()))
		);

		let mut entity = priority_entity();
		entity.outputs.clear();
		assert_eq!(
			entity.validate(),
			Err(FieldError::Missing("outputs".to_string()))
		);
	}

	#[test]
	fn test_target_block_must_not_precede_auction_start() {
		let mut entity = priority_entity();
		entity.cosigner_data.auction_target_block = 999;
		entity.cosignature = "0xdead".to_string();
		assert!(matches!(
			entity.validate(),
			Err(FieldError::Inconsistent { field, .. }) if field == "cosignerData.auctionTargetBlock"
		));

		entity.cosigner_data.auction_target_block = 1000;
		assert!(entity.validate().is_ok());
	}

	#[test]
	fn test_cosigned_target_block_zero() {
		let mut entity = priority_entity();
		entity.cosignature = "0xdead".to_string();
		assert!(matches!(
			entity.validate(),
			Err(FieldError::Inconsistent { field, .. }) if field == "cosignerData.auctionTargetBlock"
		));

		entity.auction_start_block = 0;
		assert!(entity.validate().is_ok());
	}

	#[test]
	fn test_decay_window_ordering() {
		let mut entity = decay_entity();
		entity.decay_start_time = 30;
		assert!(matches!(
			entity.validate(),
			Err(FieldError::Inconsistent { field, .. }) if field == "decayStartTime"
		));
	}

	#[test]
	fn test_entity_serde_shape() {
		let entity = UniswapXOrderEntity::from(priority_entity());
		let json = serde_json::to_value(&entity).unwrap();
		let inner = &json["priority"];

		assert_eq!(inner["type"], "Priority");
		assert_eq!(inner["orderStatus"], "open");
		assert_eq!(inner["chainId"], 8453);
		assert_eq!(inner["cosignerData"]["auctionTargetBlock"], 0);
		assert_eq!(
			inner["outputs"][0]["amount"],
			"123456789012345678901234567890123"
		);
		assert!(inner.get("txHash").is_none());
		assert!(inner.get("createdAt").is_none());

		let parsed: UniswapXOrderEntity = serde_json::from_value(json).unwrap();
		assert_eq!(parsed, entity);
	}

	#[test]
	fn test_status_tags() {
		assert_eq!(
			serde_json::to_string(&OrderStatus::InsufficientFunds).unwrap(),
			"\"insufficient-funds\""
		);
		assert_eq!(OrderStatus::InsufficientFunds.to_string(), "insufficient-funds");
		let status: OrderStatus = serde_json::from_str("\"cancelled\"").unwrap();
		assert_eq!(status, OrderStatus::Cancelled);
	}
}
