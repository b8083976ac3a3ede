//! Decay orders: exclusive Dutch orders and limit orders.
//!
//! Both are encoded as the Dutch reactor's struct. A limit order is a decay
//! order whose amounts never move, so its decay window is reported as ending
//! at the deadline.

use alloy_primitives::{Address, B256, U256};
use relay_types::{
	DecayOrderEntity, DecayOrderInput, DecayOrderInputResponse, DecayOrderOutput,
	DecayOrderOutputResponse, GetDecayOrderResponse, OrderEntity, OrderStatus, OrderType,
};

use crate::sdk::{self, lower_address};
use crate::{OrderError, OrderInterface, OrderMetadata};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecayOrder {
	inner: sdk::DutchOrder,
	order_type: OrderType,
	signature: String,
	chain_id: u64,
	pub metadata: OrderMetadata,
}

fn decode_error(order_type: OrderType, chain_id: u64, reason: impl Into<String>) -> OrderError {
	OrderError::Decode {
		order_type,
		chain_id,
		reason: reason.into(),
	}
}

fn as_u64(value: U256) -> u64 {
	u64::try_from(value).unwrap_or(u64::MAX)
}

impl DecayOrder {
	/// Wraps a decoded order as the given decay type.
	///
	/// Timestamps must fit in 64 bits and the decay window must not be
	/// inverted. Limit orders must have constant amounts.
	pub fn new(
		inner: sdk::DutchOrder,
		order_type: OrderType,
		signature: impl Into<String>,
		chain_id: u64,
	) -> Result<Self, OrderError> {
		if !order_type.is_decay() {
			return Err(decode_error(
				order_type,
				chain_id,
				"not a decay order type",
			));
		}

		let fields = [
			("deadline", inner.info.deadline),
			("decayStartTime", inner.decayStartTime),
			("decayEndTime", inner.decayEndTime),
		];
		for (field, value) in fields {
			if u64::try_from(value).is_err() {
				return Err(decode_error(
					order_type,
					chain_id,
					format!("{} {} does not fit in 64 bits", field, value),
				));
			}
		}

		let order = Self {
			inner,
			order_type,
			signature: signature.into(),
			chain_id,
			metadata: OrderMetadata::default(),
		};

		if order.order_type == OrderType::Limit {
			order.check_constant_amounts()?;
		}
		if order.decay_start_time() > order.decay_end_time() {
			return Err(decode_error(
				order_type,
				chain_id,
				format!(
					"decay starts at {} after it ends at {}",
					order.decay_start_time(),
					order.decay_end_time()
				),
			));
		}

		Ok(order)
	}

	/// Decodes an encoded exclusive Dutch order.
	pub fn parse(encoded_order: &str, signature: &str, chain_id: u64) -> Result<Self, OrderError> {
		Self::parse_as(OrderType::Dutch, encoded_order, signature, chain_id)
	}

	/// Decodes an encoded limit order.
	pub fn parse_limit(
		encoded_order: &str,
		signature: &str,
		chain_id: u64,
	) -> Result<Self, OrderError> {
		Self::parse_as(OrderType::Limit, encoded_order, signature, chain_id)
	}

	fn parse_as(
		order_type: OrderType,
		encoded_order: &str,
		signature: &str,
		chain_id: u64,
	) -> Result<Self, OrderError> {
		let inner = sdk::decode_canonical::<sdk::DutchOrder>(encoded_order)
			.map_err(|e| decode_error(order_type, chain_id, e.to_string()))?;
		Self::new(inner, order_type, signature, chain_id)
	}

	fn check_constant_amounts(&self) -> Result<(), OrderError> {
		let input = &self.inner.input;
		let constant = input.startAmount == input.endAmount
			&& self
				.inner
				.outputs
				.iter()
				.all(|output| output.startAmount == output.endAmount);
		if constant {
			Ok(())
		} else {
			Err(decode_error(
				self.order_type,
				self.chain_id,
				"limit order amounts must not decay",
			))
		}
	}

	pub fn with_metadata(mut self, metadata: OrderMetadata) -> Self {
		self.metadata = metadata;
		self
	}

	pub fn inner(&self) -> &sdk::DutchOrder {
		&self.inner
	}

	pub fn swapper(&self) -> Address {
		self.inner.info.swapper
	}

	pub fn deadline(&self) -> u64 {
		as_u64(self.inner.info.deadline)
	}

	pub fn decay_start_time(&self) -> u64 {
		as_u64(self.inner.decayStartTime)
	}

	/// End of the decay window. Limit orders hold their price until the deadline.
	pub fn decay_end_time(&self) -> u64 {
		match self.order_type {
			OrderType::Limit => self.deadline(),
			_ => as_u64(self.inner.decayEndTime),
		}
	}

	/// Exclusive filler, if the order restricts who may fill it.
	pub fn exclusive_filler(&self) -> Option<Address> {
		let filler = self.inner.exclusiveFiller;
		(filler != Address::ZERO).then_some(filler)
	}

	/// Read-only projection to the API response.
	pub fn to_get_response(&self) -> GetDecayOrderResponse {
		let info = &self.inner.info;
		let input = &self.inner.input;

		GetDecayOrderResponse {
			order_type: self.order_type,
			order_status: self.metadata.status,
			signature: self.signature.clone(),
			encoded_order: self.serialize(),
			chain_id: self.chain_id,
			nonce: info.nonce.to_string(),
			tx_hash: self.metadata.tx_hash.clone(),
			order_hash: self.order_hash(),
			swapper: info.swapper.to_checksum(None),
			reactor: info.reactor.to_checksum(None),
			filler: self.exclusive_filler().map(|f| f.to_checksum(None)),
			decay_start_time: self.decay_start_time(),
			decay_end_time: self.decay_end_time(),
			deadline: self.deadline(),
			input: DecayOrderInputResponse {
				token: input.token.to_checksum(None),
				start_amount: input.startAmount.to_string(),
				end_amount: input.endAmount.to_string(),
			},
			outputs: self
				.inner
				.outputs
				.iter()
				.map(|output| DecayOrderOutputResponse {
					token: output.token.to_checksum(None),
					start_amount: output.startAmount.to_string(),
					end_amount: output.endAmount.to_string(),
					recipient: output.recipient.to_checksum(None),
				})
				.collect(),
			quote_id: self.metadata.quote_id.clone(),
			request_id: self.metadata.request_id.clone(),
			created_at: self.metadata.created_at,
		}
	}
}

impl OrderInterface for DecayOrder {
	type Entity = DecayOrderEntity;

	fn order_type(&self) -> OrderType {
		self.order_type
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

	fn to_entity(&self, status: OrderStatus) -> Result<DecayOrderEntity, OrderError> {
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

		Ok(DecayOrderEntity {
			order: OrderEntity {
				order_type: self.order_type,
				encoded_order: self.serialize(),
				signature: self.signature.clone(),
				nonce: info.nonce.to_string(),
				order_hash: order_hash.clone(),
				chain_id: self.chain_id,
				order_status: status,
				offerer: lower_address(&info.swapper),
				reactor: lower_address(&info.reactor),
				filler: self
					.exclusive_filler()
					.map(|f| lower_address(&f))
					.unwrap_or_default(),
				deadline: self.deadline(),
				tx_hash: self.metadata.tx_hash.clone(),
				quote_id: self.metadata.quote_id.clone(),
				request_id: self.metadata.request_id.clone(),
				created_at: self.metadata.created_at,
			},
			decay_start_time: self.decay_start_time(),
			decay_end_time: self.decay_end_time(),
			input: DecayOrderInput {
				token: lower_address(&input.token),
				start_amount: input.startAmount.to_string(),
				end_amount: input.endAmount.to_string(),
			},
			outputs: self
				.inner
				.outputs
				.iter()
				.map(|output| DecayOrderOutput {
					token: lower_address(&output.token),
					start_amount: output.startAmount.to_string(),
					end_amount: output.endAmount.to_string(),
					recipient: lower_address(&output.recipient),
				})
				.collect(),
		})
	}

	fn from_entity(entity: &DecayOrderEntity) -> Result<Self, OrderError> {
		let order_type = entity.order.order_type;
		let chain_id = entity.order.chain_id;

		let order = Self::parse_as(
			order_type,
			&entity.order.encoded_order,
			&entity.order.signature,
			chain_id,
		)?
		.with_metadata(OrderMetadata::from_entity(&entity.order));

		let order_hash = order.order_hash();
		if !order_hash.eq_ignore_ascii_case(&entity.order.order_hash) {
			return Err(decode_error(
				order_type,
				chain_id,
				format!(
					"stored order hash {} does not match decoded hash {}",
					entity.order.order_hash, order_hash
				),
			));
		}

		if order.decay_start_time() != entity.decay_start_time
			|| order.decay_end_time() != entity.decay_end_time
		{
			return Err(decode_error(
				order_type,
				chain_id,
				format!("decay window of {} disagrees with the encoded order", order_hash),
			));
		}

		Ok(order)
	}
}
