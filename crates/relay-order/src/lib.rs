//! Order abstraction for the UniswapX relay.
//!
//! Each order family (decay, priority) implements [`OrderInterface`]: type
//! identity, canonical serialization, hashing and lossless conversion to and
//! from the entity model. [`OrderImpl`] is the closed set of variants and is
//! resolved by an explicit type tag, never by inspecting values at runtime.

use alloy_primitives::B256;
use chrono::{DateTime, Utc};
use relay_types::{OrderResponse, OrderStatus, OrderType, UniswapXOrderEntity};
use thiserror::Error;

pub mod sdk;

/// Re-export implementations
pub mod implementations {
	pub mod decay;
	pub mod priority;
}

pub use implementations::decay::DecayOrder;
pub use implementations::priority::{CosignState, PriorityOrder};

/// Errors that can occur while decoding or projecting orders.
#[derive(Debug, Error)]
pub enum OrderError {
	/// The encoded order could not be parsed for its declared type and chain,
	/// or it disagrees with the entity it was loaded from.
	#[error("Failed to decode {order_type} order on chain {chain_id}: {reason}")]
	Decode {
		order_type: OrderType,
		chain_id: u64,
		reason: String,
	},
	/// A required sub-field is absent, so no entity can be produced.
	#[error("Cannot convert order {order_hash} to an entity: missing {field}")]
	Conversion { order_hash: String, field: String },
	/// Cosigner data would break the auction invariants.
	#[error("Invalid cosigner data for order {order_hash}: target block {target_block} is before auction start block {auction_start_block}")]
	InvalidTargetBlock {
		order_hash: String,
		target_block: u64,
		auction_start_block: u64,
	},
}

/// Relay-side state carried next to the swapper-signed order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderMetadata {
	pub status: OrderStatus,
	pub tx_hash: Option<String>,
	pub quote_id: Option<String>,
	pub request_id: Option<String>,
	pub created_at: Option<DateTime<Utc>>,
}

impl Default for OrderMetadata {
	fn default() -> Self {
		Self {
			status: OrderStatus::Open,
			tx_hash: None,
			quote_id: None,
			request_id: None,
			created_at: None,
		}
	}
}

impl OrderMetadata {
	fn from_entity(order: &relay_types::OrderEntity) -> Self {
		Self {
			status: order.order_status,
			tx_hash: order.tx_hash.clone(),
			quote_id: order.quote_id.clone(),
			request_id: order.request_id.clone(),
			created_at: order.created_at,
		}
	}
}

/// Capability set every order family provides.
pub trait OrderInterface: Send + Sync {
	/// Entity shape this order projects to.
	type Entity;

	/// Type tag of this order.
	fn order_type(&self) -> OrderType;

	/// Chain the order was submitted for.
	fn chain_id(&self) -> u64;

	/// Swapper signature over the encoded order.
	fn signature(&self) -> &str;

	/// Canonical `0x` hex encoding. Matches the payload the swapper signed.
	fn serialize(&self) -> String;

	/// Content-addressed identity of the swapper-signed payload.
	fn hash(&self) -> B256;

	/// Lower-case hex form of [`hash`](OrderInterface::hash).
	fn order_hash(&self) -> String {
		sdk::encode_hex(self.hash())
	}

	/// Lossless projection to the entity model.
	fn to_entity(&self, status: OrderStatus) -> Result<Self::Entity, OrderError>;

	/// Inverse of [`to_entity`](OrderInterface::to_entity).
	fn from_entity(entity: &Self::Entity) -> Result<Self, OrderError>
	where
		Self: Sized;
}

/// Enum wrapper for the supported order families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderImpl {
	Decay(DecayOrder),
	Priority(PriorityOrder),
}

impl OrderImpl {
	/// Decodes a client submission for the declared order type.
	pub fn parse(
		order_type: OrderType,
		encoded_order: &str,
		signature: &str,
		chain_id: u64,
	) -> Result<Self, OrderError> {
		match order_type {
			OrderType::Dutch => {
				DecayOrder::parse(encoded_order, signature, chain_id).map(OrderImpl::Decay)
			}
			OrderType::Limit => {
				DecayOrder::parse_limit(encoded_order, signature, chain_id).map(OrderImpl::Decay)
			}
			OrderType::Priority => {
				PriorityOrder::parse(encoded_order, signature, chain_id).map(OrderImpl::Priority)
			}
		}
	}

	pub fn metadata(&self) -> &OrderMetadata {
		match self {
			OrderImpl::Decay(order) => &order.metadata,
			OrderImpl::Priority(order) => &order.metadata,
		}
	}

	pub fn metadata_mut(&mut self) -> &mut OrderMetadata {
		match self {
			OrderImpl::Decay(order) => &mut order.metadata,
			OrderImpl::Priority(order) => &mut order.metadata,
		}
	}

	pub fn as_priority(&self) -> Option<&PriorityOrder> {
		match self {
			OrderImpl::Priority(order) => Some(order),
			OrderImpl::Decay(_) => None,
		}
	}

	pub fn into_priority(self) -> Option<PriorityOrder> {
		match self {
			OrderImpl::Priority(order) => Some(order),
			OrderImpl::Decay(_) => None,
		}
	}

	/// Read-only projection to the response shape of the wrapped order.
	pub fn to_get_response(&self) -> OrderResponse {
		match self {
			OrderImpl::Decay(order) => OrderResponse::Decay(order.to_get_response()),
			OrderImpl::Priority(order) => OrderResponse::Priority(order.to_get_response()),
		}
	}
}

impl OrderInterface for OrderImpl {
	type Entity = UniswapXOrderEntity;

	fn order_type(&self) -> OrderType {
		match self {
			OrderImpl::Decay(order) => order.order_type(),
			OrderImpl::Priority(order) => order.order_type(),
		}
	}

	fn chain_id(&self) -> u64 {
		match self {
			OrderImpl::Decay(order) => order.chain_id(),
			OrderImpl::Priority(order) => order.chain_id(),
		}
	}

	fn signature(&self) -> &str {
		match self {
			OrderImpl::Decay(order) => order.signature(),
			OrderImpl::Priority(order) => order.signature(),
		}
	}

	fn serialize(&self) -> String {
		match self {
			OrderImpl::Decay(order) => order.serialize(),
			OrderImpl::Priority(order) => order.serialize(),
		}
	}

	fn hash(&self) -> B256 {
		match self {
			OrderImpl::Decay(order) => order.hash(),
			OrderImpl::Priority(order) => order.hash(),
		}
	}

	fn to_entity(&self, status: OrderStatus) -> Result<UniswapXOrderEntity, OrderError> {
		match self {
			OrderImpl::Decay(order) => order.to_entity(status).map(Into::into),
			OrderImpl::Priority(order) => order.to_entity(status).map(Into::into),
		}
	}

	fn from_entity(entity: &UniswapXOrderEntity) -> Result<Self, OrderError> {
		match entity {
			UniswapXOrderEntity::Decay(entity) => DecayOrder::from_entity(entity).map(OrderImpl::Decay),
			UniswapXOrderEntity::Priority(entity) => {
				PriorityOrder::from_entity(entity).map(OrderImpl::Priority)
			}
		}
	}
}

impl From<DecayOrder> for OrderImpl {
	fn from(order: DecayOrder) -> Self {
		OrderImpl::Decay(order)
	}
}

impl From<PriorityOrder> for OrderImpl {
	fn from(order: PriorityOrder) -> Self {
		OrderImpl::Priority(order)
	}
}
