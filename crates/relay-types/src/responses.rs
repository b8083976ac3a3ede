//! Response records returned to API consumers.
//!
//! Addresses keep their natural (checksummed) case here, unlike entities.
//! Optional fields are skipped entirely when absent so existing consumers
//! never see explicit nulls.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{OrderStatus, OrderType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityOrderInputResponse {
	pub token: String,
	pub amount: String,
	pub mps_per_priority_fee_wei: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityOrderOutputResponse {
	pub token: String,
	pub amount: String,
	pub mps_per_priority_fee_wei: String,
	pub recipient: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CosignerDataResponse {
	pub auction_target_block: u64,
}

/// Response body for a priority order lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetPriorityOrderResponse {
	#[serde(rename = "type")]
	pub order_type: OrderType,
	pub order_status: OrderStatus,
	pub signature: String,
	pub encoded_order: String,
	pub chain_id: u64,
	pub nonce: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tx_hash: Option<String>,
	pub order_hash: String,
	pub swapper: String,
	pub reactor: String,
	pub deadline: u64,
	pub auction_start_block: u64,
	pub baseline_priority_fee_wei: String,
	pub input: PriorityOrderInputResponse,
	pub outputs: Vec<PriorityOrderOutputResponse>,
	pub cosigner_data: CosignerDataResponse,
	pub cosignature: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub quote_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub request_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayOrderInputResponse {
	pub token: String,
	pub start_amount: String,
	pub end_amount: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DecayOrderOutputResponse {
	pub token: String,
	pub start_amount: String,
	pub end_amount: String,
	pub recipient: String,
}

/// Response body for a Dutch or limit order lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDecayOrderResponse {
	#[serde(rename = "type")]
	pub order_type: OrderType,
	pub order_status: OrderStatus,
	pub signature: String,
	pub encoded_order: String,
	pub chain_id: u64,
	pub nonce: String,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub tx_hash: Option<String>,
	pub order_hash: String,
	pub swapper: String,
	pub reactor: String,
	/// Exclusive filler, omitted when the order is open to any filler.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub filler: Option<String>,
	pub decay_start_time: u64,
	pub decay_end_time: u64,
	pub deadline: u64,
	pub input: DecayOrderInputResponse,
	pub outputs: Vec<DecayOrderOutputResponse>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub quote_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub request_id: Option<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub created_at: Option<DateTime<Utc>>,
}

/// Either response shape; serialized without an extra wrapper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum OrderResponse {
	Decay(GetDecayOrderResponse),
	Priority(GetPriorityOrderResponse),
}

impl OrderResponse {
	pub fn order_hash(&self) -> &str {
		match self {
			OrderResponse::Decay(response) => &response.order_hash,
			OrderResponse::Priority(response) => &response.order_hash,
		}
	}
}
