//! Solidity bindings and canonical encoding for UniswapX orders.
//!
//! Encoded orders are `abi.encode(order)` of the structs the reactors
//! decode. Order hashes follow the reactor libraries: an EIP-712 struct hash
//! over the swapper-signed witness, which for priority orders leaves out the
//! cosigner data and cosignature.

use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::{sol, SolStruct, SolValue};
use thiserror::Error;

sol! {
	/// Generic order information shared by every reactor.
	#[derive(Debug, PartialEq, Eq)]
	struct OrderInfo {
		address reactor;
		address swapper;
		uint256 nonce;
		uint256 deadline;
		address additionalValidationContract;
		bytes additionalValidationData;
	}

	#[derive(Debug, PartialEq, Eq)]
	struct DutchInput {
		address token;
		uint256 startAmount;
		uint256 endAmount;
	}

	#[derive(Debug, PartialEq, Eq)]
	struct DutchOutput {
		address token;
		uint256 startAmount;
		uint256 endAmount;
		address recipient;
	}

	/// Exclusive Dutch order as decoded by the Dutch reactor.
	#[derive(Debug, PartialEq, Eq)]
	struct DutchOrder {
		OrderInfo info;
		uint256 decayStartTime;
		uint256 decayEndTime;
		address exclusiveFiller;
		uint256 exclusivityOverrideBps;
		DutchInput input;
		DutchOutput[] outputs;
	}

	#[derive(Debug, PartialEq, Eq)]
	struct PriorityInput {
		address token;
		uint256 amount;
		uint256 mpsPerPriorityFeeWei;
	}

	#[derive(Debug, PartialEq, Eq)]
	struct PriorityOutput {
		address token;
		uint256 amount;
		uint256 mpsPerPriorityFeeWei;
		address recipient;
	}

	#[derive(Debug, PartialEq, Eq)]
	struct PriorityCosignerData {
		uint256 auctionTargetBlock;
	}

	/// Priority order as decoded by the priority reactor.
	#[derive(Debug, PartialEq, Eq)]
	struct PriorityOrder {
		OrderInfo info;
		address cosigner;
		uint256 auctionStartBlock;
		uint256 baselinePriorityFeeWei;
		PriorityInput input;
		PriorityOutput[] outputs;
		PriorityCosignerData cosignerData;
		bytes cosignature;
	}
}

pub const ORDER_INFO_TYPE: &str = "OrderInfo(address reactor,address swapper,uint256 nonce,uint256 deadline,address additionalValidationContract,bytes additionalValidationData)";
pub const DUTCH_OUTPUT_TYPE: &str =
	"DutchOutput(address token,uint256 startAmount,uint256 endAmount,address recipient)";
pub const PRIORITY_INPUT_TYPE: &str =
	"PriorityInput(address token,uint256 amount,uint256 mpsPerPriorityFeeWei)";
pub const PRIORITY_OUTPUT_TYPE: &str =
	"PriorityOutput(address token,uint256 amount,uint256 mpsPerPriorityFeeWei,address recipient)";

const EXCLUSIVE_DUTCH_ORDER_TYPE: &str = "ExclusiveDutchOrder(OrderInfo info,uint256 decayStartTime,uint256 decayEndTime,address exclusiveFiller,uint256 exclusivityOverrideBps,address inputToken,uint256 inputStartAmount,uint256 inputEndAmount,DutchOutput[] outputs)";
const PRIORITY_ORDER_TYPE: &str = "PriorityOrder(OrderInfo info,address cosigner,uint256 auctionStartBlock,uint256 baselinePriorityFeeWei,PriorityInput input,PriorityOutput[] outputs)";

/// Errors raised while turning hex strings into order structs.
#[derive(Debug, Error)]
pub enum SdkError {
	#[error("Invalid hex: {0}")]
	Hex(String),
	#[error("ABI decoding failed: {0}")]
	Abi(String),
	#[error("Encoding is not canonical")]
	NonCanonical,
}

/// Full EIP-712 type string of the Dutch order witness.
pub fn dutch_order_type() -> String {
	format!(
		"{}{}{}",
		EXCLUSIVE_DUTCH_ORDER_TYPE, DUTCH_OUTPUT_TYPE, ORDER_INFO_TYPE
	)
}

/// Full EIP-712 type string of the priority order witness.
pub fn priority_order_type() -> String {
	format!(
		"{}{}{}{}",
		PRIORITY_ORDER_TYPE, ORDER_INFO_TYPE, PRIORITY_INPUT_TYPE, PRIORITY_OUTPUT_TYPE
	)
}

/// Decodes `0x` hex (either case) into bytes.
pub fn decode_hex(encoded: &str) -> Result<Vec<u8>, SdkError> {
	let digits = encoded.strip_prefix("0x").unwrap_or(encoded);
	hex::decode(digits).map_err(|e| SdkError::Hex(e.to_string()))
}

/// Encodes bytes as lower-case `0x` hex.
pub fn encode_hex(bytes: impl AsRef<[u8]>) -> String {
	format!("0x{}", hex::encode(bytes))
}

/// Decodes an order struct and checks that re-encoding reproduces the input.
///
/// Any encoding that decodes but does not re-encode to the same bytes is
/// rejected, so a decoded order always serializes to what the swapper signed.
pub fn decode_canonical<T: SolValue + From<<T::SolType as alloy_sol_types::SolType>::RustType>>(
	encoded: &str,
) -> Result<T, SdkError> {
	let bytes = decode_hex(encoded)?;
	let decoded = T::abi_decode(&bytes, true).map_err(|e| SdkError::Abi(e.to_string()))?;
	if decoded.abi_encode() != bytes {
		return Err(SdkError::NonCanonical);
	}
	Ok(decoded)
}

fn hash_array<I: IntoIterator<Item = B256>>(hashes: I) -> B256 {
	let mut packed = Vec::new();
	for hash in hashes {
		packed.extend_from_slice(hash.as_slice());
	}
	keccak256(packed)
}

impl DutchOrder {
	/// Witness hash signed by the swapper. The input is flattened into
	/// `inputToken`, `inputStartAmount` and `inputEndAmount`.
	pub fn order_hash(&self) -> B256 {
		let outputs = hash_array(self.outputs.iter().map(|o| o.eip712_hash_struct()));
		let encoded = (
			keccak256(dutch_order_type()),
			self.info.eip712_hash_struct(),
			self.decayStartTime,
			self.decayEndTime,
			self.exclusiveFiller,
			self.exclusivityOverrideBps,
			self.input.token,
			self.input.startAmount,
			self.input.endAmount,
			outputs,
		)
			.abi_encode();
		keccak256(encoded)
	}
}

impl PriorityOrder {
	/// Witness hash signed by the swapper. Cosigner data and cosignature are
	/// not part of the witness, so this hash never changes when they do.
	pub fn order_hash(&self) -> B256 {
		let outputs = hash_array(self.outputs.iter().map(|o| o.eip712_hash_struct()));
		let encoded = (
			keccak256(priority_order_type()),
			self.info.eip712_hash_struct(),
			self.cosigner,
			self.auctionStartBlock,
			self.baselinePriorityFeeWei,
			self.input.eip712_hash_struct(),
			outputs,
		)
			.abi_encode();
		keccak256(encoded)
	}
}

/// Digest the cosigner signs: binds the order hash and chain to the auction
/// parameters, `keccak256(orderHash ‖ uint256(chainId) ‖ abi.encode(cosignerData))`.
pub fn cosignature_hash(
	order_hash: B256,
	chain_id: u64,
	cosigner_data: &PriorityCosignerData,
) -> B256 {
	let mut packed = Vec::with_capacity(96);
	packed.extend_from_slice(order_hash.as_slice());
	packed.extend_from_slice(&U256::from(chain_id).to_be_bytes::<32>());
	packed.extend_from_slice(&cosigner_data.abi_encode());
	keccak256(packed)
}

/// Lower-case `0x` form used for entity fields.
pub fn lower_address(address: &Address) -> String {
	encode_hex(address)
}
