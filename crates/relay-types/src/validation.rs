//! Field-shape validation for order entities.
//!
//! Entities carry numbers as decimal strings and addresses as lower-case hex
//! strings. The helpers here check those shapes without interpreting the
//! values any further.

use alloy_primitives::U256;
use thiserror::Error;

/// Errors raised when an entity field does not have the expected shape.
///
/// These are never retryable: the caller has to fix the input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
	/// A required field is empty.
	#[error("Missing required field: {0}")]
	Missing(String),
	/// A numeric field is not a non-negative integer that fits in 256 bits.
	#[error("Invalid decimal value for field '{field}': {value:?}")]
	InvalidNumber { field: String, value: String },
	/// An address field is not a lower-case 20 byte hex string.
	#[error("Invalid address for field '{field}': {value:?}")]
	InvalidAddress { field: String, value: String },
	/// A hash field is not a lower-case 32 byte hex string.
	#[error("Invalid hash for field '{field}': {value:?}")]
	InvalidHash { field: String, value: String },
	/// Two fields disagree with each other.
	#[error("Inconsistent field '{field}': {message}")]
	Inconsistent { field: String, message: String },
}

/// Returns true when `value` is a plain base-10 integer that fits in a uint256.
///
/// Signs, whitespace, separators and exponents are all rejected.
pub fn is_decimal_string(value: &str) -> bool {
	!value.is_empty()
		&& value.bytes().all(|b| b.is_ascii_digit())
		&& U256::from_str_radix(value, 10).is_ok()
}

/// Returns true when `value` is `0x` followed by exactly `len` lower-case hex digits.
fn is_lower_hex(value: &str, len: usize) -> bool {
	value
		.strip_prefix("0x")
		.map(|digits| {
			digits.len() == len
				&& digits
					.bytes()
					.all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
		})
		.unwrap_or(false)
}

/// Returns true when `value` is a lower-case `0x` address.
pub fn is_lower_address(value: &str) -> bool {
	is_lower_hex(value, 40)
}

/// Returns true when `value` is a lower-case `0x` 32 byte hash.
pub fn is_lower_hash(value: &str) -> bool {
	is_lower_hex(value, 64)
}

pub(crate) fn require(field: &str, value: &str) -> Result<(), FieldError> {
	if value.is_empty() {
		return Err(FieldError::Missing(field.to_string()));
	}
	Ok(())
}

pub(crate) fn check_decimal(field: &str, value: &str) -> Result<(), FieldError> {
	if !is_decimal_string(value) {
		return Err(FieldError::InvalidNumber {
			field: field.to_string(),
			value: value.to_string(),
		});
	}
	Ok(())
}

pub(crate) fn check_address(field: &str, value: &str) -> Result<(), FieldError> {
	require(field, value)?;
	if !is_lower_address(value) {
		return Err(FieldError::InvalidAddress {
			field: field.to_string(),
			value: value.to_string(),
		});
	}
	Ok(())
}

/// Like [`check_address`] but accepts the empty string ("not set").
pub(crate) fn check_optional_address(field: &str, value: &str) -> Result<(), FieldError> {
	if value.is_empty() {
		return Ok(());
	}
	check_address(field, value)
}

pub(crate) fn check_hash(field: &str, value: &str) -> Result<(), FieldError> {
	require(field, value)?;
	if !is_lower_hash(value) {
		return Err(FieldError::InvalidHash {
			field: field.to_string(),
			value: value.to_string(),
		});
	}
	Ok(())
}
