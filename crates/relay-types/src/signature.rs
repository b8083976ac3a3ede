//! Signature representation shared by the cosigner and the order types.

use alloy_primitives::{Address, PrimitiveSignature, B256, U256};
use std::fmt;

/// Cryptographic signature in the 65 byte Ethereum layout (r, s, v).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature(pub Vec<u8>);

impl Signature {
	/// `0x` prefixed lower-case hex, the form stored on entities.
	pub fn to_hex(&self) -> String {
		format!("0x{}", alloy_primitives::hex::encode(&self.0))
	}

	/// Parses the 65 byte layout back into its components.
	pub fn to_primitive(&self) -> Option<PrimitiveSignature> {
		if self.0.len() != 65 {
			return None;
		}
		let r = U256::from_be_slice(&self.0[..32]);
		let s = U256::from_be_slice(&self.0[32..64]);
		let parity = match self.0[64] {
			0 | 27 => false,
			1 | 28 => true,
			_ => return None,
		};
		Some(PrimitiveSignature::new(r, s, parity))
	}

	/// Address that produced this signature over `prehash`, if it is well formed.
	pub fn recover_address(&self, prehash: &B256) -> Option<Address> {
		self.to_primitive()?
			.recover_address_from_prehash(prehash)
			.ok()
	}
}

impl fmt::Display for Signature {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.to_hex())
	}
}

impl From<PrimitiveSignature> for Signature {
	fn from(sig: PrimitiveSignature) -> Self {
		let mut bytes = Vec::with_capacity(65);
		bytes.extend_from_slice(&sig.r().to_be_bytes::<32>());
		bytes.extend_from_slice(&sig.s().to_be_bytes::<32>());
		// Reactors verify with ecrecover, which expects v in {27, 28}
		let v = if sig.v() { 28 } else { 27 };
		bytes.push(v);
		Signature(bytes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::U256;

	#[test]
	fn test_signature_layout() {
		let sig = PrimitiveSignature::new(U256::from(1u64), U256::from(2u64), true);
		let converted = Signature::from(sig);

		assert_eq!(converted.0.len(), 65);
		assert_eq!(converted.0[31], 1);
		assert_eq!(converted.0[63], 2);
		assert_eq!(converted.0[64], 28);
		assert!(converted.to_hex().starts_with("0x"));
		assert_eq!(converted.to_hex().len(), 2 + 130);
		assert_eq!(converted.to_primitive(), Some(sig));
	}

	#[test]
	fn test_malformed_signatures_do_not_parse() {
		assert!(Signature(vec![0u8; 64]).to_primitive().is_none());

		let mut bytes = vec![0u8; 65];
		bytes[64] = 29;
		assert!(Signature(bytes).to_primitive().is_none());
		assert!(Signature(vec![]).recover_address(&B256::ZERO).is_none());
	}
}
