//! Relay orchestration.
//!
//! [`OrderRelay`] ties the order codecs to storage, chain readers and the
//! cosigner. The cosign workflow itself lives in [`cosign`] and can be run
//! on its own.

pub mod cosign;
pub mod error;
pub mod relay;

#[cfg(test)]
mod test_support;

pub use cosign::{reparameterize_and_cosign, target_block, CosignConfig, CosignError};
pub use error::CoreError;
pub use relay::{OrderRelay, OrderSubmission, ORDERS_NAMESPACE};
