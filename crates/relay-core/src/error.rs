use crate::cosign::CosignError;
use relay_account::AccountError;
use relay_chain::ChainError;
use relay_order::{CosignState, OrderError};
use relay_storage::StorageError;
use relay_types::{FieldError, OrderStatus};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
	#[error("Configuration error: {0}")]
	Configuration(String),

	#[error(transparent)]
	Cosign(#[from] CosignError),

	#[error(transparent)]
	Order(#[from] OrderError),

	#[error(transparent)]
	Chain(#[from] ChainError),

	#[error(transparent)]
	Account(#[from] AccountError),

	#[error("Storage error: {0}")]
	Storage(#[from] StorageError),

	#[error("Invalid order entity: {0}")]
	Entity(#[from] FieldError),

	#[error("Order not found: {0}")]
	OrderNotFound(String),

	#[error("Order {0} already exists")]
	AlreadyExists(String),

	#[error("Order {0} is not a priority order")]
	NotPriority(String),

	#[error("Order {order_hash} is {status}; only open orders can be cosigned")]
	NotOpen {
		order_hash: String,
		status: OrderStatus,
	},

	#[error("Order {order_hash} expects cosigner {expected}, relay signs as {actual}")]
	CosignerMismatch {
		order_hash: String,
		expected: String,
		actual: String,
	},

	#[error("Order {order_hash} arrived {state:?}; cosigner data is only attached by the relay")]
	PrecosignedOrder {
		order_hash: String,
		state: CosignState,
	},

	#[error("Cosign already in progress for order {0}")]
	CosignInProgress(String),
}
