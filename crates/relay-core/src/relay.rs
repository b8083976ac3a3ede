//! Order relay: accepts swapper-signed orders, persists them as entities and
//! cosigns priority orders.

use crate::cosign::{reparameterize_and_cosign, CosignConfig, CosignError};
use crate::CoreError;
use backoff::{backoff::Backoff, ExponentialBackoff};
use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use relay_account::CosignerInterface;
use relay_chain::{ChainReader, ChainRegistry};
use relay_config::RelayConfig;
use relay_order::{CosignState, OrderImpl, OrderInterface, PriorityOrder};
use relay_storage::{StorageError, StorageService};
use relay_types::{CosignerData, OrderResponse, OrderStatus, OrderType, UniswapXOrderEntity};
use std::sync::Arc;
use tracing::{info, warn};

/// Storage namespace of order entities, keyed by order hash.
pub const ORDERS_NAMESPACE: &str = "orders";

/// A swapper-signed order as received from a client.
#[derive(Debug, Clone)]
pub struct OrderSubmission {
	pub order_type: OrderType,
	pub encoded_order: String,
	pub signature: String,
	pub chain_id: u64,
	pub quote_id: Option<String>,
	pub request_id: Option<String>,
}

pub struct OrderRelay {
	storage: StorageService,
	chains: ChainRegistry,
	cosigner: Arc<dyn CosignerInterface>,
	config: CosignConfig,
	in_flight: DashMap<String, ()>,
}

/// Marks an order as being cosigned until dropped.
struct InFlight<'a> {
	orders: &'a DashMap<String, ()>,
	order_hash: String,
}

impl Drop for InFlight<'_> {
	fn drop(&mut self) {
		self.orders.remove(&self.order_hash);
	}
}

impl OrderRelay {
	pub fn new(
		storage: StorageService,
		chains: ChainRegistry,
		cosigner: Arc<dyn CosignerInterface>,
		config: CosignConfig,
	) -> Self {
		Self {
			storage,
			chains,
			cosigner,
			config,
			in_flight: DashMap::new(),
		}
	}

	/// Builds the relay and all of its backends from configuration.
	pub fn from_config(config: &RelayConfig) -> Result<Self, CoreError> {
		let backend =
			relay_storage::create_storage(&config.storage.backend, &config.storage.as_toml())?;

		let chain_settings: Vec<(u64, toml::Value)> = config
			.chains
			.iter()
			.map(|(chain_id, chain)| (*chain_id, chain.as_toml()))
			.collect();
		let chains =
			ChainRegistry::from_config(chain_settings.iter().map(|(id, value)| (*id, value)))?;

		if config.cosigner.implementation != "local" {
			return Err(CoreError::Configuration(format!(
				"Unsupported cosigner implementation '{}'",
				config.cosigner.implementation
			)));
		}
		let cosigner = relay_account::create_cosigner(&config.cosigner.as_toml())?;

		info!(
			name = %config.relay.name,
			backend = %config.storage.backend,
			chains = ?chains.chains(),
			"Relay initialized"
		);

		Ok(Self::new(
			StorageService::new(backend),
			chains,
			cosigner,
			CosignConfig::from(&config.cosign),
		))
	}

	pub fn cosign_config(&self) -> &CosignConfig {
		&self.config
	}

	/// Chains orders can be submitted for, in ascending order.
	pub fn chains(&self) -> Vec<u64> {
		self.chains.chains()
	}

	/// Checksummed address of the cosigner this relay signs with.
	pub async fn cosigner_address(&self) -> Result<String, CoreError> {
		Ok(self.cosigner.address().await?.to_string())
	}

	/// Decodes and stores a new order with status `open`.
	pub async fn submit_order(&self, submission: OrderSubmission) -> Result<OrderResponse, CoreError> {
		self.chains.get_required(submission.chain_id)?;

		let mut order = OrderImpl::parse(
			submission.order_type,
			&submission.encoded_order,
			&submission.signature,
			submission.chain_id,
		)?;
		let order_hash = order.order_hash();

		if let Some(priority) = order.as_priority() {
			let relay_cosigner = self.cosigner.address().await?;
			if priority.cosigner() != relay_cosigner {
				return Err(CoreError::CosignerMismatch {
					order_hash,
					expected: priority.cosigner().to_string(),
					actual: relay_cosigner.to_string(),
				});
			}
			let state = priority.cosign_state();
			if state != CosignState::Uncosigned {
				return Err(CoreError::PrecosignedOrder { order_hash, state });
			}
		}

		if self.storage.exists(ORDERS_NAMESPACE, &order_hash).await? {
			return Err(CoreError::AlreadyExists(order_hash));
		}

		let metadata = order.metadata_mut();
		metadata.status = OrderStatus::Open;
		metadata.quote_id = submission.quote_id;
		metadata.request_id = submission.request_id;
		metadata.created_at = Some(Utc::now());

		self.persist(&order).await?;
		info!(
			%order_hash,
			chain_id = submission.chain_id,
			order_type = %submission.order_type,
			"Accepted order"
		);

		Ok(order.to_get_response())
	}

	/// Assigns a fresh auction target block to a stored priority order and
	/// cosigns it.
	///
	/// Transient chain or signer failures restart the workflow with
	/// exponential backoff. On failure the stored entity is left unchanged.
	pub async fn cosign_order(&self, order_hash: &str) -> Result<OrderResponse, CoreError> {
		let order_hash = order_hash.to_ascii_lowercase();
		let _in_flight = self.begin_cosign(&order_hash)?;

		let mut order = self
			.load(&order_hash)
			.await?
			.into_priority()
			.ok_or_else(|| CoreError::NotPriority(order_hash.clone()))?;

		if order.metadata.status != OrderStatus::Open {
			return Err(CoreError::NotOpen {
				order_hash,
				status: order.metadata.status,
			});
		}

		let chain = self.chains.get_required(order.chain_id())?;
		self.cosign_with_retry(&mut order, chain.as_ref()).await?;

		let order = OrderImpl::from(order);
		self.persist(&order).await?;

		Ok(order.to_get_response())
	}

	/// Current state of a stored order.
	pub async fn get_order(&self, order_hash: &str) -> Result<OrderResponse, CoreError> {
		let order = self.load(&order_hash.to_ascii_lowercase()).await?;
		Ok(order.to_get_response())
	}

	fn begin_cosign(&self, order_hash: &str) -> Result<InFlight<'_>, CoreError> {
		match self.in_flight.entry(order_hash.to_string()) {
			Entry::Occupied(_) => Err(CoreError::CosignInProgress(order_hash.to_string())),
			Entry::Vacant(entry) => {
				entry.insert(());
				Ok(InFlight {
					orders: &self.in_flight,
					order_hash: order_hash.to_string(),
				})
			}
		}
	}

	async fn cosign_with_retry(
		&self,
		order: &mut PriorityOrder,
		chain: &dyn ChainReader,
	) -> Result<CosignerData, CosignError> {
		let mut backoff = ExponentialBackoff {
			initial_interval: self.config.initial_retry_interval,
			max_elapsed_time: Some(self.config.max_retry_elapsed),
			..Default::default()
		};
		let mut attempts = 0u32;

		loop {
			match reparameterize_and_cosign(order, chain, self.cosigner.as_ref(), &self.config).await
			{
				Ok(cosigner_data) => return Ok(cosigner_data),
				Err(e) if e.is_retryable() => {
					attempts += 1;
					if let Some(delay) = backoff.next_backoff() {
						warn!(
							order_hash = %order.order_hash(),
							attempts,
							"Cosign failed, retrying in {:?}: {}",
							delay,
							e
						);
						tokio::time::sleep(delay).await;
					} else {
						warn!(
							order_hash = %order.order_hash(),
							attempts,
							"Cosign failed, backoff exhausted: {}",
							e
						);
						return Err(e);
					}
				}
				Err(e) => return Err(e),
			}
		}
	}

	async fn load(&self, order_hash: &str) -> Result<OrderImpl, CoreError> {
		let entity: UniswapXOrderEntity =
			match self.storage.retrieve(ORDERS_NAMESPACE, order_hash).await {
				Ok(entity) => entity,
				Err(StorageError::NotFound(_)) => {
					return Err(CoreError::OrderNotFound(order_hash.to_string()))
				}
				Err(e) => return Err(e.into()),
			};

		Ok(OrderImpl::from_entity(&entity)?)
	}

	async fn persist(&self, order: &OrderImpl) -> Result<(), CoreError> {
		let entity = order.to_entity(order.metadata().status)?;
		entity.validate()?;
		self.storage
			.store(ORDERS_NAMESPACE, entity.order_hash(), &entity)
			.await?;
		Ok(())
	}
}
