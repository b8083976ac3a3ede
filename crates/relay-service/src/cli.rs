//! Command-line interface definitions.

use clap::{Parser, Subcommand, ValueEnum};
use relay_types::OrderType;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "uniswapx-relay")]
#[command(about = "UniswapX order relay and priority order cosigner", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
	/// Path to configuration file. Defaults to ./config.toml, then
	/// ./config/relay.toml
	#[arg(short, long, value_name = "FILE", env = "RELAY_CONFIG")]
	pub config: Option<PathBuf>,

	/// Log filter override (trace, debug, info, warn, error or a directive)
	#[arg(short, long, env = "RELAY_LOG_LEVEL")]
	pub log_level: Option<String>,

	#[command(subcommand)]
	pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
	/// Validate the configuration file and the backends it names
	Validate,

	/// Submit a swapper-signed order
	Submit(SubmitArgs),

	/// Assign a fresh auction target block to a priority order and cosign it
	Cosign {
		/// Order hash
		order_hash: String,
	},

	/// Show the current state of an order
	Get {
		/// Order hash
		order_hash: String,
	},
}

#[derive(clap::Args, Debug)]
pub struct SubmitArgs {
	/// Order family of the encoded order
	#[arg(long = "type", value_enum)]
	pub order_type: CliOrderType,

	/// ABI encoded order, 0x prefixed
	#[arg(long)]
	pub encoded_order: String,

	/// Swapper signature over the encoded order
	#[arg(long)]
	pub signature: String,

	#[arg(long)]
	pub chain_id: u64,

	#[arg(long)]
	pub quote_id: Option<String>,

	#[arg(long)]
	pub request_id: Option<String>,

	/// Store a priority order without cosigning it
	#[arg(long)]
	pub no_cosign: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum CliOrderType {
	Dutch,
	Limit,
	Priority,
}

impl From<CliOrderType> for OrderType {
	fn from(order_type: CliOrderType) -> Self {
		match order_type {
			CliOrderType::Dutch => OrderType::Dutch,
			CliOrderType::Limit => OrderType::Limit,
			CliOrderType::Priority => OrderType::Priority,
		}
	}
}
