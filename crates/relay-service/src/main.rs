use anyhow::{Context, Result};
use clap::Parser;
use relay_config::load_config;
use relay_core::OrderRelay;
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{
	layer::SubscriberExt, reload, util::SubscriberInitExt, EnvFilter, Registry,
};

mod cli;
mod commands;

use cli::{Cli, Command};

const DEFAULT_LOG_LEVEL: &str = "info";

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();

	let filter = setup_tracing(cli.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL))?;

	let config = load_config(cli.config.as_deref()).await?;

	// The command line wins over the configuration file
	if cli.log_level.is_none() {
		filter
			.reload(env_filter(&config.relay.log_level)?)
			.context("Failed to apply configured log level")?;
	}

	info!(name = %config.relay.name, "Configuration loaded");

	let relay = OrderRelay::from_config(&config).context("Failed to initialize relay")?;

	match cli.command {
		Command::Validate => print_json(&commands::validate(&relay, &config).await?),
		Command::Submit(args) => print_json(&commands::submit(&relay, args).await?),
		Command::Cosign { order_hash } => print_json(&commands::cosign(&relay, &order_hash).await?),
		Command::Get { order_hash } => print_json(&commands::get(&relay, &order_hash).await?),
	}
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
	let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
	println!("{}", json);
	Ok(())
}

fn env_filter(log_level: &str) -> Result<EnvFilter> {
	EnvFilter::try_from_default_env()
		.or_else(|_| EnvFilter::try_new(log_level))
		.with_context(|| format!("Invalid log level '{}'", log_level))
}

/// Installs the subscriber before configuration is read so loading is logged.
/// The returned handle swaps in the configured filter afterwards.
fn setup_tracing(log_level: &str) -> Result<reload::Handle<EnvFilter, Registry>> {
	let (filter, handle) = reload::Layer::new(env_filter(log_level)?);

	// Logs go to stderr so stdout only carries command output
	tracing_subscriber::registry()
		.with(filter)
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.init();

	Ok(handle)
}
