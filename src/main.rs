//! Command-line entry point for the broker.
//!
//! Without a subcommand it runs the default workflow: mint or reuse an installation
//! token, then fetch the configured repository with it.

// std
use std::{process::ExitCode, sync::Arc};
// crates.io
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
// self
use github_app_broker::{
	config::AppConfig,
	error::Result,
	flows::Broker,
	store::{CredentialStore, FileStore},
};

#[derive(Debug, Parser)]
#[command(name = "github-app-broker", version, about = "GitHub App credential broker")]
struct Cli {
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	/// Create the credential cache file without contacting the authority.
	Init,
	/// Validate the environment configuration and the private key, locally.
	Check,
}

#[tokio::main]
async fn main() -> ExitCode {
	tracing_subscriber::fmt()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
		.init();

	match run(Cli::parse()).await {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			tracing::error!("{e}");

			ExitCode::FAILURE
		},
	}
}

async fn run(cli: Cli) -> Result<()> {
	let config = AppConfig::from_env()?;

	match cli.command {
		Some(Command::Init) => {
			FileStore::init(&config.cache_path)?;

			tracing::info!("Credential cache initialized at {}.", config.cache_path.display());
		},
		Some(Command::Check) => {
			config.load_identity()?;

			tracing::info!(
				"Configuration OK: app {} installation {}.",
				config.app_id,
				config.installation_id,
			);
		},
		None => {
			let identity = config.load_identity()?;
			let store: Arc<dyn CredentialStore> = Arc::new(FileStore::open(&config.cache_path)?);
			let broker = Broker::new(store, identity)?;
			let token = broker.installation_token(false).await?;

			tracing::info!("Installation token valid until {}.", token.expires_at);

			let repository = broker.get(config.repo_url(&broker.api_base)?).await?;

			if let Some(full_name) = repository.get("full_name").and_then(|v| v.as_str()) {
				tracing::info!("Authenticated against {full_name}.");
			}
		},
	}

	Ok(())
}
