//! Environment-driven configuration for the command-line workflow.

// std
use std::{env, fs, path::PathBuf};
// self
use crate::{
	_prelude::*,
	auth::{AppId, InstallationId, SigningIdentity},
	error::ConfigError,
};

/// Numeric application identifier.
pub const ENV_APP_ID: &str = "GITHUB_APP_ID";
/// Numeric installation identifier.
pub const ENV_INSTALLATION_ID: &str = "GITHUB_INSTALLATION_ID";
/// Owner of the repository targeted by the default workflow.
pub const ENV_REPO_OWNER: &str = "GITHUB_REPO_OWNER";
/// Name of the repository targeted by the default workflow.
pub const ENV_REPO_NAME: &str = "GITHUB_REPO_NAME";
/// Filesystem path of the PEM-encoded app private key.
pub const ENV_PRIVATE_KEY_PATH: &str = "GITHUB_PRIVATE_KEY_PATH";
/// Filesystem path of the credential cache file; optional.
pub const ENV_CACHE_PATH: &str = "GITHUB_BROKER_CACHE";

/// Cache location used when [`ENV_CACHE_PATH`] is not set.
pub const DEFAULT_CACHE_PATH: &str = "github-app-credentials.json";

/// Validated program configuration assembled from the environment.
#[derive(Clone, Debug)]
pub struct AppConfig {
	/// Application identifier, the assertion issuer.
	pub app_id: AppId,
	/// Installation whose tokens the broker mints.
	pub installation_id: InstallationId,
	/// Owner of the workflow's target repository.
	pub repo_owner: String,
	/// Name of the workflow's target repository.
	pub repo_name: String,
	/// PEM-encoded private key location.
	pub private_key_path: PathBuf,
	/// Credential cache file location.
	pub cache_path: PathBuf,
}
impl AppConfig {
	/// Reads and validates the configuration from process environment variables.
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|name| env::var(name).ok())
	}

	/// Reads the configuration through a caller-supplied variable lookup.
	///
	/// Whitespace-only values count as unset. Identifier variables must parse as
	/// non-zero base-10 integers.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		fn require(
			lookup: &impl Fn(&str) -> Option<String>,
			name: &'static str,
		) -> Result<String, ConfigError> {
			lookup(name)
				.map(|value| value.trim().to_owned())
				.filter(|value| !value.is_empty())
				.ok_or(ConfigError::MissingVar { name })
		}

		let app_id = require(&lookup, ENV_APP_ID)?
			.parse::<AppId>()
			.map_err(|e| ConfigError::InvalidVar { name: ENV_APP_ID, source: Box::new(e) })?;
		let installation_id =
			require(&lookup, ENV_INSTALLATION_ID)?.parse::<InstallationId>().map_err(|e| {
				ConfigError::InvalidVar { name: ENV_INSTALLATION_ID, source: Box::new(e) }
			})?;
		let repo_owner = require(&lookup, ENV_REPO_OWNER)?;
		let repo_name = require(&lookup, ENV_REPO_NAME)?;
		let private_key_path = require(&lookup, ENV_PRIVATE_KEY_PATH)?.into();
		let cache_path = lookup(ENV_CACHE_PATH)
			.map(|value| value.trim().to_owned())
			.filter(|value| !value.is_empty())
			.unwrap_or_else(|| DEFAULT_CACHE_PATH.to_owned())
			.into();

		Ok(Self { app_id, installation_id, repo_owner, repo_name, private_key_path, cache_path })
	}

	/// Reads the private key file and builds the signing identity.
	///
	/// Purely local; no network calls. This is what `check` verifies.
	pub fn load_identity(&self) -> Result<SigningIdentity> {
		let pem = fs::read(&self.private_key_path).map_err(|source| ConfigError::KeyFile {
			path: self.private_key_path.clone(),
			source,
		})?;

		Ok(SigningIdentity::from_pem(self.app_id, self.installation_id, &pem)?)
	}

	/// Endpoint of the workflow's target repository under the given API base.
	pub fn repo_url(&self, api_base: &Url) -> Result<Url, ConfigError> {
		api_base
			.join(&format!("repos/{}/{}", self.repo_owner, self.repo_name))
			.map_err(|source| ConfigError::InvalidApiBase { source })
	}
}
