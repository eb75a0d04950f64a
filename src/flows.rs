//! Broker orchestration: assertion minting, installation token exchange, and the
//! authorized request executor.
//!
//! The [`Broker`] holds the pieces every flow needs. Each flow reads the relevant
//! cache slot first, talks to the authority only on a miss or a forced refresh, and
//! writes the fresh credential back before returning. Storage failures never abort a
//! flow; they degrade to a cache miss on read and to a skipped write on save.

mod assertion;
mod installation;
pub mod request;

pub use request::AuthMode;

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKind, SigningIdentity},
	error::ConfigError,
	http::ApiClient,
	jwt::AssertionIssuer,
	store::CredentialStore,
};

/// Base URL of the hosted authority's REST API.
pub const DEFAULT_API_BASE: &str = "https://api.github.com/";

/// Credential broker for one app/installation pair.
#[derive(Clone)]
pub struct Broker {
	/// HTTP client used for every authority call.
	pub api_client: ApiClient,
	/// Backing store holding the two credential slots.
	pub store: Arc<dyn CredentialStore>,
	/// App identity plus the signing key for tier-1 assertions.
	pub identity: SigningIdentity,
	/// Assertion lifetime and clock-skew policy.
	pub issuer: AssertionIssuer,
	/// Authority API base; joined against to form every endpoint.
	pub api_base: Url,
}
impl Broker {
	/// Builds a broker with a default HTTP client and the hosted authority base URL.
	pub fn new(store: Arc<dyn CredentialStore>, identity: SigningIdentity) -> Result<Self> {
		Self::with_api_client(store, identity, ApiClient::new()?)
	}

	/// Builds a broker around a caller-provided HTTP client.
	pub fn with_api_client(
		store: Arc<dyn CredentialStore>,
		identity: SigningIdentity,
		api_client: ApiClient,
	) -> Result<Self> {
		let api_base = Url::parse(DEFAULT_API_BASE)
			.map_err(|source| ConfigError::InvalidApiBase { source })?;

		Ok(Self { api_client, store, identity, issuer: AssertionIssuer::default(), api_base })
	}

	/// Points the broker at a different authority base, e.g. an enterprise host.
	pub fn with_api_base(mut self, api_base: Url) -> Self {
		self.api_base = api_base;

		self
	}

	/// Overrides the assertion issuance policy.
	pub fn with_issuer(mut self, issuer: AssertionIssuer) -> Self {
		self.issuer = issuer;

		self
	}

	pub(crate) fn exchange_endpoint(&self) -> Result<Url> {
		self.api_base
			.join(&format!("app/installations/{}/access_tokens", self.identity.installation_id))
			.map_err(|source| ConfigError::InvalidApiBase { source }.into())
	}

	/// Reads a cache slot, treating storage failures as a miss.
	pub(crate) async fn load_slot(&self, kind: CredentialKind) -> Option<Credential> {
		match self.store.load(kind).await {
			Ok(slot) => slot,
			Err(_e) => {
				#[cfg(feature = "tracing")]
				tracing::warn!(
					credential = kind.as_str(),
					error = %_e,
					"Credential store read failed; treating the slot as empty.",
				);

				None
			},
		}
	}

	/// Writes a cache slot, logging and swallowing storage failures.
	pub(crate) async fn store_slot(&self, credential: &Credential) {
		if let Err(_e) = self.store.save(credential.clone()).await {
			#[cfg(feature = "tracing")]
			tracing::warn!(
				credential = credential.kind.as_str(),
				error = %_e,
				"Credential store write failed; the fresh credential is not cached.",
			);
		}
	}
}
impl Debug for Broker {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Broker")
			.field("identity", &self.identity)
			.field("api_base", &self.api_base.as_str())
			.finish_non_exhaustive()
	}
}
