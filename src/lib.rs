//! Credential-lifecycle broker for a GitHub App integration: short-lived signed
//! assertions, installation token exchange, expiry-aware two-tier caching, and
//! retry-once authorized requests.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod jwt;
pub mod obs;
pub mod store;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::{AppId, Credential, CredentialKind, InstallationId, SigningIdentity, TokenSecret},
		flows::Broker,
		store::{CredentialStore, MemoryStore},
	};

	/// RSA private key fixture used to sign test assertions.
	pub const TEST_PRIVATE_KEY: &str = include_str!("../tests/fixtures/private-key.pem");
	/// Public half of [`TEST_PRIVATE_KEY`], used to decode and inspect test assertions.
	pub const TEST_PUBLIC_KEY: &str = include_str!("../tests/fixtures/public-key.pem");

	/// Builds the `{app: 42, installation: 7}` identity used across the test suites.
	pub fn test_identity() -> SigningIdentity {
		let app_id = AppId::new(42).expect("Test app identifier should be valid.");
		let installation_id =
			InstallationId::new(7).expect("Test installation identifier should be valid.");

		SigningIdentity::from_pem(app_id, installation_id, TEST_PRIVATE_KEY.as_bytes())
			.expect("Test private key fixture should parse.")
	}

	/// Constructs a [`Broker`] backed by an in-memory store and pointed at a mock authority.
	pub fn build_test_broker(api_base: &str) -> (Broker, Arc<MemoryStore>) {
		let store_backend = Arc::new(MemoryStore::default());
		let store: Arc<dyn CredentialStore> = store_backend.clone();
		let broker = Broker::new(store, test_identity())
			.expect("Test broker should build.")
			.with_api_base(Url::parse(api_base).expect("Mock authority URL should parse."));

		(broker, store_backend)
	}

	/// Seeds a credential slot directly, bypassing the flows.
	pub async fn seed_credential(
		store: &MemoryStore,
		kind: CredentialKind,
		value: &str,
		expires_at: OffsetDateTime,
	) {
		store
			.save(Credential::new(kind, TokenSecret::new(value), expires_at))
			.await
			.expect("Seeding the in-memory store should succeed.");
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::RwLock;
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError, Method};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

pub use reqwest;
pub use url;
#[cfg(test)] use {github_app_broker as _, httpmock as _};
#[cfg(feature = "cli")] use {clap as _, tokio as _, tracing_subscriber as _};
