//! Storage contract and built-in implementations for the per-tier credential slots.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKind},
};

/// Future type returned by [`CredentialStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Persistence contract for the per-tier credential slots.
///
/// Each tier owns exactly one slot. `save` replaces the slot's contents atomically: a
/// concurrent `load` observes either the previous record or the new one in full, never
/// a torn value/expiry pair. Validity is evaluated lazily by callers through
/// [`Credential::is_valid_at`], so stores never sweep expired entries.
pub trait CredentialStore
where
	Self: Send + Sync,
{
	/// Persists or replaces the slot for the credential's tier.
	fn save(&self, credential: Credential) -> StoreFuture<'_, ()>;

	/// Fetches the slot for a tier; absent if never written.
	fn load(&self, kind: CredentialKind) -> StoreFuture<'_, Option<Credential>>;
}

/// Error type produced by [`CredentialStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}
