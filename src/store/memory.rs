//! Thread-safe in-memory [`CredentialStore`] for tests and injected fakes.

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKind},
	store::{CredentialStore, StoreError, StoreFuture},
};

type SlotMap = Arc<RwLock<HashMap<CredentialKind, Credential>>>;

/// Keeps both slots in-process; the backing map is shared across clones.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(SlotMap);
impl MemoryStore {
	fn save_now(slots: SlotMap, credential: Credential) -> Result<(), StoreError> {
		slots.write().insert(credential.kind, credential);

		Ok(())
	}

	fn load_now(slots: SlotMap, kind: CredentialKind) -> Option<Credential> {
		slots.read().get(&kind).cloned()
	}
}
impl CredentialStore for MemoryStore {
	fn save(&self, credential: Credential) -> StoreFuture<'_, ()> {
		let slots = self.0.clone();

		Box::pin(async move { Self::save_now(slots, credential) })
	}

	fn load(&self, kind: CredentialKind) -> StoreFuture<'_, Option<Credential>> {
		let slots = self.0.clone();

		Box::pin(async move { Ok(Self::load_now(slots, kind)) })
	}
}
