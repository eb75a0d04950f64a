//! Tier-1 flow: serve a cached assertion or mint and cache a new one.

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKind},
	flows::Broker,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl Broker {
	/// Returns a currently valid signed assertion, minting one on a cache miss.
	///
	/// `force` bypasses the cache read and always mints; the fresh assertion still
	/// replaces the cached slot. Minting is local-only, so this flow never touches the
	/// network.
	pub async fn app_assertion(&self, force: bool) -> Result<Credential> {
		const KIND: FlowKind = FlowKind::Assertion;

		let span = FlowSpan::new(KIND, "app_assertion");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let now = OffsetDateTime::now_utc();

				if !force && let Some(cached) = self
					.load_slot(CredentialKind::Assertion)
					.await
					.filter(|c| c.is_valid_at(now))
				{
					return Ok(cached);
				}

				let minted = self.issuer.issue(&self.identity, now)?;

				self.store_slot(&minted).await;

				Ok(minted)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
