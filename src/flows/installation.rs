//! Tier-2 flow: exchange a signed assertion for an installation access token.

// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKind, TokenSecret},
	flows::Broker,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

#[derive(Debug, Deserialize)]
struct ExchangeResponse {
	token: String,
	#[serde(with = "time::serde::rfc3339")]
	expires_at: OffsetDateTime,
}

impl Broker {
	/// Returns a currently valid installation token, exchanging an assertion for a
	/// fresh one on a cache miss.
	///
	/// `force` bypasses the tier-2 cache read; the tier-1 cache is still consulted for
	/// the assertion. An authority 401 forces a tier-1 re-mint and retries the
	/// exchange exactly once; a second 401 is terminal.
	pub async fn installation_token(&self, force: bool) -> Result<Credential> {
		const KIND: FlowKind = FlowKind::Exchange;

		let span = FlowSpan::new(KIND, "installation_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let now = OffsetDateTime::now_utc();

				if !force && let Some(cached) = self
					.load_slot(CredentialKind::InstallationToken)
					.await
					.filter(|c| c.is_valid_at(now))
				{
					return Ok(cached);
				}

				let endpoint = self.exchange_endpoint()?;
				let assertion = self.app_assertion(false).await?;
				let mut response = self
					.api_client
					.send(
						Method::POST,
						endpoint.clone(),
						Some(format!("Bearer {}", assertion.value.expose())),
						None,
					)
					.await?;

				if response.is_unauthorized() {
					// The assertion looked valid locally yet the authority rejected it,
					// likely clock skew or a key rotated underneath us. Re-mint once.
					let reminted = self.app_assertion(true).await?;

					response = self
						.api_client
						.send(
							Method::POST,
							endpoint,
							Some(format!("Bearer {}", reminted.value.expose())),
							None,
						)
						.await?;

					if response.is_unauthorized() {
						return Err(Error::Authorization { kind: CredentialKind::Assertion });
					}
				}
				if !response.is_success() {
					return Err(Error::Remote { status: response.status, body: response.body });
				}

				let payload = response.parse::<ExchangeResponse>()?;
				let credential = Credential::new(
					CredentialKind::InstallationToken,
					TokenSecret::new(payload.token),
					payload.expires_at,
				);

				self.store_slot(&credential).await;

				Ok(credential)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
