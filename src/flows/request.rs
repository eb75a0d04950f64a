//! Authorized request executor with a single retry after a forced credential refresh.
//!
//! Retry-on-401 is the only retry mechanism in the crate. The executor attempts the
//! request with whatever credential the cache serves; on a 401 it forces a refresh of
//! the selected tier and retries exactly once. A 401 on the retried attempt is
//! terminal, as are all non-2xx statuses other than the first 401.

// self
use crate::{
	_prelude::*,
	auth::CredentialKind,
	flows::Broker,
	http::ApiResponse,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

/// Selects which credential tier (if any) authorizes an executed request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
	/// No authorization header; 401 responses surface as remote errors.
	None,
	/// Tier-1 assertion via a `Bearer` header, for app-level endpoints.
	Assertion,
	/// Tier-2 installation token via a `token` header, for resource endpoints.
	Installation,
}
impl AuthMode {
	/// The credential tier backing this mode, if any.
	pub const fn credential_kind(self) -> Option<CredentialKind> {
		match self {
			AuthMode::None => None,
			AuthMode::Assertion => Some(CredentialKind::Assertion),
			AuthMode::Installation => Some(CredentialKind::InstallationToken),
		}
	}
}

impl Broker {
	/// Executes an authorized request against the authority and parses the JSON body.
	///
	/// Empty success bodies map to [`serde_json::Value::Null`].
	pub async fn execute(
		&self,
		method: Method,
		url: Url,
		body: Option<serde_json::Value>,
		auth: AuthMode,
	) -> Result<serde_json::Value> {
		const KIND: FlowKind = FlowKind::Request;

		let span = FlowSpan::new(KIND, "execute");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let first = self.attempt(&method, &url, body.as_ref(), auth, false).await?;
				let Some(kind) = auth.credential_kind() else {
					return Self::into_json(first);
				};

				if !first.is_unauthorized() {
					return Self::into_json(first);
				}

				let retried = self.attempt(&method, &url, body.as_ref(), auth, true).await?;

				if retried.is_unauthorized() {
					return Err(Error::Authorization { kind });
				}

				Self::into_json(retried)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Authorized `GET` with the installation token, the common resource-call shape.
	pub async fn get(&self, url: Url) -> Result<serde_json::Value> {
		self.execute(Method::GET, url, None, AuthMode::Installation).await
	}

	/// Authorized `POST` with the installation token and a JSON body.
	pub async fn post(&self, url: Url, body: serde_json::Value) -> Result<serde_json::Value> {
		self.execute(Method::POST, url, Some(body), AuthMode::Installation).await
	}

	async fn attempt(
		&self,
		method: &Method,
		url: &Url,
		body: Option<&serde_json::Value>,
		auth: AuthMode,
		force: bool,
	) -> Result<ApiResponse> {
		let authorization = match auth {
			AuthMode::None => None,
			AuthMode::Assertion =>
				Some(format!("Bearer {}", self.app_assertion(force).await?.value.expose())),
			AuthMode::Installation =>
				Some(format!("token {}", self.installation_token(force).await?.value.expose())),
		};
		let response = self.api_client.send(method.clone(), url.clone(), authorization, body).await?;

		Ok(response)
	}

	fn into_json(response: ApiResponse) -> Result<serde_json::Value> {
		if !response.is_success() {
			return Err(Error::Remote { status: response.status, body: response.body });
		}
		if response.body.trim().is_empty() {
			return Ok(serde_json::Value::Null);
		}

		response.parse()
	}
}
