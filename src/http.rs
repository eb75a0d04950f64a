//! Thin HTTP layer shared by every flow.
//!
//! Responses are snapshotted into status plus body text before any interpretation, so
//! flow code can branch on the status, retry, and parse without holding a live
//! connection object.

// std
use std::time::Duration as StdDuration;
// crates.io
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError},
};

/// User agent presented on every outbound request.
pub const AGENT: &str = concat!("github-app-broker/", env!("CARGO_PKG_VERSION"));
/// Accept header requesting the authority's stable JSON media type.
pub const ACCEPT_JSON: &str = "application/vnd.github+json";
/// Per-request timeout covering connect, write, and read.
pub const REQUEST_TIMEOUT: StdDuration = StdDuration::from_secs(60);

/// Buffered response snapshot: status code plus the full body text.
#[derive(Clone, Debug)]
pub struct ApiResponse {
	/// HTTP status code.
	pub status: u16,
	/// Raw body text, unparsed.
	pub body: String,
}
impl ApiResponse {
	/// Whether the status falls in the 2xx range.
	pub fn is_success(&self) -> bool {
		(200..300).contains(&self.status)
	}

	/// Whether the authority rejected the presented credential.
	pub fn is_unauthorized(&self) -> bool {
		self.status == 401
	}

	/// Deserializes the body, reporting the JSON path of the first mismatch on failure.
	pub fn parse<T>(&self) -> Result<T>
	where
		T: for<'de> Deserialize<'de>,
	{
		let mut deserializer = serde_json::Deserializer::from_str(&self.body);

		serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| Error::ResponseParse { source, status: self.status })
	}
}

/// Shared HTTP client wrapper applying the identification and timeout defaults.
#[derive(Clone, Debug)]
pub struct ApiClient(ReqwestClient);
impl ApiClient {
	/// Builds a client with the default timeout.
	pub fn new() -> Result<Self, ConfigError> {
		let client = ReqwestClient::builder().timeout(REQUEST_TIMEOUT).build()?;

		Ok(Self(client))
	}

	/// Wraps a preconfigured client, e.g. one with proxy or TLS settings applied.
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Sends a request and buffers the full response.
	///
	/// The user-agent and accept headers are always attached; the authorization header
	/// only when provided. Non-2xx statuses are not errors at this layer.
	pub async fn send(
		&self,
		method: Method,
		url: Url,
		authorization: Option<String>,
		body: Option<&serde_json::Value>,
	) -> Result<ApiResponse, TransportError> {
		let mut request =
			self.0.request(method, url).header(USER_AGENT, AGENT).header(ACCEPT, ACCEPT_JSON);

		if let Some(authorization) = authorization {
			request = request.header(AUTHORIZATION, authorization);
		}
		if let Some(body) = body {
			request = request.json(body);
		}

		let response = request.send().await?;
		let status = response.status().as_u16();
		let body = response.text().await?;

		Ok(ApiResponse { status, body })
	}
}
