//! Broker-level error types shared across flows, stores, and configuration.

// std
use std::path::PathBuf;
// self
use crate::{_prelude::*, auth::CredentialKind};

/// Broker-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical broker error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Storage-layer failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Assertion signing failure.
	#[error(transparent)]
	Signing(#[from] SigningError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Authority rejected the credential again after a forced refresh.
	#[error("Authority rejected the {kind} credential twice in a row.")]
	Authorization {
		/// Credential tier the authority refused.
		kind: CredentialKind,
	},
	/// Authority answered with a non-401 error status.
	#[error("Authority returned HTTP {status}.")]
	Remote {
		/// HTTP status code.
		status: u16,
		/// Raw response body, kept for diagnostics.
		body: String,
	},
	/// Authority answered 2xx with a body that does not match the expected shape.
	#[error("Authority returned malformed JSON.")]
	ResponseParse {
		/// Structured parsing failure naming the offending JSON path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
		/// HTTP status code of the malformed response.
		status: u16,
	},
}

/// Configuration and validation failures raised at startup.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Required environment variable is missing or empty.
	#[error("Environment variable `{name}` is not set.")]
	MissingVar {
		/// Variable name.
		name: &'static str,
	},
	/// Environment variable holds a value that fails validation.
	#[error("Environment variable `{name}` holds an invalid value.")]
	InvalidVar {
		/// Variable name.
		name: &'static str,
		/// Underlying validation failure.
		#[source]
		source: BoxError,
	},
	/// Private key file could not be read.
	#[error("Private key file `{path}` could not be read.")]
	KeyFile {
		/// Configured key path.
		path: PathBuf,
		/// Underlying IO failure.
		#[source]
		source: std::io::Error,
	},
	/// Authority base URL, or a URL derived from it, is invalid.
	#[error("Authority URL is invalid.")]
	InvalidApiBase {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Failures raised while building or signing an assertion.
#[derive(Debug, ThisError)]
pub enum SigningError {
	/// PEM-encoded private key could not be parsed.
	#[error("Private key PEM could not be parsed.")]
	KeyParse {
		/// Underlying key parsing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// Claim set could not be signed.
	#[error("Assertion claims could not be signed.")]
	Encode {
		/// Underlying signing failure.
		#[source]
		source: jsonwebtoken::errors::Error,
	},
	/// Configured assertion lifetime is zero or negative.
	#[error("Assertion lifetime must be positive.")]
	NonPositiveLifetime,
	/// Configured assertion lifetime exceeds the authority's hard maximum.
	#[error("Assertion lifetime exceeds the {max} second maximum accepted by the authority.")]
	LifetimeTooLong {
		/// Maximum permitted lifetime in seconds.
		max: i64,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the authority.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the authority.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}
