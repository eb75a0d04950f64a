//! Expiry-aware credential values shared by both cache tiers.

// self
use crate::_prelude::*;

/// Cache tier a credential belongs to; doubles as the persisted slot key and as the
/// label carried by spans, metrics, and authorization errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CredentialKind {
	/// Short-lived self-signed assertion that only authenticates the token exchange.
	Assertion,
	/// Installation access token issued by the authority for resource calls.
	InstallationToken,
}
impl CredentialKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			CredentialKind::Assertion => "app_assertion",
			CredentialKind::InstallationToken => "installation_token",
		}
	}
}
impl Display for CredentialKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Redacted token value wrapper keeping sensitive material out of logs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSecret(String);
impl TokenSecret {
	/// Wraps a new secret string.
	pub fn new(value: impl Into<String>) -> Self {
		Self(value.into())
	}

	/// Returns the inner token value. Callers must avoid logging this string.
	pub fn expose(&self) -> &str {
		&self.0
	}
}
impl AsRef<str> for TokenSecret {
	fn as_ref(&self) -> &str {
		self.expose()
	}
}
impl Debug for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenSecret").field(&"<redacted>").finish()
	}
}
impl Display for TokenSecret {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("<redacted>")
	}
}

/// A cached credential for one tier: an opaque value plus its hard expiry.
///
/// The persisted form is a two-field record: the raw value and the expiry as integer
/// seconds since the epoch.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
	/// Tier this credential belongs to.
	pub kind: CredentialKind,
	/// Opaque signed value presented to the authority.
	pub value: TokenSecret,
	/// Hard expiry; the credential is unusable from this instant onwards.
	#[serde(with = "time::serde::timestamp")]
	pub expires_at: OffsetDateTime,
}
impl Credential {
	/// Bundles a value with its expiry for the given tier.
	pub fn new(kind: CredentialKind, value: TokenSecret, expires_at: OffsetDateTime) -> Self {
		Self { kind, value, expires_at }
	}

	/// A credential is usable iff `now` precedes the expiry and the value is non-empty.
	pub fn is_valid_at(&self, now: OffsetDateTime) -> bool {
		now < self.expires_at && !self.value.expose().is_empty()
	}
}
