//! Signed assertion issuance (the tier-1 credential).
//!
//! The authority accepts an RS256 JWT whose claims carry the application id as the
//! issuer, an issued-at instant backdated to absorb clock drift between this process
//! and the authority's clock, and an expiry at most ten minutes out. The default
//! window is deliberately short: one minute bounds the blast radius of a leaked
//! assertion.

// crates.io
use jsonwebtoken::{Algorithm, Header};
// self
use crate::{
	_prelude::*,
	auth::{Credential, CredentialKind, SigningIdentity, TokenSecret},
	error::SigningError,
};

/// Hard ceiling the authority enforces on assertion lifetimes.
pub const MAX_LIFETIME: Duration = Duration::seconds(600);
/// Default validity window for freshly minted assertions.
pub const DEFAULT_LIFETIME: Duration = Duration::seconds(60);
/// Default backdating applied to the issued-at claim.
pub const DEFAULT_SKEW_ALLOWANCE: Duration = Duration::seconds(60);

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
	iat: i64,
	exp: i64,
	iss: String,
}

/// Mints short-lived signed assertions from a [`SigningIdentity`].
///
/// Issuance is deterministic given identical inputs and key, with no side effects
/// beyond CPU; persistence is the caller's concern.
#[derive(Clone, Copy, Debug)]
pub struct AssertionIssuer {
	/// Validity window granted to each assertion.
	pub lifetime: Duration,
	/// Backdating applied to the issued-at claim to compensate for clock drift.
	pub skew_allowance: Duration,
}
impl AssertionIssuer {
	/// Overrides the validity window; values beyond the authority maximum fail at issue time.
	pub fn with_lifetime(mut self, lifetime: Duration) -> Self {
		self.lifetime = lifetime;

		self
	}

	/// Overrides the issued-at backdating.
	pub fn with_skew_allowance(mut self, skew_allowance: Duration) -> Self {
		self.skew_allowance = skew_allowance;

		self
	}

	/// Builds and signs the claim set for `now`, returning a tier-1 credential.
	pub fn issue(
		&self,
		identity: &SigningIdentity,
		now: OffsetDateTime,
	) -> Result<Credential, SigningError> {
		if !self.lifetime.is_positive() {
			return Err(SigningError::NonPositiveLifetime);
		}
		if self.lifetime > MAX_LIFETIME {
			return Err(SigningError::LifetimeTooLong { max: MAX_LIFETIME.whole_seconds() });
		}

		let expires_at = now + self.lifetime;
		let claims = Claims {
			iat: (now - self.skew_allowance).unix_timestamp(),
			exp: expires_at.unix_timestamp(),
			iss: identity.app_id.to_string(),
		};
		let token =
			jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, identity.encoding_key())
				.map_err(|source| SigningError::Encode { source })?;

		Ok(Credential::new(CredentialKind::Assertion, TokenSecret::new(token), expires_at))
	}
}
impl Default for AssertionIssuer {
	fn default() -> Self {
		Self { lifetime: DEFAULT_LIFETIME, skew_allowance: DEFAULT_SKEW_ALLOWANCE }
	}
}
