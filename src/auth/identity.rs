//! Strongly typed identity parameters and the signing key handle.

// crates.io
use jsonwebtoken::EncodingKey;
// self
use crate::{_prelude::*, error::SigningError};

macro_rules! def_id {
	($name:ident, $doc:literal, $kind:literal) => {
		#[doc = $doc]
		#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
		#[serde(try_from = "u64", into = "u64")]
		pub struct $name(u64);
		impl $name {
			/// Creates a new identifier after validation.
			pub fn new(value: u64) -> Result<Self, IdentifierError> {
				if value == 0 {
					return Err(IdentifierError::Zero { kind: $kind });
				}

				Ok(Self(value))
			}

			/// Returns the raw numeric value.
			pub fn get(self) -> u64 {
				self.0
			}
		}
		impl From<$name> for u64 {
			fn from(value: $name) -> Self {
				value.0
			}
		}
		impl TryFrom<u64> for $name {
			type Error = IdentifierError;

			fn try_from(value: u64) -> Result<Self, Self::Error> {
				Self::new(value)
			}
		}
		impl Debug for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, concat!($kind, "({})"), self.0)
			}
		}
		impl Display for $name {
			fn fmt(&self, f: &mut Formatter) -> FmtResult {
				write!(f, "{}", self.0)
			}
		}
		impl FromStr for $name {
			type Err = IdentifierError;

			fn from_str(s: &str) -> Result<Self, Self::Err> {
				let value = s
					.trim()
					.parse::<u64>()
					.map_err(|_| IdentifierError::NotNumeric { kind: $kind })?;

				Self::new(value)
			}
		}
	};
}

/// Error returned when identifier validation fails.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, ThisError)]
pub enum IdentifierError {
	/// The identifier is not a base-10 integer.
	#[error("{kind} identifier must be a base-10 integer.")]
	NotNumeric {
		/// Kind of identifier (app, installation).
		kind: &'static str,
	},
	/// The identifier is zero.
	#[error("{kind} identifier must be non-zero.")]
	Zero {
		/// Kind of identifier (app, installation).
		kind: &'static str,
	},
}

def_id! { AppId, "Numeric identifier the authority assigned to the application; used as the `iss` claim.", "App" }
def_id! { InstallationId, "Numeric identifier of the application's installation.", "Installation" }

/// Immutable signing identity: a private key handle plus issuer and installation identifiers.
///
/// Loaded once at startup and never mutated afterwards.
#[derive(Clone)]
pub struct SigningIdentity {
	/// Application identifier stamped into every assertion as its issuer.
	pub app_id: AppId,
	/// Installation whose access tokens this identity can mint.
	pub installation_id: InstallationId,
	key: EncodingKey,
}
impl SigningIdentity {
	/// Parses a PEM-encoded RSA private key and binds it to the identifiers.
	pub fn from_pem(
		app_id: AppId,
		installation_id: InstallationId,
		pem: &[u8],
	) -> Result<Self, SigningError> {
		let key = EncodingKey::from_rsa_pem(pem).map_err(|source| SigningError::KeyParse { source })?;

		Ok(Self { app_id, installation_id, key })
	}

	/// Returns the parsed key for signing; callers must not log or persist it.
	pub(crate) fn encoding_key(&self) -> &EncodingKey {
		&self.key
	}
}
impl Debug for SigningIdentity {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SigningIdentity")
			.field("app_id", &self.app_id)
			.field("installation_id", &self.installation_id)
			.field("key", &"<redacted>")
			.finish()
	}
}
