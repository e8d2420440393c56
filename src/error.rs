//! Crate-level error types shared across flows, providers, and account stores.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Account store failure.
	#[error("{0}")]
	Storage(
		#[from]
		#[source]
		crate::store::StoreError,
	),
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Temporary upstream failure.
	#[error(transparent)]
	Transient(#[from] TransientError),
	/// Transport failure (DNS, TCP, TLS).
	#[error(transparent)]
	Transport(#[from] TransportError),

	/// Provider rejected the grant (bad verifier, code, or token).
	#[error("Provider rejected the grant: {reason}.")]
	InvalidGrant {
		/// Provider- or crate-supplied reason string.
		reason: String,
	},
	/// Consumer authentication failed or credentials are malformed.
	#[error("Client authentication failed: {reason}.")]
	InvalidClient {
		/// Provider- or crate-supplied reason string.
		reason: String,
	},
	/// The member declined the authorization request at the provider.
	#[error("Authorization was denied: {reason}.")]
	AccessDenied {
		/// Provider-supplied error code or description.
		reason: String,
	},
	/// The callback request does not carry what the pending authorization expects.
	#[error("Callback request is invalid: {reason}.")]
	InvalidCallback {
		/// Explanation of the mismatch.
		reason: String,
	},
}
impl Error {
	/// Returns `true` for failures that should end in the login error redirect rather than
	/// propagate to the host as an internal error.
	pub fn is_authentication_failure(&self) -> bool {
		matches!(
			self,
			Self::InvalidGrant { .. }
				| Self::InvalidClient { .. }
				| Self::AccessDenied { .. }
				| Self::InvalidCallback { .. }
		)
	}
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// Provider descriptor contains an invalid URL.
	#[error("Descriptor contains an invalid URL.")]
	InvalidDescriptor {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// Identifier failed validation.
	#[error(transparent)]
	InvalidIdentifier(#[from] crate::auth::IdentifierError),
	/// Provider descriptor failed validation.
	#[error(transparent)]
	Descriptor(#[from] crate::provider::ProviderDescriptorError),
	/// Redirect URI cannot be parsed.
	#[error("Redirect URI is invalid.")]
	InvalidRedirect {
		/// Underlying parsing failure.
		#[source]
		source: oauth2::url::ParseError,
	},
	/// A required setting is absent or empty.
	#[error("Required setting `{name}` is missing.")]
	MissingSetting {
		/// Setting (environment variable) name.
		name: &'static str,
	},

	/// Flow was constructed with a descriptor for another protocol.
	#[error("Descriptor `{descriptor}` does not describe an {expected} provider.")]
	UnsupportedProtocol {
		/// Provider identifier string.
		descriptor: String,
		/// Protocol label the flow requires.
		expected: &'static str,
	},
	/// Credential or pending state belongs to the other protocol.
	#[error("The {flow} flow cannot use {given} state.")]
	ProtocolMismatch {
		/// Protocol label of the flow.
		flow: &'static str,
		/// Protocol label of the supplied state.
		given: &'static str,
	},
	/// HMAC-SHA1 rejected the OAuth 1.0a signing key.
	#[error("OAuth 1.0a signing key is invalid.")]
	SigningKey,
	/// Requested scopes cannot be normalized.
	#[error("Requested scopes are invalid.")]
	InvalidScope(#[from] crate::auth::ScopeValidationError),
	/// Bearer token builder validation failed.
	#[error("Unable to build bearer token.")]
	TokenBuild(#[from] crate::auth::BearerTokenBuilderError),
	/// Token endpoint returned an excessively large `expires_in`.
	#[error("The expires_in value exceeds the supported range.")]
	ExpiresInOutOfRange,
	/// Token endpoint returned a non-positive duration.
	#[error("The expires_in value must be positive.")]
	NonPositiveExpiresIn,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Temporary failure variants.
#[derive(Debug, ThisError)]
pub enum TransientError {
	/// Provider returned an unexpected but non-fatal response.
	#[error("The {endpoint} endpoint returned an unexpected response: {message}.")]
	ProviderEndpoint {
		/// Endpoint label (request_token, access_token, profile).
		endpoint: &'static str,
		/// Provider- or crate-supplied message summarizing the failure.
		message: String,
		/// HTTP status code, when available.
		status: Option<u16>,
		/// Retry-After hint from upstream, if supplied.
		retry_after: Option<Duration>,
	},
	/// Token endpoint responded with malformed JSON that could not be parsed.
	#[error("Token endpoint returned malformed JSON.")]
	TokenResponseParse {
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::error::Error>,
		/// HTTP status code, when available.
		status: Option<u16>,
	},
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn authentication_failures_are_distinguished_from_internal_errors() {
		assert!(Error::InvalidGrant { reason: "token_rejected".into() }.is_authentication_failure());
		assert!(Error::AccessDenied { reason: "access_denied".into() }.is_authentication_failure());
		assert!(
			Error::InvalidCallback { reason: "missing code".into() }.is_authentication_failure()
		);

		let io = std::io::Error::other("connection reset");

		assert!(!Error::from(TransportError::Io(io)).is_authentication_failure());
		assert!(
			!Error::from(ConfigError::MissingSetting { name: "MEETUP_CONSUMER_KEY" })
				.is_authentication_failure()
		);
	}

	#[test]
	fn missing_setting_names_the_variable() {
		let err = ConfigError::MissingSetting { name: "MEETUP_CONSUMER_SECRET" };

		assert_eq!(err.to_string(), "Required setting `MEETUP_CONSUMER_SECRET` is missing.");
	}
}
