//! OAuth 2.0 bearer tokens issued by the modern flow.

// self
use crate::{
	_prelude::*,
	auth::{ScopeSet, TokenSecret},
};

/// Errors produced by [`BearerTokenBuilder`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum BearerTokenBuilderError {
	/// Issued when no access token value was provided.
	#[error("Access token is required.")]
	MissingAccessToken,
}

/// Bearer credential plus the optional refresh token and expiry returned by the provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct BearerToken {
	/// Access token secret; callers must avoid logging it.
	pub access_token: TokenSecret,
	/// Refresh token secret, if the provider issued one.
	pub refresh_token: Option<TokenSecret>,
	/// Scopes granted (or requested, when the provider does not echo them).
	pub scope: ScopeSet,
	/// Instant the token response was received.
	pub issued_at: OffsetDateTime,
	/// Expiry derived from `expires_in`; `None` when the provider omitted it.
	pub expires_at: Option<OffsetDateTime>,
}
impl BearerToken {
	/// Returns an empty builder.
	pub fn builder() -> BearerTokenBuilder {
		BearerTokenBuilder::default()
	}

	/// Returns `true` when an expiry is known and has passed at `instant`.
	pub fn is_expired_at(&self, instant: OffsetDateTime) -> bool {
		self.expires_at.is_some_and(|expires_at| instant >= expires_at)
	}
}
impl Debug for BearerToken {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("BearerToken")
			.field("access_token", &"<redacted>")
			.field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
			.field("scope", &self.scope)
			.field("issued_at", &self.issued_at)
			.field("expires_at", &self.expires_at)
			.finish()
	}
}

/// Builder for [`BearerToken`].
#[derive(Clone, Debug, Default)]
pub struct BearerTokenBuilder {
	access_token: Option<TokenSecret>,
	refresh_token: Option<TokenSecret>,
	scope: ScopeSet,
	issued_at: Option<OffsetDateTime>,
	expires_in: Option<Duration>,
}
impl BearerTokenBuilder {
	/// Provides the access token value.
	pub fn access_token(mut self, token: impl Into<String>) -> Self {
		self.access_token = Some(TokenSecret::new(token));

		self
	}

	/// Provides the refresh token value.
	pub fn refresh_token(mut self, token: impl Into<String>) -> Self {
		self.refresh_token = Some(TokenSecret::new(token));

		self
	}

	/// Sets the granted scopes.
	pub fn scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Sets the issued-at instant (defaults to now).
	pub fn issued_at(mut self, instant: OffsetDateTime) -> Self {
		self.issued_at = Some(instant);

		self
	}

	/// Sets the relative lifetime reported by the provider.
	pub fn expires_in(mut self, duration: Duration) -> Self {
		self.expires_in = Some(duration);

		self
	}

	/// Consumes the builder and produces a [`BearerToken`].
	pub fn build(self) -> Result<BearerToken, BearerTokenBuilderError> {
		let access_token = self.access_token.ok_or(BearerTokenBuilderError::MissingAccessToken)?;
		let issued_at = self.issued_at.unwrap_or_else(OffsetDateTime::now_utc);

		Ok(BearerToken {
			access_token,
			refresh_token: self.refresh_token,
			scope: self.scope,
			issued_at,
			expires_at: self.expires_in.map(|delta| issued_at + delta),
		})
	}
}
