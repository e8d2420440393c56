//! OAuth 1.0a token pairs and the request-token handshake state.

// crates.io
use url::form_urlencoded;
// self
use crate::{_prelude::*, auth::TokenSecret};

/// OAuth 1.0a token (request or access) consisting of a public key and a signing secret.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Oauth1Token {
	/// Public token value sent as `oauth_token`.
	pub key: String,
	/// Token secret used as the second half of the signing key.
	pub secret: TokenSecret,
}
impl Oauth1Token {
	/// Creates a token from its key and secret.
	pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
		Self { key: key.into(), secret: TokenSecret::new(secret) }
	}

	/// Parses an `application/x-www-form-urlencoded` token endpoint response.
	///
	/// Returns `None` when `oauth_token` is absent or empty. A missing secret is treated as
	/// empty, which some providers emit for already-authorized request tokens.
	pub fn from_form(body: &[u8]) -> Option<Self> {
		let mut key = None;
		let mut secret = String::new();

		for (name, value) in form_urlencoded::parse(body) {
			match name.as_ref() {
				"oauth_token" => key = Some(value.into_owned()),
				"oauth_token_secret" => secret = value.into_owned(),
				_ => {},
			}
		}

		key.filter(|value| !value.is_empty()).map(|key| Self::new(key, secret))
	}
}

/// Unauthorized request token returned by the request-token endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestToken {
	/// Token pair used to sign the access-token exchange.
	pub token: Oauth1Token,
	/// Whether the provider acknowledged the `oauth_callback` (OAuth 1.0a).
	pub callback_confirmed: bool,
}
impl RequestToken {
	/// Parses the request-token endpoint response.
	pub fn from_form(body: &[u8]) -> Option<Self> {
		let token = Oauth1Token::from_form(body)?;
		let callback_confirmed = form_urlencoded::parse(body)
			.any(|(name, value)| name == "oauth_callback_confirmed" && value == "true");

		Some(Self { token, callback_confirmed })
	}
}
