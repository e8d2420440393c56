//! OAuth 1.0a request signing (HMAC-SHA1, RFC 5849).
//!
//! [`Oauth1Signer`] produces the `Authorization: OAuth ...` header for a request. The
//! primitives in [`signature`] are exposed separately so the base string can be checked
//! against published vectors.

pub mod signature;

pub use signature::*;

// crates.io
use rand::{Rng, distr::Alphanumeric};
// self
use crate::{
	_prelude::*,
	auth::{ConsumerCredentials, Oauth1Token},
};

/// Signature method advertised in every signed request.
pub const SIGNATURE_METHOD: &str = "HMAC-SHA1";
/// Protocol version advertised in every signed request.
pub const OAUTH_VERSION: &str = "1.0";

const NONCE_LEN: usize = 32;

/// Signs requests on behalf of a consumer and, once issued, a member token.
#[derive(Clone, Copy, Debug)]
pub struct Oauth1Signer<'a> {
	consumer: &'a ConsumerCredentials,
	token: Option<&'a Oauth1Token>,
}
impl<'a> Oauth1Signer<'a> {
	/// Creates a signer for consumer-only requests (request-token call).
	pub fn new(consumer: &'a ConsumerCredentials) -> Self {
		Self { consumer, token: None }
	}

	/// Adds the token whose secret joins the signing key.
	pub fn with_token(mut self, token: &'a Oauth1Token) -> Self {
		self.token = Some(token);

		self
	}

	/// Builds the `Authorization` header value using a fresh nonce and the current time.
	///
	/// `oauth_params` carries protocol extras such as `oauth_callback` or `oauth_verifier`;
	/// `body_params` carries form fields that will be sent with the request.
	pub fn sign(
		&self,
		method: &str,
		url: &Url,
		oauth_params: &[(&str, &str)],
		body_params: &BTreeMap<String, String>,
	) -> Result<String> {
		let timestamp = OffsetDateTime::now_utc().unix_timestamp();

		let nonce = generate_nonce();

		self.authorization_header(method, url, oauth_params, body_params, &nonce, timestamp)
	}

	/// Builds the `Authorization` header value with a caller-supplied nonce and timestamp.
	pub fn authorization_header(
		&self,
		method: &str,
		url: &Url,
		oauth_params: &[(&str, &str)],
		body_params: &BTreeMap<String, String>,
		nonce: &str,
		timestamp: i64,
	) -> Result<String> {
		let timestamp = timestamp.to_string();
		let mut protocol = vec![
			("oauth_consumer_key", self.consumer.key.as_str()),
			("oauth_nonce", nonce),
			("oauth_signature_method", SIGNATURE_METHOD),
			("oauth_timestamp", timestamp.as_str()),
			("oauth_version", OAUTH_VERSION),
		];

		if let Some(token) = self.token {
			protocol.push(("oauth_token", token.key.as_str()));
		}

		protocol.extend_from_slice(oauth_params);

		let mut params = protocol
			.iter()
			.map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
			.collect::<Vec<_>>();

		params.extend(url.query_pairs().map(|(key, value)| (key.into_owned(), value.into_owned())));
		params.extend(body_params.iter().map(|(key, value)| (key.clone(), value.clone())));

		let base = signature_base_string(method, url, &params);
		let key = signing_key(
			self.consumer.secret.expose(),
			self.token.map(|token| token.secret.expose()).unwrap_or_default(),
		);
		let signature = hmac_sha1(&key, &base)?;

		protocol.push(("oauth_signature", signature.as_str()));

		let fields = protocol
			.iter()
			.map(|(key, value)| format!("{}=\"{}\"", percent_encode(key), percent_encode(value)))
			.collect::<Vec<_>>()
			.join(", ");

		Ok(format!("OAuth {fields}"))
	}
}

/// Generates a random alphanumeric nonce.
pub fn generate_nonce() -> String {
	rand::rng().sample_iter(Alphanumeric).take(NONCE_LEN).map(char::from).collect()
}
