//! Application (consumer / client) credentials issued when registering with Meetup.

// self
use crate::{_prelude::*, auth::TokenSecret};

/// Consumer key and secret for OAuth 1.0a, doubling as client id and secret for OAuth 2.0.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerCredentials {
	/// Consumer key / OAuth 2.0 client identifier.
	pub key: String,
	/// Consumer secret / OAuth 2.0 client secret.
	pub secret: TokenSecret,
}
impl ConsumerCredentials {
	/// Creates credentials from a key and secret.
	pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
		Self { key: key.into(), secret: TokenSecret::new(secret) }
	}
}
impl Debug for ConsumerCredentials {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ConsumerCredentials")
			.field("key", &self.key)
			.field("secret", &self.secret)
			.finish()
	}
}
