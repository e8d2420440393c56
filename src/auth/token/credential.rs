//! Protocol-neutral access credential handed from token exchange to profile fetching.

// self
use crate::{
	_prelude::*,
	auth::{BearerToken, Oauth1Token},
	provider::Protocol,
};

/// Access credential issued by Meetup after the member authorized the application.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum AccessCredential {
	/// OAuth 1.0a access token pair.
	#[serde(rename = "oauth1")]
	OAuth1(Oauth1Token),
	/// OAuth 2.0 bearer token.
	Bearer(BearerToken),
}
impl AccessCredential {
	/// Protocol that issued the credential.
	pub fn protocol(&self) -> Protocol {
		match self {
			Self::OAuth1(_) => Protocol::OAuth1,
			Self::Bearer(_) => Protocol::OAuth2,
		}
	}
}
