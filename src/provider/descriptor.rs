//! Provider descriptor data structures shared by both flows.

/// Builder API for assembling provider descriptors.
pub mod builder;

pub use builder::*;

// self
use crate::{_prelude::*, auth::ProviderId};

/// OAuth protocol generation spoken by a descriptor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
	/// OAuth 1.0a (request token, signed requests).
	#[serde(rename = "oauth1")]
	OAuth1,
	/// OAuth 2.0 (authorization code, bearer tokens).
	#[serde(rename = "oauth2")]
	OAuth2,
}
impl Protocol {
	/// Returns a stable label for errors and observability fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Protocol::OAuth1 => "oauth1",
			Protocol::OAuth2 => "oauth2",
		}
	}
}
impl Display for Protocol {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outbound provider calls issued by the flows.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCall {
	/// OAuth 1.0a request-token call.
	RequestToken,
	/// Access-token exchange (OAuth 1.0a verifier or OAuth 2.0 code).
	AccessToken,
	/// Authenticated member profile lookup.
	Profile,
}
impl ProviderCall {
	/// Returns a stable label for errors and observability fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			ProviderCall::RequestToken => "request_token",
			ProviderCall::AccessToken => "access_token",
			ProviderCall::Profile => "profile",
		}
	}
}
impl Display for ProviderCall {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Preferred client authentication modes for the OAuth 2.0 token endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
}

/// Endpoint set declared by a provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Request-token endpoint (OAuth 1.0a only).
	pub request_token: Option<Url>,
	/// Endpoint the member's browser is redirected to.
	pub authorization: Url,
	/// Endpoint exchanging the verifier or code for an access credential.
	pub access_token: Url,
	/// Endpoint returning the authenticated member's profile.
	pub profile: Url,
}

/// Immutable provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier, also the provider key used for account linking.
	pub id: ProviderId,
	/// Protocol generation.
	pub protocol: Protocol,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Preferred client authentication mechanism (OAuth 2.0 only).
	pub preferred_client_auth_method: ClientAuthMethod,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier and protocol.
	pub fn builder(id: ProviderId, protocol: Protocol) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id, protocol)
	}
}
