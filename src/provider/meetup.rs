//! Fixed Meetup endpoints and ready-made descriptors for both protocol generations.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	error::ConfigError,
	provider::{ClientAuthMethod, Protocol, ProviderDescriptor},
};

/// Provider key under which Meetup identities are linked.
pub const MEETUP_PROVIDER: &str = "meetup";

/// OAuth 1.0a request-token endpoint.
pub const LEGACY_REQUEST_TOKEN_URL: &str = "https://api.meetup.com/oauth/request/";
/// OAuth 1.0a access-token endpoint.
pub const LEGACY_ACCESS_TOKEN_URL: &str = "https://api.meetup.com/oauth/access/";
/// OAuth 1.0a authorization endpoint that skips the consent page for returning members.
pub const LEGACY_AUTHENTICATE_URL: &str = "https://www.meetup.com/authenticate/";
/// OAuth 1.0a authorization endpoint that always shows the consent page.
pub const LEGACY_AUTHORIZE_URL: &str = "https://www.meetup.com/authorize/";
/// OAuth 2.0 authorization endpoint.
pub const MODERN_AUTHORIZATION_URL: &str = "https://secure.meetup.com/oauth2/authorize";
/// OAuth 2.0 access-token endpoint.
pub const MODERN_ACCESS_TOKEN_URL: &str = "https://secure.meetup.com/oauth2/access";
/// Member profile endpoint shared by both generations.
pub const PROFILE_URL: &str = "https://api.meetup.com/members.json/";

/// Descriptor for the legacy OAuth 1.0a flow.
pub fn legacy_descriptor() -> Result<ProviderDescriptor> {
	legacy_with_authorization(LEGACY_AUTHENTICATE_URL)
}

/// Legacy descriptor that always routes members through the consent page.
pub fn legacy_descriptor_forcing_consent() -> Result<ProviderDescriptor> {
	legacy_with_authorization(LEGACY_AUTHORIZE_URL)
}

/// Descriptor for the OAuth 2.0 flow; credentials are posted in the request body.
pub fn modern_descriptor() -> Result<ProviderDescriptor> {
	let descriptor = ProviderDescriptor::builder(provider_id()?, Protocol::OAuth2)
		.authorization_endpoint(parse(MODERN_AUTHORIZATION_URL)?)
		.access_token_endpoint(parse(MODERN_ACCESS_TOKEN_URL)?)
		.profile_endpoint(parse(PROFILE_URL)?)
		.preferred_client_auth_method(ClientAuthMethod::ClientSecretPost)
		.build()
		.map_err(ConfigError::from)?;

	Ok(descriptor)
}

fn legacy_with_authorization(authorization: &str) -> Result<ProviderDescriptor> {
	let descriptor = ProviderDescriptor::builder(provider_id()?, Protocol::OAuth1)
		.request_token_endpoint(parse(LEGACY_REQUEST_TOKEN_URL)?)
		.authorization_endpoint(parse(authorization)?)
		.access_token_endpoint(parse(LEGACY_ACCESS_TOKEN_URL)?)
		.profile_endpoint(parse(PROFILE_URL)?)
		.build()
		.map_err(ConfigError::from)?;

	Ok(descriptor)
}

fn provider_id() -> Result<ProviderId> {
	ProviderId::new(MEETUP_PROVIDER).map_err(|e| ConfigError::from(e).into())
}

fn parse(url: &str) -> Result<Url> {
	Url::parse(url).map_err(|source| ConfigError::InvalidDescriptor { source }.into())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn legacy_descriptor_uses_the_authenticate_page() {
		let descriptor = legacy_descriptor().expect("Legacy descriptor should build.");

		assert_eq!(descriptor.protocol, Protocol::OAuth1);
		assert_eq!(descriptor.id.as_ref(), MEETUP_PROVIDER);
		assert_eq!(descriptor.endpoints.authorization.as_str(), LEGACY_AUTHENTICATE_URL);
		assert_eq!(
			descriptor.endpoints.request_token.as_ref().map(Url::as_str),
			Some(LEGACY_REQUEST_TOKEN_URL)
		);

		let strict = legacy_descriptor_forcing_consent().expect("Strict descriptor should build.");

		assert_eq!(strict.endpoints.authorization.as_str(), LEGACY_AUTHORIZE_URL);
	}

	#[test]
	fn modern_descriptor_posts_client_credentials() {
		let descriptor = modern_descriptor().expect("Modern descriptor should build.");

		assert_eq!(descriptor.protocol, Protocol::OAuth2);
		assert!(descriptor.endpoints.request_token.is_none());
		assert_eq!(descriptor.preferred_client_auth_method, ClientAuthMethod::ClientSecretPost);
		assert_eq!(descriptor.endpoints.access_token.as_str(), MODERN_ACCESS_TOKEN_URL);
	}
}
