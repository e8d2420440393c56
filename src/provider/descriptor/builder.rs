// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{ClientAuthMethod, Protocol, ProviderDescriptor, ProviderEndpoints},
};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum ProviderDescriptorError {
	/// OAuth 1.0a descriptors need a request-token endpoint.
	#[error("Missing request-token endpoint.")]
	MissingRequestTokenEndpoint,
	/// Authorization endpoint is mandatory.
	#[error("Missing authorization endpoint.")]
	MissingAuthorizationEndpoint,
	/// Access-token endpoint is mandatory.
	#[error("Missing access-token endpoint.")]
	MissingAccessTokenEndpoint,
	/// Profile endpoint is mandatory.
	#[error("Missing profile endpoint.")]
	MissingProfileEndpoint,
	/// Endpoints must use HTTPS.
	#[error("The {endpoint} endpoint must use HTTPS: {url}.")]
	InsecureEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
		/// Endpoint URL that failed validation.
		url: String,
	},
}

/// Builder for [`ProviderDescriptor`] values.
#[derive(Debug)]
pub struct ProviderDescriptorBuilder {
	/// Identifier for the descriptor being constructed.
	pub id: ProviderId,
	/// Protocol generation.
	pub protocol: Protocol,
	/// Request-token endpoint (OAuth 1.0a).
	pub request_token_endpoint: Option<Url>,
	/// Authorization endpoint.
	pub authorization_endpoint: Option<Url>,
	/// Access-token endpoint.
	pub access_token_endpoint: Option<Url>,
	/// Profile endpoint.
	pub profile_endpoint: Option<Url>,
	/// Preferred client authentication method for the OAuth 2.0 token endpoint.
	pub preferred_client_auth_method: ClientAuthMethod,
}
impl ProviderDescriptorBuilder {
	/// Creates a new builder seeded with the provided identifier and protocol.
	pub fn new(id: ProviderId, protocol: Protocol) -> Self {
		Self {
			id,
			protocol,
			request_token_endpoint: None,
			authorization_endpoint: None,
			access_token_endpoint: None,
			profile_endpoint: None,
			preferred_client_auth_method: ClientAuthMethod::default(),
		}
	}

	/// Sets the request-token endpoint.
	pub fn request_token_endpoint(mut self, url: Url) -> Self {
		self.request_token_endpoint = Some(url);

		self
	}

	/// Sets the authorization endpoint.
	pub fn authorization_endpoint(mut self, url: Url) -> Self {
		self.authorization_endpoint = Some(url);

		self
	}

	/// Sets the access-token endpoint.
	pub fn access_token_endpoint(mut self, url: Url) -> Self {
		self.access_token_endpoint = Some(url);

		self
	}

	/// Sets the profile endpoint.
	pub fn profile_endpoint(mut self, url: Url) -> Self {
		self.profile_endpoint = Some(url);

		self
	}

	/// Overrides the preferred client authentication method.
	pub fn preferred_client_auth_method(mut self, method: ClientAuthMethod) -> Self {
		self.preferred_client_auth_method = method;

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ProviderDescriptor, ProviderDescriptorError> {
		let authorization = self
			.authorization_endpoint
			.ok_or(ProviderDescriptorError::MissingAuthorizationEndpoint)?;
		let access_token =
			self.access_token_endpoint.ok_or(ProviderDescriptorError::MissingAccessTokenEndpoint)?;
		let profile = self.profile_endpoint.ok_or(ProviderDescriptorError::MissingProfileEndpoint)?;
		let endpoints = ProviderEndpoints {
			request_token: self.request_token_endpoint,
			authorization,
			access_token,
			profile,
		};
		let descriptor = ProviderDescriptor {
			id: self.id,
			protocol: self.protocol,
			endpoints,
			preferred_client_auth_method: self.preferred_client_auth_method,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}

impl ProviderDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ProviderDescriptorError> {
		match (&self.protocol, &self.endpoints.request_token) {
			(Protocol::OAuth1, None) =>
				return Err(ProviderDescriptorError::MissingRequestTokenEndpoint),
			(_, Some(request_token)) => validate_endpoint("request_token", request_token)?,
			(Protocol::OAuth2, None) => {},
		}

		validate_endpoint("authorization", &self.endpoints.authorization)?;
		validate_endpoint("access_token", &self.endpoints.access_token)?;
		validate_endpoint("profile", &self.endpoints.profile)?;

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, url: &Url) -> Result<(), ProviderDescriptorError> {
	if url.scheme() != "https" {
		Err(ProviderDescriptorError::InsecureEndpoint { endpoint: name, url: url.to_string() })
	} else {
		Ok(())
	}
}
