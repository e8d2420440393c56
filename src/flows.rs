//! Sign-in flows for both Meetup protocol generations behind one [`ProviderFlow`] interface.
//!
//! [`LegacyFlow`] speaks OAuth 1.0a and [`ModernFlow`] speaks OAuth 2.0; both share a
//! [`FlowClient`] that owns the HTTP transport, provider descriptor, strategy, and consumer
//! credentials. [`Authenticator`] drives either flow from callback to account.

pub mod authenticate;
pub mod common;
pub mod legacy;
pub mod modern;

pub use authenticate::*;
pub use legacy::*;
pub use modern::*;

// crates.io
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	auth::{AccessCredential, ConsumerCredentials, RequestToken},
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	profile::{MeetupProfile, UserDetails, UsernamePolicy},
	provider::{Protocol, ProviderDescriptor, ProviderStrategy},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

/// Boxed future returned by [`ProviderFlow`] operations.
pub type FlowFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Flow client specialized for the crate's default reqwest transport stack.
#[cfg(feature = "reqwest")]
pub type ReqwestFlowClient = FlowClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Capability shared by the legacy and modern flows.
///
/// The host only ever talks to this trait, so the two generations are interchangeable.
pub trait ProviderFlow
where
	Self: Send + Sync,
{
	/// Descriptor the flow talks to.
	fn descriptor(&self) -> &ProviderDescriptor;

	/// How usernames are derived from profiles produced by this flow.
	fn username_policy(&self) -> UsernamePolicy;

	/// Starts an authorization; `complete_url` is the host endpoint receiving the callback.
	fn begin<'a>(&'a self, complete_url: &'a Url) -> FlowFuture<'a, AuthorizationRequest>;

	/// Turns the provider callback into an access credential.
	fn obtain_credential<'a>(
		&'a self,
		pending: &'a PendingAuthorization,
		callback: &'a CallbackParams,
	) -> FlowFuture<'a, AccessCredential>;

	/// Fetches the authenticated member; `None` when the response carries no member.
	fn fetch_profile<'a>(
		&'a self,
		credential: &'a AccessCredential,
	) -> FlowFuture<'a, Option<MeetupProfile>>;

	/// Maps a profile onto host user details under this flow's username policy.
	fn user_details(&self, profile: &MeetupProfile) -> UserDetails {
		UserDetails::from_profile(profile, self.username_policy())
	}
}

/// Redirect the member's browser must follow, plus the state to keep until the callback.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuthorizationRequest {
	/// Provider authorization URL.
	pub authorize_url: Url,
	/// State the host keeps in its session until the callback arrives.
	pub pending: PendingAuthorization,
}

/// Per-authorization state carried from the redirect to the callback.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "protocol", rename_all = "snake_case")]
pub enum PendingAuthorization {
	/// OAuth 1.0a: the unauthorized request token.
	#[serde(rename = "oauth1")]
	OAuth1 {
		/// Request token issued before the redirect.
		request_token: RequestToken,
	},
	/// OAuth 2.0: the redirect URI that must be repeated during the code exchange.
	#[serde(rename = "oauth2")]
	OAuth2 {
		/// Redirect URI sent with the authorization request.
		redirect_uri: Url,
	},
}
impl PendingAuthorization {
	/// Protocol that produced the state.
	pub fn protocol(&self) -> Protocol {
		match self {
			Self::OAuth1 { .. } => Protocol::OAuth1,
			Self::OAuth2 { .. } => Protocol::OAuth2,
		}
	}
}

/// Query parameters Meetup appends to the callback URL.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackParams {
	/// OAuth 1.0a request token echoed back by the provider.
	pub oauth_token: Option<String>,
	/// OAuth 1.0a verifier.
	pub oauth_verifier: Option<String>,
	/// OAuth 2.0 authorization code.
	pub code: Option<String>,
	/// OAuth 2.0 error code (e.g. `access_denied`).
	pub error: Option<String>,
	/// OAuth 2.0 error description.
	pub error_description: Option<String>,
}
impl CallbackParams {
	/// Parses a raw query string; blank values count as absent.
	pub fn from_query(query: &str) -> Self {
		let mut params = Self::default();

		for (name, value) in form_urlencoded::parse(query.as_bytes()) {
			if value.is_empty() {
				continue;
			}

			let slot = match name.as_ref() {
				"oauth_token" => &mut params.oauth_token,
				"oauth_verifier" => &mut params.oauth_verifier,
				"code" => &mut params.code,
				"error" => &mut params.error,
				"error_description" => &mut params.error_description,
				_ => continue,
			};

			*slot = Some(value.into_owned());
		}

		params
	}

	/// Parses the query of a full callback URL.
	pub fn from_url(url: &Url) -> Self {
		Self::from_query(url.query().unwrap_or_default())
	}
}

/// Shared transport and provider state used by both flows.
#[derive(Clone)]
pub struct FlowClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Provider descriptor defining endpoints and client authentication.
	pub descriptor: ProviderDescriptor,
	/// Strategy responsible for request adjustments and error classification.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// Consumer key and secret (OAuth 2.0 client id and secret).
	pub consumer: ConsumerCredentials,
}
impl<C, M> FlowClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		consumer: ConsumerCredentials,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			descriptor,
			strategy,
			consumer,
		}
	}
}
#[cfg(feature = "reqwest")]
impl FlowClient<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client with its own reqwest transport.
	pub fn new(
		descriptor: ProviderDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		consumer: ConsumerCredentials,
	) -> Self {
		Self::with_http_client(
			descriptor,
			strategy,
			consumer,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Debug for FlowClient<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("FlowClient")
			.field("descriptor", &self.descriptor)
			.field("consumer_key", &self.consumer.key)
			.field("consumer_secret_set", &!self.consumer.secret.is_empty())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn callback_query_ignores_blank_and_unknown_fields() {
		let params = CallbackParams::from_query(
			"oauth_token=FAKEKEY&oauth_verifier=&code=abc%20def&utm_source=mail",
		);

		assert_eq!(params.oauth_token.as_deref(), Some("FAKEKEY"));
		assert_eq!(params.oauth_verifier, None);
		assert_eq!(params.code.as_deref(), Some("abc def"));
		assert_eq!(params.error, None);
	}

	#[test]
	fn callback_url_without_query_is_empty() {
		let url = Url::parse("https://app.test/complete/meetup/").expect("URL should parse.");

		assert_eq!(CallbackParams::from_url(&url), CallbackParams::default());
	}

	#[test]
	fn pending_state_round_trips_through_session_json() {
		let pending = PendingAuthorization::OAuth2 {
			redirect_uri: Url::parse("https://app.test/complete/meetup/")
				.expect("URL should parse."),
		};
		let json = serde_json::to_string(&pending).expect("Pending state should serialize.");

		assert!(json.contains("\"protocol\":\"oauth2\""));

		let restored: PendingAuthorization =
			serde_json::from_str(&json).expect("Pending state should deserialize.");

		assert_eq!(restored.protocol(), Protocol::OAuth2);
	}
}
