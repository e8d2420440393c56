//! Legacy OAuth 1.0a sign-in: request token, member authorization, verifier exchange, and a
//! signed profile lookup.

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	auth::{AccessCredential, Oauth1Token, RequestToken},
	error::{ConfigError, TransientError},
	flows::{
		AuthorizationRequest, CallbackParams, FlowClient, FlowFuture, PendingAuthorization,
		ProviderFlow, common,
	},
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	oauth1::Oauth1Signer,
	obs::{self, FlowKind},
	profile::{self, MeetupProfile, UsernamePolicy},
	provider::{Protocol, ProviderCall, ProviderDescriptor, ProviderDescriptorError},
};

/// OAuth 1.0a flow against a legacy descriptor.
#[derive(Clone)]
pub struct LegacyFlow<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: FlowClient<C, M>,
	request_token_url: Url,
}
impl<C, M> LegacyFlow<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Wraps a flow client whose descriptor speaks OAuth 1.0a.
	pub fn new(client: FlowClient<C, M>) -> Result<Self> {
		if client.descriptor.protocol != Protocol::OAuth1 {
			return Err(ConfigError::UnsupportedProtocol {
				descriptor: client.descriptor.id.to_string(),
				expected: Protocol::OAuth1.as_str(),
			}
			.into());
		}

		let request_token_url = client
			.descriptor
			.endpoints
			.request_token
			.clone()
			.ok_or(ConfigError::from(ProviderDescriptorError::MissingRequestTokenEndpoint))?;

		Ok(Self { client, request_token_url })
	}

	/// Underlying flow client.
	pub fn client(&self) -> &FlowClient<C, M> {
		&self.client
	}

	/// Obtains an unauthorized request token; `callback` is sent as `oauth_callback`.
	pub async fn request_token(&self, callback: &Url) -> Result<RequestToken> {
		obs::observe(FlowKind::RequestToken, "legacy.request_token", async {
			let mut form = BTreeMap::new();

			self.client.strategy.augment_token_request(ProviderCall::RequestToken, &mut form);

			let body = self
				.sign_and_fetch(
					ProviderCall::RequestToken,
					Method::POST,
					&self.request_token_url,
					None,
					&[("oauth_callback", callback.as_str())],
					&form,
				)
				.await?;

			RequestToken::from_form(&body)
				.ok_or_else(|| missing_token(ProviderCall::RequestToken))
		})
		.await
	}

	/// Authorization URL carrying `oauth_token` and `oauth_callback`.
	pub fn authorization_url(&self, request_token: &RequestToken, callback: &Url) -> Url {
		common::with_query(
			&self.client.descriptor.endpoints.authorization,
			&[
				("oauth_token", request_token.token.key.as_str()),
				("oauth_callback", callback.as_str()),
			],
		)
	}

	/// Exchanges an authorized request token (and verifier, when present) for an access token.
	pub async fn access_token(
		&self,
		request_token: &RequestToken,
		verifier: Option<&str>,
	) -> Result<Oauth1Token> {
		obs::observe(FlowKind::AccessToken, "legacy.access_token", async {
			let mut form = BTreeMap::new();

			self.client.strategy.augment_token_request(ProviderCall::AccessToken, &mut form);

			let oauth_params = verifier
				.map(|verifier| vec![("oauth_verifier", verifier)])
				.unwrap_or_default();
			let body = self
				.sign_and_fetch(
					ProviderCall::AccessToken,
					Method::POST,
					&self.client.descriptor.endpoints.access_token,
					Some(&request_token.token),
					&oauth_params,
					&form,
				)
				.await?;

			Oauth1Token::from_form(&body).ok_or_else(|| missing_token(ProviderCall::AccessToken))
		})
		.await
	}

	/// Fetches the member behind `access_token` with `relation=self` and `fields=email`.
	pub async fn user_data(&self, access_token: &Oauth1Token) -> Result<Option<MeetupProfile>> {
		obs::observe(FlowKind::Profile, "legacy.user_data", async {
			let url = common::with_query(
				&self.client.descriptor.endpoints.profile,
				&[("relation", "self"), ("fields", "email")],
			);
			let body = self
				.sign_and_fetch(
					ProviderCall::Profile,
					Method::GET,
					&url,
					Some(access_token),
					&[],
					&BTreeMap::new(),
				)
				.await?;

			Ok(profile::parse_members_response(&body))
		})
		.await
	}

	/// Signs a request with HMAC-SHA1 and returns the body of a successful response.
	///
	/// Query parameters of `url` and the `params` form body are both covered by the signature.
	/// `GET` requests carry `params` in the query instead of a body.
	pub async fn sign_and_fetch(
		&self,
		call: ProviderCall,
		method: Method,
		url: &Url,
		token: Option<&Oauth1Token>,
		oauth_params: &[(&str, &str)],
		params: &BTreeMap<String, String>,
	) -> Result<Vec<u8>> {
		let mut signer = Oauth1Signer::new(&self.client.consumer);

		if let Some(token) = token {
			signer = signer.with_token(token);
		}

		let (url, form) = if method == Method::GET && !params.is_empty() {
			let pairs =
				params.iter().map(|(key, value)| (key.as_str(), value.as_str())).collect::<Vec<_>>();

			(common::with_query(url, &pairs), BTreeMap::new())
		} else {
			(url.clone(), params.clone())
		};
		let authorization = signer.sign(method.as_str(), &url, oauth_params, &form)?;
		let request = common::build_request(method, &url, Some(&authorization), &form)?;

		common::send(&self.client, call, request).await
	}
}
impl<C, M> Debug for LegacyFlow<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("LegacyFlow").field("client", &self.client).finish()
	}
}
impl<C, M> ProviderFlow for LegacyFlow<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn descriptor(&self) -> &ProviderDescriptor {
		&self.client.descriptor
	}

	fn username_policy(&self) -> UsernamePolicy {
		UsernamePolicy::MemberId
	}

	fn begin<'a>(&'a self, complete_url: &'a Url) -> FlowFuture<'a, AuthorizationRequest> {
		Box::pin(async move {
			let request_token = self.request_token(complete_url).await?;
			let authorize_url = self.authorization_url(&request_token, complete_url);

			Ok(AuthorizationRequest {
				authorize_url,
				pending: PendingAuthorization::OAuth1 { request_token },
			})
		})
	}

	fn obtain_credential<'a>(
		&'a self,
		pending: &'a PendingAuthorization,
		callback: &'a CallbackParams,
	) -> FlowFuture<'a, AccessCredential> {
		Box::pin(async move {
			let PendingAuthorization::OAuth1 { request_token } = pending else {
				return Err(protocol_mismatch(pending.protocol()));
			};

			if let Some(error) = &callback.error {
				return Err(Error::AccessDenied { reason: error.clone() });
			}

			match callback.oauth_token.as_deref() {
				Some(key) if key == request_token.token.key => {},
				Some(_) => {
					return Err(Error::InvalidCallback {
						reason: "oauth_token does not match the pending request token".into(),
					});
				},
				None => {
					return Err(Error::InvalidCallback {
						reason: "callback is missing oauth_token".into(),
					});
				},
			}

			let access = self.access_token(request_token, callback.oauth_verifier.as_deref()).await?;

			Ok(AccessCredential::OAuth1(access))
		})
	}

	fn fetch_profile<'a>(
		&'a self,
		credential: &'a AccessCredential,
	) -> FlowFuture<'a, Option<MeetupProfile>> {
		Box::pin(async move {
			match credential {
				AccessCredential::OAuth1(token) => self.user_data(token).await,
				other => Err(protocol_mismatch(other.protocol())),
			}
		})
	}
}

fn missing_token(call: ProviderCall) -> Error {
	TransientError::ProviderEndpoint {
		endpoint: call.as_str(),
		message: "response did not contain oauth_token".into(),
		status: None,
		retry_after: None,
	}
	.into()
}

fn protocol_mismatch(given: Protocol) -> Error {
	ConfigError::ProtocolMismatch { flow: Protocol::OAuth1.as_str(), given: given.as_str() }.into()
}
