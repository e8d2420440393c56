//! OAuth 2.0 sign-in: authorization redirect, code exchange, and a bearer-token profile lookup.

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	auth::{AccessCredential, BearerToken, ScopeSet},
	error::ConfigError,
	flows::{
		AuthorizationRequest, CallbackParams, FlowClient, FlowFuture, PendingAuthorization,
		ProviderFlow, common,
	},
	http::ProviderHttpClient,
	oauth::{CodeExchangeFacade, TransportErrorMapper},
	obs::{self, FlowKind},
	profile::{self, MeetupProfile, UsernamePolicy},
	provider::{Protocol, ProviderCall, ProviderDescriptor},
};

/// OAuth 2.0 flow against a modern descriptor.
pub struct ModernFlow<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: FlowClient<C, M>,
	facade: CodeExchangeFacade<C, M>,
	scope: ScopeSet,
}
impl<C, M> ModernFlow<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Wraps a flow client whose descriptor speaks OAuth 2.0.
	pub fn new(client: FlowClient<C, M>) -> Result<Self> {
		if client.descriptor.protocol != Protocol::OAuth2 {
			return Err(ConfigError::UnsupportedProtocol {
				descriptor: client.descriptor.id.to_string(),
				expected: Protocol::OAuth2.as_str(),
			}
			.into());
		}

		let facade = CodeExchangeFacade::from_descriptor(
			&client.descriptor,
			&client.consumer.key,
			client.consumer.secret.expose(),
			client.http_client.clone(),
			client.transport_mapper.clone(),
		)?;

		Ok(Self { client, facade, scope: ScopeSet::default() })
	}

	/// Requests `scope` during authorization.
	pub fn with_scope(mut self, scope: ScopeSet) -> Self {
		self.scope = scope;

		self
	}

	/// Underlying flow client.
	pub fn client(&self) -> &FlowClient<C, M> {
		&self.client
	}

	/// Scopes requested during authorization.
	pub fn scope(&self) -> &ScopeSet {
		&self.scope
	}

	/// Authorization URL carrying `client_id`, `response_type=code`, `redirect_uri`, and
	/// `scope` when configured.
	pub fn authorization_url(&self, redirect_uri: &Url) -> Url {
		let scope = self.scope.normalized();
		let mut params = vec![
			("client_id", self.client.consumer.key.as_str()),
			("response_type", "code"),
			("redirect_uri", redirect_uri.as_str()),
		];

		if !scope.is_empty() {
			params.push(("scope", scope.as_str()));
		}

		common::with_query(&self.client.descriptor.endpoints.authorization, &params)
	}

	/// Exchanges an authorization code; `redirect_uri` must match the authorization request.
	pub async fn exchange_code(&self, code: &str, redirect_uri: &Url) -> Result<BearerToken> {
		obs::observe(FlowKind::AccessToken, "modern.exchange_code", async {
			let mut extra = BTreeMap::new();

			self.client.strategy.augment_token_request(ProviderCall::AccessToken, &mut extra);

			self.facade
				.exchange_code(self.client.strategy.as_ref(), code, &self.scope, redirect_uri, &extra)
				.await
		})
		.await
	}

	/// Fetches the member behind `token` with `relation=self`.
	pub async fn user_data(&self, token: &BearerToken) -> Result<Option<MeetupProfile>> {
		obs::observe(FlowKind::Profile, "modern.user_data", async {
			let url = common::with_query(
				&self.client.descriptor.endpoints.profile,
				&[("access_token", token.access_token.expose()), ("relation", "self")],
			);
			let request = common::build_request(Method::GET, &url, None, &BTreeMap::new())?;
			let body = common::send(&self.client, ProviderCall::Profile, request).await?;

			Ok(profile::parse_members_response(&body))
		})
		.await
	}
}
impl<C, M> Debug for ModernFlow<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("ModernFlow")
			.field("client", &self.client)
			.field("scope", &self.scope)
			.finish()
	}
}
impl<C, M> ProviderFlow for ModernFlow<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn descriptor(&self) -> &ProviderDescriptor {
		&self.client.descriptor
	}

	fn username_policy(&self) -> UsernamePolicy {
		UsernamePolicy::HostDefault
	}

	fn begin<'a>(&'a self, complete_url: &'a Url) -> FlowFuture<'a, AuthorizationRequest> {
		Box::pin(async move {
			Ok(AuthorizationRequest {
				authorize_url: self.authorization_url(complete_url),
				pending: PendingAuthorization::OAuth2 { redirect_uri: complete_url.clone() },
			})
		})
	}

	fn obtain_credential<'a>(
		&'a self,
		pending: &'a PendingAuthorization,
		callback: &'a CallbackParams,
	) -> FlowFuture<'a, AccessCredential> {
		Box::pin(async move {
			let PendingAuthorization::OAuth2 { redirect_uri } = pending else {
				return Err(protocol_mismatch(pending.protocol()));
			};

			if let Some(error) = &callback.error {
				let reason = match &callback.error_description {
					Some(description) => format!("{error}: {description}"),
					None => error.clone(),
				};

				return Err(Error::AccessDenied { reason });
			}

			let code = callback.code.as_deref().ok_or_else(|| Error::InvalidCallback {
				reason: "callback is missing the authorization code".into(),
			})?;
			let token = self.exchange_code(code, redirect_uri).await?;

			Ok(AccessCredential::Bearer(token))
		})
	}

	fn fetch_profile<'a>(
		&'a self,
		credential: &'a AccessCredential,
	) -> FlowFuture<'a, Option<MeetupProfile>> {
		Box::pin(async move {
			match credential {
				AccessCredential::Bearer(token) => self.user_data(token).await,
				other => Err(protocol_mismatch(other.protocol())),
			}
		})
	}
}

fn protocol_mismatch(given: Protocol) -> Error {
	ConfigError::ProtocolMismatch { flow: Protocol::OAuth2.as_str(), given: given.as_str() }.into()
}
