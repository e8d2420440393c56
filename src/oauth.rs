//! OAuth 2.0 code-exchange facade and shared provider error mapping.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::{BearerToken, ScopeSet},
	error::{ConfigError, TransientError, TransportError},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	provider::{
		ClientAuthMethod, ProviderCall, ProviderDescriptor, ProviderErrorContext,
		ProviderErrorKind, ProviderStrategy,
	},
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		strategy: &dyn ProviderStrategy,
		call: ProviderCall,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		_strategy: &dyn ProviderStrategy,
		call: ProviderCall,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(call, meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(call, meta, message),
			_ => map_unknown_transport_error(call, meta),
		}
	}
}

/// `oauth2`-backed client for the authorization-code exchange.
pub(crate) struct CodeExchangeFacade<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> CodeExchangeFacade<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_descriptor(
		descriptor: &ProviderDescriptor,
		client_id: &str,
		client_secret: &str,
		http_client: Arc<C>,
		error_mapper: Arc<M>,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let token_url = TokenUrl::new(descriptor.endpoints.access_token.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let mut oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_client_secret(ClientSecret::new(client_secret.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url);

		if matches!(descriptor.preferred_client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self { oauth_client, http_client, error_mapper })
	}

	/// Exchanges an authorization code for a bearer token.
	///
	/// `requested_scope` is recorded on the token unless the provider echoes its own grant.
	pub(crate) async fn exchange_code(
		&self,
		strategy: &dyn ProviderStrategy,
		code: &str,
		requested_scope: &ScopeSet,
		redirect_uri: &Url,
		extra_params: &BTreeMap<String, String>,
	) -> Result<BearerToken> {
		let meta = ResponseMetadataSlot::default();
		let instrumented = self.http_client.with_metadata(meta.clone());
		let redirect_url = RedirectUrl::new(redirect_uri.to_string())
			.map_err(|source| ConfigError::InvalidRedirect { source })?;
		let mut request = self
			.oauth_client
			.exchange_code(AuthorizationCode::new(code.to_owned()))
			.set_redirect_uri(Cow::Owned(redirect_url));

		for (key, value) in extra_params {
			request = request.add_extra_param(key.clone(), value.clone());
		}

		let response = request.request_async(&instrumented).await.map_err(|err| {
			map_request_error(
				strategy,
				ProviderCall::AccessToken,
				meta.take(),
				err,
				self.error_mapper.as_ref(),
			)
		})?;
		let scope = match response.scopes() {
			Some(scopes) => ScopeSet::new(scopes.iter().map(|scope| scope.as_ref().to_owned()))
				.map_err(ConfigError::from)?,
			None => requested_scope.clone(),
		};
		let mut builder = BearerToken::builder()
			.access_token(response.access_token().secret().to_owned())
			.scope(scope)
			.issued_at(OffsetDateTime::now_utc());

		// Meetup always sends `expires_in`, but the exchange does not depend on it.
		if let Some(expires_in) = response.expires_in() {
			let secs = i64::try_from(expires_in.as_secs())
				.map_err(|_| ConfigError::ExpiresInOutOfRange)?;

			if secs <= 0 {
				return Err(ConfigError::NonPositiveExpiresIn.into());
			}

			builder = builder.expires_in(Duration::seconds(secs));
		}
		if let Some(refresh) = response.refresh_token() {
			builder = builder.refresh_token(refresh.secret().to_owned());
		}

		builder.build().map_err(|e| ConfigError::from(e).into())
	}
}

/// Provider error payload shapes seen on non-success responses.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
	error: Option<String>,
	error_description: Option<String>,
	details: Option<String>,
}

/// Classifies a non-success response from a raw (non-`oauth2`) provider call.
///
/// OAuth 1.0a endpoints report `oauth_problem` form fields; JSON endpoints report
/// `error`/`error_description` (or Meetup's `details`).
pub(crate) fn map_status_error(
	strategy: &dyn ProviderStrategy,
	call: ProviderCall,
	meta: Option<&ResponseMetadata>,
	body: &[u8],
) -> Error {
	let mut ctx = ProviderErrorContext::new(call);

	if let Some(status) = meta_status(meta) {
		ctx = ctx.with_http_status(status);
	}

	let problem = url::form_urlencoded::parse(body)
		.find(|(key, _)| key == "oauth_problem")
		.map(|(_, value)| value.into_owned());
	let parsed = serde_json::from_slice::<ErrorBody>(body).unwrap_or_default();
	let description = parsed.error_description.or(parsed.details);

	if let Some(problem) = &problem {
		ctx = ctx.with_oauth_problem(problem.clone());
	}
	if let Some(error) = &parsed.error {
		ctx = ctx.with_oauth_error(error.clone());
	}
	if let Some(description) = &description {
		ctx = ctx.with_error_description(description.clone());
	}
	if !body.is_empty() {
		ctx = ctx.with_body_preview(String::from_utf8_lossy(body));
	}

	let detail = problem
		.or(description)
		.or(parsed.error)
		.unwrap_or_else(|| match meta_status(meta) {
			Some(status) => format!("HTTP {status}"),
			None => "no status".into(),
		});
	let message = format!("The {call} endpoint rejected the request: {detail}");

	classified_error(strategy.classify_token_error(&ctx), call, message, meta)
}

pub(crate) fn map_transport_error<E, M>(
	strategy: &dyn ProviderStrategy,
	call: ProviderCall,
	meta: Option<&ResponseMetadata>,
	err: HttpClientError<E>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	mapper.map_transport_error(strategy, call, meta, err)
}

fn map_request_error<E, M>(
	strategy: &dyn ProviderStrategy,
	call: ProviderCall,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(strategy, call, response, meta_ref),
		RequestTokenError::Request(error) =>
			map_transport_error(strategy, call, meta_ref, error, mapper),
		RequestTokenError::Parse(error, body) =>
			map_unparsed_response(strategy, call, meta_ref, &body).unwrap_or_else(|| {
				TransientError::TokenResponseParse { source: error, status: meta_status(meta_ref) }
					.into()
			}),
		RequestTokenError::Other(message) => TransientError::ProviderEndpoint {
			endpoint: call.as_str(),
			message,
			status: meta_status(meta_ref),
			retry_after: meta_retry_after(meta_ref),
		}
		.into(),
	}
}

/// Classifies a token response that carries an OAuth `error` field instead of a token.
///
/// Meetup can answer a rejected exchange with a success status. Such a body is a
/// rejection unless its code names a temporary condition.
fn map_unparsed_response(
	strategy: &dyn ProviderStrategy,
	call: ProviderCall,
	meta: Option<&ResponseMetadata>,
	body: &[u8],
) -> Option<Error> {
	let parsed = serde_json::from_slice::<ErrorBody>(body).ok()?;
	let error = parsed.error?;
	let description = parsed.error_description.or(parsed.details);
	let status = meta_status(meta);
	let mut ctx = ProviderErrorContext::new(call).with_oauth_error(error.clone());

	if let Some(description) = &description {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(status) = status {
		ctx = ctx.with_http_status(status);
	}

	let mut kind = strategy.classify_token_error(&ctx);
	let successful = status.is_none_or(|code| (200..300).contains(&code));

	if successful
		&& kind == ProviderErrorKind::Transient
		&& !error.eq_ignore_ascii_case("temporarily_unavailable")
		&& !error.eq_ignore_ascii_case("server_error")
	{
		kind = ProviderErrorKind::InvalidGrant;
	}

	let detail = match description {
		Some(description) => format!("{error}: {description}"),
		None => error,
	};
	let message = format!("The {call} endpoint rejected the request: {detail}");

	Some(classified_error(kind, call, message, meta))
}

fn map_server_response_error(
	strategy: &dyn ProviderStrategy,
	call: ProviderCall,
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	let mut ctx =
		ProviderErrorContext::new(call).with_oauth_error(response.error().as_ref().to_string());

	if let Some(description) = response.error_description() {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(status) = meta_status(meta) {
		ctx = ctx.with_http_status(status);
	}

	let message = match response.error_description() {
		Some(description) => format!("{}: {description}", response.error().as_ref()),
		None => response.error().as_ref().to_string(),
	};

	classified_error(strategy.classify_token_error(&ctx), call, message, meta)
}

fn classified_error(
	kind: ProviderErrorKind,
	call: ProviderCall,
	message: String,
	meta: Option<&ResponseMetadata>,
) -> Error {
	match kind {
		ProviderErrorKind::InvalidGrant => Error::InvalidGrant { reason: message },
		ProviderErrorKind::InvalidClient => Error::InvalidClient { reason: message },
		ProviderErrorKind::Transient => TransientError::ProviderEndpoint {
			endpoint: call.as_str(),
			message,
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(
	call: ProviderCall,
	meta: Option<&ResponseMetadata>,
	err: ReqwestError,
) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransientError::ProviderEndpoint {
			endpoint: call.as_str(),
			message: "request timed out".into(),
			status: meta_status(meta).or_else(|| err.status().map(|code| code.as_u16())),
			retry_after: meta_retry_after(meta),
		}
		.into();
	}

	TransportError::from(err).into()
}

#[cfg(feature = "reqwest")]
fn map_generic_transport_error(
	call: ProviderCall,
	meta: Option<&ResponseMetadata>,
	message: impl Display,
) -> Error {
	TransientError::ProviderEndpoint {
		endpoint: call.as_str(),
		message: format!("HTTP client error: {message}"),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

#[cfg(feature = "reqwest")]
fn map_unknown_transport_error(call: ProviderCall, meta: Option<&ResponseMetadata>) -> Error {
	TransientError::ProviderEndpoint {
		endpoint: call.as_str(),
		message: "HTTP client error".into(),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}
