#![cfg(feature = "reqwest")]

// self
use meetup_auth::{
	_preludet::*,
	auth::{ConsumerCredentials, Oauth1Token, RequestToken},
	error::{ConfigError, TransientError, TransportError},
	flows::{FlowClient, LegacyFlow, ModernFlow},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	oauth::{
		TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse},
	},
	provider::{DefaultProviderStrategy, ProviderCall, ProviderStrategy, meetup},
};

#[derive(Debug)]
enum FakeTransportError {
	Throttled,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Throttled => write!(f, "Transport throttled."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone, Copy)]
struct FakeHttpClient {
	retry_after: Duration,
}
impl FakeHttpClient {
	fn throttled(retry_after: Duration) -> Self {
		Self { retry_after }
	}
}
impl ProviderHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, retry_after: self.retry_after }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	retry_after: Duration,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, _request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let retry_after = self.retry_after;

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);
			slot.store(ResponseMetadata { status: Some(429), retry_after: Some(retry_after) });

			Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Throttled)))
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	calls: Arc<Mutex<Vec<(ProviderCall, Option<ResponseMetadata>)>>>,
}
impl RecordingTransportErrorMapper {
	fn recorded(&self) -> Vec<(ProviderCall, Option<ResponseMetadata>)> {
		self.calls.lock().clone()
	}
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		_strategy: &dyn ProviderStrategy,
		call: ProviderCall,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		let status = meta.and_then(|value| value.status);
		let retry_after = meta.and_then(|value| value.retry_after);

		self.calls.lock().push((call, meta.cloned()));

		match err {
			HttpClientError::Reqwest(inner) => TransientError::ProviderEndpoint {
				endpoint: call.as_str(),
				message: format!("Fake transport error: {inner}"),
				status,
				retry_after,
			}
			.into(),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			other => TransientError::ProviderEndpoint {
				endpoint: call.as_str(),
				message: format!("Unhandled fake transport error: {other}"),
				status,
				retry_after,
			}
			.into(),
		}
	}
}

fn fake_client(
	descriptor: meetup_auth::provider::ProviderDescriptor,
	retry_after: Duration,
	mapper: RecordingTransportErrorMapper,
) -> FlowClient<FakeHttpClient, RecordingTransportErrorMapper> {
	let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);

	FlowClient::with_http_client(
		descriptor,
		strategy,
		ConsumerCredentials::new("consumer-key", "consumer-secret"),
		FakeHttpClient::throttled(retry_after),
		mapper,
	)
}

fn assert_throttled(err: Error, endpoint: &str, retry_after: Duration) {
	match err {
		Error::Transient(TransientError::ProviderEndpoint {
			endpoint: actual,
			status,
			retry_after: hint,
			..
		}) => {
			assert_eq!(actual, endpoint);
			assert_eq!(status, Some(429));
			assert_eq!(hint, Some(retry_after));
		},
		other => panic!("Unexpected error: {other:?}."),
	}
}

#[tokio::test]
async fn legacy_calls_forward_transport_metadata_to_mapper() {
	let retry_after = Duration::seconds(42);
	let mapper = RecordingTransportErrorMapper::default();
	let descriptor = meetup::legacy_descriptor().expect("Legacy descriptor should build.");
	let flow = LegacyFlow::new(fake_client(descriptor, retry_after, mapper.clone()))
		.expect("Legacy flow should accept the legacy descriptor.");
	let callback =
		Url::parse("https://app.example.com/complete/meetup/").expect("Callback should parse.");
	let err = flow
		.request_token(&callback)
		.await
		.expect_err("Throttled transport should fail the request-token call.");

	assert_throttled(err, "request_token", retry_after);

	let request_token =
		RequestToken { token: Oauth1Token::new("FAKEKEY", "FAKESECRET"), callback_confirmed: true };
	let err = flow
		.access_token(&request_token, Some("verifier"))
		.await
		.expect_err("Throttled transport should fail the access-token call.");

	assert_throttled(err, "access_token", retry_after);

	let recorded = mapper.recorded();

	assert_eq!(recorded.len(), 2);
	assert_eq!(recorded[0].0, ProviderCall::RequestToken);
	assert_eq!(recorded[1].0, ProviderCall::AccessToken);
	assert!(recorded.iter().all(|(_, meta)| {
		meta.as_ref().is_some_and(|m| m.status == Some(429) && m.retry_after == Some(retry_after))
	}));
}

#[tokio::test]
async fn modern_code_exchange_forwards_transport_metadata_to_mapper() {
	let retry_after = Duration::seconds(7);
	let mapper = RecordingTransportErrorMapper::default();
	let descriptor = meetup::modern_descriptor().expect("Modern descriptor should build.");
	let flow = ModernFlow::new(fake_client(descriptor, retry_after, mapper.clone()))
		.expect("Modern flow should accept the modern descriptor.");
	let redirect_uri = Url::parse("https://app.example.com/complete/meetup-oauth2/")
		.expect("Redirect URI should parse.");
	let err = flow
		.exchange_code("abc", &redirect_uri)
		.await
		.expect_err("Throttled transport should fail the code exchange.");

	assert_throttled(err, "access_token", retry_after);

	let recorded = mapper.recorded();

	assert_eq!(recorded.len(), 1);
	assert_eq!(recorded[0].0, ProviderCall::AccessToken);
	assert_eq!(recorded[0].1.as_ref().and_then(|meta| meta.status), Some(429));
}
