//! Shared helpers for flow implementations (request building, dispatch, status mapping).

// crates.io
use oauth2::{
	AsyncHttpClient, HttpRequest,
	http::{
		Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
	},
};
use url::form_urlencoded;
// self
use crate::{
	_prelude::*,
	error::ConfigError,
	flows::FlowClient,
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	oauth::{self, TransportErrorMapper},
	provider::ProviderCall,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Builds a provider request; a non-empty `form` becomes the urlencoded body.
pub(crate) fn build_request(
	method: Method,
	url: &Url,
	authorization: Option<&str>,
	form: &BTreeMap<String, String>,
) -> Result<HttpRequest> {
	let mut builder =
		Request::builder().method(method).uri(url.as_str()).header(ACCEPT, "application/json");

	if let Some(authorization) = authorization {
		builder = builder.header(AUTHORIZATION, authorization);
	}

	let body = if form.is_empty() {
		Vec::new()
	} else {
		builder = builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE);

		encode_form(form).into_bytes()
	};

	builder.body(body).map_err(|e| ConfigError::from(e).into())
}

/// Sends `request` and returns the body of a successful response.
///
/// Transport failures go through the client's [`TransportErrorMapper`]; non-2xx statuses go
/// through its provider strategy.
pub(crate) async fn send<C, M>(
	client: &FlowClient<C, M>,
	call: ProviderCall,
	request: HttpRequest,
) -> Result<Vec<u8>>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let slot = ResponseMetadataSlot::default();
	let handle = client.http_client.with_metadata(slot.clone());
	let response = handle.call(request).await.map_err(|err| {
		oauth::map_transport_error(
			client.strategy.as_ref(),
			call,
			slot.take().as_ref(),
			err,
			client.transport_mapper.as_ref(),
		)
	})?;
	let status = response.status();
	let meta = slot
		.take()
		.unwrap_or(ResponseMetadata { status: Some(status.as_u16()), retry_after: None });

	if !status.is_success() {
		return Err(oauth::map_status_error(
			client.strategy.as_ref(),
			call,
			Some(&meta),
			response.body(),
		));
	}

	Ok(response.into_body())
}

/// Appends `params` to the query of `url`.
pub(crate) fn with_query(url: &Url, params: &[(&str, &str)]) -> Url {
	let mut url = url.clone();

	if !params.is_empty() {
		url.query_pairs_mut().extend_pairs(params);
	}

	url
}

fn encode_form(form: &BTreeMap<String, String>) -> String {
	form_urlencoded::Serializer::new(String::new()).extend_pairs(form).finish()
}
