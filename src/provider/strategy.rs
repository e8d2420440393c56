//! Provider strategy hooks that customize outbound calls.
//!
//! Implementations decorate access-token requests and normalize error mapping
//! without tying flows to any particular HTTP client.

// self
use crate::{_prelude::*, provider::descriptor::ProviderCall};

/// Strategy hook that allows providers to decorate requests and classify errors.
///
/// Implementors are required to be `Send + Sync`, and the hooks use crate-owned data
/// types so downstream crates never depend on reqwest-specific structures. Only
/// [`classify_token_error`](ProviderStrategy::classify_token_error) is mandatory.
pub trait ProviderStrategy: Send + Sync {
	/// Maps low-level HTTP/OAuth errors into the crate taxonomy for a provider call.
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind;

	/// Gives providers a chance to add custom parameters before dispatching.
	///
	/// Legacy flows sign whatever ends up in `form`, so additions are covered by the
	/// OAuth 1.0a signature.
	fn augment_token_request(&self, _call: ProviderCall, _form: &mut BTreeMap<String, String>) {}
}

/// Canonical provider error categories used by strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderErrorKind {
	/// Provider rejected the grant (bad verifier, code, or token).
	InvalidGrant,
	/// Consumer authentication failed.
	InvalidClient,
	/// Failure is temporary and may be retried.
	Transient,
}

/// Context passed to provider strategies when classifying failures.
///
/// Only primitive data is kept (status codes, OAuth fields, body preview) so strategies
/// stay decoupled from any HTTP client.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderErrorContext {
	/// Provider call associated with the failing request.
	pub call: ProviderCall,
	/// HTTP status code returned by the provider, when available.
	pub http_status: Option<u16>,
	/// OAuth 2.0 `error` field.
	pub oauth_error: Option<String>,
	/// OAuth 2.0 `error_description` field.
	pub error_description: Option<String>,
	/// OAuth 1.0a problem-reporting `oauth_problem` field.
	pub oauth_problem: Option<String>,
	/// Preview of the response body for unstructured payloads.
	pub body_preview: Option<String>,
}
impl ProviderErrorContext {
	const BODY_PREVIEW_LIMIT: usize = 256;

	/// Creates a new context scoped to the provided call.
	pub fn new(call: ProviderCall) -> Self {
		Self {
			call,
			http_status: None,
			oauth_error: None,
			error_description: None,
			oauth_problem: None,
			body_preview: None,
		}
	}

	/// Adds an HTTP status code (e.g., 400, 401, 500).
	pub fn with_http_status(mut self, status: u16) -> Self {
		self.http_status = Some(status);

		self
	}

	/// Adds the OAuth 2.0 error code string returned by the provider.
	pub fn with_oauth_error(mut self, error: impl Into<String>) -> Self {
		self.oauth_error = Some(error.into());

		self
	}

	/// Adds the OAuth 2.0 `error_description` field.
	pub fn with_error_description(mut self, description: impl Into<String>) -> Self {
		self.error_description = Some(description.into());

		self
	}

	/// Adds the OAuth 1.0a `oauth_problem` field.
	pub fn with_oauth_problem(mut self, problem: impl Into<String>) -> Self {
		self.oauth_problem = Some(problem.into());

		self
	}

	/// Adds a body preview for providers that return unstructured payloads.
	pub fn with_body_preview(mut self, body: impl Into<String>) -> Self {
		self.body_preview = Some(truncate_preview(body.into()));

		self
	}
}

/// Default strategy covering Meetup's OAuth 1.0a and OAuth 2.0 endpoints.
///
/// Structured fields win (`oauth_problem`, then `error`), followed by body hints and
/// finally the HTTP status code. Transport failures are mapped by
/// [`TransportErrorMapper`](crate::oauth::TransportErrorMapper) instead.
#[derive(Debug, Default)]
pub struct DefaultProviderStrategy;
impl Display for DefaultProviderStrategy {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str("default-provider-strategy")
	}
}
impl ProviderStrategy for DefaultProviderStrategy {
	fn classify_token_error(&self, ctx: &ProviderErrorContext) -> ProviderErrorKind {
		if let Some(kind) = ctx.oauth_problem.as_deref().and_then(match_oauth_problem) {
			return kind;
		}
		if let Some(kind) =
			classify_oauth_error(ctx.oauth_error.as_deref(), ctx.error_description.as_deref())
		{
			return kind;
		}
		if let Some(kind) = classify_body(ctx.body_preview.as_deref()) {
			return kind;
		}

		classify_status(ctx.call, ctx.http_status)
	}
}

fn truncate_preview(body: String) -> String {
	if body.chars().count() <= ProviderErrorContext::BODY_PREVIEW_LIMIT {
		return body;
	}

	let mut buf = body.chars().take(ProviderErrorContext::BODY_PREVIEW_LIMIT).collect::<String>();

	buf.push('…');

	buf
}

fn match_oauth_problem(problem: &str) -> Option<ProviderErrorKind> {
	match problem {
		"consumer_key_unknown" | "consumer_key_rejected" | "signature_invalid"
		| "signature_method_rejected" => Some(ProviderErrorKind::InvalidClient),
		"token_rejected" | "token_expired" | "token_used" | "token_revoked" | "verifier_invalid"
		| "permission_denied" | "nonce_used" | "timestamp_refused" =>
			Some(ProviderErrorKind::InvalidGrant),
		_ => None,
	}
}

fn classify_oauth_error(
	oauth_error: Option<&str>,
	error_description: Option<&str>,
) -> Option<ProviderErrorKind> {
	oauth_error
		.and_then(match_exact_value)
		.or_else(|| error_description.and_then(match_exact_value))
		.or_else(|| classify_body(error_description))
}

fn match_exact_value(value: &str) -> Option<ProviderErrorKind> {
	if value.eq_ignore_ascii_case("invalid_grant")
		|| value.eq_ignore_ascii_case("invalid_request")
		|| value.eq_ignore_ascii_case("access_denied")
	{
		Some(ProviderErrorKind::InvalidGrant)
	} else if value.eq_ignore_ascii_case("invalid_client")
		|| value.eq_ignore_ascii_case("unauthorized_client")
	{
		Some(ProviderErrorKind::InvalidClient)
	} else if value.eq_ignore_ascii_case("temporarily_unavailable")
		|| value.eq_ignore_ascii_case("server_error")
	{
		Some(ProviderErrorKind::Transient)
	} else {
		None
	}
}

fn classify_body(body: Option<&str>) -> Option<ProviderErrorKind> {
	let lowered = body?.to_ascii_lowercase();

	match lowered.as_str() {
		text if text.contains("invalid_grant") || text.contains("invalid_request") =>
			Some(ProviderErrorKind::InvalidGrant),
		text if text.contains("invalid_client") => Some(ProviderErrorKind::InvalidClient),
		text if text.contains("temporarily_unavailable") => Some(ProviderErrorKind::Transient),
		_ => None,
	}
}

fn classify_status(call: ProviderCall, status: Option<u16>) -> ProviderErrorKind {
	match (call, status) {
		// A rejected profile lookup means the access credential is no longer honored.
		(ProviderCall::Profile, Some(401)) => ProviderErrorKind::InvalidGrant,
		(_, Some(400 | 403 | 404 | 410)) => ProviderErrorKind::InvalidGrant,
		(_, Some(401)) => ProviderErrorKind::InvalidClient,
		_ => ProviderErrorKind::Transient,
	}
}
