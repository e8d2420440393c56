#![cfg(feature = "reqwest")]

// crates.io
use httpmock::prelude::*;
// self
use meetup_auth::{
	_preludet::*,
	auth::{AccessCredential, Oauth1Token, ProviderId, RequestToken},
	flows::{CallbackParams, PendingAuthorization, ProviderFlow},
	provider::{Protocol, ProviderCall, ProviderDescriptor},
};

fn build_descriptor(server: &MockServer) -> ProviderDescriptor {
	let provider_id =
		ProviderId::new("meetup").expect("Provider identifier should be valid for legacy test.");
	let url = |path: &str| Url::parse(&server.url(path)).expect("Mock URL should parse.");

	ProviderDescriptor::builder(provider_id, Protocol::OAuth1)
		.request_token_endpoint(url("/oauth/request/"))
		.authorization_endpoint(url("/authenticate/"))
		.access_token_endpoint(url("/oauth/access/"))
		.profile_endpoint(url("/members.json/"))
		.build()
		.expect("Legacy descriptor should build.")
}

fn complete_url() -> Url {
	Url::parse("https://app.example.com/complete/meetup/").expect("Complete URL should parse.")
}

fn request_token() -> RequestToken {
	RequestToken { token: Oauth1Token::new("FAKEKEY", "FAKESECRET"), callback_confirmed: true }
}

#[tokio::test]
async fn begin_obtains_request_token_and_builds_authenticate_url() {
	let server = MockServer::start_async().await;
	let flow = build_legacy_test_flow(build_descriptor(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/request/").header_exists("authorization");
			then.status(200).body(
				"oauth_token=FAKEKEY&oauth_token_secret=FAKESECRET&oauth_callback_confirmed=true",
			);
		})
		.await;
	let request = flow.begin(&complete_url()).await.expect("Authorization should begin.");

	mock.assert_async().await;

	assert_eq!(request.authorize_url.path(), "/authenticate/");

	let pairs: HashMap<_, _> = request.authorize_url.query_pairs().into_owned().collect();

	assert_eq!(pairs.get("oauth_token"), Some(&"FAKEKEY".into()));
	assert_eq!(pairs.get("oauth_callback"), Some(&complete_url().as_str().into()));

	match request.pending {
		PendingAuthorization::OAuth1 { request_token } => {
			assert_eq!(request_token.token.key, "FAKEKEY");
			assert_eq!(request_token.token.secret.expose(), "FAKESECRET");
			assert!(request_token.callback_confirmed);
		},
		other => panic!("Unexpected pending state: {other:?}."),
	}
}

#[tokio::test]
async fn request_token_without_oauth_token_is_transient() {
	let server = MockServer::start_async().await;
	let flow = build_legacy_test_flow(build_descriptor(&server));
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/request/");
			then.status(200).body("");
		})
		.await;
	let err = flow
		.request_token(&complete_url())
		.await
		.expect_err("Empty request-token response should fail.");

	assert!(matches!(
		err,
		Error::Transient(meetup_auth::error::TransientError::ProviderEndpoint {
			endpoint: "request_token",
			..
		})
	));
}

#[tokio::test]
async fn callback_exchanges_verifier_and_fetches_profile() {
	let server = MockServer::start_async().await;
	let flow = build_legacy_test_flow(build_descriptor(&server));
	let access = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access/").header_exists("authorization");
			then.status(200).body("oauth_token=ACCESSKEY&oauth_token_secret=ACCESSSECRET");
		})
		.await;
	let profile = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/members.json/")
				.query_param("relation", "self")
				.query_param("fields", "email")
				.header_exists("authorization");
			then.status(200)
				.header("content-type", "application/json")
				.body("{\"results\":[{\"id\":\"8675309\",\"name\":\"Joe Smith\"}]}");
		})
		.await;
	let pending = PendingAuthorization::OAuth1 { request_token: request_token() };
	let callback = CallbackParams::from_query("oauth_token=FAKEKEY&oauth_verifier=1234");
	let credential = flow
		.obtain_credential(&pending, &callback)
		.await
		.expect("Verifier exchange should succeed.");

	access.assert_async().await;

	let AccessCredential::OAuth1(token) = &credential else {
		panic!("Legacy flow should issue an OAuth 1.0a credential.");
	};

	assert_eq!(token.key, "ACCESSKEY");
	assert_eq!(token.secret.expose(), "ACCESSSECRET");

	let member = flow
		.fetch_profile(&credential)
		.await
		.expect("Profile lookup should succeed.")
		.expect("Profile response should contain a member.");

	profile.assert_async().await;

	let details = flow.user_details(&member);

	assert_eq!(details.username, "8675309");
	assert_eq!(details.first_name, "Joe");
	assert_eq!(details.last_name, "Smith");
	assert_eq!(details.email, "");
}

#[tokio::test]
async fn mismatched_or_missing_callback_token_is_rejected_without_network() {
	let server = MockServer::start_async().await;
	let flow = build_legacy_test_flow(build_descriptor(&server));
	let access = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access/");
			then.status(200).body("oauth_token=ACCESSKEY&oauth_token_secret=ACCESSSECRET");
		})
		.await;
	let pending = PendingAuthorization::OAuth1 { request_token: request_token() };

	for query in ["oauth_token=OTHERKEY&oauth_verifier=1234", "oauth_verifier=1234"] {
		let err = flow
			.obtain_credential(&pending, &CallbackParams::from_query(query))
			.await
			.expect_err("Callback should be rejected.");

		assert!(matches!(err, Error::InvalidCallback { .. }), "Unexpected error: {err:?}.");
	}

	access.assert_calls_async(0).await;
}

#[tokio::test]
async fn rejected_access_token_maps_to_invalid_grant() {
	let server = MockServer::start_async().await;
	let flow = build_legacy_test_flow(build_descriptor(&server));
	let _mock = server
		.mock_async(|when, then| {
			when.method(POST).path("/oauth/access/");
			then.status(401).body("oauth_problem=token_rejected");
		})
		.await;
	let err = flow
		.access_token(&request_token(), None)
		.await
		.expect_err("Rejected token should fail.");

	assert!(matches!(err, Error::InvalidGrant { ref reason } if reason.contains("token_rejected")));
	assert!(err.is_authentication_failure());
}

#[tokio::test]
async fn blank_or_empty_profiles_yield_none() {
	let token = Oauth1Token::new("ACCESSKEY", "ACCESSSECRET");

	for body in ["", "{\"results\":[],\"meta\":{}}", "{\"problem\":\"none\"}"] {
		let server = MockServer::start_async().await;
		let flow = build_legacy_test_flow(build_descriptor(&server));
		let _mock = server
			.mock_async(|when, then| {
				when.method(GET).path("/members.json/");
				then.status(200).body(body);
			})
			.await;

		assert!(
			flow.user_data(&token).await.expect("Unusable profile is not an error.").is_none(),
			"Body {body:?} should not yield a member."
		);
	}
}

#[tokio::test]
async fn sign_and_fetch_moves_get_params_into_the_query() {
	let server = MockServer::start_async().await;
	let flow = build_legacy_test_flow(build_descriptor(&server));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/members.json/")
				.query_param("member_id", "self")
				.header_exists("authorization");
			then.status(200).body("ok");
		})
		.await;
	let url = Url::parse(&server.url("/members.json/")).expect("Mock URL should parse.");
	let params = BTreeMap::from([("member_id".to_owned(), "self".to_owned())]);
	let body = flow
		.sign_and_fetch(
			ProviderCall::Profile,
			meetup_auth::oauth::oauth2::http::Method::GET,
			&url,
			Some(&Oauth1Token::new("ACCESSKEY", "ACCESSSECRET")),
			&[],
			&params,
		)
		.await
		.expect("Signed GET should succeed.");

	mock.assert_async().await;

	assert_eq!(body, b"ok");
}
