//! Meetup sign-in for Rust web backends: legacy OAuth 1.0a and OAuth 2.0 flows, member profile
//! fetching, and user-detail mapping behind a single provider-flow interface.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod auth;
pub mod config;
pub mod error;
pub mod flows;
pub mod http;
pub mod oauth;
pub mod oauth1;
pub mod obs;
pub mod profile;
pub mod provider;
pub mod store;
#[cfg(feature = "reqwest")]
#[doc(hidden)]
pub mod _preludet {
	//! Convenience re-exports and helpers shared by the integration tests and demos.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::ConsumerCredentials,
		config::RedirectConfig,
		flows::{Authenticator, FlowClient, LegacyFlow, ModernFlow, ProviderFlow},
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{DefaultProviderStrategy, ProviderDescriptor, ProviderStrategy},
		store::{AccountStore, MemoryAccountStore},
	};

	/// Flow client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = FlowClient<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Constructs a [`FlowClient`] backed by the default provider strategy and the insecure
	/// reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(
		descriptor: ProviderDescriptor,
		consumer_key: &str,
		consumer_secret: &str,
	) -> ReqwestTestClient {
		let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);
		let consumer = ConsumerCredentials::new(consumer_key, consumer_secret);

		FlowClient::with_http_client(
			descriptor,
			strategy,
			consumer,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}

	/// Builds a legacy (OAuth 1.0a) flow against a test descriptor.
	pub fn build_legacy_test_flow(
		descriptor: ProviderDescriptor,
	) -> LegacyFlow<ReqwestHttpClient, ReqwestTransportErrorMapper> {
		LegacyFlow::new(build_reqwest_test_client(descriptor, "consumer-key", "consumer-secret"))
			.expect("Legacy flow should accept an OAuth 1.0a descriptor.")
	}

	/// Builds a modern (OAuth 2.0) flow against a test descriptor.
	pub fn build_modern_test_flow(
		descriptor: ProviderDescriptor,
	) -> ModernFlow<ReqwestHttpClient, ReqwestTransportErrorMapper> {
		ModernFlow::new(build_reqwest_test_client(descriptor, "client-id", "client-secret"))
			.expect("Modern flow should accept an OAuth 2.0 descriptor.")
	}

	/// Redirect targets mirroring a typical host configuration.
	pub fn test_redirects() -> RedirectConfig {
		RedirectConfig {
			login_redirect_url: "/default/".into(),
			new_user_redirect_url: "/new/".into(),
			login_error_url: "/error/".into(),
		}
	}

	/// Wires a flow into an [`Authenticator`] backed by an in-memory account store.
	pub fn build_test_authenticator(
		flow: Arc<dyn ProviderFlow>,
	) -> (Authenticator, Arc<MemoryAccountStore>) {
		let store_backend = Arc::new(MemoryAccountStore::default());
		let accounts: Arc<dyn AccountStore> = store_backend.clone();

		(Authenticator::new(flow, accounts, test_redirects()), store_backend)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(test)] use {color_eyre as _, httpmock as _, tokio as _};
