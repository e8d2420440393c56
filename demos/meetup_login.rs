//! Builds the Meetup OAuth 2.0 authorization URL from environment settings and shows how a
//! `members.json` payload becomes a local account.
//!
//! Run with `MEETUP_CONSUMER_KEY` and `MEETUP_CONSUMER_SECRET` set; `MEETUP_SCOPE` is optional.

// std
use std::sync::Arc;
// crates.io
use color_eyre::Result;
use url::Url;
// self
use meetup_auth::{
	config::MeetupConfig,
	flows::{Authenticator, FlowClient, ModernFlow, ProviderFlow},
	profile,
	provider::{DefaultProviderStrategy, ProviderStrategy, meetup},
	store::{AccountStore, MemoryAccountStore},
};

const SAMPLE_MEMBERS: &[u8] =
	br#"{"results":[{"id":8675309,"name":"Joe Smith","email":"joe@example.com"}],"meta":{}}"#;

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let config = MeetupConfig::from_env()?;
	let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);
	let client = FlowClient::new(meetup::modern_descriptor()?, strategy, config.consumer());
	let flow = ModernFlow::new(client)?.with_scope(config.scope.clone());
	let redirect_uri = Url::parse("https://app.example.com/complete/meetup-oauth2/")?;

	println!("Send your member to {}.", flow.authorization_url(&redirect_uri));

	let flow: Arc<dyn ProviderFlow> = Arc::new(flow);
	let accounts: Arc<dyn AccountStore> = Arc::new(MemoryAccountStore::default());
	let authenticator = Authenticator::new(flow, accounts, config.redirects.clone());

	// Stand-in for the profile lookup the callback performs after the code exchange.
	let Some(member) = profile::parse_members_response(SAMPLE_MEMBERS) else {
		eprintln!("Sample payload did not contain a member.");

		return Ok(());
	};

	for attempt in 1..=2 {
		let outcome = authenticator.authenticate_profile(&member).await?;

		if let Some(account) = outcome.account() {
			println!(
				"Sign-in {attempt}: account {} ({} {}) goes to {}.",
				account.username,
				account.first_name,
				account.last_name,
				outcome.redirect()
			);
		}
	}

	Ok(())
}
