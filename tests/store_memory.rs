#![cfg(feature = "reqwest")]

// self
use meetup_auth::{
	_preludet::*,
	auth::{ExternalId, ProviderId},
	profile::{MeetupProfile, UserDetails, UsernamePolicy},
	store::{AccountId, AccountStore, MemoryAccountStore},
};

fn provider() -> ProviderId {
	ProviderId::new("meetup").expect("Failed to build provider identifier for store tests.")
}

fn member(uid: &str) -> ExternalId {
	ExternalId::new(uid).expect("Failed to build member identifier for store tests.")
}

fn details_for(uid: &str, name: &str, policy: UsernamePolicy) -> UserDetails {
	let profile = MeetupProfile { id: member(uid), name: name.into(), email: None };

	profile.user_details(policy)
}

#[tokio::test]
async fn first_lookup_creates_and_second_matches() {
	let store = MemoryAccountStore::default();
	let details = details_for("8675309", "Joe Smith", UsernamePolicy::MemberId);
	let created = store
		.find_or_create_account(&provider(), &member("8675309"), &details)
		.await
		.expect("Creating an account should succeed.");

	assert!(created.is_new);
	assert_eq!(created.account.username, "8675309");
	assert_eq!(created.account.first_name, "Joe");
	assert_eq!(created.account.last_name, "Smith");

	let renamed = details_for("8675309", "Joseph Smith", UsernamePolicy::MemberId);
	let matched = store
		.find_or_create_account(&provider(), &member("8675309"), &renamed)
		.await
		.expect("Matching an account should succeed.");

	assert!(!matched.is_new);
	assert_eq!(matched.account, created.account, "Existing accounts are not refreshed.");
	assert_eq!(store.len(), 1);
}

#[tokio::test]
async fn links_are_scoped_per_provider() {
	let store = MemoryAccountStore::default();
	let other = ProviderId::new("meetup-oauth2").expect("Provider identifier should be valid.");
	let details = details_for("1", "Ann Lee", UsernamePolicy::HostDefault);
	let first = store
		.find_or_create_account(&provider(), &member("1"), &details)
		.await
		.expect("First provider link should be created.");
	let second = store
		.find_or_create_account(&other, &member("1"), &details)
		.await
		.expect("Second provider link should be created.");

	assert!(first.is_new && second.is_new);
	assert_ne!(first.account.id, second.account.id);
	assert_eq!(first.account.username, "meetup-1");
	assert_eq!(second.account.username, "meetup-oauth2-1");
}

#[tokio::test]
async fn generated_usernames_never_collide() {
	let store = MemoryAccountStore::default();
	let taken = store.insert_account("8675309", "");
	let linked = store
		.find_or_create_account(
			&provider(),
			&member("8675309"),
			&details_for("8675309", "Joe Smith", UsernamePolicy::MemberId),
		)
		.await
		.expect("Account creation should succeed.");

	assert_eq!(taken.username, "8675309");
	assert_eq!(linked.account.username, "8675309-2");
}

#[tokio::test]
async fn get_account_returns_none_for_unknown_ids() {
	let store = MemoryAccountStore::default();
	let account = store.insert_account("test", "test@example.com");

	assert_eq!(
		store.get_account(account.id).await.expect("Lookup should succeed."),
		Some(account)
	);
	assert_eq!(store.get_account(AccountId(100)).await.expect("Lookup should succeed."), None);
}

#[tokio::test]
async fn concurrent_first_logins_create_a_single_account() {
	let store = Arc::new(MemoryAccountStore::default());
	let details = details_for("42", "Cher", UsernamePolicy::MemberId);
	let mut handles = Vec::new();

	for _ in 0..8 {
		let store = store.clone();
		let details = details.clone();

		handles.push(tokio::spawn(async move {
			store
				.find_or_create_account(&provider(), &member("42"), &details)
				.await
				.expect("Concurrent lookups should succeed.")
		}));
	}

	let mut created = 0;
	let mut ids = Vec::new();

	for handle in handles {
		let linked = handle.await.expect("Lookup task should not panic.");

		if linked.is_new {
			created += 1;
		}

		ids.push(linked.account.id);
	}

	assert_eq!(created, 1);
	assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
	assert_eq!(store.len(), 1);
}
