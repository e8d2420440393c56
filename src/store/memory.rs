//! Thread-safe in-memory [`AccountStore`] implementation for local development and tests.

// self
use crate::{
	_prelude::*,
	auth::{ExternalId, ProviderId},
	profile::UserDetails,
	store::{Account, AccountId, AccountStore, LinkedAccount, StoreError, StoreFuture},
};

#[derive(Debug, Default)]
struct Accounts {
	next_id: u64,
	by_id: BTreeMap<AccountId, Account>,
	links: HashMap<(ProviderId, ExternalId), AccountId>,
}
impl Accounts {
	fn insert(&mut self, username: String, details: &UserDetails) -> Account {
		self.next_id += 1;

		let account = Account {
			id: AccountId(self.next_id),
			username,
			email: details.email.clone(),
			first_name: details.first_name.clone(),
			last_name: details.last_name.clone(),
		};

		self.by_id.insert(account.id, account.clone());

		account
	}

	fn username_taken(&self, username: &str) -> bool {
		self.by_id.values().any(|account| account.username == username)
	}

	fn unique_username(&self, base: &str) -> String {
		if !self.username_taken(base) {
			return base.to_owned();
		}

		(2_u64..)
			.map(|suffix| format!("{base}-{suffix}"))
			.find(|candidate| !self.username_taken(candidate))
			.unwrap_or_else(|| base.to_owned())
	}
}

/// Thread-safe account store that keeps accounts and provider links in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryAccountStore(Arc<RwLock<Accounts>>);
impl MemoryAccountStore {
	/// Creates an account directly, bypassing provider linking.
	pub fn insert_account(&self, username: &str, email: &str) -> Account {
		let details = UserDetails { email: email.to_owned(), ..Default::default() };
		let mut guard = self.0.write();
		let username = guard.unique_username(username);

		guard.insert(username, &details)
	}

	/// Links a provider identity to an existing account.
	pub fn link(
		&self,
		provider: ProviderId,
		external_id: ExternalId,
		account: AccountId,
	) -> Result<(), StoreError> {
		let mut guard = self.0.write();

		if !guard.by_id.contains_key(&account) {
			return Err(StoreError::Backend { message: format!("account {account} does not exist") });
		}

		guard.links.insert((provider, external_id), account);

		Ok(())
	}

	/// Number of stored accounts.
	pub fn len(&self) -> usize {
		self.0.read().by_id.len()
	}

	/// Returns `true` when no account exists.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn find_or_create_now(
		&self,
		provider: &ProviderId,
		external_id: &ExternalId,
		details: &UserDetails,
	) -> Result<LinkedAccount, StoreError> {
		let mut guard = self.0.write();
		let key = (provider.clone(), external_id.clone());

		if let Some(id) = guard.links.get(&key).copied() {
			let account = guard.by_id.get(&id).cloned().ok_or_else(|| StoreError::Backend {
				message: format!("link for {provider}/{external_id} points at missing account {id}"),
			})?;

			return Ok(LinkedAccount { account, is_new: false });
		}

		let base = generated_username(provider, external_id, details);
		let username = guard.unique_username(&base);
		let account = guard.insert(username, details);

		guard.links.insert(key, account.id);

		Ok(LinkedAccount { account, is_new: true })
	}
}
impl AccountStore for MemoryAccountStore {
	fn find_or_create_account<'a>(
		&'a self,
		provider: &'a ProviderId,
		external_id: &'a ExternalId,
		details: &'a UserDetails,
	) -> StoreFuture<'a, LinkedAccount> {
		Box::pin(async move { self.find_or_create_now(provider, external_id, details) })
	}

	fn get_account(&self, id: AccountId) -> StoreFuture<'_, Option<Account>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().by_id.get(&id).cloned()) })
	}
}

/// Username suggested by the details, else the email local part, else `<provider>-<uid>`.
fn generated_username(
	provider: &ProviderId,
	external_id: &ExternalId,
	details: &UserDetails,
) -> String {
	let suggested = details.username.trim();

	if !suggested.is_empty() {
		return suggested.to_owned();
	}

	match details.email.split_once('@') {
		Some((local, _)) if !local.trim().is_empty() => local.trim().to_owned(),
		_ => format!("{provider}-{external_id}"),
	}
}
