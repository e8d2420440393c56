//! Account storage contract and the built-in in-memory implementation.
//!
//! The host application owns persistence; the crate only needs to look up or create the local
//! account linked to a provider identity.

pub mod memory;

pub use memory::MemoryAccountStore;

// self
use crate::{
	_prelude::*,
	auth::{ExternalId, ProviderId},
	profile::UserDetails,
};

/// Boxed future returned by [`AccountStore`] operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract implemented by host account stores.
pub trait AccountStore
where
	Self: Send + Sync,
{
	/// Returns the account linked to `(provider, external_id)`, creating it from `details`
	/// when no link exists yet.
	fn find_or_create_account<'a>(
		&'a self,
		provider: &'a ProviderId,
		external_id: &'a ExternalId,
		details: &'a UserDetails,
	) -> StoreFuture<'a, LinkedAccount>;

	/// Fetches an account by its local identifier.
	fn get_account(&self, id: AccountId) -> StoreFuture<'_, Option<Account>>;
}

/// Local account identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub u64);
impl Display for AccountId {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "{}", self.0)
	}
}

/// Local account as seen by the host application.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
	/// Local identifier.
	pub id: AccountId,
	/// Unique username.
	pub username: String,
	/// Email address, possibly empty.
	pub email: String,
	/// First name.
	pub first_name: String,
	/// Last name.
	pub last_name: String,
}

/// Account returned by [`AccountStore::find_or_create_account`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedAccount {
	/// Linked account.
	pub account: Account,
	/// `true` when the account was created by this call.
	pub is_new: bool,
}

/// Error type produced by [`AccountStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	// std
	use std::error::Error as StdError;
	// self
	use super::*;

	#[test]
	fn store_error_converts_into_crate_error_with_source() {
		let store_error = StoreError::Backend { message: "database unreachable".into() };
		let error: Error = store_error.clone().into();

		assert!(matches!(error, Error::Storage(_)));
		assert!(error.to_string().contains("database unreachable"));
		assert!(!error.is_authentication_failure());

		let source =
			StdError::source(&error).expect("Crate error should expose the store error as its source.");

		assert_eq!(source.to_string(), store_error.to_string());
	}

	#[test]
	fn account_id_serializes_as_a_number() {
		assert_eq!(serde_json::to_string(&AccountId(7)).expect("Id should serialize."), "7");
	}
}
