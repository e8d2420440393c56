//! Callback pipeline: credential exchange, profile lookup, account linking, and redirect choice.
//!
//! [`Authenticator::complete`] turns every member-facing failure (denied authorization, bad
//! callback, rejected grant, missing profile) into [`AuthOutcome::Failed`] pointing at the
//! configured error page. Transport, transient, storage, and configuration problems are
//! returned as `Err` so the host can surface them as server errors.

mod metrics;

pub use metrics::AuthMetrics;

// self
use crate::{
	_prelude::*,
	config::RedirectConfig,
	flows::{AuthorizationRequest, CallbackParams, PendingAuthorization, ProviderFlow},
	obs::{self, FlowKind},
	profile::MeetupProfile,
	store::{Account, AccountId, AccountStore},
};

/// Why a sign-in ended on the login error redirect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureReason {
	/// The member declined the authorization request.
	AccessDenied,
	/// The callback did not match the pending authorization.
	InvalidCallback,
	/// The provider rejected the grant or the consumer credentials.
	Rejected,
	/// The profile response carried no member.
	NoProfile,
}

/// Result of a completed callback.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AuthOutcome {
	/// An existing account is linked to the member.
	Matched {
		/// Linked account.
		account: Account,
		/// Login redirect target.
		redirect: String,
	},
	/// A new account was created and linked.
	Created {
		/// Newly created account.
		account: Account,
		/// New-user redirect target.
		redirect: String,
	},
	/// Sign-in failed.
	Failed {
		/// Failure category.
		reason: FailureReason,
		/// Human-readable detail for logs; never shown to the member verbatim.
		detail: String,
		/// Login error redirect target.
		redirect: String,
	},
}
impl AuthOutcome {
	/// Redirect target for the member's browser.
	pub fn redirect(&self) -> &str {
		match self {
			Self::Matched { redirect, .. }
			| Self::Created { redirect, .. }
			| Self::Failed { redirect, .. } => redirect,
		}
	}

	/// Signed-in account, if the sign-in succeeded.
	pub fn account(&self) -> Option<&Account> {
		match self {
			Self::Matched { account, .. } | Self::Created { account, .. } => Some(account),
			Self::Failed { .. } => None,
		}
	}
}

/// Drives a [`ProviderFlow`] against an [`AccountStore`].
#[derive(Clone)]
pub struct Authenticator {
	flow: Arc<dyn ProviderFlow>,
	accounts: Arc<dyn AccountStore>,
	redirects: RedirectConfig,
	metrics: Arc<AuthMetrics>,
}
impl Authenticator {
	/// Creates an authenticator for one flow, account store, and redirect configuration.
	pub fn new(
		flow: Arc<dyn ProviderFlow>,
		accounts: Arc<dyn AccountStore>,
		redirects: RedirectConfig,
	) -> Self {
		Self { flow, accounts, redirects, metrics: Default::default() }
	}

	/// Wrapped flow.
	pub fn flow(&self) -> &Arc<dyn ProviderFlow> {
		&self.flow
	}

	/// Redirect configuration.
	pub fn redirects(&self) -> &RedirectConfig {
		&self.redirects
	}

	/// Sign-in counters.
	pub fn metrics(&self) -> &AuthMetrics {
		&self.metrics
	}

	/// Starts an authorization; `complete_url` is the host's callback endpoint.
	pub async fn begin(&self, complete_url: &Url) -> Result<AuthorizationRequest> {
		self.flow.begin(complete_url).await
	}

	/// Completes a callback and decides where the member goes next.
	pub async fn complete(
		&self,
		pending: &PendingAuthorization,
		callback: &CallbackParams,
	) -> Result<AuthOutcome> {
		self.metrics.record_attempt();

		let result = obs::observe(FlowKind::Authenticate, "complete", async {
			let credential = self.flow.obtain_credential(pending, callback).await?;

			match self.flow.fetch_profile(&credential).await? {
				Some(profile) => self.authenticate_profile(&profile).await,
				None => Ok(self.failed(FailureReason::NoProfile, "profile response had no member")),
			}
		})
		.await;
		let outcome = match result {
			Ok(outcome) => outcome,
			Err(e) => match failure_reason(&e) {
				Some(reason) => self.failed(reason, e.to_string()),
				None => return Err(e),
			},
		};

		match &outcome {
			AuthOutcome::Matched { .. } => self.metrics.record_matched(),
			AuthOutcome::Created { .. } => self.metrics.record_created(),
			AuthOutcome::Failed { .. } => self.metrics.record_failed(),
		}

		Ok(outcome)
	}

	/// Links `profile` to a local account, creating one on first sign-in.
	pub async fn authenticate_profile(&self, profile: &MeetupProfile) -> Result<AuthOutcome> {
		let details = self.flow.user_details(profile);
		let provider = &self.flow.descriptor().id;
		let linked = self.accounts.find_or_create_account(provider, &profile.id, &details).await?;
		let outcome = if linked.is_new {
			AuthOutcome::Created {
				account: linked.account,
				redirect: self.redirects.new_user_redirect().to_owned(),
			}
		} else {
			AuthOutcome::Matched {
				account: linked.account,
				redirect: self.redirects.login_redirect_url.clone(),
			}
		};

		Ok(outcome)
	}

	/// Looks up an account by id, e.g. for host session middleware.
	pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
		Ok(self.accounts.get_account(id).await?)
	}

	fn failed(&self, reason: FailureReason, detail: impl Into<String>) -> AuthOutcome {
		AuthOutcome::Failed {
			reason,
			detail: detail.into(),
			redirect: self.redirects.login_error_url.clone(),
		}
	}
}
impl Debug for Authenticator {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Authenticator")
			.field("provider", &self.flow.descriptor().id)
			.field("redirects", &self.redirects)
			.field("metrics", &self.metrics)
			.finish()
	}
}

fn failure_reason(error: &Error) -> Option<FailureReason> {
	match error {
		Error::AccessDenied { .. } => Some(FailureReason::AccessDenied),
		Error::InvalidCallback { .. } => Some(FailureReason::InvalidCallback),
		Error::InvalidGrant { .. } | Error::InvalidClient { .. } => Some(FailureReason::Rejected),
		_ => None,
	}
}
