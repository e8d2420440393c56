//! Host configuration: consumer credentials, requested scope, and redirect targets.
//!
//! Values come from the environment ([`MeetupConfig::from_env`]), from any lookup function, or
//! from serde. The consumer key and secret are mandatory; everything else has a default.

// self
use crate::{
	_prelude::*,
	auth::{ConsumerCredentials, ScopeSet, TokenSecret},
	error::ConfigError,
};

/// Environment variable holding the consumer key (OAuth 2.0 client id).
pub const ENV_CONSUMER_KEY: &str = "MEETUP_CONSUMER_KEY";
/// Environment variable holding the consumer secret (OAuth 2.0 client secret).
pub const ENV_CONSUMER_SECRET: &str = "MEETUP_CONSUMER_SECRET";
/// Environment variable holding the requested OAuth 2.0 scopes.
pub const ENV_SCOPE: &str = "MEETUP_SCOPE";
/// Environment variable holding the post-login redirect.
pub const ENV_LOGIN_REDIRECT_URL: &str = "MEETUP_LOGIN_REDIRECT_URL";
/// Environment variable holding the redirect used after creating an account.
pub const ENV_NEW_USER_REDIRECT_URL: &str = "MEETUP_NEW_USER_REDIRECT_URL";
/// Environment variable holding the redirect used when sign-in fails.
pub const ENV_LOGIN_ERROR_URL: &str = "MEETUP_LOGIN_ERROR_URL";

const DEFAULT_LOGIN_REDIRECT_URL: &str = "/accounts/profile/";
const DEFAULT_LOGIN_ERROR_URL: &str = "/accounts/login/";

/// Redirect targets chosen after the callback completes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RedirectConfig {
	/// Target for returning members.
	pub login_redirect_url: String,
	/// Target for newly created accounts; empty falls back to `login_redirect_url`.
	pub new_user_redirect_url: String,
	/// Target for failed sign-ins.
	pub login_error_url: String,
}
impl RedirectConfig {
	/// Redirect for a freshly created account.
	pub fn new_user_redirect(&self) -> &str {
		if self.new_user_redirect_url.is_empty() {
			&self.login_redirect_url
		} else {
			&self.new_user_redirect_url
		}
	}
}
impl Default for RedirectConfig {
	fn default() -> Self {
		Self {
			login_redirect_url: DEFAULT_LOGIN_REDIRECT_URL.into(),
			new_user_redirect_url: String::new(),
			login_error_url: DEFAULT_LOGIN_ERROR_URL.into(),
		}
	}
}

/// Complete Meetup sign-in configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MeetupConfig {
	/// Consumer key issued by Meetup.
	pub consumer_key: String,
	/// Consumer secret issued by Meetup.
	pub consumer_secret: TokenSecret,
	/// Scopes requested by the OAuth 2.0 flow.
	#[serde(default)]
	pub scope: ScopeSet,
	/// Redirect targets.
	#[serde(default)]
	pub redirects: RedirectConfig,
}
impl MeetupConfig {
	/// Loads the configuration from process environment variables.
	pub fn from_env() -> Result<Self> {
		Self::from_lookup(|name| std::env::var(name).ok())
	}

	/// Loads the configuration through `lookup`; blank values count as unset.
	pub fn from_lookup<F>(lookup: F) -> Result<Self>
	where
		F: Fn(&str) -> Option<String>,
	{
		let get = |name: &str| {
			lookup(name).map(|value| value.trim().to_owned()).filter(|value| !value.is_empty())
		};
		let consumer_key =
			get(ENV_CONSUMER_KEY).ok_or(ConfigError::MissingSetting { name: ENV_CONSUMER_KEY })?;
		let consumer_secret = get(ENV_CONSUMER_SECRET)
			.ok_or(ConfigError::MissingSetting { name: ENV_CONSUMER_SECRET })?;
		let scope = match get(ENV_SCOPE) {
			Some(raw) => ScopeSet::from_str(&raw).map_err(ConfigError::from)?,
			None => ScopeSet::default(),
		};
		let defaults = RedirectConfig::default();
		let redirects = RedirectConfig {
			login_redirect_url: get(ENV_LOGIN_REDIRECT_URL).unwrap_or(defaults.login_redirect_url),
			new_user_redirect_url: get(ENV_NEW_USER_REDIRECT_URL)
				.unwrap_or(defaults.new_user_redirect_url),
			login_error_url: get(ENV_LOGIN_ERROR_URL).unwrap_or(defaults.login_error_url),
		};

		Ok(Self { consumer_key, consumer_secret: TokenSecret::new(consumer_secret), scope, redirects })
	}

	/// Consumer credentials used to sign (OAuth 1.0a) or authenticate (OAuth 2.0) requests.
	pub fn consumer(&self) -> ConsumerCredentials {
		ConsumerCredentials::new(self.consumer_key.clone(), self.consumer_secret.expose())
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
		move |name| pairs.iter().find(|(key, _)| *key == name).map(|(_, value)| (*value).to_owned())
	}

	#[test]
	fn missing_consumer_settings_are_reported_by_name() {
		let err = MeetupConfig::from_lookup(lookup(&[(ENV_CONSUMER_KEY, "key")]))
			.expect_err("Secret is required.");

		assert!(matches!(
			err,
			Error::Config(ConfigError::MissingSetting { name: ENV_CONSUMER_SECRET })
		));

		let err =
			MeetupConfig::from_lookup(lookup(&[(ENV_CONSUMER_KEY, "  "), (ENV_CONSUMER_SECRET, "s")]))
				.expect_err("Blank key counts as missing.");

		assert!(matches!(err, Error::Config(ConfigError::MissingSetting { name: ENV_CONSUMER_KEY })));
	}

	#[test]
	fn defaults_fill_optional_settings() {
		let config =
			MeetupConfig::from_lookup(lookup(&[(ENV_CONSUMER_KEY, "key"), (ENV_CONSUMER_SECRET, "secret")]))
				.expect("Minimal configuration should load.");

		assert!(config.scope.is_empty());
		assert_eq!(config.redirects, RedirectConfig::default());
		assert_eq!(config.redirects.new_user_redirect(), DEFAULT_LOGIN_REDIRECT_URL);
		assert_eq!(config.consumer().key, "key");
		assert_eq!(config.consumer().secret.expose(), "secret");
	}

	#[test]
	fn explicit_settings_override_defaults() {
		let config = MeetupConfig::from_lookup(lookup(&[
			(ENV_CONSUMER_KEY, "key"),
			(ENV_CONSUMER_SECRET, "secret"),
			(ENV_SCOPE, "basic,ageless"),
			(ENV_LOGIN_REDIRECT_URL, "/default/"),
			(ENV_NEW_USER_REDIRECT_URL, "/new/"),
			(ENV_LOGIN_ERROR_URL, "/error/"),
		]))
		.expect("Full configuration should load.");

		assert_eq!(config.scope.normalized(), "ageless basic");
		assert_eq!(config.redirects.new_user_redirect(), "/new/");
		assert_eq!(config.redirects.login_error_url, "/error/");
	}

	#[test]
	fn serde_applies_redirect_defaults() {
		let config: MeetupConfig =
			serde_json::from_str(r#"{"consumer_key":"key","consumer_secret":"s3cr3t"}"#)
				.expect("Configuration should deserialize.");

		assert_eq!(config.redirects.login_error_url, DEFAULT_LOGIN_ERROR_URL);
		assert_eq!(config.consumer_secret.expose(), "s3cr3t");
		assert!(!format!("{config:?}").contains("s3cr3t"));
	}
}
