//! Host-facing user details derived from a member profile.

// self
use crate::{_prelude::*, profile::{MeetupProfile, NameParts}};

/// How the `username` field of [`UserDetails`] is chosen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsernamePolicy {
	/// Use the Meetup member id (legacy flow behavior).
	MemberId,
	/// Leave the username empty so the account store generates one (OAuth 2.0 flow behavior).
	#[default]
	HostDefault,
}

/// Generic user-detail record consumed by account stores.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
	/// Suggested username; empty means "let the store decide".
	pub username: String,
	/// Email address, empty when the member did not share one.
	pub email: String,
	/// Trimmed display name.
	pub fullname: String,
	/// First name.
	pub first_name: String,
	/// Last name.
	pub last_name: String,
}
impl UserDetails {
	/// Maps a profile under the given username policy.
	pub fn from_profile(profile: &MeetupProfile, policy: UsernamePolicy) -> Self {
		let NameParts { first_name, last_name, .. } = NameParts::split(&profile.name);
		let username = match policy {
			UsernamePolicy::MemberId => profile.id.to_string(),
			UsernamePolicy::HostDefault => String::new(),
		};

		Self {
			username,
			email: profile.email.clone().unwrap_or_default(),
			fullname: profile.name.trim().to_owned(),
			first_name,
			last_name,
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::auth::ExternalId;

	fn profile(name: &str, email: Option<&str>) -> MeetupProfile {
		MeetupProfile {
			id: ExternalId::new("8675309").expect("Member id should be valid."),
			name: name.into(),
			email: email.map(Into::into),
		}
	}

	#[test]
	fn member_id_policy_uses_the_id_as_username() {
		let details = UserDetails::from_profile(&profile(" Joe Smith ", None), UsernamePolicy::MemberId);

		assert_eq!(
			details,
			UserDetails {
				username: "8675309".into(),
				email: String::new(),
				fullname: "Joe Smith".into(),
				first_name: "Joe".into(),
				last_name: "Smith".into(),
			}
		);
	}

	#[test]
	fn host_default_policy_leaves_username_empty() {
		let details = profile("Cher", Some("cher@example.com")).user_details(UsernamePolicy::HostDefault);

		assert!(details.username.is_empty());
		assert_eq!(details.email, "cher@example.com");
		assert_eq!(details.first_name, "Cher");
		assert!(details.last_name.is_empty());
	}
}
