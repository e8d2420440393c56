//! Meetup member profiles and their mapping onto host user details.
//!
//! Both protocol generations read the same `members.json` payload, so parsing lives here and the
//! flows only differ in how they authenticate the request. Parsing never fails loudly: any
//! malformed, empty, or result-less body yields `None`.

pub mod details;
pub mod name;

pub use details::*;
pub use name::*;

// crates.io
use serde::Deserializer;
// self
use crate::{_prelude::*, auth::ExternalId};

/// Member record returned by the Meetup profile endpoint (fields not listed are ignored).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeetupProfile {
	/// Member id; Meetup sends it as a number or a string.
	#[serde(deserialize_with = "deserialize_member_id")]
	pub id: ExternalId,
	/// Display name as entered by the member; `null` reads as empty.
	#[serde(default, deserialize_with = "deserialize_name")]
	pub name: String,
	/// Email address, present only when the member shared it.
	#[serde(default)]
	pub email: Option<String>,
}
impl MeetupProfile {
	/// Maps the profile onto host user details.
	pub fn user_details(&self, policy: UsernamePolicy) -> UserDetails {
		UserDetails::from_profile(self, policy)
	}
}

#[derive(Deserialize)]
struct MembersResponse {
	results: Vec<serde_json::Value>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMemberId {
	Number(u64),
	Text(String),
}

/// Returns the first member of a `members.json` response, if there is one.
pub fn parse_members_response(body: &[u8]) -> Option<MeetupProfile> {
	let de = &mut serde_json::Deserializer::from_slice(body);
	let first = match serde_path_to_error::deserialize::<_, MembersResponse>(de) {
		Ok(response) => response.results.into_iter().next()?,
		Err(_e) => {
			#[cfg(feature = "tracing")]
			tracing::debug!(path = %_e.path(), "Profile response did not contain a member.");

			return None;
		},
	};

	// Later results are never read, so they cannot spoil the first one.
	match serde_path_to_error::deserialize::<_, MeetupProfile>(first) {
		Ok(profile) => Some(profile),
		Err(_e) => {
			#[cfg(feature = "tracing")]
			tracing::debug!(path = %_e.path(), "First profile result was unusable.");

			None
		},
	}
}

fn deserialize_name<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	Option::<String>::deserialize(deserializer).map(Option::unwrap_or_default)
}

fn deserialize_member_id<'de, D>(deserializer: D) -> Result<ExternalId, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = match RawMemberId::deserialize(deserializer)? {
		RawMemberId::Number(id) => id.to_string(),
		RawMemberId::Text(id) => id,
	};

	ExternalId::new(raw).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn first_result_is_returned() {
		let profile = parse_members_response(
			br#"{"results":[{"id":"8675309","name":"Joe Smith","city":"Portland"},{"id":"1","name":"X"}],"meta":{}}"#,
		)
		.expect("First member should be returned.");

		assert_eq!(profile.id.as_ref(), "8675309");
		assert_eq!(profile.name, "Joe Smith");
		assert_eq!(profile.email, None);
	}

	#[test]
	fn malformed_later_results_do_not_hide_the_first() {
		let profile = parse_members_response(
			br#"{"results":[{"id":"8675309","name":"Joe Smith"},{"name":"No Id"},{"id":""}]}"#,
		)
		.expect("First member should be returned despite broken later entries.");

		assert_eq!(profile.id.as_ref(), "8675309");
		assert_eq!(profile.name, "Joe Smith");
	}

	#[test]
	fn null_name_reads_as_empty() {
		let profile = parse_members_response(br#"{"results":[{"id":42,"name":null}]}"#)
			.expect("A null name should not reject the member.");

		assert_eq!(profile.id.as_ref(), "42");
		assert_eq!(profile.name, "");
	}

	#[test]
	fn numeric_ids_are_stored_as_text() {
		let profile =
			parse_members_response(br#"{"results":[{"id":8675309,"name":"Joe","email":"joe@example.com"}]}"#)
				.expect("Numeric id should parse.");

		assert_eq!(profile.id.as_ref(), "8675309");
		assert_eq!(profile.email.as_deref(), Some("joe@example.com"));
	}

	#[test]
	fn unusable_bodies_yield_none() {
		assert!(parse_members_response(b"").is_none());
		assert!(parse_members_response(b"not json").is_none());
		assert!(parse_members_response(br#"{"meta":{}}"#).is_none());
		assert!(parse_members_response(br#"{"results":[]}"#).is_none());
		assert!(parse_members_response(br#"{"results":[{"name":"No Id"}]}"#).is_none());
		assert!(parse_members_response(br#"{"results":[{"id":""}]}"#).is_none());
	}
}
