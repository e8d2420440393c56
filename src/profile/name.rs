//! Display-name splitting.

// self
use crate::_prelude::*;

/// First and last name derived from a display name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NameParts {
	/// Everything before the last whitespace run (or the whole name).
	pub first_name: String,
	/// Token after the last whitespace run, empty for single-token names.
	pub last_name: String,
	/// Set when the last name also occurs inside the first-name part (e.g. `Ann Ann`).
	pub ambiguous: bool,
}
impl NameParts {
	/// Splits `name` on its last whitespace run after trimming.
	pub fn split(name: &str) -> Self {
		let full = name.trim();

		match full.rfind(char::is_whitespace) {
			Some(idx) => {
				let last_name = full[idx..].trim_start().to_owned();
				let first_name = full[..idx].trim_end().to_owned();
				let ambiguous = first_name.contains(&last_name);

				Self { first_name, last_name, ambiguous }
			},
			None => Self { first_name: full.to_owned(), last_name: String::new(), ambiguous: false },
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn two_tokens_split_into_first_and_last() {
		let parts = NameParts::split("  Joe Smith ");

		assert_eq!(parts.first_name, "Joe");
		assert_eq!(parts.last_name, "Smith");
		assert!(!parts.ambiguous);
	}

	#[test]
	fn single_token_leaves_last_name_empty() {
		let parts = NameParts::split("Cher");

		assert_eq!(parts, NameParts { first_name: "Cher".into(), ..Default::default() });
		assert_eq!(NameParts::split("   "), NameParts::default());
	}

	#[test]
	fn multi_token_names_keep_everything_before_the_last_run() {
		let parts = NameParts::split("Mary Jo \t van  Dyke");

		assert_eq!(parts.first_name, "Mary Jo \t van");
		assert_eq!(parts.last_name, "Dyke");
	}

	#[test]
	fn repeated_last_name_is_flagged() {
		let parts = NameParts::split("Ann Ann");

		assert_eq!(parts.first_name, "Ann");
		assert_eq!(parts.last_name, "Ann");
		assert!(parts.ambiguous);
		assert!(NameParts::split("Jonathan Jon").ambiguous);
	}
}
