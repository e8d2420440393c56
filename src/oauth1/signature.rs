//! Signature base string and HMAC-SHA1 primitives.

// std
use std::fmt::Write;
// crates.io
use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use sha1::Sha1;
// self
use crate::{_prelude::*, error::ConfigError};

type HmacSha1 = Hmac<Sha1>;

/// Everything except ALPHA, DIGIT, `-`, `.`, `_`, and `~` is escaped.
const OAUTH_ENCODE_SET: &AsciiSet =
	&NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

/// Percent-encodes a value with the OAuth 1.0a unreserved set.
pub fn percent_encode(value: &str) -> String {
	utf8_percent_encode(value, OAUTH_ENCODE_SET).to_string()
}

/// Base string URI: scheme, authority, and path, without query or fragment.
pub fn base_string_uri(url: &Url) -> String {
	let mut uri = format!("{}://{}", url.scheme(), url.host_str().unwrap_or_default());

	if let Some(port) = url.port() {
		let _ = write!(uri, ":{port}");
	}

	uri.push_str(url.path());

	uri
}

/// Builds `METHOD&uri&params` with params encoded, sorted, and joined.
pub fn signature_base_string(method: &str, url: &Url, params: &[(String, String)]) -> String {
	let mut encoded = params
		.iter()
		.map(|(key, value)| (percent_encode(key), percent_encode(value)))
		.collect::<Vec<_>>();

	encoded.sort();

	let normalized =
		encoded.iter().map(|(key, value)| format!("{key}={value}")).collect::<Vec<_>>().join("&");

	format!(
		"{}&{}&{}",
		method.to_ascii_uppercase(),
		percent_encode(&base_string_uri(url)),
		percent_encode(&normalized)
	)
}

/// Signing key: encoded consumer secret and encoded token secret joined by `&`.
pub fn signing_key(consumer_secret: &str, token_secret: &str) -> String {
	format!("{}&{}", percent_encode(consumer_secret), percent_encode(token_secret))
}

/// HMAC-SHA1 digest of `text`, base64 encoded.
pub fn hmac_sha1(key: &str, text: &str) -> Result<String> {
	let mut mac =
		HmacSha1::new_from_slice(key.as_bytes()).map_err(|_| ConfigError::SigningKey)?;

	mac.update(text.as_bytes());

	Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn base_string_matches_the_published_example() {
		let url = Url::parse("http://photos.example.net/photos?file=vacation.jpg&size=original")
			.expect("Example URL should parse.");
		let params = [
			("oauth_consumer_key", "dpf43f3p2l4k3l03"),
			("oauth_token", "nnch734d00sl2jdk"),
			("oauth_signature_method", "HMAC-SHA1"),
			("oauth_timestamp", "1191242096"),
			("oauth_nonce", "kllo9940pd9333jh"),
			("oauth_version", "1.0"),
			("file", "vacation.jpg"),
			("size", "original"),
		]
		.map(|(key, value)| (key.to_owned(), value.to_owned()));
		let base = signature_base_string("get", &url, &params);

		assert_eq!(
			base,
			"GET&http%3A%2F%2Fphotos.example.net%2Fphotos&file%3Dvacation.jpg%26oauth_consumer_key%3Ddpf43f3p2l4k3l03%26oauth_nonce%3Dkllo9940pd9333jh%26oauth_signature_method%3DHMAC-SHA1%26oauth_timestamp%3D1191242096%26oauth_token%3Dnnch734d00sl2jdk%26oauth_version%3D1.0%26size%3Doriginal"
		);
		assert_eq!(
			hmac_sha1(&signing_key("kd94hf93k423kf44", "pfkkdhi9sl3r4s00"), &base)
				.expect("HMAC accepts any key length."),
			"tR3+Ty81lMeYAr/Fid0kMTYa/WM="
		);
	}

	#[test]
	fn encoding_keeps_only_unreserved_characters() {
		assert_eq!(percent_encode("a-b.c_d~e"), "a-b.c_d~e");
		assert_eq!(percent_encode("Ladies + Gentlemen"), "Ladies%20%2B%20Gentlemen");
		assert_eq!(percent_encode("ü"), "%C3%BC");
	}

	#[test]
	fn base_uri_keeps_non_default_ports_and_drops_queries() {
		let url = Url::parse("HTTPS://Api.Meetup.com:8443/members.json/?relation=self#frag")
			.expect("URL should parse.");

		assert_eq!(base_string_uri(&url), "https://api.meetup.com:8443/members.json/");

		let url = Url::parse("https://api.meetup.com:443/oauth/request/").expect("URL should parse.");

		assert_eq!(base_string_uri(&url), "https://api.meetup.com/oauth/request/");
	}
}
