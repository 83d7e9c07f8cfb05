//! Token endpoint response decoding.
//!
//! Providers disagree on how they encode the token response, so rather than trusting
//! `Content-Type` the adapter probes an ordered list of decoders. The default order is JSON
//! first, then `application/x-www-form-urlencoded`.

// std
use std::{borrow::Cow, str};
// crates.io
use percent_encoding::percent_decode_str;
use serde_json::Value;
// self
use crate::{_prelude::*, auth::Secret, error::ProtocolError};

const ACCESS_TOKEN: &str = "access_token";

/// One strategy for pulling an access token out of a token endpoint body.
pub trait TokenResponseDecoder
where
	Self: Send + Sync,
{
	/// Short label for the encoding this decoder understands.
	fn format(&self) -> &'static str;

	/// Decodes `body`.
	///
	/// `Ok(Some)` accepts the token and stops the chain, `Ok(None)` hands the body to the
	/// next decoder, and `Err` aborts the redemption.
	fn decode(&self, body: &[u8]) -> Result<Option<Secret>, ProtocolError>;
}

/// Accepts any body that decodes as a JSON object (or `null`).
///
/// A successful decode is trusted even when `access_token` is empty or absent. Arrays,
/// scalars and objects whose `access_token` is not a string defer to the next decoder.
#[derive(Clone, Copy, Debug, Default)]
pub struct JsonTokenDecoder;
impl TokenResponseDecoder for JsonTokenDecoder {
	fn format(&self) -> &'static str {
		"json"
	}

	fn decode(&self, body: &[u8]) -> Result<Option<Secret>, ProtocolError> {
		#[derive(Deserialize)]
		struct JsonTokenBody {
			#[serde(default)]
			access_token: Option<String>,
		}

		let Ok(value) = serde_json::from_slice::<Value>(body) else {
			return Ok(None);
		};

		if value.is_null() {
			return Ok(Some(Secret::default()));
		}
		if !value.is_object() {
			return Ok(None);
		}

		Ok(serde_json::from_value::<JsonTokenBody>(value)
			.ok()
			.map(|parsed| Secret::new(parsed.access_token.unwrap_or_default())))
	}
}

/// Reads `access_token` from a form-encoded body.
///
/// Malformed percent escapes and non-UTF-8 bytes (raw or escaped) abort the chain; a missing
/// or empty key defers.
#[derive(Clone, Copy, Debug, Default)]
pub struct FormTokenDecoder;
impl TokenResponseDecoder for FormTokenDecoder {
	fn format(&self) -> &'static str {
		"form"
	}

	fn decode(&self, body: &[u8]) -> Result<Option<Secret>, ProtocolError> {
		let malformed = |reason: String| ProtocolError::MalformedForm {
			reason,
			body: String::from_utf8_lossy(body).into_owned(),
		};
		let text = str::from_utf8(body).map_err(|e| malformed(format!("body is not UTF-8: {e}")))?;

		check_percent_escapes(text.as_bytes()).map_err(malformed)?;

		for pair in text.split('&').filter(|pair| !pair.is_empty()) {
			let (key, value) = pair.split_once('=').unwrap_or((pair, ""));

			if decode_component(key).map_err(malformed)? != ACCESS_TOKEN {
				continue;
			}

			let value = decode_component(value).map_err(malformed)?;

			return Ok(Some(value).filter(|value| !value.is_empty()).map(Secret::new));
		}

		Ok(None)
	}
}

/// Ordered list of [`TokenResponseDecoder`]s applied until one produces a token.
#[derive(Clone)]
pub struct TokenDecoderChain(Vec<Arc<dyn TokenResponseDecoder>>);
impl TokenDecoderChain {
	/// Creates a chain from decoders in priority order.
	pub fn new<I>(decoders: I) -> Self
	where
		I: IntoIterator<Item = Arc<dyn TokenResponseDecoder>>,
	{
		Self(decoders.into_iter().collect())
	}

	/// Appends a lower-priority decoder.
	pub fn then(mut self, decoder: impl 'static + TokenResponseDecoder) -> Self {
		self.0.push(Arc::new(decoder));

		self
	}

	/// Labels of the decoders in priority order.
	pub fn formats(&self) -> Vec<&'static str> {
		self.0.iter().map(|decoder| decoder.format()).collect()
	}

	/// Runs the decoders in order.
	pub fn decode(&self, body: &[u8]) -> Result<Secret, ProtocolError> {
		for decoder in &self.0 {
			if let Some(token) = decoder.decode(body)? {
				return Ok(token);
			}
		}

		Err(ProtocolError::MissingAccessToken { body: String::from_utf8_lossy(body).into_owned() })
	}
}
impl Default for TokenDecoderChain {
	fn default() -> Self {
		Self::new([
			Arc::new(JsonTokenDecoder) as Arc<dyn TokenResponseDecoder>,
			Arc::new(FormTokenDecoder),
		])
	}
}
impl Debug for TokenDecoderChain {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_tuple("TokenDecoderChain").field(&self.formats()).finish()
	}
}

fn decode_component(raw: &str) -> Result<String, String> {
	let raw = raw.replace('+', " ");

	percent_decode_str(&raw)
		.decode_utf8()
		.map(Cow::into_owned)
		.map_err(|e| format!("escaped bytes in \"{raw}\" are not UTF-8: {e}"))
}

fn check_percent_escapes(body: &[u8]) -> Result<(), String> {
	let mut idx = 0;

	while idx < body.len() {
		if body[idx] == b'%' {
			let escape = body.get(idx + 1..idx + 3).unwrap_or(&body[idx + 1..]);

			if escape.len() != 2 || !escape.iter().all(u8::is_ascii_hexdigit) {
				return Err(format!(
					"invalid URL escape \"%{}\"",
					String::from_utf8_lossy(escape)
				));
			}

			idx += 3;
		} else {
			idx += 1;
		}
	}

	Ok(())
}
