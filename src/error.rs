//! Adapter-level error types shared across redemption, identity resolution, and transports.

// self
use crate::{_prelude::*, obs::Operation};

/// Adapter-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical adapter error exposed by public APIs.
///
/// Every variant is terminal for the current login attempt; retry policy belongs to the
/// caller.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Caller supplied an empty required field (`code`, `access token`, `user`).
	#[error("Missing {field}.")]
	InvalidInput {
		/// Name of the missing field.
		field: &'static str,
	},
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure (DNS, TCP, TLS, IO).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Provider answered with a non-success HTTP status.
	#[error(transparent)]
	Upstream(#[from] UpstreamError),
	/// Provider answered successfully but without the expected shape.
	#[error(transparent)]
	Protocol(#[from] ProtocolError),
}
impl Error {
	/// Shorthand for [`Error::InvalidInput`].
	pub(crate) fn missing(field: &'static str) -> Self {
		Self::InvalidInput { field }
	}
}

/// Configuration and request-construction failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// HTTP request construction failed.
	#[error(transparent)]
	HttpRequest(#[from] oauth2::http::Error),
	/// A configured or default endpoint URL could not be parsed.
	#[error("The {endpoint} endpoint URL is invalid.")]
	InvalidEndpoint {
		/// Which endpoint failed to parse.
		endpoint: &'static str,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
	/// Settings did not carry a client identifier.
	#[error("Client identifier is required.")]
	MissingClientId,
	/// Settings did not carry a client secret.
	#[error("Client secret is required.")]
	MissingClientSecret,
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the provider.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the provider.")]
	Io(#[from] std::io::Error),
	/// Transport failed without a structured cause.
	#[error("HTTP client error occurred during {operation}: {message}.")]
	Other {
		/// Operation that was in flight.
		operation: Operation,
		/// Transport-supplied description.
		message: String,
		/// HTTP status recorded before the failure, if any.
		status: Option<u16>,
	},
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		Self::network(e)
	}
}

/// Non-success HTTP response from a provider endpoint. Never retried by the adapter.
#[derive(Debug, ThisError)]
#[error("Got {status} from {url:?}: {body}")]
pub struct UpstreamError {
	/// HTTP status code returned by the provider.
	pub status: u16,
	/// Endpoint that produced the response.
	pub url: String,
	/// Raw response body, lossily decoded as UTF-8.
	pub body: String,
	/// Retry-After hint from upstream, if supplied.
	pub retry_after: Option<Duration>,
}

/// Responses that arrived intact but lacked the expected field or shape.
#[derive(Debug, ThisError)]
pub enum ProtocolError {
	/// No decoder found an access token in the token endpoint response.
	#[error("No access token found {body}")]
	MissingAccessToken {
		/// Raw response body for diagnostics.
		body: String,
	},
	/// Form-encoded fallback parse rejected the body.
	#[error("Token response is not a valid form-encoded body: {reason}.")]
	MalformedForm {
		/// What the parser rejected.
		reason: String,
		/// Raw response body for diagnostics.
		body: String,
	},
	/// Profile endpoint responded with malformed JSON.
	#[error("Profile endpoint returned malformed JSON.")]
	ProfileParse {
		/// Structured parsing failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Profile payload carried an empty `id`.
	#[error("No id.")]
	MissingProfileId,
	/// Login endpoint has no host to derive the identifier suffix from.
	#[error("Login URL {url} has no host.")]
	MissingLoginHost {
		/// Offending login URL.
		url: String,
	},
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn messages_match_caller_facing_wording() {
		assert_eq!(Error::missing("code").to_string(), "Missing code.");
		assert_eq!(Error::missing("access token").to_string(), "Missing access token.");

		let upstream = UpstreamError {
			status: 400,
			url: "https://cloud.example.com/token".into(),
			body: "{\"error\":\"invalid_grant\"}".into(),
			retry_after: None,
		};

		assert_eq!(
			upstream.to_string(),
			"Got 400 from \"https://cloud.example.com/token\": {\"error\":\"invalid_grant\"}"
		);
		assert_eq!(
			ProtocolError::MissingAccessToken { body: "token_type=bearer".into() }.to_string(),
			"No access token found token_type=bearer"
		);
	}
}
