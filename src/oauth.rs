//! OAuth wire helpers: request construction, dispatch, and transport error mapping.

pub use oauth2;

// crates.io
use base64::{Engine as _, engine::general_purpose::STANDARD};
use oauth2::{
	AsyncHttpClient, HttpClientError, HttpRequest,
	http::{
		Method,
		header::{AUTHORIZATION, CONTENT_TYPE, HeaderValue},
	},
};
use url::form_urlencoded::Serializer;
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransportError, UpstreamError},
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	obs::Operation,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Maps HTTP transport failures into adapter [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into an adapter error.
	fn map_transport_error(
		&self,
		operation: Operation,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
#[cfg(feature = "reqwest")]
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		operation: Operation,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(*inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(operation, meta, message),
			_ => map_generic_transport_error(operation, meta, "unknown transport failure"),
		}
	}
}

/// Builds [`TransportError::Other`], keeping any status the transport recorded.
pub fn map_generic_transport_error(
	operation: Operation,
	meta: Option<&ResponseMetadata>,
	message: impl Into<String>,
) -> Error {
	TransportError::Other {
		operation,
		message: message.into(),
		status: meta.and_then(|meta| meta.status),
	}
	.into()
}

#[cfg(feature = "reqwest")]
fn map_reqwest_error(err: ReqwestError) -> Error {
	if err.is_builder() {
		return ConfigError::from(err).into();
	}

	TransportError::from(err).into()
}

/// Fully buffered provider response.
#[derive(Clone, Debug)]
pub(crate) struct ProviderResponse {
	pub(crate) status: u16,
	pub(crate) retry_after: Option<Duration>,
	pub(crate) body: Vec<u8>,
}
impl ProviderResponse {
	pub(crate) fn is_ok(&self) -> bool {
		self.status == 200
	}

	pub(crate) fn body_text(&self) -> String {
		String::from_utf8_lossy(&self.body).into_owned()
	}

	pub(crate) fn into_upstream_error(self, url: &Url) -> UpstreamError {
		UpstreamError {
			status: self.status,
			url: url.to_string(),
			body: self.body_text(),
			retry_after: self.retry_after,
		}
	}
}

/// Sends exactly one request through the transport and buffers the response.
pub(crate) async fn dispatch<C, M>(
	http_client: &C,
	mapper: &M,
	operation: Operation,
	request: HttpRequest,
) -> Result<ProviderResponse>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let meta = ResponseMetadataSlot::default();
	let handle = http_client.with_metadata(meta.clone());
	let response = handle
		.call(request)
		.await
		.map_err(|err| mapper.map_transport_error(operation, meta.take().as_ref(), err))?;
	let retry_after = meta.take().and_then(|value| value.retry_after);

	Ok(ProviderResponse {
		status: response.status().as_u16(),
		retry_after,
		body: response.into_body(),
	})
}

/// Builds `Basic base64(client_id:client_secret)`.
pub(crate) fn basic_authorization(client_id: &str, client_secret: &str) -> String {
	format!("Basic {}", STANDARD.encode(format!("{client_id}:{client_secret}")))
}

/// Builds a form-encoded `POST` carrying client credentials in both the body and a Basic
/// `Authorization` header.
pub(crate) fn form_post(
	url: &Url,
	form: &BTreeMap<String, String>,
	client_id: &str,
	client_secret: &str,
) -> Result<HttpRequest> {
	let mut body = Serializer::new(String::new());

	for (key, value) in form {
		body.append_pair(key, value);
	}

	let authorization = header_value(basic_authorization(client_id, client_secret))?;

	oauth2::http::Request::builder()
		.method(Method::POST)
		.uri(url.as_str())
		.header(CONTENT_TYPE, HeaderValue::from_static(FORM_CONTENT_TYPE))
		.header(AUTHORIZATION, authorization)
		.body(body.finish().into_bytes())
		.map_err(|e| ConfigError::from(e).into())
}

/// Builds a `GET` authorized with `Bearer <access_token>`.
pub(crate) fn bearer_get(url: &Url, access_token: &str) -> Result<HttpRequest> {
	let authorization = header_value(format!("Bearer {access_token}"))?;

	oauth2::http::Request::builder()
		.method(Method::GET)
		.uri(url.as_str())
		.header(AUTHORIZATION, authorization)
		.body(Vec::new())
		.map_err(|e| ConfigError::from(e).into())
}

fn header_value(value: String) -> Result<HeaderValue> {
	let mut value = HeaderValue::try_from(value)
		.map_err(|e| ConfigError::from(oauth2::http::Error::from(e)))?;

	value.set_sensitive(true);

	Ok(value)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Test URL should parse.")
	}

	#[test]
	fn basic_authorization_encodes_credentials() {
		assert_eq!(basic_authorization("client", "secret"), "Basic Y2xpZW50OnNlY3JldA==");
	}

	#[test]
	fn form_post_carries_credentials_twice() {
		let mut form = BTreeMap::new();

		form.insert("client_id".to_owned(), "client".to_owned());
		form.insert("redirect_uri".to_owned(), "https://proxy.example.com/oauth2/callback".to_owned());

		let request = form_post(&url("https://cloud.example.com/token"), &form, "client", "secret")
			.expect("Form request should build.");

		assert_eq!(request.method(), Method::POST);
		assert_eq!(request.uri(), "https://cloud.example.com/token");
		assert_eq!(
			request.headers().get(CONTENT_TYPE).and_then(|value| value.to_str().ok()),
			Some(FORM_CONTENT_TYPE)
		);
		assert_eq!(
			request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()),
			Some("Basic Y2xpZW50OnNlY3JldA==")
		);
		assert_eq!(
			String::from_utf8_lossy(request.body()),
			"client_id=client&redirect_uri=https%3A%2F%2Fproxy.example.com%2Foauth2%2Fcallback"
		);
	}

	#[test]
	fn bearer_get_rejects_header_breaking_tokens() {
		let request = bearer_get(&url("https://cloud.example.com/user"), "abc123")
			.expect("Bearer request should build.");

		assert_eq!(request.method(), Method::GET);
		assert_eq!(
			request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()),
			Some("Bearer abc123")
		);

		let err = bearer_get(&url("https://cloud.example.com/user"), "abc\r\n123")
			.expect_err("Control characters must not reach the header map.");

		assert!(matches!(err, Error::Config(ConfigError::HttpRequest(_))));
	}

	#[test]
	fn generic_transport_errors_keep_recorded_status() {
		let meta = ResponseMetadata { status: Some(502), retry_after: None };
		let err = map_generic_transport_error(Operation::Redeem, Some(&meta), "body stream reset");

		match &err {
			Error::Transport(TransportError::Other { operation, message, status }) => {
				assert_eq!(*operation, Operation::Redeem);
				assert_eq!(message, "body stream reset");
				assert_eq!(*status, Some(502));
			},
			other => panic!("Unexpected error variant: {other:?}."),
		}

		assert_eq!(
			err.to_string(),
			"HTTP client error occurred during redeem: body stream reset."
		);
		assert!(matches!(
			map_generic_transport_error(Operation::ValidateSession, None, "closed"),
			Error::Transport(TransportError::Other { status: None, .. })
		));
	}
}
