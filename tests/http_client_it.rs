// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	future::Future,
	pin::Pin,
	sync::Arc,
};
// crates.io
use parking_lot::Mutex;
use time::Duration;
use url::Url;
// self
use owncloud_oauth2::{
	auth::SessionState,
	error::{Error, TransportError},
	flows::OwncloudProvider,
	http::{ProviderHttpClient, ResponseMetadata, ResponseMetadataSlot},
	oauth::{
		TransportErrorMapper,
		oauth2::{AsyncHttpClient, HttpClientError, HttpRequest, HttpResponse, http::StatusCode},
	},
	obs::Operation,
	provider::{
		JsonTokenDecoder, ProviderConfig, ProviderSettings, TokenDecoderChain, TokenResponseDecoder,
	},
};

#[derive(Debug)]
enum FakeTransportError {
	Reset,
}
impl Display for FakeTransportError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		match self {
			Self::Reset => write!(f, "Connection reset."),
		}
	}
}
impl StdError for FakeTransportError {}

#[derive(Clone)]
enum Script {
	Respond { status: u16, body: &'static str },
	Fail { retry_after: Duration },
}

#[derive(Clone)]
struct FakeHttpClient {
	script: Script,
	requests: Arc<Mutex<Vec<HttpRequest>>>,
}
impl FakeHttpClient {
	fn new(script: Script) -> Self {
		Self { script, requests: Default::default() }
	}
}
impl ProviderHttpClient for FakeHttpClient {
	type Handle = FakeHttpHandle;
	type TransportError = FakeTransportError;

	fn with_metadata(&self, slot: ResponseMetadataSlot) -> Self::Handle {
		FakeHttpHandle { slot, client: self.clone() }
	}
}

struct FakeHttpHandle {
	slot: ResponseMetadataSlot,
	client: FakeHttpClient,
}
impl<'a> AsyncHttpClient<'a> for FakeHttpHandle {
	type Error = HttpClientError<FakeTransportError>;
	type Future =
		Pin<Box<dyn Future<Output = Result<HttpResponse, Self::Error>> + 'a + Send + Sync>>;

	fn call(&'a self, request: HttpRequest) -> Self::Future {
		let slot = self.slot.clone();
		let script = self.client.script.clone();

		self.client.requests.lock().push(request);

		Box::pin(async move {
			assert!(
				slot.take().is_none(),
				"ResponseMetadataSlot must be clear before dispatching a request."
			);

			match script {
				Script::Respond { status, body } => {
					slot.store(ResponseMetadata { status: Some(status), retry_after: None });

					let mut response = HttpResponse::new(body.as_bytes().to_vec());

					*response.status_mut() =
						StatusCode::from_u16(status).expect("Scripted status should be valid.");

					Ok(response)
				},
				Script::Fail { retry_after } => {
					slot.store(ResponseMetadata { status: None, retry_after: Some(retry_after) });

					Err(HttpClientError::Reqwest(Box::new(FakeTransportError::Reset)))
				},
			}
		})
	}
}

#[derive(Clone, Default)]
struct RecordingTransportErrorMapper {
	seen: Arc<Mutex<Vec<(Operation, Option<ResponseMetadata>)>>>,
}
impl TransportErrorMapper<FakeTransportError> for RecordingTransportErrorMapper {
	fn map_transport_error(
		&self,
		operation: Operation,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<FakeTransportError>,
	) -> Error {
		self.seen.lock().push((operation, meta.cloned()));

		match err {
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			other => TransportError::network(other).into(),
		}
	}
}

fn config() -> ProviderConfig {
	ProviderSettings::new("fake-client", "fake-secret")
		.login_url(
			Url::parse("https://cloud.example.com/index.php/apps/oauth2/authorize")
				.expect("Failed to parse login URL."),
		)
		.redeem_url(
			Url::parse("https://cloud.example.com/index.php/apps/oauth2/api/v1/token")
				.expect("Failed to parse token URL."),
		)
		.resolve()
		.expect("Failed to resolve fake provider settings.")
}

#[tokio::test]
async fn custom_transport_carries_one_request_per_operation() {
	let http_client = Arc::new(FakeHttpClient::new(Script::Respond {
		status: 200,
		body: "access_token=fake-token&expires_in=3600",
	}));
	let mapper = Arc::new(RecordingTransportErrorMapper::default());
	let provider: OwncloudProvider<FakeHttpClient, RecordingTransportErrorMapper> =
		OwncloudProvider::with_http_client(config(), http_client.clone(), mapper.clone());
	let session = provider
		.redeem("https://proxy.example.com/cb", "fake-code")
		.await
		.expect("Scripted redemption should succeed.");

	assert_eq!(session.access_token.expose(), "fake-token");

	let requests = http_client.requests.lock();

	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].method(), "POST");
	assert_eq!(
		requests[0].uri().to_string(),
		"https://cloud.example.com/index.php/apps/oauth2/api/v1/token"
	);
	assert!(mapper.seen.lock().is_empty());
}

#[tokio::test]
async fn mapper_receives_operation_and_metadata() {
	let http_client =
		Arc::new(FakeHttpClient::new(Script::Fail { retry_after: Duration::seconds(5) }));
	let mapper = Arc::new(RecordingTransportErrorMapper::default());
	let provider: OwncloudProvider<FakeHttpClient, RecordingTransportErrorMapper> =
		OwncloudProvider::with_http_client(config(), http_client, mapper.clone());
	let err = provider
		.get_email_address(&SessionState::new("fake-token"))
		.await
		.expect_err("Scripted transport failure should surface.");

	assert!(matches!(err, Error::Transport(TransportError::Network { .. })));

	let seen = mapper.seen.lock();

	assert_eq!(seen.len(), 1, "Mapper must record a single request.");
	assert_eq!(seen[0].0, Operation::ResolveIdentity);
	assert_eq!(
		seen[0].1.as_ref().and_then(|meta| meta.retry_after),
		Some(Duration::seconds(5))
	);
}

#[tokio::test]
async fn json_only_chain_rejects_form_bodies() {
	let http_client = Arc::new(FakeHttpClient::new(Script::Respond {
		status: 200,
		body: "access_token=fake-token",
	}));
	let json_only: Arc<dyn TokenResponseDecoder> = Arc::new(JsonTokenDecoder);
	let provider: OwncloudProvider<FakeHttpClient, RecordingTransportErrorMapper> =
		OwncloudProvider::with_http_client(
			config(),
			http_client,
			Arc::new(RecordingTransportErrorMapper::default()),
		)
		.with_token_decoders(TokenDecoderChain::new([json_only]));
	let err = provider
		.redeem("https://proxy.example.com/cb", "fake-code")
		.await
		.expect_err("A JSON-only chain must not accept form bodies.");

	assert!(matches!(err, Error::Protocol(_)));
}
