//! The ownCloud provider adapter and its operations.
//!
//! One [`OwncloudProvider`] serves one OAuth2/profile-endpoint pairing. A login runs
//! `redeem` then `get_email_address` (or both via `authenticate`); each call is independent
//! and performs at most one outbound request.

mod identity;
mod login;
mod redeem;
mod validate;

// self
use crate::{
	_prelude::*,
	http::ProviderHttpClient,
	oauth::TransportErrorMapper,
	provider::{HostSuffixFormatter, IdentifierFormatter, ProviderConfig, TokenDecoderChain},
};
#[cfg(feature = "reqwest")]
use crate::{http::ReqwestHttpClient, oauth::ReqwestTransportErrorMapper};

#[cfg(feature = "reqwest")]
/// Provider specialized for the crate's default reqwest transport stack.
pub type ReqwestOwncloudProvider = OwncloudProvider<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Display name reported by [`OwncloudProvider::name`].
pub const PROVIDER_NAME: &str = "Owncloud";

/// Redeems authorization codes and resolves identities against one ownCloud instance.
///
/// The adapter owns the resolved configuration, the transport, and the pluggable decoding
/// and formatting hooks. It holds no mutable state, so clones share everything and
/// concurrent logins never interfere.
pub struct OwncloudProvider<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound provider request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Effective provider configuration.
	pub config: ProviderConfig,
	/// Strategy deriving identifiers from account ids.
	pub formatter: Arc<dyn IdentifierFormatter>,
	/// Ordered decoders for token endpoint bodies.
	pub decoders: TokenDecoderChain,
}
impl<C, M> OwncloudProvider<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a provider that reuses the caller-provided transport + mapper pair.
	pub fn with_http_client(
		config: ProviderConfig,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			config,
			formatter: Arc::new(HostSuffixFormatter),
			decoders: TokenDecoderChain::default(),
		}
	}

	/// Replaces the identifier formatter.
	pub fn with_identifier_formatter(
		mut self,
		formatter: impl 'static + IdentifierFormatter,
	) -> Self {
		self.formatter = Arc::new(formatter);

		self
	}

	/// Replaces the token response decoder chain.
	pub fn with_token_decoders(mut self, decoders: TokenDecoderChain) -> Self {
		self.decoders = decoders;

		self
	}

	/// Provider display name.
	pub fn name(&self) -> &'static str {
		PROVIDER_NAME
	}
}
#[cfg(feature = "reqwest")]
impl OwncloudProvider<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a provider backed by a default reqwest client.
	///
	/// Use [`OwncloudProvider::with_http_client`] to supply a client with timeouts or custom
	/// TLS settings.
	pub fn new(config: ProviderConfig) -> Self {
		Self::with_http_client(
			config,
			ReqwestHttpClient::default(),
			Arc::new(ReqwestTransportErrorMapper),
		)
	}
}
impl<C, M> Clone for OwncloudProvider<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn clone(&self) -> Self {
		Self {
			http_client: Arc::clone(&self.http_client),
			transport_mapper: Arc::clone(&self.transport_mapper),
			config: self.config.clone(),
			formatter: Arc::clone(&self.formatter),
			decoders: self.decoders.clone(),
		}
	}
}
impl<C, M> Debug for OwncloudProvider<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("OwncloudProvider")
			.field("config", &self.config)
			.field("decoders", &self.decoders)
			.finish()
	}
}
