//! Identity resolution against the OCS profile endpoint.

// self
use crate::{
	_prelude::*,
	auth::SessionState,
	error::ProtocolError,
	flows::OwncloudProvider,
	http::ProviderHttpClient,
	oauth::{self, TransportErrorMapper},
	obs::{self, Operation},
	provider::{IdentitySource, ProfileResponse},
};

impl<C, M> OwncloudProvider<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Resolves the session's access token into `"<id>@<login host>"`.
	///
	/// Sends one bearer-authorized `GET <validate_url>?format=json` and reads `ocs.data.id`.
	/// In [`IdentitySource::SessionUser`] mode the caller-supplied user name is formatted
	/// instead and nothing is sent.
	pub async fn get_email_address(&self, session: &SessionState) -> Result<String> {
		obs::observe(Operation::ResolveIdentity, "get_email_address", async move {
			let id = match self.config.identity_source {
				IdentitySource::Profile =>
					self.fetch_profile(session).await?.id().map(str::to_owned),
				IdentitySource::SessionUser => Some(
					session
						.user
						.clone()
						.filter(|user| !user.is_empty())
						.ok_or_else(|| Error::missing("user"))?,
				),
			}
			.ok_or(ProtocolError::MissingProfileId)?;

			self.formatter.format(&id, &self.config.login_url).map_err(Error::from)
		})
		.await
	}

	/// Redeems `code` and resolves the identity in one call.
	///
	/// Returns the session enriched with its identifier. A failure at either step discards
	/// the partial session.
	pub async fn authenticate(&self, redirect_url: &str, code: &str) -> Result<SessionState> {
		let session = self.redeem(redirect_url, code).await?;
		let identifier = self.get_email_address(&session).await?;

		Ok(session.with_identifier(identifier))
	}

	/// Fetches and decodes the profile for the session's access token.
	pub async fn fetch_profile(&self, session: &SessionState) -> Result<ProfileResponse> {
		if session.access_token.is_empty() {
			return Err(Error::missing("access token"));
		}

		let url = self.profile_url();
		let request = oauth::bearer_get(&url, session.access_token.expose())?;
		let response = oauth::dispatch(
			self.http_client.as_ref(),
			self.transport_mapper.as_ref(),
			Operation::ResolveIdentity,
			request,
		)
		.await?;

		if !response.is_ok() {
			return Err(response.into_upstream_error(&url).into());
		}

		let deserializer = &mut serde_json::Deserializer::from_slice(&response.body);

		serde_path_to_error::deserialize(deserializer)
			.map_err(|source| ProtocolError::ProfileParse { source }.into())
	}

	pub(crate) fn profile_url(&self) -> Url {
		let mut url = self.config.validate_url.clone();

		url.query_pairs_mut().append_pair("format", "json");

		url
	}
}
