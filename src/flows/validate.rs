// self
use crate::{
	_prelude::*,
	auth::SessionState,
	flows::OwncloudProvider,
	http::ProviderHttpClient,
	oauth::{self, TransportErrorMapper},
	obs::{self, Operation},
};

impl<C, M> OwncloudProvider<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Checks whether the session's access token is still accepted by the profile endpoint.
	///
	/// `Ok(false)` means the provider answered with a non-200 status; transport failures are
	/// returned as errors so callers can tell "rejected" from "unreachable".
	pub async fn validate_session(&self, session: &SessionState) -> Result<bool> {
		obs::observe(Operation::ValidateSession, "validate_session", async move {
			if session.access_token.is_empty() {
				return Err(Error::missing("access token"));
			}

			let request = oauth::bearer_get(&self.profile_url(), session.access_token.expose())?;
			let response = oauth::dispatch(
				self.http_client.as_ref(),
				self.transport_mapper.as_ref(),
				Operation::ValidateSession,
				request,
			)
			.await?;

			Ok(response.is_ok())
		})
		.await
	}
}
