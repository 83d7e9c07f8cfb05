//! Authorization code redemption.

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
	/// Exchanges an authorization code for an access token.
	///
	/// Sends one form-encoded `POST` to the token endpoint with the client credentials in
	/// both the body and a Basic `Authorization` header. A 200 body is handed to the decoder
	/// chain (JSON, then form-encoded by default); any other status fails with
	/// [`UpstreamError`](crate::error::UpstreamError) and is never retried.
	pub async fn redeem(&self, redirect_url: &str, code: &str) -> Result<SessionState> {
		obs::observe(Operation::Redeem, "redeem", async move {
			if code.is_empty() {
				return Err(Error::missing("code"));
			}

			let form = self.redeem_form(redirect_url, code);
			let request = oauth::form_post(
				&self.config.redeem_url,
				&form,
				&self.config.client_id,
				self.config.client_secret.expose(),
			)?;
			let response = oauth::dispatch(
				self.http_client.as_ref(),
				self.transport_mapper.as_ref(),
				Operation::Redeem,
				request,
			)
			.await?;

			if !response.is_ok() {
				return Err(response.into_upstream_error(&self.config.redeem_url).into());
			}

			let access_token = self.decoders.decode(&response.body)?;

			Ok(SessionState::new(access_token))
		})
		.await
	}

	pub(crate) fn redeem_form(&self, redirect_url: &str, code: &str) -> BTreeMap<String, String> {
		let mut form = BTreeMap::new();

		form.insert("redirect_uri".into(), redirect_url.into());
		form.insert("client_id".into(), self.config.client_id.clone());
		form.insert("client_secret".into(), self.config.client_secret.expose().into());
		form.insert("code".into(), code.into());
		form.insert("grant_type".into(), "authorization_code".into());

		if let Some(resource) = &self.config.protected_resource {
			form.insert("resource".into(), resource.to_string());
		}

		form
	}
}
