// self
use crate::{
	_prelude::*, flows::OwncloudProvider, http::ProviderHttpClient, oauth::TransportErrorMapper,
};

const OVERRIDDEN_PARAMS: [&str; 6] =
	["redirect_uri", "approval_prompt", "scope", "client_id", "response_type", "state"];

impl<C, M> OwncloudProvider<C, M>
where
	C: ?Sized + ProviderHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Builds the authorize URL the proxy redirects the browser to.
	///
	/// Query pairs already present on the login URL survive unless the adapter sets the
	/// same key. `state` is the caller's opaque nonce, echoed back on the redirect.
	pub fn login_url(&self, redirect_uri: &str, state: &str) -> Url {
		let mut url = self.config.login_url.clone();
		let kept: Vec<(String, String)> = url
			.query_pairs()
			.filter(|(key, _)| !OVERRIDDEN_PARAMS.iter().any(|param| key == param))
			.map(|(key, value)| (key.into_owned(), value.into_owned()))
			.collect();

		url.set_query(None);

		let mut pairs = url.query_pairs_mut();

		pairs.extend_pairs(kept);
		pairs.append_pair("redirect_uri", redirect_uri);
		pairs.append_pair("approval_prompt", &self.config.approval_prompt);

		if let Some(scope) = &self.config.scope {
			pairs.append_pair("scope", scope);
		}

		pairs.append_pair("client_id", &self.config.client_id);
		pairs.append_pair("response_type", "code");
		pairs.append_pair("state", state);

		drop(pairs);

		url
	}
}
