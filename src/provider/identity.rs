//! Identifier derivation.

// self
use crate::{_prelude::*, error::ProtocolError};

/// Where the adapter takes the account id from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentitySource {
	/// Look the id up on the profile endpoint with the session's access token.
	#[default]
	Profile,
	/// Trust [`SessionState::user`](crate::auth::SessionState::user) without any network call.
	///
	/// Lower assurance: the caller vouches for the user name.
	SessionUser,
}

/// Turns a provider-assigned account id into the identifier sessions are keyed by.
pub trait IdentifierFormatter
where
	Self: Send + Sync,
{
	/// Formats `id` for an account managed behind `login_url`.
	fn format(&self, id: &str, login_url: &Url) -> Result<String, ProtocolError>;
}

/// Default formatter producing `<id>@<host>` from the login endpoint.
///
/// Non-default ports are kept (`u1@cloud.example.com:8443`) so two instances on one host
/// stay distinguishable.
#[derive(Clone, Copy, Debug, Default)]
pub struct HostSuffixFormatter;
impl IdentifierFormatter for HostSuffixFormatter {
	fn format(&self, id: &str, login_url: &Url) -> Result<String, ProtocolError> {
		let host = login_url
			.host_str()
			.ok_or_else(|| ProtocolError::MissingLoginHost { url: login_url.to_string() })?;

		Ok(match login_url.port() {
			Some(port) => format!("{id}@{host}:{port}"),
			None => format!("{id}@{host}"),
		})
	}
}
