//! Per-login session state handed back to the proxy.

// self
use crate::{_prelude::*, auth::Secret};

/// Ephemeral result of one login attempt.
///
/// Created by [`redeem`](crate::flows::OwncloudProvider::redeem) and enriched with the
/// resolved identifier by [`authenticate`](crate::flows::OwncloudProvider::authenticate).
/// The proxy owns it for the lifetime of a single login transaction.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
	/// Opaque bearer credential issued by the token endpoint.
	pub access_token: Secret,
	/// Caller-supplied user name, consulted only by the trusted-user identity mode.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub user: Option<String>,
	/// Email-shaped identifier derived after identity resolution.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub identifier: Option<String>,
}
impl SessionState {
	/// Creates a session holding only an access token.
	pub fn new(access_token: impl Into<Secret>) -> Self {
		Self { access_token: access_token.into(), user: None, identifier: None }
	}

	/// Attaches a caller-supplied user name.
	pub fn with_user(mut self, user: impl Into<String>) -> Self {
		self.user = Some(user.into());

		self
	}

	/// Attaches the resolved identifier.
	pub fn with_identifier(mut self, identifier: impl Into<String>) -> Self {
		self.identifier = Some(identifier.into());

		self
	}

	/// Returns the resolved identifier, if any.
	pub fn identifier(&self) -> Option<&str> {
		self.identifier.as_deref()
	}
}
