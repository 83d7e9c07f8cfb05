//! Settings resolution for the ownCloud provider.

// crates.io
use serde::Deserializer;
// self
use crate::{_prelude::*, auth::Secret, error::ConfigError, provider::IdentitySource};

/// Placeholder authorization endpoint used when none is configured.
pub const DEFAULT_LOGIN_URL: &str = "http://localhost/index.php/apps/oauth2/authorize";
/// Placeholder token endpoint used when none is configured.
pub const DEFAULT_REDEEM_URL: &str = "http://localhost/index.php/apps/oauth2/api/v1/token";
/// Placeholder profile endpoint used when none is configured.
pub const DEFAULT_VALIDATE_URL: &str = "http://localhost/ocs/v1.php/cloud/user";
/// Approval prompt sent on the authorize URL when none is configured.
pub const DEFAULT_APPROVAL_PROMPT: &str = "force";

/// Raw provider settings as supplied by the caller's configuration layer.
///
/// Every endpoint is optional. Empty strings in serialized input count as unset, so a
/// blank `redeem_url = ""` falls back to the placeholder like an omitted key.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
	/// Authorization endpoint the browser is sent to.
	#[serde(deserialize_with = "empty_url_as_none")]
	pub login_url: Option<Url>,
	/// Token endpoint used to redeem authorization codes.
	#[serde(deserialize_with = "empty_url_as_none")]
	pub redeem_url: Option<Url>,
	/// Profile endpoint used to resolve identities.
	#[serde(deserialize_with = "empty_url_as_none")]
	pub validate_url: Option<Url>,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: Secret,
	/// Optional `resource` parameter sent during redemption.
	#[serde(deserialize_with = "empty_url_as_none")]
	pub protected_resource: Option<Url>,
	/// Optional scope requested on the authorize URL.
	pub scope: Option<String>,
	/// Optional `approval_prompt` value for the authorize URL.
	pub approval_prompt: Option<String>,
	/// How identifiers are derived.
	pub identity_source: IdentitySource,
}
impl ProviderSettings {
	/// Creates settings carrying only client credentials.
	pub fn new(client_id: impl Into<String>, client_secret: impl Into<Secret>) -> Self {
		Self { client_id: client_id.into(), client_secret: client_secret.into(), ..Self::default() }
	}

	/// Sets the authorization endpoint.
	pub fn login_url(mut self, url: Url) -> Self {
		self.login_url = Some(url);

		self
	}

	/// Sets the token endpoint.
	pub fn redeem_url(mut self, url: Url) -> Self {
		self.redeem_url = Some(url);

		self
	}

	/// Sets the profile endpoint.
	pub fn validate_url(mut self, url: Url) -> Self {
		self.validate_url = Some(url);

		self
	}

	/// Sets the protected resource forwarded as `resource` during redemption.
	pub fn protected_resource(mut self, url: Url) -> Self {
		self.protected_resource = Some(url);

		self
	}

	/// Sets the scope requested on the authorize URL.
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = Some(scope.into());

		self
	}

	/// Overrides the `approval_prompt` value (defaults to `force`).
	pub fn approval_prompt(mut self, prompt: impl Into<String>) -> Self {
		self.approval_prompt = Some(prompt.into());

		self
	}

	/// Overrides how identifiers are derived.
	pub fn identity_source(mut self, source: IdentitySource) -> Self {
		self.identity_source = source;

		self
	}

	/// Resolves the settings into an effective [`ProviderConfig`].
	pub fn resolve(self) -> Result<ProviderConfig, ConfigError> {
		resolve_config(self)
	}
}

/// Effective, immutable provider configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderConfig {
	/// Authorization endpoint; its host also suffixes derived identifiers.
	pub login_url: Url,
	/// Token endpoint.
	pub redeem_url: Url,
	/// Profile endpoint.
	pub validate_url: Url,
	/// OAuth 2.0 client identifier.
	pub client_id: String,
	/// OAuth 2.0 client secret.
	pub client_secret: Secret,
	/// Optional `resource` parameter sent during redemption.
	pub protected_resource: Option<Url>,
	/// Optional scope requested on the authorize URL.
	pub scope: Option<String>,
	/// `approval_prompt` value for the authorize URL.
	pub approval_prompt: String,
	/// How identifiers are derived.
	pub identity_source: IdentitySource,
}
impl ProviderConfig {
	/// Lists endpoints that still point at the localhost placeholder.
	///
	/// Informational only; the adapter uses placeholders as-is.
	pub fn placeholder_endpoints(&self) -> Vec<&'static str> {
		[
			("login", &self.login_url, DEFAULT_LOGIN_URL),
			("redeem", &self.redeem_url, DEFAULT_REDEEM_URL),
			("validate", &self.validate_url, DEFAULT_VALIDATE_URL),
		]
		.into_iter()
		.filter(|(_, url, placeholder)| url.as_str() == *placeholder)
		.map(|(name, _, _)| name)
		.collect()
	}
}
impl TryFrom<ProviderSettings> for ProviderConfig {
	type Error = ConfigError;

	fn try_from(settings: ProviderSettings) -> Result<Self, Self::Error> {
		resolve_config(settings)
	}
}

/// Fills unset settings with ownCloud defaults and checks client credentials.
///
/// Pure: performs no I/O and never inspects whether placeholders were overridden.
pub fn resolve_config(settings: ProviderSettings) -> Result<ProviderConfig, ConfigError> {
	let ProviderSettings {
		login_url,
		redeem_url,
		validate_url,
		client_id,
		client_secret,
		protected_resource,
		scope,
		approval_prompt,
		identity_source,
	} = settings;

	if client_id.is_empty() {
		return Err(ConfigError::MissingClientId);
	}
	if client_secret.is_empty() {
		return Err(ConfigError::MissingClientSecret);
	}

	Ok(ProviderConfig {
		login_url: endpoint_or_default("login", login_url, DEFAULT_LOGIN_URL)?,
		redeem_url: endpoint_or_default("redeem", redeem_url, DEFAULT_REDEEM_URL)?,
		validate_url: endpoint_or_default("validate", validate_url, DEFAULT_VALIDATE_URL)?,
		client_id,
		client_secret,
		protected_resource,
		scope: scope.filter(|value| !value.is_empty()),
		approval_prompt: approval_prompt
			.filter(|value| !value.is_empty())
			.unwrap_or_else(|| DEFAULT_APPROVAL_PROMPT.to_owned()),
		identity_source,
	})
}

fn endpoint_or_default(
	endpoint: &'static str,
	configured: Option<Url>,
	placeholder: &str,
) -> Result<Url, ConfigError> {
	match configured {
		Some(url) => Ok(url),
		None => Url::parse(placeholder).map_err(|source| ConfigError::InvalidEndpoint { endpoint, source }),
	}
}

fn empty_url_as_none<'de, D>(deserializer: D) -> Result<Option<Url>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Option::<String>::deserialize(deserializer)?;

	match raw.as_deref().map(str::trim) {
		None | Some("") => Ok(None),
		Some(value) => Url::parse(value).map(Some).map_err(serde::de::Error::custom),
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	fn url(value: &str) -> Url {
		Url::parse(value).expect("Test URL should parse.")
	}

	#[test]
	fn unset_endpoints_fall_back_to_localhost_placeholders() {
		let config = ProviderSettings::new("client", "secret")
			.resolve()
			.expect("Credentials-only settings should resolve.");

		assert_eq!(config.login_url.as_str(), DEFAULT_LOGIN_URL);
		assert_eq!(config.redeem_url.as_str(), DEFAULT_REDEEM_URL);
		assert_eq!(config.validate_url.as_str(), DEFAULT_VALIDATE_URL);
		assert_eq!(config.approval_prompt, DEFAULT_APPROVAL_PROMPT);
		assert_eq!(config.identity_source, IdentitySource::Profile);
		assert!(config.protected_resource.is_none());
		assert!(config.scope.is_none());
		assert_eq!(config.placeholder_endpoints(), ["login", "redeem", "validate"]);
	}

	#[test]
	fn configured_endpoints_are_kept_independently() {
		let config = ProviderSettings::new("client", "secret")
			.validate_url(url("https://cloud.example.com/ocs/v1.php/cloud/user"))
			.protected_resource(url("https://files.example.com/"))
			.scope("profile")
			.resolve()
			.expect("Settings should resolve.");

		assert_eq!(config.login_url.as_str(), DEFAULT_LOGIN_URL);
		assert_eq!(config.redeem_url.as_str(), DEFAULT_REDEEM_URL);
		assert_eq!(config.validate_url.as_str(), "https://cloud.example.com/ocs/v1.php/cloud/user");
		assert_eq!(
			config.protected_resource.as_ref().map(Url::as_str),
			Some("https://files.example.com/")
		);
		assert_eq!(config.scope.as_deref(), Some("profile"));
		assert_eq!(config.placeholder_endpoints(), ["login", "redeem"]);
	}

	#[test]
	fn credentials_are_required() {
		let err = ProviderSettings::new("", "secret").resolve().expect_err("Empty id must fail.");

		assert!(matches!(err, ConfigError::MissingClientId));

		let err = ProviderSettings::new("client", "").resolve().expect_err("Empty secret must fail.");

		assert!(matches!(err, ConfigError::MissingClientSecret));
	}

	#[test]
	fn empty_strings_deserialize_as_unset() {
		let settings: ProviderSettings = serde_json::from_str(
			r#"{
				"login_url": "https://cloud.example.com/index.php/apps/oauth2/authorize",
				"redeem_url": "",
				"validate_url": "  ",
				"client_id": "client",
				"client_secret": "secret",
				"approval_prompt": "",
				"identity_source": "session_user"
			}"#,
		)
		.expect("Settings should deserialize.");
		let config = resolve_config(settings).expect("Settings should resolve.");

		assert_eq!(config.login_url.host_str(), Some("cloud.example.com"));
		assert_eq!(config.redeem_url.as_str(), DEFAULT_REDEEM_URL);
		assert_eq!(config.validate_url.as_str(), DEFAULT_VALIDATE_URL);
		assert_eq!(config.approval_prompt, DEFAULT_APPROVAL_PROMPT);
		assert_eq!(config.identity_source, IdentitySource::SessionUser);
		assert_eq!(config.client_secret.expose(), "secret");
	}

	#[test]
	fn malformed_urls_are_rejected_while_deserializing() {
		let err = serde_json::from_str::<ProviderSettings>(r#"{"login_url":"not a url"}"#)
			.expect_err("Invalid URLs should not deserialize.");

		assert!(err.is_data());
	}

	#[test]
	fn debug_output_redacts_client_secret() {
		let config = ProviderSettings::new("client", "hunter2")
			.resolve()
			.expect("Settings should resolve.");

		assert!(!format!("{config:?}").contains("hunter2"));
	}
}
