//! OCS profile payload returned by `GET <validate_url>?format=json`.

// self
use crate::_prelude::*;

/// Profile response envelope.
///
/// Only `ocs.data.id` gates identity resolution; the rest is decoded for callers that want
/// it and otherwise ignored. Missing or `null` fields decode as `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileResponse {
	/// OCS envelope.
	pub ocs: OcsEnvelope,
}
impl ProfileResponse {
	/// Returns the provider-assigned account id when present and non-empty.
	pub fn id(&self) -> Option<&str> {
		self.ocs.data.id.as_deref().filter(|id| !id.is_empty())
	}
}

/// Metadata plus payload, as OCS wraps every response.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcsEnvelope {
	/// Response metadata.
	pub meta: OcsMeta,
	/// Account payload.
	pub data: ProfileData,
}

/// OCS response metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OcsMeta {
	/// Textual status such as `ok`.
	pub status: Option<String>,
	/// Numeric OCS status code.
	#[serde(rename = "statuscode")]
	pub status_code: Option<i64>,
	/// Human-readable message.
	pub message: Option<String>,
}

/// Account payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileData {
	/// Provider-assigned account id.
	pub id: Option<String>,
	/// Display name.
	#[serde(rename = "display-name")]
	pub display_name: Option<String>,
	/// Email address, if the account has one.
	pub email: Option<String>,
}
