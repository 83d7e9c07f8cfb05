//! Optional observability helpers for provider operations.
//!
//! Nothing is emitted unless a feature is enabled; the default build stays silent and
//! leaves logging to the caller.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to run each operation inside a span named `owncloud_oauth2.operation`
//!   with the `operation` and `stage` (call site) fields.
//! - Enable `metrics` to increment the `owncloud_oauth2_operation_total` counter for every
//!   attempt/success/failure, labeled by `operation` + `outcome`.

// self
use crate::_prelude::*;

/// Provider operations observed by the adapter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// Authorization code redemption against the token endpoint.
	Redeem,
	/// Identifier lookup against the profile endpoint.
	ResolveIdentity,
	/// Access token check against the profile endpoint.
	ValidateSession,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::Redeem => "redeem",
			Operation::ResolveIdentity => "resolve_identity",
			Operation::ValidateSession => "validate_session",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
	/// Entry to an operation.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl Outcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Outcome::Attempt => "attempt",
			Outcome::Success => "success",
			Outcome::Failure => "failure",
		}
	}
}
impl Display for Outcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fut` inside an operation span and records attempt plus final outcome.
pub(crate) async fn observe<T, Fut>(operation: Operation, stage: &'static str, fut: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	count(operation, Outcome::Attempt);

	#[cfg(feature = "tracing")]
	let result = {
		use tracing::Instrument;

		fut.instrument(tracing::info_span!(
			"owncloud_oauth2.operation",
			operation = operation.as_str(),
			stage
		))
		.await
	};
	#[cfg(not(feature = "tracing"))]
	let result = {
		let _ = stage;

		fut.await
	};

	count(operation, if result.is_ok() { Outcome::Success } else { Outcome::Failure });

	result
}

fn count(operation: Operation, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"owncloud_oauth2_operation_total",
			"operation" => operation.as_str(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}
	#[cfg(not(feature = "metrics"))]
	{
		let _ = (operation, outcome);
	}
}
