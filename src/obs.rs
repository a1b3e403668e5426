//! Optional observability helpers for provider requests.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit spans named `oauth2_keycloak.request` carrying the `operation`,
//!   `endpoint`, and `stage` fields, plus a debug event per outcome. Failure events also carry
//!   the error `kind` and the HTTP `status` when a response arrived.
//! - Enable `metrics` to increment the `oauth2_keycloak_request_total` counter for every
//!   attempt/success/failure, labeled by `operation`, `endpoint`, and `outcome`.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Network operations issued against the identity provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Operation {
	/// `grant_type=authorization_code` exchange.
	ExchangeCode,
	/// `grant_type=refresh_token` exchange.
	RefreshToken,
	/// Userinfo lookup with a bearer token.
	UserInfo,
	/// Token introspection.
	Introspection,
	/// Back-channel logout.
	Logout,
}
impl Operation {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			Operation::ExchangeCode => "exchange_code",
			Operation::RefreshToken => "refresh_token",
			Operation::UserInfo => "userinfo",
			Operation::Introspection => "introspection",
			Operation::Logout => "logout",
		}
	}

	/// Label of the endpoint the operation calls.
	pub const fn endpoint(self) -> &'static str {
		match self {
			Operation::ExchangeCode | Operation::RefreshToken => "token",
			Operation::UserInfo => "userinfo",
			Operation::Introspection => "introspection",
			Operation::Logout => "logout",
		}
	}
}
impl Display for Operation {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each request.
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

/// Runs `fut` inside an [`OperationSpan`] and records attempt plus final outcome.
pub(crate) async fn observe<T, Fut>(
	operation: Operation,
	stage: &'static str,
	fut: Fut,
) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	let span = OperationSpan::new(operation, stage);

	record_outcome(operation, Outcome::Attempt);

	let result = span.instrument(fut).await;

	match &result {
		Ok(_) => record_outcome(operation, Outcome::Success),
		Err(err) => {
			record_failure(operation, err);
			record_outcome(operation, Outcome::Failure);
		},
	}

	result
}
