// self
use crate::obs::{Operation, Outcome};

/// Records a request outcome via the global metrics recorder and a `tracing` debug event
/// (each when its feature is enabled).
pub fn record_outcome(operation: Operation, outcome: Outcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!(
			"oauth2_keycloak_request_total",
			"operation" => operation.as_str(),
			"endpoint" => operation.endpoint(),
			"outcome" => outcome.as_str()
		)
		.increment(1);
	}

	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			operation = operation.as_str(),
			endpoint = operation.endpoint(),
			outcome = outcome.as_str(),
			"provider request outcome"
		);
	}

	#[cfg(not(any(feature = "metrics", feature = "tracing")))]
	{
		let _ = (operation, outcome);
	}
}
