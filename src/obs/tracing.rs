// self
use crate::{_prelude::*, obs::Operation};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedOperation<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedOperation<F> = F;

/// Span wrapping a single provider request.
#[derive(Clone, Debug)]
pub struct OperationSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl OperationSpan {
	/// Creates a new span tagged with the provided operation + stage.
	pub fn new(operation: Operation, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!(
				"oauth2_keycloak.request",
				operation = operation.as_str(),
				endpoint = operation.endpoint(),
				stage
			);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (operation, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedOperation<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}

/// Emits a debug event describing a failed operation (when tracing is enabled).
///
/// The event carries the error family and, when a response arrived, its HTTP status.
pub fn record_failure(operation: Operation, error: &Error) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(
			operation = operation.as_str(),
			endpoint = operation.endpoint(),
			kind = error.kind(),
			status = error.status(),
			error = %error,
			"provider request failed"
		);
	}

	#[cfg(not(feature = "tracing"))]
	{
		let _ = (operation, error);
	}
}
