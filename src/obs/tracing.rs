// self
use crate::{_prelude::*, obs::FlowKind};

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFlow<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFlow<F> = F;

/// A span builder used by client flows.
#[derive(Clone, Debug)]
pub struct FlowSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FlowSpan {
	/// Creates a new span tagged with the provided flow kind + stage.
	pub fn new(kind: FlowKind, stage: &'static str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("baemin.flow", flow = kind.as_str(), stage);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = (kind, stage);

			Self {}
		}
	}

	/// Instruments an async block without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFlow<Fut>
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

/// Emits a debug event for a successful endpoint response.
pub fn trace_response(kind: FlowKind, status: u16, summary: &dyn Debug) {
	#[cfg(feature = "tracing")]
	{
		tracing::debug!(flow = kind.as_str(), status, response = ?summary, "endpoint responded");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, status, summary);
	}
}

/// Emits an error event for a rejected endpoint call, including a body preview.
pub fn trace_failure(kind: FlowKind, status: Option<u16>, body_preview: Option<&str>) {
	#[cfg(feature = "tracing")]
	{
		tracing::error!(flow = kind.as_str(), status, body = body_preview, "endpoint call failed");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (kind, status, body_preview);
	}
}

/// Emits a warning event for recoverable irregularities (duplicate titles, stale tokens).
pub fn trace_warning(message: &str) {
	#[cfg(feature = "tracing")]
	{
		tracing::warn!("{message}");
	}
	#[cfg(not(feature = "tracing"))]
	{
		let _ = message;
	}
}
