//! Optional observability helpers for client flows.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `baemin.flow` with the `flow` (endpoint call)
//!   and `stage` (call site) fields, plus debug/error events describing endpoint responses.
//! - Enable `metrics` to increment the `baemin_flow_total` counter for every
//!   attempt/success/failure, labeled by `flow` + `outcome`, and to publish the
//!   `baemin_saved_addresses` gauge per loaded entry and address kind.

mod metrics;
mod tracing;

pub use metrics::*;
pub use tracing::*;

// self
use crate::_prelude::*;

/// Endpoint calls performed by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowKind {
	/// Authorization code + PKCE exchange at the identity provider.
	CodeExchange,
	/// Identity provider user info lookup.
	UserInfo,
	/// Identity token to platform token exchange.
	PlatformToken,
	/// Platform member login.
	MemberLogin,
	/// Saved address list lookup.
	Addresses,
}
impl FlowKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowKind::CodeExchange => "code_exchange",
			FlowKind::UserInfo => "user_info",
			FlowKind::PlatformToken => "platform_token",
			FlowKind::MemberLogin => "member_login",
			FlowKind::Addresses => "addresses",
		}
	}

	/// Returns `true` for calls against a token endpoint (as opposed to a resource endpoint).
	pub const fn is_token_exchange(self) -> bool {
		matches!(self, FlowKind::CodeExchange | FlowKind::PlatformToken)
	}
}
impl Display for FlowKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlowOutcome {
	/// Entry to a client helper.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FlowOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FlowOutcome::Attempt => "attempt",
			FlowOutcome::Success => "success",
			FlowOutcome::Failure => "failure",
		}
	}
}
impl Display for FlowOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}
