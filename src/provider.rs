//! Vendor-facing descriptors (data) and strategies (behavior).
//!
//! `descriptor` exposes validated identity-provider metadata (`ProviderDescriptor`)
//! covering HTTPS-only endpoints, client authentication preferences, and the quirks
//! the consumer app sends along (deep-link method, user agent, SDK header).
//! `platform` describes the delivery platform's token and REST endpoints.
//! `strategy` defines [`ProviderStrategy`], an HTTP-client-agnostic hook used by flows
//! to augment outgoing forms and map failed responses into the crate error taxonomy.

pub mod descriptor;
pub mod platform;
pub mod strategy;

pub use descriptor::*;
pub use platform::*;
pub use strategy::*;
