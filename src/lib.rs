//! Link a Baemin consumer account through Kakao login (OAuth 2.0 authorization code + PKCE),
//! trade the Kakao token for a Baemin token, and surface the saved delivery addresses as
//! read-only sensor entities.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod address;
pub mod auth;
pub mod device;
pub mod error;
pub mod flows;
pub mod http;
pub mod integration;
pub mod oauth;
pub mod obs;
pub mod provider;
pub mod sensor;
pub mod setup;
pub mod store;
#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		auth::ProviderId,
		flows::Client,
		http::ReqwestHttpClient,
		oauth::ReqwestTransportErrorMapper,
		provider::{
			ClientAuthMethod, DefaultProviderStrategy, PlatformDescriptor, ProviderDescriptor,
			ProviderStrategy,
		},
	};

	/// Client type alias used by reqwest-backed integration tests.
	pub type ReqwestTestClient = Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

	/// Builds a reqwest HTTP client that accepts the self-signed certificates produced by
	/// `httpmock` during tests.
	pub fn test_reqwest_http_client() -> ReqwestHttpClient {
		let client = ReqwestClient::builder()
			.danger_accept_invalid_certs(true)
			.danger_accept_invalid_hostnames(true)
			.redirect(reqwest::redirect::Policy::none())
			.build()
			.expect("Failed to build insecure Reqwest client for tests.");

		ReqwestHttpClient::with_client(client)
	}

	/// Identity provider descriptor whose endpoints live on the provided mock base URL.
	pub fn mock_identity_descriptor(base: &str) -> ProviderDescriptor {
		let url = |path: &str| {
			Url::parse(&format!("{base}{path}")).expect("Mock identity endpoint should parse.")
		};

		ProviderDescriptor::builder(
			ProviderId::new("mock-kakao").expect("Mock identity provider id should be valid."),
		)
		.authorization_endpoint(url("/oauth/authorize"))
		.token_endpoint(url("/oauth/token"))
		.user_info_endpoint(url("/v2/user/me?secure_resource=true"))
		.preferred_client_auth_method(ClientAuthMethod::NoneWithPkce)
		.deep_link_method("universal_link")
		.build()
		.expect("Mock identity descriptor should build.")
	}

	/// Platform descriptor whose endpoints live on the provided mock base URL.
	pub fn mock_platform_descriptor(base: &str) -> PlatformDescriptor {
		let url = |path: &str| {
			Url::parse(&format!("{base}{path}")).expect("Mock platform endpoint should parse.")
		};

		PlatformDescriptor::builder(
			ProviderId::new("mock-baemin").expect("Mock platform id should be valid."),
		)
		.token_endpoint(url("/platform/oauth/token"))
		.member_login_endpoint(url("/mem2/login"))
		.addresses_endpoint(url("/v1/addresses"))
		.build()
		.expect("Mock platform descriptor should build.")
	}

	/// Constructs a [`Client`] that talks to mock servers for both vendors through the
	/// reqwest transport used across integration tests.
	pub fn build_reqwest_test_client(
		identity: ProviderDescriptor,
		platform: PlatformDescriptor,
		client_id: &str,
	) -> ReqwestTestClient {
		let strategy: Arc<dyn ProviderStrategy> = Arc::new(DefaultProviderStrategy);
		let redirect = Url::parse("https://app.example.com/oauth")
			.expect("Test redirect URI should parse successfully.");

		Client::with_http_client(
			identity,
			platform,
			strategy,
			client_id,
			test_reqwest_http_client(),
			Arc::new(ReqwestTransportErrorMapper),
		)
		.with_redirect_uri(redirect)
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, BTreeSet, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		str::FromStr,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	pub use parking_lot::{Mutex, RwLock};
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize, de::DeserializeOwned};
	pub use thiserror::Error as ThisError;
	pub use time::{Duration, OffsetDateTime};
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
#[cfg(feature = "cli")]
use {clap as _, color_eyre as _, tokio as _, tracing_subscriber as _};
