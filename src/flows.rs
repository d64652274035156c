//! The account client: authorization, token exchanges, and platform lookups.

pub mod auth_code_pkce;
pub mod common;
pub mod login;
pub mod platform;
pub mod user_info;

pub use auth_code_pkce::*;
pub use login::*;
pub use platform::*;
pub use user_info::*;

// self
use crate::{
	_prelude::*,
	error::ConfigError,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	provider::{PlatformDescriptor, ProviderDescriptor, ProviderStrategy},
};
#[cfg(feature = "reqwest")]
use crate::{
	http::ReqwestHttpClient,
	oauth::ReqwestTransportErrorMapper,
	provider::{DefaultProviderStrategy, KAKAO_CLIENT_ID, KAKAO_REDIRECT_URI},
};

#[cfg(feature = "reqwest")]
/// Client specialized for the crate's default reqwest transport stack.
pub type BaeminClient = Client<ReqwestHttpClient, ReqwestTransportErrorMapper>;

/// Talks to the identity provider and the delivery platform on behalf of one user.
///
/// The client owns the HTTP transport, both vendor descriptors, and the strategy used
/// to classify failures, so each flow only has to describe its own request. Calls are
/// issued one at a time; nothing is retried.
#[derive(Clone)]
pub struct Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// HTTP client wrapper used for every outbound request.
	pub http_client: Arc<C>,
	/// Mapper applied to transport-layer errors before surfacing them to callers.
	pub transport_mapper: Arc<M>,
	/// Identity provider descriptor (authorize, token, and user info endpoints).
	pub identity: ProviderDescriptor,
	/// Delivery platform descriptor (token, member login, and address endpoints).
	pub platform: PlatformDescriptor,
	/// Strategy responsible for vendor-specific form tweaks and error classification.
	pub strategy: Arc<dyn ProviderStrategy>,
	/// OAuth 2.0 client identifier registered with the identity provider.
	pub client_id: String,
	/// Optional client secret for confidential authentication methods.
	pub client_secret: Option<String>,
	/// Redirect URI registered with the identity provider.
	pub redirect_uri: Url,
}
impl<C, M> Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a client that reuses the caller-provided transport + mapper pair.
	///
	/// The redirect URI defaults to the identity descriptor's authorization endpoint until
	/// [`Client::with_redirect_uri`] replaces it.
	pub fn with_http_client(
		identity: ProviderDescriptor,
		platform: PlatformDescriptor,
		strategy: Arc<dyn ProviderStrategy>,
		client_id: impl Into<String>,
		http_client: impl Into<Arc<C>>,
		mapper: impl Into<Arc<M>>,
	) -> Self {
		let redirect_uri = identity.endpoints.authorization.clone();

		Self {
			http_client: http_client.into(),
			transport_mapper: mapper.into(),
			identity,
			platform,
			strategy,
			client_id: client_id.into(),
			client_secret: None,
			redirect_uri,
		}
	}

	/// Sets or replaces the client secret used for confidential client auth modes.
	pub fn with_client_secret(mut self, secret: impl Into<String>) -> Self {
		self.client_secret = Some(secret.into());

		self
	}

	/// Sets the redirect URI sent with the authorize URL and the code exchange.
	pub fn with_redirect_uri(mut self, redirect_uri: Url) -> Self {
		self.redirect_uri = redirect_uri;

		self
	}

	/// Replaces the provider strategy.
	pub fn with_strategy(mut self, strategy: Arc<dyn ProviderStrategy>) -> Self {
		self.strategy = strategy;

		self
	}
}
#[cfg(feature = "reqwest")]
impl Client<ReqwestHttpClient, ReqwestTransportErrorMapper> {
	/// Creates a client for the given descriptors backed by its own reqwest transport.
	pub fn new(
		identity: ProviderDescriptor,
		platform: PlatformDescriptor,
		client_id: impl Into<String>,
	) -> Result<Self> {
		Ok(Self::with_http_client(
			identity,
			platform,
			Arc::new(DefaultProviderStrategy),
			client_id,
			ReqwestHttpClient::new()?,
			Arc::new(ReqwestTransportErrorMapper),
		))
	}

	/// Creates a client preconfigured for Kakao login into Baemin, using the consumer app's
	/// registered client id and redirect URI.
	pub fn baemin() -> Result<Self> {
		let redirect_uri = Url::parse(KAKAO_REDIRECT_URI)
			.map_err(|source| ConfigError::InvalidRedirect { source })?;

		Ok(Self::new(
			ProviderDescriptor::kakao().map_err(ConfigError::from)?,
			PlatformDescriptor::baemin().map_err(ConfigError::from)?,
			KAKAO_CLIENT_ID,
		)?
		.with_redirect_uri(redirect_uri))
	}
}
impl<C, M> Debug for Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Client")
			.field("identity", &self.identity.id)
			.field("platform", &self.platform.id)
			.field("client_id", &self.client_id)
			.field("client_secret_set", &self.client_secret.is_some())
			.field("redirect_uri", &self.redirect_uri.as_str())
			.finish()
	}
}

#[cfg(all(test, feature = "reqwest"))]
mod tests {
	// self
	use super::*;
	use crate::provider::{ProviderErrorContext, ProviderErrorKind};

	#[test]
	fn baemin_client_uses_registered_app_identity() {
		let client = Client::baemin().expect("Preset client should build.");

		assert_eq!(client.client_id, KAKAO_CLIENT_ID);
		assert_eq!(client.redirect_uri.as_str(), KAKAO_REDIRECT_URI);
		assert_eq!(client.platform.id.as_ref(), "baemin");
	}

	#[test]
	fn debug_hides_client_secret() {
		let client =
			Client::baemin().expect("Preset client should build.").with_client_secret("hidden");
		let rendered = format!("{client:?}");

		assert!(rendered.contains("client_secret_set: true"));
		assert!(!rendered.contains("hidden"));
	}

	#[test]
	fn with_strategy_replaces_error_classification() {
		struct AlwaysInvalidGrant;
		impl ProviderStrategy for AlwaysInvalidGrant {
			fn classify_error(&self, _ctx: &ProviderErrorContext) -> ProviderErrorKind {
				ProviderErrorKind::InvalidGrant
			}
		}

		let client = Client::baemin()
			.expect("Preset client should build.")
			.with_strategy(Arc::new(AlwaysInvalidGrant));
		let ctx = ProviderErrorContext::new(crate::obs::FlowKind::Addresses).with_http_status(503);

		assert_eq!(client.strategy.classify_error(&ctx), ProviderErrorKind::InvalidGrant);
	}
}
