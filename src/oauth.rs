//! Internal OAuth client facade over the `oauth2` crate.

pub use oauth2;

// std
use std::borrow::Cow;
// crates.io
use oauth2::{
	AuthType, AuthUrl, AuthorizationCode, ClientId, ClientSecret, EndpointNotSet, EndpointSet,
	HttpClientError, PkceCodeVerifier, RedirectUrl, RequestTokenError, TokenResponse, TokenUrl,
	basic::{BasicClient, BasicErrorResponse, BasicRequestTokenError},
};
// self
use crate::{
	_prelude::*,
	auth::{ProviderId, TokenRecord},
	error::{ConfigError, TransientError, TransportError},
	http::{ReqwestHttpClient, ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	obs::{self, FlowKind},
	provider::{
		ClientAuthMethod, ProviderDescriptor, ProviderErrorContext, ProviderErrorKind,
		ProviderStrategy,
	},
};

type ConfiguredBasicClient =
	BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;
type FacadeFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + 'a + Send>>;

/// Maps HTTP transport failures into crate [`Error`] values.
pub trait TransportErrorMapper<E>
where
	Self: 'static + Send + Sync,
	E: 'static + Send + Sync + StdError,
{
	/// Converts an [`HttpClientError`] emitted by the transport into a crate error.
	fn map_transport_error(
		&self,
		strategy: &dyn ProviderStrategy,
		flow: FlowKind,
		metadata: Option<&ResponseMetadata>,
		error: HttpClientError<E>,
	) -> Error;
}

/// Default mapper for reqwest-backed transports.
#[derive(Clone, Debug, Default)]
pub struct ReqwestTransportErrorMapper;
impl TransportErrorMapper<ReqwestError> for ReqwestTransportErrorMapper {
	fn map_transport_error(
		&self,
		strategy: &dyn ProviderStrategy,
		flow: FlowKind,
		meta: Option<&ResponseMetadata>,
		err: HttpClientError<ReqwestError>,
	) -> Error {
		match err {
			HttpClientError::Reqwest(inner) => map_reqwest_error(strategy, flow, meta, *inner),
			HttpClientError::Http(inner) => ConfigError::from(inner).into(),
			HttpClientError::Io(inner) => TransportError::Io(inner).into(),
			HttpClientError::Other(message) => map_generic_transport_error(flow, meta, message),
			_ => map_unknown_transport_error(flow, meta),
		}
	}
}

pub(crate) trait OAuth2Facade {
	fn exchange_authorization_code<'a, 'strategy, 'code, 'pkce, 'redirect>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		provider: ProviderId,
		code: &'code str,
		pkce_verifier: &'pkce str,
		redirect_uri: &'redirect Url,
	) -> FacadeFuture<'a, TokenRecord>
	where
		'strategy: 'a,
		'code: 'a,
		'pkce: 'a,
		'redirect: 'a;
}

pub(crate) struct BasicFacade<C = ReqwestHttpClient, M = ReqwestTransportErrorMapper>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	oauth_client: ConfiguredBasicClient,
	http_client: Arc<C>,
	error_mapper: Arc<M>,
}
impl<C, M> BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	pub(crate) fn from_descriptor(
		descriptor: &ProviderDescriptor,
		client_id: &str,
		client_secret: Option<&str>,
		http_client: impl Into<Arc<C>>,
		error_mapper: impl Into<Arc<M>>,
	) -> Result<Self> {
		let auth_url = AuthUrl::new(descriptor.endpoints.authorization.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let token_url = TokenUrl::new(descriptor.endpoints.token.to_string())
			.map_err(|source| ConfigError::InvalidDescriptor { source })?;
		let secret =
			if matches!(descriptor.preferred_client_auth_method, ClientAuthMethod::NoneWithPkce) {
				None
			} else {
				client_secret.map(|value| ClientSecret::new(value.to_owned()))
			};
		let mut oauth_client = BasicClient::new(ClientId::new(client_id.to_owned()))
			.set_auth_uri(auth_url)
			.set_token_uri(token_url);

		if let Some(secret) = secret {
			oauth_client = oauth_client.set_client_secret(secret);
		}
		if matches!(descriptor.preferred_client_auth_method, ClientAuthMethod::ClientSecretPost) {
			oauth_client = oauth_client.set_auth_type(AuthType::RequestBody);
		}

		Ok(Self { oauth_client, http_client: http_client.into(), error_mapper: error_mapper.into() })
	}
}
impl<C, M> OAuth2Facade for BasicFacade<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn exchange_authorization_code<'a, 'strategy, 'code, 'pkce, 'redirect>(
		&'a self,
		strategy: &'strategy dyn ProviderStrategy,
		provider: ProviderId,
		code: &'code str,
		pkce_verifier: &'pkce str,
		redirect_uri: &'redirect Url,
	) -> FacadeFuture<'a, TokenRecord>
	where
		'strategy: 'a,
		'code: 'a,
		'pkce: 'a,
		'redirect: 'a,
	{
		let meta = ResponseMetadataSlot::default();

		Box::pin(async move {
			let instrumented = self.http_client.with_metadata(meta.clone());
			let redirect_url = RedirectUrl::new(redirect_uri.to_string())
				.map_err(|source| ConfigError::InvalidRedirect { source })?;
			let request = self
				.oauth_client
				.exchange_code(AuthorizationCode::new(code.to_owned()))
				.set_pkce_verifier(PkceCodeVerifier::new(pkce_verifier.to_owned()))
				.set_redirect_uri(Cow::Owned(redirect_url));
			let response = request.request_async(&instrumented).await.map_err(|err| {
				map_request_error(strategy, meta.take(), err, self.error_mapper.as_ref())
			})?;
			let expires_in = response.expires_in().ok_or(ConfigError::MissingExpiresIn)?.as_secs();
			let expires_in =
				i64::try_from(expires_in).map_err(|_| ConfigError::ExpiresInOutOfRange)?;

			if expires_in <= 0 {
				return Err(ConfigError::NonPositiveExpiresIn.into());
			}

			let mut builder = TokenRecord::builder(provider)
				.access_token(response.access_token().secret().to_owned())
				.issued_at(OffsetDateTime::now_utc())
				.expires_in(Duration::seconds(expires_in));

			if let Some(scopes) = response.scopes() {
				builder = builder.scope(scopes.iter().map(|scope| scope.as_ref().to_owned()));
			}
			if let Some(refresh) = response.refresh_token() {
				builder = builder.refresh_token(refresh.secret().to_owned());
			}

			let record = builder.build().map_err(ConfigError::from)?;

			obs::trace_response(FlowKind::CodeExchange, 200, &record);

			Ok(record)
		})
	}
}

fn map_request_error<E, M>(
	strategy: &dyn ProviderStrategy,
	meta: Option<ResponseMetadata>,
	err: BasicRequestTokenError<HttpClientError<E>>,
	mapper: &M,
) -> Error
where
	E: 'static + Send + Sync + StdError,
	M: ?Sized + TransportErrorMapper<E>,
{
	const FLOW: FlowKind = FlowKind::CodeExchange;

	let meta_ref = meta.as_ref();

	match err {
		RequestTokenError::ServerResponse(response) =>
			map_server_response_error(strategy, response, meta_ref),
		RequestTokenError::Request(error) =>
			mapper.map_transport_error(strategy, FLOW, meta_ref, error),
		RequestTokenError::Parse(error, body) => {
			obs::trace_failure(FLOW, meta_status(meta_ref), Some(&String::from_utf8_lossy(&body)));

			TransientError::ResponseParse {
				endpoint: FLOW.as_str(),
				source: error,
				status: meta_status(meta_ref),
			}
			.into()
		},
		RequestTokenError::Other(message) => TransientError::Endpoint {
			endpoint: FLOW.as_str(),
			message,
			status: meta_status(meta_ref),
			retry_after: meta_retry_after(meta_ref),
		}
		.into(),
	}
}

fn map_server_response_error(
	strategy: &dyn ProviderStrategy,
	response: BasicErrorResponse,
	meta: Option<&ResponseMetadata>,
) -> Error {
	const FLOW: FlowKind = FlowKind::CodeExchange;

	let mut ctx =
		ProviderErrorContext::new(FLOW).with_oauth_error(response.error().as_ref().to_string());

	if let Some(description) = response.error_description() {
		ctx = ctx.with_error_description(description.clone());
	}
	if let Some(status) = meta_status(meta) {
		ctx = ctx.with_http_status(status);
	}

	obs::trace_failure(FLOW, ctx.http_status, ctx.error_description.as_deref());

	let message = if let Some(description) = response.error_description() {
		format!("token endpoint returned an OAuth error: {description}")
	} else {
		format!("token endpoint returned an OAuth error: {}", response.error().as_ref())
	};

	classified_error(strategy.classify_error(&ctx), FLOW, message, meta)
}

/// Turns a strategy classification into the matching crate error.
pub(crate) fn classified_error(
	kind: ProviderErrorKind,
	flow: FlowKind,
	message: String,
	meta: Option<&ResponseMetadata>,
) -> Error {
	match kind {
		ProviderErrorKind::InvalidGrant => Error::InvalidGrant { reason: message },
		ProviderErrorKind::InvalidClient => Error::InvalidClient { reason: message },
		ProviderErrorKind::Unauthorized => Error::Unauthorized { reason: message },
		ProviderErrorKind::Transient => TransientError::Endpoint {
			endpoint: flow.as_str(),
			message,
			status: meta_status(meta),
			retry_after: meta_retry_after(meta),
		}
		.into(),
	}
}

fn map_reqwest_error(
	strategy: &dyn ProviderStrategy,
	flow: FlowKind,
	meta: Option<&ResponseMetadata>,
	err: ReqwestError,
) -> Error {
	// Strategy reserved for vendor-specific transport classification.
	let _ = strategy;

	if err.is_builder() {
		return ConfigError::from(err).into();
	}
	if err.is_timeout() {
		return TransientError::Endpoint {
			endpoint: flow.as_str(),
			message: "request timed out".into(),
			status: meta_status(meta).or_else(|| reqwest_status(&err)),
			retry_after: meta_retry_after(meta),
		}
		.into();
	}
	TransportError::network(flow.as_str(), err).into()
}

fn map_generic_transport_error(
	flow: FlowKind,
	meta: Option<&ResponseMetadata>,
	message: impl Display,
) -> Error {
	TransientError::Endpoint {
		endpoint: flow.as_str(),
		message: format!("HTTP client error: {message}"),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

fn map_unknown_transport_error(flow: FlowKind, meta: Option<&ResponseMetadata>) -> Error {
	TransientError::Endpoint {
		endpoint: flow.as_str(),
		message: "unknown HTTP client error".into(),
		status: meta_status(meta),
		retry_after: meta_retry_after(meta),
	}
	.into()
}

pub(crate) fn meta_status(meta: Option<&ResponseMetadata>) -> Option<u16> {
	meta.and_then(|value| value.status)
}

pub(crate) fn meta_retry_after(meta: Option<&ResponseMetadata>) -> Option<Duration> {
	meta.and_then(|value| value.retry_after)
}

fn reqwest_status(err: &ReqwestError) -> Option<u16> {
	err.status().map(|code| code.as_u16())
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::provider::DefaultProviderStrategy;

	fn descriptor(method: ClientAuthMethod) -> ProviderDescriptor {
		ProviderDescriptor::builder(
			ProviderId::new("test-provider").expect("Failed to construct provider identifier."),
		)
		.authorization_endpoint(
			Url::parse("https://example.com/oauth/authorize")
				.expect("Failed to parse authorization endpoint URL."),
		)
		.token_endpoint(
			Url::parse("https://example.com/oauth/token").expect("Failed to parse token URL."),
		)
		.user_info_endpoint(
			Url::parse("https://example.com/v2/user/me").expect("Failed to parse user info URL."),
		)
		.preferred_client_auth_method(method)
		.build()
		.expect("Failed to build provider descriptor.")
	}

	fn http_client() -> ReqwestHttpClient {
		ReqwestHttpClient::new().expect("Default reqwest client should build.")
	}

	#[test]
	fn builds_clients_for_every_auth_method() {
		for (method, secret) in [
			(ClientAuthMethod::ClientSecretBasic, Some("secret")),
			(ClientAuthMethod::ClientSecretPost, Some("secret")),
			(ClientAuthMethod::NoneWithPkce, Some("ignored-secret")),
			(ClientAuthMethod::NoneWithPkce, None),
		] {
			let result =
				<BasicFacade<ReqwestHttpClient, ReqwestTransportErrorMapper>>::from_descriptor(
					&descriptor(method),
					"client-id",
					secret,
					Arc::new(http_client()),
					Arc::new(ReqwestTransportErrorMapper),
				);

			assert!(result.is_ok(), "Facade should build for {method:?}.");
		}
	}

	#[test]
	fn classified_errors_map_to_matching_variants() {
		let meta = ResponseMetadata { status: Some(503), retry_after: Some(Duration::seconds(9)) };

		assert!(matches!(
			classified_error(ProviderErrorKind::Unauthorized, FlowKind::Addresses, "x".into(), None),
			Error::Unauthorized { .. }
		));
		assert!(matches!(
			classified_error(
				ProviderErrorKind::Transient,
				FlowKind::Addresses,
				"x".into(),
				Some(&meta)
			),
			Error::Transient(TransientError::Endpoint {
				endpoint: "addresses",
				status: Some(503),
				..
			})
		));
	}

	#[test]
	fn server_errors_are_classified_through_the_strategy() {
		let response: BasicErrorResponse = serde_json::from_str(
			"{\"error\":\"invalid_grant\",\"error_description\":\"authorization code not found\",\"error_code\":\"KOE320\"}",
		)
		.expect("Kakao error payload should deserialize.");
		let meta = ResponseMetadata { status: Some(400), retry_after: None };
		let err = map_server_response_error(&DefaultProviderStrategy, response, Some(&meta));

		assert!(matches!(err, Error::InvalidGrant { ref reason } if reason.contains("authorization code not found")));
	}
}
