//! Shared helpers for flow implementations (request assembly, response decoding, error
//! classification).

// crates.io
use oauth2::{
	AsyncHttpClient, HttpRequest,
	http::{
		HeaderValue, Method, Request,
		header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
		request::Builder,
	},
};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, TransientError},
	flows::Client,
	http::{ResponseMetadata, ResponseMetadataSlot, TokenHttpClient},
	oauth::{self, TransportErrorMapper},
	obs::{self, FlowKind},
	provider::ProviderErrorContext,
};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=utf-8";

/// Successful response captured by [`execute`].
#[derive(Debug)]
pub(crate) struct RawResponse {
	pub(crate) status: u16,
	pub(crate) body: Vec<u8>,
}
impl RawResponse {
	/// Decodes the body, reporting the JSON path of the first mismatch.
	pub(crate) fn json<T>(&self, flow: FlowKind) -> Result<T>
	where
		T: DeserializeOwned,
	{
		let mut de = serde_json::Deserializer::from_slice(&self.body);

		serde_path_to_error::deserialize(&mut de).map_err(|source| {
			obs::trace_failure(flow, Some(self.status), Some(&String::from_utf8_lossy(&self.body)));

			TransientError::ResponseParse {
				endpoint: flow.as_str(),
				source,
				status: Some(self.status),
			}
			.into()
		})
	}
}

/// Vendor error envelope. Kakao REST errors use `code`/`msg`, OAuth errors use
/// `error`/`error_description`, and the platform uses `status`/`message`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorEnvelope {
	error: Option<String>,
	error_description: Option<String>,
	code: Option<serde_json::Value>,
	msg: Option<String>,
	message: Option<String>,
}
impl ErrorEnvelope {
	fn code(&self) -> Option<String> {
		self.error.clone().or_else(|| match &self.code {
			Some(serde_json::Value::String(code)) => Some(code.clone()),
			Some(serde_json::Value::Number(code)) => Some(code.to_string()),
			_ => None,
		})
	}

	fn description(&self) -> Option<String> {
		self.error_description.clone().or_else(|| self.msg.clone()).or_else(|| self.message.clone())
	}
}

/// Starts a request builder carrying the headers every vendor call shares.
pub(crate) fn request(method: Method, url: &Url, user_agent: &str) -> Builder {
	Request::builder()
		.method(method)
		.uri(url.as_str())
		.header(USER_AGENT, user_agent)
		.header(ACCEPT, "*/*")
}

/// Adds a bearer `Authorization` header.
pub(crate) fn bearer(builder: Builder, token: &str) -> Result<Builder> {
	let value = HeaderValue::try_from(format!("Bearer {token}"))
		.map_err(|err| ConfigError::from(oauth2::http::Error::from(err)))?;

	Ok(builder.header(AUTHORIZATION, value))
}

/// Finishes a request with a form-encoded body.
pub(crate) fn form(builder: Builder, form: &BTreeMap<String, String>) -> Result<HttpRequest> {
	let body =
		url::form_urlencoded::Serializer::new(String::new()).extend_pairs(form).finish().into_bytes();

	Ok(builder.header(CONTENT_TYPE, FORM_CONTENT_TYPE).body(body).map_err(ConfigError::from)?)
}

/// Finishes a request without a body.
pub(crate) fn empty(builder: Builder) -> Result<HttpRequest> {
	Ok(builder.body(Vec::new()).map_err(ConfigError::from)?)
}

/// Sends `request` through the client's transport.
///
/// Non-2xx responses are classified through the client's
/// [`ProviderStrategy`](crate::provider::ProviderStrategy); transport failures go through
/// its mapper.
pub(crate) async fn execute<C, M>(
	client: &Client<C, M>,
	flow: FlowKind,
	request: HttpRequest,
) -> Result<RawResponse>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let slot = ResponseMetadataSlot::default();
	let handle = client.http_client.with_metadata(slot.clone());
	let response = handle.call(request).await.map_err(|err| {
		let meta = slot.take();

		client.transport_mapper.map_transport_error(
			client.strategy.as_ref(),
			flow,
			meta.as_ref(),
			err,
		)
	})?;
	let status = response.status().as_u16();
	let meta = slot.take().unwrap_or(ResponseMetadata { status: Some(status), retry_after: None });
	let body = response.into_body();

	if (200..300).contains(&status) {
		return Ok(RawResponse { status, body });
	}

	Err(classify_failure(client, flow, &meta, &body))
}

fn classify_failure<C, M>(
	client: &Client<C, M>,
	flow: FlowKind,
	meta: &ResponseMetadata,
	body: &[u8],
) -> Error
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let text = String::from_utf8_lossy(body);
	let envelope = serde_json::from_slice::<ErrorEnvelope>(body).unwrap_or_default();
	let mut ctx = ProviderErrorContext::new(flow);

	if !text.trim().is_empty() {
		ctx = ctx.with_body_preview(text.as_ref());
	}
	if let Some(status) = meta.status {
		ctx = ctx.with_http_status(status);
	}
	if let Some(code) = envelope.code() {
		ctx = ctx.with_oauth_error(code);
	}
	if let Some(description) = envelope.description() {
		ctx = ctx.with_error_description(description);
	}

	obs::trace_failure(flow, meta.status, ctx.body_preview.as_deref());

	let message = ctx
		.error_description
		.clone()
		.or_else(|| ctx.oauth_error.clone())
		.unwrap_or_else(|| match meta.status {
			Some(status) => format!("HTTP {status}"),
			None => "unexpected response".into(),
		});

	oauth::classified_error(client.strategy.classify_error(&ctx), flow, message, Some(meta))
}
