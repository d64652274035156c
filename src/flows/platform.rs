//! Delivery platform calls: token exchange, member login, and the address list.
//!
//! The platform does not run its own authorization page. It trusts an identity provider
//! access token presented together with the account id (`grant_type=sns_key`), and
//! answers with its own bearer token that every later call uses.

// crates.io
use oauth2::http::Method;
// self
use crate::{
	_prelude::*,
	address::AddressBook,
	auth::{LoginMethod, TokenRecord},
	error::ConfigError,
	flows::{Client, KakaoUser, common},
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

const SNS_KEY_GRANT: &str = "sns_key";

/// Member session returned by the platform's login endpoint.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MemberSession {
	/// Result label reported by the platform (`SUCCESS` on success).
	#[serde(default)]
	pub status: Option<String>,
	/// Human readable message, when supplied.
	#[serde(default)]
	pub message: Option<String>,
	/// Session payload; kept verbatim because its shape varies between app versions.
	#[serde(default)]
	pub data: serde_json::Value,
}
impl MemberSession {
	/// Member number, when the payload carries one.
	pub fn member_number(&self) -> Option<String> {
		["memberNo", "memberNumber"].into_iter().find_map(|key| match self.data.get(key)? {
			serde_json::Value::String(value) => Some(value.clone()),
			serde_json::Value::Number(value) => Some(value.to_string()),
			_ => None,
		})
	}
}

#[derive(Debug, Deserialize)]
struct PlatformTokenResponse {
	access_token: String,
	#[serde(default)]
	refresh_token: Option<String>,
	#[serde(default)]
	expires_in: Option<i64>,
	#[serde(default)]
	scope: Option<String>,
	#[serde(flatten)]
	extra: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DataEnvelope<T> {
	data: T,
}

impl<C, M> Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Trades an identity provider token for a platform token.
	///
	/// Response fields the record does not model (`token_type`, member metadata) are kept
	/// in [`TokenRecord::extra`].
	pub async fn exchange_platform_token(
		&self,
		identity_token: &TokenRecord,
		user: &KakaoUser,
	) -> Result<TokenRecord> {
		const KIND: FlowKind = FlowKind::PlatformToken;

		let span = FlowSpan::new(KIND, "exchange_platform_token");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut form = BTreeMap::new();

				form.insert("auth_type".into(), LoginMethod::Kakao.platform_auth_type().into());
				form.insert("grant_type".into(), SNS_KEY_GRANT.into());
				form.insert("scope".into(), self.platform.scope.clone());
				form.insert("security_key".into(), identity_token.access_token.expose().into());
				form.insert("sns_key".into(), user.id.to_string());

				self.strategy.augment_form(KIND, &mut form);

				let request = common::form(
					common::request(
						Method::POST,
						&self.platform.endpoints.token,
						&self.platform.user_agent,
					),
					&form,
				)?;
				let response = common::execute(self, KIND, request).await?;
				let payload = response.json::<PlatformTokenResponse>(KIND)?;
				let record = platform_record(self, payload)?;

				obs::trace_response(KIND, response.status, &record);

				Ok(record)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Opens a member session with a platform token.
	pub async fn login_member(&self, token: &TokenRecord) -> Result<MemberSession> {
		const KIND: FlowKind = FlowKind::MemberLogin;

		let span = FlowSpan::new(KIND, "login_member");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let builder = common::request(
					Method::POST,
					&self.platform.endpoints.member_login,
					&self.platform.user_agent,
				);
				let builder = common::bearer(builder, token.access_token.expose())?;
				// The app posts an empty form body.
				let request = common::form(builder, &BTreeMap::new())?;
				let response = common::execute(self, KIND, request).await?;
				let session = response.json::<MemberSession>(KIND)?;

				obs::trace_response(KIND, response.status, &session.status);

				Ok(session)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}

	/// Fetches both saved address lists.
	///
	/// The device and member identifiers are sent as `-`, which the platform resolves from
	/// the bearer token.
	pub async fn fetch_addresses(&self, token: &TokenRecord) -> Result<AddressBook> {
		const KIND: FlowKind = FlowKind::Addresses;

		let span = FlowSpan::new(KIND, "fetch_addresses");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let mut url = self.platform.endpoints.addresses.clone();

				url.query_pairs_mut().append_pair("dvcid", "-").append_pair("memberNo", "-");

				let builder = common::request(Method::GET, &url, &self.platform.user_agent);
				let request = common::empty(common::bearer(builder, token.access_token.expose())?)?;
				let response = common::execute(self, KIND, request).await?;
				let book = response.json::<DataEnvelope<AddressBook>>(KIND)?.data;

				obs::trace_response(KIND, response.status, &book.len());

				Ok(book)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}

fn platform_record<C, M>(
	client: &Client<C, M>,
	payload: PlatformTokenResponse,
) -> Result<TokenRecord>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	let mut builder = TokenRecord::builder(client.platform.id.clone())
		.access_token(payload.access_token)
		.issued_at(OffsetDateTime::now_utc())
		.extra(payload.extra);

	if let Some(expires_in) = payload.expires_in {
		if expires_in <= 0 {
			return Err(ConfigError::NonPositiveExpiresIn.into());
		}

		builder = builder.expires_in(Duration::seconds(expires_in));
	}
	if let Some(refresh) = payload.refresh_token.filter(|value| !value.is_empty()) {
		builder = builder.refresh_token(refresh);
	}
	if let Some(scope) = payload.scope {
		builder = builder.scope(scope.split_whitespace().map(str::to_owned));
	}

	Ok(builder.build().map_err(ConfigError::from)?)
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn member_number_reads_string_or_numeric_ids() {
		let session: MemberSession =
			serde_json::from_str(r#"{"status":"SUCCESS","data":{"memberNo":"20240101"}}"#)
				.expect("Session payload should deserialize.");

		assert_eq!(session.member_number().as_deref(), Some("20240101"));

		let session: MemberSession =
			serde_json::from_str(r#"{"status":"SUCCESS","data":{"memberNumber":7}}"#)
				.expect("Session payload should deserialize.");

		assert_eq!(session.member_number().as_deref(), Some("7"));
		assert_eq!(MemberSession::default().member_number(), None);
	}

	#[test]
	fn token_response_keeps_unknown_fields() {
		let payload: PlatformTokenResponse = serde_json::from_str(
			r#"{"access_token":"b-access","token_type":"bearer","expires_in":3600,"scope":"read","mem_no":"42"}"#,
		)
		.expect("Token payload should deserialize.");

		assert_eq!(payload.expires_in, Some(3600));
		assert_eq!(payload.extra.get("token_type"), Some(&serde_json::json!("bearer")));
		assert_eq!(payload.extra.get("mem_no"), Some(&serde_json::json!("42")));
		assert!(!payload.extra.contains_key("access_token"));
	}
}
