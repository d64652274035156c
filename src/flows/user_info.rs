//! Identity provider account lookup.

// crates.io
use oauth2::http::{Method, header::ACCEPT_LANGUAGE};
// self
use crate::{
	_prelude::*,
	auth::{AccountId, TokenRecord},
	flows::{Client, common},
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

const SDK_HEADER: &str = "ka";
const ACCEPT_LANGUAGE_VALUE: &str = "en-US,en;q=0.9";

/// Kakao account behind an identity token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KakaoUser {
	/// Numeric account id; the platform calls it `sns_key`.
	pub id: i64,
	/// Profile nickname, if the user consented to share it.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub nickname: Option<String>,
}
impl KakaoUser {
	/// Stable account identifier used to deduplicate config entries (`kakao_<id>`).
	pub fn account_id(&self) -> Result<AccountId> {
		AccountId::new(format!("kakao_{}", self.id)).map_err(|err| Error::InvalidGrant {
			reason: format!("user info returned an unusable account id: {err}"),
		})
	}
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
	id: i64,
	#[serde(default)]
	properties: Option<UserProperties>,
	#[serde(default)]
	kakao_account: Option<KakaoAccount>,
}
impl From<UserInfoResponse> for KakaoUser {
	fn from(value: UserInfoResponse) -> Self {
		let nickname = value
			.kakao_account
			.and_then(|account| account.profile)
			.and_then(|profile| profile.nickname)
			.or_else(|| value.properties.and_then(|properties| properties.nickname))
			.filter(|nickname| !nickname.trim().is_empty());

		Self { id: value.id, nickname }
	}
}

#[derive(Debug, Default, Deserialize)]
struct UserProperties {
	#[serde(default)]
	nickname: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct KakaoAccount {
	#[serde(default)]
	profile: Option<KakaoProfile>,
}

#[derive(Debug, Default, Deserialize)]
struct KakaoProfile {
	#[serde(default)]
	nickname: Option<String>,
}

impl<C, M> Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Looks up the account that owns `token`, sending the consumer app's headers.
	pub async fn fetch_user_info(&self, token: &TokenRecord) -> Result<KakaoUser> {
		const KIND: FlowKind = FlowKind::UserInfo;

		let span = FlowSpan::new(KIND, "fetch_user_info");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let quirks = &self.identity.quirks;
				let user_agent = quirks.user_agent.as_deref().unwrap_or(&self.platform.user_agent);
				let mut builder = common::request(
					Method::GET,
					&self.identity.endpoints.user_info,
					user_agent,
				)
				.header(ACCEPT_LANGUAGE, ACCEPT_LANGUAGE_VALUE);

				if let Some(sdk) = quirks.sdk_header.as_deref() {
					builder = builder.header(SDK_HEADER, sdk);
				}

				let builder = common::bearer(builder, token.access_token.expose())?;
				let response = common::execute(self, KIND, common::empty(builder)?).await?;
				let user: KakaoUser = response.json::<UserInfoResponse>(KIND)?.into();

				obs::trace_response(KIND, response.status, &user);

				Ok(user)
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
