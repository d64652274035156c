//! End-to-end login: authorization code to platform token.

// self
use crate::{
	_prelude::*,
	auth::{AccountId, TokenRecord},
	flows::{AuthorizationSession, Client, KakaoUser},
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::FlowKind,
};

/// Everything a successful login produced.
#[derive(Clone, Debug)]
pub struct LoginOutcome {
	/// Identity provider account.
	pub user: KakaoUser,
	/// Identity provider token; only needed for the platform exchange.
	pub identity_token: TokenRecord,
	/// Platform token used for every later call.
	pub platform_token: TokenRecord,
}
impl LoginOutcome {
	/// Stable account identifier for deduplication.
	pub fn account_id(&self) -> Result<AccountId> {
		self.user.account_id()
	}
}

/// Login failure tagged with the step that failed.
#[derive(Debug, ThisError)]
#[error("Login failed during {stage}: {source}")]
pub struct LoginFailure {
	/// Endpoint call that failed.
	pub stage: FlowKind,
	/// Underlying error.
	#[source]
	pub source: Error,
}
impl LoginFailure {
	fn at(stage: FlowKind) -> impl FnOnce(Error) -> Self {
		move |source| Self { stage, source }
	}
}
impl From<LoginFailure> for Error {
	fn from(value: LoginFailure) -> Self {
		value.source
	}
}

impl<C, M> Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Redeems the code, resolves the account, and obtains the platform token.
	///
	/// Calls run strictly in order and stop at the first failure.
	pub async fn complete_login(
		&self,
		session: AuthorizationSession,
		input: &str,
	) -> Result<LoginOutcome, LoginFailure> {
		let identity_token = self
			.exchange_code(session, input)
			.await
			.map_err(LoginFailure::at(FlowKind::CodeExchange))?;
		let user = self
			.fetch_user_info(&identity_token)
			.await
			.map_err(LoginFailure::at(FlowKind::UserInfo))?;
		let platform_token = self
			.exchange_platform_token(&identity_token, &user)
			.await
			.map_err(LoginFailure::at(FlowKind::PlatformToken))?;

		Ok(LoginOutcome { user, identity_token, platform_token })
	}
}
