//! Setup wizard that links an account and creates its config entry.
//!
//! The wizard is a small state machine driven by the host's UI:
//!
//! 1. [`SetupFlow::start`] shows the `user` form listing the login methods.
//! 2. [`SetupFlow::submit_login_method`] shows the `kakao_login` form. Its `url`
//!    placeholder is the authorize URL the user opens in a browser.
//! 3. [`SetupFlow::submit_auth_code`] runs the login and creates the entry. On failure the
//!    form comes back with an error key and a fresh authorize URL.

// self
use crate::{
	_prelude::*,
	auth::LoginMethod,
	error::ConfigError,
	flows::{AuthorizationSession, Client, LoginFailure, LoginOutcome},
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs::{self, FlowKind},
	store::{ConfigEntry, EntryStore},
};

/// Placeholder key carrying the authorize URL on the `kakao_login` form.
pub const URL_PLACEHOLDER: &str = "url";
/// Form error key for errors not tied to a single field.
pub const BASE_ERROR: &str = "base";
/// Title used when the account has no nickname.
pub const DEFAULT_TITLE: &str = "Baemin";

/// Wizard steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
	/// Login method selection.
	User,
	/// Authorization code entry for Kakao.
	KakaoLogin,
}
impl StepId {
	/// Returns the stable step label.
	pub const fn as_str(self) -> &'static str {
		match self {
			StepId::User => "user",
			StepId::KakaoLogin => "kakao_login",
		}
	}
}

/// Input a form asks for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FormSchema {
	/// Pick one of the offered login methods.
	LoginMethod {
		/// Methods offered.
		options: Vec<LoginMethod>,
	},
	/// Paste the authorization code (or the whole redirect URL).
	AuthCode,
}

/// Recoverable errors shown on a form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormError {
	/// The submitted code was empty or unreadable.
	InvalidAuthCode,
	/// The identity provider or the platform refused to issue a token.
	FailedTokenIssuance,
	/// The identity provider did not return the account.
	FailedUserInfoRetrieval,
}
impl FormError {
	/// Returns the translation key.
	pub const fn as_str(self) -> &'static str {
		match self {
			FormError::InvalidAuthCode => "invalid_auth_code",
			FormError::FailedTokenIssuance => "failed_token_issuance",
			FormError::FailedUserInfoRetrieval => "failed_user_info_retrieval",
		}
	}

	fn from_failure(failure: &LoginFailure) -> Self {
		match failure.stage {
			FlowKind::CodeExchange
				if matches!(failure.source, Error::Config(ConfigError::MissingAuthorizationCode)) =>
				FormError::InvalidAuthCode,
			FlowKind::UserInfo => FormError::FailedUserInfoRetrieval,
			_ => FormError::FailedTokenIssuance,
		}
	}
}
impl Display for FormError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Reasons the wizard stops without creating an entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
	/// The chosen login method is not implemented.
	UnsupportedLoginMethod,
	/// The account already has an entry.
	AlreadyConfigured,
}
impl AbortReason {
	/// Returns the translation key.
	pub const fn as_str(self) -> &'static str {
		match self {
			AbortReason::UnsupportedLoginMethod => "unsupported_login_method",
			AbortReason::AlreadyConfigured => "already_configured",
		}
	}
}
impl Display for AbortReason {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// A form the host should render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FlowForm {
	/// Step the form belongs to.
	pub step_id: StepId,
	/// Requested input.
	pub schema: FormSchema,
	/// Errors keyed by field (`base` for the whole form).
	pub errors: BTreeMap<String, FormError>,
	/// Values interpolated into the form's description.
	pub description_placeholders: BTreeMap<String, String>,
}
impl FlowForm {
	fn new(step_id: StepId, schema: FormSchema) -> Self {
		Self { step_id, schema, errors: BTreeMap::new(), description_placeholders: BTreeMap::new() }
	}

	/// Error shown for the whole form, if any.
	pub fn base_error(&self) -> Option<FormError> {
		self.errors.get(BASE_ERROR).copied()
	}

	/// Authorize URL shown on the `kakao_login` form.
	pub fn authorize_url(&self) -> Option<&str> {
		self.description_placeholders.get(URL_PLACEHOLDER).map(String::as_str)
	}
}

/// What the wizard wants the host to do next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FlowResult {
	/// Render a form and call back with the user's input.
	Form(FlowForm),
	/// Stop the wizard.
	Abort(AbortReason),
	/// The entry was created and saved.
	CreateEntry(ConfigEntry),
}

/// One run of the setup wizard.
///
/// Holds the pending [`AuthorizationSession`] between the `kakao_login` form and the code
/// submission, so a flow instance must not be shared between users.
pub struct SetupFlow<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: Arc<Client<C, M>>,
	store: Arc<dyn EntryStore>,
	session: Option<AuthorizationSession>,
}
impl<C, M> SetupFlow<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates a wizard that saves entries into `store`.
	pub fn new(client: Arc<Client<C, M>>, store: Arc<dyn EntryStore>) -> Self {
		Self { client, store, session: None }
	}

	/// Pending authorization session, if the `kakao_login` form is showing.
	pub fn session(&self) -> Option<&AuthorizationSession> {
		self.session.as_ref()
	}

	/// Shows the login method selection.
	pub fn start(&mut self) -> FlowResult {
		self.session = None;

		FlowResult::Form(FlowForm::new(
			StepId::User,
			FormSchema::LoginMethod { options: LoginMethod::SUPPORTED.to_vec() },
		))
	}

	/// Handles the `user` form.
	pub fn submit_login_method(&mut self, method: LoginMethod) -> FlowResult {
		if !method.is_supported() {
			obs::trace_warning("login method is not supported");

			return FlowResult::Abort(AbortReason::UnsupportedLoginMethod);
		}

		self.kakao_form(None)
	}

	/// Handles the `kakao_login` form.
	///
	/// Only storage failures are returned as `Err`; vendor failures come back as a form
	/// error so the user can retry with a new code.
	pub async fn submit_auth_code(&mut self, input: &str) -> Result<FlowResult> {
		let Some(session) = self.session.take() else {
			return Ok(self.kakao_form(None));
		};

		if input.trim().is_empty() {
			return Ok(self.kakao_form(Some(FormError::InvalidAuthCode)));
		}

		let outcome = match self.client.complete_login(session, input).await {
			Ok(outcome) => outcome,
			Err(failure) => {
				obs::trace_warning(&failure.to_string());

				return Ok(self.kakao_form(Some(FormError::from_failure(&failure))));
			},
		};

		self.create_entry(outcome).await
	}

	async fn create_entry(&mut self, outcome: LoginOutcome) -> Result<FlowResult> {
		let Ok(unique_id) = outcome.account_id() else {
			return Ok(self.kakao_form(Some(FormError::FailedUserInfoRetrieval)));
		};

		if self.store.find_by_unique_id(&unique_id).await?.is_some() {
			return Ok(FlowResult::Abort(AbortReason::AlreadyConfigured));
		}

		let title = outcome.user.nickname.clone().unwrap_or_else(|| DEFAULT_TITLE.into());
		let entry = ConfigEntry::new(unique_id, title, LoginMethod::Kakao, outcome.platform_token);

		self.store.save(entry.clone()).await?;

		Ok(FlowResult::CreateEntry(entry))
	}

	fn kakao_form(&mut self, error: Option<FormError>) -> FlowResult {
		let session = self.client.start_authorization();
		let mut form = FlowForm::new(StepId::KakaoLogin, FormSchema::AuthCode);

		form.description_placeholders
			.insert(URL_PLACEHOLDER.into(), session.authorize_url.to_string());

		if let Some(error) = error {
			form.errors.insert(BASE_ERROR.into(), error);
		}

		self.session = Some(session);

		FlowResult::Form(form)
	}
}
impl<C, M> Debug for SetupFlow<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SetupFlow")
			.field("client", &self.client)
			.field("session", &self.session)
			.finish_non_exhaustive()
	}
}
