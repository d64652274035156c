// crates.io
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};
// self
use crate::{_prelude::*, error::ConfigError, provider::ProviderDescriptor};

const STATE_LEN: usize = 32;
const PKCE_VERIFIER_BYTES: usize = 40;

/// Supported PKCE challenge methods surfaced via [`AuthorizationSession`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PkceCodeChallengeMethod {
	/// SHA-256 based PKCE (RFC 7636 S256).
	S256,
}
impl PkceCodeChallengeMethod {
	/// Returns the RFC 7636 identifier for the challenge method.
	pub fn as_str(self) -> &'static str {
		match self {
			PkceCodeChallengeMethod::S256 => "S256",
		}
	}
}

/// Authorization Code + PKCE handshake metadata returned by
/// [`Client::start_authorization`](crate::flows::Client::start_authorization).
///
/// The session holds the secret verifier, so it has to stay with whoever will later
/// redeem the authorization code. A new session is needed for every attempt.
#[derive(Clone)]
pub struct AuthorizationSession {
	/// Opaque state value that must round-trip via the redirect handler.
	pub state: String,
	/// Redirect URI supplied when constructing the authorize URL.
	pub redirect_uri: Url,
	/// Fully-formed HTTPS authorize URL that callers should send end-users to.
	pub authorize_url: Url,
	/// Moment the session was generated.
	pub created_at: OffsetDateTime,
	pkce: PkcePair,
}
impl AuthorizationSession {
	pub(super) fn new(redirect_uri: Url, authorize_url: Url, state: String, pkce: PkcePair) -> Self {
		Self { state, redirect_uri, authorize_url, created_at: OffsetDateTime::now_utc(), pkce }
	}

	/// PKCE code challenge derived from the secret verifier.
	pub fn code_challenge(&self) -> &str {
		&self.pkce.challenge
	}

	/// PKCE challenge method (currently always `S256`).
	pub fn code_challenge_method(&self) -> PkceCodeChallengeMethod {
		self.pkce.method
	}

	/// Secret verifier that must accompany the authorization code.
	pub fn code_verifier(&self) -> &str {
		&self.pkce.verifier
	}

	/// Validates the returned `state` parameter after the authorization redirect.
	pub fn validate_state(&self, returned_state: &str) -> Result<()> {
		if returned_state == self.state {
			Ok(())
		} else {
			Err(Error::InvalidGrant { reason: "authorization state mismatch".into() })
		}
	}

	/// Extracts the authorization code from whatever the user pasted back.
	///
	/// Accepts either the bare code or the full redirect URL. When a URL is given, an
	/// `error` parameter is surfaced as [`Error::InvalidGrant`] and a present `state` must
	/// match this session.
	pub fn parse_callback(&self, input: &str) -> Result<String> {
		let input = input.trim();

		if input.is_empty() {
			return Err(ConfigError::MissingAuthorizationCode.into());
		}
		if !input.contains("://") {
			return Ok(input.to_owned());
		}

		let Ok(url) = Url::parse(input) else {
			return Err(ConfigError::MissingAuthorizationCode.into());
		};
		let mut code = None;
		let mut state = None;
		let mut error = None;
		let mut error_description = None;

		for (key, value) in url.query_pairs() {
			match key.as_ref() {
				"code" => code = Some(value.into_owned()),
				"state" => state = Some(value.into_owned()),
				"error" => error = Some(value.into_owned()),
				"error_description" => error_description = Some(value.into_owned()),
				_ => (),
			}
		}

		if let Some(error) = error {
			return Err(Error::InvalidGrant { reason: error_description.unwrap_or(error) });
		}
		if let Some(state) = state {
			self.validate_state(&state)?;
		}

		code.filter(|code| !code.trim().is_empty())
			.ok_or_else(|| ConfigError::MissingAuthorizationCode.into())
	}

	pub(super) fn into_exchange_parts(self) -> (Url, PkcePair) {
		let AuthorizationSession { redirect_uri, pkce, .. } = self;

		(redirect_uri, pkce)
	}
}
impl Debug for AuthorizationSession {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AuthorizationSession")
			.field("state", &self.state)
			.field("redirect_uri", &self.redirect_uri)
			.field("authorize_url", &self.authorize_url)
			.field("created_at", &self.created_at)
			.field("code_challenge", &self.pkce.challenge)
			.field("code_challenge_method", &self.pkce.method)
			.finish()
	}
}

#[derive(Clone)]
pub(super) struct PkcePair {
	pub(super) verifier: String,
	challenge: String,
	method: PkceCodeChallengeMethod,
}
impl PkcePair {
	pub(super) fn generate() -> Self {
		let mut bytes = [0_u8; PKCE_VERIFIER_BYTES];

		rand::rng().fill(&mut bytes);

		let verifier = URL_SAFE_NO_PAD.encode(bytes);
		let challenge = compute_pkce_challenge(&verifier);

		Self { verifier, challenge, method: PkceCodeChallengeMethod::S256 }
	}
}

pub(super) fn build_session(
	descriptor: &ProviderDescriptor,
	client_id: &str,
	redirect_uri: Url,
) -> AuthorizationSession {
	let state = random_string(STATE_LEN);
	let pkce = PkcePair::generate();
	let authorize_url = build_authorize_url(descriptor, client_id, &redirect_uri, &state, &pkce);

	AuthorizationSession::new(redirect_uri, authorize_url, state, pkce)
}

fn build_authorize_url(
	descriptor: &ProviderDescriptor,
	client_id: &str,
	redirect_uri: &Url,
	state: &str,
	pkce: &PkcePair,
) -> Url {
	let mut url = descriptor.endpoints.authorization.clone();
	let mut pairs = url.query_pairs_mut();

	pairs.append_pair("response_type", "code");
	pairs.append_pair("client_id", client_id);
	pairs.append_pair("redirect_uri", redirect_uri.as_str());
	pairs.append_pair("code_challenge_method", pkce.method.as_str());
	pairs.append_pair("code_challenge", &pkce.challenge);

	if let Some(method) = descriptor.quirks.deep_link_method.as_deref() {
		pairs.append_pair("deep_link_method", method);
	}

	pairs.append_pair("state", state);

	drop(pairs);

	url
}

fn random_string(len: usize) -> String {
	rand::rng().sample_iter(Alphanumeric).take(len).map(char::from).collect()
}

fn compute_pkce_challenge(verifier: &str) -> String {
	let mut hasher = Sha256::new();
	hasher.update(verifier.as_bytes());
	let digest = hasher.finalize();
	URL_SAFE_NO_PAD.encode(digest)
}
