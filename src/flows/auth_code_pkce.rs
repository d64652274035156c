//! Authorization Code + PKCE against the identity provider.
//!
//! [`Client::start_authorization`] produces an [`AuthorizationSession`] whose authorize
//! URL the user opens in a browser. The provider redirects to the app's custom scheme,
//! which a desktop browser cannot follow, so the user copies the `code` (or the whole
//! redirect URL) back. [`Client::exchange_code`] then redeems it with the session's
//! verifier through the `oauth2` crate.

mod session;

pub use session::*;

// self
use crate::{
	_prelude::*,
	auth::TokenRecord,
	flows::Client,
	http::TokenHttpClient,
	oauth::{BasicFacade, OAuth2Facade, TransportErrorMapper},
	obs::{self, FlowKind, FlowOutcome, FlowSpan},
};

impl<C, M> Client<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Generates a fresh verifier, challenge, and state, and builds the authorize URL.
	pub fn start_authorization(&self) -> AuthorizationSession {
		session::build_session(&self.identity, &self.client_id, self.redirect_uri.clone())
	}

	/// Redeems an authorization code for an identity provider token.
	///
	/// `code` may be the bare code or the full redirect URL; see
	/// [`AuthorizationSession::parse_callback`]. The session is consumed because a verifier
	/// can only be redeemed once.
	pub async fn exchange_code(
		&self,
		session: AuthorizationSession,
		code: &str,
	) -> Result<TokenRecord> {
		const KIND: FlowKind = FlowKind::CodeExchange;

		let span = FlowSpan::new(KIND, "exchange_code");

		obs::record_flow_outcome(KIND, FlowOutcome::Attempt);

		let result = span
			.instrument(async move {
				let code = session.parse_callback(code)?;
				let (redirect_uri, pkce) = session.into_exchange_parts();
				let facade: BasicFacade<C, M> = BasicFacade::from_descriptor(
					&self.identity,
					&self.client_id,
					self.client_secret.as_deref(),
					self.http_client.clone(),
					self.transport_mapper.clone(),
				)?;

				facade
					.exchange_authorization_code(
						self.strategy.as_ref(),
						self.identity.id.clone(),
						&code,
						&pkce.verifier,
						&redirect_uri,
					)
					.await
			})
			.await;

		match &result {
			Ok(_) => obs::record_flow_outcome(KIND, FlowOutcome::Success),
			Err(_) => obs::record_flow_outcome(KIND, FlowOutcome::Failure),
		}

		result
	}
}
