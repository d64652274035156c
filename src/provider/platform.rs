//! Delivery platform endpoints and the headers its consumer app sends.

// self
use crate::{
	_prelude::*,
	auth::ProviderId,
	provider::{ProviderDescriptorError, preset_id, preset_url, validate_endpoint},
};

const BAEMIN_TOKEN_URL: &str = "https://auth.baemin.com/oauth/token";
const BAEMIN_MEMBER_LOGIN_URL: &str = "https://member.baemin.com/mem2/login";
const BAEMIN_ADDRESSES_URL: &str = "https://location-api.baemin.com/v1/addresses";
const BAEMIN_USER_AGENT: &str = "iph1_15.6.1";

/// Endpoint set exposed by the delivery platform.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformEndpoints {
	/// Token endpoint accepting identity-provider tokens (`grant_type=sns_key`).
	pub token: Url,
	/// Member session login endpoint.
	pub member_login: Url,
	/// Saved address list endpoint.
	pub addresses: Url,
}

/// Immutable platform descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions.
	pub endpoints: PlatformEndpoints,
	/// `User-Agent` the consumer app identifies itself with.
	pub user_agent: String,
	/// OAuth scope requested during the token exchange.
	pub scope: String,
}
impl PlatformDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> PlatformDescriptorBuilder {
		PlatformDescriptorBuilder::new(id)
	}

	/// Baemin endpoints as used by the iOS consumer app.
	pub fn baemin() -> Result<Self, ProviderDescriptorError> {
		Self::builder(preset_id("baemin")?)
			.token_endpoint(preset_url("token", BAEMIN_TOKEN_URL)?)
			.member_login_endpoint(preset_url("member_login", BAEMIN_MEMBER_LOGIN_URL)?)
			.addresses_endpoint(preset_url("addresses", BAEMIN_ADDRESSES_URL)?)
			.build()
	}
}

/// Builder for [`PlatformDescriptor`] values.
#[derive(Debug)]
pub struct PlatformDescriptorBuilder {
	id: ProviderId,
	token_endpoint: Option<Url>,
	member_login_endpoint: Option<Url>,
	addresses_endpoint: Option<Url>,
	user_agent: String,
	scope: String,
}
impl PlatformDescriptorBuilder {
	fn new(id: ProviderId) -> Self {
		Self {
			id,
			token_endpoint: None,
			member_login_endpoint: None,
			addresses_endpoint: None,
			user_agent: BAEMIN_USER_AGENT.into(),
			scope: "read".into(),
		}
	}

	/// Sets the token endpoint.
	pub fn token_endpoint(mut self, url: Url) -> Self {
		self.token_endpoint = Some(url);

		self
	}

	/// Sets the member login endpoint.
	pub fn member_login_endpoint(mut self, url: Url) -> Self {
		self.member_login_endpoint = Some(url);

		self
	}

	/// Sets the address list endpoint.
	pub fn addresses_endpoint(mut self, url: Url) -> Self {
		self.addresses_endpoint = Some(url);

		self
	}

	/// Overrides the `User-Agent` (defaults to the iOS app's agent).
	pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
		self.user_agent = agent.into();

		self
	}

	/// Overrides the requested scope (defaults to `read`).
	pub fn scope(mut self, scope: impl Into<String>) -> Self {
		self.scope = scope.into();

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<PlatformDescriptor, ProviderDescriptorError> {
		let token = self.token_endpoint.ok_or(ProviderDescriptorError::MissingTokenEndpoint)?;
		let member_login = self
			.member_login_endpoint
			.ok_or(ProviderDescriptorError::MissingMemberLoginEndpoint)?;
		let addresses =
			self.addresses_endpoint.ok_or(ProviderDescriptorError::MissingAddressesEndpoint)?;

		validate_endpoint("token", &token)?;
		validate_endpoint("member_login", &member_login)?;
		validate_endpoint("addresses", &addresses)?;

		Ok(PlatformDescriptor {
			id: self.id,
			endpoints: PlatformEndpoints { token, member_login, addresses },
			user_agent: self.user_agent,
			scope: self.scope,
		})
	}
}
