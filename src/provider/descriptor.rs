//! Identity provider descriptor data structures and presets.

/// Builder API for assembling provider descriptors.
pub mod builder;
/// Provider-specific quirk toggles.
pub mod quirks;

pub use builder::*;
pub use quirks::*;

// self
use crate::{_prelude::*, auth::ProviderId};

/// Kakao REST API key registered for the consumer app.
pub const KAKAO_CLIENT_ID: &str = "bae459a9dde7d347f994f33479f2588e";
/// Redirect URI registered for the consumer app's Kakao login.
pub const KAKAO_REDIRECT_URI: &str = "kakaobae459a9dde7d347f994f33479f2588e://oauth";

const KAKAO_AUTHORIZE_URL: &str = "https://kauth.kakao.com/oauth/authorize";
const KAKAO_TOKEN_URL: &str = "https://kauth.kakao.com/oauth/token";
const KAKAO_USER_INFO_URL: &str = "https://kapi.kakao.com/v2/user/me?secure_resource=true";
const KAKAO_USER_AGENT: &str = "%EB%B0%B0%EB%8B%AC%EC%9D%98%EB%AF%BC%EC%A1%B1/15.6.1.53389 CFNetwork/3852.100.1 Darwin/25.0.0";
const KAKAO_SDK_HEADER: &str = "sdk/2.22.0 sdk_type/swift os/ios-19.0 lang/en-KR res/430x932 device/iPhone origin/com.jawebs.baedal app_ver/15.6.1";

/// Preferred client authentication modes for token endpoint calls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClientAuthMethod {
	#[default]
	/// HTTP Basic with `client_id`/`client_secret`.
	ClientSecretBasic,
	/// Form POST body parameters for `client_id`/`client_secret`.
	ClientSecretPost,
	/// Public clients that prove possession via PKCE.
	NoneWithPkce,
}

/// Endpoint set declared by an identity provider descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderEndpoints {
	/// Authorization endpoint the user is sent to.
	pub authorization: Url,
	/// Token endpoint used for the code exchange.
	pub token: Url,
	/// User info endpoint returning the account identifier.
	pub user_info: Url,
}

/// Immutable identity provider descriptor consumed by flows.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderDescriptor {
	/// Descriptor identifier.
	pub id: ProviderId,
	/// Endpoint definitions exposed by the provider.
	pub endpoints: ProviderEndpoints,
	/// Preferred client authentication mechanism.
	pub preferred_client_auth_method: ClientAuthMethod,
	/// Provider-specific quirks.
	pub quirks: ProviderQuirks,
}
impl ProviderDescriptor {
	/// Creates a new builder for the provided identifier.
	pub fn builder(id: ProviderId) -> ProviderDescriptorBuilder {
		ProviderDescriptorBuilder::new(id)
	}

	/// Kakao login as configured by the delivery platform's iOS app.
	pub fn kakao() -> Result<Self, ProviderDescriptorError> {
		Self::builder(preset_id("kakao")?)
			.authorization_endpoint(preset_url("authorization", KAKAO_AUTHORIZE_URL)?)
			.token_endpoint(preset_url("token", KAKAO_TOKEN_URL)?)
			.user_info_endpoint(preset_url("user_info", KAKAO_USER_INFO_URL)?)
			.preferred_client_auth_method(ClientAuthMethod::NoneWithPkce)
			.deep_link_method("universal_link")
			.user_agent(KAKAO_USER_AGENT)
			.sdk_header(KAKAO_SDK_HEADER)
			.build()
	}
}
