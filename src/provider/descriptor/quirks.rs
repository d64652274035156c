// self
use crate::_prelude::*;

/// Provider-specific quirks that shape the requests the consumer app sends.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderQuirks {
	/// Extra `deep_link_method` parameter appended to the authorize URL.
	pub deep_link_method: Option<String>,
	/// `User-Agent` sent to resource endpoints.
	pub user_agent: Option<String>,
	/// Value of the `KA` SDK header sent to resource endpoints.
	pub sdk_header: Option<String>,
}
