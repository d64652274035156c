//! Device registry metadata shared by every sensor of an entry.

// self
use crate::{_prelude::*, auth::AccountId};

/// Integration domain; first half of every device identifier.
pub const DOMAIN: &str = "baemin";
/// Manufacturer reported for every device.
pub const MANUFACTURER: &str = "WoowaBrothers";
/// Model reported for every device.
pub const MODEL: &str = "Baedal Minjok";

/// Device registry record a host groups sensors under.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
	/// `(domain, id)` pairs identifying the device.
	pub identifiers: BTreeSet<(String, String)>,
	/// Manufacturer label.
	pub manufacturer: String,
	/// Model label.
	pub model: String,
	/// Device name.
	pub name: String,
}
impl DeviceInfo {
	/// Device for the sensors named `sensor_name` under the account `unique_id`.
	pub fn new(unique_id: &AccountId, sensor_name: &str) -> Self {
		let mut identifiers = BTreeSet::new();

		identifiers.insert((DOMAIN.to_owned(), format!("{unique_id}_{sensor_name}")));

		Self {
			identifiers,
			manufacturer: MANUFACTURER.into(),
			model: MODEL.into(),
			name: sensor_name.into(),
		}
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn identifiers_combine_account_and_sensor_name() {
		let account = AccountId::new("kakao_42").expect("Account fixture should be valid.");
		let device = DeviceInfo::new(&account, "주소");

		assert_eq!(
			device.identifiers.into_iter().collect::<Vec<_>>(),
			vec![("baemin".to_owned(), "kakao_42_주소".to_owned())]
		);
		assert_eq!(device.manufacturer, "WoowaBrothers");
		assert_eq!(device.model, "Baedal Minjok");
		assert_eq!(device.name, "주소");
	}
}
