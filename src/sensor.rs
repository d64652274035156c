//! Read-only address sensors derived from an entry's address book.

// std
use std::collections::HashSet;
// self
use crate::{
	_prelude::*,
	address::{AddressBook, AddressKind, SavedAddress},
	auth::EntryId,
	device::DeviceInfo,
	store::ConfigEntry,
};

/// Static description shared by every sensor built from one address list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AddressSensorDescription {
	/// Entity key; part of the unique id.
	pub key: &'static str,
	/// Host translation key.
	pub translation_key: &'static str,
	/// Device name the sensors are grouped under.
	pub sensor_name: &'static str,
	/// Address list the sensors read from.
	pub kind: AddressKind,
}

/// Favorites first, then recent addresses.
pub const SENSOR_DESCRIPTIONS: [AddressSensorDescription; 2] = [
	AddressSensorDescription {
		key: "favaddr",
		translation_key: "favaddr",
		sensor_name: "주소",
		kind: AddressKind::Favorite,
	},
	AddressSensorDescription {
		key: "noraddr",
		translation_key: "noraddr",
		sensor_name: "주소",
		kind: AddressKind::Normal,
	},
];

/// One saved address exposed as a sensor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AddressSensor {
	/// Entry the sensor belongs to.
	pub entry_id: EntryId,
	/// Registry unique id: `{account}_{key}_{title}`.
	pub unique_id: String,
	/// Entity key (`favaddr` or `noraddr`).
	pub key: &'static str,
	/// Host translation key.
	pub translation_key: &'static str,
	/// Placeholders for the translated name (`title`).
	pub translation_placeholders: BTreeMap<String, String>,
	/// Full address line.
	pub native_value: String,
	/// Address list the value came from.
	pub kind: AddressKind,
	/// Device the sensor is grouped under.
	pub device_info: DeviceInfo,
}
impl AddressSensor {
	fn new(
		entry: &ConfigEntry,
		description: &AddressSensorDescription,
		address: &SavedAddress,
		unique_id: String,
	) -> Self {
		let mut translation_placeholders = BTreeMap::new();

		translation_placeholders.insert("title".to_owned(), address.display_title().to_owned());

		Self {
			entry_id: entry.entry_id.clone(),
			unique_id,
			key: description.key,
			translation_key: description.translation_key,
			translation_placeholders,
			native_value: address.display_value(),
			kind: description.kind,
			device_info: DeviceInfo::new(&entry.unique_id, description.sensor_name),
		}
	}

	/// Placeholder title (nickname or address title).
	pub fn title(&self) -> &str {
		self.translation_placeholders.get("title").map(String::as_str).unwrap_or_default()
	}

	/// Address sensors are always enabled when first registered.
	pub fn entity_registry_enabled_default(&self) -> bool {
		true
	}

	/// Address sensors stay available; failed refreshes keep the last snapshot.
	pub fn available(&self) -> bool {
		true
	}

	/// The host is expected to poll through [`Integration::refresh_entry`].
	///
	/// [`Integration::refresh_entry`]: crate::integration::Integration::refresh_entry
	pub fn should_poll(&self) -> bool {
		true
	}
}

/// Builds one sensor per address, in description order.
///
/// Titles can repeat (two addresses sharing a building name); later duplicates get the
/// lowest numeric suffix that no earlier sensor of the entry already holds, so unique ids
/// stay unique even when a title itself ends in `_2`.
pub fn build_sensors(entry: &ConfigEntry, book: &AddressBook) -> Vec<AddressSensor> {
	let mut issued = HashSet::<String>::with_capacity(book.len());
	let mut next_suffix = HashMap::<String, usize>::new();
	let mut sensors = Vec::with_capacity(book.len());

	for description in &SENSOR_DESCRIPTIONS {
		for address in book.of_kind(description.kind) {
			let base = format!("{}_{}_{}", entry.unique_id, description.key, address.display_title());
			let unique_id = if issued.contains(&base) {
				let suffix = next_suffix.entry(base.clone()).or_insert(2);

				loop {
					let candidate = format!("{base}_{suffix}");

					*suffix += 1;

					if !issued.contains(&candidate) {
						break candidate;
					}
				}
			} else {
				base
			};

			issued.insert(unique_id.clone());
			sensors.push(AddressSensor::new(entry, description, address, unique_id));
		}
	}

	sensors
}

#[cfg(test)]
mod tests {
	// self
	use super::*;
	use crate::{address::AddressDetail, store::tests::entry};

	fn address(nick: Option<&str>, title: &str, road: &str) -> SavedAddress {
		SavedAddress {
			nick_name: nick.map(Into::into),
			address: AddressDetail {
				title: title.into(),
				sido: "서울특별시".into(),
				gugun: "송파구".into(),
				road: road.into(),
				detail: "".into(),
			},
		}
	}

	#[test]
	fn sensors_follow_description_order_and_naming() {
		let entry = entry("kakao_42");
		let book = AddressBook {
			favorite: vec![address(Some("집"), "장은빌딩", "위례성대로 2")],
			normal: vec![address(None, "잠실역", "올림픽로 265")],
		};
		let sensors = build_sensors(&entry, &book);

		assert_eq!(sensors.len(), 2);
		assert_eq!(sensors[0].unique_id, "kakao_42_favaddr_집");
		assert_eq!(sensors[0].translation_key, "favaddr");
		assert_eq!(sensors[0].title(), "집");
		assert_eq!(sensors[0].native_value, "서울특별시 송파구 위례성대로 2");
		assert_eq!(sensors[1].unique_id, "kakao_42_noraddr_잠실역");
		assert_eq!(sensors[1].kind, AddressKind::Normal);
		assert!(sensors.iter().all(|sensor| sensor.device_info == sensors[0].device_info));
		assert!(sensors[0].entity_registry_enabled_default());
		assert!(sensors[0].available() && sensors[0].should_poll());
	}

	#[test]
	fn duplicate_titles_receive_suffixes() {
		let entry = entry("kakao_42");
		let book = AddressBook {
			favorite: vec![],
			normal: vec![
				address(None, "잠실역", "올림픽로 265"),
				address(None, "잠실역", "올림픽로 240"),
				address(None, "잠실역", "송파대로 567"),
			],
		};
		let ids = build_sensors(&entry, &book)
			.into_iter()
			.map(|sensor| sensor.unique_id)
			.collect::<Vec<_>>();

		assert_eq!(
			ids,
			vec!["kakao_42_noraddr_잠실역", "kakao_42_noraddr_잠실역_2", "kakao_42_noraddr_잠실역_3"]
		);
	}

	#[test]
	fn suffixes_never_collide_with_titles_that_look_suffixed() {
		let entry = entry("kakao_1");
		let book = AddressBook {
			favorite: vec![],
			normal: vec![
				address(None, "역", "올림픽로 265"),
				address(None, "역", "올림픽로 240"),
				address(None, "역_2", "송파대로 567"),
				address(None, "역", "백제고분로 1"),
			],
		};
		let ids = build_sensors(&entry, &book)
			.into_iter()
			.map(|sensor| sensor.unique_id)
			.collect::<Vec<_>>();

		assert_eq!(
			ids,
			vec!["kakao_1_noraddr_역", "kakao_1_noraddr_역_2", "kakao_1_noraddr_역_2_2", "kakao_1_noraddr_역_3"]
		);
		assert_eq!(ids.iter().collect::<HashSet<_>>().len(), ids.len());
	}

	#[test]
	fn empty_book_yields_no_sensors() {
		assert!(build_sensors(&entry("kakao_42"), &AddressBook::default()).is_empty());
	}
}
