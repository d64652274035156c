//! Saved delivery addresses as returned by the platform's location API.

// crates.io
use serde::Deserializer;
// self
use crate::_prelude::*;

/// Which address list an entry came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressKind {
	/// Addresses the user pinned (home, office, ...).
	Favorite,
	/// Recently used addresses.
	Normal,
}
impl AddressKind {
	/// Both kinds, favorites first.
	pub const ALL: [AddressKind; 2] = [AddressKind::Favorite, AddressKind::Normal];

	/// Returns a stable label.
	pub const fn as_str(self) -> &'static str {
		match self {
			AddressKind::Favorite => "favorite",
			AddressKind::Normal => "normal",
		}
	}
}
impl Display for AddressKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Postal components of a saved address.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AddressDetail {
	/// Short label the platform derives from the address (building name or road).
	#[serde(deserialize_with = "null_as_default")]
	pub title: String,
	/// Province or metropolitan city.
	#[serde(deserialize_with = "null_as_default")]
	pub sido: String,
	/// District.
	#[serde(deserialize_with = "null_as_default")]
	pub gugun: String,
	/// Road-name address.
	#[serde(deserialize_with = "null_as_default")]
	pub road: String,
	/// Unit, floor, or other free-form detail.
	#[serde(deserialize_with = "null_as_default")]
	pub detail: String,
}

/// One entry of the user's address book.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SavedAddress {
	/// User-assigned nickname, if any.
	pub nick_name: Option<String>,
	/// Postal components.
	pub address: AddressDetail,
}
impl SavedAddress {
	/// Nickname when present and not blank, otherwise the platform title.
	pub fn display_title(&self) -> &str {
		match self.nick_name.as_deref().map(str::trim) {
			Some(nick) if !nick.is_empty() => nick,
			_ => self.address.title.trim(),
		}
	}

	/// `sido gugun road detail`, single-spaced, blank parts skipped.
	pub fn display_value(&self) -> String {
		let AddressDetail { sido, gugun, road, detail, .. } = &self.address;

		[sido, gugun, road, detail]
			.into_iter()
			.map(|part| part.trim())
			.filter(|part| !part.is_empty())
			.collect::<Vec<_>>()
			.join(" ")
	}
}

/// Snapshot of both address lists.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AddressBook {
	/// Pinned addresses.
	#[serde(rename = "favoriteAddresses", deserialize_with = "null_as_default")]
	pub favorite: Vec<SavedAddress>,
	/// Recently used addresses.
	#[serde(rename = "normalAddresses", deserialize_with = "null_as_default")]
	pub normal: Vec<SavedAddress>,
}
impl AddressBook {
	/// Addresses of one kind.
	pub fn of_kind(&self, kind: AddressKind) -> &[SavedAddress] {
		match kind {
			AddressKind::Favorite => &self.favorite,
			AddressKind::Normal => &self.normal,
		}
	}

	/// Total number of addresses across both lists.
	pub fn len(&self) -> usize {
		self.favorite.len() + self.normal.len()
	}

	/// Returns `true` when neither list has entries.
	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	/// Iterates over every address, favorites first.
	pub fn iter(&self) -> impl Iterator<Item = (AddressKind, &SavedAddress)> {
		AddressKind::ALL
			.into_iter()
			.flat_map(move |kind| self.of_kind(kind).iter().map(move |address| (kind, address)))
	}
}

// The platform sends `null` for empty strings and lists.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
