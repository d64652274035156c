//! Storage contracts and built-in store implementations for config entries.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

// self
use crate::{
	_prelude::*,
	auth::{AccountId, EntryId, LoginMethod, TokenRecord},
};

/// Boxed future returned by [`EntryStore`] methods.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + 'a + Send>>;

/// Storage backend contract for linked accounts.
///
/// Implementations must keep at most one entry per [`EntryId`]. Uniqueness of
/// [`ConfigEntry::unique_id`] is enforced by the setup wizard, not by the store.
pub trait EntryStore
where
	Self: Send + Sync,
{
	/// Persists or replaces an entry.
	fn save(&self, entry: ConfigEntry) -> StoreFuture<'_, ()>;

	/// Fetches an entry by id.
	fn fetch<'a>(&'a self, entry_id: &'a EntryId) -> StoreFuture<'a, Option<ConfigEntry>>;

	/// Finds the entry linked to an account, if any.
	fn find_by_unique_id<'a>(
		&'a self,
		unique_id: &'a AccountId,
	) -> StoreFuture<'a, Option<ConfigEntry>>;

	/// Lists every entry, oldest first.
	fn list(&self) -> StoreFuture<'_, Vec<ConfigEntry>>;

	/// Removes an entry, returning it when it existed.
	fn remove<'a>(&'a self, entry_id: &'a EntryId) -> StoreFuture<'a, Option<ConfigEntry>>;
}

/// Error type produced by [`EntryStore`] implementations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ThisError)]
pub enum StoreError {
	/// Serialization failures surfaced by the backend.
	#[error("Serialization error: {message}.")]
	Serialization {
		/// Human-readable error payload.
		message: String,
	},
	/// Backend-level failure for the storage engine.
	#[error("Backend failure: {message}.")]
	Backend {
		/// Human-readable error payload.
		message: String,
	},
}

/// A linked account: what the wizard creates and the integration loads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigEntry {
	/// Local identifier.
	pub entry_id: EntryId,
	/// Account identifier; one entry per account.
	pub unique_id: AccountId,
	/// Display title.
	pub title: String,
	/// Identity provider used to sign in.
	pub login_method: LoginMethod,
	/// Platform token used for address lookups.
	pub token: TokenRecord,
	/// Creation instant.
	#[serde(with = "time::serde::rfc3339")]
	pub created_at: OffsetDateTime,
}
impl ConfigEntry {
	/// Creates an entry with a fresh id.
	pub fn new(
		unique_id: AccountId,
		title: impl Into<String>,
		login_method: LoginMethod,
		token: TokenRecord,
	) -> Self {
		Self {
			entry_id: EntryId::generate(),
			unique_id,
			title: title.into(),
			login_method,
			token,
			created_at: OffsetDateTime::now_utc(),
		}
	}
}

fn sorted(mut entries: Vec<ConfigEntry>) -> Vec<ConfigEntry> {
	entries.sort_by(|a, b| {
		a.created_at.cmp(&b.created_at).then_with(|| a.entry_id.cmp(&b.entry_id))
	});

	entries
}
