//! Thread-safe in-memory [`EntryStore`] implementation for embedding and tests.

// self
use crate::{
	_prelude::*,
	auth::{AccountId, EntryId},
	store::{ConfigEntry, EntryStore, StoreError, StoreFuture},
};

type StoreMap = Arc<RwLock<HashMap<EntryId, ConfigEntry>>>;

/// Storage backend that keeps entries in-process.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore(StoreMap);
impl MemoryStore {
	fn save_now(map: StoreMap, entry: ConfigEntry) -> Result<(), StoreError> {
		map.write().insert(entry.entry_id.clone(), entry);

		Ok(())
	}

	fn find_now(map: StoreMap, unique_id: &AccountId) -> Option<ConfigEntry> {
		map.read().values().find(|entry| &entry.unique_id == unique_id).cloned()
	}
}
impl EntryStore for MemoryStore {
	fn save(&self, entry: ConfigEntry) -> StoreFuture<'_, ()> {
		let map = self.0.clone();

		Box::pin(async move { Self::save_now(map, entry) })
	}

	fn fetch<'a>(&'a self, entry_id: &'a EntryId) -> StoreFuture<'a, Option<ConfigEntry>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.read().get(entry_id).cloned()) })
	}

	fn find_by_unique_id<'a>(
		&'a self,
		unique_id: &'a AccountId,
	) -> StoreFuture<'a, Option<ConfigEntry>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(Self::find_now(map, unique_id)) })
	}

	fn list(&self) -> StoreFuture<'_, Vec<ConfigEntry>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(super::sorted(map.read().values().cloned().collect())) })
	}

	fn remove<'a>(&'a self, entry_id: &'a EntryId) -> StoreFuture<'a, Option<ConfigEntry>> {
		let map = self.0.clone();

		Box::pin(async move { Ok(map.write().remove(entry_id)) })
	}
}
