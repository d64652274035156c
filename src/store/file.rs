//! File-backed [`EntryStore`] so linked accounts survive restarts.

// std
use std::{
	fs::{self, File},
	io::Write,
	path::{Path, PathBuf},
};
// self
use crate::{
	_prelude::*,
	auth::{AccountId, EntryId},
	store::{ConfigEntry, EntryStore, StoreError, StoreFuture},
};

/// Persists entries to a JSON file after each mutation.
///
/// The whole snapshot is rewritten through a sibling `.tmp` file and renamed into place,
/// so a crash never leaves a half-written store behind. The in-memory view only changes
/// once the snapshot is on disk.
#[derive(Clone, Debug)]
pub struct FileStore {
	path: PathBuf,
	inner: Arc<RwLock<HashMap<EntryId, ConfigEntry>>>,
}
impl FileStore {
	/// Opens (or creates) a store at the provided path, eagerly loading existing data.
	pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
		let path = path.into();

		Self::ensure_parent_exists(&path)?;

		let snapshot = Self::load_snapshot(&path)?;

		Ok(Self { path, inner: Arc::new(RwLock::new(snapshot)) })
	}

	/// Location of the snapshot file.
	pub fn path(&self) -> &Path {
		&self.path
	}

	fn load_snapshot(path: &Path) -> Result<HashMap<EntryId, ConfigEntry>, StoreError> {
		if !path.exists() {
			return Ok(HashMap::new());
		}

		let bytes = fs::read(path).map_err(|e| StoreError::Backend {
			message: format!("Failed to read {}: {e}", path.display()),
		})?;

		if bytes.iter().all(u8::is_ascii_whitespace) {
			return Ok(HashMap::new());
		}

		let entries: Vec<ConfigEntry> =
			serde_json::from_slice(&bytes).map_err(|e| StoreError::Serialization {
				message: format!("Failed to parse {}: {e}", path.display()),
			})?;

		Ok(entries.into_iter().map(|entry| (entry.entry_id.clone(), entry)).collect())
	}

	fn ensure_parent_exists(path: &Path) -> Result<(), StoreError> {
		if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
			fs::create_dir_all(parent).map_err(|e| StoreError::Backend {
				message: format!("Failed to create store directory {}: {e}", parent.display()),
			})?;
		}

		Ok(())
	}

	fn persist_locked(&self, contents: &HashMap<EntryId, ConfigEntry>) -> Result<(), StoreError> {
		Self::ensure_parent_exists(&self.path)?;

		let snapshot = super::sorted(contents.values().cloned().collect());
		let serialized =
			serde_json::to_vec_pretty(&snapshot).map_err(|e| StoreError::Serialization {
				message: format!("Failed to serialize store snapshot: {e}"),
			})?;
		let mut tmp_path = self.path.clone();

		tmp_path.set_extension("tmp");

		{
			let mut file = File::create(&tmp_path).map_err(|e| StoreError::Backend {
				message: format!("Failed to create {}: {e}", tmp_path.display()),
			})?;

			file.write_all(&serialized).map_err(|e| StoreError::Backend {
				message: format!("Failed to write {}: {e}", tmp_path.display()),
			})?;
			file.sync_all().map_err(|e| StoreError::Backend {
				message: format!("Failed to sync {}: {e}", tmp_path.display()),
			})?;
		}

		fs::rename(&tmp_path, &self.path).map_err(|e| StoreError::Backend {
			message: format!("Failed to replace {}: {e}", self.path.display()),
		})
	}
}
impl EntryStore for FileStore {
	fn save(&self, entry: ConfigEntry) -> StoreFuture<'_, ()> {
		Box::pin(async move {
			let mut guard = self.inner.write();
			let mut next = guard.clone();

			next.insert(entry.entry_id.clone(), entry);
			self.persist_locked(&next)?;

			*guard = next;

			Ok(())
		})
	}

	fn fetch<'a>(&'a self, entry_id: &'a EntryId) -> StoreFuture<'a, Option<ConfigEntry>> {
		Box::pin(async move { Ok(self.inner.read().get(entry_id).cloned()) })
	}

	fn find_by_unique_id<'a>(
		&'a self,
		unique_id: &'a AccountId,
	) -> StoreFuture<'a, Option<ConfigEntry>> {
		Box::pin(async move {
			Ok(self.inner.read().values().find(|entry| &entry.unique_id == unique_id).cloned())
		})
	}

	fn list(&self) -> StoreFuture<'_, Vec<ConfigEntry>> {
		Box::pin(async move { Ok(super::sorted(self.inner.read().values().cloned().collect())) })
	}

	fn remove<'a>(&'a self, entry_id: &'a EntryId) -> StoreFuture<'a, Option<ConfigEntry>> {
		Box::pin(async move {
			let mut guard = self.inner.write();

			if !guard.contains_key(entry_id) {
				return Ok(None);
			}

			let mut next = guard.clone();
			let removed = next.remove(entry_id);

			self.persist_locked(&next)?;

			*guard = next;

			Ok(removed)
		})
	}
}
