//! Entry lifecycle: load an entry, keep its address snapshot, expose sensors.

// std
use std::sync::atomic::{AtomicU64, Ordering};
// self
use crate::{
	_prelude::*,
	address::AddressBook,
	auth::EntryId,
	flows::Client,
	http::TokenHttpClient,
	oauth::TransportErrorMapper,
	obs,
	sensor::{self, AddressSensor},
	store::{ConfigEntry, EntryStore},
};

// Serializes fetches of one entry. `generation` moves on every unload so a fetch that
// started before the unload cannot put the entry back.
#[derive(Debug, Default)]
struct EntryGuard {
	serial: AsyncMutex<()>,
	generation: AtomicU64,
}

#[derive(Clone, Debug)]
struct LoadedEntry {
	entry: ConfigEntry,
	addresses: AddressBook,
	refreshed_at: OffsetDateTime,
}

/// Runtime state for every loaded entry.
///
/// Address fetches for the same entry are serialized through a per-entry async guard;
/// different entries proceed independently.
pub struct Integration<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	client: Arc<Client<C, M>>,
	store: Arc<dyn EntryStore>,
	loaded: RwLock<HashMap<EntryId, LoadedEntry>>,
	guards: Mutex<HashMap<EntryId, Arc<EntryGuard>>>,
}
impl<C, M> Integration<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	/// Creates an integration reading entries from `store`.
	pub fn new(client: Arc<Client<C, M>>, store: Arc<dyn EntryStore>) -> Self {
		Self {
			client,
			store,
			loaded: RwLock::new(HashMap::new()),
			guards: Mutex::new(HashMap::new()),
		}
	}

	/// Loads an entry, fetches its addresses, and returns its sensors.
	///
	/// Loading an already loaded entry re-fetches and replaces its snapshot.
	pub async fn setup_entry(&self, entry_id: &EntryId) -> Result<Vec<AddressSensor>> {
		let guard = self.guard(entry_id);
		let _serialized = guard.serial.lock().await;
		let entry = self
			.store
			.fetch(entry_id)
			.await?
			.ok_or_else(|| Error::EntryNotLoaded { entry_id: entry_id.clone() })?;

		self.load(entry, &guard).await
	}

	/// Re-fetches the addresses of a loaded entry.
	///
	/// On failure the previous snapshot stays in place.
	pub async fn refresh_entry(&self, entry_id: &EntryId) -> Result<Vec<AddressSensor>> {
		let guard = self.guard(entry_id);
		let _serialized = guard.serial.lock().await;
		let entry = self
			.loaded
			.read()
			.get(entry_id)
			.map(|loaded| loaded.entry.clone())
			.ok_or_else(|| Error::EntryNotLoaded { entry_id: entry_id.clone() })?;

		self.load(entry, &guard).await
	}

	/// Sensors for the current snapshot of a loaded entry.
	pub fn sensors(&self, entry_id: &EntryId) -> Result<Vec<AddressSensor>> {
		let loaded = self.loaded.read();
		let state = loaded
			.get(entry_id)
			.ok_or_else(|| Error::EntryNotLoaded { entry_id: entry_id.clone() })?;

		Ok(sensor::build_sensors(&state.entry, &state.addresses))
	}

	/// Current address snapshot of a loaded entry.
	pub fn addresses(&self, entry_id: &EntryId) -> Option<AddressBook> {
		self.loaded.read().get(entry_id).map(|loaded| loaded.addresses.clone())
	}

	/// When the snapshot of a loaded entry was last fetched.
	pub fn refreshed_at(&self, entry_id: &EntryId) -> Option<OffsetDateTime> {
		self.loaded.read().get(entry_id).map(|loaded| loaded.refreshed_at)
	}

	/// Ids of every loaded entry.
	pub fn loaded_entries(&self) -> Vec<EntryId> {
		let mut ids = self.loaded.read().keys().cloned().collect::<Vec<_>>();

		ids.sort();

		ids
	}

	/// Drops the runtime state of an entry. Returns `false` when it was not loaded.
	///
	/// A fetch still in flight for the entry finishes without reloading it.
	pub fn unload_entry(&self, entry_id: &EntryId) -> bool {
		let unloaded = {
			let mut loaded = self.loaded.write();

			if let Some(guard) = self.guards.lock().get(entry_id) {
				guard.generation.fetch_add(1, Ordering::SeqCst);
			}

			loaded.remove(entry_id).is_some()
		};

		self.prune_guard(entry_id);

		if unloaded {
			obs::clear_address_snapshot(entry_id);
		}

		unloaded
	}

	/// Unloads an entry and deletes it from the store.
	pub async fn remove_entry(&self, entry_id: &EntryId) -> Result<bool> {
		self.unload_entry(entry_id);

		Ok(self.store.remove(entry_id).await?.is_some())
	}

	async fn load(&self, entry: ConfigEntry, guard: &EntryGuard) -> Result<Vec<AddressSensor>> {
		let generation = guard.generation.load(Ordering::SeqCst);

		if entry.token.is_expired() {
			obs::trace_warning("platform token expired; the account must be linked again");

			return Err(Error::Unauthorized { reason: "platform token expired".into() });
		}

		let addresses = self.client.fetch_addresses(&entry.token).await?;
		let sensors = sensor::build_sensors(&entry, &addresses);
		let entry_id = entry.entry_id.clone();

		{
			let mut loaded = self.loaded.write();

			if guard.generation.load(Ordering::SeqCst) != generation {
				return Err(Error::EntryNotLoaded { entry_id });
			}

			let refreshed_at = OffsetDateTime::now_utc();

			loaded.insert(
				entry_id.clone(),
				LoadedEntry { entry, addresses: addresses.clone(), refreshed_at },
			);
		}

		obs::record_address_snapshot(&entry_id, &addresses);

		Ok(sensors)
	}

	fn guard(&self, entry_id: &EntryId) -> Arc<EntryGuard> {
		self.guards.lock().entry(entry_id.clone()).or_default().clone()
	}

	// A guard cloned by any caller is held or awaited; only idle guards are dropped.
	fn prune_guard(&self, entry_id: &EntryId) {
		let mut guards = self.guards.lock();

		if guards.get(entry_id).is_some_and(|guard| Arc::strong_count(guard) == 1) {
			guards.remove(entry_id);
		}
	}
}
impl<C, M> Debug for Integration<C, M>
where
	C: ?Sized + TokenHttpClient,
	M: ?Sized + TransportErrorMapper<C::TransportError>,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("Integration")
			.field("client", &self.client)
			.field("loaded", &self.loaded_entries())
			.finish_non_exhaustive()
	}
}
