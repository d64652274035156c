// crates.io
use time::{Duration, OffsetDateTime, macros};
// self
use baemin_integration::{
	auth::{AccountId, EntryId, LoginMethod, ProviderId, TokenRecord, TokenSecret},
	store::{ConfigEntry, EntryStore, MemoryStore},
};

fn build_entry(account: &str, access: &str, created_at: OffsetDateTime) -> ConfigEntry {
	let token = TokenRecord::builder(
		ProviderId::new("baemin").expect("Failed to build provider identifier for store tests."),
	)
	.access_token(access)
	.issued_at(created_at)
	.expires_in(Duration::days(30))
	.build()
	.expect("Token record fixture should build successfully.");
	let mut entry = ConfigEntry::new(
		AccountId::new(account).expect("Failed to build account identifier for store tests."),
		"배민이",
		LoginMethod::Kakao,
		token,
	);

	entry.created_at = created_at;

	entry
}

#[tokio::test]
async fn save_fetch_and_find_round_trip() {
	let store = MemoryStore::default();
	let entry = build_entry("kakao_1", "access-1", macros::datetime!(2025-11-10 12:00 UTC));

	store.save(entry.clone()).await.expect("Saving entry into memory store should succeed.");

	let fetched = store
		.fetch(&entry.entry_id)
		.await
		.expect("Fetching entry from memory store should succeed.")
		.expect("Stored entry should remain present.");

	assert_eq!(fetched, entry);

	let found = store
		.find_by_unique_id(&entry.unique_id)
		.await
		.expect("Looking up by account should succeed.")
		.expect("Entry should be found by its account.");

	assert_eq!(found.entry_id, entry.entry_id);

	let stranger = AccountId::new("kakao_2").expect("Account fixture should be valid.");

	assert!(
		store
			.find_by_unique_id(&stranger)
			.await
			.expect("Looking up an unknown account should succeed.")
			.is_none()
	);
}

#[tokio::test]
async fn save_replaces_entries_with_the_same_id() {
	let store = MemoryStore::default();
	let entry = build_entry("kakao_1", "access-old", macros::datetime!(2025-11-10 12:00 UTC));

	store.save(entry.clone()).await.expect("Saving initial entry should succeed.");

	let mut updated = entry.clone();

	updated.title = "새 이름".into();
	updated.token.access_token = TokenSecret::new("access-new");

	store.save(updated).await.expect("Saving replacement entry should succeed.");

	let listed = store.list().await.expect("Listing entries should succeed.");

	assert_eq!(listed.len(), 1);
	assert_eq!(listed[0].title, "새 이름");
	assert_eq!(listed[0].token.access_token.expose(), "access-new");
}

#[tokio::test]
async fn list_is_oldest_first_and_remove_returns_the_entry() {
	let store = MemoryStore::default();
	let newer = build_entry("kakao_2", "access-2", macros::datetime!(2025-11-11 08:00 UTC));
	let older = build_entry("kakao_1", "access-1", macros::datetime!(2025-11-10 12:00 UTC));

	store.save(newer.clone()).await.expect("Saving newer entry should succeed.");
	store.save(older.clone()).await.expect("Saving older entry should succeed.");

	let ids = store
		.list()
		.await
		.expect("Listing entries should succeed.")
		.into_iter()
		.map(|entry| entry.entry_id)
		.collect::<Vec<_>>();

	assert_eq!(ids, vec![older.entry_id.clone(), newer.entry_id.clone()]);

	let removed = store
		.remove(&older.entry_id)
		.await
		.expect("Removing an entry should succeed.")
		.expect("Removed entry should be returned.");

	assert_eq!(removed, older);
	assert!(
		store.remove(&older.entry_id).await.expect("Removing twice should succeed.").is_none()
	);

	let missing = EntryId::new("missing").expect("Entry fixture should be valid.");

	assert!(store.fetch(&missing).await.expect("Fetching should succeed.").is_none());
	assert_eq!(store.list().await.expect("Listing entries should succeed."), vec![newer]);
}

#[tokio::test]
async fn concurrent_saves_keep_every_entry() {
	let store = MemoryStore::default();
	let tasks = (0..8)
		.map(|idx| {
			let store = store.clone();

			tokio::spawn(async move {
				let entry = build_entry(
					&format!("kakao_{idx}"),
					&format!("access-{idx}"),
					OffsetDateTime::now_utc(),
				);

				store.save(entry).await.expect("Concurrent save should succeed.");
			})
		})
		.collect::<Vec<_>>();

	for task in tasks {
		task.await.expect("Save task should not panic.");
	}

	assert_eq!(store.list().await.expect("Listing entries should succeed.").len(), 8);

	let account = AccountId::new("kakao_3").expect("Account fixture should be valid.");

	assert!(
		store
			.find_by_unique_id(&account)
			.await
			.expect("Lookup should succeed.")
			.is_some_and(|entry| entry.token.access_token.expose() == "access-3")
	);
}
