#![cfg(all(feature = "test", feature = "reqwest"))]

// std
use std::time::{Duration as StdDuration, Instant};
// crates.io
use httpmock::prelude::*;
// self
use baemin_integration::{
	_preludet::*,
	address::AddressKind,
	auth::{AccountId, EntryId, LoginMethod, ProviderId, TokenRecord},
	http::ReqwestHttpClient,
	integration::Integration,
	oauth::ReqwestTransportErrorMapper,
	store::{ConfigEntry, EntryStore, MemoryStore},
};

type TestIntegration = Integration<ReqwestHttpClient, ReqwestTransportErrorMapper>;

const ADDRESSES: &str = r#"{"data":{
	"favoriteAddresses":[
		{"nickName":"집","address":{"title":"장은빌딩","sido":"서울특별시","gugun":"송파구","road":"위례성대로 2","detail":"3층"}},
		{"nickName":"회사","address":{"title":"루터회관","sido":"서울특별시","gugun":"송파구","road":"올림픽로35다길 42","detail":""}}
	],
	"normalAddresses":[
		{"nickName":null,"address":{"title":"잠실역","sido":"서울특별시","gugun":"송파구","road":"올림픽로 265","detail":""}}
	]
}}"#;

fn build(server: &MockServer, store: Arc<dyn EntryStore>) -> TestIntegration {
	let base = server.url("");
	let client = build_reqwest_test_client(
		mock_identity_descriptor(&base),
		mock_platform_descriptor(&base),
		"kakao-client-it",
	);

	Integration::new(Arc::new(client), store)
}

fn entry(account: &str, lifetime: Duration) -> ConfigEntry {
	let token =
		TokenRecord::builder(ProviderId::new("mock-baemin").expect("Provider fixture should be valid."))
			.access_token("baemin-access")
			.issued_at(OffsetDateTime::now_utc() - Duration::hours(2))
			.expires_in(lifetime)
			.build()
			.expect("Token fixture should build.");

	ConfigEntry::new(
		AccountId::new(account).expect("Account fixture should be valid."),
		"배민이",
		LoginMethod::Kakao,
		token,
	)
}

async fn seeded_store(entry: &ConfigEntry) -> Arc<dyn EntryStore> {
	let store = MemoryStore::default();

	store.save(entry.clone()).await.expect("Seeding the store should succeed.");

	Arc::new(store)
}

#[tokio::test]
async fn setup_entry_loads_addresses_and_builds_sensors() {
	let server = MockServer::start_async().await;
	let entry = entry("kakao_4242", Duration::days(30));
	let integration = build(&server, seeded_store(&entry).await);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/addresses").header("authorization", "Bearer baemin-access");
			then.status(200).header("content-type", "application/json").body(ADDRESSES);
		})
		.await;
	let sensors =
		integration.setup_entry(&entry.entry_id).await.expect("Entry setup should succeed.");

	mock.assert_async().await;

	let ids = sensors.iter().map(|sensor| sensor.unique_id.as_str()).collect::<Vec<_>>();

	assert_eq!(
		ids,
		vec!["kakao_4242_favaddr_집", "kakao_4242_favaddr_회사", "kakao_4242_noraddr_잠실역"]
	);
	assert_eq!(sensors[1].native_value, "서울특별시 송파구 올림픽로35다길 42");
	assert_eq!(sensors[2].kind, AddressKind::Normal);
	assert_eq!(integration.loaded_entries(), vec![entry.entry_id.clone()]);
	assert_eq!(integration.sensors(&entry.entry_id).expect("Entry should be loaded."), sensors);
	assert_eq!(integration.addresses(&entry.entry_id).map(|book| book.len()), Some(3));
	assert!(integration.refreshed_at(&entry.entry_id).is_some());
}

#[tokio::test]
async fn refresh_keeps_the_previous_snapshot_on_failure() {
	let server = MockServer::start_async().await;
	let entry = entry("kakao_4242", Duration::days(30));
	let integration = build(&server, seeded_store(&entry).await);
	let mut ok = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/addresses");
			then.status(200).header("content-type", "application/json").body(ADDRESSES);
		})
		.await;

	integration.setup_entry(&entry.entry_id).await.expect("Entry setup should succeed.");

	let loaded_at = integration.refreshed_at(&entry.entry_id);

	ok.delete_async().await;

	let _failing = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/addresses");
			then.status(502).body("bad gateway");
		})
		.await;
	let err = integration
		.refresh_entry(&entry.entry_id)
		.await
		.expect_err("A failing refresh should surface the error.");

	assert!(matches!(err, Error::Transient(_)), "Unexpected error: {err:?}.");
	assert_eq!(integration.refreshed_at(&entry.entry_id), loaded_at);
	assert_eq!(
		integration.sensors(&entry.entry_id).expect("Entry should stay loaded.").len(),
		3,
		"The previous snapshot must survive a failed refresh."
	);
}

#[tokio::test]
async fn expired_tokens_are_refused_before_calling_the_platform() {
	let server = MockServer::start_async().await;
	let entry = entry("kakao_4242", Duration::hours(1));
	let integration = build(&server, seeded_store(&entry).await);
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/addresses");
			then.status(200).header("content-type", "application/json").body(ADDRESSES);
		})
		.await;
	let err = integration
		.setup_entry(&entry.entry_id)
		.await
		.expect_err("Expired tokens should be refused.");

	assert!(matches!(err, Error::Unauthorized { .. }));
	assert!(integration.loaded_entries().is_empty());

	mock.assert_calls_async(0).await;
}

#[tokio::test]
async fn unknown_or_unloaded_entries_are_reported() {
	let server = MockServer::start_async().await;
	let integration = build(&server, Arc::new(MemoryStore::default()));
	let missing = EntryId::new("missing").expect("Entry fixture should be valid.");

	assert!(matches!(
		integration.setup_entry(&missing).await,
		Err(Error::EntryNotLoaded { ref entry_id }) if entry_id == &missing
	));
	assert!(matches!(
		integration.refresh_entry(&missing).await,
		Err(Error::EntryNotLoaded { .. })
	));
	assert!(matches!(integration.sensors(&missing), Err(Error::EntryNotLoaded { .. })));
	assert!(!integration.unload_entry(&missing));
}

#[tokio::test]
async fn unload_and_remove_drop_runtime_state_and_storage() {
	let server = MockServer::start_async().await;
	let entry = entry("kakao_4242", Duration::days(30));
	let store = seeded_store(&entry).await;
	let integration = build(&server, store.clone());
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/addresses");
			then.status(200).header("content-type", "application/json").body(ADDRESSES);
		})
		.await;

	integration.setup_entry(&entry.entry_id).await.expect("Entry setup should succeed.");

	assert!(integration.unload_entry(&entry.entry_id));
	assert!(integration.addresses(&entry.entry_id).is_none());
	assert!(
		store.fetch(&entry.entry_id).await.expect("Fetch should succeed.").is_some(),
		"Unloading must keep the stored entry."
	);

	integration.setup_entry(&entry.entry_id).await.expect("Reloading should succeed.");

	assert!(integration.remove_entry(&entry.entry_id).await.expect("Removal should succeed."));
	assert!(integration.loaded_entries().is_empty());
	assert!(store.fetch(&entry.entry_id).await.expect("Fetch should succeed.").is_none());
	assert!(!integration.remove_entry(&entry.entry_id).await.expect("Removal should succeed."));
}

#[tokio::test]
async fn concurrent_setups_of_one_entry_are_serialized() {
	let server = MockServer::start_async().await;
	let entry = entry("kakao_4242", Duration::days(30));
	let integration = Arc::new(build(&server, seeded_store(&entry).await));
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/addresses");
			then.status(200)
				.header("content-type", "application/json")
				.delay(StdDuration::from_millis(50))
				.body(ADDRESSES);
		})
		.await;
	let started = Instant::now();
	let tasks = (0..4)
		.map(|_| {
			let integration = integration.clone();
			let entry_id = entry.entry_id.clone();

			tokio::spawn(async move { integration.setup_entry(&entry_id).await })
		})
		.collect::<Vec<_>>();

	for task in tasks {
		let sensors =
			task.await.expect("Setup task should not panic.").expect("Setup should succeed.");

		assert_eq!(sensors.len(), 3);
	}

	let elapsed = started.elapsed();

	assert!(
		elapsed >= StdDuration::from_millis(200),
		"Four 50ms fetches of one entry must run one after another, took {elapsed:?}."
	);

	mock.assert_calls_async(4).await;

	assert_eq!(integration.loaded_entries(), vec![entry.entry_id.clone()]);
}

#[tokio::test]
async fn unloading_during_a_refresh_keeps_the_entry_unloaded() {
	let server = MockServer::start_async().await;
	let entry = entry("kakao_4242", Duration::days(30));
	let integration = Arc::new(build(&server, seeded_store(&entry).await));
	let mut quick = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/addresses");
			then.status(200).header("content-type", "application/json").body(ADDRESSES);
		})
		.await;

	integration.setup_entry(&entry.entry_id).await.expect("Entry setup should succeed.");
	quick.delete_async().await;

	let _slow = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/addresses");
			then.status(200)
				.header("content-type", "application/json")
				.delay(StdDuration::from_millis(300))
				.body(ADDRESSES);
		})
		.await;
	let refresh = {
		let integration = integration.clone();
		let entry_id = entry.entry_id.clone();

		tokio::spawn(async move { integration.refresh_entry(&entry_id).await })
	};

	tokio::time::sleep(StdDuration::from_millis(100)).await;

	assert!(integration.unload_entry(&entry.entry_id));

	let outcome = refresh.await.expect("Refresh task should not panic.");

	assert!(
		matches!(outcome, Err(Error::EntryNotLoaded { ref entry_id }) if entry_id == &entry.entry_id),
		"Unexpected refresh outcome: {outcome:?}."
	);
	assert!(integration.loaded_entries().is_empty());
	assert!(matches!(integration.sensors(&entry.entry_id), Err(Error::EntryNotLoaded { .. })));

	integration
		.setup_entry(&entry.entry_id)
		.await
		.expect("The entry should load again after an explicit setup.");

	assert_eq!(integration.loaded_entries(), vec![entry.entry_id.clone()]);
}

#[tokio::test]
async fn removing_during_a_setup_leaves_nothing_loaded() {
	let server = MockServer::start_async().await;
	let entry = entry("kakao_4242", Duration::days(30));
	let store = seeded_store(&entry).await;
	let integration = Arc::new(build(&server, store.clone()));
	let _slow = server
		.mock_async(|when, then| {
			when.method(GET).path("/v1/addresses");
			then.status(200)
				.header("content-type", "application/json")
				.delay(StdDuration::from_millis(300))
				.body(ADDRESSES);
		})
		.await;
	let setup = {
		let integration = integration.clone();
		let entry_id = entry.entry_id.clone();

		tokio::spawn(async move { integration.setup_entry(&entry_id).await })
	};

	tokio::time::sleep(StdDuration::from_millis(100)).await;

	assert!(integration.remove_entry(&entry.entry_id).await.expect("Removal should succeed."));

	let outcome = setup.await.expect("Setup task should not panic.");

	assert!(matches!(outcome, Err(Error::EntryNotLoaded { .. })), "Unexpected outcome: {outcome:?}.");
	assert!(integration.loaded_entries().is_empty());
	assert!(store.fetch(&entry.entry_id).await.expect("Fetch should succeed.").is_none());
}
