//! Integration tests for the sync coordinator over an in-memory remote.

use closetsync_engine::{AuthState, EngineConfig, EngineError, HybridStore, StoreEvent};
use closetsync_local::{LocalStore, MemoryBackend};
use closetsync_remote::{paths, DocumentClient, MemoryTransport, RemoteError};
use closetsync_testkit as testkit;
use closetsync_types::{EntityKey, UserId};
use parking_lot::Mutex;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

type TestStore = HybridStore<MemoryBackend, DocumentClient<MemoryTransport>>;

fn store_with(auth: AuthState) -> (TestStore, MemoryTransport) {
    testkit::init_tracing();
    let transport = MemoryTransport::new();
    let store = HybridStore::new(
        LocalStore::new(MemoryBackend::new()),
        DocumentClient::new(transport.clone()),
        auth,
        EngineConfig::default(),
    );
    (store, transport)
}

fn user() -> UserId {
    UserId::new("u1")
}

fn seed_remote_item(transport: &MemoryTransport, id: &str, name: &str) {
    let mut item = testkit::wardrobe_item(id);
    item.name = name.into();
    transport.insert_document(
        &paths::wardrobe_doc(&user(), id),
        serde_json::to_value(&item).unwrap(),
    );
}

async fn past_debounce() {
    tokio::time::sleep(Duration::from_millis(700)).await;
}

#[tokio::test(start_paused = true)]
async fn login_merge_unions_by_id_and_repushes() {
    let auth = AuthState::signed_out();
    let (store, transport) = store_with(auth.clone());

    // Items 1 and 2 were created before this device ever synced.
    store.save_wardrobe(&testkit::wardrobe(&["1", "2"]));

    // The cloud knows 2 (edited elsewhere) and 3.
    seed_remote_item(&transport, "2", "remote two");
    seed_remote_item(&transport, "3", "remote three");

    auth.sign_in(user());
    store.sync_from_cloud().await;

    // Union by id; the remote value wins for the shared id.
    let local = store.wardrobe();
    let mut ids: Vec<&str> = local.iter().map(|i| i.id.as_str()).collect();
    ids.sort();
    assert_eq!(ids, vec!["1", "2", "3"]);
    let two = local.iter().find(|i| i.id == "2").unwrap();
    assert_eq!(two.name, "remote two");

    // Item 1 was local-only, so a re-push was scheduled.
    assert_eq!(store.pending_keys(), vec![EntityKey::Wardrobe]);
    past_debounce().await;

    let mut remote_ids = transport.child_ids(&paths::wardrobe_collection(&user()));
    remote_ids.sort();
    assert_eq!(remote_ids, vec!["1", "2", "3"]);
}

#[tokio::test(start_paused = true)]
async fn unavailable_fetch_never_overwrites_local() {
    let (store, transport) = store_with(AuthState::signed_in(user()));

    store.save_wardrobe(&testkit::wardrobe(&["a"]));
    store.save_user_profile(&testkit::profile());
    store.save_chat_history(&testkit::chat_exchange());

    transport.set_offline(true);
    store.sync_from_cloud().await;

    assert_eq!(store.wardrobe().len(), 1);
    assert_eq!(store.user_profile(), testkit::profile());
    assert_eq!(store.chat_history(), testkit::chat_exchange());
    assert!(!store.sync_status());
}

#[tokio::test(start_paused = true)]
async fn permission_denied_degrades_to_local_only() {
    let (store, transport) = store_with(AuthState::signed_in(user()));

    store.save_wardrobe(&testkit::wardrobe(&["a"]));
    transport.set_denied(true);
    store.sync_from_cloud().await;

    assert_eq!(store.wardrobe().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn empty_remote_wardrobe_merges_instead_of_wiping() {
    // Policy test: reconciliation merges rather than replaces, so a
    // genuinely empty remote wardrobe must keep local items and push
    // them up, not clear them. (Replace-on-login was the historical
    // data-loss bug.)
    let auth = AuthState::signed_out();
    let (store, transport) = store_with(auth.clone());

    store.save_wardrobe(&testkit::wardrobe(&["a"]));

    auth.sign_in(user());
    store.sync_from_cloud().await;

    assert_eq!(store.wardrobe().len(), 1);
    past_debounce().await;
    assert_eq!(
        transport.child_ids(&paths::wardrobe_collection(&user())),
        vec!["a"]
    );
}

#[tokio::test(start_paused = true)]
async fn concurrent_reconciliation_runs_once() {
    let (store, transport) = store_with(AuthState::signed_in(user()));
    transport.set_latency(Duration::from_millis(20));

    let begun = Arc::new(Mutex::new(Vec::new()));
    {
        let begun = Arc::clone(&begun);
        store.subscribe(move |event| {
            if let StoreEvent::SyncStatus { active } = event {
                begun.lock().push(*active);
            }
        });
    }

    // The second call lands while the first is awaiting the transport.
    tokio::join!(store.sync_from_cloud(), store.sync_from_cloud());

    assert_eq!(*begun.lock(), vec![true, false]);
}

#[tokio::test(start_paused = true)]
async fn profile_and_chat_overwrite_on_login() {
    let auth = AuthState::signed_out();
    let (store, transport) = store_with(auth.clone());

    transport.insert_document(
        &paths::profile_doc(&user()),
        serde_json::to_value(testkit::profile()).unwrap(),
    );
    transport.insert_document(
        &paths::chat_doc(&user()),
        json!({"messages": serde_json::to_value(testkit::chat_exchange()).unwrap()}),
    );

    auth.sign_in(user());
    store.sync_from_cloud().await;

    assert_eq!(store.user_profile(), testkit::profile());
    assert_eq!(store.chat_history(), testkit::chat_exchange());
}

#[tokio::test(start_paused = true)]
async fn absent_remote_chat_keeps_local_transcript() {
    let (store, _transport) = store_with(AuthState::signed_in(user()));

    store.save_chat_history(&testkit::chat_exchange());
    store.sync_from_cloud().await;

    assert_eq!(store.chat_history(), testkit::chat_exchange());
}

#[tokio::test(start_paused = true)]
async fn auth_transition_triggers_reconciliation() {
    let auth = AuthState::signed_out();
    let (store, transport) = store_with(auth.clone());
    let _watcher = store.watch_auth();

    seed_remote_item(&transport, "cloud-item", "from the cloud");

    auth.sign_in(user());
    // Let the watcher task observe the transition and finish the pull.
    tokio::time::sleep(Duration::from_millis(10)).await;

    let local = store.wardrobe();
    assert_eq!(local.len(), 1);
    assert_eq!(local[0].id, "cloud-item");
}

#[tokio::test(start_paused = true)]
async fn offline_create_then_reconcile_end_to_end() {
    let (store, transport) = store_with(AuthState::signed_in(user()));

    // Signed in but offline: the write lands locally, the push fails.
    transport.set_offline(true);
    store.save_wardrobe(&testkit::wardrobe(&["a"]));
    past_debounce().await;

    assert_eq!(store.wardrobe().len(), 1);
    assert!(transport
        .child_ids(&paths::wardrobe_collection(&user()))
        .is_empty());

    // Back online: reconciliation finds the local-only item and the
    // scheduled re-push closes the gap.
    transport.set_offline(false);
    store.sync_from_cloud().await;
    past_debounce().await;

    assert_eq!(
        transport.child_ids(&paths::wardrobe_collection(&user())),
        vec!["a"]
    );
}

#[tokio::test(start_paused = true)]
async fn manual_sync_pushes_everything_concurrently() {
    let (store, transport) = store_with(AuthState::signed_in(user()));

    store.save_user_profile(&testkit::profile());
    store.save_wardrobe(&testkit::wardrobe(&["a", "b"]));
    store.save_chat_history(&testkit::chat_exchange());
    // Cancel the debounced pushes so only the manual sync writes.
    store.shutdown();

    store.sync_all_to_cloud().await.unwrap();

    assert!(transport.document(&paths::profile_doc(&user())).is_some());
    assert!(transport.document(&paths::chat_doc(&user())).is_some());
    let mut ids = transport.child_ids(&paths::wardrobe_collection(&user()));
    ids.sort();
    assert_eq!(ids, vec!["a", "b"]);
}

#[tokio::test(start_paused = true)]
async fn manual_sync_surfaces_failures() {
    let (store, transport) = store_with(AuthState::signed_in(user()));
    store.save_wardrobe(&testkit::wardrobe(&["a"]));
    store.shutdown();

    transport.set_offline(true);
    let err = store.sync_all_to_cloud().await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::Remote(RemoteError::Unavailable(_))
    ));
    // The status signal is reset even on failure.
    assert!(!store.sync_status());
}

#[tokio::test(start_paused = true)]
async fn manual_sync_requires_a_user() {
    let (store, _transport) = store_with(AuthState::signed_out());

    let err = store.sync_all_to_cloud().await.unwrap_err();
    assert!(matches!(err, EngineError::NotAuthenticated));
}
