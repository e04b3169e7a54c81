//! The hybrid store: local-first writes with debounced cloud pushes.

use crate::auth::AuthState;
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::listeners::{ListenerId, ListenerSet, StoreEvent};
use crate::merge::merge_wardrobe;
use closetsync_local::{CacheBackend, LocalStore};
use closetsync_remote::{RemoteError, RemoteResult, RemoteStore};
use closetsync_types::{ChatMessage, EntityKey, UserId, UserProfile, WardrobeItem};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// The sync coordinator.
///
/// `HybridStore` is the sole mutation path over the two stores: UI and
/// business logic never write to the local cache or the remote store
/// directly, which is what preserves the notify-then-sync ordering.
///
/// A `HybridStore` is a cheap clone over shared inner state, so it can
/// be handed to tasks freely. Writes are synchronous against the local
/// cache; cloud work runs on spawned tasks, so callers that are signed
/// in must be running inside a Tokio runtime.
pub struct HybridStore<B: CacheBackend + 'static, R: RemoteStore> {
    inner: Arc<Inner<B, R>>,
}

impl<B: CacheBackend + 'static, R: RemoteStore> Clone for HybridStore<B, R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct Inner<B: CacheBackend + 'static, R: RemoteStore> {
    local: LocalStore<B>,
    remote: R,
    auth: AuthState,
    config: EngineConfig,
    listeners: ListenerSet,
    /// Observable sync-in-progress signal. Set by every sync entry
    /// point; last writer wins. A signal, not a lock.
    status: AtomicBool,
    /// Re-entrancy guard for `sync_from_cloud` only.
    reconciling: AtomicBool,
    pending: Mutex<HashMap<EntityKey, PendingPush>>,
    next_generation: AtomicU64,
}

/// One key's pending debounced push.
struct PendingPush {
    generation: u64,
    /// The value to push; `None` is a delete marker.
    value: Option<Value>,
    handle: Option<JoinHandle<()>>,
}

impl<B: CacheBackend + 'static, R: RemoteStore> HybridStore<B, R> {
    /// Creates a coordinator over the given stores and auth source.
    pub fn new(local: LocalStore<B>, remote: R, auth: AuthState, config: EngineConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                local,
                remote,
                auth,
                config,
                listeners: ListenerSet::new(),
                status: AtomicBool::new(false),
                reconciling: AtomicBool::new(false),
                pending: Mutex::new(HashMap::new()),
                next_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Spawns the task that reconciles from the cloud on every
    /// transition into a (different) signed-in user.
    ///
    /// Call once from the composition root, inside the runtime.
    pub fn watch_auth(&self) -> JoinHandle<()> {
        let store = self.clone();
        let mut receiver = self.inner.auth.subscribe();
        tokio::spawn(async move {
            let mut previous = receiver.borrow_and_update().clone();
            while receiver.changed().await.is_ok() {
                let current = receiver.borrow_and_update().clone();
                if current.is_some() && current != previous {
                    info!(user = ?current, "signed in, reconciling from cloud");
                    store.sync_from_cloud().await;
                }
                previous = current;
            }
        })
    }

    // Generic key/value surface.

    /// Writes `value` locally, notifies subscribers, and — iff a user is
    /// signed in right now — schedules a debounced cloud push.
    ///
    /// Returns the local-write success flag; the cloud push can never
    /// affect it.
    pub fn set_item(&self, key: EntityKey, value: Value) -> bool {
        let ok = self.inner.local.set_item(key.storage_key(), &value);
        self.inner.listeners.notify(&StoreEvent::Changed {
            key,
            value: value.clone(),
        });

        if self.inner.auth.current_user().is_some() {
            self.schedule_push(key, Some(value));
        }
        ok
    }

    /// Reads `key` from the local cache. Never touches the remote store.
    pub fn get_item(&self, key: EntityKey, default: Value) -> Value {
        self.inner.local.get_item(key.storage_key(), default)
    }

    /// Removes `key` locally, notifies subscribers, and schedules a
    /// debounced push of the delete marker.
    pub fn remove_item(&self, key: EntityKey) -> bool {
        let ok = self.inner.local.remove_item(key.storage_key());
        self.inner.listeners.notify(&StoreEvent::Removed { key });

        if self.inner.auth.current_user().is_some() {
            self.schedule_push(key, None);
        }
        ok
    }

    /// Clears the whole local cache. Cloud data is untouched.
    pub fn clear(&self) -> bool {
        self.inner.local.clear()
    }

    /// Registers a change listener. Fires on every local mutation and on
    /// sync-status transitions.
    pub fn subscribe(&self, callback: impl Fn(&StoreEvent) + Send + Sync + 'static) -> ListenerId {
        self.inner.listeners.subscribe(callback)
    }

    /// Removes a listener. Safe to call more than once.
    pub fn unsubscribe(&self, id: ListenerId) {
        self.inner.listeners.unsubscribe(id);
    }

    /// Whether a sync cycle is currently running.
    pub fn sync_status(&self) -> bool {
        self.inner.status.load(Ordering::SeqCst)
    }

    /// Entity keys with a push currently waiting out its debounce window.
    pub fn pending_keys(&self) -> Vec<EntityKey> {
        self.inner.pending.lock().keys().copied().collect()
    }

    // Entity-typed convenience, mirroring the local store's accessors.

    /// The cached user profile.
    pub fn user_profile(&self) -> UserProfile {
        self.inner.local.user_profile()
    }

    /// Writes the user profile through the hybrid path.
    pub fn save_user_profile(&self, profile: &UserProfile) -> bool {
        self.set_entity(EntityKey::UserProfile, profile)
    }

    /// The cached wardrobe.
    pub fn wardrobe(&self) -> Vec<WardrobeItem> {
        self.inner.local.wardrobe()
    }

    /// Writes the wardrobe collection through the hybrid path.
    pub fn save_wardrobe(&self, items: &[WardrobeItem]) -> bool {
        self.set_entity(EntityKey::Wardrobe, &items)
    }

    /// The cached chat transcript.
    pub fn chat_history(&self) -> Vec<ChatMessage> {
        self.inner.local.chat_history()
    }

    /// Writes the chat transcript through the hybrid path.
    pub fn save_chat_history(&self, messages: &[ChatMessage]) -> bool {
        self.set_entity(EntityKey::ChatHistory, &messages)
    }

    fn set_entity<T: Serialize + ?Sized>(&self, key: EntityKey, entity: &T) -> bool {
        match serde_json::to_value(entity) {
            Ok(value) => self.set_item(key, value),
            Err(e) => {
                error!(key = %key, error = %e, "could not encode entity");
                false
            }
        }
    }

    // Sync entry points.

    /// Pulls every synced entity from the cloud and reconciles it into
    /// the local cache. Invoked on sign-in and by manual triggers.
    ///
    /// Idempotent: a call while a reconciliation is already running is a
    /// no-op. Each entity is guarded independently — one failed fetch
    /// never aborts the others, and the status signal is always reset.
    pub async fn sync_from_cloud(&self) {
        let Some(user) = self.inner.auth.current_user() else {
            debug!("skipping cloud reconciliation: signed out");
            return;
        };
        if self
            .inner
            .reconciling
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("cloud reconciliation already in progress");
            return;
        }

        info!(user = %user, "reconciling from cloud");
        self.set_status(true);

        self.pull_profile(&user).await;
        self.pull_wardrobe(&user).await;
        self.pull_chat_history(&user).await;

        self.inner.reconciling.store(false, Ordering::SeqCst);
        self.set_status(false);
    }

    /// Force-pushes all three synced entity types to the cloud,
    /// concurrently, skipping empty collections.
    ///
    /// This is the manual "sync now" path: unlike background pushes,
    /// failures propagate to the caller.
    pub async fn sync_all_to_cloud(&self) -> EngineResult<()> {
        let Some(user) = self.inner.auth.current_user() else {
            return Err(EngineError::NotAuthenticated);
        };

        self.set_status(true);
        let result = self.push_everything(&user).await;
        self.set_status(false);

        if let Err(e) = &result {
            warn!(user = %user, error = %e, "manual cloud sync failed");
        }
        result
    }

    /// Runs every pending debounced push immediately.
    pub async fn flush_pending(&self) {
        let drained: Vec<(EntityKey, Option<Value>)> = {
            let mut pending = self.inner.pending.lock();
            pending
                .drain()
                .map(|(key, slot)| {
                    if let Some(handle) = slot.handle {
                        handle.abort();
                    }
                    (key, slot.value)
                })
                .collect()
        };

        for (key, value) in drained {
            self.push_to_cloud(key, value).await;
        }
    }

    /// Cancels every pending debounced push without running it.
    pub fn shutdown(&self) {
        let mut pending = self.inner.pending.lock();
        for (_, slot) in pending.drain() {
            if let Some(handle) = slot.handle {
                handle.abort();
            }
        }
    }

    // Debounced push machinery.

    /// Schedules (or reschedules) the cloud push for `key`. The pending
    /// slot carries the captured value; a newer write replaces it, so
    /// only the last value set within the window is pushed.
    fn schedule_push(&self, key: EntityKey, value: Option<Value>) {
        let generation = self.inner.next_generation.fetch_add(1, Ordering::SeqCst);

        {
            let mut pending = self.inner.pending.lock();
            if let Some(previous) = pending.insert(
                key,
                PendingPush {
                    generation,
                    value,
                    handle: None,
                },
            ) {
                if let Some(handle) = previous.handle {
                    handle.abort();
                }
            }
        }

        let store = self.clone();
        let delay = self.inner.config.debounce;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let Some(value) = store.take_pending(key, generation) else {
                // Superseded by a newer write while sleeping.
                return;
            };
            store.push_to_cloud(key, value).await;
        });

        let mut pending = self.inner.pending.lock();
        match pending.get_mut(&key) {
            Some(slot) if slot.generation == generation => slot.handle = Some(handle),
            // Superseded or already fired; the task exits on its own.
            _ => {}
        }
    }

    /// Claims the pending slot for `key` if it still belongs to
    /// `generation`. Clearing the slot here is what keeps a fired timer
    /// from ever re-pushing a stale value.
    fn take_pending(&self, key: EntityKey, generation: u64) -> Option<Option<Value>> {
        let mut pending = self.inner.pending.lock();
        match pending.get(&key) {
            Some(slot) if slot.generation == generation => {
                pending.remove(&key).map(|slot| slot.value)
            }
            _ => None,
        }
    }

    /// Pushes one key's value to the cloud. Background path: failures
    /// degrade to logs, never to the caller.
    async fn push_to_cloud(&self, key: EntityKey, value: Option<Value>) {
        // Resolve the user at push time, not capture time: a sign-out
        // during the debounce window must cancel the push.
        let Some(user) = self.inner.auth.current_user() else {
            debug!(key = %key, "skipping cloud push: signed out");
            return;
        };

        self.set_status(true);
        match self.push_value(&user, key, value).await {
            Ok(()) => debug!(key = %key, "pushed to cloud"),
            Err(e) if e.is_unavailable() => {
                info!(key = %key, "cloud unavailable, keeping local only");
            }
            Err(e) if e.is_permission_denied() => {
                warn!(key = %key, error = %e, "cloud push rejected by access rules");
            }
            Err(e) => error!(key = %key, error = %e, "cloud push failed"),
        }
        self.set_status(false);
    }

    async fn push_value(
        &self,
        user: &UserId,
        key: EntityKey,
        value: Option<Value>,
    ) -> RemoteResult<()> {
        let Some(value) = value else {
            // Whole-collection deletes are not propagated; wardrobe
            // deletions reach the remote through the next full-diff push
            // of the surviving item list.
            debug!(key = %key, "not propagating collection removal to cloud");
            return Ok(());
        };

        match key {
            EntityKey::UserProfile => {
                let profile: UserProfile = serde_json::from_value(value)?;
                self.inner.remote.save_user_profile(user, &profile).await
            }
            EntityKey::Wardrobe => {
                let items: Vec<WardrobeItem> = serde_json::from_value(value)?;
                self.inner.remote.sync_wardrobe(user, &items).await
            }
            EntityKey::ChatHistory => {
                let messages: Vec<ChatMessage> = serde_json::from_value(value)?;
                self.inner.remote.save_chat_history(user, &messages).await
            }
        }
    }

    // Reconciliation steps, each independently guarded.

    async fn pull_profile(&self, user: &UserId) {
        match self.inner.remote.get_user_profile(user).await {
            Ok(Some(profile)) => {
                if self.inner.local.save_user_profile(&profile) {
                    self.notify_changed(EntityKey::UserProfile, &profile);
                }
            }
            Ok(None) => debug!("no cloud profile yet"),
            Err(e) => self.log_pull_failure(EntityKey::UserProfile, &e),
        }
    }

    async fn pull_wardrobe(&self, user: &UserId) {
        match self.inner.remote.get_wardrobe(user).await {
            Ok(remote_items) => {
                let merged = merge_wardrobe(remote_items, self.inner.local.wardrobe());
                if self.inner.local.save_wardrobe(&merged.items) {
                    self.notify_changed(EntityKey::Wardrobe, &merged.items);
                }

                if merged.local_only > 0 {
                    // The remote store has never seen these items; push
                    // the merged set back so it catches up.
                    info!(
                        local_only = merged.local_only,
                        "wardrobe has items the cloud is missing, scheduling re-push"
                    );
                    match serde_json::to_value(&merged.items) {
                        Ok(value) => self.schedule_push(EntityKey::Wardrobe, Some(value)),
                        Err(e) => error!(error = %e, "could not encode merged wardrobe"),
                    }
                }
            }
            Err(e) => self.log_pull_failure(EntityKey::Wardrobe, &e),
        }
    }

    async fn pull_chat_history(&self, user: &UserId) {
        match self.inner.remote.get_chat_history(user).await {
            Ok(messages) if !messages.is_empty() => {
                if self.inner.local.save_chat_history(&messages) {
                    self.notify_changed(EntityKey::ChatHistory, &messages);
                }
            }
            Ok(_) => debug!("no cloud chat history yet"),
            Err(e) => self.log_pull_failure(EntityKey::ChatHistory, &e),
        }
    }

    async fn push_everything(&self, user: &UserId) -> EngineResult<()> {
        let profile = self.inner.local.user_profile();
        let wardrobe = self.inner.local.wardrobe();
        let chat = self.inner.local.chat_history();

        tokio::try_join!(
            async {
                if profile.is_empty() {
                    Ok(())
                } else {
                    self.inner.remote.save_user_profile(user, &profile).await
                }
            },
            async {
                if wardrobe.is_empty() {
                    Ok(())
                } else {
                    self.inner.remote.sync_wardrobe(user, &wardrobe).await
                }
            },
            async {
                if chat.is_empty() {
                    Ok(())
                } else {
                    self.inner.remote.save_chat_history(user, &chat).await
                }
            },
        )?;
        Ok(())
    }

    fn notify_changed<T: Serialize>(&self, key: EntityKey, entity: &T) {
        match serde_json::to_value(entity) {
            Ok(value) => self
                .inner
                .listeners
                .notify(&StoreEvent::Changed { key, value }),
            Err(e) => error!(key = %key, error = %e, "could not encode change notification"),
        }
    }

    fn log_pull_failure(&self, key: EntityKey, error: &RemoteError) {
        if error.is_unavailable() {
            info!(key = %key, "cloud unavailable, keeping local data");
        } else if error.is_permission_denied() {
            warn!(key = %key, error = %error, "cloud fetch rejected by access rules");
        } else {
            error!(key = %key, error = %error, "cloud fetch failed, keeping local data");
        }
    }

    fn set_status(&self, active: bool) {
        self.inner.status.store(active, Ordering::SeqCst);
        self.inner.listeners.notify(&StoreEvent::SyncStatus { active });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use closetsync_local::MemoryBackend;
    use closetsync_remote::{paths, DocumentClient, MemoryTransport};
    use closetsync_types::Category;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    type TestStore = HybridStore<MemoryBackend, DocumentClient<MemoryTransport>>;

    fn store_with(auth: AuthState) -> (TestStore, MemoryTransport) {
        let transport = MemoryTransport::new();
        let store = HybridStore::new(
            LocalStore::new(MemoryBackend::new()),
            DocumentClient::new(transport.clone()),
            auth,
            EngineConfig::default(),
        );
        (store, transport)
    }

    fn signed_in() -> AuthState {
        AuthState::signed_in(UserId::new("u1"))
    }

    fn item(id: &str) -> WardrobeItem {
        WardrobeItem {
            id: id.into(),
            ..WardrobeItem::new("item", Category::Tops)
        }
    }

    async fn past_debounce() {
        tokio::time::sleep(crate::config::DEFAULT_DEBOUNCE + Duration::from_millis(100)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn read_after_write_is_immediate() {
        let (store, _) = store_with(signed_in());

        assert!(store.set_item(EntityKey::Wardrobe, json!([{"id": "a"}])));
        // Before any debounce delay elapses.
        let value = store.get_item(EntityKey::Wardrobe, json!([]));
        assert_eq!(value[0]["id"], "a");
    }

    #[tokio::test(start_paused = true)]
    async fn every_write_notifies_exactly_once_synchronously() {
        let (store, _) = store_with(signed_in());
        let notifications = Arc::new(AtomicUsize::new(0));
        {
            let notifications = Arc::clone(&notifications);
            store.subscribe(move |event| {
                if matches!(event, StoreEvent::Changed { .. } | StoreEvent::Removed { .. }) {
                    notifications.fetch_add(1, Ordering::SeqCst);
                }
            });
        }

        store.set_item(EntityKey::ChatHistory, json!([]));
        // Synchronous: observed before set_item's caller awaits anything.
        assert_eq!(notifications.load(Ordering::SeqCst), 1);

        store.remove_item(EntityKey::ChatHistory);
        assert_eq!(notifications.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn signed_out_writes_never_touch_the_cloud() {
        let (store, transport) = store_with(AuthState::signed_out());

        store.save_wardrobe(&[item("a")]);
        past_debounce().await;

        assert_eq!(transport.doc_write_count(), 0);
        assert!(store.pending_keys().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_writes_coalesce_into_one_push_with_the_last_value() {
        let (store, transport) = store_with(signed_in());

        store.save_chat_history(&[ChatMessage::user("v1")]);
        store.save_chat_history(&[ChatMessage::user("v2")]);
        store.save_chat_history(&[ChatMessage::user("v3")]);
        assert_eq!(store.pending_keys(), vec![EntityKey::ChatHistory]);

        past_debounce().await;

        assert_eq!(transport.doc_write_count(), 1);
        let doc = transport
            .document(&paths::chat_doc(&UserId::new("u1")))
            .unwrap();
        assert_eq!(doc["messages"][0]["content"], "v3");
        assert!(store.pending_keys().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn a_new_write_restarts_the_window() {
        let (store, transport) = store_with(signed_in());

        store.save_chat_history(&[ChatMessage::user("first")]);
        // Just before the first window closes, write again.
        tokio::time::sleep(Duration::from_millis(400)).await;
        store.save_chat_history(&[ChatMessage::user("second")]);

        // 400ms later the first window would have fired; the restart
        // means nothing has been pushed yet.
        tokio::time::sleep(Duration::from_millis(400)).await;
        assert_eq!(transport.doc_write_count(), 0);

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(transport.doc_write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn collection_removal_is_local_only() {
        let (store, transport) = store_with(signed_in());

        store.save_wardrobe(&[item("a")]);
        past_debounce().await;
        assert!(!transport
            .child_ids(&paths::wardrobe_collection(&UserId::new("u1")))
            .is_empty());

        assert!(store.remove_item(EntityKey::Wardrobe));
        past_debounce().await;

        // The local cache dropped the key; the remote kept its items.
        assert!(store.wardrobe().is_empty());
        assert!(!transport
            .child_ids(&paths::wardrobe_collection(&UserId::new("u1")))
            .is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn sign_out_during_the_window_cancels_the_push() {
        let auth = signed_in();
        let (store, transport) = store_with(auth.clone());

        store.save_chat_history(&[ChatMessage::user("secret")]);
        auth.sign_out();
        past_debounce().await;

        assert_eq!(transport.doc_write_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn sync_status_signals_wrap_reconciliation() {
        let (store, _) = store_with(signed_in());
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        {
            let seen = Arc::clone(&seen);
            store.subscribe(move |event| {
                if let StoreEvent::SyncStatus { active } = event {
                    seen.lock().push(*active);
                }
            });
        }

        assert!(!store.sync_status());
        store.sync_from_cloud().await;
        assert!(!store.sync_status());
        assert_eq!(*seen.lock(), vec![true, false]);
    }

    #[tokio::test(start_paused = true)]
    async fn flush_pending_pushes_immediately() {
        let (store, transport) = store_with(signed_in());

        store.save_chat_history(&[ChatMessage::user("now")]);
        store.flush_pending().await;

        assert_eq!(transport.doc_write_count(), 1);
        assert!(store.pending_keys().is_empty());

        // The aborted timer must not fire a second push later.
        past_debounce().await;
        assert_eq!(transport.doc_write_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_drops_pending_pushes() {
        let (store, transport) = store_with(signed_in());

        store.save_chat_history(&[ChatMessage::user("doomed")]);
        store.shutdown();
        past_debounce().await;

        assert_eq!(transport.doc_write_count(), 0);
        assert!(store.pending_keys().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn background_push_failure_does_not_surface() {
        let (store, transport) = store_with(signed_in());
        transport.set_offline(true);

        // The local write still succeeds and the value survives locally.
        assert!(store.save_wardrobe(&[item("a")]));
        past_debounce().await;

        assert_eq!(store.wardrobe().len(), 1);
        assert_eq!(transport.doc_write_count(), 0);
    }
}
