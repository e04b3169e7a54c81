//! The never-throw JSON store over a cache backend.

use crate::backend::CacheBackend;
use closetsync_types::{ChatMessage, EntityKey, UserProfile, WardrobeItem};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{error, warn};

/// The local cache store.
///
/// `LocalStore` is the synchronous, always-available half of the hybrid
/// storage pair. Its contract is that **no operation ever panics or
/// propagates an error**: serialization or backend failures are logged
/// and surface as `false` (writes) or the supplied default (reads).
///
/// The generic `set_item`/`get_item`/`remove_item` API works on raw
/// [`Value`]s keyed by storage key; the entity-typed accessors wrap it
/// with per-entity defaults (`{}` for the profile, `[]` for collections)
/// and lenient decoding.
pub struct LocalStore<B: CacheBackend> {
    backend: Mutex<B>,
}

impl<B: CacheBackend> LocalStore<B> {
    /// Creates a store over the given backend.
    pub fn new(backend: B) -> Self {
        Self {
            backend: Mutex::new(backend),
        }
    }

    /// Stores `value` under `key`. Returns false (and logs) on failure.
    pub fn set_item(&self, key: &str, value: &Value) -> bool {
        let bytes = match serde_json::to_vec(value) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!(key, error = %e, "failed to serialize value for local cache");
                return false;
            }
        };

        match self.backend.lock().write(key, &bytes) {
            Ok(()) => true,
            Err(e) => {
                error!(key, error = %e, "failed to write local cache");
                false
            }
        }
    }

    /// Reads the value stored under `key`, or `default` if the key is
    /// absent or unreadable.
    pub fn get_item(&self, key: &str, default: Value) -> Value {
        match self.backend.lock().read(key) {
            Ok(Some(bytes)) => match serde_json::from_slice(&bytes) {
                Ok(value) => value,
                Err(e) => {
                    warn!(key, error = %e, "corrupt value in local cache, using default");
                    default
                }
            },
            Ok(None) => default,
            Err(e) => {
                error!(key, error = %e, "failed to read local cache");
                default
            }
        }
    }

    /// Removes the value stored under `key`. Returns false on failure.
    pub fn remove_item(&self, key: &str) -> bool {
        match self.backend.lock().remove(key) {
            Ok(()) => true,
            Err(e) => {
                error!(key, error = %e, "failed to remove local cache entry");
                false
            }
        }
    }

    /// Removes every stored value. Returns false on failure.
    pub fn clear(&self) -> bool {
        match self.backend.lock().clear() {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "failed to clear local cache");
                false
            }
        }
    }

    // Entity-typed accessors.

    /// The cached user profile, or an empty profile.
    pub fn user_profile(&self) -> UserProfile {
        self.typed_or_default(EntityKey::UserProfile.storage_key())
    }

    /// Stores the user profile.
    pub fn save_user_profile(&self, profile: &UserProfile) -> bool {
        self.save_typed(EntityKey::UserProfile.storage_key(), profile)
    }

    /// The cached wardrobe, or an empty collection.
    pub fn wardrobe(&self) -> Vec<WardrobeItem> {
        self.typed_or_default(EntityKey::Wardrobe.storage_key())
    }

    /// Stores the wardrobe collection.
    pub fn save_wardrobe(&self, items: &[WardrobeItem]) -> bool {
        self.save_typed(EntityKey::Wardrobe.storage_key(), &items)
    }

    /// The cached chat transcript, or an empty one.
    pub fn chat_history(&self) -> Vec<ChatMessage> {
        self.typed_or_default(EntityKey::ChatHistory.storage_key())
    }

    /// Stores the chat transcript.
    pub fn save_chat_history(&self, messages: &[ChatMessage]) -> bool {
        self.save_typed(EntityKey::ChatHistory.storage_key(), &messages)
    }

    fn typed_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        let value = self.get_item(key, Value::Null);
        if value.is_null() {
            return T::default();
        }
        match serde_json::from_value(value) {
            Ok(entity) => entity,
            Err(e) => {
                warn!(key, error = %e, "cached value does not match the entity shape, using default");
                T::default()
            }
        }
    }

    fn save_typed<T: Serialize + ?Sized>(&self, key: &str, entity: &T) -> bool {
        match serde_json::to_value(entity) {
            Ok(value) => self.set_item(key, &value),
            Err(e) => {
                error!(key, error = %e, "failed to serialize entity for local cache");
                false
            }
        }
    }
}
