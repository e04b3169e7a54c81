//! Logical entity keys and user identity.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix shared by every local-cache storage key.
pub const STORAGE_PREFIX: &str = "closetsync_";

/// Identifier of an authenticated user, as issued by the auth provider.
///
/// Remote document paths are always namespaced by a `UserId` supplied by
/// the caller at call time; no component caches one across sessions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Wraps a provider-issued identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for UserId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The closed set of entity collections kept in both stores.
///
/// Each key maps deterministically to a local-cache storage key and, in
/// the remote client, to a per-user document path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKey {
    /// The single per-user styling profile.
    UserProfile,
    /// The wardrobe item collection.
    Wardrobe,
    /// The ordered chat transcript.
    ChatHistory,
}

impl EntityKey {
    /// All synced entity keys.
    pub const ALL: [EntityKey; 3] = [
        EntityKey::UserProfile,
        EntityKey::Wardrobe,
        EntityKey::ChatHistory,
    ];

    /// The key this entity is stored under in the local cache.
    pub fn storage_key(&self) -> &'static str {
        match self {
            EntityKey::UserProfile => "closetsync_user_profile",
            EntityKey::Wardrobe => "closetsync_wardrobe",
            EntityKey::ChatHistory => "closetsync_chat_history",
        }
    }

    /// Resolves a local-cache storage key back to its entity key.
    pub fn from_storage_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.storage_key() == key)
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKey::UserProfile => "user-profile",
            EntityKey::Wardrobe => "wardrobe",
            EntityKey::ChatHistory => "chat-history",
        };
        f.write_str(name)
    }
}

impl FromStr for EntityKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user-profile" => Ok(EntityKey::UserProfile),
            "wardrobe" => Ok(EntityKey::Wardrobe),
            "chat-history" => Ok(EntityKey::ChatHistory),
            other => Err(format!("unknown entity key: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_keys_are_prefixed_and_distinct() {
        let mut seen = std::collections::HashSet::new();
        for key in EntityKey::ALL {
            let storage = key.storage_key();
            assert!(storage.starts_with(STORAGE_PREFIX));
            assert!(seen.insert(storage));
        }
    }

    #[test]
    fn storage_key_roundtrip() {
        for key in EntityKey::ALL {
            assert_eq!(EntityKey::from_storage_key(key.storage_key()), Some(key));
        }
        assert_eq!(EntityKey::from_storage_key("closetsync_gallery"), None);
    }

    #[test]
    fn display_parse_roundtrip() {
        for key in EntityKey::ALL {
            let parsed: EntityKey = key.to_string().parse().unwrap();
            assert_eq!(parsed, key);
        }
        assert!("gallery".parse::<EntityKey>().is_err());
    }

    #[test]
    fn user_id_is_transparent_in_json() {
        let id = UserId::new("u-123");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"u-123\"");
        let back: UserId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
