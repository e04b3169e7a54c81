//! # ClosetSync Types
//!
//! Shared entity model for ClosetSync.
//!
//! This crate defines the vocabulary every other ClosetSync crate speaks:
//! - Logical entity keys and user identity
//! - The synced entities (profile, wardrobe, chat history)
//! - The remote-only entities (gallery items, usage counters)
//!
//! Entities are plain serde types. They carry no storage logic; the local
//! cache and the remote client decide how they are persisted.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod entity;
mod keys;
mod usage;

pub use entity::{Category, ChatMessage, GalleryItem, Role, UserProfile, WardrobeItem};
pub use keys::{EntityKey, UserId, STORAGE_PREFIX};
pub use usage::{UsageCounter, UsageKind, UsageStatus};
