//! # ClosetSync Local
//!
//! The local cache store: fast, synchronous, on-device persistence.
//!
//! This crate provides the always-available half of the hybrid storage
//! pair. Reads and writes are synchronous and bounded by serialization
//! cost only; the cloud never sits on this path.
//!
//! ## Design Principles
//!
//! - Backends are opaque per-key byte stores — no knowledge of JSON or
//!   entities
//! - The [`LocalStore`] boundary never panics and never propagates an
//!   error: failures are logged and surface as `false`/default
//! - Entity-typed accessors decode leniently; a corrupt cached document
//!   degrades to the entity default instead of poisoning the caller
//!
//! ## Available Backends
//!
//! - [`MemoryBackend`] - For testing and ephemeral storage
//! - [`FileBackend`] - One file per key under a directory, durable
//!   across restarts
//!
//! ## Example
//!
//! ```rust
//! use closetsync_local::{LocalStore, MemoryBackend};
//! use serde_json::json;
//!
//! let store = LocalStore::new(MemoryBackend::new());
//! assert!(store.set_item("closetsync_wardrobe", &json!([{"id": "a"}])));
//! let value = store.get_item("closetsync_wardrobe", json!([]));
//! assert_eq!(value[0]["id"], "a");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;
mod store;

pub use backend::CacheBackend;
pub use error::{CacheError, CacheResult};
pub use file::FileBackend;
pub use memory::MemoryBackend;
pub use store::LocalStore;
