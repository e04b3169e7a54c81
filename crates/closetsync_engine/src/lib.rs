//! # ClosetSync Engine
//!
//! The hybrid local/cloud sync coordinator.
//!
//! This crate provides:
//! - [`HybridStore`] — the single mutation path over the local cache and
//!   the remote store
//! - Debounced, per-key cloud pushes with cancel-and-replace coalescing
//! - Merge-on-login reconciliation (`sync_from_cloud`)
//! - A synchronous observer layer ([`ListenerSet`], [`StoreEvent`])
//! - [`AuthState`] — the injected authentication source
//!
//! ## Architecture
//!
//! Writes are **local-first**: every mutation lands in the local cache
//! synchronously and notifies subscribers before any cloud work is even
//! scheduled. When a user is signed in, each write also restarts a
//! per-key debounce timer; only the last value written within the window
//! is pushed.
//!
//! On sign-in the engine pulls every synced entity, merges the wardrobe
//! with whatever was created locally before the sync (union by id,
//! remote wins on shared ids), and schedules a re-push when local-only
//! items were found — so items created offline are never silently lost.
//!
//! ## Key Invariants
//!
//! - The local cache always reflects the last value written
//! - Listeners are notified exactly once per mutation, synchronously
//! - A degraded remote store never overwrites local data
//! - A remote failure never un-does a local write that succeeded
//! - Reconciliation is idempotent; a concurrent call is a no-op

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod auth;
mod config;
mod error;
mod listeners;
mod merge;
mod store;

pub use auth::AuthState;
pub use config::{EngineConfig, DEFAULT_DEBOUNCE};
pub use error::{EngineError, EngineResult};
pub use listeners::{ListenerId, ListenerSet, StoreEvent};
pub use merge::{merge_wardrobe, MergedWardrobe};
pub use store::HybridStore;
