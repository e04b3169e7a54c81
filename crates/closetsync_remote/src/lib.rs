//! # ClosetSync Remote
//!
//! The remote store client: async, per-user cloud persistence.
//!
//! This crate provides:
//! - The [`RemoteStore`] trait — one operation per entity type
//! - [`DocumentClient`], implementing it over a pluggable
//!   [`DocumentTransport`]
//! - [`MemoryTransport`] — a stateful in-process peer with failure
//!   injection, used by every integration test
//! - Per-user path namespacing and per-day usage limits
//!
//! ## Failure classes
//!
//! The client never overloads an empty result to mean "fetch failed".
//! [`RemoteError`] makes the three classes explicit:
//!
//! - `Unavailable` — transient/offline; callers degrade to local-only
//! - `PermissionDenied` — misconfigured access rules; logged distinctly,
//!   callers degrade to local-only
//! - everything else — a data or programming error worth surfacing
//!
//! `Ok(vec![])` therefore always means "the user genuinely has zero
//! items", which is load-bearing for the sync coordinator's merge logic.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod client;
mod error;
mod memory;
pub mod paths;
mod store;
mod transport;

pub use client::DocumentClient;
pub use error::{RemoteError, RemoteResult};
pub use memory::MemoryTransport;
pub use store::RemoteStore;
pub use transport::{DocumentTransport, WriteMode};
