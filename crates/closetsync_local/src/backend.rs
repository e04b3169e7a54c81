//! Cache backend trait definition.

use crate::error::CacheResult;

/// A low-level backend for the local cache store.
///
/// Backends are **opaque per-key byte stores**. They map a logical key to
/// a blob of bytes and nothing more; JSON framing and entity shapes are
/// owned entirely by [`crate::LocalStore`].
///
/// # Invariants
///
/// - `read` after `write` for the same key returns exactly the written
///   bytes
/// - `remove` of an absent key succeeds
/// - Backends must be `Send` so the store can be shared across threads
///
/// # Implementors
///
/// - [`crate::MemoryBackend`] - For testing
/// - [`crate::FileBackend`] - For persistent storage
pub trait CacheBackend: Send {
    /// Reads the bytes stored under `key`, if any.
    fn read(&self, key: &str) -> CacheResult<Option<Vec<u8>>>;

    /// Stores `bytes` under `key`, replacing any previous value.
    fn write(&mut self, key: &str, bytes: &[u8]) -> CacheResult<()>;

    /// Removes the value stored under `key`. Removing an absent key is
    /// not an error.
    fn remove(&mut self, key: &str) -> CacheResult<()>;

    /// Removes every stored value.
    fn clear(&mut self) -> CacheResult<()>;
}
