//! Transport layer abstraction for the document store.

use crate::error::RemoteResult;
use async_trait::async_trait;
use serde_json::Value;

/// How a document write treats fields already present remotely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Replace the stored document wholesale.
    Replace,
    /// Overlay the supplied top-level fields onto the stored document,
    /// leaving unmentioned fields intact.
    Merge,
}

/// A document transport moves JSON documents and binary blobs to and
/// from the remote store.
///
/// This trait abstracts the wire, allowing different implementations
/// (HTTP, gRPC, an in-process peer for testing). Path construction and
/// entity encoding are owned by [`crate::DocumentClient`]; transports
/// see opaque paths and [`Value`] documents.
#[async_trait]
pub trait DocumentTransport: Send + Sync + 'static {
    /// Fetches the document at `path`, or `None` if it does not exist.
    async fn get_doc(&self, path: &str) -> RemoteResult<Option<Value>>;

    /// Writes the document at `path` with the given mode.
    async fn set_doc(&self, path: &str, doc: Value, mode: WriteMode) -> RemoteResult<()>;

    /// Deletes the document at `path`. Deleting an absent document
    /// succeeds.
    async fn delete_doc(&self, path: &str) -> RemoteResult<()>;

    /// Adds a document to `collection` under a server-assigned id, which
    /// is returned.
    async fn add_doc(&self, collection: &str, doc: Value) -> RemoteResult<String>;

    /// Lists the direct child documents of `collection` as `(id, doc)`
    /// pairs.
    async fn list_docs(&self, collection: &str) -> RemoteResult<Vec<(String, Value)>>;

    /// Stores a binary blob at `path` and returns a durable URL for it.
    async fn put_blob(&self, path: &str, bytes: Vec<u8>) -> RemoteResult<String>;

    /// Deletes the blob at `path` (or at a URL previously returned by
    /// [`DocumentTransport::put_blob`]). Deleting an absent blob
    /// succeeds.
    async fn delete_blob(&self, path: &str) -> RemoteResult<()>;
}
