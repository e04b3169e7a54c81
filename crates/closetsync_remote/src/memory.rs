//! In-memory document transport for testing.

use crate::error::{RemoteError, RemoteResult};
use crate::transport::{DocumentTransport, WriteMode};
use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

/// An in-memory document and blob store with failure injection.
///
/// `MemoryTransport` is a cheaply clonable handle over shared state, so
/// tests can keep a handle for inspection after moving a clone into a
/// [`crate::DocumentClient`]. It supports:
///
/// - `set_offline` / `set_denied` to simulate the two degraded failure
///   classes
/// - `set_latency` to give every operation an artificial await point
///   (driven by tokio's virtual time in paused tests)
/// - write counters for debounce-coalescing assertions
#[derive(Clone, Default)]
pub struct MemoryTransport {
    inner: Arc<TransportState>,
}

#[derive(Default)]
struct TransportState {
    documents: RwLock<BTreeMap<String, Value>>,
    blobs: RwLock<BTreeMap<String, Vec<u8>>>,
    offline: AtomicBool,
    denied: AtomicBool,
    latency: Mutex<Duration>,
    doc_writes: AtomicUsize,
}

impl MemoryTransport {
    /// Creates an empty, online transport.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulates losing (or regaining) connectivity.
    pub fn set_offline(&self, offline: bool) {
        self.inner.offline.store(offline, Ordering::SeqCst);
    }

    /// Simulates access-rule rejection.
    pub fn set_denied(&self, denied: bool) {
        self.inner.denied.store(denied, Ordering::SeqCst);
    }

    /// Gives every operation an artificial latency.
    pub fn set_latency(&self, latency: Duration) {
        *self.inner.latency.lock() = latency;
    }

    /// Number of document writes (`set_doc` + `add_doc`) performed.
    pub fn doc_write_count(&self) -> usize {
        self.inner.doc_writes.load(Ordering::SeqCst)
    }

    /// Reads a stored document directly, bypassing failure injection.
    pub fn document(&self, path: &str) -> Option<Value> {
        self.inner.documents.read().get(path).cloned()
    }

    /// Seeds a document directly, bypassing failure injection.
    pub fn insert_document(&self, path: &str, doc: Value) {
        self.inner.documents.write().insert(path.to_string(), doc);
    }

    /// Reads a stored blob directly, bypassing failure injection.
    pub fn blob(&self, path: &str) -> Option<Vec<u8>> {
        self.inner.blobs.read().get(path).cloned()
    }

    /// Ids of the direct child documents of `collection`, in path order.
    pub fn child_ids(&self, collection: &str) -> Vec<String> {
        let prefix = format!("{collection}/");
        self.inner
            .documents
            .read()
            .keys()
            .filter_map(|path| path.strip_prefix(&prefix))
            .filter(|rest| !rest.contains('/'))
            .map(str::to_string)
            .collect()
    }

    async fn check(&self) -> RemoteResult<()> {
        let latency = *self.inner.latency.lock();
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }
        if self.inner.offline.load(Ordering::SeqCst) {
            return Err(RemoteError::unavailable("memory transport is offline"));
        }
        if self.inner.denied.load(Ordering::SeqCst) {
            return Err(RemoteError::permission_denied(
                "memory transport rejected the call",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentTransport for MemoryTransport {
    async fn get_doc(&self, path: &str) -> RemoteResult<Option<Value>> {
        self.check().await?;
        Ok(self.inner.documents.read().get(path).cloned())
    }

    async fn set_doc(&self, path: &str, doc: Value, mode: WriteMode) -> RemoteResult<()> {
        self.check().await?;
        let mut documents = self.inner.documents.write();
        let next = match (mode, documents.get(path)) {
            (WriteMode::Merge, Some(Value::Object(existing))) => {
                let mut merged = existing.clone();
                if let Value::Object(fields) = doc {
                    for (key, value) in fields {
                        merged.insert(key, value);
                    }
                }
                Value::Object(merged)
            }
            _ => doc,
        };
        documents.insert(path.to_string(), next);
        self.inner.doc_writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn delete_doc(&self, path: &str) -> RemoteResult<()> {
        self.check().await?;
        self.inner.documents.write().remove(path);
        Ok(())
    }

    async fn add_doc(&self, collection: &str, doc: Value) -> RemoteResult<String> {
        self.check().await?;
        let id = Uuid::new_v4().to_string();
        self.inner
            .documents
            .write()
            .insert(format!("{collection}/{id}"), doc);
        self.inner.doc_writes.fetch_add(1, Ordering::SeqCst);
        Ok(id)
    }

    async fn list_docs(&self, collection: &str) -> RemoteResult<Vec<(String, Value)>> {
        self.check().await?;
        let prefix = format!("{collection}/");
        Ok(self
            .inner
            .documents
            .read()
            .iter()
            .filter_map(|(path, doc)| {
                let rest = path.strip_prefix(&prefix)?;
                if rest.contains('/') {
                    return None;
                }
                Some((rest.to_string(), doc.clone()))
            })
            .collect())
    }

    async fn put_blob(&self, path: &str, bytes: Vec<u8>) -> RemoteResult<String> {
        self.check().await?;
        self.inner.blobs.write().insert(path.to_string(), bytes);
        Ok(format!("memory://{path}"))
    }

    async fn delete_blob(&self, path: &str) -> RemoteResult<()> {
        self.check().await?;
        let key = path.strip_prefix("memory://").unwrap_or(path);
        self.inner.blobs.write().remove(key);
        Ok(())
    }
}
