//! The document-store client.

use crate::error::{RemoteError, RemoteResult};
use crate::paths;
use crate::store::RemoteStore;
use crate::transport::{DocumentTransport, WriteMode};
use async_trait::async_trait;
use chrono::Utc;
use closetsync_types::{
    ChatMessage, GalleryItem, UsageCounter, UsageKind, UsageStatus, UserId, UserProfile,
    WardrobeItem,
};
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::{debug, warn};

/// A [`RemoteStore`] over a [`DocumentTransport`].
///
/// The client owns entity encoding, per-user path construction,
/// `updated_at` stamping, and the usage-counter lazy-reset rule; the
/// transport only moves opaque documents and blobs.
pub struct DocumentClient<T: DocumentTransport> {
    transport: T,
}

impl<T: DocumentTransport> DocumentClient<T> {
    /// Creates a client over the given transport.
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    async fn load_usage(&self, user: &UserId) -> RemoteResult<Option<UsageCounter>> {
        let path = paths::usage_doc(user);
        match self.transport.get_doc(&path).await? {
            Some(doc) => Ok(Some(decode(&path, doc)?)),
            None => Ok(None),
        }
    }
}

fn decode<E: DeserializeOwned>(path: &str, doc: Value) -> RemoteResult<E> {
    serde_json::from_value(doc).map_err(|e| RemoteError::data(path, e.to_string()))
}

/// Stamps `updated_at` on a document about to be written.
fn stamp_updated_at(doc: &mut Value) {
    if let Value::Object(fields) = doc {
        fields.insert("updated_at".into(), json!(Utc::now()));
    }
}

#[async_trait]
impl<T: DocumentTransport> RemoteStore for DocumentClient<T> {
    async fn get_user_profile(&self, user: &UserId) -> RemoteResult<Option<UserProfile>> {
        let path = paths::profile_doc(user);
        match self.transport.get_doc(&path).await? {
            Some(doc) => Ok(Some(decode(&path, doc)?)),
            None => Ok(None),
        }
    }

    async fn save_user_profile(&self, user: &UserId, profile: &UserProfile) -> RemoteResult<()> {
        let mut doc = serde_json::to_value(profile)?;
        stamp_updated_at(&mut doc);
        self.transport
            .set_doc(&paths::profile_doc(user), doc, WriteMode::Merge)
            .await
    }

    async fn get_wardrobe(&self, user: &UserId) -> RemoteResult<Vec<WardrobeItem>> {
        let collection = paths::wardrobe_collection(user);
        let docs = self.transport.list_docs(&collection).await?;

        docs.into_iter()
            .map(|(id, mut doc)| {
                // The document id is authoritative for the item id.
                if let Value::Object(fields) = &mut doc {
                    fields.entry("id").or_insert_with(|| json!(id.clone()));
                }
                decode(&paths::wardrobe_doc(user, &id), doc)
            })
            .collect()
    }

    async fn save_wardrobe_item(&self, user: &UserId, item: &WardrobeItem) -> RemoteResult<()> {
        let mut doc = serde_json::to_value(item)?;
        stamp_updated_at(&mut doc);
        self.transport
            .set_doc(&paths::wardrobe_doc(user, &item.id), doc, WriteMode::Replace)
            .await
    }

    async fn delete_wardrobe_item(&self, user: &UserId, item_id: &str) -> RemoteResult<()> {
        self.transport
            .delete_doc(&paths::wardrobe_doc(user, item_id))
            .await
    }

    async fn sync_wardrobe(&self, user: &UserId, items: &[WardrobeItem]) -> RemoteResult<()> {
        // Remote ids not present locally are deletions to propagate.
        let collection = paths::wardrobe_collection(user);
        let remote_docs = self.transport.list_docs(&collection).await?;
        let local_ids: HashSet<&str> = items.iter().map(|item| item.id.as_str()).collect();
        let stale: Vec<String> = remote_docs
            .into_iter()
            .map(|(id, _)| id)
            .filter(|id| !local_ids.contains(id.as_str()))
            .collect();

        let upserts = items.iter().map(|item| self.save_wardrobe_item(user, item));
        let deletes = stale
            .iter()
            .map(|id| self.delete_wardrobe_item(user, id));

        futures::future::try_join(try_join_all(upserts), try_join_all(deletes)).await?;

        debug!(
            user = %user,
            upserted = items.len(),
            deleted = stale.len(),
            "wardrobe reconciled to remote store"
        );
        Ok(())
    }

    async fn get_chat_history(&self, user: &UserId) -> RemoteResult<Vec<ChatMessage>> {
        let path = paths::chat_doc(user);
        match self.transport.get_doc(&path).await? {
            Some(doc) => {
                let messages = doc.get("messages").cloned().unwrap_or_else(|| json!([]));
                decode(&path, messages)
            }
            None => Ok(Vec::new()),
        }
    }

    async fn save_chat_history(&self, user: &UserId, messages: &[ChatMessage]) -> RemoteResult<()> {
        let doc = json!({
            "messages": serde_json::to_value(messages)?,
            "updated_at": Utc::now(),
        });
        self.transport
            .set_doc(&paths::chat_doc(user), doc, WriteMode::Replace)
            .await
    }

    async fn save_gallery_item(&self, user: &UserId, item: &GalleryItem) -> RemoteResult<String> {
        let mut to_save = item.clone();
        to_save.id = None;
        to_save.created_at = Some(Utc::now());
        let doc = serde_json::to_value(&to_save)?;
        self.transport
            .add_doc(&paths::gallery_collection(user), doc)
            .await
    }

    async fn get_gallery(&self, user: &UserId) -> RemoteResult<Vec<GalleryItem>> {
        let collection = paths::gallery_collection(user);
        let docs = self.transport.list_docs(&collection).await?;

        let mut items: Vec<GalleryItem> = docs
            .into_iter()
            .map(|(id, doc)| {
                let mut item: GalleryItem = decode(&paths::gallery_doc(user, &id), doc)?;
                item.id = Some(id);
                Ok(item)
            })
            .collect::<RemoteResult<_>>()?;

        // Newest first.
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(items)
    }

    async fn delete_gallery_item(&self, user: &UserId, item: &GalleryItem) -> RemoteResult<()> {
        if let Some(id) = &item.id {
            self.transport
                .delete_doc(&paths::gallery_doc(user, id))
                .await?;
        }

        // The document is the primary record; a missing or undeletable
        // image must not fail the operation.
        if !item.image_url.is_empty() {
            if let Err(e) = self.transport.delete_blob(&item.image_url).await {
                warn!(user = %user, error = %e, "could not delete gallery image blob");
            }
        }

        Ok(())
    }

    async fn upload_image(
        &self,
        user: &UserId,
        item_id: &str,
        bytes: Vec<u8>,
    ) -> RemoteResult<String> {
        self.transport
            .put_blob(&paths::wardrobe_image(user, item_id), bytes)
            .await
    }

    async fn delete_image(&self, user: &UserId, item_id: &str) -> RemoteResult<()> {
        self.transport
            .delete_blob(&paths::wardrobe_image(user, item_id))
            .await
    }

    async fn upload_gallery_image(&self, user: &UserId, bytes: Vec<u8>) -> RemoteResult<String> {
        let stamp = Utc::now().timestamp_millis().to_string();
        self.transport
            .put_blob(&paths::gallery_image(user, &stamp), bytes)
            .await
    }

    async fn check_usage_limit(&self, user: &UserId, kind: UsageKind) -> RemoteResult<UsageStatus> {
        let today = Utc::now().date_naive();
        let counter = self
            .load_usage(user)
            .await?
            .unwrap_or_else(|| UsageCounter::fresh(today));
        Ok(counter.status(kind, today))
    }

    async fn increment_usage(&self, user: &UserId, kind: UsageKind) -> RemoteResult<()> {
        let today = Utc::now().date_naive();
        let counter = self
            .load_usage(user)
            .await?
            .unwrap_or_else(|| UsageCounter::fresh(today));

        let next = counter.record(kind, today);
        self.transport
            .set_doc(
                &paths::usage_doc(user),
                serde_json::to_value(&next)?,
                WriteMode::Merge,
            )
            .await
    }
}
