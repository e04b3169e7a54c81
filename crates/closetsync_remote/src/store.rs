//! The remote store contract.

use crate::error::RemoteResult;
use async_trait::async_trait;
use closetsync_types::{
    ChatMessage, GalleryItem, UsageKind, UsageStatus, UserId, UserProfile, WardrobeItem,
};

/// Per-user cloud persistence, one operation per entity type.
///
/// Every operation takes the acting [`UserId`] at call time; nothing is
/// cached from an earlier session, so a signed-out/signed-in transition
/// can never write into a stale namespace.
///
/// Fetches return `Ok` with a possibly-empty value only when the remote
/// store actually answered; a degraded store surfaces as
/// [`crate::RemoteError::Unavailable`] or
/// [`crate::RemoteError::PermissionDenied`] so callers can tell "no
/// data" from "no answer".
#[async_trait]
pub trait RemoteStore: Send + Sync + 'static {
    /// Fetches the user profile, or `None` if one was never saved.
    async fn get_user_profile(&self, user: &UserId) -> RemoteResult<Option<UserProfile>>;

    /// Merge-writes the user profile, stamping `updated_at`. Fields not
    /// present in `profile` survive remotely.
    async fn save_user_profile(&self, user: &UserId, profile: &UserProfile) -> RemoteResult<()>;

    /// Fetches all wardrobe items. `Ok(vec![])` means the user genuinely
    /// has zero items.
    async fn get_wardrobe(&self, user: &UserId) -> RemoteResult<Vec<WardrobeItem>>;

    /// Upserts a single wardrobe item, stamping `updated_at`.
    async fn save_wardrobe_item(&self, user: &UserId, item: &WardrobeItem) -> RemoteResult<()>;

    /// Deletes a single wardrobe item by id.
    async fn delete_wardrobe_item(&self, user: &UserId, item_id: &str) -> RemoteResult<()>;

    /// Full wardrobe reconciliation: remote items absent from `items`
    /// are deleted, and every supplied item is upserted, concurrently.
    async fn sync_wardrobe(&self, user: &UserId, items: &[WardrobeItem]) -> RemoteResult<()>;

    /// Fetches the whole chat transcript.
    async fn get_chat_history(&self, user: &UserId) -> RemoteResult<Vec<ChatMessage>>;

    /// Replaces the whole chat transcript.
    async fn save_chat_history(&self, user: &UserId, messages: &[ChatMessage]) -> RemoteResult<()>;

    /// Saves a gallery item under a server-assigned id, which is
    /// returned.
    async fn save_gallery_item(&self, user: &UserId, item: &GalleryItem) -> RemoteResult<String>;

    /// Fetches all gallery items, newest first.
    async fn get_gallery(&self, user: &UserId) -> RemoteResult<Vec<GalleryItem>>;

    /// Deletes a gallery item and, best-effort, its stored image.
    async fn delete_gallery_item(&self, user: &UserId, item: &GalleryItem) -> RemoteResult<()>;

    /// Uploads a wardrobe item photo, returning its durable URL.
    async fn upload_image(
        &self,
        user: &UserId,
        item_id: &str,
        bytes: Vec<u8>,
    ) -> RemoteResult<String>;

    /// Deletes a wardrobe item photo. Deleting an absent photo succeeds.
    async fn delete_image(&self, user: &UserId, item_id: &str) -> RemoteResult<()>;

    /// Uploads a generated gallery image, returning its durable URL.
    async fn upload_gallery_image(&self, user: &UserId, bytes: Vec<u8>) -> RemoteResult<String>;

    /// Reads the daily usage status for `kind`. A counter last reset on
    /// an earlier day reads as zero without being rewritten.
    async fn check_usage_limit(&self, user: &UserId, kind: UsageKind) -> RemoteResult<UsageStatus>;

    /// Records one use of `kind`, committing the lazy daily reset.
    async fn increment_usage(&self, user: &UserId, kind: UsageKind) -> RemoteResult<()>;
}
