//! Per-user remote path namespacing.
//!
//! Every document and blob lives under `users/{uid}/...`, with the user
//! id supplied by the caller at call time. Two distinct users can never
//! produce the same path.

use closetsync_types::UserId;

/// Document path of the user profile.
pub fn profile_doc(user: &UserId) -> String {
    format!("users/{user}/data/profile")
}

/// Document path of the whole-transcript chat history.
pub fn chat_doc(user: &UserId) -> String {
    format!("users/{user}/data/chat_history")
}

/// Document path of the per-day usage counters.
pub fn usage_doc(user: &UserId) -> String {
    format!("users/{user}/data/usage_limits")
}

/// Collection path of the wardrobe items.
pub fn wardrobe_collection(user: &UserId) -> String {
    format!("users/{user}/wardrobe")
}

/// Document path of one wardrobe item.
pub fn wardrobe_doc(user: &UserId, item_id: &str) -> String {
    format!("users/{user}/wardrobe/{item_id}")
}

/// Collection path of the try-on gallery.
pub fn gallery_collection(user: &UserId) -> String {
    format!("users/{user}/gallery")
}

/// Document path of one gallery item.
pub fn gallery_doc(user: &UserId, item_id: &str) -> String {
    format!("users/{user}/gallery/{item_id}")
}

/// Blob path of a wardrobe item photo.
pub fn wardrobe_image(user: &UserId, item_id: &str) -> String {
    format!("users/{user}/wardrobe/{item_id}.jpg")
}

/// Blob path of a generated gallery image, keyed by a caller-supplied
/// timestamp stamp.
pub fn gallery_image(user: &UserId, stamp: &str) -> String {
    format!("users/{user}/gallery/{stamp}.jpg")
}
