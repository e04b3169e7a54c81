//! The synced and remote-only entity types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use uuid::Uuid;

/// A user's styling profile.
///
/// Created on the first onboarding save and only ever overwritten or
/// merge-extended afterwards — never deleted. Attributes this version of
/// the model does not know about survive through the flattened `extra`
/// map, so an older client never drops data written by a newer one.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Self-reported body type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_type: Option<String>,
    /// Style goals picked during onboarding.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub style_goals: Vec<String>,
    /// Free-form styling preferences.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences: Option<String>,
    /// Whether onboarding has been completed.
    #[serde(default)]
    pub onboarding_complete: bool,
    /// Last-modified marker, stamped on remote writes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Unrecognized attributes, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Returns true if no attribute has ever been set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.body_type.is_none()
            && self.style_goals.is_empty()
            && self.preferences.is_none()
            && !self.onboarding_complete
            && self.extra.is_empty()
    }
}

/// Wardrobe item category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Shirts, blouses, sweaters.
    Tops,
    /// Trousers, skirts, shorts.
    Bottoms,
    /// All footwear.
    Shoes,
    /// Bags, jewelry, belts, hats.
    Accessories,
    /// Coats and jackets.
    Outerwear,
}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 5] = [
        Category::Tops,
        Category::Bottoms,
        Category::Shoes,
        Category::Accessories,
        Category::Outerwear,
    ];
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Category::Tops => "tops",
            Category::Bottoms => "bottoms",
            Category::Shoes => "shoes",
            Category::Accessories => "accessories",
            Category::Outerwear => "outerwear",
        };
        f.write_str(name)
    }
}

/// A single item of clothing in the user's wardrobe.
///
/// The `id` is client-generated and immutable once assigned; the
/// collection invariant is that no two items of one user share an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardrobeItem {
    /// Client-generated identifier, immutable once assigned.
    pub id: String,
    /// Human-readable item name.
    pub name: String,
    /// Item category.
    pub category: Category,
    /// Dominant colors.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub colors: Vec<String>,
    /// Style tags.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub styles: Vec<String>,
    /// Brand, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Image reference: a data URI before upload, a durable URL after.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Last-modified marker, stamped on remote writes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl WardrobeItem {
    /// Creates an item with a freshly generated time-ordered id.
    pub fn new(name: impl Into<String>, category: Category) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            name: name.into(),
            category,
            colors: Vec::new(),
            styles: Vec::new(),
            brand: None,
            description: None,
            image: None,
            updated_at: None,
        }
    }
}

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user.
    User,
    /// The AI stylist.
    Assistant,
}

/// One message in the stylist chat transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Message author.
    pub role: Role,
    /// Message text.
    pub content: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// A user message stamped with the current time.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// An assistant message stamped with the current time.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// A generated try-on composite. Remote-only: written and read directly
/// against the remote store, never cached locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GalleryItem {
    /// Server-assigned document id, absent until the first save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Durable URL of the composite image.
    pub image_url: String,
    /// Ids of the wardrobe items the composite was generated from.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub source_item_ids: Vec<String>,
    /// Prompt the composite was generated with.
    pub prompt: String,
    /// Creation time, stamped on save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_profile_reports_empty() {
        assert!(UserProfile::default().is_empty());

        let profile = UserProfile {
            name: Some("Ada".into()),
            ..Default::default()
        };
        assert!(!profile.is_empty());
    }

    #[test]
    fn profile_preserves_unknown_fields() {
        let doc = json!({
            "name": "Ada",
            "onboarding_complete": true,
            "favorite_fabric": "linen"
        });
        let profile: UserProfile = serde_json::from_value(doc).unwrap();
        assert_eq!(profile.extra["favorite_fabric"], json!("linen"));

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["favorite_fabric"], json!("linen"));
    }

    #[test]
    fn category_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Category::Outerwear).unwrap(), "\"outerwear\"");
        let parsed: Category = serde_json::from_str("\"tops\"").unwrap();
        assert_eq!(parsed, Category::Tops);
    }

    #[test]
    fn new_items_get_distinct_ids() {
        let a = WardrobeItem::new("blazer", Category::Outerwear);
        let b = WardrobeItem::new("blazer", Category::Outerwear);
        assert_ne!(a.id, b.id);
        assert!(!a.id.is_empty());
    }

    #[test]
    fn item_decodes_with_minimal_fields() {
        let doc = json!({"id": "a", "name": "tee", "category": "tops"});
        let item: WardrobeItem = serde_json::from_value(doc).unwrap();
        assert_eq!(item.id, "a");
        assert!(item.colors.is_empty());
        assert!(item.brand.is_none());
    }

    #[test]
    fn chat_roles_roundtrip() {
        let msg = ChatMessage::assistant("try the navy blazer");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], json!("assistant"));
        let back: ChatMessage = serde_json::from_value(value).unwrap();
        assert_eq!(back.role, Role::Assistant);
    }
}
