//! Deterministic entity fixtures.

use chrono::{TimeZone, Utc};
use closetsync_types::{Category, ChatMessage, Role, UserProfile, WardrobeItem};

/// A filled-in onboarded profile.
pub fn profile() -> UserProfile {
    UserProfile {
        name: Some("Ada".into()),
        body_type: Some("athletic".into()),
        style_goals: vec!["business casual".into(), "capsule wardrobe".into()],
        preferences: Some("prefers natural fabrics".into()),
        onboarding_complete: true,
        updated_at: None,
        extra: Default::default(),
    }
}

/// A wardrobe item with the given id and contents derived from it.
pub fn wardrobe_item(id: &str) -> WardrobeItem {
    WardrobeItem {
        id: id.into(),
        name: format!("item {id}"),
        category: Category::Tops,
        colors: vec!["navy".into()],
        styles: vec!["casual".into()],
        brand: None,
        description: None,
        image: None,
        updated_at: None,
    }
}

/// A wardrobe built from the given ids.
pub fn wardrobe(ids: &[&str]) -> Vec<WardrobeItem> {
    ids.iter().map(|id| wardrobe_item(id)).collect()
}

/// A short two-message stylist exchange with fixed timestamps.
pub fn chat_exchange() -> Vec<ChatMessage> {
    let asked = Utc.with_ymd_and_hms(2026, 5, 14, 9, 0, 0).unwrap();
    let answered = Utc.with_ymd_and_hms(2026, 5, 14, 9, 0, 5).unwrap();
    vec![
        ChatMessage {
            role: Role::User,
            content: "what goes with navy trousers?".into(),
            created_at: asked,
        },
        ChatMessage {
            role: Role::Assistant,
            content: "a white oxford shirt and brown loafers".into(),
            created_at: answered,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_deterministic() {
        assert_eq!(profile(), profile());
        assert_eq!(wardrobe_item("a"), wardrobe_item("a"));
        assert_eq!(chat_exchange(), chat_exchange());
    }

    #[test]
    fn wardrobe_ids_follow_input() {
        let items = wardrobe(&["a", "b"]);
        assert_eq!(items[0].id, "a");
        assert_eq!(items[1].id, "b");
    }
}
