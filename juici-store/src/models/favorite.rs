//! Favorite prompt record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// A prompt a user saved to their dashboard.
///
/// `id` is assigned by whichever tier stored the row and means nothing in
/// any other tier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub id: i64,
    pub user_id: String,
    pub prompt: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Favorite {
    /// Whether `user_id` owns this favorite.
    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.user_id == user_id
    }
}

/// Treat an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn null_categories_become_empty() {
        let fav: Favorite = serde_json::from_value(json!({
            "id": 4,
            "user_id": "u",
            "prompt": "p",
            "categories": null,
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert!(fav.categories.is_empty());
    }

    #[test]
    fn missing_categories_become_empty() {
        let fav: Favorite = serde_json::from_value(json!({
            "id": 4,
            "user_id": "u",
            "prompt": "p",
            "created_at": "2024-05-01T10:00:00+00:00"
        }))
        .unwrap();
        assert_eq!(fav.categories, Vec::<String>::new());
    }

    #[test]
    fn created_at_serializes_as_iso8601() {
        let fav: Favorite = serde_json::from_value(json!({
            "id": 1,
            "user_id": "u",
            "prompt": "p",
            "categories": ["web"],
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        let value = serde_json::to_value(&fav).unwrap();
        assert_eq!(value["created_at"], "2024-05-01T10:00:00Z");
        assert_eq!(value["categories"], json!(["web"]));
    }
}
