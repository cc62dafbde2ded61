use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::tags::repo::Tag;

#[derive(Debug, Deserialize)]
pub struct TagWriteRequest {
    pub name: String,
}

/// `assigned_only=1` restricts the listing to tags linked to at least one
/// recipe; any nonzero value counts.
#[derive(Debug, Deserialize)]
pub struct ListTagsQuery {
    #[serde(default)]
    pub assigned_only: u8,
}

#[derive(Debug, Serialize)]
pub struct TagResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<Tag> for TagResponse {
    fn from(t: Tag) -> Self {
        Self {
            id: t.id,
            name: t.name,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assigned_only_defaults_to_off() {
        let q: ListTagsQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.assigned_only, 0);
    }

    #[test]
    fn assigned_only_accepts_one() {
        let q: ListTagsQuery = serde_json::from_value(serde_json::json!({
            "assigned_only": 1
        }))
        .unwrap();
        assert_eq!(q.assigned_only, 1);
    }
}
