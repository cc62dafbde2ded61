use serde::{Deserialize, Serialize};
use sqlx::types::Decimal;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::recipes::repo::{NamedItem, Recipe};

/// Row shape for `GET /recipes`; the description is only exposed on the
/// detail endpoint.
#[derive(Debug, Serialize)]
pub struct RecipeListItem {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub link: Option<String>,
    pub created_at: OffsetDateTime,
}

impl From<Recipe> for RecipeListItem {
    fn from(r: Recipe) -> Self {
        Self {
            id: r.id,
            title: r.title,
            time_minutes: r.time_minutes,
            price: r.price,
            link: r.link,
            created_at: r.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RecipeDetails {
    pub id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub link: Option<String>,
    pub created_at: OffsetDateTime,
    pub tags: Vec<NamedItem>,
    pub ingredients: Vec<NamedItem>,
}

/// Body for `POST /recipes` and `PUT /recipes/:id`. Tag and ingredient ids
/// must belong to the calling user; on PUT the link sets are replaced
/// wholesale.
#[derive(Debug, Deserialize)]
pub struct RecipeWriteRequest {
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub tags: Vec<Uuid>,
    #[serde(default)]
    pub ingredients: Vec<Uuid>,
}

/// Body for `PATCH /recipes/:id`; absent fields are left unchanged, and
/// link sets are only replaced when present.
#[derive(Debug, Deserialize)]
pub struct RecipePatchRequest {
    pub title: Option<String>,
    pub time_minutes: Option<i32>,
    pub price: Option<Decimal>,
    pub description: Option<String>,
    pub link: Option<String>,
    pub tags: Option<Vec<Uuid>>,
    pub ingredients: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize)]
pub struct ListRecipesQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    /// Comma-separated tag UUIDs; keeps recipes linked to any of them.
    pub tags: Option<String>,
    /// Comma-separated ingredient UUIDs; keeps recipes linked to any of them.
    pub ingredients: Option<String>,
}

fn default_limit() -> i64 {
    20
}

pub fn parse_id_list(raw: &str) -> Result<Vec<Uuid>, uuid::Error> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(Uuid::parse_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_ids() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let ids = parse_id_list(&format!("{}, {}", a, b)).unwrap();
        assert_eq!(ids, vec![a, b]);
    }

    #[test]
    fn empty_string_parses_to_no_ids() {
        assert!(parse_id_list("").unwrap().is_empty());
        assert!(parse_id_list(" , ").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_uuid_segments() {
        assert!(parse_id_list("not-a-uuid").is_err());
        assert!(parse_id_list(&format!("{},oops", Uuid::new_v4())).is_err());
    }

    #[test]
    fn list_query_defaults() {
        let q: ListRecipesQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.limit, 20);
        assert_eq!(q.offset, 0);
        assert!(q.tags.is_none());
        assert!(q.ingredients.is_none());
    }

    #[test]
    fn write_request_accepts_string_price_and_defaults_links() {
        let req: RecipeWriteRequest = serde_json::from_value(serde_json::json!({
            "title": "Coriander eggs on toast",
            "time_minutes": 10,
            "price": "5.00",
        }))
        .unwrap();
        assert_eq!(req.price, "5.00".parse::<Decimal>().unwrap());
        assert!(req.description.is_none());
        assert!(req.tags.is_empty());
        assert!(req.ingredients.is_empty());
    }
}
