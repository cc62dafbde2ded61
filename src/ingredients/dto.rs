use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ingredients::repo::Ingredient;

#[derive(Debug, Deserialize)]
pub struct IngredientWriteRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct ListIngredientsQuery {
    #[serde(default)]
    pub assigned_only: u8,
}

#[derive(Debug, Serialize)]
pub struct IngredientResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<Ingredient> for IngredientResponse {
    fn from(i: Ingredient) -> Self {
        Self {
            id: i.id,
            name: i.name,
        }
    }
}
