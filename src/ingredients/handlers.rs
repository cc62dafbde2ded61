use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{auth::jwt::AuthUser, state::AppState};

use super::dto::{IngredientResponse, IngredientWriteRequest, ListIngredientsQuery};
use super::repo;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/ingredients", get(list_ingredients).post(create_ingredient))
        .route(
            "/ingredients/:id",
            axum::routing::patch(rename_ingredient).delete(delete_ingredient),
        )
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[instrument(skip(state))]
pub async fn list_ingredients(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListIngredientsQuery>,
) -> Result<Json<Vec<IngredientResponse>>, (StatusCode, String)> {
    let ingredients = repo::list_by_user(&state.db, user_id, q.assigned_only != 0)
        .await
        .map_err(internal)?;
    Ok(Json(
        ingredients
            .into_iter()
            .map(IngredientResponse::from)
            .collect(),
    ))
}

#[instrument(skip(state, payload))]
pub async fn create_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<IngredientWriteRequest>,
) -> Result<(StatusCode, HeaderMap, Json<IngredientResponse>), (StatusCode, String)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Name must not be empty".into()));
    }

    let ingredient = repo::create(&state.db, user_id, name)
        .await
        .map_err(internal)?;

    info!(user_id = %user_id, ingredient_id = %ingredient.id, "ingredient created");
    let mut headers = HeaderMap::new();
    if let Ok(value) = format!("/api/v1/ingredients/{}", ingredient.id).parse() {
        headers.insert(axum::http::header::LOCATION, value);
    }
    Ok((
        StatusCode::CREATED,
        headers,
        Json(IngredientResponse::from(ingredient)),
    ))
}

#[instrument(skip(state, payload))]
pub async fn rename_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<IngredientWriteRequest>,
) -> Result<Json<IngredientResponse>, (StatusCode, String)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Name must not be empty".into()));
    }

    let ingredient = repo::rename(&state.db, user_id, id, name)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Ingredient not found".to_string()))?;

    info!(user_id = %user_id, ingredient_id = %id, "ingredient renamed");
    Ok(Json(IngredientResponse::from(ingredient)))
}

#[instrument(skip(state))]
pub async fn delete_ingredient(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = repo::delete(&state.db, user_id, id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Ingredient not found".to_string()));
    }

    info!(user_id = %user_id, ingredient_id = %id, "ingredient deleted");
    Ok(StatusCode::NO_CONTENT)
}
