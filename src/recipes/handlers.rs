use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::{auth::jwt::AuthUser, state::AppState};

use super::dto::{
    parse_id_list, ListRecipesQuery, RecipeDetails, RecipeListItem, RecipePatchRequest,
    RecipeWriteRequest,
};
use super::repo::{self, Recipe, RecipeWriteError};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", get(list_recipes))
        .route("/recipes/:id", get(get_recipe))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/recipes", axum::routing::post(create_recipe))
        .route(
            "/recipes/:id",
            axum::routing::put(replace_recipe)
                .patch(patch_recipe)
                .delete(delete_recipe),
        )
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

fn write_error(e: RecipeWriteError) -> (StatusCode, String) {
    match e {
        RecipeWriteError::UnknownTag | RecipeWriteError::UnknownIngredient => {
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        RecipeWriteError::Db(e) => {
            error!(error = %e, "recipe write failed");
            internal(e)
        }
    }
}

fn parse_filter(raw: Option<&str>, what: &str) -> Result<Option<Vec<Uuid>>, (StatusCode, String)> {
    match raw {
        Some(raw) => {
            let ids = parse_id_list(raw)
                .map_err(|_| (StatusCode::BAD_REQUEST, format!("Invalid {} filter", what)))?;
            Ok(if ids.is_empty() { None } else { Some(ids) })
        }
        None => Ok(None),
    }
}

async fn details_for(
    state: &AppState,
    recipe: Recipe,
) -> Result<RecipeDetails, (StatusCode, String)> {
    let tags = repo::tags_of(&state.db, recipe.id).await.map_err(internal)?;
    let ingredients = repo::ingredients_of(&state.db, recipe.id)
        .await
        .map_err(internal)?;
    Ok(RecipeDetails {
        id: recipe.id,
        title: recipe.title,
        time_minutes: recipe.time_minutes,
        price: recipe.price,
        description: recipe.description,
        link: recipe.link,
        created_at: recipe.created_at,
        tags,
        ingredients,
    })
}

fn location_header(recipe_id: Uuid) -> (StatusCode, HeaderMap) {
    let mut headers = HeaderMap::new();
    if let Ok(value) = format!("/api/v1/recipes/{}", recipe_id).parse() {
        headers.insert(axum::http::header::LOCATION, value);
    }
    (StatusCode::CREATED, headers)
}

#[instrument(skip(state))]
pub async fn list_recipes(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListRecipesQuery>,
) -> Result<Json<Vec<RecipeListItem>>, (StatusCode, String)> {
    let tag_ids = parse_filter(q.tags.as_deref(), "tags")?;
    let ingredient_ids = parse_filter(q.ingredients.as_deref(), "ingredients")?;

    let recipes = repo::list_by_user(&state.db, user_id, tag_ids, ingredient_ids, q.limit, q.offset)
        .await
        .map_err(internal)?;
    Ok(Json(recipes.into_iter().map(RecipeListItem::from).collect()))
}

#[instrument(skip(state))]
pub async fn get_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RecipeDetails>, (StatusCode, String)> {
    let recipe = repo::get(&state.db, user_id, id)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".to_string()))?;
    Ok(Json(details_for(&state, recipe).await?))
}

#[instrument(skip(state, payload))]
pub async fn create_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<RecipeWriteRequest>,
) -> Result<(StatusCode, HeaderMap, Json<RecipeDetails>), (StatusCode, String)> {
    if payload.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Title must not be empty".into()));
    }

    let recipe = repo::create(&state.db, user_id, &payload)
        .await
        .map_err(write_error)?;

    info!(user_id = %user_id, recipe_id = %recipe.id, "recipe created");
    let (status, headers) = location_header(recipe.id);
    let details = details_for(&state, recipe).await?;
    Ok((status, headers, Json(details)))
}

#[instrument(skip(state, payload))]
pub async fn replace_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipeWriteRequest>,
) -> Result<Json<RecipeDetails>, (StatusCode, String)> {
    if payload.title.trim().is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Title must not be empty".into()));
    }

    let recipe = repo::update_full(&state.db, user_id, id, &payload)
        .await
        .map_err(write_error)?
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".to_string()))?;

    info!(user_id = %user_id, recipe_id = %id, "recipe replaced");
    Ok(Json(details_for(&state, recipe).await?))
}

#[instrument(skip(state, payload))]
pub async fn patch_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<RecipePatchRequest>,
) -> Result<Json<RecipeDetails>, (StatusCode, String)> {
    if let Some(title) = payload.title.as_deref() {
        if title.trim().is_empty() {
            return Err((StatusCode::BAD_REQUEST, "Title must not be empty".into()));
        }
    }

    let recipe = repo::update_partial(&state.db, user_id, id, &payload)
        .await
        .map_err(write_error)?
        .ok_or((StatusCode::NOT_FOUND, "Recipe not found".to_string()))?;

    info!(user_id = %user_id, recipe_id = %id, "recipe updated");
    Ok(Json(details_for(&state, recipe).await?))
}

#[instrument(skip(state))]
pub async fn delete_recipe(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = repo::delete(&state.db, user_id, id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Recipe not found".to_string()));
    }

    info!(user_id = %user_id, recipe_id = %id, "recipe deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_link_ids_map_to_bad_request() {
        let (status, _) = write_error(RecipeWriteError::UnknownTag);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = write_error(RecipeWriteError::UnknownIngredient);
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_errors_map_to_internal() {
        let (status, _) = write_error(RecipeWriteError::Db(sqlx::Error::PoolClosed));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn empty_filter_collapses_to_none() {
        assert_eq!(parse_filter(None, "tags").unwrap(), None);
        assert_eq!(parse_filter(Some(""), "tags").unwrap(), None);
        assert!(parse_filter(Some("oops"), "tags").is_err());
    }
}
