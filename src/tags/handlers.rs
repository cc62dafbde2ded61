use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{auth::jwt::AuthUser, state::AppState};

use super::dto::{ListTagsQuery, TagResponse, TagWriteRequest};
use super::repo;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tags", get(list_tags).post(create_tag))
        .route("/tags/:id", axum::routing::patch(rename_tag).delete(delete_tag))
}

fn internal<E: std::fmt::Display>(e: E) -> (StatusCode, String) {
    (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
}

#[instrument(skip(state))]
pub async fn list_tags(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(q): Query<ListTagsQuery>,
) -> Result<Json<Vec<TagResponse>>, (StatusCode, String)> {
    let tags = repo::list_by_user(&state.db, user_id, q.assigned_only != 0)
        .await
        .map_err(internal)?;
    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

#[instrument(skip(state, payload))]
pub async fn create_tag(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<TagWriteRequest>,
) -> Result<(StatusCode, HeaderMap, Json<TagResponse>), (StatusCode, String)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Name must not be empty".into()));
    }

    let tag = repo::create(&state.db, user_id, name)
        .await
        .map_err(internal)?;

    info!(user_id = %user_id, tag_id = %tag.id, "tag created");
    let mut headers = HeaderMap::new();
    if let Ok(value) = format!("/api/v1/tags/{}", tag.id).parse() {
        headers.insert(axum::http::header::LOCATION, value);
    }
    Ok((StatusCode::CREATED, headers, Json(TagResponse::from(tag))))
}

#[instrument(skip(state, payload))]
pub async fn rename_tag(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<TagWriteRequest>,
) -> Result<Json<TagResponse>, (StatusCode, String)> {
    let name = payload.name.trim();
    if name.is_empty() {
        return Err((StatusCode::BAD_REQUEST, "Name must not be empty".into()));
    }

    let tag = repo::rename(&state.db, user_id, id, name)
        .await
        .map_err(internal)?
        .ok_or((StatusCode::NOT_FOUND, "Tag not found".to_string()))?;

    info!(user_id = %user_id, tag_id = %id, "tag renamed");
    Ok(Json(TagResponse::from(tag)))
}

#[instrument(skip(state))]
pub async fn delete_tag(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    let deleted = repo::delete(&state.db, user_id, id)
        .await
        .map_err(internal)?;
    if !deleted {
        return Err((StatusCode::NOT_FOUND, "Tag not found".to_string()));
    }

    info!(user_id = %user_id, tag_id = %id, "tag deleted");
    Ok(StatusCode::NO_CONTENT)
}
