use serde::Serialize;
use sqlx::types::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use time::OffsetDateTime;
use uuid::Uuid;

use super::dto::{RecipePatchRequest, RecipeWriteRequest};

#[derive(Debug, Clone, FromRow)]
pub struct Recipe {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub time_minutes: i32,
    pub price: Decimal,
    pub description: Option<String>,
    pub link: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Id/name pair of a tag or ingredient linked to a recipe.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct NamedItem {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum RecipeWriteError {
    #[error("unknown tag for this user")]
    UnknownTag,
    #[error("unknown ingredient for this user")]
    UnknownIngredient,
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    tag_ids: Option<Vec<Uuid>>,
    ingredient_ids: Option<Vec<Uuid>>,
    limit: i64,
    offset: i64,
) -> anyhow::Result<Vec<Recipe>> {
    let rows = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, user_id, title, time_minutes, price, description, link, created_at
        FROM recipes r
        WHERE r.user_id = $1
          AND ($2::uuid[] IS NULL OR EXISTS (
                SELECT 1 FROM recipe_tags rt
                WHERE rt.recipe_id = r.id AND rt.tag_id = ANY($2)))
          AND ($3::uuid[] IS NULL OR EXISTS (
                SELECT 1 FROM recipe_ingredients ri
                WHERE ri.recipe_id = r.id AND ri.ingredient_id = ANY($3)))
        ORDER BY r.created_at DESC
        LIMIT $4 OFFSET $5
        "#,
    )
    .bind(user_id)
    .bind(tag_ids)
    .bind(ingredient_ids)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn get(db: &PgPool, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<Option<Recipe>> {
    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        SELECT id, user_id, title, time_minutes, price, description, link, created_at
        FROM recipes
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(recipe_id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    Ok(recipe)
}

pub async fn tags_of(db: &PgPool, recipe_id: Uuid) -> anyhow::Result<Vec<NamedItem>> {
    let rows = sqlx::query_as::<_, NamedItem>(
        r#"
        SELECT t.id, t.name
        FROM tags t
        JOIN recipe_tags rt ON rt.tag_id = t.id
        WHERE rt.recipe_id = $1
        ORDER BY t.name
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn ingredients_of(db: &PgPool, recipe_id: Uuid) -> anyhow::Result<Vec<NamedItem>> {
    let rows = sqlx::query_as::<_, NamedItem>(
        r#"
        SELECT i.id, i.name
        FROM ingredients i
        JOIN recipe_ingredients ri ON ri.ingredient_id = i.id
        WHERE ri.recipe_id = $1
        ORDER BY i.name
        "#,
    )
    .bind(recipe_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    req: &RecipeWriteRequest,
) -> Result<Recipe, RecipeWriteError> {
    let mut tx = db.begin().await?;

    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        INSERT INTO recipes (user_id, title, time_minutes, price, description, link)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, title, time_minutes, price, description, link, created_at
        "#,
    )
    .bind(user_id)
    .bind(&req.title)
    .bind(req.time_minutes)
    .bind(req.price)
    .bind(&req.description)
    .bind(&req.link)
    .fetch_one(&mut *tx)
    .await?;

    replace_tag_links(&mut tx, recipe.id, user_id, &req.tags).await?;
    replace_ingredient_links(&mut tx, recipe.id, user_id, &req.ingredients).await?;

    tx.commit().await?;
    Ok(recipe)
}

/// Full replace. Returns `Ok(None)` when the recipe is not owned by the
/// user (or does not exist).
pub async fn update_full(
    db: &PgPool,
    user_id: Uuid,
    recipe_id: Uuid,
    req: &RecipeWriteRequest,
) -> Result<Option<Recipe>, RecipeWriteError> {
    let mut tx = db.begin().await?;

    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        UPDATE recipes
        SET title = $3, time_minutes = $4, price = $5, description = $6, link = $7
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, title, time_minutes, price, description, link, created_at
        "#,
    )
    .bind(recipe_id)
    .bind(user_id)
    .bind(&req.title)
    .bind(req.time_minutes)
    .bind(req.price)
    .bind(&req.description)
    .bind(&req.link)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(recipe) = recipe else {
        return Ok(None);
    };

    replace_tag_links(&mut tx, recipe.id, user_id, &req.tags).await?;
    replace_ingredient_links(&mut tx, recipe.id, user_id, &req.ingredients).await?;

    tx.commit().await?;
    Ok(Some(recipe))
}

/// Partial update; `None` leaves a column untouched and link sets are only
/// replaced when present in the request.
pub async fn update_partial(
    db: &PgPool,
    user_id: Uuid,
    recipe_id: Uuid,
    req: &RecipePatchRequest,
) -> Result<Option<Recipe>, RecipeWriteError> {
    let mut tx = db.begin().await?;

    let recipe = sqlx::query_as::<_, Recipe>(
        r#"
        UPDATE recipes
        SET title = COALESCE($3, title),
            time_minutes = COALESCE($4, time_minutes),
            price = COALESCE($5, price),
            description = COALESCE($6, description),
            link = COALESCE($7, link)
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, title, time_minutes, price, description, link, created_at
        "#,
    )
    .bind(recipe_id)
    .bind(user_id)
    .bind(&req.title)
    .bind(req.time_minutes)
    .bind(req.price)
    .bind(&req.description)
    .bind(&req.link)
    .fetch_optional(&mut *tx)
    .await?;

    let Some(recipe) = recipe else {
        return Ok(None);
    };

    if let Some(tags) = &req.tags {
        replace_tag_links(&mut tx, recipe.id, user_id, tags).await?;
    }
    if let Some(ingredients) = &req.ingredients {
        replace_ingredient_links(&mut tx, recipe.id, user_id, ingredients).await?;
    }

    tx.commit().await?;
    Ok(Some(recipe))
}

pub async fn delete(db: &PgPool, user_id: Uuid, recipe_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(r#"DELETE FROM recipes WHERE id = $1 AND user_id = $2"#)
        .bind(recipe_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}

/// Relinks the recipe to exactly the given tags. The insert joins through
/// the tags table so only ids owned by the user can ever be linked; a
/// shortfall in linked rows means the request named a foreign or
/// nonexistent tag and the whole write is rejected.
async fn replace_tag_links(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    user_id: Uuid,
    tag_ids: &[Uuid],
) -> Result<(), RecipeWriteError> {
    sqlx::query(r#"DELETE FROM recipe_tags WHERE recipe_id = $1"#)
        .bind(recipe_id)
        .execute(&mut **tx)
        .await?;

    if tag_ids.is_empty() {
        return Ok(());
    }

    let mut wanted = tag_ids.to_vec();
    wanted.sort_unstable();
    wanted.dedup();

    let res = sqlx::query(
        r#"
        INSERT INTO recipe_tags (recipe_id, tag_id)
        SELECT $1, t.id FROM tags t
        WHERE t.id = ANY($2) AND t.user_id = $3
        "#,
    )
    .bind(recipe_id)
    .bind(&wanted)
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    if res.rows_affected() as usize != wanted.len() {
        return Err(RecipeWriteError::UnknownTag);
    }
    Ok(())
}

async fn replace_ingredient_links(
    tx: &mut Transaction<'_, Postgres>,
    recipe_id: Uuid,
    user_id: Uuid,
    ingredient_ids: &[Uuid],
) -> Result<(), RecipeWriteError> {
    sqlx::query(r#"DELETE FROM recipe_ingredients WHERE recipe_id = $1"#)
        .bind(recipe_id)
        .execute(&mut **tx)
        .await?;

    if ingredient_ids.is_empty() {
        return Ok(());
    }

    let mut wanted = ingredient_ids.to_vec();
    wanted.sort_unstable();
    wanted.dedup();

    let res = sqlx::query(
        r#"
        INSERT INTO recipe_ingredients (recipe_id, ingredient_id)
        SELECT $1, i.id FROM ingredients i
        WHERE i.id = ANY($2) AND i.user_id = $3
        "#,
    )
    .bind(recipe_id)
    .bind(&wanted)
    .bind(user_id)
    .execute(&mut **tx)
    .await?;

    if res.rows_affected() as usize != wanted.len() {
        return Err(RecipeWriteError::UnknownIngredient);
    }
    Ok(())
}
