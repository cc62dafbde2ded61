use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Ingredient {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: OffsetDateTime,
}

pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    assigned_only: bool,
) -> anyhow::Result<Vec<Ingredient>> {
    let rows = if assigned_only {
        sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT DISTINCT i.id, i.user_id, i.name, i.created_at
            FROM ingredients i
            JOIN recipe_ingredients ri ON ri.ingredient_id = i.id
            WHERE i.user_id = $1
            ORDER BY i.name DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?
    } else {
        sqlx::query_as::<_, Ingredient>(
            r#"
            SELECT id, user_id, name, created_at
            FROM ingredients
            WHERE user_id = $1
            ORDER BY name DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?
    };
    Ok(rows)
}

pub async fn create(db: &PgPool, user_id: Uuid, name: &str) -> anyhow::Result<Ingredient> {
    let ingredient = sqlx::query_as::<_, Ingredient>(
        r#"
        INSERT INTO ingredients (user_id, name)
        VALUES ($1, $2)
        RETURNING id, user_id, name, created_at
        "#,
    )
    .bind(user_id)
    .bind(name)
    .fetch_one(db)
    .await?;
    Ok(ingredient)
}

pub async fn rename(
    db: &PgPool,
    user_id: Uuid,
    ingredient_id: Uuid,
    name: &str,
) -> anyhow::Result<Option<Ingredient>> {
    let ingredient = sqlx::query_as::<_, Ingredient>(
        r#"
        UPDATE ingredients
        SET name = $3
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, name, created_at
        "#,
    )
    .bind(ingredient_id)
    .bind(user_id)
    .bind(name)
    .fetch_optional(db)
    .await?;
    Ok(ingredient)
}

pub async fn delete(db: &PgPool, user_id: Uuid, ingredient_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(r#"DELETE FROM ingredients WHERE id = $1 AND user_id = $2"#)
        .bind(ingredient_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
