use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Tag {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub created_at: OffsetDateTime,
}

/// Lists the user's tags, name-descending. With `assigned_only` the result
/// is restricted to tags linked to at least one recipe; the DISTINCT
/// collapses tags that are linked to several.
pub async fn list_by_user(
    db: &PgPool,
    user_id: Uuid,
    assigned_only: bool,
) -> anyhow::Result<Vec<Tag>> {
    let rows = if assigned_only {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT DISTINCT t.id, t.user_id, t.name, t.created_at
            FROM tags t
            JOIN recipe_tags rt ON rt.tag_id = t.id
            WHERE t.user_id = $1
            ORDER BY t.name DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(db)
        .await?
    } else {
        sqlx::query_as::<_, Tag>(
            r#"
            SELECT id, user_id, name, created_at
            FROM tags
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

pub async fn create(db: &PgPool, user_id: Uuid, name: &str) -> anyhow::Result<Tag> {
    let tag = sqlx::query_as::<_, Tag>(
        r#"
        INSERT INTO tags (user_id, name)
        VALUES ($1, $2)
        RETURNING id, user_id, name, created_at
        "#,
    )
    .bind(user_id)
    .bind(name)
    .fetch_one(db)
    .await?;
    Ok(tag)
}

pub async fn rename(
    db: &PgPool,
    user_id: Uuid,
    tag_id: Uuid,
    name: &str,
) -> anyhow::Result<Option<Tag>> {
    let tag = sqlx::query_as::<_, Tag>(
        r#"
        UPDATE tags
        SET name = $3
        WHERE id = $1 AND user_id = $2
        RETURNING id, user_id, name, created_at
        "#,
    )
    .bind(tag_id)
    .bind(user_id)
    .bind(name)
    .fetch_optional(db)
    .await?;
    Ok(tag)
}

pub async fn delete(db: &PgPool, user_id: Uuid, tag_id: Uuid) -> anyhow::Result<bool> {
    let res = sqlx::query(r#"DELETE FROM tags WHERE id = $1 AND user_id = $2"#)
        .bind(tag_id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(res.rows_affected() > 0)
}
