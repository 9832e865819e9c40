use crate::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Blog post, owned by its author.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub content: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub async fn list(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<Post>, AppError> {
    let rows = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, title, content, created_at, updated_at
        FROM posts
        ORDER BY created_at DESC
        LIMIT $1 OFFSET $2
        "#,
    )
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Post>, AppError> {
    let rows = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, title, content, created_at, updated_at
        FROM posts
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Post>, AppError> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, title, content, created_at, updated_at
        FROM posts
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(post)
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    title: &str,
    content: &str,
) -> Result<Post, AppError> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (user_id, title, content)
        VALUES ($1, $2, $3)
        RETURNING id, user_id, title, content, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(title)
    .bind(content)
    .fetch_one(db)
    .await?;
    Ok(post)
}

pub async fn update(db: &PgPool, id: Uuid, title: &str, content: &str) -> Result<Post, AppError> {
    let post = sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts
        SET title = $2, content = $3, updated_at = now()
        WHERE id = $1
        RETURNING id, user_id, title, content, created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(content)
    .fetch_one(db)
    .await?;
    Ok(post)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
    let res = sqlx::query(r#"DELETE FROM posts WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("post"));
    }
    Ok(())
}

pub async fn count(db: &PgPool) -> Result<i64, AppError> {
    let n: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM posts"#)
        .fetch_one(db)
        .await?;
    Ok(n)
}

pub async fn recent(db: &PgPool, limit: i64) -> Result<Vec<Post>, AppError> {
    let rows = sqlx::query_as::<_, Post>(
        r#"
        SELECT id, user_id, title, content, created_at, updated_at
        FROM posts
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
