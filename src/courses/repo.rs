use crate::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Course resource, owned by the teacher who listed it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Course {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub link: String,
    pub created_at: OffsetDateTime,
}

pub async fn list(db: &PgPool, limit: i64, offset: i64) -> Result<Vec<Course>, AppError> {
    let rows = sqlx::query_as::<_, Course>(
        r#"
        SELECT id, teacher_id, title, description, link, created_at
        FROM courses
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

pub async fn list_by_teacher(db: &PgPool, teacher_id: Uuid) -> Result<Vec<Course>, AppError> {
    let rows = sqlx::query_as::<_, Course>(
        r#"
        SELECT id, teacher_id, title, description, link, created_at
        FROM courses
        WHERE teacher_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(teacher_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Course>, AppError> {
    let course = sqlx::query_as::<_, Course>(
        r#"
        SELECT id, teacher_id, title, description, link, created_at
        FROM courses
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(course)
}

pub async fn create(
    db: &PgPool,
    teacher_id: Uuid,
    title: &str,
    description: Option<&str>,
    link: &str,
) -> Result<Course, AppError> {
    let course = sqlx::query_as::<_, Course>(
        r#"
        INSERT INTO courses (teacher_id, title, description, link)
        VALUES ($1, $2, $3, $4)
        RETURNING id, teacher_id, title, description, link, created_at
        "#,
    )
    .bind(teacher_id)
    .bind(title)
    .bind(description)
    .bind(link)
    .fetch_one(db)
    .await?;
    Ok(course)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    title: &str,
    description: Option<&str>,
    link: &str,
) -> Result<Course, AppError> {
    let course = sqlx::query_as::<_, Course>(
        r#"
        UPDATE courses
        SET title = $2, description = $3, link = $4
        WHERE id = $1
        RETURNING id, teacher_id, title, description, link, created_at
        "#,
    )
    .bind(id)
    .bind(title)
    .bind(description)
    .bind(link)
    .fetch_one(db)
    .await?;
    Ok(course)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
    let res = sqlx::query(r#"DELETE FROM courses WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("course"));
    }
    Ok(())
}

pub async fn count(db: &PgPool) -> Result<i64, AppError> {
    let n: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM courses"#)
        .fetch_one(db)
        .await?;
    Ok(n)
}

pub async fn recent(db: &PgPool, limit: i64) -> Result<Vec<Course>, AppError> {
    let rows = sqlx::query_as::<_, Course>(
        r#"
        SELECT id, teacher_id, title, description, link, created_at
        FROM courses
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
