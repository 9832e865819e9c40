use crate::error::AppError;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// Tutoring gig, owned by the student who posted it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Gig {
    pub id: Uuid,
    pub user_id: Uuid,
    pub major: String,
    pub subject: String,
    pub available_hours: String,
    pub created_at: OffsetDateTime,
}

pub async fn list(
    db: &PgPool,
    search: Option<&str>,
    major: Option<&str>,
    limit: i64,
    offset: i64,
) -> Result<Vec<Gig>, AppError> {
    let rows = sqlx::query_as::<_, Gig>(
        r#"
        SELECT id, user_id, major, subject, available_hours, created_at
        FROM gigs
        WHERE ($1::text IS NULL OR subject LIKE '%' || $1 || '%' OR major LIKE '%' || $1 || '%')
          AND ($2::text IS NULL OR major = $2)
        ORDER BY created_at DESC
        LIMIT $3 OFFSET $4
        "#,
    )
    .bind(search)
    .bind(major)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn list_by_user(db: &PgPool, user_id: Uuid) -> Result<Vec<Gig>, AppError> {
    let rows = sqlx::query_as::<_, Gig>(
        r#"
        SELECT id, user_id, major, subject, available_hours, created_at
        FROM gigs
        WHERE user_id = $1
        ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;
    Ok(rows)
}

pub async fn distinct_majors(db: &PgPool) -> Result<Vec<String>, AppError> {
    let majors: Vec<String> =
        sqlx::query_scalar(r#"SELECT DISTINCT major FROM gigs ORDER BY major"#)
            .fetch_all(db)
            .await?;
    Ok(majors)
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Gig>, AppError> {
    let gig = sqlx::query_as::<_, Gig>(
        r#"
        SELECT id, user_id, major, subject, available_hours, created_at
        FROM gigs
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    Ok(gig)
}

pub async fn create(
    db: &PgPool,
    user_id: Uuid,
    major: &str,
    subject: &str,
    available_hours: &str,
) -> Result<Gig, AppError> {
    let gig = sqlx::query_as::<_, Gig>(
        r#"
        INSERT INTO gigs (user_id, major, subject, available_hours)
        VALUES ($1, $2, $3, $4)
        RETURNING id, user_id, major, subject, available_hours, created_at
        "#,
    )
    .bind(user_id)
    .bind(major)
    .bind(subject)
    .bind(available_hours)
    .fetch_one(db)
    .await?;
    Ok(gig)
}

pub async fn update(
    db: &PgPool,
    id: Uuid,
    major: &str,
    subject: &str,
    available_hours: &str,
) -> Result<Gig, AppError> {
    let gig = sqlx::query_as::<_, Gig>(
        r#"
        UPDATE gigs
        SET major = $2, subject = $3, available_hours = $4
        WHERE id = $1
        RETURNING id, user_id, major, subject, available_hours, created_at
        "#,
    )
    .bind(id)
    .bind(major)
    .bind(subject)
    .bind(available_hours)
    .fetch_one(db)
    .await?;
    Ok(gig)
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
    let res = sqlx::query(r#"DELETE FROM gigs WHERE id = $1"#)
        .bind(id)
        .execute(db)
        .await?;
    if res.rows_affected() == 0 {
        return Err(AppError::NotFound("gig"));
    }
    Ok(())
}

pub async fn count(db: &PgPool) -> Result<i64, AppError> {
    let n: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM gigs"#)
        .fetch_one(db)
        .await?;
    Ok(n)
}

pub async fn recent(db: &PgPool, limit: i64) -> Result<Vec<Gig>, AppError> {
    let rows = sqlx::query_as::<_, Gig>(
        r#"
        SELECT id, user_id, major, subject, available_hours, created_at
        FROM gigs
        ORDER BY created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(db)
    .await?;
    Ok(rows)
}
