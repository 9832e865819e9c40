use crate::error::AppError;
use crate::policy::Role;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
    pub role: Role,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub major: Option<String>, // meaningful for students
    pub created_at: OffsetDateTime,
}

/// Advisory lock key for the one-time first-admin transition ("unishare").
const FIRST_ADMIN_LOCK_KEY: i64 = 0x756e_6973_6861_7265;

/// Which duplicate a unique index names.
fn duplicate_from_constraint(name: &str) -> Option<AppError> {
    match name {
        "users_username_key" => Some(AppError::DuplicateUsername),
        "users_email_key" => Some(AppError::DuplicateEmail),
        _ => None,
    }
}

/// Map a unique-constraint violation onto the duplicate it names. Uniqueness
/// is enforced by the indexes themselves, so concurrent registrations with
/// the same username/email race down to a single winner in the database.
fn map_unique_violation(err: sqlx::Error) -> AppError {
    let constraint = match &err {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
            db_err.constraint().map(str::to_owned)
        }
        _ => None,
    };
    constraint
        .as_deref()
        .and_then(duplicate_from_constraint)
        .unwrap_or_else(|| AppError::from(err))
}

/// Escape LIKE wildcards so a search term matches literally. Postgres treats
/// backslash as the default LIKE escape character.
fn escape_like(term: &str) -> String {
    term.replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

impl User {
    pub async fn find_by_email(db: &PgPool, email: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, bio, avatar, major, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, bio, avatar, major, created_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, bio, avatar, major, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Create a new user with hashed password.
    pub async fn create(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
        role: Role,
        major: Option<&str>,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role, major)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, username, email, password_hash, role, bio, avatar, major, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(role)
        .bind(major)
        .fetch_one(db)
        .await
        .map_err(map_unique_violation)
    }

    /// Create the first admin account. The insert only lands while no admin
    /// row exists. Concurrent first use is serialized with a transaction-
    /// scoped advisory lock: under READ COMMITTED two bare insert-selects
    /// could each snapshot the table before either commits and both see "no
    /// admin", so the existence check must not race the insert.
    pub async fn create_first_admin(
        db: &PgPool,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<User, AppError> {
        let mut tx = db.begin().await?;

        sqlx::query(r#"SELECT pg_advisory_xact_lock($1)"#)
            .bind(FIRST_ADMIN_LOCK_KEY)
            .execute(&mut *tx)
            .await?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role)
            SELECT $1, $2, $3, 'admin'::user_role
            WHERE NOT EXISTS (SELECT 1 FROM users WHERE role = 'admin')
            RETURNING id, username, email, password_hash, role, bio, avatar, major, created_at
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_unique_violation)?;

        // Losing the race rolls the transaction back and releases the lock.
        let user = user.ok_or(AppError::AdminAlreadyExists)?;
        tx.commit().await?;
        Ok(user)
    }

    pub async fn admin_exists(db: &PgPool) -> Result<bool, AppError> {
        let exists: bool =
            sqlx::query_scalar(r#"SELECT EXISTS (SELECT 1 FROM users WHERE role = 'admin')"#)
                .fetch_one(db)
                .await?;
        Ok(exists)
    }

    pub async fn update_password(
        db: &PgPool,
        id: Uuid,
        password_hash: &str,
    ) -> Result<(), AppError> {
        let res = sqlx::query(r#"UPDATE users SET password_hash = $2 WHERE id = $1"#)
            .bind(id)
            .bind(password_hash)
            .execute(db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("user"));
        }
        Ok(())
    }

    pub async fn update_profile(
        db: &PgPool,
        id: Uuid,
        username: &str,
        email: &str,
        bio: Option<&str>,
        avatar: Option<&str>,
        major: Option<&str>,
    ) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, email = $3, bio = $4, avatar = $5, major = $6
            WHERE id = $1
            RETURNING id, username, email, password_hash, role, bio, avatar, major, created_at
            "#,
        )
        .bind(id)
        .bind(username)
        .bind(email)
        .bind(bio)
        .bind(avatar)
        .bind(major)
        .fetch_one(db)
        .await
        .map_err(map_unique_violation)
    }

    /// Delete a user. The gigs/posts/courses foreign keys cascade, so no
    /// resource survives with a dangling owner.
    pub async fn delete(db: &PgPool, id: Uuid) -> Result<(), AppError> {
        let res = sqlx::query(r#"DELETE FROM users WHERE id = $1"#)
            .bind(id)
            .execute(db)
            .await?;
        if res.rows_affected() == 0 {
            return Err(AppError::NotFound("user"));
        }
        Ok(())
    }

    pub async fn count(db: &PgPool) -> Result<i64, AppError> {
        let n: i64 = sqlx::query_scalar(r#"SELECT COUNT(*) FROM users"#)
            .fetch_one(db)
            .await?;
        Ok(n)
    }

    /// List users, newest first, optionally filtered by a literal
    /// username/email substring (admin user management view).
    pub async fn list(db: &PgPool, search: Option<&str>) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, bio, avatar, major, created_at
            FROM users
            WHERE $1::text IS NULL OR username LIKE '%' || $1 || '%' OR email LIKE '%' || $1 || '%'
            ORDER BY created_at DESC
            "#,
        )
        .bind(search.map(escape_like))
        .fetch_all(db)
        .await?;
        Ok(rows)
    }

    pub async fn recent(db: &PgPool, limit: i64) -> Result<Vec<User>, AppError> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, role, bio, avatar, major, created_at
            FROM users
            ORDER BY created_at DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(db)
        .await?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_mapping_by_constraint_name() {
        assert!(matches!(
            duplicate_from_constraint("users_username_key"),
            Some(AppError::DuplicateUsername)
        ));
        assert!(matches!(
            duplicate_from_constraint("users_email_key"),
            Some(AppError::DuplicateEmail)
        ));
        assert!(duplicate_from_constraint("gigs_user_id_fkey").is_none());
        assert!(duplicate_from_constraint("").is_none());
    }

    #[test]
    fn like_wildcards_are_escaped_to_literals() {
        assert_eq!(escape_like("50%"), "50\\%");
        assert_eq!(escape_like("a_b"), "a\\_b");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }

    // Needs a migrated database; run with `cargo test -- --ignored`.
    #[tokio::test]
    #[ignore = "requires a live postgres"]
    async fn first_admin_lands_exactly_once_under_concurrency() {
        let state = crate::state::AppState::fake();
        sqlx::migrate!("./migrations")
            .run(&state.db)
            .await
            .expect("migrations");
        sqlx::query("DELETE FROM users")
            .execute(&state.db)
            .await
            .expect("clean users");

        let (a, b) = tokio::join!(
            User::create_first_admin(&state.db, "root-a", "root-a@example.com", "$argon2id$x"),
            User::create_first_admin(&state.db, "root-b", "root-b@example.com", "$argon2id$x"),
        );
        let wins = a.is_ok() as u8 + b.is_ok() as u8;
        assert_eq!(wins, 1);
        for res in [a, b] {
            if let Err(e) = res {
                assert!(matches!(e, AppError::AdminAlreadyExists));
            }
        }

        let admins: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = 'admin'")
            .fetch_one(&state.db)
            .await
            .expect("count admins");
        assert_eq!(admins, 1);
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: Uuid::new_v4(),
            username: "alice".into(),
            email: "alice@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Student,
            bio: None,
            avatar: None,
            major: Some("Physics".into()),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2id"));
        assert!(!json.contains("password_hash"));
        assert!(json.contains("alice@example.com"));
    }
}
