use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::{is_unique_violation, AppError};
use crate::models::user::{AdminUserRow, AuthProvider, UserRow};

pub struct NewUser<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub hashed_password: Option<&'a str>,
    pub provider: AuthProvider,
    pub is_verified: bool,
    pub avatar_url: Option<&'a str>,
}

pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await
}

/// Inserts a user. A concurrent registration of the same email surfaces as
/// the same duplicate-email error the handler reports.
pub async fn insert(pool: &PgPool, user: NewUser<'_>) -> Result<UserRow, AppError> {
    sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users
            (name, email, hashed_password, auth_provider, is_verified, avatar_url)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(user.name)
    .bind(user.email)
    .bind(user.hashed_password)
    .bind(user.provider.as_str())
    .bind(user.is_verified)
    .bind(user.avatar_url)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Validation("Email already registered".to_string())
        } else {
            AppError::Database(e)
        }
    })
}

/// Updates whichever profile fields are given; `None` leaves a field alone.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    name: Option<&str>,
    avatar_url: Option<&str>,
) -> Result<UserRow, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        r#"
        UPDATE users
        SET name = COALESCE($2, name),
            avatar_url = COALESCE($3, avatar_url),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(name)
    .bind(avatar_url)
    .fetch_one(pool)
    .await
}

pub async fn set_password(pool: &PgPool, id: Uuid, hashed_password: &str) -> Result<(), sqlx::Error> {
    sqlx::query("UPDATE users SET hashed_password = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(hashed_password)
        .execute(pool)
        .await?;
    Ok(())
}

/// Returns false when no such user exists.
pub async fn mark_verified(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET is_verified = TRUE, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Deletes the user; the portfolio and its page views go with it (ON DELETE CASCADE).
pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}

/// Newest first, optionally filtered by a case-insensitive substring of name or email.
pub async fn list_for_admin(
    pool: &PgPool,
    search: Option<&str>,
) -> Result<Vec<AdminUserRow>, sqlx::Error> {
    let pattern = search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| format!("%{}%", escape_like(s)));

    sqlx::query_as::<_, AdminUserRow>(
        r#"
        SELECT u.id, u.name, u.email, u.auth_provider, u.is_active, u.is_admin,
               u.is_verified, (p.id IS NOT NULL) AS has_portfolio, u.created_at
        FROM users u
        LEFT JOIN portfolios p ON p.user_id = u.id
        WHERE $1::text IS NULL OR u.name ILIKE $1 OR u.email ILIKE $1
        ORDER BY u.created_at DESC
        "#,
    )
    .bind(pattern)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
}

pub async fn count_verified(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE is_verified")
        .fetch_one(pool)
        .await
}

fn escape_like(s: &str) -> String {
    s.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}
