use serde::Serialize;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::errors::{is_unique_violation, AppError};
use crate::models::page_view::NewPageView;
use crate::models::portfolio::{AdminPortfolioRow, PortfolioRow};
use crate::models::resume::ResumeData;

pub struct NewPortfolio<'a> {
    pub user_id: Uuid,
    pub slug: &'a str,
    pub parsed_data: &'a ResumeData,
    pub resume_filename: Option<&'a str>,
}

/// Partial update. `None` leaves a column untouched; `custom_domain: Some(None)` clears it.
#[derive(Debug, Default)]
pub struct PortfolioChanges {
    pub parsed_data: Option<ResumeData>,
    pub theme: Option<String>,
    pub primary_color: Option<String>,
    pub template_id: Option<String>,
    pub mode: Option<String>,
    pub is_published: Option<bool>,
    pub hidden_sections: Option<String>,
    pub custom_domain: Option<Option<String>>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct TopPortfolio {
    pub slug: String,
    pub views: i32,
    pub is_published: bool,
}

pub async fn find_by_user(pool: &PgPool, user_id: Uuid) -> Result<Option<PortfolioRow>, sqlx::Error> {
    sqlx::query_as::<_, PortfolioRow>("SELECT * FROM portfolios WHERE user_id = $1")
        .bind(user_id)
        .fetch_optional(pool)
        .await
}

pub async fn find_published_by_slug(
    pool: &PgPool,
    slug: &str,
) -> Result<Option<PortfolioRow>, sqlx::Error> {
    sqlx::query_as::<_, PortfolioRow>(
        "SELECT * FROM portfolios WHERE slug = $1 AND is_published",
    )
    .bind(slug)
    .fetch_optional(pool)
    .await
}

pub async fn find_published_by_domain(
    pool: &PgPool,
    domain: &str,
) -> Result<Option<PortfolioRow>, sqlx::Error> {
    sqlx::query_as::<_, PortfolioRow>(
        "SELECT * FROM portfolios WHERE custom_domain = $1 AND is_published",
    )
    .bind(domain)
    .fetch_optional(pool)
    .await
}

/// User id owning `slug`, if any portfolio has it.
pub async fn slug_owner(pool: &PgPool, slug: &str) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT user_id FROM portfolios WHERE slug = $1")
        .bind(slug)
        .fetch_optional(pool)
        .await
}

/// User id owning `domain`, if any portfolio has it.
pub async fn domain_owner(pool: &PgPool, domain: &str) -> Result<Option<Uuid>, sqlx::Error> {
    sqlx::query_scalar("SELECT user_id FROM portfolios WHERE custom_domain = $1")
        .bind(domain)
        .fetch_optional(pool)
        .await
}

pub async fn insert(pool: &PgPool, new: NewPortfolio<'_>) -> Result<PortfolioRow, AppError> {
    sqlx::query_as::<_, PortfolioRow>(
        r#"
        INSERT INTO portfolios (user_id, slug, parsed_data, resume_filename)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(new.user_id)
    .bind(new.slug)
    .bind(Json(new.parsed_data))
    .bind(new.resume_filename)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_or_db(e, "Portfolio slug is already taken"))
}

/// Overwrites the stored résumé data after a re-upload.
pub async fn replace_parsed_data(
    pool: &PgPool,
    id: Uuid,
    parsed_data: &ResumeData,
    resume_filename: Option<&str>,
) -> Result<PortfolioRow, sqlx::Error> {
    sqlx::query_as::<_, PortfolioRow>(
        r#"
        UPDATE portfolios
        SET parsed_data = $2,
            resume_filename = COALESCE($3, resume_filename),
            updated_at = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(Json(parsed_data))
    .bind(resume_filename)
    .fetch_one(pool)
    .await
}

pub async fn apply_changes(
    pool: &PgPool,
    id: Uuid,
    changes: PortfolioChanges,
) -> Result<PortfolioRow, AppError> {
    let (set_domain, domain) = match changes.custom_domain {
        Some(domain) => (true, domain),
        None => (false, None),
    };

    sqlx::query_as::<_, PortfolioRow>(
        r#"
        UPDATE portfolios
        SET parsed_data     = COALESCE($2, parsed_data),
            theme           = COALESCE($3, theme),
            primary_color   = COALESCE($4, primary_color),
            template_id     = COALESCE($5, template_id),
            mode            = COALESCE($6, mode),
            is_published    = COALESCE($7, is_published),
            hidden_sections = COALESCE($8, hidden_sections),
            custom_domain   = CASE WHEN $9 THEN $10 ELSE custom_domain END,
            updated_at      = NOW()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(changes.parsed_data.map(Json))
    .bind(changes.theme)
    .bind(changes.primary_color)
    .bind(changes.template_id)
    .bind(changes.mode)
    .bind(changes.is_published)
    .bind(changes.hidden_sections)
    .bind(set_domain)
    .bind(domain)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_or_db(e, "Custom domain is already in use"))
}

pub async fn set_published(
    pool: &PgPool,
    id: Uuid,
    is_published: bool,
) -> Result<PortfolioRow, sqlx::Error> {
    sqlx::query_as::<_, PortfolioRow>(
        "UPDATE portfolios SET is_published = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(is_published)
    .fetch_one(pool)
    .await
}

pub async fn set_slug(pool: &PgPool, id: Uuid, slug: &str) -> Result<PortfolioRow, AppError> {
    sqlx::query_as::<_, PortfolioRow>(
        "UPDATE portfolios SET slug = $2, updated_at = NOW() WHERE id = $1 RETURNING *",
    )
    .bind(id)
    .bind(slug)
    .fetch_one(pool)
    .await
    .map_err(|e| conflict_or_db(e, "This URL is already taken"))
}

/// Counts one public view: bumps the counter and appends a page-view row
/// in the same transaction. Returns the new counter value.
pub async fn record_public_view(
    pool: &PgPool,
    id: Uuid,
    view: &NewPageView,
) -> Result<i32, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let view_count: i32 = sqlx::query_scalar(
        "UPDATE portfolios SET view_count = view_count + 1 WHERE id = $1 RETURNING view_count",
    )
    .bind(id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO page_views (portfolio_id, referrer, user_agent) VALUES ($1, $2, $3)")
        .bind(id)
        .bind(&view.referrer)
        .bind(&view.user_agent)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;
    Ok(view_count)
}

pub async fn list_for_admin(pool: &PgPool) -> Result<Vec<AdminPortfolioRow>, sqlx::Error> {
    sqlx::query_as::<_, AdminPortfolioRow>(
        r#"
        SELECT p.id, p.user_id, u.email AS owner_email, p.slug, p.theme,
               p.custom_domain, p.is_published, p.view_count, p.created_at
        FROM portfolios p
        JOIN users u ON u.id = p.user_id
        ORDER BY p.created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await
}

pub async fn top_by_views(pool: &PgPool, limit: i64) -> Result<Vec<TopPortfolio>, sqlx::Error> {
    sqlx::query_as::<_, TopPortfolio>(
        r#"
        SELECT slug, view_count AS views, is_published
        FROM portfolios
        ORDER BY view_count DESC, created_at DESC
        LIMIT $1
        "#,
    )
    .bind(limit)
    .fetch_all(pool)
    .await
}

pub async fn count(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM portfolios")
        .fetch_one(pool)
        .await
}

pub async fn count_published(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM portfolios WHERE is_published")
        .fetch_one(pool)
        .await
}

fn conflict_or_db(err: sqlx::Error, conflict_message: &str) -> AppError {
    if is_unique_violation(&err) {
        AppError::Conflict(conflict_message.to_string())
    } else {
        AppError::Database(err)
    }
}
