use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Views per UTC calendar day since `since`.
pub async fn daily_counts(
    pool: &PgPool,
    portfolio_id: Uuid,
    since: DateTime<Utc>,
) -> Result<Vec<(NaiveDate, i64)>, sqlx::Error> {
    sqlx::query_as(
        r#"
        SELECT (viewed_at AT TIME ZONE 'UTC')::date AS day, COUNT(*) AS views
        FROM page_views
        WHERE portfolio_id = $1 AND viewed_at >= $2
        GROUP BY day
        ORDER BY day
        "#,
    )
    .bind(portfolio_id)
    .bind(since)
    .fetch_all(pool)
    .await
}

/// Raw referrer values with their counts; classification happens in Rust.
pub async fn referrer_counts(
    pool: &PgPool,
    portfolio_id: Uuid,
) -> Result<Vec<(Option<String>, i64)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT referrer, COUNT(*) FROM page_views WHERE portfolio_id = $1 GROUP BY referrer",
    )
    .bind(portfolio_id)
    .fetch_all(pool)
    .await
}

pub async fn user_agent_counts(
    pool: &PgPool,
    portfolio_id: Uuid,
) -> Result<Vec<(Option<String>, i64)>, sqlx::Error> {
    sqlx::query_as(
        "SELECT user_agent, COUNT(*) FROM page_views WHERE portfolio_id = $1 GROUP BY user_agent",
    )
    .bind(portfolio_id)
    .fetch_all(pool)
    .await
}

pub async fn count_for_portfolio(pool: &PgPool, portfolio_id: Uuid) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM page_views WHERE portfolio_id = $1")
        .bind(portfolio_id)
        .fetch_one(pool)
        .await
}

pub async fn count_all(pool: &PgPool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM page_views")
        .fetch_one(pool)
        .await
}
