//! Operator commands that run outside the request path.
//!
//! Usage: folio-maintenance <migrate | repair-fks | copy-data SOURCE_URL | check>
//! The target database is `DATABASE_URL` (from the environment or `.env`).

use std::collections::HashSet;
use std::env;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use folio_api::db::{create_pool, run_migrations};
use folio_api::models::resume::ResumeData;

const USAGE: &str = "Usage: folio-maintenance <migrate | repair-fks | copy-data <SOURCE_DATABASE_URL> | check>";

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "folio_api=info".into()),
        )
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{USAGE}");
        std::process::exit(1);
    };

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL is not set")?;
    let pool = create_pool(&database_url).await?;

    match command.as_str() {
        "migrate" => run_migrations(&pool).await?,
        "repair-fks" => repair_foreign_keys(&pool).await?,
        "copy-data" => {
            let Some(source_url) = args.get(1) else {
                bail!("copy-data needs a source database URL\n{USAGE}");
            };
            let source = create_pool(source_url).await?;
            copy_data(&source, &pool).await?;
        }
        "check" => check(&pool).await?,
        other => bail!("Unknown command '{other}'\n{USAGE}"),
    }
    Ok(())
}

/// Drops and recreates both cascade foreign keys.
async fn repair_foreign_keys(pool: &PgPool) -> Result<()> {
    let statements = [
        "ALTER TABLE page_views DROP CONSTRAINT IF EXISTS page_views_portfolio_id_fkey",
        "ALTER TABLE page_views ADD CONSTRAINT page_views_portfolio_id_fkey \
         FOREIGN KEY (portfolio_id) REFERENCES portfolios(id) ON DELETE CASCADE",
        "ALTER TABLE portfolios DROP CONSTRAINT IF EXISTS portfolios_user_id_fkey",
        "ALTER TABLE portfolios ADD CONSTRAINT portfolios_user_id_fkey \
         FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE",
    ];

    let mut tx = pool.begin().await?;
    for sql in statements {
        sqlx::query(sql)
            .execute(&mut *tx)
            .await
            .with_context(|| format!("Failed: {sql}"))?;
    }
    tx.commit().await?;
    println!("Foreign keys recreated with ON DELETE CASCADE");
    Ok(())
}

async fn check(pool: &PgPool) -> Result<()> {
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    let portfolios: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM portfolios")
        .fetch_one(pool)
        .await?;
    println!("users:      {users}");
    println!("portfolios: {portfolios}");
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// copy-data
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, FromRow)]
struct SourceUser {
    id: String,
    email: String,
    hashed_password: Option<String>,
    name: String,
    auth_provider: String,
    is_active: bool,
    is_admin: bool,
    is_verified: bool,
    avatar_url: Option<String>,
    created_at: DateTime<Utc>,
}

#[derive(Debug, FromRow)]
struct SourcePortfolio {
    id: String,
    user_id: String,
    slug: String,
    parsed_data: Option<String>,
    theme: String,
    primary_color: String,
    template_id: String,
    mode: String,
    custom_domain: Option<String>,
    is_published: bool,
    resume_filename: Option<String>,
    view_count: i32,
    hidden_sections: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct CopySummary {
    copied: usize,
    skipped: usize,
    failed: usize,
}

impl std::fmt::Display for CopySummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} copied, {} skipped, {} failed",
            self.copied, self.skipped, self.failed
        )
    }
}

/// Copies users, then portfolios, from `source` into `target`.
/// Older source schemas are fine: missing columns take their defaults.
async fn copy_data(source: &PgPool, target: &PgPool) -> Result<()> {
    let user_columns = source_columns(source, "users").await?;
    let select_users = format!(
        "SELECT {} FROM users ORDER BY 10",
        [
            column(&user_columns, "id", "text", "NULL"),
            column(&user_columns, "email", "text", "''"),
            column(&user_columns, "hashed_password", "text", "NULL"),
            column(&user_columns, "name", "text", "''"),
            column(&user_columns, "auth_provider", "text", "'email'"),
            column(&user_columns, "is_active", "boolean", "true"),
            column(&user_columns, "is_admin", "boolean", "false"),
            column(&user_columns, "is_verified", "boolean", "false"),
            column(&user_columns, "avatar_url", "text", "NULL"),
            column(&user_columns, "created_at", "timestamptz", "NOW()"),
        ]
        .join(", ")
    );
    let users: Vec<SourceUser> = sqlx::query_as(&select_users).fetch_all(source).await?;
    println!("Found {} users in source", users.len());

    let mut summary = CopySummary::default();
    for user in users {
        match copy_user(target, &user).await {
            Ok(true) => summary.copied += 1,
            Ok(false) => summary.skipped += 1,
            Err(e) => {
                eprintln!("  failed {}: {e:#}", user.email);
                summary.failed += 1;
            }
        }
    }
    println!("Users: {summary}");

    let portfolio_columns = source_columns(source, "portfolios").await?;
    let select_portfolios = format!(
        "SELECT {} FROM portfolios ORDER BY 14",
        [
            column(&portfolio_columns, "id", "text", "NULL"),
            column(&portfolio_columns, "user_id", "text", "NULL"),
            column(&portfolio_columns, "slug", "text", "''"),
            column(&portfolio_columns, "parsed_data", "text", "NULL"),
            column(&portfolio_columns, "theme", "text", "'minimal'"),
            column(&portfolio_columns, "primary_color", "text", "'#6366f1'"),
            column(&portfolio_columns, "template_id", "text", "'standard'"),
            column(&portfolio_columns, "mode", "text", "'light'"),
            column(&portfolio_columns, "custom_domain", "text", "NULL"),
            column(&portfolio_columns, "is_published", "boolean", "false"),
            column(&portfolio_columns, "resume_filename", "text", "NULL"),
            column(&portfolio_columns, "view_count", "integer", "0"),
            column(&portfolio_columns, "hidden_sections", "text", "''"),
            column(&portfolio_columns, "created_at", "timestamptz", "NOW()"),
            column(&portfolio_columns, "updated_at", "timestamptz", "NOW()"),
        ]
        .join(", ")
    );
    let portfolios: Vec<SourcePortfolio> =
        sqlx::query_as(&select_portfolios).fetch_all(source).await?;
    println!("Found {} portfolios in source", portfolios.len());

    let mut summary = CopySummary::default();
    for portfolio in portfolios {
        match copy_portfolio(target, &portfolio).await {
            Ok(true) => summary.copied += 1,
            Ok(false) => summary.skipped += 1,
            Err(e) => {
                eprintln!("  failed {}: {e:#}", portfolio.slug);
                summary.failed += 1;
            }
        }
    }
    println!("Portfolios: {summary}");

    check(target).await
}

/// `Ok(false)` when the email already exists in the target.
async fn copy_user(target: &PgPool, user: &SourceUser) -> Result<bool> {
    let email = user.email.trim().to_lowercase();
    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&email)
        .fetch_optional(target)
        .await?;
    if exists.is_some() {
        println!("  skip {email} (already present)");
        return Ok(false);
    }

    let id = Uuid::parse_str(&user.id).with_context(|| format!("bad user id {}", user.id))?;
    let provider = if user.auth_provider == "google" { "google" } else { "email" };
    sqlx::query(
        r#"
        INSERT INTO users (id, email, hashed_password, name, auth_provider, is_active,
                           is_admin, is_verified, avatar_url, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $10)
        "#,
    )
    .bind(id)
    .bind(&email)
    .bind(&user.hashed_password)
    .bind(&user.name)
    .bind(provider)
    .bind(user.is_active)
    .bind(user.is_admin)
    .bind(user.is_verified)
    .bind(&user.avatar_url)
    .bind(user.created_at)
    .execute(target)
    .await?;
    println!("  copied {email}");
    Ok(true)
}

/// `Ok(false)` when the id already exists or the owner was not copied.
async fn copy_portfolio(target: &PgPool, portfolio: &SourcePortfolio) -> Result<bool> {
    let id = Uuid::parse_str(&portfolio.id)
        .with_context(|| format!("bad portfolio id {}", portfolio.id))?;
    let user_id = Uuid::parse_str(&portfolio.user_id)
        .with_context(|| format!("bad user id {}", portfolio.user_id))?;

    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM portfolios WHERE id = $1")
        .bind(id)
        .fetch_optional(target)
        .await?;
    if exists.is_some() {
        println!("  skip {} (already present)", portfolio.slug);
        return Ok(false);
    }
    let owner: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE id = $1")
        .bind(user_id)
        .fetch_optional(target)
        .await?;
    if owner.is_none() {
        println!("  skip {} (owner not in target)", portfolio.slug);
        return Ok(false);
    }

    let parsed_data = portfolio
        .parsed_data
        .as_deref()
        .map(serde_json::from_str::<ResumeData>)
        .transpose()
        .unwrap_or_else(|e| {
            eprintln!("  {}: unreadable parsed_data ({e}); storing empty", portfolio.slug);
            None
        })
        .unwrap_or_default();
    let mode = if portfolio.mode == "dark" { "dark" } else { "light" };

    sqlx::query(
        r#"
        INSERT INTO portfolios (id, user_id, slug, parsed_data, theme, primary_color,
                                template_id, mode, custom_domain, is_published,
                                resume_filename, view_count, hidden_sections,
                                created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
        "#,
    )
    .bind(id)
    .bind(user_id)
    .bind(&portfolio.slug)
    .bind(Json(&parsed_data))
    .bind(&portfolio.theme)
    .bind(&portfolio.primary_color)
    .bind(&portfolio.template_id)
    .bind(mode)
    .bind(&portfolio.custom_domain)
    .bind(portfolio.is_published)
    .bind(&portfolio.resume_filename)
    .bind(portfolio.view_count)
    .bind(&portfolio.hidden_sections)
    .bind(portfolio.created_at)
    .bind(portfolio.updated_at)
    .execute(target)
    .await?;
    println!("  copied {}", portfolio.slug);
    Ok(true)
}

async fn source_columns(pool: &PgPool, table: &str) -> Result<HashSet<String>> {
    let names: Vec<String> = sqlx::query_scalar(
        "SELECT column_name::text FROM information_schema.columns WHERE table_name = $1",
    )
    .bind(table)
    .fetch_all(pool)
    .await?;
    if names.is_empty() {
        bail!("source database has no '{table}' table");
    }
    Ok(names.into_iter().collect())
}

/// Select expression for `name`, cast to `ty`, or `default` when the source lacks it.
fn column(present: &HashSet<String>, name: &str, ty: &str, default: &str) -> String {
    if present.contains(name) {
        format!("COALESCE({name}::{ty}, {default}::{ty}) AS {name}")
    } else {
        format!("{default}::{ty} AS {name}")
    }
}
