//! Portfolio operations shared by the upload and portfolio routers.

use serde::Serialize;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::portfolio::PortfolioRow;
use crate::models::resume::ResumeData;
use crate::portfolio::merge::merge_resume;
use crate::portfolio::slug::{disambiguate, generate_slug, is_valid_slug, normalize_slug};
use crate::store::portfolios::{self, NewPortfolio};

const INVALID_SLUG: &str = "URL must be 3-40 characters of lowercase letters, numbers and \
                            hyphens, and cannot start or end with a hyphen";

/// How a re-upload treats the stored résumé data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadMode {
    Replace,
    Merge,
}

impl UploadMode {
    /// Anything other than `merge` replaces.
    pub fn from_form(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("merge") {
            UploadMode::Merge
        } else {
            UploadMode::Replace
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SlugCheck {
    pub slug: String,
    pub available: bool,
    pub valid: bool,
}

/// Stores a freshly structured résumé for `user_id`, creating the portfolio
/// on first upload.
pub async fn apply_upload(
    pool: &PgPool,
    user_id: Uuid,
    incoming: ResumeData,
    resume_filename: &str,
    mode: UploadMode,
) -> Result<PortfolioRow, AppError> {
    let Some(existing) = portfolios::find_by_user(pool, user_id).await? else {
        return create_with_unique_slug(pool, user_id, &incoming, Some(resume_filename)).await;
    };

    let data = match mode {
        UploadMode::Merge => merge_resume(&existing.parsed_data.0, incoming),
        UploadMode::Replace => incoming,
    };
    let row =
        portfolios::replace_parsed_data(pool, existing.id, &data, Some(resume_filename)).await?;
    info!("Updated portfolio {} ({:?})", row.slug, mode);
    Ok(row)
}

/// Creates a portfolio whose slug is derived from the résumé name. A taken
/// slug gets one extra user-id suffix; a lost race surfaces as 409.
pub async fn create_with_unique_slug(
    pool: &PgPool,
    user_id: Uuid,
    data: &ResumeData,
    resume_filename: Option<&str>,
) -> Result<PortfolioRow, AppError> {
    let mut slug = generate_slug(&data.name, user_id);
    if portfolios::slug_owner(pool, &slug).await?.is_some() {
        slug = disambiguate(&slug, user_id);
    }

    let row = portfolios::insert(
        pool,
        NewPortfolio {
            user_id,
            slug: &slug,
            parsed_data: data,
            resume_filename,
        },
    )
    .await?;
    info!("Created portfolio {} for user {user_id}", row.slug);
    Ok(row)
}

/// Moves `portfolio` to a user-chosen slug.
pub async fn change_slug(
    pool: &PgPool,
    portfolio: PortfolioRow,
    requested: &str,
) -> Result<PortfolioRow, AppError> {
    let slug = normalize_slug(requested);
    if !is_valid_slug(&slug) {
        return Err(AppError::Validation(INVALID_SLUG.to_string()));
    }
    if slug == portfolio.slug {
        return Ok(portfolio);
    }
    if let Some(owner) = portfolios::slug_owner(pool, &slug).await? {
        if owner != portfolio.user_id {
            return Err(AppError::Conflict("This URL is already taken".to_string()));
        }
    }

    let row = portfolios::set_slug(pool, portfolio.id, &slug).await?;
    info!("Portfolio {} moved from {} to {}", row.id, portfolio.slug, row.slug);
    Ok(row)
}

/// Availability of `requested` for `user_id`. Their own slug counts as available.
pub async fn check_slug(
    pool: &PgPool,
    user_id: Uuid,
    requested: &str,
) -> Result<SlugCheck, AppError> {
    let slug = normalize_slug(requested);
    if !is_valid_slug(&slug) {
        return Ok(SlugCheck {
            slug,
            available: false,
            valid: false,
        });
    }

    let available = match portfolios::slug_owner(pool, &slug).await? {
        Some(owner) => owner == user_id,
        None => true,
    };
    Ok(SlugCheck {
        slug,
        available,
        valid: true,
    })
}

/// Rejects a custom domain already attached to someone else's portfolio.
pub async fn ensure_domain_available(
    pool: &PgPool,
    user_id: Uuid,
    domain: &str,
) -> Result<(), AppError> {
    match portfolios::domain_owner(pool, domain).await? {
        Some(owner) if owner != user_id => {
            Err(AppError::Conflict("Custom domain is already in use".to_string()))
        }
        _ => Ok(()),
    }
}

/// `"HTTPS://Ada.Dev/"` → `Some("ada.dev")`. Blank input clears the domain.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let without_scheme = lowered
        .strip_prefix("https://")
        .or_else(|| lowered.strip_prefix("http://"))
        .unwrap_or(&lowered);
    let domain = without_scheme.trim_end_matches('/').trim();
    if domain.is_empty() {
        None
    } else {
        Some(domain.to_string())
    }
}
