//! Axum route handlers for `/portfolio/*`.

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::models::portfolio::{DisplayMode, PortfolioRow, PublicPortfolio};
use crate::models::resume::ResumeData;
use crate::portfolio::analytics::{build_analytics, page_view_from_headers, AnalyticsResponse};
use crate::portfolio::service::{
    change_slug, check_slug, ensure_domain_available, normalize_domain, SlugCheck,
};
use crate::state::AppState;
use crate::store::portfolios::{self, PortfolioChanges};
use crate::structuring::{rewrite_field, RewriteField};

const NO_PORTFOLIO: &str = "No portfolio found. Please upload a resume first.";
const NOT_PUBLISHED: &str = "Portfolio not found or not published";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct UpdatePortfolioRequest {
    pub parsed_data: Option<ResumeData>,
    pub theme: Option<String>,
    pub primary_color: Option<String>,
    pub template_id: Option<String>,
    pub mode: Option<String>,
    pub is_published: Option<bool>,
    pub hidden_sections: Option<String>,
    pub custom_domain: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegenerateRequest {
    pub field: String,
    pub current_value: String,
    #[serde(default)]
    pub context: String,
}

#[derive(Debug, Serialize)]
pub struct RegenerateResponse {
    pub improved: String,
}

#[derive(Debug, Deserialize)]
pub struct SlugQuery {
    pub slug: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateSlugRequest {
    pub slug: String,
}

/// Owner's view: everything public plus publication state.
#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    #[serde(flatten)]
    pub portfolio: PublicPortfolio,
    pub is_published: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Owner handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /portfolio/me
pub async fn handle_get_mine(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<PortfolioRow>, AppError> {
    Ok(Json(load_owned(&state, user.id).await?))
}

/// PUT /portfolio/me
pub async fn handle_update_mine(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<UpdatePortfolioRequest>,
) -> Result<Json<PortfolioRow>, AppError> {
    let portfolio = load_owned(&state, user.id).await?;

    let mode = match req.mode.as_deref() {
        None => None,
        Some(raw) => Some(DisplayMode::parse(raw).ok_or_else(|| {
            AppError::Validation("Mode must be 'light' or 'dark'".to_string())
        })?),
    };

    let custom_domain = match req.custom_domain.as_deref() {
        None => None,
        Some(raw) => {
            let domain = normalize_domain(raw);
            if let Some(domain) = &domain {
                ensure_domain_available(&state.db, user.id, domain).await?;
            }
            Some(domain)
        }
    };

    let changes = PortfolioChanges {
        parsed_data: req.parsed_data,
        theme: req.theme,
        primary_color: req.primary_color,
        template_id: req.template_id,
        mode: mode.map(|m| m.as_str().to_string()),
        is_published: req.is_published,
        hidden_sections: req.hidden_sections,
        custom_domain,
    };
    let updated = portfolios::apply_changes(&state.db, portfolio.id, changes).await?;
    Ok(Json(updated))
}

/// POST /portfolio/me/publish
pub async fn handle_publish(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<PortfolioRow>, AppError> {
    set_published(&state, user.id, true).await
}

/// POST /portfolio/me/unpublish
pub async fn handle_unpublish(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<PortfolioRow>, AppError> {
    set_published(&state, user.id, false).await
}

/// POST /portfolio/me/regenerate
pub async fn handle_regenerate(
    State(state): State<AppState>,
    AuthUser(_user): AuthUser,
    Json(req): Json<RegenerateRequest>,
) -> Result<Json<RegenerateResponse>, AppError> {
    let field = RewriteField::parse(&req.field).ok_or_else(|| {
        AppError::Validation(format!("Field must be one of: {}", RewriteField::ALLOWED))
    })?;
    let improved = rewrite_field(&state.llm, field, &req.current_value, &req.context).await?;
    Ok(Json(RegenerateResponse { improved }))
}

/// GET /portfolio/preview
pub async fn handle_preview(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<PreviewResponse>, AppError> {
    let portfolio = load_owned(&state, user.id).await?;
    let is_published = portfolio.is_published;
    Ok(Json(PreviewResponse {
        portfolio: portfolio.into(),
        is_published,
    }))
}

/// GET /portfolio/check-slug?slug=
pub async fn handle_check_slug(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Query(query): Query<SlugQuery>,
) -> Result<Json<SlugCheck>, AppError> {
    Ok(Json(check_slug(&state.db, user.id, &query.slug).await?))
}

/// PATCH /portfolio/me/slug
pub async fn handle_update_slug(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<UpdateSlugRequest>,
) -> Result<Json<PortfolioRow>, AppError> {
    let portfolio = load_owned(&state, user.id).await?;
    Ok(Json(change_slug(&state.db, portfolio, &req.slug).await?))
}

/// GET /portfolio/me/analytics
pub async fn handle_analytics(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let portfolio = load_owned(&state, user.id).await?;
    Ok(Json(build_analytics(&state.db, &portfolio, Utc::now()).await?))
}

// ────────────────────────────────────────────────────────────────────────────
// Public handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /portfolio/public/:slug
pub async fn handle_public_by_slug(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PublicPortfolio>, AppError> {
    let portfolio = portfolios::find_published_by_slug(&state.db, &slug.to_lowercase())
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_PUBLISHED.to_string()))?;
    serve_public(&state, portfolio, &headers).await
}

/// GET /portfolio/domain/:domain
pub async fn handle_public_by_domain(
    State(state): State<AppState>,
    Path(domain): Path<String>,
    headers: HeaderMap,
) -> Result<Json<PublicPortfolio>, AppError> {
    let domain =
        normalize_domain(&domain).ok_or_else(|| AppError::NotFound(NOT_PUBLISHED.to_string()))?;
    let portfolio = portfolios::find_published_by_domain(&state.db, &domain)
        .await?
        .ok_or_else(|| AppError::NotFound(NOT_PUBLISHED.to_string()))?;
    serve_public(&state, portfolio, &headers).await
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn load_owned(state: &AppState, user_id: Uuid) -> Result<PortfolioRow, AppError> {
    portfolios::find_by_user(&state.db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(NO_PORTFOLIO.to_string()))
}

async fn set_published(
    state: &AppState,
    user_id: Uuid,
    is_published: bool,
) -> Result<Json<PortfolioRow>, AppError> {
    let portfolio = load_owned(state, user_id).await?;
    let updated = portfolios::set_published(&state.db, portfolio.id, is_published).await?;
    info!(
        "Portfolio {} {}",
        updated.slug,
        if is_published { "published" } else { "unpublished" }
    );
    Ok(Json(updated))
}

/// Records the view, then returns the portfolio with the fresh counter.
async fn serve_public(
    state: &AppState,
    portfolio: PortfolioRow,
    headers: &HeaderMap,
) -> Result<Json<PublicPortfolio>, AppError> {
    let view = page_view_from_headers(
        header_str(headers, header::REFERER),
        header_str(headers, header::USER_AGENT),
    );
    let view_count = portfolios::record_public_view(&state.db, portfolio.id, &view).await?;

    let mut public = PublicPortfolio::from(portfolio);
    public.view_count = view_count;
    Ok(Json(public))
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<&str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_request_takes_mode_as_text() {
        let req: UpdatePortfolioRequest = serde_json::from_str(r#"{"mode": "sepia"}"#).unwrap();
        assert_eq!(req.mode.as_deref(), Some("sepia"));
        assert!(DisplayMode::parse("sepia").is_none());
    }

    #[test]
    fn test_update_request_fields_are_optional() {
        let req: UpdatePortfolioRequest = serde_json::from_str("{}").unwrap();
        assert!(req.parsed_data.is_none());
        assert!(req.custom_domain.is_none());
    }

    #[test]
    fn test_regenerate_context_defaults_to_empty() {
        let req: RegenerateRequest =
            serde_json::from_str(r#"{"field": "summary", "current_value": "hi"}"#).unwrap();
        assert_eq!(req.context, "");
    }

    #[test]
    fn test_header_str_reads_referer() {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, "https://github.com/".parse().unwrap());
        assert_eq!(header_str(&headers, header::REFERER), Some("https://github.com/"));
        assert_eq!(header_str(&headers, header::USER_AGENT), None);
    }
}
