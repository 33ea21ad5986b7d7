//! Axum route handlers for `/admin/*`. Every handler requires `AdminUser`.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::extractor::AdminUser;
use crate::errors::AppError;
use crate::models::portfolio::AdminPortfolioRow;
use crate::models::user::AdminUserRow;
use crate::state::AppState;
use crate::store::portfolios::{self, TopPortfolio};
use crate::store::{page_views, users};

/// Portfolios listed under `recent_portfolios` on the dashboard.
const TOP_PORTFOLIOS: i64 = 5;

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub total_users: i64,
    pub total_portfolios: i64,
    pub published_portfolios: i64,
    pub total_views: i64,
    pub verified_users: i64,
    pub recent_portfolios: Vec<TopPortfolio>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserSearchQuery {
    pub search: Option<String>,
}

/// GET /admin/stats
pub async fn handle_stats(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<StatsResponse>, AppError> {
    let db = &state.db;
    Ok(Json(StatsResponse {
        total_users: users::count(db).await?,
        total_portfolios: portfolios::count(db).await?,
        published_portfolios: portfolios::count_published(db).await?,
        total_views: page_views::count_all(db).await?,
        verified_users: users::count_verified(db).await?,
        recent_portfolios: portfolios::top_by_views(db, TOP_PORTFOLIOS).await?,
    }))
}

/// GET /admin/users?search=
pub async fn handle_list_users(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
    Query(query): Query<UserSearchQuery>,
) -> Result<Json<Vec<AdminUserRow>>, AppError> {
    Ok(Json(
        users::list_for_admin(&state.db, query.search.as_deref()).await?,
    ))
}

/// GET /admin/portfolios
pub async fn handle_list_portfolios(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<AdminPortfolioRow>>, AppError> {
    Ok(Json(portfolios::list_for_admin(&state.db).await?))
}
