pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    routing::{get, patch, post},
    Router,
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::admin::handlers as admin;
use crate::auth::handlers as auth;
use crate::config::AllowedOrigins;
use crate::extraction::MAX_UPLOAD_BYTES;
use crate::portfolio::handlers as portfolio;
use crate::resume::handlers as resume;
use crate::state::AppState;

/// Room for the multipart envelope on top of the largest accepted file, so an
/// oversized file reaches the handler and gets the 400 message.
const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES + 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health::root_handler))
        .route("/health", get(health::health_handler))
        // Auth
        .route("/auth/register", post(auth::handle_register))
        .route("/auth/login", post(auth::handle_login))
        .route("/auth/google", post(auth::handle_google_login))
        .route(
            "/auth/me",
            get(auth::handle_get_me)
                .patch(auth::handle_update_me)
                .delete(auth::handle_delete_me),
        )
        .route("/auth/me/password", patch(auth::handle_change_password))
        .route("/auth/verify-email", get(auth::handle_verify_email))
        .route(
            "/auth/resend-verification",
            post(auth::handle_resend_verification),
        )
        .route("/auth/forgot-password", post(auth::handle_forgot_password))
        .route("/auth/reset-password", post(auth::handle_reset_password))
        // Resume
        .route(
            "/resume/upload",
            post(resume::handle_upload).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        // Portfolio
        .route(
            "/portfolio/me",
            get(portfolio::handle_get_mine).put(portfolio::handle_update_mine),
        )
        .route("/portfolio/me/publish", post(portfolio::handle_publish))
        .route("/portfolio/me/unpublish", post(portfolio::handle_unpublish))
        .route("/portfolio/me/regenerate", post(portfolio::handle_regenerate))
        .route("/portfolio/me/slug", patch(portfolio::handle_update_slug))
        .route("/portfolio/me/analytics", get(portfolio::handle_analytics))
        .route("/portfolio/preview", get(portfolio::handle_preview))
        .route("/portfolio/check-slug", get(portfolio::handle_check_slug))
        .route("/portfolio/public/:slug", get(portfolio::handle_public_by_slug))
        .route(
            "/portfolio/domain/:domain",
            get(portfolio::handle_public_by_domain),
        )
        // Admin
        .route("/admin/stats", get(admin::handle_stats))
        .route("/admin/users", get(admin::handle_list_users))
        .route("/admin/portfolios", get(admin::handle_list_portfolios))
        .with_state(state)
}

/// A wildcard origin drops credentials; an explicit list allows them and also
/// admits Vercel preview deployments.
pub fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    match origins {
        AllowedOrigins::Any { .. } => CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any),
        AllowedOrigins::List(_) => {
            let origins = origins.clone();
            CorsLayer::new()
                .allow_origin(AllowOrigin::predicate(
                    move |origin: &HeaderValue, _parts| {
                        origin
                            .to_str()
                            .map(|o| origins.is_allowed(o))
                            .unwrap_or(false)
                    },
                ))
                .allow_methods([
                    Method::GET,
                    Method::POST,
                    Method::PUT,
                    Method::PATCH,
                    Method::DELETE,
                    Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
                .allow_credentials(true)
        }
    }
}
