use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::google::GoogleClient;
use crate::auth::tokens::TokenKeys;
use crate::config::Config;
use crate::email::EmailService;
use crate::llm_client::LlmClient;

/// Shared application state injected into all route handlers via Axum extractors.
/// Everything here is immutable after startup.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub llm: LlmClient,
    pub tokens: TokenKeys,
    pub google: GoogleClient,
    pub email: EmailService,
    pub config: Arc<Config>,
}
