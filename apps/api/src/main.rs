use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use folio_api::auth::google::GoogleClient;
use folio_api::auth::tokens::TokenKeys;
use folio_api::config::Config;
use folio_api::db::{create_pool, run_migrations};
use folio_api::email::smtp::SmtpMailer;
use folio_api::email::{DisabledMailer, EmailService, Mailer};
use folio_api::llm_client::LlmClient;
use folio_api::routes::{build_router, cors_layer};
use folio_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "folio_api={level},tower_http={level}",
                level = &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Folio API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL and bring the schema up to date
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    tokio::fs::create_dir_all(&config.upload_dir)
        .await
        .with_context(|| format!("Failed to create upload directory {}", config.upload_dir))?;

    // Initialize LLM client
    let llm = LlmClient::new(
        config.ai_api_key.clone(),
        &config.ai_api_base,
        config.ai_model.clone(),
    )?;
    info!("LLM client initialized (model: {})", llm.model());

    let google = GoogleClient::new(config.google_userinfo_url.clone())?;

    // Initialize email delivery
    let mailer: Arc<dyn Mailer> = if config.smtp.is_configured() {
        let mailer = SmtpMailer::new(&config.smtp)?;
        info!("SMTP mailer initialized ({}:{})", config.smtp.host, config.smtp.port);
        Arc::new(mailer)
    } else {
        warn!("MAIL_USERNAME/MAIL_PASSWORD not set; outgoing email is disabled");
        Arc::new(DisabledMailer)
    };
    let email = EmailService::new(mailer, config.frontend_base_url());

    // Build app state
    let cors = cors_layer(&config.frontend_origins);
    let port = config.port;
    let state = AppState {
        db,
        llm,
        tokens: TokenKeys::from_config(&config),
        google,
        email,
        config: Arc::new(config),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
