//! Verification and password-reset email.
//!
//! Delivery is best-effort: `EmailService` logs failures and never returns
//! them, so a broken SMTP setup cannot block registration or resets.

pub mod smtp;
pub mod templates;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info, warn};

use templates::EmailMessage;

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("invalid address: {0}")]
    Address(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("SMTP delivery failed: {0}")]
    Transport(String),
}

/// Delivers one HTML message.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<(), EmailError>;
}

/// Used when no SMTP credentials are configured: logs and drops.
pub struct DisabledMailer;

#[async_trait]
impl Mailer for DisabledMailer {
    async fn send(&self, to: &str, message: &EmailMessage) -> Result<(), EmailError> {
        warn!("Email disabled; not sending '{}' to {to}", message.subject);
        Ok(())
    }
}

#[derive(Clone)]
pub struct EmailService {
    mailer: Arc<dyn Mailer>,
    frontend_url: String,
}

impl EmailService {
    pub fn new(mailer: Arc<dyn Mailer>, frontend_url: &str) -> Self {
        Self {
            mailer,
            frontend_url: frontend_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn send_verification(&self, email: &str, name: &str, token: &str) {
        let message = templates::verification_email(&self.frontend_url, name, token);
        self.deliver(email, &message, "Verification").await;
    }

    pub async fn send_password_reset(&self, email: &str, name: &str, token: &str) {
        let message = templates::reset_email(&self.frontend_url, name, token);
        self.deliver(email, &message, "Password reset").await;
    }

    async fn deliver(&self, to: &str, message: &EmailMessage, kind: &str) {
        match self.mailer.send(to, message).await {
            Ok(()) => info!("{kind} email sent to {to}"),
            Err(e) => error!("Failed to send {kind} email to {to}: {e}"),
        }
    }
}
