//! Google sign-in: exchanges a client-side access token for the user's profile.

use reqwest::Client;
use serde::Deserialize;
use tracing::warn;

use crate::errors::AppError;

const HTTP_CONNECT_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(5);
const HTTP_REQUEST_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(10);

/// Subset of the OpenID userinfo document we use.
#[derive(Debug, Clone, Deserialize)]
pub struct GoogleProfile {
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub picture: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
}

impl GoogleProfile {
    /// Display name, falling back to the local part of the email.
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self
                .email
                .split('@')
                .next()
                .unwrap_or_default()
                .to_string(),
        }
    }
}

#[derive(Clone)]
pub struct GoogleClient {
    http: Client,
    userinfo_url: String,
}

impl GoogleClient {
    pub fn new(userinfo_url: String) -> anyhow::Result<Self> {
        let http = Client::builder()
            .connect_timeout(HTTP_CONNECT_TIMEOUT)
            .timeout(HTTP_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { http, userinfo_url })
    }

    /// Any failure here means the credential cannot be trusted: 401.
    pub async fn fetch_profile(&self, access_token: &str) -> Result<GoogleProfile, AppError> {
        let response = self
            .http
            .get(&self.userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(|e| {
                warn!("Google userinfo request failed: {e}");
                AppError::Unauthorized("Invalid Google token".to_string())
            })?;

        if !response.status().is_success() {
            warn!("Google userinfo returned {}", response.status());
            return Err(AppError::Unauthorized("Invalid Google token".to_string()));
        }

        let profile: GoogleProfile = response.json().await.map_err(|e| {
            warn!("Google userinfo body unreadable: {e}");
            AppError::Unauthorized("Invalid Google token".to_string())
        })?;

        if profile.email.trim().is_empty() || profile.email_verified == Some(false) {
            return Err(AppError::Unauthorized(
                "Google account has no verified email".to_string(),
            ));
        }
        Ok(profile)
    }
}
