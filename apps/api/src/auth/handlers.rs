//! Axum route handlers for `/auth/*`.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::extractor::AuthUser;
use crate::auth::password::{hash_password, validate_new_password, verify_password};
use crate::auth::tokens::TokenPurpose;
use crate::errors::AppError;
use crate::models::user::{AuthProvider, UserRow};
use crate::state::AppState;
use crate::store::users::{self, NewUser};

const GENERIC_EMAIL_REPLY: &str =
    "If an account exists for that email, a message has been sent.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct GoogleLoginRequest {
    pub credential: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub user: UserRow,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<TokenResponse>), AppError> {
    let email = normalize_email(&req.email)?;
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }
    validate_new_password(&req.password)?;

    if users::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Validation("Email already registered".to_string()));
    }

    let hashed = hash_password(&req.password).await?;
    let user = users::insert(
        &state.db,
        NewUser {
            name,
            email: &email,
            hashed_password: Some(&hashed),
            provider: AuthProvider::Email,
            is_verified: false,
            avatar_url: None,
        },
    )
    .await?;
    info!("Registered user {}", user.id);

    send_verification(&state, &user).await;

    let response = session_response(&state, user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

    let email = req.email.trim().to_lowercase();
    let user = users::find_by_email(&state.db, &email)
        .await?
        .ok_or_else(invalid)?;

    let Some(hashed) = user.hashed_password.as_deref() else {
        return Err(AppError::Unauthorized(
            "This account uses Google sign-in. Please continue with Google.".to_string(),
        ));
    };
    if !verify_password(&req.password, hashed).await? {
        return Err(invalid());
    }
    if !user.is_active {
        return Err(AppError::Forbidden("Account is deactivated".to_string()));
    }

    Ok(Json(session_response(&state, user)?))
}

/// POST /auth/google
///
/// First sign-in creates a verified Google account. An email that already
/// belongs to a password account is refused rather than silently linked.
pub async fn handle_google_login(
    State(state): State<AppState>,
    Json(req): Json<GoogleLoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let profile = state.google.fetch_profile(req.credential.trim()).await?;
    let email = profile.email.trim().to_lowercase();

    let user = match users::find_by_email(&state.db, &email).await? {
        None => {
            let name = profile.display_name();
            let user = users::insert(
                &state.db,
                NewUser {
                    name: &name,
                    email: &email,
                    hashed_password: None,
                    provider: AuthProvider::Google,
                    is_verified: true,
                    avatar_url: profile.picture.as_deref(),
                },
            )
            .await?;
            info!("Created Google account {}", user.id);
            user
        }
        Some(existing) if existing.provider() == AuthProvider::Google => {
            match profile.picture.as_deref() {
                Some(picture) if existing.avatar_url.as_deref() != Some(picture) => {
                    users::update_profile(&state.db, existing.id, None, Some(picture)).await?
                }
                _ => existing,
            }
        }
        Some(_) => {
            return Err(AppError::Validation(
                "An account with this email already exists. Please sign in with your password."
                    .to_string(),
            ));
        }
    };

    if !user.is_active {
        return Err(AppError::Forbidden("Account is deactivated".to_string()));
    }
    Ok(Json(session_response(&state, user)?))
}

/// GET /auth/me
pub async fn handle_get_me(AuthUser(user): AuthUser) -> Json<UserRow> {
    Json(user)
}

/// PATCH /auth/me
pub async fn handle_update_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UserRow>, AppError> {
    let name = match req.name.as_deref().map(str::trim) {
        Some("") => return Err(AppError::Validation("Name cannot be empty".to_string())),
        other => other,
    };
    let updated =
        users::update_profile(&state.db, user.id, name, req.avatar_url.as_deref()).await?;
    Ok(Json(updated))
}

/// PATCH /auth/me/password
pub async fn handle_change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let Some(hashed) = user.hashed_password.as_deref() else {
        return Err(AppError::Validation(
            "This account uses Google sign-in and has no password".to_string(),
        ));
    };
    if !verify_password(&req.current_password, hashed).await? {
        return Err(AppError::Validation("Current password is incorrect".to_string()));
    }
    validate_new_password(&req.new_password)?;

    let new_hash = hash_password(&req.new_password).await?;
    users::set_password(&state.db, user.id, &new_hash).await?;
    info!("Password changed for user {}", user.id);
    Ok(MessageResponse::new("Password changed successfully"))
}

/// DELETE /auth/me
pub async fn handle_delete_me(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, AppError> {
    users::delete(&state.db, user.id).await?;
    info!("Deleted user {} and their portfolio", user.id);
    Ok(StatusCode::NO_CONTENT)
}

/// GET /auth/verify-email?token=
pub async fn handle_verify_email(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<MessageResponse>, AppError> {
    let invalid = || AppError::Validation("Invalid or expired verification link".to_string());

    let user_id = state
        .tokens
        .decode_for(&query.token, TokenPurpose::Verify)
        .map_err(|_| invalid())?;

    if !users::mark_verified(&state.db, user_id).await? {
        return Err(invalid());
    }
    info!("Verified email for user {user_id}");
    Ok(MessageResponse::new("Email verified successfully"))
}

/// POST /auth/resend-verification
pub async fn handle_resend_verification(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    if let Some(user) = users::find_by_email(&state.db, &email).await? {
        if user.needs_verification() {
            send_verification(&state, &user).await;
        }
    }
    Ok(MessageResponse::new(GENERIC_EMAIL_REPLY))
}

/// POST /auth/forgot-password
pub async fn handle_forgot_password(
    State(state): State<AppState>,
    Json(req): Json<EmailRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    if let Some(user) = users::find_by_email(&state.db, &email).await? {
        if user.hashed_password.is_some() && user.is_active {
            match state.tokens.issue_for(user.id, TokenPurpose::Reset) {
                Ok(token) => {
                    state
                        .email
                        .send_password_reset(&user.email, &user.name, &token)
                        .await
                }
                Err(e) => tracing::error!("Could not sign reset token for {}: {e}", user.id),
            }
        }
    }
    Ok(MessageResponse::new(GENERIC_EMAIL_REPLY))
}

/// POST /auth/reset-password
pub async fn handle_reset_password(
    State(state): State<AppState>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    let invalid = || AppError::Validation("Invalid or expired reset link".to_string());

    let user_id = state
        .tokens
        .decode_for(&req.token, TokenPurpose::Reset)
        .map_err(|_| invalid())?;
    validate_new_password(&req.new_password)?;

    let user = users::find_by_id(&state.db, user_id)
        .await?
        .ok_or_else(invalid)?;

    let new_hash = hash_password(&req.new_password).await?;
    users::set_password(&state.db, user.id, &new_hash).await?;
    info!("Password reset for user {}", user.id);
    Ok(MessageResponse::new("Password has been reset. You can now sign in."))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn session_response(state: &AppState, user: UserRow) -> Result<TokenResponse, AppError> {
    let access_token = state
        .tokens
        .issue_session(user.id)
        .map_err(|e| AppError::Internal(e.into()))?;
    Ok(TokenResponse {
        access_token,
        token_type: "bearer",
        user,
    })
}

/// Best-effort: a signing or delivery failure is logged, never returned.
async fn send_verification(state: &AppState, user: &UserRow) {
    match state.tokens.issue_for(user.id, TokenPurpose::Verify) {
        Ok(token) => {
            state
                .email
                .send_verification(&user.email, &user.name, &token)
                .await
        }
        Err(e) => tracing::error!("Could not sign verification token for {}: {e}", user.id),
    }
}

/// Emails are compared case-insensitively; stored lowercase.
fn normalize_email(raw: &str) -> Result<String, AppError> {
    let email = raw.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => Ok(email),
        _ => Err(AppError::Validation("Invalid email format".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email_lowercases_and_trims() {
        assert_eq!(normalize_email("  Ada@Example.COM ").unwrap(), "ada@example.com");
    }

    #[test]
    fn test_normalize_email_rejects_malformed() {
        assert!(normalize_email("ada").is_err());
        assert!(normalize_email("@example.com").is_err());
        assert!(normalize_email("ada@").is_err());
    }
}
