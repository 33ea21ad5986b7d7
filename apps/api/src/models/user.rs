use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// How an account signs in. Stored as lowercase text in `users.auth_provider`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthProvider {
    Email,
    Google,
}

impl AuthProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthProvider::Email => "email",
            AuthProvider::Google => "google",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: Option<String>,
    pub name: String,
    pub auth_provider: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_verified: bool,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub fn provider(&self) -> AuthProvider {
        if self.auth_provider == AuthProvider::Google.as_str() {
            AuthProvider::Google
        } else {
            AuthProvider::Email
        }
    }

    /// Email accounts must confirm their address before generating a portfolio.
    pub fn needs_verification(&self) -> bool {
        self.provider() == AuthProvider::Email && !self.is_verified
    }
}

/// Admin listing row: user plus whether they own a portfolio.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminUserRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub auth_provider: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub is_verified: bool,
    pub has_portfolio: bool,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(provider: &str, verified: bool) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            email: "ada@example.com".into(),
            hashed_password: Some("$2b$12$hash".into()),
            name: "Ada".into(),
            auth_provider: provider.into(),
            is_active: true,
            is_admin: false,
            is_verified: verified,
            avatar_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_password_hash_never_serialized() {
        let json = serde_json::to_value(user("email", true)).unwrap();
        assert!(json.get("hashed_password").is_none());
        assert_eq!(json["email"], "ada@example.com");
    }

    #[test]
    fn test_only_unverified_email_accounts_need_verification() {
        assert!(user("email", false).needs_verification());
        assert!(!user("email", true).needs_verification());
        assert!(!user("google", false).needs_verification());
    }
}
