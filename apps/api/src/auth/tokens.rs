//! Signed JWTs: bearer session tokens and single-purpose email tokens.
//!
//! Email tokens carry a `type` claim (`verify` / `reset`). A token is only
//! accepted for the purpose it was minted for, and session decoding rejects
//! any token that carries a `type` at all.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::Config;

pub const VERIFY_TOKEN_TTL_HOURS: i64 = 24;
pub const RESET_TOKEN_TTL_MINUTES: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenPurpose {
    Verify,
    Reset,
}

impl TokenPurpose {
    fn ttl(&self) -> Duration {
        match self {
            TokenPurpose::Verify => Duration::hours(VERIFY_TOKEN_TTL_HOURS),
            TokenPurpose::Reset => Duration::minutes(RESET_TOKEN_TTL_MINUTES),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: Uuid,
    exp: i64,
    iat: i64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    purpose: Option<TokenPurpose>,
}

#[derive(Debug, Error, PartialEq)]
pub enum TokenError {
    #[error("token is invalid or expired")]
    Invalid,

    #[error("token was issued for a different purpose")]
    WrongPurpose,

    #[error("failed to sign token")]
    Signing,
}

/// Signing material and lifetimes, built once from `Config`.
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    algorithm: Algorithm,
    session_ttl: Duration,
}

impl TokenKeys {
    pub fn new(secret: &str, algorithm: Algorithm, session_ttl_minutes: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            algorithm,
            session_ttl: Duration::minutes(session_ttl_minutes),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_secret,
            config.jwt_algorithm,
            config.access_token_expire_minutes,
        )
    }

    pub fn issue_session(&self, user_id: Uuid) -> Result<String, TokenError> {
        self.sign(user_id, self.session_ttl, None)
    }

    pub fn issue_for(&self, user_id: Uuid, purpose: TokenPurpose) -> Result<String, TokenError> {
        self.sign(user_id, purpose.ttl(), Some(purpose))
    }

    /// User id of a valid session token.
    pub fn decode_session(&self, token: &str) -> Result<Uuid, TokenError> {
        let claims = self.decode_claims(token)?;
        match claims.purpose {
            None => Ok(claims.sub),
            Some(_) => Err(TokenError::WrongPurpose),
        }
    }

    /// User id of a valid token minted for `expected`.
    pub fn decode_for(&self, token: &str, expected: TokenPurpose) -> Result<Uuid, TokenError> {
        let claims = self.decode_claims(token)?;
        match claims.purpose {
            Some(purpose) if purpose == expected => Ok(claims.sub),
            _ => Err(TokenError::WrongPurpose),
        }
    }

    fn sign(
        &self,
        user_id: Uuid,
        ttl: Duration,
        purpose: Option<TokenPurpose>,
    ) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
            purpose,
        };
        encode(&Header::new(self.algorithm), &claims, &self.encoding)
            .map_err(|_| TokenError::Signing)
    }

    fn decode_claims(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &self.decoding, &Validation::new(self.algorithm))
            .map(|data| data.claims)
            .map_err(|_| TokenError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys() -> TokenKeys {
        TokenKeys::new("test-secret-at-least-32-characters-long", Algorithm::HS256, 60)
    }

    #[test]
    fn test_session_round_trip() {
        let keys = keys();
        let id = Uuid::new_v4();
        let token = keys.issue_session(id).unwrap();
        assert_eq!(keys.decode_session(&token).unwrap(), id);
    }

    #[test]
    fn test_verify_token_rejected_as_reset() {
        let keys = keys();
        let id = Uuid::new_v4();
        let token = keys.issue_for(id, TokenPurpose::Verify).unwrap();
        assert_eq!(keys.decode_for(&token, TokenPurpose::Verify).unwrap(), id);
        assert_eq!(
            keys.decode_for(&token, TokenPurpose::Reset),
            Err(TokenError::WrongPurpose)
        );
    }

    #[test]
    fn test_reset_token_rejected_as_verify() {
        let keys = keys();
        let token = keys.issue_for(Uuid::new_v4(), TokenPurpose::Reset).unwrap();
        assert_eq!(
            keys.decode_for(&token, TokenPurpose::Verify),
            Err(TokenError::WrongPurpose)
        );
    }

    #[test]
    fn test_session_token_is_not_an_email_token_and_vice_versa() {
        let keys = keys();
        let id = Uuid::new_v4();
        let session = keys.issue_session(id).unwrap();
        assert_eq!(
            keys.decode_for(&session, TokenPurpose::Verify),
            Err(TokenError::WrongPurpose)
        );
        let verify = keys.issue_for(id, TokenPurpose::Verify).unwrap();
        assert_eq!(keys.decode_session(&verify), Err(TokenError::WrongPurpose));
    }

    #[test]
    fn test_other_secret_is_invalid() {
        let token = keys().issue_session(Uuid::new_v4()).unwrap();
        let other = TokenKeys::new("a-completely-different-secret-value", Algorithm::HS256, 60);
        assert_eq!(other.decode_session(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_expired_token_is_invalid() {
        let keys = TokenKeys::new("test-secret-at-least-32-characters-long", Algorithm::HS256, -10);
        let token = keys.issue_session(Uuid::new_v4()).unwrap();
        assert_eq!(keys.decode_session(&token), Err(TokenError::Invalid));
    }

    #[test]
    fn test_garbage_is_invalid() {
        assert_eq!(keys().decode_session("not.a.jwt"), Err(TokenError::Invalid));
    }

    #[test]
    fn test_purpose_serialized_as_type_claim() {
        let keys = keys();
        let token = keys.issue_for(Uuid::new_v4(), TokenPurpose::Reset).unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        let raw = decode::<serde_json::Value>(&token, &DecodingKey::from_secret(b""), &validation)
            .unwrap()
            .claims;
        assert_eq!(raw["type"], "reset");
    }
}
