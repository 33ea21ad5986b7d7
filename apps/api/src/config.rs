use std::str::FromStr;

use anyhow::{Context, Result};
use jsonwebtoken::Algorithm;

const DEFAULT_FRONTEND_URL: &str = "http://localhost:5173";
const DEV_ORIGINS: &[&str] = &["http://localhost:5173", "http://localhost:3000"];

/// Application configuration loaded from environment variables.
/// Built once at startup and shared read-only through `AppState`.
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_algorithm: Algorithm,
    pub access_token_expire_minutes: i64,
    pub ai_api_key: String,
    pub ai_api_base: String,
    pub ai_model: String,
    pub frontend_origins: AllowedOrigins,
    pub google_userinfo_url: String,
    pub smtp: SmtpSettings,
    pub upload_dir: String,
    pub port: u16,
    pub rust_log: String,
}

#[derive(Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from: String,
}

impl SmtpSettings {
    /// Email is disabled when no credentials are configured.
    pub fn is_configured(&self) -> bool {
        !self.username.is_empty() && !self.password.is_empty()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let jwt_algorithm = optional_env("JWT_ALGORITHM", "HS256");
        let jwt_algorithm = parse_hmac_algorithm(&jwt_algorithm)?;

        let username = optional_env("MAIL_USERNAME", "");
        let from = match std::env::var("MAIL_FROM") {
            Ok(v) if !v.trim().is_empty() => v,
            _ => username.clone(),
        };

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            jwt_secret: require_env("JWT_SECRET")?,
            jwt_algorithm,
            access_token_expire_minutes: optional_env("ACCESS_TOKEN_EXPIRE_MINUTES", "60")
                .parse::<i64>()
                .context("ACCESS_TOKEN_EXPIRE_MINUTES must be an integer")?,
            ai_api_key: require_env("AI_API_KEY").or_else(|_| require_env("GROQ_API_KEY"))?,
            ai_api_base: optional_env("AI_API_BASE", "https://api.groq.com/openai/v1"),
            ai_model: optional_env("AI_MODEL", "llama-3.3-70b-versatile"),
            frontend_origins: AllowedOrigins::parse(&optional_env(
                "FRONTEND_URL",
                DEFAULT_FRONTEND_URL,
            )),
            google_userinfo_url: optional_env(
                "GOOGLE_USERINFO_URL",
                "https://www.googleapis.com/oauth2/v3/userinfo",
            ),
            smtp: SmtpSettings {
                host: optional_env("SMTP_HOST", "smtp.gmail.com"),
                port: optional_env("SMTP_PORT", "587")
                    .parse::<u16>()
                    .context("SMTP_PORT must be a valid port number")?,
                username,
                password: optional_env("MAIL_PASSWORD", ""),
                from,
            },
            upload_dir: optional_env("UPLOAD_DIR", "./uploads"),
            port: optional_env("PORT", "8000")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional_env("RUST_LOG", "info"),
        })
    }

    /// Base URL used when building links in outgoing email.
    pub fn frontend_base_url(&self) -> &str {
        self.frontend_origins.primary()
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Only HMAC algorithms make sense with a shared secret.
fn parse_hmac_algorithm(raw: &str) -> Result<Algorithm> {
    let algorithm = Algorithm::from_str(raw.trim())
        .with_context(|| format!("Unknown JWT_ALGORITHM '{raw}'"))?;
    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => anyhow::bail!("JWT_ALGORITHM {other:?} is not supported; use HS256, HS384 or HS512"),
    }
}

/// Browser origins allowed to call the API.
#[derive(Debug, Clone, PartialEq)]
pub enum AllowedOrigins {
    /// `*` was configured. Keeps the first concrete origin for links.
    Any { primary: Option<String> },
    List(Vec<String>),
}

impl AllowedOrigins {
    /// Parses a comma-separated origin list. A `*` anywhere means any origin;
    /// otherwise the local dev origins are always appended.
    pub fn parse(raw: &str) -> Self {
        let raw = if raw.trim().is_empty() {
            DEFAULT_FRONTEND_URL
        } else {
            raw
        };

        let mut origins: Vec<String> = raw
            .split(',')
            .map(|o| o.trim().trim_end_matches('/').to_string())
            .filter(|o| !o.is_empty())
            .collect();

        if origins.iter().any(|o| o == "*") {
            let primary = origins.into_iter().find(|o| o != "*");
            return AllowedOrigins::Any { primary };
        }

        for dev in DEV_ORIGINS {
            if !origins.iter().any(|o| o == dev) {
                origins.push(dev.to_string());
            }
        }
        AllowedOrigins::List(origins)
    }

    pub fn is_allowed(&self, origin: &str) -> bool {
        match self {
            AllowedOrigins::Any { .. } => true,
            AllowedOrigins::List(list) => {
                list.iter().any(|o| o == origin) || is_vercel_preview(origin)
            }
        }
    }

    /// First configured origin other than `*`, or the local dev frontend.
    pub fn primary(&self) -> &str {
        let configured = match self {
            AllowedOrigins::List(list) => list.first().map(String::as_str),
            AllowedOrigins::Any { primary } => primary.as_deref(),
        };
        configured.unwrap_or(DEFAULT_FRONTEND_URL)
    }
}

/// Matches `https://<anything>.vercel.app`.
fn is_vercel_preview(origin: &str) -> bool {
    origin
        .strip_prefix("https://")
        .and_then(|rest| rest.strip_suffix(".vercel.app"))
        .map(|sub| !sub.is_empty() && !sub.contains('/'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origins_trimmed_and_dev_origins_appended() {
        let origins = AllowedOrigins::parse(" https://folio.app/ , https://www.folio.app");
        assert_eq!(
            origins,
            AllowedOrigins::List(vec![
                "https://folio.app".to_string(),
                "https://www.folio.app".to_string(),
                "http://localhost:5173".to_string(),
                "http://localhost:3000".to_string(),
            ])
        );
        assert_eq!(origins.primary(), "https://folio.app");
    }

    #[test]
    fn test_dev_origin_not_duplicated() {
        let origins = AllowedOrigins::parse("http://localhost:5173");
        match origins {
            AllowedOrigins::List(list) => assert_eq!(list.len(), 2),
            AllowedOrigins::Any { .. } => panic!("expected a list"),
        }
    }

    #[test]
    fn test_wildcard_means_any() {
        let origins = AllowedOrigins::parse("https://folio.app,*");
        assert!(matches!(origins, AllowedOrigins::Any { .. }));
        assert!(origins.is_allowed("https://anything.example"));
    }

    #[test]
    fn test_wildcard_keeps_concrete_origin_for_links() {
        assert_eq!(AllowedOrigins::parse("*, https://folio.app/").primary(), "https://folio.app");
        assert_eq!(AllowedOrigins::parse("*").primary(), "http://localhost:5173");
    }

    #[test]
    fn test_vercel_subdomains_allowed() {
        let origins = AllowedOrigins::parse("https://folio.app");
        assert!(origins.is_allowed("https://folio-git-main-team.vercel.app"));
        assert!(!origins.is_allowed("http://folio.vercel.app"));
        assert!(!origins.is_allowed("https://.vercel.app"));
        assert!(!origins.is_allowed("https://evil.example/x.vercel.app"));
        assert!(!origins.is_allowed("https://evil.example"));
    }

    #[test]
    fn test_empty_frontend_url_falls_back_to_localhost() {
        let origins = AllowedOrigins::parse("  ");
        assert_eq!(origins.primary(), "http://localhost:5173");
    }

    #[test]
    fn test_hmac_algorithms_only() {
        assert_eq!(parse_hmac_algorithm("HS512").unwrap(), Algorithm::HS512);
        assert!(parse_hmac_algorithm("RS256").is_err());
        assert!(parse_hmac_algorithm("nope").is_err());
    }
}
