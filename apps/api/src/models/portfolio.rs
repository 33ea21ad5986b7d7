use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::resume::ResumeData;

/// Colour scheme of the rendered site. Stored as lowercase text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Light,
    Dark,
}

impl DisplayMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "light" => Some(DisplayMode::Light),
            "dark" => Some(DisplayMode::Dark),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Light => "light",
            DisplayMode::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct PortfolioRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub slug: String,
    pub parsed_data: Json<ResumeData>,
    pub theme: String,
    pub primary_color: String,
    pub template_id: String,
    pub mode: String,
    pub custom_domain: Option<String>,
    pub is_published: bool,
    pub resume_filename: Option<String>,
    pub view_count: i32,
    pub hidden_sections: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// What anonymous visitors receive for a published portfolio.
#[derive(Debug, Clone, Serialize)]
pub struct PublicPortfolio {
    pub id: Uuid,
    pub slug: String,
    pub parsed_data: ResumeData,
    pub theme: String,
    pub primary_color: String,
    pub template_id: String,
    pub mode: String,
    pub custom_domain: Option<String>,
    pub view_count: i32,
    pub hidden_sections: String,
}

impl From<PortfolioRow> for PublicPortfolio {
    fn from(row: PortfolioRow) -> Self {
        PublicPortfolio {
            id: row.id,
            slug: row.slug,
            parsed_data: row.parsed_data.0,
            theme: row.theme,
            primary_color: row.primary_color,
            template_id: row.template_id,
            mode: row.mode,
            custom_domain: row.custom_domain,
            view_count: row.view_count,
            hidden_sections: row.hidden_sections,
        }
    }
}

/// Admin listing row: portfolio summary with its owner's email.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminPortfolioRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub owner_email: String,
    pub slug: String,
    pub theme: String,
    pub custom_domain: Option<String>,
    pub is_published: bool,
    pub view_count: i32,
    pub created_at: DateTime<Utc>,
}
