//! `POST /resume/upload`: extract, structure, store.

use axum::{
    extract::{multipart::Field, Multipart, State},
    http::StatusCode,
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::errors::AppError;
use crate::extraction::{extract_text, validate_upload};
use crate::models::resume::ResumeData;
use crate::portfolio::service::{apply_upload, UploadMode};
use crate::state::AppState;
use crate::structuring::{structure_resume, tone::Tone};

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub message: String,
    pub portfolio_id: Uuid,
    pub slug: String,
    pub parsed_data: ResumeData,
}

/// Multipart form after reading: the file plus its two options.
#[derive(Debug, Default)]
struct UploadForm {
    file: Option<(String, Bytes)>,
    tone: Option<String>,
    mode: Option<String>,
}

/// POST /resume/upload
pub async fn handle_upload(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), AppError> {
    if user.needs_verification() {
        return Err(AppError::Forbidden(
            "Please verify your email before generating a portfolio.".to_string(),
        ));
    }

    let form = read_form(multipart).await?;
    let (filename, bytes) = form
        .file
        .ok_or_else(|| AppError::Validation("No file provided".to_string()))?;
    let tone = Tone::from_form(form.tone.as_deref().unwrap_or_default());
    let mode = UploadMode::from_form(form.mode.as_deref().unwrap_or_default());

    let kind = validate_upload(&filename, bytes.len())?;
    let text = extract_text(bytes, kind).await?;
    info!(
        "Extracted {} characters from {filename} for user {}",
        text.chars().count(),
        user.id
    );

    let parsed = structure_resume(&state.llm, &text, tone).await?;
    let portfolio = apply_upload(&state.db, user.id, parsed, &filename, mode).await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            message: "Resume parsed successfully".to_string(),
            portfolio_id: portfolio.id,
            slug: portfolio.slug,
            parsed_data: portfolio.parsed_data.0,
        }),
    ))
}

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await.map_err(invalid_multipart)? {
        match field.name() {
            Some("file") => {
                let filename = client_filename(&field);
                let bytes = field.bytes().await.map_err(invalid_multipart)?;
                form.file = Some((filename, bytes));
            }
            Some("tone") => form.tone = Some(field.text().await.map_err(invalid_multipart)?),
            Some("mode") => form.mode = Some(field.text().await.map_err(invalid_multipart)?),
            _ => {}
        }
    }
    Ok(form)
}

/// Final path component of the client-supplied name.
fn client_filename(field: &Field<'_>) -> String {
    field
        .file_name()
        .map(base_name)
        .filter(|name| !name.is_empty())
        .unwrap_or("resume")
        .to_string()
}

fn base_name(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name).trim()
}

fn invalid_multipart(e: axum::extract::multipart::MultipartError) -> AppError {
    tracing::warn!("Multipart error: {e}");
    AppError::Validation(format!("Invalid multipart data: {}", e.body_text()))
}
