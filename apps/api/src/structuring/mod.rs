//! AI structuring — turns extracted résumé text into `ResumeData` and rewrites
//! individual portfolio fields on request.
//!
//! All LLM calls go through llm_client. A reply that is not a JSON object
//! degrades to `ResumeData::fallback` instead of failing the upload.

pub mod prompts;
pub mod tone;

use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm_client::{strip_json_fences, CompletionParams, LlmClient};
use crate::models::resume::ResumeData;
use prompts::{
    resume_parse_system, with_plain_text_rule, BIO_REWRITE, EXPERIENCE_REWRITE, PROJECT_REWRITE,
    RESUME_PARSE_USER_TEMPLATE, SUMMARY_REWRITE, TAGLINE_REWRITE,
};
use tone::Tone;

const PARSE_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.3,
    max_tokens: 4096,
};

const REWRITE_PARAMS: CompletionParams = CompletionParams {
    temperature: 0.7,
    max_tokens: 512,
};

/// Portfolio fields the AI may rewrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RewriteField {
    Summary,
    Tagline,
    Bio,
    ProjectDescription,
    ExperienceDescription,
}

impl RewriteField {
    pub const ALLOWED: &'static str =
        "summary, tagline, bio, project_description, experience_description";

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "summary" => Some(RewriteField::Summary),
            "tagline" => Some(RewriteField::Tagline),
            "bio" => Some(RewriteField::Bio),
            "project_description" => Some(RewriteField::ProjectDescription),
            "experience_description" => Some(RewriteField::ExperienceDescription),
            _ => None,
        }
    }

    fn system_prompt(&self) -> String {
        let base = match self {
            RewriteField::Summary => SUMMARY_REWRITE,
            RewriteField::Tagline => TAGLINE_REWRITE,
            RewriteField::Bio => BIO_REWRITE,
            RewriteField::ProjectDescription => PROJECT_REWRITE,
            RewriteField::ExperienceDescription => EXPERIENCE_REWRITE,
        };
        with_plain_text_rule(base)
    }
}

/// Sends résumé text to the model and returns the structured result.
/// Transport or provider failure is an error (502); an unparseable reply is not.
pub async fn structure_resume(
    llm: &LlmClient,
    resume_text: &str,
    tone: Tone,
) -> Result<ResumeData, AppError> {
    let system = resume_parse_system(tone.instruction());
    let user = RESUME_PARSE_USER_TEMPLATE.replace("{resume_text}", resume_text);

    let raw = llm
        .complete(&system, &user, PARSE_PARAMS)
        .await
        .map_err(|e| AppError::Llm(format!("AI parsing failed: {e}")))?;

    Ok(parse_model_reply(&raw, resume_text))
}

/// Parses the model's reply, degrading to the fallback structure.
///
/// Any JSON object is accepted; stray field types are coerced by the
/// `ResumeData` decoder rather than discarding the whole reply.
pub fn parse_model_reply(raw: &str, resume_text: &str) -> ResumeData {
    let parsed = serde_json::from_str::<Value>(strip_json_fences(raw)).and_then(|value| {
        if value.is_object() {
            ResumeData::deserialize(value)
        } else {
            Err(serde::de::Error::custom("reply is not a JSON object"))
        }
    });

    match parsed {
        Ok(data) => {
            info!(
                "Résumé structured: {} skills, {} projects, {} roles",
                data.skills.len(),
                data.projects.len(),
                data.experience.len()
            );
            data
        }
        Err(e) => {
            warn!("AI reply was not valid résumé JSON ({e}); using fallback structure");
            ResumeData::fallback(resume_text)
        }
    }
}

/// Asks the model to improve a single field's text.
pub async fn rewrite_field(
    llm: &LlmClient,
    field: RewriteField,
    current_value: &str,
    context: &str,
) -> Result<String, AppError> {
    let user = rewrite_user_message(current_value, context);
    llm.complete(&field.system_prompt(), &user, REWRITE_PARAMS)
        .await
        .map_err(|e| AppError::Llm(format!("AI generation failed: {e}")))
}

fn rewrite_user_message(current_value: &str, context: &str) -> String {
    if context.trim().is_empty() {
        current_value.to_string()
    } else {
        format!("Context: {context}\n\nText to improve: {current_value}")
    }
}
