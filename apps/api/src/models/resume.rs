//! Structured résumé schema stored in `portfolios.parsed_data`.
//!
//! Decoding is lenient so any JSON object deserializes: missing or `null`
//! fields default, numbers become text, list entries of the wrong shape are
//! skipped, and unknown keys are dropped.

use serde::{Deserialize, Serialize};

/// Characters of raw résumé text kept as the summary when AI output is unusable.
pub const FALLBACK_SUMMARY_CHARS: usize = 500;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectItem {
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
    #[serde(deserialize_with = "lenient::strings")]
    pub tech: Vec<String>,
    #[serde(deserialize_with = "lenient::link")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient::link")]
    pub github: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceItem {
    #[serde(deserialize_with = "lenient::text")]
    pub company: String,
    #[serde(deserialize_with = "lenient::text")]
    pub role: String,
    #[serde(deserialize_with = "lenient::text")]
    pub duration: String,
    #[serde(deserialize_with = "lenient::text")]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationItem {
    #[serde(deserialize_with = "lenient::text")]
    pub institution: String,
    #[serde(deserialize_with = "lenient::text")]
    pub degree: String,
    #[serde(deserialize_with = "lenient::text")]
    pub year: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResumeData {
    #[serde(deserialize_with = "lenient::text")]
    pub name: String,
    #[serde(deserialize_with = "lenient::text")]
    pub title: String,
    #[serde(deserialize_with = "lenient::text")]
    pub email: String,
    #[serde(deserialize_with = "lenient::text")]
    pub phone: String,
    #[serde(deserialize_with = "lenient::text")]
    pub location: String,
    #[serde(deserialize_with = "lenient::text")]
    pub summary: String,
    #[serde(deserialize_with = "lenient::text")]
    pub tagline: String,
    #[serde(deserialize_with = "lenient::strings")]
    pub skills: Vec<String>,
    #[serde(deserialize_with = "lenient::list")]
    pub projects: Vec<ProjectItem>,
    #[serde(deserialize_with = "lenient::list")]
    pub experience: Vec<ExperienceItem>,
    #[serde(deserialize_with = "lenient::list")]
    pub education: Vec<EducationItem>,
    #[serde(deserialize_with = "lenient::link")]
    pub github: Option<String>,
    #[serde(deserialize_with = "lenient::link")]
    pub linkedin: Option<String>,
    #[serde(deserialize_with = "lenient::link")]
    pub website: Option<String>,
}

impl ResumeData {
    /// Minimal structure used when the model's reply cannot be parsed:
    /// only the summary is filled, with the head of the raw text.
    pub fn fallback(resume_text: &str) -> Self {
        ResumeData {
            summary: resume_text.chars().take(FALLBACK_SUMMARY_CHARS).collect(),
            ..ResumeData::default()
        }
    }
}

mod lenient {
    use serde::de::{DeserializeOwned, Deserializer};
    use serde::Deserialize;
    use serde_json::Value;

    fn scalar_text(value: Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    pub fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        Ok(scalar_text(Value::deserialize(deserializer)?).unwrap_or_default())
    }

    pub fn link<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        Ok(scalar_text(Value::deserialize(deserializer)?))
    }

    /// A comma-separated string counts as a list.
    pub fn strings<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items.into_iter().filter_map(scalar_text).collect(),
            Value::String(s) => s
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        })
    }

    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        Ok(match Value::deserialize(deserializer)? {
            Value::Array(items) => items
                .into_iter()
                .filter(Value::is_object)
                .filter_map(|item| T::deserialize(item).ok())
                .collect(),
            _ => Vec::new(),
        })
    }
}
