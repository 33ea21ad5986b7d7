//! Writing tone requested with a résumé upload.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    #[default]
    Professional,
    Creative,
    Startup,
}

impl Tone {
    /// Lenient parse of the multipart form value; unknown tones are professional.
    pub fn from_form(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "creative" => Tone::Creative,
            "startup" => Tone::Startup,
            _ => Tone::Professional,
        }
    }

    pub fn instruction(&self) -> &'static str {
        match self {
            Tone::Professional => "Write in a polished, corporate tone. Use formal language, industry-standard terminology, and focus on measurable achievements.",
            Tone::Creative => "Write in a bold, expressive tone. Use vivid language, creative metaphors, and showcase personality. Make the reader feel the passion.",
            Tone::Startup => "Write in a fast-paced, modern tech tone. Use action-oriented language, focus on impact and innovation. Sound like a Y Combinator pitch.",
        }
    }
}
