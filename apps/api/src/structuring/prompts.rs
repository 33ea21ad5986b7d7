use crate::llm_client::prompts::{JSON_ONLY_RULES, PLAIN_TEXT_ONLY};

/// System prompt for turning raw résumé text into `ResumeData` JSON.
/// The tone instruction is appended per request.
pub const RESUME_PARSE_SYSTEM: &str = r#"You are a resume parser AI. Extract structured information from the resume text provided.
Return ONLY a valid JSON object with exactly this schema (no markdown, no explanation):
{
  "name": "string",
  "title": "string (job title/role)",
  "email": "string",
  "phone": "string",
  "location": "string",
  "summary": "string (2-3 sentences professional summary)",
  "tagline": "string (one catchy professional tagline)",
  "skills": ["array of skill strings"],
  "projects": [
    {
      "title": "string",
      "description": "string",
      "tech": ["array of tech strings"],
      "url": "string or null",
      "github": "string or null"
    }
  ],
  "experience": [
    {
      "company": "string",
      "role": "string",
      "duration": "string",
      "description": "string"
    }
  ],
  "education": [
    {
      "institution": "string",
      "degree": "string",
      "year": "string"
    }
  ],
  "github": "string or null",
  "linkedin": "string or null",
  "website": "string or null"
}
"#;

pub const RESUME_PARSE_USER_TEMPLATE: &str = "Parse this resume:\n\n{resume_text}";

pub fn resume_parse_system(tone_instruction: &str) -> String {
    format!("{RESUME_PARSE_SYSTEM}\n{JSON_ONLY_RULES}\n\nTone: {tone_instruction}")
}

pub const SUMMARY_REWRITE: &str = "You are a professional resume writer. Rewrite the following professional summary to be more compelling, concise, and impactful. Use active voice.";
pub const TAGLINE_REWRITE: &str = "You are a personal branding expert. Create a single punchy professional tagline (max 10 words) based on the following. Return ONLY the tagline, no explanation.";
pub const PROJECT_REWRITE: &str = "You are a technical writer. Rewrite the following project description to be more impressive and highlight impact. Keep it under 2 sentences.";
pub const EXPERIENCE_REWRITE: &str = "You are a resume expert. Rewrite the following job description to use strong action verbs and quantify impact where possible.";
pub const BIO_REWRITE: &str = "You are a personal branding expert. Rewrite the following bio to be more engaging and professional.";

pub fn with_plain_text_rule(prompt: &str) -> String {
    if prompt.contains("Return ONLY") {
        prompt.to_string()
    } else {
        format!("{prompt} {PLAIN_TEXT_ONLY}")
    }
}
