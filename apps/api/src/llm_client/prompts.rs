// Shared prompt fragments.
// Each service that needs LLM calls defines its own prompts.rs alongside it.

/// Appended to every rewrite prompt so the model answers with bare text.
pub const PLAIN_TEXT_ONLY: &str = "Return ONLY the improved text, no explanation.";

/// Rules appended to the structuring prompt.
pub const JSON_ONLY_RULES: &str = "\
Rules:
- If information is not found, use empty string \"\" or empty array []
- Improve and enhance the summary to be professional and compelling
- Generate a catchy tagline based on their skills and experience
- Return ONLY the JSON, no other text";
