//! Slug generation and validation.

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

/// Characters of the user id appended to a generated slug.
const SUFFIX_LEN: usize = 6;
/// Characters appended again when the generated slug is already taken.
const COLLISION_SUFFIX_LEN: usize = 4;

fn non_slug_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9\s]").expect("valid regex"))
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid regex"))
}

fn custom_slug() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9-]{1,38}[a-z0-9]$").expect("valid regex"))
}

fn id_prefix(user_id: Uuid, len: usize) -> String {
    user_id.to_string().chars().take(len).collect()
}

/// Derives a slug from a display name: `"Ada Lovelace"` becomes
/// `ada-lovelace-<first 6 chars of the user id>`.
pub fn generate_slug(name: &str, user_id: Uuid) -> String {
    let lowered = name.to_lowercase();
    let cleaned = non_slug_chars().replace_all(&lowered, "");
    let base = whitespace_runs().replace_all(cleaned.trim(), "-");
    let suffix = id_prefix(user_id, SUFFIX_LEN);

    if base.is_empty() {
        format!("user-{suffix}")
    } else {
        format!("{base}-{suffix}")
    }
}

/// Second candidate when `slug` is already in use.
pub fn disambiguate(slug: &str, user_id: Uuid) -> String {
    format!("{slug}-{}", id_prefix(user_id, COLLISION_SUFFIX_LEN))
}

/// Trims and lowercases a user-requested slug.
pub fn normalize_slug(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// 3–40 characters of `[a-z0-9-]`, not starting or ending with a hyphen.
pub fn is_valid_slug(slug: &str) -> bool {
    custom_slug().is_match(slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> Uuid {
        Uuid::parse_str("3f2a9c1e-0000-4000-8000-000000000000").unwrap()
    }

    #[test]
    fn test_generate_slug_from_name() {
        assert_eq!(generate_slug("Ada Lovelace", user()), "ada-lovelace-3f2a9c");
    }

    #[test]
    fn test_generate_slug_strips_punctuation_and_collapses_spaces() {
        assert_eq!(
            generate_slug("  Jean-Luc   O'Neil, PhD ", user()),
            "jeanluc-oneil-phd-3f2a9c"
        );
    }

    #[test]
    fn test_generate_slug_drops_non_ascii() {
        assert_eq!(generate_slug("José Núñez", user()), "jos-nez-3f2a9c");
    }

    #[test]
    fn test_empty_name_falls_back_to_user_prefix() {
        assert_eq!(generate_slug("", user()), "user-3f2a9c");
        assert_eq!(generate_slug("!!! ???", user()), "user-3f2a9c");
    }

    #[test]
    fn test_disambiguate_appends_short_prefix() {
        assert_eq!(
            disambiguate("ada-lovelace-3f2a9c", user()),
            "ada-lovelace-3f2a9c-3f2a"
        );
    }

    #[test]
    fn test_custom_slug_rules() {
        assert!(is_valid_slug("ada"));
        assert!(is_valid_slug("ada-lovelace-2024"));
        assert!(is_valid_slug(&"a".repeat(40)));
        assert!(!is_valid_slug("ab"));
        assert!(!is_valid_slug(&"a".repeat(41)));
        assert!(!is_valid_slug("-ada"));
        assert!(!is_valid_slug("ada-"));
        assert!(!is_valid_slug("Ada"));
        assert!(!is_valid_slug("ada_lovelace"));
    }

    #[test]
    fn test_normalize_then_validate() {
        let slug = normalize_slug("  Ada-Lovelace ");
        assert_eq!(slug, "ada-lovelace");
        assert!(is_valid_slug(&slug));
    }
}
