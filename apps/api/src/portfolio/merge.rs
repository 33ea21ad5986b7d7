//! Re-upload merge: keeps what the owner already has, fills gaps from the
//! freshly parsed résumé.

use std::collections::HashSet;

use crate::models::resume::ResumeData;

/// Merges a freshly structured résumé into the stored one.
///
/// `incoming` is the base. Every non-empty field of `existing` wins over it,
/// except `skills`, which are unioned case-insensitively with the existing
/// entries first and in their original casing.
pub fn merge_resume(existing: &ResumeData, incoming: ResumeData) -> ResumeData {
    let skills = union_skills(&existing.skills, incoming.skills);

    ResumeData {
        name: keep_text(&existing.name, incoming.name),
        title: keep_text(&existing.title, incoming.title),
        email: keep_text(&existing.email, incoming.email),
        phone: keep_text(&existing.phone, incoming.phone),
        location: keep_text(&existing.location, incoming.location),
        summary: keep_text(&existing.summary, incoming.summary),
        tagline: keep_text(&existing.tagline, incoming.tagline),
        skills,
        projects: keep_list(&existing.projects, incoming.projects),
        experience: keep_list(&existing.experience, incoming.experience),
        education: keep_list(&existing.education, incoming.education),
        github: keep_link(&existing.github, incoming.github),
        linkedin: keep_link(&existing.linkedin, incoming.linkedin),
        website: keep_link(&existing.website, incoming.website),
    }
}

fn keep_text(existing: &str, incoming: String) -> String {
    if existing.is_empty() {
        incoming
    } else {
        existing.to_string()
    }
}

fn keep_list<T: Clone>(existing: &[T], incoming: Vec<T>) -> Vec<T> {
    if existing.is_empty() {
        incoming
    } else {
        existing.to_vec()
    }
}

fn keep_link(existing: &Option<String>, incoming: Option<String>) -> Option<String> {
    existing
        .as_deref()
        .filter(|link| !link.is_empty())
        .map(str::to_string)
        .or(incoming)
}

fn union_skills(existing: &[String], incoming: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = existing.iter().map(|s| s.to_lowercase()).collect();
    let mut merged = existing.to_vec();
    for skill in incoming {
        if seen.insert(skill.to_lowercase()) {
            merged.push(skill);
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::resume::{ExperienceItem, ProjectItem};

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_skills_union_keeps_existing_casing() {
        let existing = ResumeData {
            skills: strings(&["Python", "Go"]),
            ..ResumeData::default()
        };
        let incoming = ResumeData {
            skills: strings(&["python", "Rust"]),
            ..ResumeData::default()
        };
        let merged = merge_resume(&existing, incoming);
        assert_eq!(merged.skills, strings(&["Python", "Go", "Rust"]));
    }

    #[test]
    fn test_incoming_duplicates_collapse() {
        let merged = merge_resume(
            &ResumeData::default(),
            ResumeData {
                skills: strings(&["Rust", "rust", "SQL"]),
                ..ResumeData::default()
            },
        );
        assert_eq!(merged.skills, strings(&["Rust", "SQL"]));
    }

    #[test]
    fn test_existing_edits_survive_reupload() {
        let existing = ResumeData {
            name: "Ada L.".into(),
            summary: "Hand-edited summary".into(),
            github: Some("https://github.com/ada".into()),
            projects: vec![ProjectItem {
                title: "Engine".into(),
                ..ProjectItem::default()
            }],
            ..ResumeData::default()
        };
        let incoming = ResumeData {
            name: "Ada Lovelace".into(),
            summary: "Model summary".into(),
            title: "Mathematician".into(),
            github: Some("https://github.com/other".into()),
            linkedin: Some("https://linkedin.com/in/ada".into()),
            projects: vec![ProjectItem {
                title: "Notes".into(),
                ..ProjectItem::default()
            }],
            experience: vec![ExperienceItem {
                company: "Analytical Society".into(),
                ..ExperienceItem::default()
            }],
            ..ResumeData::default()
        };

        let merged = merge_resume(&existing, incoming);
        assert_eq!(merged.name, "Ada L.");
        assert_eq!(merged.summary, "Hand-edited summary");
        assert_eq!(merged.github.as_deref(), Some("https://github.com/ada"));
        assert_eq!(merged.projects[0].title, "Engine");
        assert_eq!(merged.projects.len(), 1);
        // Gaps are filled from the new parse.
        assert_eq!(merged.title, "Mathematician");
        assert_eq!(merged.linkedin.as_deref(), Some("https://linkedin.com/in/ada"));
        assert_eq!(merged.experience[0].company, "Analytical Society");
    }

    #[test]
    fn test_blank_stored_link_is_filled_by_new_parse() {
        let existing = ResumeData {
            github: Some(String::new()),
            website: Some("https://ada.dev".into()),
            ..ResumeData::default()
        };
        let incoming = ResumeData {
            github: Some("https://github.com/ada".into()),
            website: Some("https://other.dev".into()),
            ..ResumeData::default()
        };
        let merged = merge_resume(&existing, incoming);
        assert_eq!(merged.github.as_deref(), Some("https://github.com/ada"));
        assert_eq!(merged.website.as_deref(), Some("https://ada.dev"));
    }

    #[test]
    fn test_merge_into_empty_is_incoming() {
        let incoming = ResumeData {
            name: "Grace".into(),
            skills: strings(&["COBOL"]),
            ..ResumeData::default()
        };
        assert_eq!(merge_resume(&ResumeData::default(), incoming.clone()), incoming);
    }
}
