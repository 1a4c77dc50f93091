//! Lexical and role-family overlap between role tags and a job title.

/// Tokens that name the same kind of role.
const ROLE_FAMILIES: &[(&str, &[&str])] = &[
    (
        "engineer",
        &["engineer", "engineering", "developer", "dev", "programmer", "swe", "coder"],
    ),
    ("backend", &["backend", "server", "api"]),
    ("frontend", &["frontend", "ui", "web"]),
    ("fullstack", &["fullstack"]),
    ("ops", &["devops", "sre", "infrastructure", "platform", "reliability"]),
    ("ml", &["ml", "ai", "scientist", "research"]),
    ("data", &["data", "analyst", "analytics", "bi"]),
    ("mobile", &["mobile", "ios", "android"]),
    ("lead", &["lead", "manager", "head", "principal"]),
    ("design", &["designer", "design", "ux"]),
];

/// Credit for a tag token that only matches through its role family.
const FAMILY_CREDIT: f32 = 0.5;

/// Lowercase tokens; hyphens inside words are dropped so `back-end` and
/// `backend` agree.
pub(crate) fn tokens(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '+' || c == '#'))
        .map(|t| t.replace('-', "").to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

fn family(token: &str) -> Option<&'static str> {
    ROLE_FAMILIES
        .iter()
        .find(|(_, members)| members.contains(&token))
        .map(|(name, _)| *name)
}

/// Best overlap of any role tag with `title`, in `[0, 1]`.
///
/// Each tag token scores 1 when it appears in the title, [`FAMILY_CREDIT`]
/// when a title token belongs to the same role family, 0 otherwise; a tag's
/// score is the mean over its tokens.
pub(crate) fn title_match(role_tags: &[String], title: &str) -> f32 {
    let title_tokens = tokens(title);
    if title_tokens.is_empty() {
        return 0.0;
    }
    let title_families: Vec<&str> = title_tokens.iter().filter_map(|t| family(t)).collect();

    role_tags
        .iter()
        .map(|tag| {
            let tag_tokens = tokens(tag);
            if tag_tokens.is_empty() {
                return 0.0;
            }
            let credit: f32 = tag_tokens
                .iter()
                .map(|t| {
                    if title_tokens.contains(t) {
                        1.0
                    } else if family(t).is_some_and(|f| title_families.contains(&f)) {
                        FAMILY_CREDIT
                    } else {
                        0.0
                    }
                })
                .sum();
            credit / tag_tokens.len() as f32
        })
        .fold(0.0_f32, f32::max)
        .clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn exact_tag_in_title_scores_one() {
        assert_eq!(title_match(&tags(&["backend engineer"]), "Senior Backend Engineer"), 1.0);
    }

    #[test]
    fn hyphenated_spelling_matches() {
        assert_eq!(title_match(&tags(&["back-end developer"]), "Backend Developer (Go)"), 1.0);
    }

    #[test]
    fn role_family_gives_partial_credit() {
        // "developer" ~ "engineer" (family), "backend" exact
        let score = title_match(&tags(&["backend developer"]), "Backend Engineer");
        assert!((score - 0.75).abs() < 1e-6);
    }

    #[test]
    fn best_tag_wins_and_empty_inputs_score_zero() {
        let score = title_match(&tags(&["designer", "data engineer"]), "Data Engineer");
        assert_eq!(score, 1.0);
        assert_eq!(title_match(&[], "Data Engineer"), 0.0);
        assert_eq!(title_match(&tags(&["data"]), ""), 0.0);
        assert_eq!(title_match(&tags(&["chef"]), "Data Engineer"), 0.0);
    }
}
