//! Skill-name normalization shared by feature extraction, filters and
//! explanations, so "K8s" on a CV and "kubernetes" on a posting compare equal.

/// Common spellings folded onto one canonical name.
const SKILL_ALIASES: &[(&str, &str)] = &[
    ("js", "javascript"),
    ("ts", "typescript"),
    ("k8s", "kubernetes"),
    ("golang", "go"),
    ("postgres", "postgresql"),
    ("psql", "postgresql"),
    ("py", "python"),
    ("python3", "python"),
    ("node", "node.js"),
    ("nodejs", "node.js"),
    ("reactjs", "react"),
    ("react.js", "react"),
    ("springboot", "spring boot"),
    ("gcp", "google cloud"),
    ("aws cloud", "aws"),
    ("ml", "machine learning"),
    ("c sharp", "c#"),
    ("cpp", "c++"),
];

/// Lowercases, trims, collapses inner whitespace and resolves aliases.
pub fn normalize_skill(raw: &str) -> String {
    let collapsed = raw
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase();
    SKILL_ALIASES
        .iter()
        .find(|(alias, _)| *alias == collapsed)
        .map(|(_, canonical)| (*canonical).to_string())
        .unwrap_or(collapsed)
}

/// Case-insensitive equality for free-form tags (languages, authorizations,
/// industries).
pub fn tag_eq(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_resolve() {
        assert_eq!(normalize_skill("K8s"), "kubernetes");
        assert_eq!(normalize_skill("  Golang "), "go");
        assert_eq!(normalize_skill("Postgres"), "postgresql");
    }

    #[test]
    fn whitespace_collapses() {
        assert_eq!(normalize_skill("Spring   Boot"), "spring boot");
    }

    #[test]
    fn unknown_skill_is_lowercased() {
        assert_eq!(normalize_skill("Java"), "java");
    }

    #[test]
    fn tag_eq_ignores_case_and_padding() {
        assert!(tag_eq(" English", "english "));
        assert!(!tag_eq("English", "German"));
    }
}
