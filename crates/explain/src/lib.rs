//! # jobrec explain
//!
//! Builds the `why` lines attached to each recommendation. Sources, in
//! priority order:
//!
//! 1. the candidate's skills the job asks for (required, then bonus),
//! 2. satisfied hard-filter rules worth surfacing ("Remote-compatible"),
//! 3. the largest feature contributions, when the scoring artifact can
//!    attribute its score.
//!
//! Output is advisory text. Nothing downstream ranks on it.

use features::{skill_matches, Feature, FeatureVector};
use model::{Job, Profile};
use ranker::Contribution;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExplainConfig {
    /// Skills named per line before the rest is summarized as "+N more".
    #[serde(default = "ExplainConfig::default_max_skills")]
    pub max_skills: usize,
    /// How many feature contributions to surface. 0 disables them.
    #[serde(default = "ExplainConfig::default_top_contributions")]
    pub top_contributions: usize,
    /// Contributions smaller than this in magnitude are not worth a line.
    #[serde(default = "ExplainConfig::default_min_contribution")]
    pub min_contribution: f32,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            max_skills: Self::default_max_skills(),
            top_contributions: Self::default_top_contributions(),
            min_contribution: Self::default_min_contribution(),
        }
    }
}

impl ExplainConfig {
    pub(crate) fn default_max_skills() -> usize {
        3
    }

    pub(crate) fn default_top_contributions() -> usize {
        2
    }

    pub(crate) fn default_min_contribution() -> f32 {
        0.05
    }

    pub fn with_max_skills(mut self, n: usize) -> Self {
        self.max_skills = n;
        self
    }

    pub fn with_top_contributions(mut self, n: usize) -> Self {
        self.top_contributions = n;
        self
    }

    /// Contributions smaller than this in magnitude are not explained.
    pub fn with_min_contribution(mut self, min: f32) -> Self {
        self.min_contribution = min;
        self
    }
}

/// Everything known about one result at explanation time.
#[derive(Debug, Clone, Copy)]
pub struct ExplainInput<'a> {
    pub profile: &'a Profile,
    pub job: &'a Job,
    pub features: &'a FeatureVector,
    pub score: f32,
    /// Filter highlights for this pair, already in rule order.
    pub highlights: &'a [String],
    /// Per-feature contributions, when the artifact provides them.
    pub attribution: Option<&'a [Contribution]>,
}

#[derive(Debug, Clone, Default)]
pub struct Explainer {
    config: ExplainConfig,
}

fn list_skills(skills: &[String], max: usize) -> String {
    let max = max.max(1);
    if skills.len() <= max {
        return skills.join(", ");
    }
    format!("{} (+{} more)", skills[..max].join(", "), skills.len() - max)
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

impl Explainer {
    pub fn new(config: ExplainConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExplainConfig {
        &self.config
    }

    pub fn explain(&self, input: &ExplainInput<'_>) -> Vec<String> {
        let mut why = Vec::new();

        let skills = skill_matches(input.profile, input.job);
        if !skills.required.is_empty() {
            why.push(format!(
                "Matches required skills: {}",
                list_skills(&skills.required, self.config.max_skills)
            ));
        }
        if !skills.bonus.is_empty() {
            why.push(format!(
                "Bonus skills you have: {}",
                list_skills(&skills.bonus, self.config.max_skills)
            ));
        }

        for line in input.highlights {
            if !why.contains(line) {
                why.push(line.clone());
            }
        }

        if let Some(contributions) = input.attribution {
            why.extend(self.contribution_lines(contributions));
        }

        if why.is_empty() {
            let cosine = input.features.get(Feature::Cosine);
            if cosine > 0.0 {
                why.push(format!("Similar to your profile (similarity {cosine:.2})"));
            }
        }
        why
    }

    /// Largest contributions by magnitude, ties in schema order.
    fn contribution_lines(&self, contributions: &[Contribution]) -> Vec<String> {
        let mut ranked: Vec<&Contribution> = contributions
            .iter()
            .filter(|c| c.value.is_finite() && c.value.abs() >= self.config.min_contribution)
            .collect();
        ranked.sort_by(|a, b| {
            b.value
                .abs()
                .total_cmp(&a.value.abs())
                .then_with(|| a.feature.index().cmp(&b.feature.index()))
        });
        ranked
            .into_iter()
            .take(self.config.top_contributions)
            .map(|c| {
                let verb = if c.value >= 0.0 { "raises" } else { "lowers" };
                format!(
                    "{} {verb} the score ({:+.2})",
                    capitalize(c.feature.label()),
                    c.value
                )
            })
            .collect()
    }
}
