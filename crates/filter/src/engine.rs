use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use model::{CandidateSet, Job, JobCatalog, Profile};
use serde::Serialize;
use tracing::debug;

use crate::config::FilterConfig;
use crate::rules::{
    FilterRule, LanguageRule, LocationRule, PostingAgeRule, SeniorityRule, WorkAuthorizationRule,
};

/// Result of filtering one candidate set.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct FilterOutcome {
    /// Surviving candidates, in their original order.
    pub kept: CandidateSet,
    /// Candidates dropped by each rule. Keyed by [`FilterRule::name`].
    pub dropped: BTreeMap<String, usize>,
    /// Candidates whose job is not in the catalog snapshot.
    pub missing_jobs: usize,
}

impl FilterOutcome {
    pub fn dropped_total(&self) -> usize {
        self.dropped.values().sum()
    }
}

/// Ordered list of hard-filter rules.
///
/// Rules run in registration order and stop at the first failure, so the
/// drop count for a rule only counts candidates that passed every rule
/// before it.
pub struct FilterEngine {
    rules: Vec<Box<dyn FilterRule>>,
}

impl Default for FilterEngine {
    fn default() -> Self {
        Self::standard(&FilterConfig::default())
    }
}

impl FilterEngine {
    /// An engine with no rules; every candidate passes.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The standard rule set: location, work authorization, language,
    /// seniority, posting age.
    pub fn standard(config: &FilterConfig) -> Self {
        Self::empty()
            .with_rule(LocationRule {
                max_commute_km: config.max_commute_km,
                missing: config.missing_location_policy,
            })
            .with_rule(WorkAuthorizationRule)
            .with_rule(LanguageRule)
            .with_rule(SeniorityRule {
                tolerance: config.seniority_tolerance,
            })
            .with_rule(PostingAgeRule {
                max_age_days: config.max_posting_age_days,
            })
    }

    /// Appends a rule after the existing ones.
    pub fn with_rule(mut self, rule: impl FilterRule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Removes every rule with the given name.
    pub fn without_rule(mut self, name: &str) -> Self {
        self.rules.retain(|rule| rule.name() != name);
        self
    }

    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name()).collect()
    }

    pub fn describe(&self) -> Vec<String> {
        self.rules
            .iter()
            .map(|rule| format!("{}: {}", rule.name(), rule.describe()))
            .collect()
    }

    /// Name of the first rule `job` fails, if any.
    pub fn first_failure(
        &self,
        profile: &Profile,
        job: &Job,
        as_of: DateTime<Utc>,
    ) -> Option<&'static str> {
        self.rules
            .iter()
            .find(|rule| !rule.evaluate(profile, job, as_of))
            .map(|rule| rule.name())
    }

    pub fn is_eligible(&self, profile: &Profile, job: &Job, as_of: DateTime<Utc>) -> bool {
        self.first_failure(profile, job, as_of).is_none()
    }

    /// Keeps the candidates whose job passes every rule, preserving order.
    pub fn apply(
        &self,
        profile: &Profile,
        candidates: CandidateSet,
        catalog: &JobCatalog,
        as_of: DateTime<Utc>,
    ) -> FilterOutcome {
        let count_in = candidates.len();
        let mut outcome = FilterOutcome::default();

        for candidate in candidates {
            let Some(job) = catalog.get(&candidate.job_id) else {
                outcome.missing_jobs += 1;
                continue;
            };
            match self.first_failure(profile, job, as_of) {
                None => outcome.kept.push(candidate),
                Some(rule) => *outcome.dropped.entry(rule.to_string()).or_default() += 1,
            }
        }

        debug!(
            profile_id = %profile.id,
            stage = "filter",
            count_in,
            count_out = outcome.kept.len(),
            missing_jobs = outcome.missing_jobs,
            dropped = ?outcome.dropped,
            "filter_applied"
        );
        outcome
    }

    /// Lines for satisfied rules worth surfacing to the candidate, in rule
    /// order.
    pub fn highlights(&self, profile: &Profile, job: &Job, as_of: DateTime<Utc>) -> Vec<String> {
        self.rules
            .iter()
            .filter_map(|rule| rule.highlight(profile, job, as_of))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use model::{Candidate, Company, Location};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).single().expect("valid date")
    }

    fn candidates(ids: &[&str]) -> CandidateSet {
        ids.iter()
            .enumerate()
            .map(|(i, id)| Candidate {
                job_id: id.to_string(),
                similarity: 1.0 - i as f32 * 0.1,
            })
            .collect()
    }

    struct TitleContains(&'static str);

    impl FilterRule for TitleContains {
        fn name(&self) -> &'static str {
            "title_contains"
        }

        fn evaluate(&self, _profile: &Profile, job: &Job, _as_of: DateTime<Utc>) -> bool {
            job.title.contains(self.0)
        }

        fn describe(&self) -> String {
            format!("title contains `{}`", self.0)
        }
    }

    #[test]
    fn standard_rule_order_is_fixed() {
        let engine = FilterEngine::standard(&FilterConfig::default());
        assert_eq!(
            engine.rule_names(),
            vec![
                "location",
                "work_authorization",
                "language",
                "seniority",
                "posting_age"
            ]
        );
        assert_eq!(engine.describe().len(), 5);
    }

    #[test]
    fn apply_preserves_order_and_counts_first_failure() {
        let mut profile = Profile::new("p");
        profile.locations = vec![Location::named("Paris")];

        let mut a = Job::new("a", "Engineer", Company::new("c1"));
        a.location = Some(Location::named("Paris"));
        // Fails location first, then language; only location is counted.
        let mut b = Job::new("b", "Engineer", Company::new("c2"));
        b.location = Some(Location::named("Oslo"));
        b.required_languages = vec!["Norwegian".into()];
        let mut c = Job::new("c", "Engineer", Company::new("c3"));
        c.location = Some(Location::named("paris"));
        c.required_languages = vec!["German".into()];
        let mut d = Job::new("d", "Engineer", Company::new("c4"));
        d.location = Some(Location::named("Paris"));

        let (catalog, _) = JobCatalog::from_jobs(vec![a, b, c, d]);
        let engine = FilterEngine::standard(&FilterConfig::default());
        let outcome = engine.apply(&profile, candidates(&["d", "b", "ghost", "c", "a"]), &catalog, now());

        let kept: Vec<&str> = outcome.kept.iter().map(|c| c.job_id.as_str()).collect();
        assert_eq!(kept, vec!["d", "a"]);
        assert_eq!(outcome.dropped.get("location"), Some(&1));
        assert_eq!(outcome.dropped.get("language"), Some(&1));
        assert_eq!(outcome.missing_jobs, 1);
        assert_eq!(outcome.dropped_total(), 2);
    }

    #[test]
    fn custom_rules_can_be_added_and_removed() {
        let profile = Profile::new("p");
        let (catalog, _) = JobCatalog::from_jobs(vec![
            Job::new("a", "Rust Engineer", Company::new("c1")),
            Job::new("b", "Java Engineer", Company::new("c2")),
        ]);

        let engine = FilterEngine::empty().with_rule(TitleContains("Rust"));
        let outcome = engine.apply(&profile, candidates(&["a", "b"]), &catalog, now());
        assert_eq!(outcome.kept.len(), 1);
        assert_eq!(outcome.dropped.get("title_contains"), Some(&1));

        let engine = engine.without_rule("title_contains");
        assert!(engine.rule_names().is_empty());
        let outcome = engine.apply(&profile, candidates(&["a", "b"]), &catalog, now());
        assert_eq!(outcome.kept.len(), 2);
    }

    #[test]
    fn highlights_follow_rule_order() {
        let mut profile = Profile::new("p");
        profile.remote_ok = true;
        profile.languages = vec!["English".into()];
        let mut job = Job::new("a", "Engineer", Company::new("c1"));
        job.remote_ok = true;
        job.required_languages = vec!["English".into()];

        let engine = FilterEngine::default();
        assert_eq!(
            engine.highlights(&profile, &job, now()),
            vec![
                "Remote-compatible".to_string(),
                "Speaks the required languages (English)".to_string()
            ]
        );
    }
}
