use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use model::skills::{normalize_skill, tag_eq};
use model::{cosine_similarity, Job, Profile};

use crate::config::FeatureConfig;
use crate::schema::{Feature, FeatureVector};
use crate::title::title_match;

/// Value reported for `geo_distance_km` when no distance can be computed or
/// the pair is remote-compatible.
pub const NO_DISTANCE: f32 = -1.0;

/// Credit for a job that only matches through the candidate's liked tech.
const TECH_LIKE_CREDIT: f32 = 0.5;

/// Profile skills present on a job, split by the job's requirement kind.
///
/// Names are the job's own spelling, ordered by the candidate's weight
/// (heaviest first) and then alphabetically.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SkillMatches {
    pub required: Vec<String>,
    pub bonus: Vec<String>,
}

impl SkillMatches {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.bonus.is_empty()
    }
}

/// Normalized skill name → weight, summing weights of aliases that fold
/// onto the same name.
fn profile_skills(profile: &Profile) -> BTreeMap<String, f32> {
    let mut skills = BTreeMap::new();
    for (name, weight) in &profile.skills {
        if *weight > 0.0 && weight.is_finite() {
            *skills.entry(normalize_skill(name)).or_insert(0.0) += *weight;
        }
    }
    skills
}

/// Which of the candidate's skills the job asks for.
pub fn skill_matches(profile: &Profile, job: &Job) -> SkillMatches {
    let skills = profile_skills(profile);
    let pick = |list: &[String], exclude: &[String]| {
        let mut hits: Vec<(f32, String)> = Vec::new();
        for name in list {
            let key = normalize_skill(name);
            let Some(weight) = skills.get(&key) else {
                continue;
            };
            let duplicate = hits.iter().any(|(_, h)| normalize_skill(h) == key)
                || exclude.iter().any(|e| normalize_skill(e) == key);
            if !duplicate {
                hits.push((*weight, name.trim().to_string()));
            }
        }
        hits.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.cmp(&b.1)));
        hits.into_iter().map(|(_, name)| name).collect::<Vec<_>>()
    };
    let required = pick(&job.required_skills, &[]);
    let bonus = pick(&job.bonus_skills, &required);
    SkillMatches { required, bonus }
}

/// Computes [`FeatureVector`]s for (profile, job) pairs.
///
/// Pure: the request clock is fixed at construction, so identical inputs
/// always yield identical vectors. Missing upstream data yields each
/// feature's neutral value instead of an error.
#[derive(Debug, Clone)]
pub struct FeatureExtractor {
    config: FeatureConfig,
    as_of: DateTime<Utc>,
}

impl FeatureExtractor {
    pub fn new(config: FeatureConfig, as_of: DateTime<Utc>) -> Self {
        Self { config, as_of }
    }

    pub fn config(&self) -> &FeatureConfig {
        &self.config
    }

    pub fn as_of(&self) -> DateTime<Utc> {
        self.as_of
    }

    /// Computes every feature, deriving cosine from the embeddings.
    pub fn compute(&self, profile: &Profile, job: &Job) -> FeatureVector {
        self.compute_with_similarity(profile, job, embedding_cosine(profile, job))
    }

    /// Computes every feature, taking cosine from retrieval.
    pub fn compute_with_similarity(&self, profile: &Profile, job: &Job, cosine: f32) -> FeatureVector {
        let mut v = FeatureVector::from_values([0.0; Feature::COUNT]);
        let cosine = if cosine.is_finite() {
            cosine.clamp(-1.0, 1.0)
        } else {
            0.0
        };
        v.set(Feature::Cosine, cosine);
        v.set(Feature::SkillOverlap, skill_overlap(profile, job));
        v.set(Feature::TitleMatch, title_match(&profile.role_tags, &job.title));
        v.set(Feature::GeoDistanceKm, geo_distance_km(profile, job));
        v.set(
            Feature::RemoteMatch,
            if profile.remote_ok && job.remote_ok { 1.0 } else { 0.0 },
        );
        v.set(Feature::SalaryFitGap, self.salary_fit_gap(profile, job));
        v.set(Feature::IndustryMatch, industry_match(profile, job));
        v.set(Feature::PostingAgeDays, self.posting_age_days(job));
        v
    }

    fn salary_fit_gap(&self, profile: &Profile, job: &Job) -> f32 {
        let (Some(expected), Some(range)) = (&profile.salary_expectation, &job.salary) else {
            return 0.0;
        };
        if expected.amount <= 0.0 || !tag_eq(&expected.currency, &range.currency) {
            return 0.0;
        }
        let gap = ((range.midpoint() - expected.amount) / expected.amount) as f32;
        if gap.is_finite() {
            gap.clamp(-self.config.salary_gap_clamp, self.config.salary_gap_clamp)
        } else {
            0.0
        }
    }

    fn posting_age_days(&self, job: &Job) -> f32 {
        match job.posted_at {
            Some(posted) => (self.as_of - posted).num_days().max(0) as f32,
            None => self.config.missing_posting_age_days,
        }
    }
}

/// Cosine of the two embeddings when they are comparable, else 0.
fn embedding_cosine(profile: &Profile, job: &Job) -> f32 {
    match (&profile.embedding, &job.embedding) {
        (Some(p), Some(j)) if p.model_version == j.model_version => {
            cosine_similarity(&p.vector, &j.vector)
        }
        _ => 0.0,
    }
}

/// Sum of the candidate's weights for skills the job lists, over the total
/// weight of the candidate's skills.
fn skill_overlap(profile: &Profile, job: &Job) -> f32 {
    let skills = profile_skills(profile);
    let total: f32 = skills.values().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let job_skills: Vec<String> = job
        .required_skills
        .iter()
        .chain(&job.bonus_skills)
        .map(|s| normalize_skill(s))
        .collect();
    let matched: f32 = skills
        .iter()
        .filter(|(name, _)| job_skills.contains(name))
        .map(|(_, w)| *w)
        .sum();
    (matched / total).clamp(0.0, 1.0)
}

fn geo_distance_km(profile: &Profile, job: &Job) -> f32 {
    if profile.remote_ok && job.remote_ok {
        return NO_DISTANCE;
    }
    let Some(job_location) = &job.location else {
        return NO_DISTANCE;
    };
    profile
        .locations
        .iter()
        .filter_map(|loc| {
            if loc.same_place(job_location) {
                Some(0.0)
            } else {
                loc.distance_km(job_location)
            }
        })
        .filter(|d| d.is_finite())
        .min_by(f64::total_cmp)
        .map_or(NO_DISTANCE, |d| d as f32)
}

fn industry_match(profile: &Profile, job: &Job) -> f32 {
    let preferred = job.company.industry.as_deref().is_some_and(|industry| {
        profile
            .preferences
            .industries
            .iter()
            .any(|p| tag_eq(p, industry))
    });
    if preferred {
        return 1.0;
    }
    let liked_tech = profile.preferences.tech_likes.iter().any(|like| {
        let like = normalize_skill(like);
        job.required_skills
            .iter()
            .chain(&job.bonus_skills)
            .any(|s| normalize_skill(s) == like)
    });
    if liked_tech {
        TECH_LIKE_CREDIT
    } else {
        0.0
    }
}
