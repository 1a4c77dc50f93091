//! # jobrec features
//!
//! Fixed-schema numeric features for one (profile, job) pair.
//!
//! The layout is declared once, by [`Feature::ALL`], and published as
//! [`FeatureSchema::current`]. Ranking artifacts carry the schema they were
//! trained on and are refused at load time when it differs, so serving never
//! feeds a model columns it was not trained with.
//!
//! | feature            | range               | neutral value                         |
//! |--------------------|---------------------|---------------------------------------|
//! | `cosine`           | [-1, 1]             | 0                                     |
//! | `skill_overlap`    | [0, 1]              | 0 (no skills)                         |
//! | `title_match`      | [0, 1]              | 0 (no role tags)                      |
//! | `geo_distance_km`  | ≥ 0, or −1          | −1 (remote-compatible or unresolved)  |
//! | `remote_match`     | {0, 1}              | 0                                     |
//! | `salary_fit_gap`   | [-clamp, clamp]     | 0 (no expectation, range or currency) |
//! | `industry_match`   | {0, 0.5, 1}         | 0                                     |
//! | `posting_age_days` | ≥ 0                 | `missing_posting_age_days`            |
//!
//! ```
//! use chrono::Utc;
//! use features::{Feature, FeatureConfig, FeatureExtractor};
//! use model::{Company, Job, Profile};
//!
//! let mut profile = Profile::new("p-1");
//! profile.skills.insert("Java".into(), 0.9);
//! profile.skills.insert("Spring".into(), 0.8);
//!
//! let mut job = Job::new("j-1", "Java Developer", Company::new("acme"));
//! job.required_skills = vec!["Java".into(), "Spring".into(), "SQL".into()];
//!
//! let extractor = FeatureExtractor::new(FeatureConfig::default(), Utc::now());
//! let features = extractor.compute(&profile, &job);
//! assert!((features.get(Feature::SkillOverlap) - 1.0).abs() < 1e-6);
//! ```

mod config;
mod extractor;
mod schema;
mod title;

use thiserror::Error;

pub use config::FeatureConfig;
pub use extractor::{skill_matches, FeatureExtractor, SkillMatches, NO_DISTANCE};
pub use schema::{Feature, FeatureSchema, FeatureVector, SCHEMA_VERSION};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FeatureError {
    #[error("invalid feature config: {0}")]
    InvalidConfig(String),
}
