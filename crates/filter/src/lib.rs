//! # jobrec filter
//!
//! Hard eligibility rules applied to retrieved candidates before anything is
//! scored. A job failing any rule is dropped entirely; there is no partial
//! credit and no rule ever changes the order of the survivors.
//!
//! Rules are registered predicate objects implementing [`FilterRule`]. The
//! standard set, in evaluation order:
//!
//! 1. [`LocationRule`]: remote-compatible, same place, or within
//!    `max_commute_km`. Missing location data is governed by
//!    [`MissingLocationPolicy`] (fail-open by default).
//! 2. [`WorkAuthorizationRule`]
//! 3. [`LanguageRule`]
//! 4. [`SeniorityRule`]
//! 5. [`PostingAgeRule`]
//!
//! ```
//! use chrono::Utc;
//! use filter::{FilterConfig, FilterEngine};
//! use model::{Candidate, CandidateSet, Company, Job, JobCatalog, Profile};
//!
//! let (catalog, _) = JobCatalog::from_jobs(vec![Job::new("j-1", "Engineer", Company::new("acme"))]);
//! let candidates: CandidateSet = vec![Candidate { job_id: "j-1".into(), similarity: 0.8 }]
//!     .into_iter()
//!     .collect();
//!
//! let engine = FilterEngine::standard(&FilterConfig::default());
//! let outcome = engine.apply(&Profile::new("p-1"), candidates, &catalog, Utc::now());
//! assert_eq!(outcome.kept.len(), 1);
//! ```

mod config;
mod engine;
mod rules;

use thiserror::Error;

pub use config::{FilterConfig, MissingLocationPolicy};
pub use engine::{FilterEngine, FilterOutcome};
pub use rules::{
    FilterRule, LanguageRule, LocationRule, PostingAgeRule, SeniorityRule, WorkAuthorizationRule,
};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("invalid filter config: {0}")]
    InvalidConfig(String),
}
