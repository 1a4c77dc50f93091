use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use features::FeatureVector;
use index::IndexError;
use model::{DataQualityError, Profile};
use ranker::ConfigurationError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Debug note recorded when retrieval found candidates but every one of
/// them failed a hard filter.
pub const NOTE_NO_ELIGIBLE: &str = "no eligible candidates";

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RecommendError {
    /// The profile itself is malformed; there is nothing left to recommend for.
    #[error("invalid profile: {0}")]
    InvalidProfile(#[from] DataQualityError),
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    #[error("index error: {0}")]
    Index(#[from] IndexError),
    #[error("invalid recommender config: {0}")]
    InvalidConfig(String),
}

/// One page of recommendations for one profile.
#[derive(Debug, Clone, Copy)]
pub struct RecommendRequest<'a> {
    pub profile: &'a Profile,
    pub k: usize,
    pub offset: usize,
    pub debug: bool,
    /// Request clock for posting-age logic. `None` means now.
    pub as_of: Option<DateTime<Utc>>,
}

impl<'a> RecommendRequest<'a> {
    pub fn new(profile: &'a Profile, k: usize) -> Self {
        Self {
            profile,
            k,
            offset: 0,
            debug: false,
            as_of: None,
        }
    }

    pub fn with_offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_as_of(mut self, as_of: DateTime<Utc>) -> Self {
        self.as_of = Some(as_of);
        self
    }
}

/// A recommended job with its final score and explanation lines.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RankedResult {
    pub job_id: String,
    pub score: f32,
    pub why: Vec<String>,
}

/// Features of one returned job, for offline inspection.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JobFeatures {
    pub job_id: String,
    pub features: FeatureVector,
}

/// Per-request diagnostics, populated when the request asks for them.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct DebugInfo {
    pub profile_id: String,
    pub index_version: u64,
    pub catalog_size: usize,
    pub model_version: String,
    pub schema_version: String,
    pub candidate_pool: usize,
    pub retrieved: usize,
    /// Candidates dropped per hard-filter rule.
    pub filtered_out: BTreeMap<String, usize>,
    /// Retrieved ids with no job in the pinned catalog snapshot.
    pub missing_jobs: usize,
    pub eligible: usize,
    pub ranked: usize,
    pub diversity_dropped: usize,
    pub returned: usize,
    pub notes: Vec<String>,
    pub features: Vec<JobFeatures>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RecommendResponse {
    pub results: Vec<RankedResult>,
    pub debug: Option<DebugInfo>,
}

impl RecommendResponse {
    pub fn job_ids(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.job_id.as_str()).collect()
    }
}
