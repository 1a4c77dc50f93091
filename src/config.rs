//! YAML configuration file support for jobrec.
//!
//! All stage configurations (index, filter, features, explain, recommender)
//! live in one YAML file and are turned into the runtime configs with the
//! `*_config()` conversions.
//!
//! ## Example YAML Configuration
//!
//! ```yaml
//! version: "1.0"
//! name: "production"
//! model_path: "/models/ranker-2024-06.json"
//!
//! index:
//!   dimension: 384
//!   model_version: "bge-small-en-v1.5"
//!   ann:
//!     m: 16
//!     ef_construction: 200
//!     ef_search: 64
//!     min_vectors_for_ann: 1000
//!
//! filter:
//!   missing_location_policy: "fail_open"
//!   max_commute_km: 50
//!   seniority_tolerance: 1
//!   max_posting_age_days: 60
//!
//! features:
//!   missing_posting_age_days: 30
//!   salary_gap_clamp: 1.0
//!
//! explain:
//!   max_skills: 3
//!   top_contributions: 2
//!
//! recommender:
//!   candidate_pool: 1000
//!   overfetch_factor: 10
//!   per_company_cap: 2
//!   group_by_parent_company: true
//!   parallel_threshold: 256
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use explain::ExplainConfig;
use features::FeatureConfig;
use filter::{FilterConfig, MissingLocationPolicy};
use index::{AnnConfig, IndexConfig};
use recommender::RecommenderConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading YAML configuration files
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level YAML configuration for the whole recommendation engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct JobrecConfig {
    /// Configuration format version
    pub version: String,

    /// Optional configuration name/description
    #[serde(default)]
    pub name: Option<String>,

    /// Ranking artifact to load. The built-in baseline is used when absent.
    #[serde(default)]
    pub model_path: Option<PathBuf>,

    #[serde(default)]
    pub index: IndexYamlConfig,

    #[serde(default)]
    pub filter: FilterYamlConfig,

    #[serde(default)]
    pub features: FeatureYamlConfig,

    #[serde(default)]
    pub explain: ExplainYamlConfig,

    #[serde(default)]
    pub recommender: RecommenderYamlConfig,
}

impl JobrecConfig {
    /// Load a YAML configuration file from the given path
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse YAML configuration from a string
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: JobrecConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.index.validate()?;
        self.filter.validate()?;
        self.features.validate()?;
        self.explain.validate()?;
        self.recommender.validate()?;

        // Cross-stage invariants are checked by the runtime config.
        self.recommender_config()
            .validate()
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))
    }

    pub fn index_config(&self) -> IndexConfig {
        let ann = AnnConfig::default()
            .with_m(self.index.ann.m)
            .with_ef_construction(self.index.ann.ef_construction)
            .with_ef_search(self.index.ann.ef_search)
            .with_enabled(self.index.ann.enabled)
            .with_min_vectors_for_ann(self.index.ann.min_vectors_for_ann);
        let config = IndexConfig::new(self.index.dimension).with_ann(ann);
        match &self.index.model_version {
            Some(version) => config.with_model_version(version.clone()),
            None => config,
        }
    }

    pub fn filter_config(&self) -> FilterConfig {
        let policy = match self.filter.missing_location_policy.as_str() {
            "fail_closed" => MissingLocationPolicy::FailClosed,
            _ => MissingLocationPolicy::FailOpen,
        };
        FilterConfig::default()
            .with_missing_location_policy(policy)
            .with_max_commute_km(self.filter.max_commute_km)
            .with_seniority_tolerance(self.filter.seniority_tolerance)
            .with_max_posting_age_days(self.filter.max_posting_age_days)
    }

    pub fn feature_config(&self) -> FeatureConfig {
        FeatureConfig::default()
            .with_missing_posting_age_days(self.features.missing_posting_age_days)
            .with_salary_gap_clamp(self.features.salary_gap_clamp)
    }

    pub fn explain_config(&self) -> ExplainConfig {
        ExplainConfig::default()
            .with_max_skills(self.explain.max_skills)
            .with_top_contributions(self.explain.top_contributions)
            .with_min_contribution(self.explain.min_contribution)
    }

    pub fn recommender_config(&self) -> RecommenderConfig {
        RecommenderConfig::new(self.index.dimension)
            .with_index(self.index_config())
            .with_filter(self.filter_config())
            .with_features(self.feature_config())
            .with_explain(self.explain_config())
            .with_candidate_pool(self.recommender.candidate_pool)
            .with_overfetch_factor(self.recommender.overfetch_factor)
            .with_per_company_cap(self.recommender.per_company_cap)
            .with_group_by_parent_company(self.recommender.group_by_parent_company)
            .with_parallel_threshold(self.recommender.parallel_threshold)
    }
}

impl Default for JobrecConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            model_path: None,
            index: IndexYamlConfig::default(),
            filter: FilterYamlConfig::default(),
            features: FeatureYamlConfig::default(),
            explain: ExplainYamlConfig::default(),
            recommender: RecommenderYamlConfig::default(),
        }
    }
}

/// Vector index YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexYamlConfig {
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Embedding model version the index accepts; any when absent.
    #[serde(default)]
    pub model_version: Option<String>,

    #[serde(default)]
    pub ann: AnnYamlConfig,
}

impl IndexYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.dimension == 0 {
            return Err(ConfigLoadError::Validation(
                "index.dimension must be >= 1".to_string(),
            ));
        }
        if matches!(&self.model_version, Some(v) if v.trim().is_empty()) {
            return Err(ConfigLoadError::Validation(
                "index.model_version must not be empty".to_string(),
            ));
        }
        self.ann.validate()
    }
}

impl Default for IndexYamlConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            model_version: None,
            ann: AnnYamlConfig::default(),
        }
    }
}

/// HNSW YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnYamlConfig {
    #[serde(default = "default_ann_m")]
    pub m: usize,

    #[serde(default = "default_ef_construction")]
    pub ef_construction: usize,

    #[serde(default = "default_ef_search")]
    pub ef_search: usize,

    #[serde(default = "true_value")]
    pub enabled: bool,

    #[serde(default = "default_min_vectors_for_ann")]
    pub min_vectors_for_ann: usize,
}

impl AnnYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.m == 0 || self.ef_construction == 0 || self.ef_search == 0 {
            return Err(ConfigLoadError::Validation(
                "index.ann: m, ef_construction and ef_search must be >= 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for AnnYamlConfig {
    fn default() -> Self {
        Self {
            m: default_ann_m(),
            ef_construction: default_ef_construction(),
            ef_search: default_ef_search(),
            enabled: true,
            min_vectors_for_ann: default_min_vectors_for_ann(),
        }
    }
}

/// Hard-filter YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilterYamlConfig {
    /// "fail_open" or "fail_closed"
    #[serde(default = "default_missing_location_policy")]
    pub missing_location_policy: String,

    #[serde(default = "default_max_commute_km")]
    pub max_commute_km: f64,

    #[serde(default = "default_seniority_tolerance")]
    pub seniority_tolerance: u8,

    #[serde(default = "default_max_posting_age_days")]
    pub max_posting_age_days: Option<u32>,
}

impl FilterYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.missing_location_policy.as_str() {
            "fail_open" | "fail_closed" => {}
            other => {
                return Err(ConfigLoadError::Validation(format!(
                    "filter.missing_location_policy must be fail_open or fail_closed, got {other}"
                )))
            }
        }
        if !self.max_commute_km.is_finite() || self.max_commute_km < 0.0 {
            return Err(ConfigLoadError::Validation(
                "filter.max_commute_km must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FilterYamlConfig {
    fn default() -> Self {
        Self {
            missing_location_policy: default_missing_location_policy(),
            max_commute_km: default_max_commute_km(),
            seniority_tolerance: default_seniority_tolerance(),
            max_posting_age_days: default_max_posting_age_days(),
        }
    }
}

/// Feature extraction YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureYamlConfig {
    #[serde(default = "default_missing_posting_age_days")]
    pub missing_posting_age_days: f32,

    #[serde(default = "default_salary_gap_clamp")]
    pub salary_gap_clamp: f32,
}

impl FeatureYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if !self.missing_posting_age_days.is_finite() || self.missing_posting_age_days < 0.0 {
            return Err(ConfigLoadError::Validation(
                "features.missing_posting_age_days must be >= 0".to_string(),
            ));
        }
        if !self.salary_gap_clamp.is_finite() || self.salary_gap_clamp <= 0.0 {
            return Err(ConfigLoadError::Validation(
                "features.salary_gap_clamp must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FeatureYamlConfig {
    fn default() -> Self {
        Self {
            missing_posting_age_days: default_missing_posting_age_days(),
            salary_gap_clamp: default_salary_gap_clamp(),
        }
    }
}

/// Explanation YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExplainYamlConfig {
    #[serde(default = "default_max_skills")]
    pub max_skills: usize,

    #[serde(default = "default_top_contributions")]
    pub top_contributions: usize,

    #[serde(default = "default_min_contribution")]
    pub min_contribution: f32,
}

impl ExplainYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.max_skills == 0 {
            return Err(ConfigLoadError::Validation(
                "explain.max_skills must be >= 1".to_string(),
            ));
        }
        if !self.min_contribution.is_finite() || self.min_contribution < 0.0 {
            return Err(ConfigLoadError::Validation(
                "explain.min_contribution must be >= 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExplainYamlConfig {
    fn default() -> Self {
        Self {
            max_skills: default_max_skills(),
            top_contributions: default_top_contributions(),
            min_contribution: default_min_contribution(),
        }
    }
}

/// Orchestrator YAML configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommenderYamlConfig {
    /// Fixed retrieval size, independent of `k` and `offset`.
    #[serde(default = "default_candidate_pool")]
    pub candidate_pool: usize,

    #[serde(default = "default_overfetch_factor")]
    pub overfetch_factor: f32,

    /// Omit or set to null to disable the per-company cap.
    #[serde(default = "default_per_company_cap")]
    pub per_company_cap: Option<usize>,

    #[serde(default = "true_value")]
    pub group_by_parent_company: bool,

    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl RecommenderYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.candidate_pool == 0 {
            return Err(ConfigLoadError::Validation(
                "recommender.candidate_pool must be >= 1".to_string(),
            ));
        }
        if self.overfetch_factor < 1.0 {
            return Err(ConfigLoadError::Validation(
                "recommender.overfetch_factor must be >= 1.0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for RecommenderYamlConfig {
    fn default() -> Self {
        Self {
            candidate_pool: default_candidate_pool(),
            overfetch_factor: default_overfetch_factor(),
            per_company_cap: default_per_company_cap(),
            group_by_parent_company: true,
            parallel_threshold: default_parallel_threshold(),
        }
    }
}

// Default value functions
fn default_dimension() -> usize {
    recommender::DEFAULT_DIMENSION
}
fn true_value() -> bool {
    true
}
fn default_ann_m() -> usize {
    16
}
fn default_ef_construction() -> usize {
    200
}
fn default_ef_search() -> usize {
    64
}
fn default_min_vectors_for_ann() -> usize {
    1000
}
fn default_missing_location_policy() -> String {
    "fail_open".to_string()
}
fn default_max_commute_km() -> f64 {
    50.0
}
fn default_seniority_tolerance() -> u8 {
    1
}
fn default_max_posting_age_days() -> Option<u32> {
    Some(60)
}
fn default_missing_posting_age_days() -> f32 {
    30.0
}
fn default_salary_gap_clamp() -> f32 {
    1.0
}
fn default_max_skills() -> usize {
    3
}
fn default_top_contributions() -> usize {
    2
}
fn default_min_contribution() -> f32 {
    0.05
}
fn default_candidate_pool() -> usize {
    1000
}
fn default_overfetch_factor() -> f32 {
    10.0
}
fn default_per_company_cap() -> Option<usize> {
    Some(2)
}
fn default_parallel_threshold() -> usize {
    256
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_valid_yaml() {
        let yaml = r#"
version: "1.0"
name: "test config"
index:
  dimension: 64
  model_version: "hash-1"
filter:
  missing_location_policy: "fail_closed"
"#;

        let config = JobrecConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.name, Some("test config".to_string()));
        assert_eq!(config.index.dimension, 64);
        assert_eq!(
            config.filter_config().missing_location_policy,
            MissingLocationPolicy::FailClosed
        );
        assert_eq!(
            config.index_config().model_version.as_deref(),
            Some("hash-1")
        );
    }

    #[test]
    fn test_load_from_file() {
        let yaml = r#"
version: "1.0"
recommender:
  per_company_cap: 1
"#;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(yaml.as_bytes()).unwrap();

        let config = JobrecConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.recommender_config().per_company_cap, Some(1));
    }

    #[test]
    fn test_default_config_matches_runtime_defaults() {
        let config = JobrecConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.recommender_config(), RecommenderConfig::default());
    }

    #[test]
    fn test_unsupported_version() {
        let result = JobrecConfig::from_yaml("version: \"2.0\"\n");
        assert!(matches!(result, Err(ConfigLoadError::UnsupportedVersion(v)) if v == "2.0"));
    }

    #[test]
    fn test_policy_validation() {
        let yaml = r#"
version: "1.0"
filter:
  missing_location_policy: "sometimes"
"#;
        let result = JobrecConfig::from_yaml(yaml);
        assert!(result.unwrap_err().to_string().contains("missing_location_policy"));
    }

    #[test]
    fn test_cross_stage_validation() {
        let yaml = r#"
version: "1.0"
recommender:
  overfetch_factor: .nan
"#;
        let result = JobrecConfig::from_yaml(yaml);
        assert!(result.unwrap_err().to_string().contains("overfetch_factor"));
    }

    #[test]
    fn test_candidate_pool_flows_through() {
        let yaml = r#"
version: "1.0"
recommender:
  candidate_pool: 250
  overfetch_factor: 5
"#;
        let config = JobrecConfig::from_yaml(yaml).unwrap();
        let rec = config.recommender_config();
        assert_eq!(rec.candidate_pool, 250);
        assert_eq!(rec.covered_depth(), 50);

        let defaults = JobrecConfig::default().recommender_config();
        assert_eq!(defaults.candidate_pool, 1000);
    }

    #[test]
    fn test_null_cap_disables_diversity() {
        let yaml = r#"
version: "1.0"
recommender:
  per_company_cap: null
"#;
        let config = JobrecConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.recommender_config().per_company_cap, None);
    }

    #[test]
    fn test_missing_file() {
        let result = JobrecConfig::from_file("/no/such/jobrec.yaml");
        assert!(matches!(result, Err(ConfigLoadError::FileRead(_))));
    }
}
