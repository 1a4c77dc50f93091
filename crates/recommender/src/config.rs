use explain::ExplainConfig;
use features::FeatureConfig;
use filter::FilterConfig;
use index::IndexConfig;
use serde::{Deserialize, Serialize};

use crate::types::RecommendError;

/// Embedding dimensionality assumed when none is configured.
pub const DEFAULT_DIMENSION: usize = 384;

/// Configuration for [`Recommender`](crate::Recommender) and the stages it
/// owns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommenderConfig {
    pub index: IndexConfig,
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub explain: ExplainConfig,
    /// Candidates retrieved per request, whatever `k` and `offset` are.
    /// A pool that grew with `k` would let a deeper request pull in a
    /// same-company job that displaces an earlier winner under the cap.
    #[serde(default = "RecommenderConfig::default_candidate_pool")]
    pub candidate_pool: usize,
    /// Expected candidates per requested result after filtering. Pages
    /// ending past `candidate_pool / overfetch_factor` get a debug note.
    #[serde(default = "RecommenderConfig::default_overfetch_factor")]
    pub overfetch_factor: f32,
    /// At most this many results per company group. `None` disables the
    /// diversity pass.
    #[serde(default = "RecommenderConfig::default_per_company_cap")]
    pub per_company_cap: Option<usize>,
    /// Group companies under their parent for the diversity pass.
    #[serde(default = "RecommenderConfig::default_group_by_parent_company")]
    pub group_by_parent_company: bool,
    /// Survivor count from which features are computed on the rayon pool.
    #[serde(default = "RecommenderConfig::default_parallel_threshold")]
    pub parallel_threshold: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl RecommenderConfig {
    pub fn new(dimension: usize) -> Self {
        Self {
            index: IndexConfig::new(dimension),
            filter: FilterConfig::default(),
            features: FeatureConfig::default(),
            explain: ExplainConfig::default(),
            candidate_pool: Self::default_candidate_pool(),
            overfetch_factor: Self::default_overfetch_factor(),
            per_company_cap: Self::default_per_company_cap(),
            group_by_parent_company: Self::default_group_by_parent_company(),
            parallel_threshold: Self::default_parallel_threshold(),
        }
    }

    pub(crate) fn default_candidate_pool() -> usize {
        1000
    }

    pub(crate) fn default_overfetch_factor() -> f32 {
        10.0
    }

    pub(crate) fn default_per_company_cap() -> Option<usize> {
        Some(2)
    }

    pub(crate) fn default_group_by_parent_company() -> bool {
        true
    }

    pub(crate) fn default_parallel_threshold() -> usize {
        ranker::DEFAULT_PARALLEL_THRESHOLD
    }

    pub fn with_index(mut self, index: IndexConfig) -> Self {
        self.index = index;
        self
    }

    pub fn with_filter(mut self, filter: FilterConfig) -> Self {
        self.filter = filter;
        self
    }

    pub fn with_features(mut self, features: FeatureConfig) -> Self {
        self.features = features;
        self
    }

    pub fn with_explain(mut self, explain: ExplainConfig) -> Self {
        self.explain = explain;
        self
    }

    pub fn with_candidate_pool(mut self, pool: usize) -> Self {
        self.candidate_pool = pool;
        self
    }

    pub fn with_overfetch_factor(mut self, factor: f32) -> Self {
        self.overfetch_factor = factor;
        self
    }

    pub fn with_per_company_cap(mut self, cap: Option<usize>) -> Self {
        self.per_company_cap = cap;
        self
    }

    pub fn with_group_by_parent_company(mut self, enabled: bool) -> Self {
        self.group_by_parent_company = enabled;
        self
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold;
        self
    }

    /// Deepest page end `offset + k` the pool is sized for.
    pub fn covered_depth(&self) -> usize {
        (self.candidate_pool as f64 / f64::from(self.overfetch_factor)).floor() as usize
    }

    /// Whether a page ending at `offset + k` may run out of candidates
    /// before it is full.
    pub fn exceeds_pool(&self, offset: usize, k: usize) -> bool {
        offset.saturating_add(k) > self.covered_depth()
    }

    pub fn validate(&self) -> Result<(), RecommendError> {
        self.index
            .validate()
            .map_err(|e| RecommendError::InvalidConfig(e.to_string()))?;
        self.filter
            .validate()
            .map_err(|e| RecommendError::InvalidConfig(e.to_string()))?;
        self.features
            .validate()
            .map_err(|e| RecommendError::InvalidConfig(e.to_string()))?;
        if self.candidate_pool == 0 {
            return Err(RecommendError::InvalidConfig(
                "candidate_pool must be greater than zero".into(),
            ));
        }
        if !self.overfetch_factor.is_finite() || self.overfetch_factor < 1.0 {
            return Err(RecommendError::InvalidConfig(
                "overfetch_factor must be finite and >= 1.0".into(),
            ));
        }
        if self.per_company_cap == Some(0) {
            return Err(RecommendError::InvalidConfig(
                "per_company_cap must be at least 1 when set".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = RecommenderConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.index.dimension, DEFAULT_DIMENSION);
        assert_eq!(cfg.per_company_cap, Some(2));
    }

    #[test]
    fn pool_depth_follows_overfetch_factor() {
        let cfg = RecommenderConfig::default();
        assert_eq!(cfg.candidate_pool, 1000);
        assert_eq!(cfg.covered_depth(), 100);
        assert!(!cfg.exceeds_pool(0, 100));
        assert!(!cfg.exceeds_pool(90, 10));
        assert!(cfg.exceeds_pool(95, 10));
        assert!(cfg.exceeds_pool(usize::MAX, usize::MAX));

        let narrow = RecommenderConfig::default()
            .with_candidate_pool(50)
            .with_overfetch_factor(2.0);
        assert_eq!(narrow.covered_depth(), 25);
        assert!(narrow.exceeds_pool(20, 6));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        assert!(RecommenderConfig::default()
            .with_candidate_pool(0)
            .validate()
            .is_err());
        assert!(RecommenderConfig::default()
            .with_overfetch_factor(0.5)
            .validate()
            .is_err());
        assert!(RecommenderConfig::default()
            .with_per_company_cap(Some(0))
            .validate()
            .is_err());
        assert!(RecommenderConfig::new(0).validate().is_err());
    }
}
