use serde::{Deserialize, Serialize};

use crate::FeatureError;

/// Tunables for [`FeatureExtractor`](crate::FeatureExtractor).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeatureConfig {
    /// Posting age assumed for jobs without a posting timestamp.
    #[serde(default = "FeatureConfig::default_missing_posting_age_days")]
    pub missing_posting_age_days: f32,
    /// Salary fit gap is clamped to `[-salary_gap_clamp, salary_gap_clamp]`.
    #[serde(default = "FeatureConfig::default_salary_gap_clamp")]
    pub salary_gap_clamp: f32,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            missing_posting_age_days: Self::default_missing_posting_age_days(),
            salary_gap_clamp: Self::default_salary_gap_clamp(),
        }
    }
}

impl FeatureConfig {
    pub(crate) fn default_missing_posting_age_days() -> f32 {
        30.0
    }

    pub(crate) fn default_salary_gap_clamp() -> f32 {
        1.0
    }

    pub fn with_missing_posting_age_days(mut self, days: f32) -> Self {
        self.missing_posting_age_days = days;
        self
    }

    pub fn with_salary_gap_clamp(mut self, clamp: f32) -> Self {
        self.salary_gap_clamp = clamp;
        self
    }

    pub fn validate(&self) -> Result<(), FeatureError> {
        if !self.missing_posting_age_days.is_finite() || self.missing_posting_age_days < 0.0 {
            return Err(FeatureError::InvalidConfig(
                "missing_posting_age_days must be finite and non-negative".into(),
            ));
        }
        if !self.salary_gap_clamp.is_finite() || self.salary_gap_clamp <= 0.0 {
            return Err(FeatureError::InvalidConfig(
                "salary_gap_clamp must be finite and positive".into(),
            ));
        }
        Ok(())
    }
}
