use serde::{Deserialize, Serialize};

use crate::FilterError;

/// What the location rule does when one side has no usable location data
/// and the pair is not remote-compatible.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum MissingLocationPolicy {
    /// Keep the job. Missing data never removes a candidate.
    #[default]
    FailOpen,
    /// Drop the job. Only jobs with a demonstrable location fit survive.
    FailClosed,
}

/// Tunables for the standard rule set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FilterConfig {
    #[serde(default)]
    pub missing_location_policy: MissingLocationPolicy,
    /// Largest distance between a profile location and the job location
    /// still considered commutable.
    #[serde(default = "FilterConfig::default_max_commute_km")]
    pub max_commute_km: f64,
    /// How many seniority levels a job may sit above or below the profile.
    #[serde(default = "FilterConfig::default_seniority_tolerance")]
    pub seniority_tolerance: u8,
    /// Postings older than this are dropped. `None` disables the ceiling.
    #[serde(default = "FilterConfig::default_max_posting_age_days")]
    pub max_posting_age_days: Option<u32>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            missing_location_policy: MissingLocationPolicy::default(),
            max_commute_km: Self::default_max_commute_km(),
            seniority_tolerance: Self::default_seniority_tolerance(),
            max_posting_age_days: Self::default_max_posting_age_days(),
        }
    }
}

impl FilterConfig {
    pub(crate) fn default_max_commute_km() -> f64 {
        50.0
    }

    pub(crate) fn default_seniority_tolerance() -> u8 {
        1
    }

    pub(crate) fn default_max_posting_age_days() -> Option<u32> {
        Some(60)
    }

    pub fn with_missing_location_policy(mut self, policy: MissingLocationPolicy) -> Self {
        self.missing_location_policy = policy;
        self
    }

    pub fn with_max_commute_km(mut self, km: f64) -> Self {
        self.max_commute_km = km;
        self
    }

    pub fn with_seniority_tolerance(mut self, levels: u8) -> Self {
        self.seniority_tolerance = levels;
        self
    }

    pub fn with_max_posting_age_days(mut self, days: Option<u32>) -> Self {
        self.max_posting_age_days = days;
        self
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if !self.max_commute_km.is_finite() || self.max_commute_km < 0.0 {
            return Err(FilterError::InvalidConfig(format!(
                "max_commute_km must be finite and non-negative, got {}",
                self.max_commute_km
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fail_open() {
        let cfg = FilterConfig::default();
        assert_eq!(cfg.missing_location_policy, MissingLocationPolicy::FailOpen);
        assert_eq!(cfg.seniority_tolerance, 1);
        assert_eq!(cfg.max_posting_age_days, Some(60));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn negative_commute_is_invalid() {
        let cfg = FilterConfig::default().with_max_commute_km(-1.0);
        assert!(matches!(cfg.validate(), Err(FilterError::InvalidConfig(_))));
    }

    #[test]
    fn policy_deserializes_from_snake_case() {
        let cfg: FilterConfig =
            serde_json::from_str(r#"{"missing_location_policy":"fail_closed"}"#).expect("parse");
        assert_eq!(cfg.missing_location_policy, MissingLocationPolicy::FailClosed);
        assert_eq!(cfg.max_commute_km, 50.0);
    }
}
