use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::embedding::Embedding;
use crate::error::DataQualityError;
use crate::location::Location;

/// Career level, ordered from least to most senior.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Seniority {
    Intern,
    Junior,
    Mid,
    Senior,
    Staff,
    Principal,
}

impl Seniority {
    pub fn rank(self) -> u8 {
        self as u8
    }

    pub fn label(self) -> &'static str {
        match self {
            Seniority::Intern => "intern",
            Seniority::Junior => "junior",
            Seniority::Mid => "mid-level",
            Seniority::Senior => "senior",
            Seniority::Staff => "staff",
            Seniority::Principal => "principal",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Preferences {
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub tech_likes: Vec<String>,
}

/// Yearly compensation the candidate is looking for.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalaryExpectation {
    pub currency: String,
    pub amount: f64,
}

/// A candidate profile as materialized by the onboarding flow.
///
/// Profiles are immutable once embedded: a change produces a new `version`
/// rather than an in-place edit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Profile {
    pub id: String,
    #[serde(default = "default_profile_version")]
    pub version: u32,
    #[serde(default)]
    pub role_tags: Vec<String>,
    #[serde(default)]
    pub seniority: Option<Seniority>,
    #[serde(default)]
    pub locations: Vec<Location>,
    #[serde(default)]
    pub remote_ok: bool,
    #[serde(default)]
    pub work_authorization: Option<String>,
    #[serde(default)]
    pub languages: Vec<String>,
    /// Skill name to weight in [0, 1].
    #[serde(default)]
    pub skills: BTreeMap<String, f32>,
    #[serde(default)]
    pub preferences: Preferences,
    #[serde(default)]
    pub salary_expectation: Option<SalaryExpectation>,
    #[serde(default)]
    pub embedding: Option<Embedding>,
}

fn default_profile_version() -> u32 {
    1
}

impl Profile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: default_profile_version(),
            ..Self::default()
        }
    }

    /// Rejects profiles that cannot be scored consistently.
    pub fn validate(&self) -> Result<(), DataQualityError> {
        if self.id.trim().is_empty() {
            return Err(DataQualityError::MissingProfileId);
        }
        for (skill, weight) in &self.skills {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(DataQualityError::InvalidSkillWeight {
                    profile_id: self.id.clone(),
                    skill: skill.clone(),
                    weight: *weight,
                });
            }
        }
        if let Some(expectation) = &self.salary_expectation {
            if !expectation.amount.is_finite() || expectation.amount < 0.0 {
                return Err(DataQualityError::InvalidSalaryExpectation {
                    profile_id: self.id.clone(),
                });
            }
        }
        Ok(())
    }

    /// Text handed to an [`Embedder`](crate::Embedder) when the profile
    /// arrives without a usable embedding.
    pub fn embedding_text(&self) -> String {
        let mut parts: Vec<&str> = self.role_tags.iter().map(String::as_str).collect();
        parts.extend(self.skills.keys().map(String::as_str));
        parts.extend(self.preferences.tech_likes.iter().map(String::as_str));
        parts.join(" ")
    }

    pub fn total_skill_weight(&self) -> f32 {
        self.skills.values().copied().filter(|w| *w > 0.0).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seniority_orders_by_level() {
        assert!(Seniority::Junior < Seniority::Senior);
        assert_eq!(Seniority::Staff.rank() - Seniority::Mid.rank(), 2);
    }

    #[test]
    fn validate_rejects_blank_id() {
        let profile = Profile::new("  ");
        assert_eq!(profile.validate(), Err(DataQualityError::MissingProfileId));
    }

    #[test]
    fn validate_rejects_negative_weight() {
        let mut profile = Profile::new("p-1");
        profile.skills.insert("rust".into(), -0.1);
        assert!(matches!(
            profile.validate(),
            Err(DataQualityError::InvalidSkillWeight { .. })
        ));
    }

    #[test]
    fn embedding_text_joins_roles_and_skills() {
        let mut profile = Profile::new("p-1");
        profile.role_tags = vec!["backend engineer".into()];
        profile.skills.insert("rust".into(), 0.9);
        assert_eq!(profile.embedding_text(), "backend engineer rust");
    }

    #[test]
    fn deserializes_with_defaults() {
        let profile: Profile = serde_json::from_str(r#"{"id":"p-9"}"#).expect("parse");
        assert_eq!(profile.version, 1);
        assert!(profile.skills.is_empty());
        assert!(!profile.remote_ok);
    }
}
