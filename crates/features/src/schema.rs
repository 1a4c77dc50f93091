use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

/// Version tag of the feature layout produced by this crate.
///
/// Bump it whenever a feature is added, removed, reordered or changes
/// meaning; ranking artifacts trained on another layout are then refused.
pub const SCHEMA_VERSION: &str = "fv-1";

/// One named input to the scoring function. Declaration order is the
/// column order of [`FeatureVector`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Feature {
    Cosine,
    SkillOverlap,
    TitleMatch,
    GeoDistanceKm,
    RemoteMatch,
    SalaryFitGap,
    IndustryMatch,
    PostingAgeDays,
}

impl Feature {
    pub const COUNT: usize = 8;

    pub const ALL: [Feature; Feature::COUNT] = [
        Feature::Cosine,
        Feature::SkillOverlap,
        Feature::TitleMatch,
        Feature::GeoDistanceKm,
        Feature::RemoteMatch,
        Feature::SalaryFitGap,
        Feature::IndustryMatch,
        Feature::PostingAgeDays,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    /// Column name as it appears in the schema and in model artifacts.
    pub fn name(self) -> &'static str {
        match self {
            Feature::Cosine => "cosine",
            Feature::SkillOverlap => "skill_overlap",
            Feature::TitleMatch => "title_match",
            Feature::GeoDistanceKm => "geo_distance_km",
            Feature::RemoteMatch => "remote_match",
            Feature::SalaryFitGap => "salary_fit_gap",
            Feature::IndustryMatch => "industry_match",
            Feature::PostingAgeDays => "posting_age_days",
        }
    }

    /// Wording used in explanations.
    pub fn label(self) -> &'static str {
        match self {
            Feature::Cosine => "profile similarity",
            Feature::SkillOverlap => "skill overlap",
            Feature::TitleMatch => "title match",
            Feature::GeoDistanceKm => "distance",
            Feature::RemoteMatch => "remote fit",
            Feature::SalaryFitGap => "salary fit",
            Feature::IndustryMatch => "industry preference",
            Feature::PostingAgeDays => "posting age",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Feature::ALL.into_iter().find(|f| f.name() == name)
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Declared feature layout: version tag plus ordered column names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: String,
    pub names: Vec<String>,
}

impl FeatureSchema {
    /// The layout [`FeatureExtractor`](crate::FeatureExtractor) produces.
    pub fn current() -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            names: Feature::ALL.iter().map(|f| f.name().to_string()).collect(),
        }
    }

    /// Describes the first difference from `other`, or `None` when both
    /// layouts are identical.
    pub fn mismatch(&self, other: &FeatureSchema) -> Option<String> {
        if self.version != other.version {
            return Some(format!(
                "schema version `{}` does not match `{}`",
                other.version, self.version
            ));
        }
        if self.names.len() != other.names.len() {
            return Some(format!(
                "expected {} features, artifact declares {}",
                self.names.len(),
                other.names.len()
            ));
        }
        self.names
            .iter()
            .zip(&other.names)
            .enumerate()
            .find(|(_, (ours, theirs))| ours != theirs)
            .map(|(idx, (ours, theirs))| {
                format!("feature #{idx} is `{theirs}`, expected `{ours}`")
            })
    }
}

/// Feature values for one (profile, job) pair, in [`Feature::ALL`] order.
///
/// Serializes as a name → value map.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f32; Feature::COUNT],
}

impl FeatureVector {
    pub fn from_values(values: [f32; Feature::COUNT]) -> Self {
        Self { values }
    }

    pub fn get(&self, feature: Feature) -> f32 {
        self.values[feature.index()]
    }

    pub(crate) fn set(&mut self, feature: Feature, value: f32) {
        self.values[feature.index()] = value;
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (Feature, f32)> + '_ {
        Feature::ALL.into_iter().zip(self.values.iter().copied())
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(Feature::COUNT))?;
        for (feature, value) in self.iter() {
            map.serialize_entry(feature.name(), &value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn current_schema_lists_features_in_order() {
        let schema = FeatureSchema::current();
        assert_eq!(schema.version, "fv-1");
        assert_eq!(
            schema.names,
            vec![
                "cosine",
                "skill_overlap",
                "title_match",
                "geo_distance_km",
                "remote_match",
                "salary_fit_gap",
                "industry_match",
                "posting_age_days"
            ]
        );
        for (idx, feature) in Feature::ALL.iter().enumerate() {
            assert_eq!(feature.index(), idx);
            assert_eq!(Feature::from_name(feature.name()), Some(*feature));
        }
    }

    #[test]
    fn mismatch_reports_version_length_and_order() {
        let current = FeatureSchema::current();
        assert_eq!(current.mismatch(&FeatureSchema::current()), None);

        let mut other = FeatureSchema::current();
        other.version = "fv-0".into();
        assert!(current.mismatch(&other).is_some_and(|m| m.contains("fv-0")));

        let mut other = FeatureSchema::current();
        other.names.pop();
        assert!(current.mismatch(&other).is_some_and(|m| m.contains("7")));

        let mut other = FeatureSchema::current();
        other.names.swap(1, 2);
        assert_eq!(
            current.mismatch(&other).as_deref(),
            Some("feature #1 is `title_match`, expected `skill_overlap`")
        );
    }

    #[test]
    fn vector_serializes_as_named_map() {
        let mut v = FeatureVector::from_values([0.0; Feature::COUNT]);
        v.set(Feature::SkillOverlap, 0.5);
        let json = serde_json::to_value(v).expect("serialize");
        assert_eq!(json["skill_overlap"], 0.5);
        assert_eq!(json.as_object().map(|m| m.len()), Some(Feature::COUNT));
    }
}
