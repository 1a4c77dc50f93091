use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use features::{Feature, FeatureSchema, FeatureVector};
use serde::{Deserialize, Serialize};

use crate::ConfigurationError;

/// One feature's share of a score: `value × importance`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Contribution {
    pub feature: Feature,
    pub value: f32,
}

/// A trained ranking artifact.
///
/// Implementations are immutable once constructed. A new model version is a
/// new value, installed through [`RankerHandle::swap`](crate::RankerHandle::swap).
pub trait ScoringModel: Send + Sync {
    /// Artifact version, reported in diagnostics.
    fn version(&self) -> &str;

    /// Feature layout the artifact was trained on.
    fn schema(&self) -> &FeatureSchema;

    fn score(&self, features: &FeatureVector) -> f32;

    /// Per-feature contributions, when the artifact can attribute its score.
    fn attribute(&self, _features: &FeatureVector) -> Option<Vec<Contribution>> {
        None
    }
}

/// On-disk shape of a linear artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LinearArtifact {
    version: String,
    schema: FeatureSchema,
    #[serde(default)]
    bias: f32,
    weights: BTreeMap<String, f32>,
}

/// `score = bias + Σ weight_i × feature_i`.
///
/// The weights double as per-feature importances, so every score can be
/// attributed exactly.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    version: String,
    schema: FeatureSchema,
    bias: f32,
    /// Indexed by position in `schema.names`.
    weights: Vec<f32>,
}

impl LinearModel {
    /// Builds a model for the current schema from per-feature weights.
    pub fn new(
        version: impl Into<String>,
        bias: f32,
        weights: &[(Feature, f32)],
    ) -> Result<Self, ConfigurationError> {
        let artifact = LinearArtifact {
            version: version.into(),
            schema: FeatureSchema::current(),
            bias,
            weights: weights
                .iter()
                .map(|(f, w)| (f.name().to_string(), *w))
                .collect(),
        };
        Self::from_artifact(artifact)
    }

    /// Hand-tuned weights used when no trained artifact is configured.
    pub fn baseline() -> Self {
        let schema = FeatureSchema::current();
        let weights = Feature::ALL
            .iter()
            .map(|f| match f {
                Feature::Cosine => 1.0,
                Feature::SkillOverlap => 1.5,
                Feature::TitleMatch => 0.6,
                Feature::GeoDistanceKm => -0.002,
                Feature::RemoteMatch => 0.3,
                Feature::SalaryFitGap => 0.4,
                Feature::IndustryMatch => 0.3,
                Feature::PostingAgeDays => -0.01,
            })
            .collect();
        Self {
            version: "baseline-1".to_string(),
            schema,
            bias: 0.0,
            weights,
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigurationError> {
        let artifact: LinearArtifact = serde_json::from_str(json)
            .map_err(|e| ConfigurationError::InvalidArtifact(e.to_string()))?;
        Self::from_artifact(artifact)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| ConfigurationError::ArtifactUnreadable {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&json)
    }

    /// Serializes back to the artifact format.
    pub fn to_json(&self) -> Result<String, ConfigurationError> {
        let artifact = LinearArtifact {
            version: self.version.clone(),
            schema: self.schema.clone(),
            bias: self.bias,
            weights: self
                .schema
                .names
                .iter()
                .cloned()
                .zip(self.weights.iter().copied())
                .collect(),
        };
        serde_json::to_string_pretty(&artifact)
            .map_err(|e| ConfigurationError::InvalidArtifact(e.to_string()))
    }

    /// Resolves named weights against the artifact's declared schema.
    ///
    /// Does not compare against [`FeatureSchema::current`]; that is the
    /// ranker's job, so a model for another layout still loads and is
    /// refused with a precise message.
    fn from_artifact(artifact: LinearArtifact) -> Result<Self, ConfigurationError> {
        let LinearArtifact {
            version,
            schema,
            bias,
            weights,
        } = artifact;

        if !bias.is_finite() {
            return Err(ConfigurationError::NonFiniteParameter {
                model_version: version,
                parameter: "bias".into(),
            });
        }
        if let Some(unknown) = weights.keys().find(|name| !schema.names.contains(name)) {
            return Err(ConfigurationError::UnknownFeature {
                model_version: version.clone(),
                feature: unknown.clone(),
            });
        }

        let mut resolved = Vec::with_capacity(schema.names.len());
        for name in &schema.names {
            let Some(weight) = weights.get(name) else {
                return Err(ConfigurationError::MissingWeight {
                    model_version: version.clone(),
                    feature: name.clone(),
                });
            };
            if !weight.is_finite() {
                return Err(ConfigurationError::NonFiniteParameter {
                    model_version: version.clone(),
                    parameter: name.clone(),
                });
            }
            resolved.push(*weight);
        }

        Ok(Self {
            version,
            schema,
            bias,
            weights: resolved,
        })
    }

    pub fn bias(&self) -> f32 {
        self.bias
    }

    pub fn weight(&self, feature: Feature) -> Option<f32> {
        self.schema
            .names
            .iter()
            .position(|n| n == feature.name())
            .map(|idx| self.weights[idx])
    }
}

impl ScoringModel for LinearModel {
    fn version(&self) -> &str {
        &self.version
    }

    fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    fn score(&self, features: &FeatureVector) -> f32 {
        self.bias
            + self
                .weights
                .iter()
                .zip(features.as_slice())
                .map(|(w, x)| w * x)
                .sum::<f32>()
    }

    fn attribute(&self, features: &FeatureVector) -> Option<Vec<Contribution>> {
        Some(
            features
                .iter()
                .zip(&self.weights)
                .map(|((feature, value), weight)| Contribution {
                    feature,
                    value: value * weight,
                })
                .collect(),
        )
    }
}
