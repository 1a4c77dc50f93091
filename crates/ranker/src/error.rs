use thiserror::Error;

/// Structural mismatch between the feature extractor and a ranking artifact.
///
/// Raised at load or swap time only. A request never sees it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigurationError {
    /// The artifact was trained on a different feature layout.
    #[error("model {model_version}: feature schema mismatch: {detail}")]
    SchemaMismatch {
        model_version: String,
        detail: String,
    },
    /// The artifact file could not be read.
    #[error("cannot read model artifact {path}: {reason}")]
    ArtifactUnreadable { path: String, reason: String },
    /// The artifact is not valid JSON for the expected shape.
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),
    /// A weight refers to a feature the schema does not declare.
    #[error("model {model_version}: weight for unknown feature `{feature}`")]
    UnknownFeature {
        model_version: String,
        feature: String,
    },
    /// A declared feature has no weight.
    #[error("model {model_version}: no weight for feature `{feature}`")]
    MissingWeight {
        model_version: String,
        feature: String,
    },
    /// Bias or a weight is NaN or infinite.
    #[error("model {model_version}: non-finite parameter `{parameter}`")]
    NonFiniteParameter {
        model_version: String,
        parameter: String,
    },
}
