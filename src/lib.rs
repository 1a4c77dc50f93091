//! Workspace umbrella crate for the jobrec recommendation engine.
//!
//! This crate re-exports the pipeline stages and wires them together from a
//! single YAML configuration so callers can go from a config file to a
//! ready [`Recommender`] with one call.
//!
//! ```text
//! JobrecConfig ─▶ RecommenderConfig ─┐
//! model_path  ─▶ LinearModel ────────┼─▶ Recommender ─▶ recommend(profile, k)
//! Embedder (optional) ───────────────┘
//! ```

pub mod config;
pub mod demo;

pub use config::{ConfigLoadError, JobrecConfig};

pub use explain::{ExplainConfig, ExplainInput, Explainer};
pub use features::{
    Feature, FeatureConfig, FeatureExtractor, FeatureSchema, FeatureVector, SCHEMA_VERSION,
};
pub use filter::{FilterConfig, FilterEngine, FilterOutcome, FilterRule, MissingLocationPolicy};
pub use index::{AnnConfig, BuildReport, IndexConfig, IndexError, IndexSnapshot, VectorIndex};
pub use model::{
    Candidate, CandidateSet, Company, DataQualityError, Embedder, Embedding, HashEmbedder, Job,
    JobCatalog, Location, Preferences, Profile, SalaryExpectation, SalaryRange, Seniority,
};
pub use ranker::{
    ConfigurationError, Contribution, LinearModel, Ranker, RankerHandle, ScoredJob, ScoringModel,
};
pub use recommender::{
    DebugInfo, RankedResult, RecommendError, RecommendRequest, RecommendResponse, Recommender,
    RecommenderConfig, ReplaceReport, set_recommend_metrics,
};

use std::sync::Arc;

use tracing::info;

/// Load the ranking artifact named by `config.model_path`, or the built-in
/// baseline when none is configured.
pub fn load_model(config: &JobrecConfig) -> Result<Arc<dyn ScoringModel>, ConfigurationError> {
    match &config.model_path {
        Some(path) => {
            let model = LinearModel::from_file(path)?;
            info!(
                path = %path.display(),
                model_version = model.version(),
                "loaded ranking model"
            );
            Ok(Arc::new(model))
        }
        None => Ok(Arc::new(LinearModel::baseline())),
    }
}

/// Build a [`Recommender`] from a loaded configuration.
///
/// The ranking artifact is checked against the feature schema here, so a
/// mismatched model fails before any job is indexed.
pub fn build_recommender(
    config: &JobrecConfig,
    embedder: Option<Arc<dyn Embedder>>,
) -> Result<Recommender, RecommendError> {
    let model = load_model(config)?;
    let recommender = Recommender::new(config.recommender_config(), model)?;
    Ok(match embedder {
        Some(embedder) => recommender.with_embedder(embedder),
        None => recommender,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn baseline_model_without_path() {
        let config = JobrecConfig::default();
        let model = load_model(&config).expect("baseline");
        assert_eq!(model.version(), "baseline-1");
    }

    #[test]
    fn model_loaded_from_configured_path() {
        let mut artifact = NamedTempFile::new().expect("temp file");
        let weights = Feature::ALL.map(|f| (f, if f == Feature::Cosine { 2.0 } else { 0.0 }));
        let json = LinearModel::new("tuned-7", 0.1, &weights)
            .expect("model")
            .to_json()
            .expect("json");
        artifact.write_all(json.as_bytes()).expect("write");

        let config = JobrecConfig {
            model_path: Some(artifact.path().to_path_buf()),
            ..JobrecConfig::default()
        };
        let rec = build_recommender(&config, None).expect("recommender");
        assert_eq!(rec.ranker().current().model_version(), "tuned-7");
    }

    #[test]
    fn unreadable_model_is_a_configuration_error() {
        let config = JobrecConfig {
            model_path: Some("/no/such/model.json".into()),
            ..JobrecConfig::default()
        };
        assert!(matches!(
            build_recommender(&config, None),
            Err(RecommendError::Configuration(
                ConfigurationError::ArtifactUnreadable { .. }
            ))
        ));
    }
}
