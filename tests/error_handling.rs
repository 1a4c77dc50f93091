use std::sync::Arc;

use jobrec::demo::{demo_now, rust_engineer_profile, synthetic_jobs};
use jobrec::{
    Company, ConfigLoadError, ConfigurationError, DataQualityError, Embedding, Feature,
    HashEmbedder, Job, JobrecConfig, LinearModel, Profile, RecommendError, RecommendRequest,
    Recommender, RecommenderConfig, SalaryRange, build_recommender,
};

fn recommender(dimension: usize) -> Recommender {
    let config = RecommenderConfig::new(dimension);
    Recommender::new(config, Arc::new(LinearModel::baseline())).expect("recommender")
}

#[test]
fn profile_without_id_is_rejected() {
    let rec = recommender(8);
    let profile = Profile::new("  ");
    assert!(matches!(
        rec.recommend(&profile, 5, false),
        Err(RecommendError::InvalidProfile(_))
    ));
}

#[test]
fn out_of_range_skill_weight_is_rejected() {
    let rec = recommender(8);
    let mut profile = rust_engineer_profile();
    profile.skills.insert("cobol".into(), f32::NAN);
    let err = rec.recommend(&profile, 5, false).unwrap_err();
    assert!(matches!(
        err,
        RecommendError::InvalidProfile(DataQualityError::InvalidSkillWeight { .. })
    ));
}

#[test]
fn profile_without_embedding_or_embedder_yields_empty_results() {
    let rec = recommender(8);
    let mut job = Job::new("j-1", "Rust Engineer", Company::new("acme"));
    job.embedding = Some(Embedding::new("m1", vec![1.0; 8]));
    job.remote_ok = true;
    rec.replace_jobs(vec![job]);

    let response = rec
        .recommend(&Profile::new("no-vector"), 5, true)
        .expect("degrades, does not fail");
    assert!(response.results.is_empty());
    let notes = response.debug.expect("debug").notes;
    assert!(notes.iter().any(|n| n.contains("no usable embedding")), "{notes:?}");
}

#[test]
fn invalid_jobs_are_skipped_not_fatal() {
    let embedder = Arc::new(HashEmbedder::new("hash-1", 16));
    let rec = recommender(16).with_embedder(embedder);

    let mut inverted = Job::new("bad-salary", "Engineer", Company::new("a"));
    inverted.salary = Some(SalaryRange {
        currency: "EUR".into(),
        min: 90_000.0,
        max: 10_000.0,
    });
    let orphan = Job::new("orphan", "Engineer", Company::new(""));
    let mut jobs = synthetic_jobs(20, 5);
    jobs.push(inverted);
    jobs.push(orphan);

    let report = rec.replace_jobs(jobs);
    assert_eq!(report.accepted, 20);
    assert_eq!(report.rejected, 2);
    assert_eq!(report.index.indexed, 20);
}

#[test]
fn mismatched_model_schema_fails_at_startup() {
    let json = LinearModel::baseline()
        .to_json()
        .expect("serialize")
        .replace("fv-1", "fv-legacy");
    let model = LinearModel::from_json(&json).expect("artifact parses");
    let result = Recommender::new(RecommenderConfig::new(8), Arc::new(model));
    assert!(matches!(
        result,
        Err(RecommendError::Configuration(ConfigurationError::SchemaMismatch { .. }))
    ));
}

#[test]
fn failed_model_swap_keeps_previous_model() {
    let rec = recommender(8);
    let json = LinearModel::baseline()
        .to_json()
        .expect("serialize")
        .replace("fv-1", "fv-legacy");
    let stale = LinearModel::from_json(&json).expect("artifact parses");

    assert!(rec.swap_model(Arc::new(stale)).is_err());
    assert_eq!(rec.ranker().current().model_version(), "baseline-1");
}

#[test]
fn artifact_missing_a_weight_is_rejected() {
    let weights = [(Feature::Cosine, 1.0)];
    assert!(matches!(
        LinearModel::new("partial", 0.0, &weights),
        Err(ConfigurationError::MissingWeight { .. })
    ));
}

#[test]
fn invalid_yaml_values_are_reported() {
    let result = JobrecConfig::from_yaml(
        r#"
version: "1.0"
index:
  dimension: 0
"#,
    );
    assert!(matches!(result, Err(ConfigLoadError::Validation(_))));

    let result = JobrecConfig::from_yaml("version: [not, a, string]\n");
    assert!(matches!(result, Err(ConfigLoadError::YamlParse(_))));
}

#[test]
fn invalid_recommender_config_is_rejected() {
    let config = RecommenderConfig::new(8).with_overfetch_factor(0.5);
    let result = Recommender::new(config, Arc::new(LinearModel::baseline()));
    assert!(matches!(result, Err(RecommendError::InvalidConfig(_))));
}

#[test]
fn unreadable_model_path_fails_build() {
    let config = JobrecConfig {
        model_path: Some("/definitely/missing/model.json".into()),
        ..JobrecConfig::default()
    };
    let result = build_recommender(&config, None);
    assert!(matches!(
        result,
        Err(RecommendError::Configuration(ConfigurationError::ArtifactUnreadable { .. }))
    ));
}

#[test]
fn embedder_with_wrong_dimension_is_ignored() {
    let rec = recommender(8).with_embedder(Arc::new(HashEmbedder::new("hash-1", 16)));
    let profile = rust_engineer_profile();
    let request = RecommendRequest::new(&profile, 3)
        .with_debug(true)
        .with_as_of(demo_now());
    let response = rec.recommend_with(request).expect("degrades, does not fail");
    assert!(response.results.is_empty());
    let notes = response.debug.expect("debug").notes;
    assert!(notes.iter().any(|n| n.contains("no usable embedding")), "{notes:?}");
}
