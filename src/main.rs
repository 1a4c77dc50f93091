use std::env;
use std::sync::Arc;

use anyhow::Context;
use jobrec::demo::{demo_now, rust_engineer_profile, synthetic_jobs};
use jobrec::{HashEmbedder, JobrecConfig, RecommendRequest, build_recommender};
use tracing::info;
use tracing_subscriber::EnvFilter;

const DEMO_JOBS: usize = 2_000;
const DEMO_COMPANIES: usize = 150;

fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = match env::args().nth(1) {
        Some(path) => JobrecConfig::from_file(&path)
            .with_context(|| format!("failed to load config from {path}"))?,
        None => JobrecConfig::default(),
    };
    info!(
        name = config.name.as_deref().unwrap_or("default"),
        dimension = config.index.dimension,
        "configuration loaded"
    );

    let model_version = config
        .index
        .model_version
        .clone()
        .unwrap_or_else(|| "hash-1".to_string());
    let embedder = Arc::new(HashEmbedder::new(model_version, config.index.dimension));
    let recommender = build_recommender(&config, Some(embedder))?;

    let report = recommender.replace_jobs(synthetic_jobs(DEMO_JOBS, DEMO_COMPANIES));
    info!(
        accepted = report.accepted,
        rejected = report.rejected,
        indexed = report.index.indexed,
        index_version = report.index.version,
        "catalog loaded"
    );

    let profile = rust_engineer_profile();
    let request = RecommendRequest::new(&profile, 10)
        .with_debug(true)
        .with_as_of(demo_now());
    let response = recommender.recommend_with(request)?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// `RUST_LOG` picks the level; `JOBREC_LOG_JSON=1` switches to JSON lines.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    if env::var("JOBREC_LOG_JSON").is_ok_and(|v| v == "1") {
        builder
            .with_thread_ids(true)
            .with_thread_names(true)
            .json()
            .init();
    } else {
        builder.init();
    }
}
