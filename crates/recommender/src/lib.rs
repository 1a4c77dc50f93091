//! # jobrec recommender
//!
//! ## Purpose
//!
//! Composes the pipeline stages into one call:
//!
//! ```text
//! profile ─▶ VectorIndex (top-K′) ─▶ FilterEngine ─▶ FeatureExtractor + Ranker
//!         ─▶ per-company cap ─▶ [offset, offset + k) ─▶ Explainer ─▶ response
//! ```
//!
//! ## Core Types
//!
//! - [`Recommender`]: owns the index, the job catalog snapshot, the active
//!   ranker and the filter rules.
//! - [`RecommendRequest`]: profile, `k`, `offset`, `debug`, request clock.
//! - [`RecommendResponse`]: [`RankedResult`]s plus optional [`DebugInfo`].
//! - [`RecommenderConfig`]: retrieval pool, over-fetch, diversity cap and
//!   the configs of every stage.
//!
//! Zero results are never an error: an empty index, a profile without an
//! embedding, or filters that reject everything all produce an empty result
//! list with a note in [`DebugInfo::notes`]. Only a malformed profile or a
//! configuration / schema mismatch is reported as [`RecommendError`].
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use model::{Company, Embedding, Job, Profile};
//! use ranker::LinearModel;
//! use recommender::{Recommender, RecommenderConfig};
//!
//! let rec = Recommender::new(RecommenderConfig::new(3), Arc::new(LinearModel::baseline())).unwrap();
//!
//! let mut job = Job::new("j-1", "Backend Engineer", Company::new("acme"));
//! job.embedding = Some(Embedding::new("m1", vec![1.0, 0.0, 0.0]));
//! rec.replace_jobs(vec![job]);
//!
//! let mut profile = Profile::new("p-1");
//! profile.embedding = Some(Embedding::new("m1", vec![0.9, 0.1, 0.0]));
//! let response = rec.recommend(&profile, 10, true).unwrap();
//! assert_eq!(response.results[0].job_id, "j-1");
//! ```
//!
//! ## Observability
//!
//! Install a [`RecommendMetrics`] implementation via
//! [`set_recommend_metrics`] to receive per-request latency and funnel
//! counts.

mod config;
mod diversity;
mod engine;
pub mod metrics;
mod types;

pub use crate::config::{RecommenderConfig, DEFAULT_DIMENSION};
pub use crate::engine::{Recommender, ReplaceReport};
pub use crate::metrics::{set_recommend_metrics, Funnel, RecommendMetrics};
pub use crate::types::{
    DebugInfo, JobFeatures, RankedResult, RecommendError, RecommendRequest, RecommendResponse,
    NOTE_NO_ELIGIBLE,
};
