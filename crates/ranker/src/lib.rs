//! # jobrec ranker
//!
//! Applies an externally trained scoring artifact to feature vectors and
//! imposes the final order on eligible jobs.
//!
//! - [`ScoringModel`]: the artifact capability (`score`, optional
//!   `attribute`). [`LinearModel`] is the JSON-backed implementation.
//! - [`Ranker`]: refuses artifacts whose [`FeatureSchema`](features::FeatureSchema)
//!   differs from the extractor's, then scores and sorts by
//!   (score desc, cosine desc, job id asc).
//! - [`RankerHandle`]: atomically swappable slot for the active ranker.
//!
//! ```
//! use std::sync::Arc;
//! use ranker::{LinearModel, Ranker, RankerHandle};
//!
//! let ranker = Ranker::new(Arc::new(LinearModel::baseline())).unwrap();
//! let handle = RankerHandle::new(ranker);
//! assert_eq!(handle.current().model_version(), "baseline-1");
//! ```

mod error;
mod scoring;
mod ranker;

pub use crate::error::ConfigurationError;
pub use crate::scoring::{Contribution, LinearModel, ScoringModel};
pub use crate::ranker::{rank_order, Ranker, RankerHandle, ScoredJob, DEFAULT_PARALLEL_THRESHOLD};
