//! # jobrec index
//!
//! Nearest-neighbour retrieval over job embeddings.
//!
//! ## Core Features
//!
//! - **Cosine via inner product**: vectors are L2-normalized on the way in,
//!   so the inner product the index reports *is* the cosine similarity.
//! - **HNSW with exact fallback**: large snapshots use an HNSW graph
//!   (see [`ann`]) to propose neighbours; small ones scan linearly. Either way
//!   the returned similarities are recomputed exactly and sorted by
//!   (similarity desc, insertion index asc), so output is deterministic for a
//!   fixed snapshot.
//! - **Atomic snapshots**: [`VectorIndex::build`] constructs a complete
//!   [`IndexSnapshot`] off to the side and then swaps the active pointer.
//!   Readers holding the previous `Arc<IndexSnapshot>` keep using it until
//!   they drop it; nobody observes a half-built index.
//!
//! ## Example Usage
//!
//! ```
//! use index::{IndexConfig, VectorIndex};
//! use model::Embedding;
//!
//! let index = VectorIndex::new(IndexConfig::new(3)).unwrap();
//! let report = index.build(vec![
//!     ("job-a".to_string(), Embedding::new("m1", vec![1.0, 0.0, 0.0])),
//!     ("job-b".to_string(), Embedding::new("m1", vec![0.0, 1.0, 0.0])),
//! ]);
//! assert_eq!(report.indexed, 2);
//!
//! let hits = index.query(&[0.9, 0.1, 0.0], 1).unwrap();
//! assert_eq!(hits.as_slice()[0].job_id, "job-a");
//! ```

pub mod ann;

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock};

use model::{dot, l2_normalized, Candidate, CandidateSet, Embedding};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub use crate::ann::AnnConfig;
use crate::ann::AnnGraph;

/// Config for initializing the index.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct IndexConfig {
    /// Dimensionality every indexed and query vector must have.
    pub dimension: usize,
    /// Embedding model version the index accepts. `None` accepts any tag.
    #[serde(default)]
    pub model_version: Option<String>,
    /// ANN (Approximate Nearest Neighbor) configuration.
    #[serde(default)]
    pub ann: AnnConfig,
}

impl IndexConfig {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            model_version: None,
            ann: AnnConfig::default(),
        }
    }

    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        self.model_version = Some(version.into());
        self
    }

    pub fn with_ann(mut self, ann: AnnConfig) -> Self {
        self.ann = ann;
        self
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        if self.dimension == 0 {
            return Err(IndexError::InvalidConfig(
                "dimension must be greater than zero".into(),
            ));
        }
        self.ann.validate().map_err(IndexError::InvalidConfig)
    }
}

/// Custom error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
    #[error("invalid index config: {0}")]
    InvalidConfig(String),
}

/// Outcome of one [`VectorIndex::build`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Version assigned to the snapshot this build produced.
    pub version: u64,
    pub indexed: usize,
    /// Ids seen more than once; the first occurrence was kept.
    pub duplicates: usize,
    /// Empty ids, wrong dimension, non-finite or zero vectors.
    pub invalid: usize,
    /// Embeddings tagged with a different model version than the index.
    pub stale: usize,
    /// Whether the snapshot became the active one.
    pub published: bool,
}

/// One immutable, fully built version of the index.
pub struct IndexSnapshot {
    version: u64,
    dimension: usize,
    model_version: Option<String>,
    ids: Vec<String>,
    vectors: Vec<Vec<f32>>,
    graph: Option<AnnGraph>,
}

impl IndexSnapshot {
    fn empty(config: &IndexConfig) -> Self {
        Self {
            version: 0,
            dimension: config.dimension,
            model_version: config.model_version.clone(),
            ids: Vec::new(),
            vectors: Vec::new(),
            graph: None,
        }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn model_version(&self) -> Option<&str> {
        self.model_version.as_deref()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Whether queries go through the HNSW graph.
    pub fn uses_ann(&self) -> bool {
        self.graph.is_some()
    }

    pub fn contains(&self, job_id: &str) -> bool {
        self.ids.iter().any(|id| id == job_id)
    }

    /// Top-`k` jobs by cosine similarity, non-increasing, ties broken by
    /// insertion order.
    ///
    /// An empty snapshot, `k == 0`, or a zero query vector yield an empty set.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<CandidateSet, IndexError> {
        if vector.len() != self.dimension {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimension,
                got: vector.len(),
            });
        }
        if k == 0 || self.is_empty() {
            return Ok(CandidateSet::new());
        }

        let query = l2_normalized(vector);
        if query.iter().all(|v| *v == 0.0) || query.iter().any(|v| !v.is_finite()) {
            warn!(
                index_version = self.version,
                "query vector has no direction; returning no candidates"
            );
            return Ok(CandidateSet::new());
        }

        let mut scored: Vec<(usize, f32)> = match &self.graph {
            Some(graph) => graph
                .neighbours(&query, k)
                .into_iter()
                .filter(|&idx| idx < self.vectors.len())
                .collect::<HashSet<usize>>()
                .into_iter()
                .map(|idx| (idx, dot(&query, &self.vectors[idx])))
                .collect(),
            None => self
                .vectors
                .iter()
                .enumerate()
                .map(|(idx, vec)| (idx, dot(&query, vec)))
                .collect(),
        };

        if scored.len() > k {
            scored.select_nth_unstable_by(k - 1, rank_order);
            scored.truncate(k);
        }
        scored.sort_unstable_by(rank_order);

        Ok(scored
            .into_iter()
            .map(|(idx, similarity)| Candidate {
                job_id: self.ids[idx].clone(),
                similarity: similarity.clamp(-1.0, 1.0),
            })
            .collect())
    }
}

/// Similarity descending, then internal index ascending.
fn rank_order(a: &(usize, f32), b: &(usize, f32)) -> Ordering {
    b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0))
}

/// Shared, read-mostly handle to the active [`IndexSnapshot`].
pub struct VectorIndex {
    config: IndexConfig,
    active: RwLock<Arc<IndexSnapshot>>,
    next_version: AtomicU64,
}

impl VectorIndex {
    /// Create an index with an empty active snapshot (version 0).
    pub fn new(config: IndexConfig) -> Result<Self, IndexError> {
        config.validate()?;
        let empty = Arc::new(IndexSnapshot::empty(&config));
        Ok(Self {
            config,
            active: RwLock::new(empty),
            next_version: AtomicU64::new(1),
        })
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Pin the active snapshot for the duration of a request.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        let guard = self
            .active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    pub fn version(&self) -> u64 {
        self.snapshot().version()
    }

    /// Query the active snapshot.
    pub fn query(&self, vector: &[f32], k: usize) -> Result<CandidateSet, IndexError> {
        self.snapshot().query(vector, k)
    }

    /// Build a new snapshot from `(job_id, embedding)` pairs and publish it.
    ///
    /// Iteration order is insertion order and therefore the tie-break order.
    /// Invalid, stale and duplicate entries are skipped and counted. A build
    /// that finishes after a newer one has already been published is
    /// discarded.
    pub fn build<I>(&self, embeddings: I) -> BuildReport
    where
        I: IntoIterator<Item = (String, Embedding)>,
    {
        let (snapshot, mut report) = self.prepare(embeddings);
        report.published = self.publish(snapshot);
        info!(
            version = report.version,
            indexed = report.indexed,
            published = report.published,
            "index_build_complete"
        );
        report
    }

    /// Build a snapshot without making it active.
    ///
    /// Callers that pair the index with other state publish it themselves
    /// with [`VectorIndex::publish`] while holding their own lock. No lock
    /// is taken here.
    pub fn prepare<I>(&self, embeddings: I) -> (Arc<IndexSnapshot>, BuildReport)
    where
        I: IntoIterator<Item = (String, Embedding)>,
    {
        let version = self.next_version.fetch_add(1, AtomicOrdering::SeqCst);
        let mut report = BuildReport {
            version,
            ..BuildReport::default()
        };

        let mut seen = HashSet::new();
        let mut ids = Vec::new();
        let mut vectors = Vec::new();

        for (job_id, embedding) in embeddings {
            if job_id.trim().is_empty()
                || embedding.dimension() != self.config.dimension
                || !embedding.is_usable()
            {
                debug!(job_id = %job_id, dimension = embedding.dimension(), "embedding_invalid");
                report.invalid += 1;
                continue;
            }
            if let Some(expected) = &self.config.model_version {
                if &embedding.model_version != expected {
                    debug!(
                        job_id = %job_id,
                        expected = %expected,
                        got = %embedding.model_version,
                        "embedding_stale"
                    );
                    report.stale += 1;
                    continue;
                }
            }
            if !seen.insert(job_id.clone()) {
                report.duplicates += 1;
                continue;
            }
            vectors.push(l2_normalized(&embedding.vector));
            ids.push(job_id);
        }

        report.indexed = ids.len();
        let graph = AnnGraph::build(&vectors, &self.config.ann);
        let snapshot = IndexSnapshot {
            version,
            dimension: self.config.dimension,
            model_version: self.config.model_version.clone(),
            ids,
            vectors,
            graph,
        };

        if report.invalid + report.stale + report.duplicates > 0 {
            warn!(
                version,
                invalid = report.invalid,
                stale = report.stale,
                duplicates = report.duplicates,
                "index_build_skipped_entries"
            );
        }
        (Arc::new(snapshot), report)
    }

    /// Make `snapshot` active unless a newer version already is.
    pub fn publish(&self, snapshot: Arc<IndexSnapshot>) -> bool {
        let mut guard = self
            .active
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if snapshot.version <= guard.version {
            return false;
        }
        *guard = snapshot;
        true
    }
}
