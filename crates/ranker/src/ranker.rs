use std::cmp::Ordering;
use std::sync::{Arc, RwLock};

use features::{FeatureExtractor, FeatureSchema, FeatureVector};
use model::{CandidateSet, Job, JobCatalog, Profile};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::scoring::{Contribution, ScoringModel};
use crate::ConfigurationError;

/// Default survivor count above which features are computed in parallel.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

/// A scored job, before explanation.
#[derive(Debug, Clone)]
pub struct ScoredJob {
    pub job: Arc<Job>,
    /// Retrieval similarity, also the first tie-breaker.
    pub similarity: f32,
    pub features: FeatureVector,
    pub score: f32,
}

impl ScoredJob {
    pub fn job_id(&self) -> &str {
        &self.job.id
    }
}

/// Total order of ranked output: score desc, cosine desc, job id asc.
pub fn rank_order(a: &ScoredJob, b: &ScoredJob) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.similarity.total_cmp(&a.similarity))
        .then_with(|| a.job.id.cmp(&b.job.id))
}

/// Scores eligible candidates with one immutable model version.
pub struct Ranker {
    model: Arc<dyn ScoringModel>,
    parallel_threshold: usize,
}

impl std::fmt::Debug for Ranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ranker")
            .field("model_version", &self.model.version())
            .field("parallel_threshold", &self.parallel_threshold)
            .finish()
    }
}

impl Ranker {
    /// Accepts `model` only if it was trained on [`FeatureSchema::current`].
    pub fn new(model: Arc<dyn ScoringModel>) -> Result<Self, ConfigurationError> {
        if let Some(detail) = FeatureSchema::current().mismatch(model.schema()) {
            return Err(ConfigurationError::SchemaMismatch {
                model_version: model.version().to_string(),
                detail,
            });
        }
        Ok(Self {
            model,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        })
    }

    pub fn with_parallel_threshold(mut self, threshold: usize) -> Self {
        self.parallel_threshold = threshold.max(1);
        self
    }

    pub fn model_version(&self) -> &str {
        self.model.version()
    }

    pub fn schema_version(&self) -> &str {
        &self.model.schema().version
    }

    /// Model score; NaN sorts last instead of poisoning the order.
    pub fn score(&self, features: &FeatureVector) -> f32 {
        let score = self.model.score(features);
        if score.is_nan() {
            f32::NEG_INFINITY
        } else {
            score
        }
    }

    pub fn attribute(&self, features: &FeatureVector) -> Option<Vec<Contribution>> {
        self.model.attribute(features)
    }

    /// Computes features for every candidate found in `catalog`, scores
    /// them and returns them in [`rank_order`].
    pub fn rank(
        &self,
        profile: &Profile,
        candidates: &CandidateSet,
        catalog: &JobCatalog,
        extractor: &FeatureExtractor,
    ) -> Vec<ScoredJob> {
        let score_one = |job: &Arc<Job>, similarity: f32| {
            let features = extractor.compute_with_similarity(profile, job, similarity);
            ScoredJob {
                job: Arc::clone(job),
                similarity,
                score: self.score(&features),
                features,
            }
        };

        let pairs: Vec<(&Arc<Job>, f32)> = candidates
            .iter()
            .filter_map(|c| catalog.get(&c.job_id).map(|job| (job, c.similarity)))
            .collect();

        let parallel = pairs.len() >= self.parallel_threshold;
        let mut scored: Vec<ScoredJob> = if parallel {
            pairs
                .par_iter()
                .map(|(job, similarity)| score_one(*job, *similarity))
                .collect()
        } else {
            pairs
                .iter()
                .map(|(job, similarity)| score_one(*job, *similarity))
                .collect()
        };

        let non_finite = scored.iter().filter(|s| !s.score.is_finite()).count();
        if non_finite > 0 {
            warn!(
                profile_id = %profile.id,
                model_version = %self.model_version(),
                non_finite,
                "non_finite_scores"
            );
        }

        scored.sort_by(rank_order);
        debug!(
            profile_id = %profile.id,
            stage = "rank",
            count_in = candidates.len(),
            count_out = scored.len(),
            parallel,
            "ranked"
        );
        scored
    }
}

/// Shared slot holding the active [`Ranker`].
///
/// Requests pin the current ranker with [`RankerHandle::current`]; a swap
/// only affects requests that start afterwards.
pub struct RankerHandle {
    active: RwLock<Arc<Ranker>>,
}

impl RankerHandle {
    pub fn new(ranker: Ranker) -> Self {
        Self {
            active: RwLock::new(Arc::new(ranker)),
        }
    }

    pub fn current(&self) -> Arc<Ranker> {
        let guard = self
            .active
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Validates `model` and makes it active. On error the active ranker is
    /// left untouched.
    pub fn swap(&self, model: Arc<dyn ScoringModel>) -> Result<(), ConfigurationError> {
        let threshold = self.current().parallel_threshold;
        let next = Ranker::new(model)?.with_parallel_threshold(threshold);
        let mut guard = self
            .active
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let previous = guard.model_version().to_string();
        *guard = Arc::new(next);
        info!(
            previous = %previous,
            model_version = %guard.model_version(),
            "ranker_swapped"
        );
        Ok(())
    }
}
