use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;

use chrono::Utc;
use explain::{ExplainInput, Explainer};
use features::{FeatureExtractor, FeatureSchema};
use filter::FilterEngine;
use index::{BuildReport, IndexSnapshot, VectorIndex};
use model::{CandidateSet, CatalogReport, Embedder, Embedding, Job, JobCatalog, Profile};
use ranker::{Ranker, RankerHandle, ScoringModel};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RecommenderConfig;
use crate::diversity::cap_per_company;
use crate::metrics::{metrics_recorder, Funnel};
use crate::types::{
    DebugInfo, JobFeatures, RankedResult, RecommendError, RecommendRequest, RecommendResponse,
    NOTE_NO_ELIGIBLE,
};


/// Outcome of [`Recommender::replace_jobs`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReplaceReport {
    pub accepted: usize,
    pub rejected: usize,
    pub duplicates: usize,
    /// Jobs embedded during the replace because they arrived without a
    /// current embedding.
    pub embedded: usize,
    pub index: BuildReport,
}

/// A job catalog and the index built from it, swapped as one unit.
struct CatalogSnapshot {
    index: Arc<IndexSnapshot>,
    catalog: JobCatalog,
}

/// Composes retrieval, filtering, scoring, diversity and explanation.
///
/// All shared state is immutable snapshots behind swappable pointers. Each
/// request pins one catalog (with the index built from it) and one ranker,
/// so concurrent requests never share mutable state and a rebuild or model
/// swap only affects requests that start after it.
pub struct Recommender {
    config: RecommenderConfig,
    index: VectorIndex,
    catalog: RwLock<Arc<CatalogSnapshot>>,
    ranker: RankerHandle,
    filters: FilterEngine,
    explainer: Explainer,
    embedder: Option<Arc<dyn Embedder>>,
    rebuild: Mutex<()>,
}

/// Where the query vector for a request came from.
enum QueryVector {
    Provided(Vec<f32>),
    Embedded(Vec<f32>),
    Stale(Vec<f32>),
    Missing,
}

impl Recommender {
    /// Validates the config and the model's feature schema. Either failing
    /// is fatal.
    pub fn new(
        config: RecommenderConfig,
        model: Arc<dyn ScoringModel>,
    ) -> Result<Self, RecommendError> {
        config.validate()?;
        let ranker = Ranker::new(model)?.with_parallel_threshold(config.parallel_threshold);
        let index = VectorIndex::new(config.index.clone())?;
        let filters = FilterEngine::standard(&config.filter);
        let explainer = Explainer::new(config.explain.clone());
        let empty = CatalogSnapshot {
            index: index.snapshot(),
            catalog: JobCatalog::default(),
        };
        info!(
            dimension = config.index.dimension,
            model_version = %ranker.model_version(),
            schema_version = %ranker.schema_version(),
            rules = ?filters.rule_names(),
            "recommender_ready"
        );
        Ok(Self {
            config,
            index,
            catalog: RwLock::new(Arc::new(empty)),
            ranker: RankerHandle::new(ranker),
            filters,
            explainer,
            embedder: None,
            rebuild: Mutex::new(()),
        })
    }

    /// Embedder used for profiles and jobs that arrive without a current
    /// embedding.
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        if embedder.dimension() != self.config.index.dimension {
            warn!(
                embedder_dimension = embedder.dimension(),
                index_dimension = self.config.index.dimension,
                "embedder_dimension_mismatch; embedder ignored"
            );
            return self;
        }
        self.embedder = Some(embedder);
        self
    }

    /// Replaces the standard hard-filter rules.
    pub fn with_filters(mut self, filters: FilterEngine) -> Self {
        self.filters = filters;
        self
    }

    pub fn config(&self) -> &RecommenderConfig {
        &self.config
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn ranker(&self) -> &RankerHandle {
        &self.ranker
    }

    pub fn filters(&self) -> &FilterEngine {
        &self.filters
    }

    /// Validates and embeds `jobs`, builds a new index and publishes the
    /// new catalog. Requests already running keep their snapshots.
    pub fn replace_jobs(&self, jobs: impl IntoIterator<Item = Job>) -> ReplaceReport {
        let _serialized = self
            .rebuild
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let (catalog, CatalogReport {
            accepted,
            rejected,
            duplicates,
        }) = JobCatalog::from_jobs(jobs);

        let mut embedded = 0;
        let embeddings: Vec<(String, Embedding)> = catalog
            .iter()
            .filter_map(|job| {
                let current = job.embedding.as_ref().filter(|e| self.is_current(e));
                match (current, &self.embedder) {
                    (Some(e), _) => Some((job.id.clone(), e.clone())),
                    (None, Some(embedder)) => {
                        embedded += 1;
                        Some((job.id.clone(), embedder.embed(&job.embedding_text())))
                    }
                    (None, None) => job.embedding.clone().map(|e| (job.id.clone(), e)),
                }
            })
            .collect();

        let (snapshot, mut build) = self.index.prepare(embeddings);
        {
            // Readers pin the catalog pointer, so the index published here
            // only becomes visible to requests together with its catalog.
            let mut guard = self
                .catalog
                .write()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            build.published = self.index.publish(Arc::clone(&snapshot));
            if build.published {
                *guard = Arc::new(CatalogSnapshot {
                    index: snapshot,
                    catalog,
                });
            }
        }

        info!(
            accepted,
            rejected,
            duplicates,
            embedded,
            index_version = build.version,
            indexed = build.indexed,
            published = build.published,
            "jobs_replaced"
        );
        ReplaceReport {
            accepted,
            rejected,
            duplicates,
            embedded,
            index: build,
        }
    }

    /// Installs a new scoring model after checking its feature schema.
    pub fn swap_model(&self, model: Arc<dyn ScoringModel>) -> Result<(), RecommendError> {
        self.ranker.swap(model).map_err(RecommendError::from)
    }

    /// Top `k` jobs for `profile`, with diagnostics when `debug` is set.
    pub fn recommend(
        &self,
        profile: &Profile,
        k: usize,
        debug: bool,
    ) -> Result<RecommendResponse, RecommendError> {
        self.recommend_with(RecommendRequest::new(profile, k).with_debug(debug))
    }

    pub fn recommend_with(
        &self,
        request: RecommendRequest<'_>,
    ) -> Result<RecommendResponse, RecommendError> {
        let started = Instant::now();
        let profile = request.profile;
        if let Err(err) = profile.validate() {
            warn!(profile_id = %profile.id, error = %err, "profile_rejected");
            return Err(err.into());
        }

        let as_of = request.as_of.unwrap_or_else(Utc::now);
        let pinned = self.catalog_snapshot();
        let ranker = self.ranker.current();

        let mut diag = DebugInfo {
            profile_id: profile.id.clone(),
            index_version: pinned.index.version(),
            catalog_size: pinned.catalog.len(),
            model_version: ranker.model_version().to_string(),
            schema_version: FeatureSchema::current().version,
            ..DebugInfo::default()
        };

        if request.k == 0 {
            diag.notes.push("k is zero".to_string());
            return Ok(self.finish(request, diag, Vec::new(), started));
        }

        diag.candidate_pool = self.config.candidate_pool;
        if self.config.exceeds_pool(request.offset, request.k) {
            diag.notes.push(format!(
                "page ends past the {} results the candidate pool is sized for",
                self.config.covered_depth()
            ));
        }
        let candidates =
            self.retrieve(profile, &pinned.index, diag.candidate_pool, &mut diag.notes);
        diag.retrieved = candidates.len();

        let filtered = self
            .filters
            .apply(profile, candidates, &pinned.catalog, as_of);
        diag.filtered_out = filtered.dropped.clone();
        diag.missing_jobs = filtered.missing_jobs;
        diag.eligible = filtered.kept.len();
        if diag.retrieved == 0 {
            diag.notes.push("index returned no candidates".to_string());
        } else if diag.eligible == 0 {
            diag.notes.push(NOTE_NO_ELIGIBLE.to_string());
        }
        if filtered.missing_jobs > 0 {
            warn!(
                profile_id = %profile.id,
                missing_jobs = filtered.missing_jobs,
                "candidates_missing_from_catalog"
            );
        }

        let extractor = FeatureExtractor::new(self.config.features.clone(), as_of);
        let ranked = ranker.rank(profile, &filtered.kept, &pinned.catalog, &extractor);
        diag.ranked = ranked.len();

        let (diverse, dropped) = cap_per_company(
            ranked,
            self.config.per_company_cap,
            self.config.group_by_parent_company,
        );
        diag.diversity_dropped = dropped;

        let page: Vec<_> = diverse
            .into_iter()
            .skip(request.offset)
            .take(request.k)
            .collect();

        let results = page
            .iter()
            .map(|item| {
                let highlights = self.filters.highlights(profile, &item.job, as_of);
                let attribution = ranker.attribute(&item.features);
                let why = self.explainer.explain(&ExplainInput {
                    profile,
                    job: &item.job,
                    features: &item.features,
                    score: item.score,
                    highlights: &highlights,
                    attribution: attribution.as_deref(),
                });
                RankedResult {
                    job_id: item.job.id.clone(),
                    score: item.score,
                    why,
                }
            })
            .collect();

        if request.debug {
            diag.features = page
                .iter()
                .map(|item| JobFeatures {
                    job_id: item.job.id.clone(),
                    features: item.features,
                })
                .collect();
        }

        Ok(self.finish(request, diag, results, started))
    }

    fn finish(
        &self,
        request: RecommendRequest<'_>,
        mut diag: DebugInfo,
        results: Vec<RankedResult>,
        started: Instant,
    ) -> RecommendResponse {
        diag.returned = results.len();
        let latency = started.elapsed();
        if let Some(metrics) = metrics_recorder() {
            metrics.record_recommend(
                &diag.profile_id,
                latency,
                Funnel {
                    retrieved: diag.retrieved,
                    eligible: diag.eligible,
                    ranked: diag.ranked,
                    returned: diag.returned,
                },
            );
        }
        info!(
            profile_id = %diag.profile_id,
            index_version = diag.index_version,
            model_version = %diag.model_version,
            k = request.k,
            offset = request.offset,
            retrieved = diag.retrieved,
            eligible = diag.eligible,
            returned = diag.returned,
            latency_us = latency.as_micros() as u64,
            "recommend_complete"
        );
        RecommendResponse {
            results,
            debug: request.debug.then_some(diag),
        }
    }

    fn catalog_snapshot(&self) -> Arc<CatalogSnapshot> {
        let guard = self
            .catalog
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        Arc::clone(&guard)
    }

    /// Index model version, or the embedder's when the index accepts any tag.
    fn expected_model_version(&self) -> Option<&str> {
        self.config
            .index
            .model_version
            .as_deref()
            .or_else(|| self.embedder.as_ref().map(|e| e.model_version()))
    }

    fn is_current(&self, embedding: &Embedding) -> bool {
        embedding.dimension() == self.config.index.dimension
            && embedding.is_usable()
            && self
                .expected_model_version()
                .is_none_or(|v| v == embedding.model_version)
    }

    fn query_vector(&self, profile: &Profile) -> QueryVector {
        let provided = profile.embedding.as_ref().filter(|e| e.is_usable());
        if let Some(embedding) = provided.filter(|e| self.is_current(e)) {
            return QueryVector::Provided(embedding.vector.clone());
        }
        if let Some(embedder) = &self.embedder {
            let text = profile.embedding_text();
            if !text.trim().is_empty() {
                return QueryVector::Embedded(embedder.embed(&text).vector);
            }
        }
        match provided {
            Some(embedding) => QueryVector::Stale(embedding.vector.clone()),
            None => QueryVector::Missing,
        }
    }

    fn retrieve(
        &self,
        profile: &Profile,
        snapshot: &IndexSnapshot,
        pool: usize,
        notes: &mut Vec<String>,
    ) -> CandidateSet {
        let vector = match self.query_vector(profile) {
            QueryVector::Provided(v) => v,
            QueryVector::Embedded(v) => {
                notes.push("profile embedded at request time".to_string());
                v
            }
            QueryVector::Stale(v) => {
                warn!(profile_id = %profile.id, "stale_profile_embedding");
                notes.push("profile embedding is from another model version".to_string());
                v
            }
            QueryVector::Missing => {
                warn!(profile_id = %profile.id, "profile_without_embedding");
                notes.push("profile has no usable embedding".to_string());
                return CandidateSet::new();
            }
        };

        match snapshot.query(&vector, pool) {
            Ok(candidates) => {
                if candidates.len() < pool {
                    debug!(
                        profile_id = %profile.id,
                        stage = "retrieve",
                        requested = pool,
                        count_out = candidates.len(),
                        "retrieval_short"
                    );
                }
                candidates
            }
            Err(err) => {
                warn!(profile_id = %profile.id, error = %err, "retrieval_degraded");
                notes.push(format!("retrieval degraded: {err}"));
                CandidateSet::new()
            }
        }
    }
}
