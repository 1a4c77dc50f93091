// Metrics hooks for the `recommender` crate.
//
// Callers install a global `RecommendMetrics` implementation via
// [`set_recommend_metrics`]; every `Recommender::recommend_with` call then
// reports its latency and candidate funnel. Keeps instrumentation decoupled
// from any specific metrics backend.
use std::sync::{Arc, RwLock};
use std::time::Duration;

use once_cell::sync::OnceCell;

/// Candidate counts at each pipeline stage of one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Funnel {
    pub retrieved: usize,
    pub eligible: usize,
    pub ranked: usize,
    pub returned: usize,
}

/// Metrics observer for recommend operations.
pub trait RecommendMetrics: Send + Sync {
    /// Record the outcome of one request. `latency` is wall-clock time from
    /// validation to the assembled response.
    fn record_recommend(&self, profile_id: &str, latency: Duration, funnel: Funnel);
}

fn metrics_lock() -> &'static RwLock<Option<Arc<dyn RecommendMetrics>>> {
    static METRICS: OnceCell<RwLock<Option<Arc<dyn RecommendMetrics>>>> = OnceCell::new();
    METRICS.get_or_init(|| RwLock::new(None))
}

pub(crate) fn metrics_recorder() -> Option<Arc<dyn RecommendMetrics>> {
    let guard = metrics_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    guard.clone()
}

/// Install or clear the global recommend metrics recorder.
pub fn set_recommend_metrics(recorder: Option<Arc<dyn RecommendMetrics>>) {
    let mut guard = metrics_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    *guard = recorder;
}
