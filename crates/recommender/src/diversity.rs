use std::collections::HashMap;

use ranker::ScoredJob;

/// Greedy per-company cap over an already sorted list.
///
/// Walks `ranked` in order and keeps an item while its company group has
/// fewer than `cap` kept items. Relative order of kept items is unchanged.
/// Returns the kept items and how many were dropped.
pub(crate) fn cap_per_company(
    ranked: Vec<ScoredJob>,
    cap: Option<usize>,
    by_parent: bool,
) -> (Vec<ScoredJob>, usize) {
    let Some(cap) = cap else {
        return (ranked, 0);
    };
    let before = ranked.len();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let kept: Vec<ScoredJob> = ranked
        .into_iter()
        .filter(|item| {
            let count = seen
                .entry(item.job.company.group_key(by_parent).to_string())
                .or_insert(0);
            *count += 1;
            *count <= cap
        })
        .collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use features::{Feature, FeatureVector};
    use model::{Company, Job};

    fn scored(id: &str, company: Company, score: f32, similarity: f32) -> ScoredJob {
        ScoredJob {
            job: Arc::new(Job::new(id, "Engineer", company)),
            similarity,
            features: FeatureVector::from_values([0.0; Feature::COUNT]),
            score,
        }
    }

    fn ids(items: &[ScoredJob]) -> Vec<&str> {
        items.iter().map(ScoredJob::job_id).collect()
    }

    #[test]
    fn cap_one_keeps_first_of_each_company() {
        let ranked = vec![
            scored("a1", Company::new("a"), 0.9, 0.8),
            scored("a2", Company::new("a"), 0.9, 0.7),
            scored("b1", Company::new("b"), 0.5, 0.5),
            scored("a3", Company::new("a"), 0.4, 0.9),
            scored("c1", Company::new("c"), 0.3, 0.1),
        ];
        let (kept, dropped) = cap_per_company(ranked, Some(1), true);
        assert_eq!(ids(&kept), vec!["a1", "b1", "c1"]);
        assert_eq!(dropped, 2);
    }

    #[test]
    fn parent_grouping_is_optional() {
        let mut sub_a = Company::new("sub-a");
        sub_a.parent_id = Some("holding".into());
        let mut sub_b = Company::new("sub-b");
        sub_b.parent_id = Some("holding".into());
        let ranked = || {
            vec![
                scored("x", sub_a.clone(), 0.9, 0.9),
                scored("y", sub_b.clone(), 0.8, 0.8),
            ]
        };
        assert_eq!(ids(&cap_per_company(ranked(), Some(1), true).0), vec!["x"]);
        assert_eq!(ids(&cap_per_company(ranked(), Some(1), false).0), vec!["x", "y"]);
    }

    #[test]
    fn no_cap_is_identity() {
        let ranked = vec![
            scored("a1", Company::new("a"), 0.9, 0.8),
            scored("a2", Company::new("a"), 0.8, 0.7),
        ];
        let (kept, dropped) = cap_per_company(ranked, None, true);
        assert_eq!(ids(&kept), vec!["a1", "a2"]);
        assert_eq!(dropped, 0);
    }
}
