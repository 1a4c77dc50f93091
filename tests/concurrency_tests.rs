//! Concurrency and thread safety tests for jobrec

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use jobrec::demo::{demo_now, rust_engineer_profile, synthetic_jobs};
use jobrec::{
    Company, Embedding, Feature, HashEmbedder, Job, JobrecConfig, LinearModel, Profile,
    RecommendRequest, Recommender, ScoringModel, build_recommender,
};

const DIM: usize = 32;

fn recommender() -> Recommender {
    let mut config = JobrecConfig::default();
    config.index.dimension = DIM;
    let embedder = Arc::new(HashEmbedder::new("hash-1", DIM));
    build_recommender(&config, Some(embedder)).expect("recommender")
}

fn generation(tag: &str, count: usize) -> Vec<Job> {
    synthetic_jobs(count, 40)
        .into_iter()
        .map(|mut job| {
            job.id = format!("{tag}-{}", job.id);
            job
        })
        .collect()
}

fn cosine_only(version: &str) -> Arc<dyn ScoringModel> {
    let weights = Feature::ALL.map(|f| (f, if f == Feature::Cosine { 1.0 } else { 0.0 }));
    Arc::new(LinearModel::new(version, 0.0, &weights).expect("model"))
}

#[test]
fn concurrent_requests_agree() {
    let rec = recommender();
    rec.replace_jobs(generation("a", 300));
    let profile = rust_engineer_profile();
    let request = RecommendRequest::new(&profile, 10).with_as_of(demo_now());
    let expected = rec.recommend_with(request).expect("baseline").job_ids().join(",");

    thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                scope.spawn(|| {
                    (0..10)
                        .map(|_| {
                            let response = rec.recommend_with(request).expect("recommend");
                            response.job_ids().join(",")
                        })
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        for handle in handles {
            for ids in handle.join().expect("reader thread") {
                assert_eq!(ids, expected);
            }
        }
    });
}

#[test]
fn readers_never_mix_catalog_generations() {
    let rec = recommender();
    rec.replace_jobs(generation("a", 300));
    let profile = rust_engineer_profile();
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let mut seen = 0usize;
                    loop {
                        let request = RecommendRequest::new(&profile, 10).with_as_of(demo_now());
                        let response = rec.recommend_with(request).expect("recommend");
                        let ids = response.job_ids();
                        if let Some(first) = ids.first() {
                            let tag = &first[..2];
                            assert!(
                                ids.iter().all(|id| id.starts_with(tag)),
                                "mixed generations: {ids:?}"
                            );
                        }
                        seen += 1;
                        if done.load(Ordering::Acquire) {
                            break seen;
                        }
                    }
                })
            })
            .collect();

        for round in 0..6 {
            let tag = if round % 2 == 0 { "b" } else { "a" };
            let report = rec.replace_jobs(generation(tag, 300));
            assert!(report.index.published);
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            assert!(reader.join().expect("reader thread") > 0);
        }
    });

    // Six rebuilds on top of the initial one.
    assert_eq!(rec.index().version(), 7);
}

fn axis(i: usize) -> Embedding {
    let mut vector = vec![0.0; DIM];
    vector[i] = 1.0;
    Embedding::new("hash-1", vector)
}

/// Same ids in both generations. Generation "near" sits on the profile's
/// axis and needs no visa; generation "far" is orthogonal and only hires
/// through sponsorship.
fn shared_id_generation(near: bool) -> Vec<Job> {
    (0..12)
        .map(|i| {
            let company = Company::new(format!("co-{i}"));
            let mut job = Job::new(format!("shared-{i:02}"), "Engineer", company);
            job.remote_ok = true;
            if near {
                job.embedding = Some(axis(0));
                job.required_skills = vec!["rust".into()];
            } else {
                job.embedding = Some(axis(1));
                job.accepted_work_authorizations = vec!["US".into()];
                job.visa_sponsorship = true;
            }
            job
        })
        .collect()
}

#[test]
fn similarity_and_job_fields_come_from_the_same_generation() {
    let rec = recommender();
    rec.replace_jobs(shared_id_generation(true));
    let mut profile = Profile::new("p-shared");
    profile.remote_ok = true;
    profile.work_authorization = Some("EU".into());
    profile.skills.insert("rust".into(), 1.0);
    profile.embedding = Some(axis(0));
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        let readers: Vec<_> = (0..4)
            .map(|_| {
                scope.spawn(|| {
                    let mut seen = 0usize;
                    loop {
                        let request = RecommendRequest::new(&profile, 5)
                            .with_debug(true)
                            .with_as_of(demo_now());
                        let response = rec.recommend_with(request).expect("recommend");
                        let debug = response.debug.expect("debug");
                        assert_eq!(response.results.len(), 5);
                        for (result, features) in response.results.iter().zip(&debug.features) {
                            assert_eq!(result.job_id, features.job_id);
                            let cosine = features.features.get(Feature::Cosine);
                            let sponsored =
                                result.why.iter().any(|w| w == "Visa sponsorship available");
                            let skilled = features.features.get(Feature::SkillOverlap) > 0.0;
                            assert_eq!(
                                sponsored,
                                cosine < 0.5,
                                "index v{} paired with another catalog: {:?}",
                                debug.index_version,
                                result.why
                            );
                            assert_eq!(skilled, cosine >= 0.5, "{:?}", result.why);
                        }
                        seen += 1;
                        if done.load(Ordering::Acquire) {
                            break seen;
                        }
                    }
                })
            })
            .collect();

        for round in 0..20 {
            let report = rec.replace_jobs(shared_id_generation(round % 2 == 1));
            assert!(report.index.published);
        }
        done.store(true, Ordering::Release);

        for reader in readers {
            assert!(reader.join().expect("reader thread") > 0);
        }
    });
}

#[test]
fn model_swaps_are_atomic_per_request() {
    let rec = recommender();
    rec.replace_jobs(generation("a", 200));
    let profile = rust_engineer_profile();
    let done = AtomicBool::new(false);

    thread::scope(|scope| {
        let reader = scope.spawn(|| {
            let mut versions = Vec::new();
            while !done.load(Ordering::Acquire) {
                let response = rec
                    .recommend_with(
                        RecommendRequest::new(&profile, 5)
                            .with_debug(true)
                            .with_as_of(demo_now()),
                    )
                    .expect("recommend");
                versions.push(response.debug.expect("debug").model_version);
            }
            versions
        });

        for i in 0..20 {
            rec.swap_model(cosine_only(&format!("cosine-{i}")))
                .expect("swap");
        }
        done.store(true, Ordering::Release);

        let versions = reader.join().expect("reader thread");
        assert!(
            versions
                .iter()
                .all(|v| v == "baseline-1" || v.starts_with("cosine-"))
        );
    });

    assert_eq!(rec.ranker().current().model_version(), "cosine-19");
}
