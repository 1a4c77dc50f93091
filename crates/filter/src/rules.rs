//! The standard hard-filter predicates.
//!
//! Each rule answers one yes/no eligibility question for a (profile, job)
//! pair. A rule that cannot decide for lack of data passes, except where a
//! policy says otherwise ([`MissingLocationPolicy`]).

use chrono::{DateTime, Utc};
use model::skills::tag_eq;
use model::{Job, Location, Profile};

use crate::config::MissingLocationPolicy;

/// A registered hard-filter predicate.
pub trait FilterRule: Send + Sync {
    /// Stable identifier used in logs and drop counts.
    fn name(&self) -> &'static str;

    /// Whether `job` is eligible for `profile`. `as_of` is the request clock.
    fn evaluate(&self, profile: &Profile, job: &Job, as_of: DateTime<Utc>) -> bool;

    /// Human-readable statement of what the rule requires.
    fn describe(&self) -> String;

    /// A user-facing line for a satisfied rule, when it is worth surfacing.
    fn highlight(&self, _profile: &Profile, _job: &Job, _as_of: DateTime<Utc>) -> Option<String> {
        None
    }
}

fn remote_compatible(profile: &Profile, job: &Job) -> bool {
    profile.remote_ok && job.remote_ok
}

/// Remote compatibility, same place, or within commuting distance.
#[derive(Debug, Clone)]
pub struct LocationRule {
    pub max_commute_km: f64,
    pub missing: MissingLocationPolicy,
}

impl LocationRule {
    fn has_data(profile: &Profile, job: &Job) -> bool {
        let job_known = job
            .location
            .as_ref()
            .is_some_and(|l| !l.name.trim().is_empty() || l.resolved().is_some());
        job_known && !profile.locations.is_empty()
    }

    fn named_only(location: &Location) -> bool {
        location.resolved().is_none() && !location.name.trim().is_empty()
    }
}

impl FilterRule for LocationRule {
    fn name(&self) -> &'static str {
        "location"
    }

    fn evaluate(&self, profile: &Profile, job: &Job, _as_of: DateTime<Utc>) -> bool {
        if remote_compatible(profile, job) {
            return true;
        }
        if !Self::has_data(profile, job) {
            return self.missing == MissingLocationPolicy::FailOpen;
        }
        let Some(job_location) = job.location.as_ref() else {
            return self.missing == MissingLocationPolicy::FailOpen;
        };
        let mut compared = false;
        for loc in &profile.locations {
            if loc.same_place(job_location) {
                return true;
            }
            if let Some(distance) = loc.distance_km(job_location) {
                if distance <= self.max_commute_km {
                    return true;
                }
                compared = true;
            } else if Self::named_only(loc) && Self::named_only(job_location) {
                compared = true;
            }
        }
        // Only pairs where one side has coordinates and the other a bare
        // name: the distance is unknown, not too far.
        !compared && self.missing == MissingLocationPolicy::FailOpen
    }

    fn describe(&self) -> String {
        format!(
            "job is remote-compatible or within {:.0} km of a preferred location",
            self.max_commute_km
        )
    }

    fn highlight(&self, profile: &Profile, job: &Job, _as_of: DateTime<Utc>) -> Option<String> {
        if remote_compatible(profile, job) {
            return Some("Remote-compatible".to_string());
        }
        let job_location = job.location.as_ref()?;
        let nearest = profile
            .locations
            .iter()
            .filter_map(|loc| {
                if loc.same_place(job_location) {
                    Some((loc, 0.0))
                } else {
                    loc.distance_km(job_location).map(|d| (loc, d))
                }
            })
            .filter(|(_, d)| *d <= self.max_commute_km)
            .min_by(|a, b| a.1.total_cmp(&b.1))?;
        if nearest.0.same_place(job_location) {
            Some(format!("Located in {}", job_location.name.trim()))
        } else {
            Some(format!(
                "Within commuting distance of {} ({:.0} km)",
                nearest.0.name.trim(),
                nearest.1
            ))
        }
    }
}

/// The profile's work authorization is accepted, or the job sponsors visas.
#[derive(Debug, Clone, Default)]
pub struct WorkAuthorizationRule;

impl FilterRule for WorkAuthorizationRule {
    fn name(&self) -> &'static str {
        "work_authorization"
    }

    fn evaluate(&self, profile: &Profile, job: &Job, _as_of: DateTime<Utc>) -> bool {
        if job.accepted_work_authorizations.is_empty() || job.visa_sponsorship {
            return true;
        }
        profile.work_authorization.as_deref().is_some_and(|auth| {
            job.accepted_work_authorizations
                .iter()
                .any(|accepted| tag_eq(accepted, auth))
        })
    }

    fn describe(&self) -> String {
        "candidate holds an accepted work authorization or the job sponsors visas".to_string()
    }

    fn highlight(&self, profile: &Profile, job: &Job, _as_of: DateTime<Utc>) -> Option<String> {
        let accepted = profile.work_authorization.as_deref().is_some_and(|auth| {
            job.accepted_work_authorizations
                .iter()
                .any(|a| tag_eq(a, auth))
        });
        if accepted {
            None
        } else if job.visa_sponsorship {
            Some("Visa sponsorship available".to_string())
        } else {
            None
        }
    }
}

/// Every language the job requires is spoken by the candidate.
#[derive(Debug, Clone, Default)]
pub struct LanguageRule;

impl FilterRule for LanguageRule {
    fn name(&self) -> &'static str {
        "language"
    }

    fn evaluate(&self, profile: &Profile, job: &Job, _as_of: DateTime<Utc>) -> bool {
        job.required_languages
            .iter()
            .all(|required| profile.languages.iter().any(|l| tag_eq(l, required)))
    }

    fn describe(&self) -> String {
        "candidate speaks every required language".to_string()
    }

    fn highlight(&self, _profile: &Profile, job: &Job, _as_of: DateTime<Utc>) -> Option<String> {
        if job.required_languages.is_empty() {
            return None;
        }
        Some(format!(
            "Speaks the required languages ({})",
            job.required_languages.join(", ")
        ))
    }
}

/// Job level within `tolerance` levels of the profile's level.
#[derive(Debug, Clone)]
pub struct SeniorityRule {
    pub tolerance: u8,
}

impl FilterRule for SeniorityRule {
    fn name(&self) -> &'static str {
        "seniority"
    }

    fn evaluate(&self, profile: &Profile, job: &Job, _as_of: DateTime<Utc>) -> bool {
        match (profile.seniority, job.seniority) {
            (Some(have), Some(want)) => have.rank().abs_diff(want.rank()) <= self.tolerance,
            _ => true,
        }
    }

    fn describe(&self) -> String {
        format!(
            "job seniority within {} level(s) of the candidate",
            self.tolerance
        )
    }

    fn highlight(&self, profile: &Profile, job: &Job, _as_of: DateTime<Utc>) -> Option<String> {
        match (profile.seniority, job.seniority) {
            (Some(have), Some(want)) if have == want => {
                Some(format!("Matches your {} level", have.label()))
            }
            _ => None,
        }
    }
}

/// Drops postings older than `max_age_days`.
#[derive(Debug, Clone)]
pub struct PostingAgeRule {
    pub max_age_days: Option<u32>,
}

const FRESH_POSTING_DAYS: i64 = 7;

fn age_days(job: &Job, as_of: DateTime<Utc>) -> Option<i64> {
    job.posted_at.map(|posted| (as_of - posted).num_days())
}

impl FilterRule for PostingAgeRule {
    fn name(&self) -> &'static str {
        "posting_age"
    }

    fn evaluate(&self, _profile: &Profile, job: &Job, as_of: DateTime<Utc>) -> bool {
        match (self.max_age_days, age_days(job, as_of)) {
            (Some(max), Some(age)) => age <= i64::from(max),
            _ => true,
        }
    }

    fn describe(&self) -> String {
        match self.max_age_days {
            Some(max) => format!("posting is at most {max} days old"),
            None => "posting age is not limited".to_string(),
        }
    }

    fn highlight(&self, _profile: &Profile, job: &Job, as_of: DateTime<Utc>) -> Option<String> {
        match age_days(job, as_of) {
            Some(age) if (0..=FRESH_POSTING_DAYS).contains(&age) => {
                Some("Recently posted".to_string())
            }
            _ => None,
        }
    }
}
