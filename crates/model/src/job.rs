use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::embedding::Embedding;
use crate::error::DataQualityError;
use crate::location::Location;
use crate::profile::Seniority;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Company {
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
}

impl Company {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Grouping key for per-company caps: the parent when known.
    pub fn group_key(&self, by_parent: bool) -> &str {
        match (&self.parent_id, by_parent) {
            (Some(parent), true) if !parent.trim().is_empty() => parent,
            _ => &self.id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SalaryRange {
    pub currency: String,
    pub min: f64,
    pub max: f64,
}

impl SalaryRange {
    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// A job posting snapshot. Owned by the ingestion side; read-only here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Job {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    #[serde(default)]
    pub bonus_skills: Vec<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub remote_ok: bool,
    pub company: Company,
    #[serde(default)]
    pub salary: Option<SalaryRange>,
    #[serde(default)]
    pub posted_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub embedding: Option<Embedding>,
    #[serde(default)]
    pub required_languages: Vec<String>,
    /// Work authorizations accepted without sponsorship; empty means any.
    #[serde(default)]
    pub accepted_work_authorizations: Vec<String>,
    #[serde(default)]
    pub visa_sponsorship: bool,
    #[serde(default)]
    pub seniority: Option<Seniority>,
}

impl Job {
    pub fn new(id: impl Into<String>, title: impl Into<String>, company: Company) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            company,
            ..Self::default()
        }
    }

    /// Text handed to an [`Embedder`](crate::Embedder) for jobs ingested
    /// without an embedding.
    pub fn embedding_text(&self) -> String {
        let mut parts: Vec<&str> = vec![self.title.as_str()];
        parts.extend(self.required_skills.iter().map(String::as_str));
        parts.extend(self.bonus_skills.iter().map(String::as_str));
        parts.push(self.description.as_str());
        parts.retain(|p| !p.trim().is_empty());
        parts.join(" ")
    }

    pub fn validate(&self) -> Result<(), DataQualityError> {
        if self.id.trim().is_empty() {
            return Err(DataQualityError::MissingJobId);
        }
        if self.company.id.trim().is_empty() {
            return Err(DataQualityError::MissingCompanyId {
                job_id: self.id.clone(),
            });
        }
        if let Some(salary) = &self.salary {
            let valid = |v: f64| v.is_finite() && v >= 0.0;
            if !valid(salary.min) || !valid(salary.max) {
                return Err(DataQualityError::InvalidSalary {
                    job_id: self.id.clone(),
                });
            }
            if salary.min > salary.max {
                return Err(DataQualityError::InvertedSalaryRange {
                    job_id: self.id.clone(),
                    min: salary.min,
                    max: salary.max,
                });
            }
        }
        Ok(())
    }
}

/// Immutable id → job lookup for one catalog version.
#[derive(Debug, Clone, Default)]
pub struct JobCatalog {
    jobs: HashMap<String, Arc<Job>>,
    order: Vec<String>,
}

/// Outcome of loading jobs into a catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogReport {
    pub accepted: usize,
    pub rejected: usize,
    pub duplicates: usize,
}

impl JobCatalog {
    /// Validates every job, dropping malformed and duplicate ids.
    ///
    /// The first occurrence of an id wins so that catalog order stays stable.
    pub fn from_jobs(jobs: impl IntoIterator<Item = Job>) -> (Self, CatalogReport) {
        let mut catalog = JobCatalog::default();
        let mut report = CatalogReport::default();
        for job in jobs {
            if let Err(err) = job.validate() {
                warn!(job_id = %job.id, error = %err, "job_rejected");
                report.rejected += 1;
                continue;
            }
            if catalog.jobs.contains_key(&job.id) {
                warn!(job_id = %job.id, "duplicate_job_id");
                report.duplicates += 1;
                continue;
            }
            catalog.order.push(job.id.clone());
            catalog.jobs.insert(job.id.clone(), Arc::new(job));
            report.accepted += 1;
        }
        (catalog, report)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Job>> {
        self.jobs.get(id)
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    /// Jobs in load order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Job>> {
        self.order.iter().filter_map(|id| self.jobs.get(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job(id: &str) -> Job {
        Job::new(id, "Backend Engineer", Company::new("acme"))
    }

    #[test]
    fn salary_midpoint() {
        let range = SalaryRange {
            currency: "EUR".into(),
            min: 60_000.0,
            max: 80_000.0,
        };
        assert_eq!(range.midpoint(), 70_000.0);
    }

    #[test]
    fn inverted_salary_is_rejected() {
        let mut j = job("j-1");
        j.salary = Some(SalaryRange {
            currency: "EUR".into(),
            min: 90.0,
            max: 10.0,
        });
        assert!(matches!(
            j.validate(),
            Err(DataQualityError::InvertedSalaryRange { .. })
        ));
    }

    #[test]
    fn group_key_prefers_parent() {
        let mut company = Company::new("sub");
        company.parent_id = Some("holding".into());
        assert_eq!(company.group_key(true), "holding");
        assert_eq!(company.group_key(false), "sub");
    }

    #[test]
    fn catalog_drops_invalid_and_duplicate_jobs() {
        let mut broken = job("j-2");
        broken.company.id.clear();
        let (catalog, report) =
            JobCatalog::from_jobs(vec![job("j-1"), broken, job("j-1"), job("j-3")]);
        assert_eq!(
            report,
            CatalogReport {
                accepted: 2,
                rejected: 1,
                duplicates: 1
            }
        );
        let ids: Vec<&str> = catalog.iter().map(|j| j.id.as_str()).collect();
        assert_eq!(ids, vec!["j-1", "j-3"]);
    }
}
