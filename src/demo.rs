//! Synthetic catalog and profile used by the binary, the bench and the
//! integration tests.
//!
//! Everything here is deterministic: job `i` always has the same title,
//! skills, company and location, so runs can be compared byte for byte.

use chrono::{DateTime, Duration, TimeZone, Utc};
use model::{Company, Job, Location, Profile, SalaryExpectation, SalaryRange, Seniority};

struct Template {
    title: &'static str,
    required: &'static [&'static str],
    bonus: &'static [&'static str],
    industry: &'static str,
}

const TEMPLATES: &[Template] = &[
    Template {
        title: "Senior Rust Engineer",
        required: &["rust", "tokio", "postgres"],
        bonus: &["kubernetes", "grpc"],
        industry: "infrastructure",
    },
    Template {
        title: "Backend Engineer",
        required: &["go", "postgres", "kafka"],
        bonus: &["rust", "terraform"],
        industry: "fintech",
    },
    Template {
        title: "Platform Engineer",
        required: &["kubernetes", "terraform", "aws"],
        bonus: &["go", "prometheus"],
        industry: "infrastructure",
    },
    Template {
        title: "Data Engineer",
        required: &["python", "spark", "airflow"],
        bonus: &["scala", "dbt"],
        industry: "analytics",
    },
    Template {
        title: "Machine Learning Engineer",
        required: &["python", "pytorch", "sql"],
        bonus: &["onnx", "rust"],
        industry: "ai",
    },
    Template {
        title: "Frontend Developer",
        required: &["typescript", "react", "css"],
        bonus: &["graphql", "figma"],
        industry: "ecommerce",
    },
    Template {
        title: "Site Reliability Engineer",
        required: &["linux", "prometheus", "kubernetes"],
        bonus: &["rust", "go"],
        industry: "infrastructure",
    },
    Template {
        title: "Java Developer",
        required: &["java", "spring", "sql"],
        bonus: &["kafka", "kotlin"],
        industry: "banking",
    },
];

const CITIES: &[(&str, &str, f64, f64)] = &[
    ("Berlin", "DE", 52.52, 13.405),
    ("Potsdam", "DE", 52.39, 13.065),
    ("Amsterdam", "NL", 52.37, 4.895),
    ("Paris", "FR", 48.857, 2.352),
    ("London", "GB", 51.507, -0.128),
    ("Warsaw", "PL", 52.23, 21.012),
];

const SENIORITIES: &[Seniority] = &[
    Seniority::Junior,
    Seniority::Mid,
    Seniority::Senior,
    Seniority::Staff,
];

/// Fixed reference clock for synthetic data.
pub fn demo_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Builds `count` jobs spread across `companies` companies.
///
/// Jobs carry no embedding; the recommender embeds them on ingest when it
/// has an embedder.
pub fn synthetic_jobs(count: usize, companies: usize) -> Vec<Job> {
    let companies = companies.max(1);
    let now = demo_now();
    (0..count)
        .map(|i| {
            let template = &TEMPLATES[i % TEMPLATES.len()];
            let (city, country, lat, lon) = CITIES[(i / TEMPLATES.len()) % CITIES.len()];

            let mut company = Company::new(format!("company-{:03}", i % companies));
            company.industry = Some(template.industry.to_string());
            if i % companies % 5 == 0 {
                company.parent_id = Some("holding-group".to_string());
            }

            let mut job = Job::new(format!("job-{i:05}"), template.title, company);
            job.required_skills = template.required.iter().map(|s| s.to_string()).collect();
            job.bonus_skills = template.bonus.iter().map(|s| s.to_string()).collect();
            job.location = Some(
                Location::named(city)
                    .with_country(country)
                    .with_coordinates(lat, lon),
            );
            job.remote_ok = i % 3 == 0;
            job.seniority = Some(SENIORITIES[i % SENIORITIES.len()]);
            job.posted_at = Some(now - Duration::days((i % 45) as i64));
            let base = 50_000.0 + (i % 7) as f64 * 10_000.0;
            job.salary = Some(SalaryRange {
                currency: "EUR".to_string(),
                min: base,
                max: base + 20_000.0,
            });
            job.visa_sponsorship = i % 4 == 0;
            job.description = format!(
                "{} working on {} systems in {city}.",
                template.title, template.industry
            );
            job
        })
        .collect()
}

/// A senior Rust engineer in Berlin who is open to remote work.
pub fn rust_engineer_profile() -> Profile {
    let mut profile = Profile::new("demo-rust-engineer");
    profile.role_tags = vec!["rust engineer".into(), "backend engineer".into()];
    profile.seniority = Some(Seniority::Senior);
    profile.locations = vec![
        Location::named("Berlin")
            .with_country("DE")
            .with_coordinates(52.52, 13.405),
    ];
    profile.remote_ok = true;
    profile.languages = vec!["en".into(), "de".into()];
    profile.skills.insert("rust".into(), 1.0);
    profile.skills.insert("tokio".into(), 0.8);
    profile.skills.insert("postgres".into(), 0.6);
    profile.skills.insert("kubernetes".into(), 0.4);
    profile.preferences.industries = vec!["infrastructure".into()];
    profile.preferences.tech_likes = vec!["rust".into()];
    profile.salary_expectation = Some(SalaryExpectation {
        currency: "EUR".into(),
        amount: 85_000.0,
    });
    profile
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_jobs_are_deterministic_and_valid() {
        let a = synthetic_jobs(40, 7);
        let b = synthetic_jobs(40, 7);
        assert_eq!(a, b);
        assert!(a.iter().all(|job| job.validate().is_ok()));
    }

    #[test]
    fn demo_profile_is_valid() {
        assert!(rust_engineer_profile().validate().is_ok());
    }
}
