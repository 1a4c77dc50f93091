use thiserror::Error;

/// A profile or job record that cannot take part in a recommendation.
///
/// These are per-item rejections: the offending record is excluded and the
/// caller keeps going with whatever remains.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataQualityError {
    #[error("profile id must not be empty")]
    MissingProfileId,
    #[error("job id must not be empty")]
    MissingJobId,
    #[error("job {job_id}: company id must not be empty")]
    MissingCompanyId { job_id: String },
    #[error("job {job_id}: salary min {min} exceeds max {max}")]
    InvertedSalaryRange { job_id: String, min: f64, max: f64 },
    #[error("job {job_id}: salary bounds must be finite and non-negative")]
    InvalidSalary { job_id: String },
    #[error("profile {profile_id}: skill `{skill}` has invalid weight {weight}")]
    InvalidSkillWeight {
        profile_id: String,
        skill: String,
        weight: f32,
    },
    #[error("profile {profile_id}: salary expectation must be finite and non-negative")]
    InvalidSalaryExpectation { profile_id: String },
}
