//! # jobrec model
//!
//! Records shared by every stage of the recommendation pipeline:
//!
//! - [`Profile`]: the candidate, with weighted skills, locations, preferences
//!   and an optional [`Embedding`].
//! - [`Job`]: a posting snapshot with its [`Company`], salary range and
//!   eligibility requirements.
//! - [`CandidateSet`]: retrieval output in similarity order.
//! - [`JobCatalog`]: validated, immutable id → job lookup for one request.
//!
//! The [`Embedder`] trait is the only capability defined here; the model
//! behind it lives outside the pipeline. [`HashEmbedder`] is a deterministic
//! stand-in for demos and tests.

mod candidate;
mod embedding;
mod error;
mod job;
mod location;
mod profile;
pub mod skills;

pub use candidate::{Candidate, CandidateSet};
pub use embedding::{
    cosine_similarity, dot, l2_normalize_in_place, l2_normalized, Embedder, Embedding,
    HashEmbedder,
};
pub use error::DataQualityError;
pub use job::{CatalogReport, Company, Job, JobCatalog, SalaryRange};
pub use location::{GeoPoint, Location};
pub use profile::{Preferences, Profile, SalaryExpectation, Seniority};
