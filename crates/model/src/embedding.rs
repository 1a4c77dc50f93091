use fxhash::hash64;
use serde::{Deserialize, Serialize};

/// A dense vector tagged with the model version that produced it.
///
/// Vectors from different model versions live in different spaces, so the
/// tag travels with every vector and is compared before any similarity is
/// trusted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Embedding {
    pub model_version: String,
    pub vector: Vec<f32>,
}

impl Embedding {
    pub fn new(model_version: impl Into<String>, vector: Vec<f32>) -> Self {
        Self {
            model_version: model_version.into(),
            vector,
        }
    }

    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    /// True when every component is finite and the vector has non-zero length.
    pub fn is_usable(&self) -> bool {
        !self.vector.is_empty()
            && self.vector.iter().all(|v| v.is_finite())
            && self.vector.iter().any(|v| *v != 0.0)
    }
}

/// Text embedding capability.
///
/// The model behind it is external; the pipeline only relies on the output
/// being deterministic for identical text and model version.
pub trait Embedder: Send + Sync {
    fn model_version(&self) -> &str;
    fn dimension(&self) -> usize;
    fn embed(&self, text: &str) -> Embedding;
}

/// Deterministic stand-in embedder for demos and tests.
///
/// Feature hashing over lowercase tokens: each token lands in one bucket with
/// a hash-derived sign, then the vector is L2-normalized. Texts sharing tokens
/// end up close to each other; disjoint texts are near-orthogonal.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    model_version: String,
    dimension: usize,
}

impl HashEmbedder {
    pub fn new(model_version: impl Into<String>, dimension: usize) -> Self {
        Self {
            model_version: model_version.into(),
            dimension: dimension.max(1),
        }
    }
}

impl Embedder for HashEmbedder {
    fn model_version(&self) -> &str {
        &self.model_version
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, text: &str) -> Embedding {
        let mut v = vec![0f32; self.dimension];
        for token in text
            .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
            .filter(|t| !t.is_empty())
        {
            let h = hash64(token.to_lowercase().as_str());
            let idx = (h % self.dimension as u64) as usize;
            let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        l2_normalize_in_place(&mut v);
        Embedding::new(self.model_version.clone(), v)
    }
}

/// In-place L2 normalization. Zero vectors are left untouched.
pub fn l2_normalize_in_place(v: &mut [f32]) {
    let norm_sq: f32 = v.iter().map(|x| x * x).sum();
    if norm_sq > 0.0 {
        let inv_norm = norm_sq.sqrt().recip();
        for x in v.iter_mut() {
            *x *= inv_norm;
        }
    }
}

/// Returns an L2-normalized copy of `v`.
pub fn l2_normalized(v: &[f32]) -> Vec<f32> {
    let mut out = v.to_vec();
    l2_normalize_in_place(&mut out);
    out
}

/// Inner product; callers normalize first to read it as cosine similarity.
#[inline]
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Cosine similarity in [-1, 1]. Returns 0.0 for mismatched or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    (dot(a, b) / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
