use serde::{Deserialize, Serialize};

/// One retrieval hit: a job id and its similarity to the query vector.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Candidate {
    pub job_id: String,
    pub similarity: f32,
}

/// Retrieval output in similarity-rank order.
///
/// Later stages only ever take subsequences of it, so the order a stage
/// receives is the order it hands on.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct CandidateSet {
    items: Vec<Candidate>,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_ranked(items: Vec<Candidate>) -> Self {
        Self { items }
    }

    pub fn push(&mut self, candidate: Candidate) {
        self.items.push(candidate);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[Candidate] {
        &self.items
    }

    /// Keeps candidates for which `keep` returns true, preserving order.
    pub fn retain(&mut self, keep: impl FnMut(&Candidate) -> bool) {
        self.items.retain(keep);
    }

    pub fn into_inner(self) -> Vec<Candidate> {
        self.items
    }
}

impl IntoIterator for CandidateSet {
    type Item = Candidate;
    type IntoIter = std::vec::IntoIter<Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a> IntoIterator for &'a CandidateSet {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl FromIterator<Candidate> for CandidateSet {
    fn from_iter<I: IntoIterator<Item = Candidate>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}
