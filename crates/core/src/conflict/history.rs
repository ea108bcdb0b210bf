//! Optional nearest-neighbor enrichment over historical smoke incidents.
//!
//! The analyzer can consult an index of embedded past incidents to
//! annotate fresh conflicts with an advisory risk score. The index is a
//! pluggable seam: core correctness never depends on it, and severity
//! classification ignores it entirely.

use serde::{Deserialize, Serialize};

/// One retrieved historical incident.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HistoricalMatch {
    /// Cosine similarity to the query feature vector, in [-1, 1].
    pub similarity: f64,
    /// Whether the incident escalated to a reportable smoke event.
    pub was_severe: bool,
}

/// Nearest-neighbor search over embedded past incidents.
pub trait HistoricalSmokeIndex: Send + Sync {
    /// The `k` stored incidents most similar to `feature`, best first.
    fn nearest(&self, feature: &[f64], k: usize) -> Vec<HistoricalMatch>;
}

/// Similarity-weighted share of severe incidents among the nearest
/// matches; `None` when the index has nothing relevant.
pub(crate) fn risk_score(index: &dyn HistoricalSmokeIndex, feature: &[f64]) -> Option<f64> {
    const NEIGHBORS: usize = 5;
    let matches = index.nearest(feature, NEIGHBORS);
    let mut weight_sum = 0.0;
    let mut severe_sum = 0.0;
    for m in matches {
        if m.similarity <= 0.0 {
            continue;
        }
        weight_sum += m.similarity;
        if m.was_severe {
            severe_sum += m.similarity;
        }
    }
    if weight_sum > 0.0 {
        Some(severe_sum / weight_sum)
    } else {
        None
    }
}

/// In-memory reference implementation: brute-force cosine scan.
///
/// Adequate for the few hundred incidents a region accumulates per
/// season; callers with larger archives can plug in a real ANN store
/// behind the same trait.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryIncidentIndex {
    entries: Vec<(Vec<f64>, bool)>,
}

impl InMemoryIncidentIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store one embedded incident.
    pub fn insert(&mut self, embedding: Vec<f64>, was_severe: bool) {
        self.entries.push((embedding, was_severe));
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl HistoricalSmokeIndex for InMemoryIncidentIndex {
    fn nearest(&self, feature: &[f64], k: usize) -> Vec<HistoricalMatch> {
        let mut scored: Vec<HistoricalMatch> = self
            .entries
            .iter()
            .map(|(embedding, was_severe)| HistoricalMatch {
                similarity: cosine_similarity(feature, embedding),
                was_severe: *was_severe,
            })
            .collect();
        scored.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        scored.truncate(k);
        scored
    }
}

/// Cosine similarity of two vectors; 0 when either is empty, zero, or of
/// mismatched length.
#[must_use]
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let mut dot = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (lhs, rhs) in a.iter().zip(b) {
        dot += lhs * rhs;
        norm_a += lhs * lhs;
        norm_b += rhs * rhs;
    }
    if norm_a <= 0.0 || norm_b <= 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_similarity_basics() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]), 1.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]), 0.0);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), -1.0);
        // Degenerate shapes never divide by zero.
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn nearest_returns_best_first() {
        let mut index = InMemoryIncidentIndex::new();
        index.insert(vec![1.0, 0.0, 0.0], true);
        index.insert(vec![0.0, 1.0, 0.0], false);
        index.insert(vec![0.9, 0.1, 0.0], true);

        let matches = index.nearest(&[1.0, 0.0, 0.0], 2);
        assert_eq!(matches.len(), 2);
        assert!(matches[0].similarity >= matches[1].similarity);
        assert_eq!(matches[0].similarity, 1.0);
    }

    #[test]
    fn risk_score_weights_by_similarity() {
        let mut index = InMemoryIncidentIndex::new();
        index.insert(vec![1.0, 1.0], true);
        index.insert(vec![1.0, 0.9], false);
        let risk = risk_score(&index, &[1.0, 1.0]).unwrap();
        assert!(risk > 0.4 && risk < 0.6, "got {risk}");

        let empty = InMemoryIncidentIndex::new();
        assert!(risk_score(&empty, &[1.0, 1.0]).is_none());
    }
}
