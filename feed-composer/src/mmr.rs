//! Diversity reranking via Maximal Marginal Relevance.
//!
//! `MMR = lambda * relevance(item) - (1 - lambda) * max_similarity(item, selected)`
//! with genre overlap (Jaccard similarity) as the diversity metric.
//! Pure and deterministic given its inputs.

use std::collections::HashSet;

use crate::models::Candidate;

/// Jaccard similarity `|A ∩ B| / |A ∪ B|` between two genre tag sets.
/// 0 if either set is empty.
pub fn jaccard(a: &[u32], b: &[u32]) -> f32 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let set_a: HashSet<u32> = a.iter().copied().collect();
    let set_b: HashSet<u32> = b.iter().copied().collect();
    let intersection = set_a.intersection(&set_b).count();
    let union = set_a.union(&set_b).count();
    intersection as f32 / union as f32
}

/// Select a bounded, diverse slice of the candidate list.
///
/// If the list already fits within `final_count` it is returned
/// unchanged — reranking only matters when trimming. Otherwise the
/// first candidate (merge order) seeds the selection and the rest are
/// chosen greedily by MMR score; ties resolve to the earliest candidate
/// in scan order.
pub fn rerank(candidates: Vec<Candidate>, final_count: usize, lambda: f32) -> Vec<Candidate> {
    if candidates.len() <= final_count {
        return candidates;
    }
    if final_count == 0 {
        return Vec::new();
    }

    let mut remaining = candidates;
    let mut selected = Vec::with_capacity(final_count);
    selected.push(remaining.remove(0));

    while selected.len() < final_count && !remaining.is_empty() {
        let mut best_idx = 0;
        let mut best_score = f32::MIN;

        for (i, candidate) in remaining.iter().enumerate() {
            let relevance = candidate.relevance_score.unwrap_or(0.0);
            let max_sim_to_selected = selected
                .iter()
                .map(|s| jaccard(&candidate.genre_tags, &s.genre_tags))
                .fold(0.0f32, f32::max);

            let mmr_score = lambda * relevance - (1.0 - lambda) * max_sim_to_selected;

            if mmr_score > best_score {
                best_score = mmr_score;
                best_idx = i;
            }
        }

        let next = remaining.remove(best_idx);
        selected.push(next);
    }

    selected
}
