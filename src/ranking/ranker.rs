// Similarity ranker: the heart of tag-driven recommendation.
//
// Given query vectors (the selected hashtags) and candidate vectors (every
// hashtag linked to every place in the viewport), find the places whose tags
// best match any selected tag:
//
//   1. normalize everything, dropping rows with no direction
//   2. score each query against all candidate rows in one matrix pass
//   3. a place's score is the max over its rows and over all queries
//   4. sort by score descending, place_id ascending, and keep the top K
//
// Candidates are packed per dimension into EmbeddingMatrix blocks. When a
// query's length differs from a block's, both sides are cut to the shared
// prefix (or the block is skipped, depending on DimensionPolicy).

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::config::{DimensionPolicy, QueryMode, RankConfig};
use crate::embeddings::vector::{mean_embedding, normalize, EmbeddingMatrix};

/// One decoded vector owned by a place (one per linked hashtag).
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateVector {
    pub place_id: i64,
    pub vector: Vec<f64>,
}

impl CandidateVector {
    pub fn new(place_id: i64, vector: Vec<f64>) -> Self {
        Self { place_id, vector }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RankedPlace {
    pub place_id: i64,
    pub similarity: f64,
}

pub struct SimilarityRanker {
    config: RankConfig,
}

impl SimilarityRanker {
    pub fn new(config: RankConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RankConfig {
        &self.config
    }

    /// Rank places by their best similarity to any query.
    ///
    /// Never fails: unusable queries or candidates just shrink the result,
    /// down to empty.
    pub fn rank(&self, queries: &[Vec<f64>], candidates: &[CandidateVector]) -> Vec<RankedPlace> {
        if self.config.top_k == 0 || candidates.is_empty() {
            return Vec::new();
        }

        let queries = prepare_queries(queries, self.config.query_mode);
        if queries.is_empty() {
            debug!("No usable query vectors");
            return Vec::new();
        }

        let blocks = pack_candidates(candidates);
        let mut truncated: HashMap<(usize, usize), EmbeddingMatrix> = HashMap::new();
        let mut best: HashMap<i64, f64> = HashMap::new();

        for query in &queries {
            for block in blocks.values() {
                let shared = query.len().min(block.dim());
                let mismatched = shared != query.len() || shared != block.dim();
                if mismatched && self.config.dimension_policy == DimensionPolicy::SkipMismatched {
                    continue;
                }

                let query_view: Cow<'_, [f64]> = if shared == query.len() {
                    Cow::Borrowed(query.as_slice())
                } else {
                    match normalize(&query[..shared]) {
                        Some(q) => Cow::Owned(q),
                        None => continue,
                    }
                };

                let matrix = if shared == block.dim() {
                    block
                } else {
                    &*truncated
                        .entry((block.dim(), shared))
                        .or_insert_with(|| block.truncated(shared))
                };

                for (&owner, score) in matrix.owners().iter().zip(matrix.dot_all(&query_view)) {
                    best.entry(owner)
                        .and_modify(|current| {
                            if score > *current {
                                *current = score;
                            }
                        })
                        .or_insert(score);
                }
            }
        }

        let ranked = select_top_k(best, self.config.top_k);
        debug!(
            queries = queries.len(),
            candidates = candidates.len(),
            ranked = ranked.len(),
            "Ranked places by hashtag similarity"
        );
        ranked
    }
}

/// Turn raw query vectors into unit queries for the chosen mode. Zero or
/// empty vectors are dropped, and identical vectors are only used once.
fn prepare_queries(queries: &[Vec<f64>], mode: QueryMode) -> Vec<Vec<f64>> {
    let mut seen: HashSet<Vec<u64>> = HashSet::new();
    let usable: Vec<Vec<f64>> = queries
        .iter()
        .filter(|q| normalize(q).is_some())
        .filter(|q| seen.insert(q.iter().map(|x| x.to_bits()).collect()))
        .cloned()
        .collect();

    match mode {
        QueryMode::PerTag => usable.iter().filter_map(|q| normalize(q)).collect(),
        QueryMode::Averaged => mean_embedding(&usable)
            .and_then(|mean| normalize(&mean))
            .into_iter()
            .collect(),
    }
}

/// Group candidate rows by dimension. BTreeMap keeps iteration order stable.
fn pack_candidates(candidates: &[CandidateVector]) -> BTreeMap<usize, EmbeddingMatrix> {
    let mut blocks: BTreeMap<usize, EmbeddingMatrix> = BTreeMap::new();
    for candidate in candidates {
        let dim = candidate.vector.len();
        if dim == 0 {
            continue;
        }
        blocks
            .entry(dim)
            .or_insert_with(|| EmbeddingMatrix::new(dim))
            .push(candidate.place_id, &candidate.vector);
    }
    blocks.retain(|_, block| !block.is_empty());
    blocks
}

/// Sort best-per-place scores (descending, place_id ascending on ties) and
/// keep at most `k`.
pub fn select_top_k(best: HashMap<i64, f64>, k: usize) -> Vec<RankedPlace> {
    let mut ranked: Vec<RankedPlace> = best
        .into_iter()
        .map(|(place_id, similarity)| RankedPlace {
            place_id,
            similarity,
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.similarity
            .total_cmp(&a.similarity)
            .then_with(|| a.place_id.cmp(&b.place_id))
    });
    ranked.truncate(k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranker(top_k: usize) -> SimilarityRanker {
        SimilarityRanker::new(RankConfig::default().with_top_k(top_k))
    }

    #[test]
    fn test_basic_scenario() {
        let candidates = vec![
            CandidateVector::new(1, vec![1.0, 0.0]),
            CandidateVector::new(2, vec![0.0, 1.0]),
        ];
        let ranked = ranker(5).rank(&[vec![1.0, 0.0]], &candidates);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].place_id, 1);
        assert!((ranked[0].similarity - 1.0).abs() < 1e-12);
        assert_eq!(ranked[1].place_id, 2);
        assert!(ranked[1].similarity.abs() < 1e-12);

        let top1 = ranker(1).rank(&[vec![1.0, 0.0]], &candidates);
        assert_eq!(top1.len(), 1);
        assert_eq!(top1[0].place_id, 1);
    }

    #[test]
    fn test_place_keeps_max_over_its_vectors() {
        // cos = 0.4 and cos = 0.9 against [1, 0]
        let low = vec![0.4, (1.0_f64 - 0.16).sqrt()];
        let high = vec![0.9, (1.0_f64 - 0.81).sqrt()];
        let candidates = vec![CandidateVector::new(7, low), CandidateVector::new(7, high)];
        let ranked = ranker(5).rank(&[vec![1.0, 0.0]], &candidates);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].place_id, 7);
        assert!((ranked[0].similarity - 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_max_across_queries() {
        let candidates = vec![
            CandidateVector::new(1, vec![1.0, 0.0]),
            CandidateVector::new(2, vec![0.0, 1.0]),
        ];
        let ranked = ranker(5).rank(&[vec![1.0, 0.0], vec![0.0, 1.0]], &candidates);
        assert_eq!(ranked.len(), 2);
        assert!(ranked.iter().all(|r| (r.similarity - 1.0).abs() < 1e-12));
        // tie broken by place_id
        assert_eq!(ranked[0].place_id, 1);
        assert_eq!(ranked[1].place_id, 2);
    }

    #[test]
    fn test_averaged_mode_uses_mean_query() {
        let config = RankConfig::default().with_query_mode(QueryMode::Averaged);
        let candidates = vec![
            CandidateVector::new(1, vec![1.0, 1.0]),
            CandidateVector::new(2, vec![1.0, 0.0]),
        ];
        let ranked = SimilarityRanker::new(config).rank(&[vec![1.0, 0.0], vec![0.0, 1.0]], &candidates);
        assert_eq!(ranked[0].place_id, 1);
        assert!((ranked[0].similarity - 1.0).abs() < 1e-12);
        assert!((ranked[1].similarity - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-12);
    }

    #[test]
    fn test_zero_and_empty_queries_give_empty_result() {
        let candidates = vec![CandidateVector::new(1, vec![1.0, 0.0])];
        assert!(ranker(5).rank(&[vec![0.0, 0.0]], &candidates).is_empty());
        assert!(ranker(5).rank(&[vec![]], &candidates).is_empty());
        assert!(ranker(5).rank(&[], &candidates).is_empty());
    }

    #[test]
    fn test_empty_candidates_and_zero_k() {
        assert!(ranker(5).rank(&[vec![1.0]], &[]).is_empty());
        let candidates = vec![CandidateVector::new(1, vec![1.0])];
        assert!(ranker(0).rank(&[vec![1.0]], &candidates).is_empty());
    }

    #[test]
    fn test_zero_candidate_row_is_excluded() {
        let candidates = vec![
            CandidateVector::new(1, vec![0.0, 0.0]),
            CandidateVector::new(2, vec![1.0, 0.0]),
        ];
        let ranked = ranker(5).rank(&[vec![1.0, 0.0]], &candidates);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].place_id, 2);
    }

    #[test]
    fn test_dimension_mismatch_truncates() {
        let candidates = vec![CandidateVector::new(1, vec![1.0, 0.0])];
        let ranked = ranker(5).rank(&[vec![1.0, 0.0, 0.0]], &candidates);
        assert_eq!(ranked.len(), 1);
        assert!((ranked[0].similarity - 1.0).abs() < 1e-12);

        // longer candidate, shorter query
        let candidates = vec![CandidateVector::new(2, vec![0.0, 1.0, 9.0])];
        let ranked = ranker(5).rank(&[vec![0.0, 2.0]], &candidates);
        assert!((ranked[0].similarity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_dimension_mismatch_skip_policy() {
        let config = RankConfig::default().with_dimension_policy(DimensionPolicy::SkipMismatched);
        let candidates = vec![
            CandidateVector::new(1, vec![1.0, 0.0]),
            CandidateVector::new(2, vec![1.0, 0.0, 0.0]),
        ];
        let ranked = SimilarityRanker::new(config).rank(&[vec![1.0, 0.0, 0.0]], &candidates);
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].place_id, 2);
    }

    #[test]
    fn test_truncated_prefix_without_direction_is_dropped() {
        // shared prefix of the candidate is [0.0]
        let candidates = vec![CandidateVector::new(1, vec![0.0, 1.0])];
        assert!(ranker(5).rank(&[vec![1.0]], &candidates).is_empty());
    }

    #[test]
    fn test_duplicate_queries_are_used_once() {
        let queries = vec![vec![1.0, 0.0], vec![1.0, 0.0], vec![0.0, 1.0]];
        assert_eq!(prepare_queries(&queries, QueryMode::PerTag).len(), 2);
        // averaged: duplicate doesn't double-weight the first tag
        let mean = prepare_queries(&queries, QueryMode::Averaged);
        assert_eq!(mean.len(), 1);
        assert!((mean[0][0] - mean[0][1]).abs() < 1e-12);
    }

    #[test]
    fn test_select_top_k_ordering() {
        let best: HashMap<i64, f64> = [(3, 0.5), (1, 0.5), (2, 0.9), (4, -0.2)].into_iter().collect();
        let ranked = select_top_k(best, 3);
        let ids: Vec<i64> = ranked.iter().map(|r| r.place_id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
