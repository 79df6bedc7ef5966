// Unit tests for the ranking core.
//
// Pure functions only: vector normalization and cosine similarity, the
// similarity ranker's aggregation/dedup/ordering rules, and the viewport
// predicate. No store, no async.

use placetag::db::models::{PlaceSummary, RawEmbedding};
use placetag::embeddings::codec::decode;
use placetag::embeddings::vector::{cosine_similarity, l2_norm, normalize};
use placetag::ranking::config::{DimensionPolicy, QueryMode, RankConfig};
use placetag::ranking::ranker::{CandidateVector, RankedPlace, SimilarityRanker};
use placetag::spatial::{inside, CandidateSet, Viewport};

const EPS: f64 = 1e-9;

fn ranker(top_k: usize) -> SimilarityRanker {
    SimilarityRanker::new(RankConfig::default().with_top_k(top_k))
}

fn cv(place_id: i64, vector: &[f64]) -> CandidateVector {
    CandidateVector::new(place_id, vector.to_vec())
}

fn ids(ranked: &[RankedPlace]) -> Vec<i64> {
    ranked.iter().map(|r| r.place_id).collect()
}

// ============================================================
// Vector math
// ============================================================

#[test]
fn normalize_gives_unit_norm_and_is_idempotent() {
    for v in [vec![3.0, 4.0], vec![-1.0, 2.0, 0.5], vec![1e-3, 0.0, 0.0, 7.0]] {
        let once = normalize(&v).unwrap();
        assert!((l2_norm(&once) - 1.0).abs() < EPS);
        let twice = normalize(&once).unwrap();
        for (a, b) in once.iter().zip(&twice) {
            assert!((a - b).abs() < EPS);
        }
    }
}

#[test]
fn normalize_rejects_zero_and_tiny_vectors() {
    assert!(normalize(&[0.0, 0.0]).is_none());
    assert!(normalize(&[1e-10, 0.0]).is_none());
    assert!(normalize(&[]).is_none());
}

#[test]
fn cosine_of_self_and_opposite() {
    let v = [0.3, -1.2, 4.0];
    let neg: Vec<f64> = v.iter().map(|x| -x).collect();
    assert!((cosine_similarity(&v, &v) - 1.0).abs() < EPS);
    assert!((cosine_similarity(&v, &neg) + 1.0).abs() < EPS);
    assert_eq!(cosine_similarity(&v, &[0.0, 0.0, 0.0]), 0.0);
}

// ============================================================
// Similarity ranker
// ============================================================

#[test]
fn orthogonal_candidates_rank_in_order() {
    let candidates = [cv(1, &[1.0, 0.0]), cv(2, &[0.0, 1.0])];
    let ranked = ranker(5).rank(&[vec![1.0, 0.0]], &candidates);

    assert_eq!(ids(&ranked), vec![1, 2]);
    assert!((ranked[0].similarity - 1.0).abs() < EPS);
    assert!(ranked[1].similarity.abs() < EPS);

    let top1 = ranker(1).rank(&[vec![1.0, 0.0]], &candidates);
    assert_eq!(ids(&top1), vec![1]);
}

#[test]
fn place_keeps_its_best_vector_and_appears_once() {
    // Similarities 0.4 and 0.9 against [1, 0].
    let low = [0.4, (1.0_f64 - 0.16).sqrt()];
    let high = [0.9, (1.0_f64 - 0.81).sqrt()];
    let ranked = ranker(5).rank(&[vec![1.0, 0.0]], &[cv(7, &low), cv(7, &high)]);

    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].place_id, 7);
    assert!((ranked[0].similarity - 0.9).abs() < 1e-6);
}

#[test]
fn output_has_no_duplicates_and_at_most_k() {
    let candidates: Vec<CandidateVector> = (0..40)
        .map(|i| {
            let angle = i as f64 * 0.1;
            cv(i % 13, &[angle.cos(), angle.sin()])
        })
        .collect();
    let queries = vec![vec![1.0, 0.0], vec![0.0, 1.0]];

    for k in [0, 1, 5, 13, 50] {
        let ranked = ranker(k).rank(&queries, &candidates);
        assert!(ranked.len() <= k);
        let mut seen = ids(&ranked);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), ranked.len());
    }
}

#[test]
fn ranking_is_reproducible_with_id_tie_break() {
    let candidates = [cv(30, &[1.0, 1.0]), cv(10, &[2.0, 2.0]), cv(20, &[0.5, 0.5])];
    let first = ranker(5).rank(&[vec![1.0, 0.0]], &candidates);
    let second = ranker(5).rank(&[vec![1.0, 0.0]], &candidates);

    assert_eq!(first, second);
    assert_eq!(ids(&first), vec![10, 20, 30]);
}

#[test]
fn empty_inputs_give_empty_results() {
    assert!(ranker(5).rank(&[vec![1.0, 0.0]], &[]).is_empty());
    assert!(ranker(5).rank(&[], &[cv(1, &[1.0, 0.0])]).is_empty());
    assert!(ranker(5).rank(&[vec![0.0, 0.0]], &[cv(1, &[1.0, 0.0])]).is_empty());
}

#[test]
fn averaged_orthogonal_queries_meet_in_the_middle() {
    let config = RankConfig::default().with_query_mode(QueryMode::Averaged);
    let ranked = SimilarityRanker::new(config).rank(
        &[vec![1.0, 0.0], vec![0.0, 1.0]],
        &[cv(1, &[1.0, 1.0]), cv(2, &[1.0, 0.0])],
    );
    assert_eq!(ids(&ranked), vec![1, 2]);
    assert!((ranked[0].similarity - 1.0).abs() < EPS);
}

#[test]
fn dimension_mismatch_policies() {
    let query = [vec![1.0, 0.0, 0.0]];
    let candidates = [cv(1, &[1.0, 0.0])];

    let truncated = ranker(5).rank(&query, &candidates);
    assert_eq!(ids(&truncated), vec![1]);
    assert!((truncated[0].similarity - 1.0).abs() < EPS);

    let skip = RankConfig::default().with_dimension_policy(DimensionPolicy::SkipMismatched);
    assert!(SimilarityRanker::new(skip).rank(&query, &candidates).is_empty());
}

#[test]
fn one_malformed_embedding_drops_only_that_row() {
    let raw = [
        (1, RawEmbedding::Text("[1.0, 0.0]".into())),
        (2, RawEmbedding::Text("[0.0, oops]".into())),
        (3, RawEmbedding::Text("[0.6, 0.8]".into())),
        (4, RawEmbedding::Null),
    ];
    let candidates: Vec<CandidateVector> = raw
        .iter()
        .filter_map(|(id, r)| decode(r).map(|v| CandidateVector::new(*id, v)))
        .collect();
    assert_eq!(candidates.len(), 2);

    let ranked = ranker(5).rank(&[vec![1.0, 0.0]], &candidates);
    assert_eq!(ids(&ranked), vec![1, 3]);
}

// ============================================================
// Spatial filter
// ============================================================

#[test]
fn boundary_points_are_inside() {
    let vp = Viewport::new(0.0, 0.0, 10.0, 10.0);
    assert!(inside(&vp, 0.0, 5.0));
    assert!(inside(&vp, 10.0, 10.0));
    assert!(!inside(&vp, 10.000001, 5.0));
}

#[test]
fn candidate_set_keeps_only_viewport_places() {
    let places = vec![
        PlaceSummary { id: 1, name: "A".into(), x: 1.0, y: 1.0 },
        PlaceSummary { id: 2, name: "B".into(), x: 20.0, y: 20.0 },
    ];
    let set = CandidateSet::from_places(&Viewport::new(0.0, 0.0, 10.0, 10.0), places);
    assert_eq!(set.ids(), vec![1]);
}
