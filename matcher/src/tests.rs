use std::sync::Arc;

use async_trait::async_trait;
use kinrec_embedstore::{EmbeddingStore, EnrollmentRecord, MemoryStore, RecordId, StoreError};

use crate::{MatchError, Matcher, Modality, ModalityConfig, Outcome, QueryError};

fn cfg3(threshold: f32) -> ModalityConfig {
    ModalityConfig {
        dimensionality: 3,
        threshold,
    }
}

fn new_matcher(threshold: f32) -> (Arc<MemoryStore>, Matcher) {
    let store = Arc::new(MemoryStore::new());
    let matcher = Matcher::new(Modality::Face, cfg3(threshold), store.clone()).unwrap();
    (store, matcher)
}

/// Deterministic pseudo-random vector.
fn pseudo_vec(dim: usize, seed: u64) -> Vec<f32> {
    let mut state = seed;
    (0..dim)
        .map(|_| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
            ((state >> 33) as f32) / (u32::MAX as f32) - 0.25
        })
        .collect()
}

struct FailingStore;

#[async_trait]
impl EmbeddingStore for FailingStore {
    async fn enroll(&self, _: &str, _: &str, _: &[f32]) -> Result<RecordId, StoreError> {
        Err(StoreError::Storage("connection refused".into()))
    }

    async fn list_by_partition(&self, _: &str) -> Result<Vec<EnrollmentRecord>, StoreError> {
        Err(StoreError::Storage("connection refused".into()))
    }

    async fn remove_by_owner(&self, _: &str) -> Result<usize, StoreError> {
        Err(StoreError::Storage("connection refused".into()))
    }

    async fn len(&self) -> Result<usize, StoreError> {
        Err(StoreError::Storage("connection refused".into()))
    }
}

#[tokio::test]
async fn two_owner_scenario() {
    let (store, matcher) = new_matcher(0.6);
    store.enroll("A", "P1", &[1.0, 0.0, 0.0]).await.unwrap();
    store.enroll("B", "P1", &[0.0, 1.0, 0.0]).await.unwrap();

    let out = matcher.identify("P1", &[0.9, 0.1, 0.0]).await.unwrap();
    assert_eq!(out.owner_id(), Some("A"));
    assert!((out.confidence() - 0.994).abs() < 1e-3, "got {out:?}");

    let out = matcher.identify("P1", &[0.0, 0.0, 1.0]).await.unwrap();
    assert!(!out.is_match());
    assert!(out.confidence().abs() < 1e-6, "got {out:?}");
}

#[tokio::test]
async fn self_similarity_is_one() {
    let (store, matcher) = new_matcher(0.6);
    store.enroll("A", "P1", &[1.0, 0.0, 0.0]).await.unwrap();
    let out = matcher.identify("P1", &[1.0, 0.0, 0.0]).await.unwrap();
    assert_eq!(
        out,
        Outcome::Match {
            owner_id: "A".into(),
            confidence: 1.0
        }
    );

    let store = Arc::new(MemoryStore::new());
    let matcher = Matcher::new(Modality::Face, ModalityConfig::face(), store.clone()).unwrap();
    for seed in 1..=5 {
        let v = pseudo_vec(512, seed);
        store.enroll(&format!("owner{seed}"), "P", &v).await.unwrap();
    }
    for seed in 1..=5 {
        let v = pseudo_vec(512, seed);
        let out = matcher.identify("P", &v).await.unwrap();
        assert_eq!(out.owner_id(), Some(format!("owner{seed}").as_str()));
        assert!((out.confidence() - 1.0).abs() < 1e-6, "got {out:?}");
    }
}

#[tokio::test]
async fn empty_partition_is_no_match() {
    let (store, matcher) = new_matcher(0.6);
    store.enroll("A", "other", &[1.0, 0.0, 0.0]).await.unwrap();
    let out = matcher.identify("P1", &[1.0, 0.0, 0.0]).await.unwrap();
    assert_eq!(out, Outcome::NoMatch { confidence: 0.0 });
}

#[tokio::test]
async fn dimension_mismatch_is_invalid_query() {
    let (store, matcher) = new_matcher(0.6);

    let err = matcher.identify("P1", &[1.0, 0.0]).await.unwrap_err();
    assert!(matches!(
        err,
        MatchError::InvalidQuery(QueryError::DimensionMismatch { got: 2, want: 3 })
    ));

    store.enroll("A", "P1", &[1.0, 0.0, 0.0]).await.unwrap();
    let err = matcher.identify("P1", &[1.0, 0.0, 0.0, 0.0]).await.unwrap_err();
    assert!(matches!(
        err,
        MatchError::InvalidQuery(QueryError::DimensionMismatch { got: 4, want: 3 })
    ));
}

#[tokio::test]
async fn empty_and_non_finite_queries_rejected() {
    let (store, matcher) = new_matcher(0.6);
    store.enroll("A", "P1", &[1.0, 0.0, 0.0]).await.unwrap();

    let err = matcher.identify("P1", &[]).await.unwrap_err();
    assert!(matches!(err, MatchError::InvalidQuery(QueryError::Empty)));

    let err = matcher
        .identify("P1", &[1.0, f32::NAN, 0.0])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        MatchError::InvalidQuery(QueryError::NonFinite { index: 1 })
    ));
}

#[tokio::test]
async fn removed_owner_never_matches_again() {
    let (store, matcher) = new_matcher(0.6);
    store.enroll("A", "P1", &[1.0, 0.0, 0.0]).await.unwrap();
    store.enroll("A", "P1", &[0.9, 0.1, 0.0]).await.unwrap();
    store.enroll("B", "P1", &[0.7, 0.7, 0.0]).await.unwrap();

    assert_eq!(store.remove_by_owner("A").await.unwrap(), 2);
    assert_eq!(store.remove_by_owner("A").await.unwrap(), 0);

    let out = matcher.identify("P1", &[1.0, 0.0, 0.0]).await.unwrap();
    assert_ne!(out.owner_id(), Some("A"));
    assert_eq!(out.owner_id(), Some("B"));
}

#[tokio::test]
async fn threshold_boundary() {
    let sim = kinrec_vecmath::cosine_similarity(&[1.0, 0.0, 0.0], &[0.6, 0.8, 0.0]).unwrap();

    let (store, matcher) = new_matcher(sim);
    store.enroll("A", "P1", &[0.6, 0.8, 0.0]).await.unwrap();
    let out = matcher.identify("P1", &[1.0, 0.0, 0.0]).await.unwrap();
    assert_eq!(out.owner_id(), Some("A"), "equal to threshold is accepted");

    let (store, matcher) = new_matcher(f32::from_bits(sim.to_bits() + 1));
    store.enroll("A", "P1", &[0.6, 0.8, 0.0]).await.unwrap();
    let out = matcher.identify("P1", &[1.0, 0.0, 0.0]).await.unwrap();
    assert_eq!(out, Outcome::NoMatch { confidence: sim });
}

#[tokio::test]
async fn confidence_comes_from_single_record() {
    let (store, matcher) = new_matcher(0.5);
    store.enroll("A", "P1", &[1.0, 0.0, 0.0]).await.unwrap();
    store.enroll("A", "P1", &[0.0, 1.0, 0.0]).await.unwrap();
    store.enroll("B", "P1", &[0.8, 0.6, 0.0]).await.unwrap();

    let out = matcher.identify("P1", &[0.0, 1.0, 0.0]).await.unwrap();
    assert_eq!(
        out,
        Outcome::Match {
            owner_id: "A".into(),
            confidence: 1.0
        }
    );
}

#[tokio::test]
async fn partitions_are_isolated() {
    let (store, matcher) = new_matcher(0.6);
    store.enroll("A", "P1", &[1.0, 0.0, 0.0]).await.unwrap();
    store.enroll("B", "P2", &[1.0, 0.0, 0.0]).await.unwrap();

    let out = matcher.identify("P2", &[1.0, 0.0, 0.0]).await.unwrap();
    assert_eq!(out.owner_id(), Some("B"));
}

#[tokio::test]
async fn store_failure_propagates() {
    let matcher = Matcher::new(Modality::Voice, cfg3(0.75), Arc::new(FailingStore)).unwrap();
    let err = matcher.identify("P1", &[1.0, 0.0, 0.0]).await.unwrap_err();
    assert!(matches!(err, MatchError::Store(StoreError::Storage(_))));

    let err = matcher.verify("P1", "A", &[1.0, 0.0, 0.0]).await.unwrap_err();
    assert!(matches!(err, MatchError::Store(_)));
}

#[tokio::test]
async fn invalid_query_checked_before_store() {
    let matcher = Matcher::new(Modality::Voice, cfg3(0.75), Arc::new(FailingStore)).unwrap();
    let err = matcher.identify("P1", &[1.0]).await.unwrap_err();
    assert!(matches!(err, MatchError::InvalidQuery(_)));
}

#[tokio::test]
async fn stored_record_of_wrong_length_is_error() {
    let (store, matcher) = new_matcher(0.6);
    store.enroll("A", "P1", &[1.0, 0.0]).await.unwrap();
    let err = matcher.identify("P1", &[1.0, 0.0, 0.0]).await.unwrap_err();
    assert!(matches!(err, MatchError::RecordDimension { got: 2, want: 3, .. }));
}

#[tokio::test]
async fn verify_claimed_owner() {
    let (store, matcher) = new_matcher(0.6);
    store.enroll("A", "P1", &[1.0, 0.0, 0.0]).await.unwrap();
    store.enroll("B", "P1", &[0.0, 1.0, 0.0]).await.unwrap();

    let v = matcher.verify("P1", "A", &[0.9, 0.1, 0.0]).await.unwrap();
    assert!(v.verified);
    assert!((v.score - 0.994).abs() < 1e-3);
    assert_eq!(v.threshold, 0.6);

    let v = matcher.verify("P1", "B", &[0.9, 0.1, 0.0]).await.unwrap();
    assert!(!v.verified);
    assert!(v.score < 0.2);

    let v = matcher.verify("P1", "nobody", &[0.9, 0.1, 0.0]).await.unwrap();
    assert!(!v.verified);
    assert_eq!(v.score, 0.0);
}

#[tokio::test]
async fn verify_rejects_opposite_vector_at_zero_threshold() {
    let (store, matcher) = new_matcher(0.0);
    store.enroll("N", "P1", &[-1.0, 0.0, 0.0]).await.unwrap();

    let v = matcher.verify("P1", "N", &[1.0, 0.0, 0.0]).await.unwrap();
    assert!(!v.verified, "got {v:?}");
    assert_eq!(v.score, 0.0);

    let out = matcher.identify("P1", &[1.0, 0.0, 0.0]).await.unwrap();
    assert_eq!(out, Outcome::NoMatch { confidence: 0.0 });
}

#[tokio::test]
async fn verify_and_identify_agree_on_acceptance() {
    let (store, matcher) = new_matcher(0.0);
    store.enroll("O", "P1", &[0.0, 1.0, 0.0]).await.unwrap();
    store.enroll("W", "P1", &[0.1, 1.0, 0.0]).await.unwrap();

    let query = [1.0, 0.0, 0.0];
    assert!(!matcher.verify("P1", "O", &query).await.unwrap().verified);
    assert!(matcher.verify("P1", "W", &query).await.unwrap().verified);
    let out = matcher.identify("P1", &query).await.unwrap();
    assert_eq!(out.owner_id(), Some("W"));
}

#[tokio::test]
async fn zero_norm_enrollment_never_matches() {
    let (store, matcher) = new_matcher(0.0);
    store.enroll("Z", "P1", &[0.0, 0.0, 0.0]).await.unwrap();

    let out = matcher.identify("P1", &[1.0, 0.0, 0.0]).await.unwrap();
    assert_eq!(out, Outcome::NoMatch { confidence: 0.0 });
    let v = matcher.verify("P1", "Z", &[1.0, 0.0, 0.0]).await.unwrap();
    assert!(!v.verified);
}

#[tokio::test]
async fn rejects_invalid_config() {
    let store: Arc<dyn EmbeddingStore> = Arc::new(MemoryStore::new());
    assert!(Matcher::new(Modality::Face, cfg3(1.5), store.clone()).is_err());
    assert!(Matcher::new(Modality::Face, cfg3(0.5).with_dimensionality(0), store).is_err());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_identify_during_enroll() {
    let (store, matcher) = new_matcher(0.6);
    let matcher = Arc::new(matcher);
    store.enroll("A", "P1", &[1.0, 0.0, 0.0]).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let store = store.clone();
        handles.push(tokio::spawn(async move {
            store
                .enroll(&format!("noise{i}"), "P1", &[0.0, 1.0, i as f32])
                .await
                .unwrap();
        }));
        let matcher = matcher.clone();
        handles.push(tokio::spawn(async move {
            let out = matcher.identify("P1", &[1.0, 0.0, 0.0]).await.unwrap();
            assert_eq!(out.owner_id(), Some("A"));
            assert_eq!(out.confidence(), 1.0);
        }));
    }
    for h in handles {
        h.await.unwrap();
    }
    assert_eq!(store.len().await.unwrap(), 17);
}
