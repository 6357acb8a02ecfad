use std::sync::Arc;

use kinrec_embedstore::EmbeddingStore;

use crate::config::{Modality, ModalityConfig};
use crate::error::{MatchError, QueryError};
use crate::outcome::{Outcome, Verification};
use crate::select::{accepts, best_score, select_best};

/// Finds the best-matching enrolled identity of one modality.
///
/// A matcher holds no mutable state; every call reads the store once and
/// scans the snapshot it got back. It is cheap to share behind an `Arc`
/// and safe to call concurrently.
pub struct Matcher {
    modality: Modality,
    cfg: ModalityConfig,
    store: Arc<dyn EmbeddingStore>,
}

impl Matcher {
    /// Creates a matcher. Fails if `cfg` is out of range.
    pub fn new(
        modality: Modality,
        cfg: ModalityConfig,
        store: Arc<dyn EmbeddingStore>,
    ) -> Result<Self, MatchError> {
        cfg.validate()?;
        Ok(Self {
            modality,
            cfg,
            store,
        })
    }

    pub fn modality(&self) -> Modality {
        self.modality
    }

    pub fn config(&self) -> &ModalityConfig {
        &self.cfg
    }

    pub fn store(&self) -> &Arc<dyn EmbeddingStore> {
        &self.store
    }

    /// Checks that `query` can be compared against this modality's
    /// enrollments.
    pub fn check_query(&self, query: &[f32]) -> Result<(), QueryError> {
        if query.is_empty() {
            return Err(QueryError::Empty);
        }
        if query.len() != self.cfg.dimensionality {
            return Err(QueryError::DimensionMismatch {
                got: query.len(),
                want: self.cfg.dimensionality,
            });
        }
        if let Some(index) = kinrec_vecmath::first_non_finite(query) {
            return Err(QueryError::NonFinite { index });
        }
        Ok(())
    }

    /// Returns the enrolled identity in `partition_key` that best matches
    /// `query`, or `NoMatch` with the best similarity observed.
    ///
    /// Store failures are returned as [`MatchError::Store`]; they are
    /// never reported as `NoMatch`.
    pub async fn identify(&self, partition_key: &str, query: &[f32]) -> Result<Outcome, MatchError> {
        self.check_query(query)?;

        let records = self.store.list_by_partition(partition_key).await?;
        let outcome = select_best(query, &records, self.cfg.threshold)?;

        tracing::debug!(
            modality = %self.modality,
            partition_key,
            candidates = records.len(),
            threshold = self.cfg.threshold,
            %outcome,
            "matcher: identify"
        );
        Ok(outcome)
    }

    /// Checks `query` against the records of one claimed owner.
    ///
    /// Acceptance follows the same rule as [`identify`](Self::identify):
    /// the owner's best similarity must be positive and reach the
    /// threshold. The reported score is floored at 0.0.
    pub async fn verify(
        &self,
        partition_key: &str,
        owner_id: &str,
        query: &[f32],
    ) -> Result<Verification, MatchError> {
        self.check_query(query)?;

        let records = self.store.list_by_partition(partition_key).await?;
        let owned: Vec<_> = records.iter().filter(|r| r.owner_id == owner_id).collect();
        let score = best_score(query, &owned)?;

        let verification = Verification {
            owner_id: owner_id.to_string(),
            verified: score.is_some_and(|s| accepts(s, self.cfg.threshold)),
            score: score.unwrap_or(0.0).max(0.0),
            threshold: self.cfg.threshold,
        };
        tracing::debug!(
            modality = %self.modality,
            partition_key,
            owner_id,
            samples = owned.len(),
            score = verification.score,
            verified = verification.verified,
            "matcher: verify"
        );
        Ok(verification)
    }
}
