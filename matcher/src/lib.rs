//! Identity matching over enrolled embeddings.
//!
//! A [`Matcher`] answers "which enrolled identity, if any, does this
//! query vector belong to?" within one partition of an
//! [`EmbeddingStore`](kinrec_embedstore::EmbeddingStore).
//!
//! # Algorithm
//!
//! 1. Reject empty, non-finite or wrong-length queries ([`QueryError`]).
//! 2. Fetch the partition once. Empty partitions yield `NoMatch(0.0)`.
//! 3. Score every record by cosine similarity.
//! 4. Keep the highest-scoring record whose similarity is positive and
//!    reaches the threshold. Exact ties go to the earlier-enrolled record.
//! 5. With no accepted record, report `NoMatch` carrying the best
//!    similarity observed, so near-misses stay visible.
//!
//! Ranking is separate from acceptance: the threshold only gates
//! whether the best record is reported as a match.

mod config;
mod error;
mod matcher;
mod outcome;
mod select;

#[cfg(test)]
mod tests;

pub use config::{
    FACE_DIMENSIONALITY, FACE_THRESHOLD, Modality, ModalityConfig, VOICE_DIMENSIONALITY,
    VOICE_THRESHOLD,
};
pub use error::{MatchError, QueryError};
pub use matcher::Matcher;
pub use outcome::{Outcome, Verification};
pub use select::{accepts, best_score, select_best};
