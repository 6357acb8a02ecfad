use kinrec_embedstore::{StoreError, ValidationError};
use kinrec_matcher::{MatchError, Modality};
use thiserror::Error;

use crate::extract::ExtractError;

/// Errors returned by recognizer operations.
#[derive(Error, Debug)]
pub enum RecognizeError {
    #[error("recognize: {0}")]
    Match(#[from] MatchError),

    #[error("recognize: {0}")]
    Store(StoreError),

    #[error("recognize: invalid enrollment: {0}")]
    Validation(#[from] ValidationError),

    #[error("recognize: {0}")]
    Extract(#[from] ExtractError),

    /// Owner removal failed on one store after the others were tried.
    /// `removed` counts the records that are already gone.
    #[error("recognize: removed {removed} records, {modality} store failed: {source}")]
    PartialRemoval {
        removed: usize,
        modality: Modality,
        source: StoreError,
    },

    #[error("recognize: no {modality} features: {reason}")]
    NoFeatures { modality: Modality, reason: String },

    #[error("recognize: no {0} extractor registered")]
    NoExtractor(Modality),

    #[error("recognize: invalid config: {0}")]
    Config(String),

    #[error("recognize: invalid payload: {0}")]
    Decode(String),
}

impl From<StoreError> for RecognizeError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Validation(v) => Self::Validation(v),
            other => Self::Store(other),
        }
    }
}
