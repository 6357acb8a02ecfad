use thiserror::Error;

/// Reasons an enrollment is rejected before it reaches storage.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("empty vector")]
    EmptyVector,

    #[error("vector has {got} dimensions, max {max}")]
    TooLarge { got: usize, max: usize },

    #[error("vector has {got} dimensions, want {want}")]
    DimensionMismatch { got: usize, want: usize },

    #[error("component {index} is not finite")]
    NonFinite { index: usize },

    #[error("empty owner id")]
    EmptyOwner,

    #[error("empty partition key")]
    EmptyPartition,
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("embedstore: invalid enrollment: {0}")]
    Validation(#[from] ValidationError),

    #[error("embedstore: storage error: {0}")]
    Storage(String),

    #[error("embedstore: encoding error: {0}")]
    Encoding(String),
}
