use kinrec_embedstore::{RecordId, StoreError};
use thiserror::Error;

/// Why a query vector cannot be evaluated.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("empty query vector")]
    Empty,

    #[error("query has {got} dimensions, want {want}")]
    DimensionMismatch { got: usize, want: usize },

    #[error("query component {index} is not finite")]
    NonFinite { index: usize },
}

/// Errors returned by matcher operations.
///
/// A query that simply matches nobody is not an error; it is
/// [`Outcome::NoMatch`](crate::Outcome::NoMatch).
#[derive(Error, Debug)]
pub enum MatchError {
    #[error("matcher: invalid query: {0}")]
    InvalidQuery(#[from] QueryError),

    #[error("matcher: stored record {record} has {got} dimensions, want {want}")]
    RecordDimension {
        record: RecordId,
        got: usize,
        want: usize,
    },

    #[error("matcher: {0}")]
    Store(#[from] StoreError),

    #[error("matcher: invalid config: {0}")]
    Config(String),
}
