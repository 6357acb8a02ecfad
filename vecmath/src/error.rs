use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VecMathError {
    #[error("vecmath: dimension mismatch: got {got}, want {want}")]
    DimensionMismatch { got: usize, want: usize },
}
