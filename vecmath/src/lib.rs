//! Dense `f32` vector math shared by every matching modality.
//!
//! All accumulation happens in `f64` so that scores computed over 512-d
//! face embeddings are stable regardless of summation order.

mod cosine;
mod error;
mod norm;

pub use cosine::{cosine_distance, cosine_similarity};
pub use error::VecMathError;
pub use norm::{dot, first_non_finite, l2_norm, l2_normalize, normalized};
