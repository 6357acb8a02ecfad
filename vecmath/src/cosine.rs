use crate::error::VecMathError;
use crate::norm::dot;

/// Computes the cosine similarity `(a·b)/(‖a‖‖b‖)` between two vectors.
///
/// Returns a value in `[-1, 1]`. When either vector has zero norm the
/// similarity is defined as exactly `0.0`. Vectors of differing length
/// are rejected rather than scored.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32, VecMathError> {
    if a.len() != b.len() {
        return Err(VecMathError::DimensionMismatch {
            got: b.len(),
            want: a.len(),
        });
    }

    let na = dot(a, a);
    let nb = dot(b, b);
    if na == 0.0 || nb == 0.0 {
        return Ok(0.0);
    }

    // sqrt(na * nb) rather than sqrt(na) * sqrt(nb): exact for a == b.
    let similarity = dot(a, b) / (na * nb).sqrt();
    // Clamp to [-1, 1] to handle floating point errors.
    Ok(similarity.clamp(-1.0, 1.0) as f32)
}

/// Computes the cosine distance `1 - cosine_similarity(a, b)`, in `[0, 2]`.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f32, VecMathError> {
    cosine_similarity(a, b).map(|s| 1.0 - s)
}
