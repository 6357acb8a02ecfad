use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const DEFAULT_MAX_DIMENSIONALITY: usize = 4096;

/// Store-assigned identifier of an enrollment record.
///
/// Identifiers are strictly increasing within one store, so they also
/// order records created within the same clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId(pub u64);

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One enrolled sample of an identity.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub id: RecordId,

    /// Owning identity (e.g. a family member id).
    pub owner_id: String,

    /// Scope the record is matched within (e.g. a patient id).
    pub partition_key: String,

    pub vector: Vec<f32>,

    pub created_at: DateTime<Utc>,
}

impl EnrollmentRecord {
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }

    /// Reports whether this record was enrolled before `other` in the same
    /// store. Ids come from the store's sequence, so the order holds even
    /// when the wall clock steps backwards; `created_at` is informational.
    pub fn precedes(&self, other: &EnrollmentRecord) -> bool {
        self.id < other.id
    }
}

impl fmt::Debug for EnrollmentRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnrollmentRecord")
            .field("id", &self.id)
            .field("owner_id", &self.owner_id)
            .field("partition_key", &self.partition_key)
            .field("vector_len", &self.vector.len())
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Limits enforced by every store at enrollment time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Largest vector accepted by `enroll`.
    pub max_dimensionality: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_dimensionality: DEFAULT_MAX_DIMENSIONALITY,
        }
    }
}

/// Checks an enrollment request against `cfg`.
pub fn validate_enrollment(
    cfg: &StoreConfig,
    owner_id: &str,
    partition_key: &str,
    vector: &[f32],
) -> Result<(), ValidationError> {
    if owner_id.is_empty() {
        return Err(ValidationError::EmptyOwner);
    }
    if partition_key.is_empty() {
        return Err(ValidationError::EmptyPartition);
    }
    if vector.is_empty() {
        return Err(ValidationError::EmptyVector);
    }
    if vector.len() > cfg.max_dimensionality {
        return Err(ValidationError::TooLarge {
            got: vector.len(),
            max: cfg.max_dimensionality,
        });
    }
    if let Some(index) = kinrec_vecmath::first_non_finite(vector) {
        return Err(ValidationError::NonFinite { index });
    }
    Ok(())
}
