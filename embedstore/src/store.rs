use async_trait::async_trait;

use crate::error::StoreError;
use crate::record::{EnrollmentRecord, RecordId};

/// Durable, queryable collection of enrollment records addressed by
/// partition key.
///
/// Implementations must be safe for concurrent use (Send + Sync), and
/// both mutations must be atomic with respect to concurrent readers: a
/// `list_by_partition` call observes either all or none of a concurrent
/// `enroll` or `remove_by_owner`.
#[async_trait]
pub trait EmbeddingStore: Send + Sync {
    /// Appends a new record and returns its id.
    ///
    /// Multiple enrollments of the same owner are kept side by side;
    /// nothing is deduplicated.
    async fn enroll(
        &self,
        owner_id: &str,
        partition_key: &str,
        vector: &[f32],
    ) -> Result<RecordId, StoreError>;

    /// Returns every record in the partition, or an empty vec if there
    /// are none. Order is unspecified.
    async fn list_by_partition(&self, partition_key: &str)
    -> Result<Vec<EnrollmentRecord>, StoreError>;

    /// Deletes all records of the owner across every partition and
    /// returns how many were removed. Removing an unknown owner returns 0.
    async fn remove_by_owner(&self, owner_id: &str) -> Result<usize, StoreError>;

    /// Returns the total number of stored records.
    async fn len(&self) -> Result<usize, StoreError>;

    /// Reports whether the store holds no records.
    async fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len().await? == 0)
    }
}
