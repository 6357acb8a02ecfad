use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StoreError;
use crate::record::{EnrollmentRecord, RecordId, StoreConfig, validate_enrollment};
use crate::store::EmbeddingStore;

/// In-memory [`EmbeddingStore`].
///
/// All records live behind one `RwLock`; a list clones the partition
/// under the read lock, so readers always get a consistent snapshot.
/// Data is lost on restart.
pub struct MemoryStore {
    cfg: StoreConfig,
    inner: RwLock<MemoryStoreInner>,
}

#[derive(Default)]
struct MemoryStoreInner {
    partitions: HashMap<String, Vec<EnrollmentRecord>>,
    seq: u64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::with_config(StoreConfig::default())
    }

    pub fn with_config(cfg: StoreConfig) -> Self {
        Self {
            cfg,
            inner: RwLock::new(MemoryStoreInner::default()),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Storage(e.to_string())
}

#[async_trait]
impl EmbeddingStore for MemoryStore {
    async fn enroll(
        &self,
        owner_id: &str,
        partition_key: &str,
        vector: &[f32],
    ) -> Result<RecordId, StoreError> {
        validate_enrollment(&self.cfg, owner_id, partition_key, vector)?;

        let mut inner = self.inner.write().map_err(poisoned)?;
        inner.seq += 1;
        let id = RecordId(inner.seq);
        inner
            .partitions
            .entry(partition_key.to_string())
            .or_default()
            .push(EnrollmentRecord {
                id,
                owner_id: owner_id.to_string(),
                partition_key: partition_key.to_string(),
                vector: vector.to_vec(),
                created_at: Utc::now(),
            });
        tracing::debug!(%id, owner_id, partition_key, dim = vector.len(), "embedstore: enrolled");
        Ok(id)
    }

    async fn list_by_partition(
        &self,
        partition_key: &str,
    ) -> Result<Vec<EnrollmentRecord>, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner
            .partitions
            .get(partition_key)
            .cloned()
            .unwrap_or_default())
    }

    async fn remove_by_owner(&self, owner_id: &str) -> Result<usize, StoreError> {
        let mut inner = self.inner.write().map_err(poisoned)?;
        let mut removed = 0;
        for records in inner.partitions.values_mut() {
            let before = records.len();
            records.retain(|r| r.owner_id != owner_id);
            removed += before - records.len();
        }
        inner.partitions.retain(|_, records| !records.is_empty());
        if removed > 0 {
            tracing::debug!(owner_id, removed, "embedstore: removed owner");
        }
        Ok(removed)
    }

    async fn len(&self) -> Result<usize, StoreError> {
        let inner = self.inner.read().map_err(poisoned)?;
        Ok(inner.partitions.values().map(Vec::len).sum())
    }
}
