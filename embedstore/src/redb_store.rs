//! Persistent [`EmbeddingStore`] backed by redb.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use redb::{Database, ReadableTable, ReadableTableMetadata, TableDefinition};

use crate::error::StoreError;
use crate::record::{EnrollmentRecord, RecordId, StoreConfig, validate_enrollment};
use crate::store::EmbeddingStore;

/// `(partition_key, seq) -> msgpack(EnrollmentRecord)`
const RECORDS: TableDefinition<(&str, u64), &[u8]> = TableDefinition::new("records");
/// `(owner_id, seq) -> partition_key`
const OWNERS: TableDefinition<(&str, u64), &str> = TableDefinition::new("owners");
const META: TableDefinition<&str, u64> = TableDefinition::new("meta");

const SEQ_KEY: &str = "seq";

/// A persistent enrollment store in a single redb file.
///
/// Every enroll and remove is one write transaction; readers run on
/// MVCC read transactions and never see a half-applied mutation.
/// Blocking redb calls are moved off the async runtime with
/// `spawn_blocking`.
pub struct RedbStore {
    cfg: StoreConfig,
    db: Arc<Database>,
}

fn storage<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Storage(e.to_string())
}

fn encoding<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::Encoding(e.to_string())
}

impl RedbStore {
    /// Open or create a store at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::open_with_config(path, StoreConfig::default())
    }

    pub fn open_with_config<P: AsRef<Path>>(path: P, cfg: StoreConfig) -> Result<Self, StoreError> {
        let db = Database::create(path).map_err(storage)?;

        // Create the tables if they don't exist so read transactions
        // never hit a missing table.
        let tx = db.begin_write().map_err(storage)?;
        {
            tx.open_table(RECORDS).map_err(storage)?;
            tx.open_table(OWNERS).map_err(storage)?;
            tx.open_table(META).map_err(storage)?;
        }
        tx.commit().map_err(storage)?;

        Ok(Self {
            cfg,
            db: Arc::new(db),
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    async fn blocking<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Database) -> Result<T, StoreError> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || f(&db))
            .await
            .map_err(storage)?
    }
}

fn insert_record(db: &Database, record: EnrollmentRecord) -> Result<RecordId, StoreError> {
    let tx = db.begin_write().map_err(storage)?;
    let seq = {
        let mut meta = tx.open_table(META).map_err(storage)?;
        let next = meta
            .get(SEQ_KEY)
            .map_err(storage)?
            .map(|v| v.value())
            .unwrap_or(0)
            + 1;
        meta.insert(SEQ_KEY, next).map_err(storage)?;
        next
    };

    let record = EnrollmentRecord {
        id: RecordId(seq),
        ..record
    };
    let data = rmp_serde::to_vec_named(&record).map_err(encoding)?;
    {
        let mut records = tx.open_table(RECORDS).map_err(storage)?;
        records
            .insert((record.partition_key.as_str(), seq), data.as_slice())
            .map_err(storage)?;
        let mut owners = tx.open_table(OWNERS).map_err(storage)?;
        owners
            .insert(
                (record.owner_id.as_str(), seq),
                record.partition_key.as_str(),
            )
            .map_err(storage)?;
    }
    tx.commit().map_err(storage)?;
    Ok(record.id)
}

fn scan_partition(db: &Database, partition_key: &str) -> Result<Vec<EnrollmentRecord>, StoreError> {
    let tx = db.begin_read().map_err(storage)?;
    let table = tx.open_table(RECORDS).map_err(storage)?;

    let mut results = Vec::new();
    for item in table
        .range((partition_key, 0u64)..=(partition_key, u64::MAX))
        .map_err(storage)?
    {
        let (_, value) = item.map_err(storage)?;
        let record: EnrollmentRecord = rmp_serde::from_slice(value.value()).map_err(encoding)?;
        results.push(record);
    }
    Ok(results)
}

fn delete_owner(db: &Database, owner_id: &str) -> Result<usize, StoreError> {
    let tx = db.begin_write().map_err(storage)?;
    let removed = {
        let mut owners = tx.open_table(OWNERS).map_err(storage)?;
        let keys: Vec<(u64, String)> = owners
            .range((owner_id, 0u64)..=(owner_id, u64::MAX))
            .map_err(storage)?
            .map(|item| {
                let (k, v) = item.map_err(storage)?;
                Ok((k.value().1, v.value().to_string()))
            })
            .collect::<Result<_, StoreError>>()?;

        let mut records = tx.open_table(RECORDS).map_err(storage)?;
        for (seq, partition_key) in &keys {
            records
                .remove((partition_key.as_str(), *seq))
                .map_err(storage)?;
            owners.remove((owner_id, *seq)).map_err(storage)?;
        }
        keys.len()
    };
    tx.commit().map_err(storage)?;
    Ok(removed)
}

#[async_trait]
impl EmbeddingStore for RedbStore {
    async fn enroll(
        &self,
        owner_id: &str,
        partition_key: &str,
        vector: &[f32],
    ) -> Result<RecordId, StoreError> {
        validate_enrollment(&self.cfg, owner_id, partition_key, vector)?;

        let record = EnrollmentRecord {
            id: RecordId(0),
            owner_id: owner_id.to_string(),
            partition_key: partition_key.to_string(),
            vector: vector.to_vec(),
            created_at: Utc::now(),
        };
        let id = self.blocking(move |db| insert_record(db, record)).await?;
        tracing::debug!(%id, owner_id, partition_key, dim = vector.len(), "embedstore: enrolled");
        Ok(id)
    }

    async fn list_by_partition(
        &self,
        partition_key: &str,
    ) -> Result<Vec<EnrollmentRecord>, StoreError> {
        let partition_key = partition_key.to_string();
        self.blocking(move |db| scan_partition(db, &partition_key))
            .await
    }

    async fn remove_by_owner(&self, owner_id: &str) -> Result<usize, StoreError> {
        let owner = owner_id.to_string();
        let removed = self.blocking(move |db| delete_owner(db, &owner)).await?;
        if removed > 0 {
            tracing::debug!(owner_id, removed, "embedstore: removed owner");
        }
        Ok(removed)
    }

    async fn len(&self) -> Result<usize, StoreError> {
        self.blocking(|db| {
            let tx = db.begin_read().map_err(storage)?;
            let table = tx.open_table(RECORDS).map_err(storage)?;
            let n = table.len().map_err(storage)?;
            Ok(n as usize)
        })
        .await
    }
}
