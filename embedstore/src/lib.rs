//! Enrollment storage for biometric matching.
//!
//! An enrollment record ties one embedding vector to an owning identity
//! and a partition key (typically a patient). Records are immutable; the
//! only mutations are [`EmbeddingStore::enroll`] and
//! [`EmbeddingStore::remove_by_owner`], both atomic with respect to readers.
//!
//! Two implementations are provided:
//!
//! - [`MemoryStore`]: in-process, for tests and ephemeral deployments
//! - [`RedbStore`]: persistent, backed by a single redb file

mod error;
mod memory;
mod record;
mod redb_store;
mod store;

pub use error::{StoreError, ValidationError};
pub use memory::MemoryStore;
pub use record::{EnrollmentRecord, RecordId, StoreConfig, validate_enrollment};
pub use redb_store::RedbStore;
pub use store::EmbeddingStore;
