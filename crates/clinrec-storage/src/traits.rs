//! Storage traits for the record storage abstraction layer.

use async_trait::async_trait;
use uuid::Uuid;

use clinrec_core::{NormalizedRecord, PatientId, RecordPatch};

use crate::error::StorageError;
use crate::types::{PageRequest, RecordPage, StoredRecord};

/// The record store contract implemented by storage backends.
///
/// Implementations must be thread-safe (`Send + Sync`) and must enforce
/// identifier uniqueness themselves. Callers may run an advisory
/// [`contains`](RecordStorage::contains) pre-check, but only the store's
/// own enforcement is authoritative: two concurrent creates with the same
/// identifier are resolved here, not upstream.
///
/// # Example
///
/// ```ignore
/// use clinrec_storage::{RecordStorage, StorageError, StoredRecord};
/// use clinrec_core::PatientId;
///
/// async fn fetch(store: &dyn RecordStorage, id: PatientId) -> Result<StoredRecord, StorageError> {
///     store
///         .read(id)
///         .await?
///         .ok_or(StorageError::NotFound { id })
/// }
/// ```
#[async_trait]
pub trait RecordStorage: Send + Sync {
    /// Creates a new record.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::DuplicateKey` if the identifier exists.
    async fn create(
        &self,
        record: &NormalizedRecord,
        created_by: Uuid,
    ) -> Result<StoredRecord, StorageError>;

    /// Reads a record by identifier.
    ///
    /// Returns `None` if the record does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing
    /// records.
    async fn read(&self, id: PatientId) -> Result<Option<StoredRecord>, StorageError>;

    /// Applies a patch to an existing record.
    ///
    /// The patch cannot carry the identifier by contract (the validation
    /// pipeline rejects it upstream). Last-write-wins: no concurrency
    /// token is checked.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the record does not exist.
    async fn update(
        &self,
        id: PatientId,
        patch: &RecordPatch,
    ) -> Result<StoredRecord, StorageError>;

    /// Deletes a record by identifier.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the record does not exist,
    /// including when it was already deleted.
    async fn delete(&self, id: PatientId) -> Result<(), StorageError>;

    /// Lists records in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPageToken` for a token this store
    /// did not issue.
    async fn list(&self, page: &PageRequest) -> Result<RecordPage, StorageError>;

    /// Searches records by identifier or category term.
    ///
    /// An all-digit term matches the record with that exact identifier;
    /// anything else matches case-insensitively as a substring of the
    /// `gender`, `work_type`, and `smoking_status` categories. An empty
    /// term matches nothing. Results come back in insertion order,
    /// unpaginated.
    async fn search(&self, term: &str) -> Result<Vec<StoredRecord>, StorageError>;

    /// Advisory existence check used to pre-screen duplicate creates.
    /// Never a substitute for the uniqueness enforcement in `create`.
    async fn contains(&self, id: PatientId) -> Result<bool, StorageError>;

    /// Total number of stored records.
    async fn count(&self) -> Result<u64, StorageError>;

    /// Returns the name of this storage backend for logging/debugging.
    fn backend_name(&self) -> &'static str;
}
