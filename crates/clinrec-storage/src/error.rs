//! Storage error types for the record storage abstraction layer.

use clinrec_core::PatientId;
use thiserror::Error;

/// Errors that can occur during record storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    /// No record exists for the requested identifier.
    #[error("Record not found: {id}")]
    NotFound {
        /// The identifier that was not found.
        id: PatientId,
    },

    /// A record with the same identifier already exists. The store's own
    /// uniqueness enforcement raised this; any earlier pre-check is
    /// advisory only.
    #[error("Record already exists: {id}")]
    DuplicateKey {
        /// The colliding identifier.
        id: PatientId,
    },

    /// The page token is not one this store issued.
    #[error("Invalid page token")]
    InvalidPageToken,

    /// The storage backend could not be reached. Transient.
    #[error("Storage unavailable: {message}")]
    Unavailable {
        /// Description of the connectivity failure.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal storage error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(id: PatientId) -> Self {
        Self::NotFound { id }
    }

    /// Creates a new `DuplicateKey` error.
    #[must_use]
    pub fn duplicate_key(id: PatientId) -> Self {
        Self::DuplicateKey { id }
    }

    /// Creates a new `Unavailable` error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if this is a duplicate key error.
    #[must_use]
    pub fn is_duplicate_key(&self) -> bool {
        matches!(self, Self::DuplicateKey { .. })
    }
}
