//! Service-level error taxonomy.
//!
//! Every operation on the record service resolves to one of these variants.
//! Validation and authorization errors carry enough structured detail for
//! the caller to correct the request; store-unavailable and internal errors
//! are logged with full detail server-side and surfaced here without it.

use thiserror::Error;

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldViolation {
    /// The offending field name.
    pub field: String,
    /// Why the field was rejected.
    pub reason: String,
}

impl FieldViolation {
    #[must_use]
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

/// Errors surfaced by record service operations.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The presented credentials are invalid.
    /// Deliberately uniform: does not reveal whether the username exists.
    #[error("Authentication failed")]
    Authentication,

    /// The session is missing, revoked, or expired.
    #[error("Authorization required: {message}")]
    Authorization {
        /// Why authorization failed (no token material).
        message: String,
    },

    /// One or more fields failed validation.
    #[error("Validation failed: {} violation(s)", violations.len())]
    Validation {
        /// All collected field-level failures.
        violations: Vec<FieldViolation>,
    },

    /// An update payload carried an immutable field.
    #[error("Field is immutable: {field}")]
    ImmutableField {
        /// The immutable field name.
        field: String,
    },

    /// A uniqueness constraint was violated.
    #[error("Duplicate key: {resource} {key} already exists")]
    DuplicateKey {
        /// Which resource kind collided ("identity" or "record").
        resource: String,
        /// The colliding key, as text.
        key: String,
    },

    /// The requested resource does not exist.
    #[error("Not found: {resource} {key}")]
    NotFound {
        /// Which resource kind was missing.
        resource: String,
        /// The requested key, as text.
        key: String,
    },

    /// The backing store could not be reached. Transient; the caller may
    /// retry the whole operation.
    #[error("Store unavailable")]
    StoreUnavailable,

    /// An unexpected internal failure. Details are server-side only.
    #[error("Internal error")]
    Internal,
}

impl ServiceError {
    /// Creates an `Authorization` error.
    #[must_use]
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    /// Creates a `Validation` error from collected violations.
    #[must_use]
    pub fn validation(violations: Vec<FieldViolation>) -> Self {
        Self::Validation { violations }
    }

    /// Creates an `ImmutableField` error.
    #[must_use]
    pub fn immutable_field(field: impl Into<String>) -> Self {
        Self::ImmutableField {
            field: field.into(),
        }
    }

    /// Creates a `DuplicateKey` error.
    #[must_use]
    pub fn duplicate_key(resource: impl Into<String>, key: impl std::fmt::Display) -> Self {
        Self::DuplicateKey {
            resource: resource.into(),
            key: key.to_string(),
        }
    }

    /// Creates a `NotFound` error.
    #[must_use]
    pub fn not_found(resource: impl Into<String>, key: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource: resource.into(),
            key: key.to_string(),
        }
    }

    /// Returns `true` if the caller can correct and resend the request.
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Authentication
                | Self::Authorization { .. }
                | Self::Validation { .. }
                | Self::ImmutableField { .. }
                | Self::DuplicateKey { .. }
                | Self::NotFound { .. }
        )
    }

    /// Returns `true` for failures originating server-side.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::StoreUnavailable | Self::Internal)
    }

    /// Returns `true` if this is an authorization failure.
    #[must_use]
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::Authorization { .. })
    }
}

/// Type alias for record service results.
pub type ServiceResult<T> = Result<T, ServiceError>;
