//! Authentication error types.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during credential and session operations.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The username/password pair does not match an active identity.
    /// Deliberately uniform: unknown usernames, wrong passwords, and
    /// deactivated accounts all produce this variant, so callers cannot
    /// enumerate registered usernames.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// The username or email is already registered.
    #[error("Duplicate identity: {field} already registered")]
    DuplicateIdentity {
        /// Which unique field collided ("username" or "email").
        field: String,
    },

    /// The username or email does not meet the format rules.
    #[error("Invalid {field}: {reason}")]
    InvalidIdentity {
        /// The offending field ("username" or "email").
        field: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The password does not meet the password policy.
    #[error("Weak password: {}", reasons.join("; "))]
    WeakPassword {
        /// Every unmet policy rule.
        reasons: Vec<String>,
    },

    /// No active session exists for the presented token.
    /// Covers unknown and revoked tokens alike.
    #[error("Session not found")]
    SessionNotFound,

    /// The session passed its idle deadline.
    #[error("Session expired")]
    SessionExpired {
        /// The identity that owned the session, kept for audit attribution.
        identity_id: Uuid,
    },

    /// An error occurred while storing or retrieving auth data.
    #[error("Storage error: {message}")]
    Storage {
        /// Description of the storage error.
        message: String,
    },

    /// An unexpected internal error occurred (e.g. hashing failure).
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl AuthError {
    /// Creates a `DuplicateIdentity` error.
    #[must_use]
    pub fn duplicate_identity(field: impl Into<String>) -> Self {
        Self::DuplicateIdentity {
            field: field.into(),
        }
    }

    /// Creates an `InvalidIdentity` error.
    #[must_use]
    pub fn invalid_identity(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidIdentity {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a `Storage` error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Creates an `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this error denies authorization (as opposed to
    /// rejecting credentials or signalling an infrastructure failure).
    #[must_use]
    pub fn is_session_error(&self) -> bool {
        matches!(self, Self::SessionNotFound | Self::SessionExpired { .. })
    }
}

impl From<argon2::password_hash::Error> for AuthError {
    fn from(err: argon2::password_hash::Error) -> Self {
        Self::internal(format!("password hashing failed: {err}"))
    }
}
