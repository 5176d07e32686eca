//! Identity type and format rules.
//!
//! An identity is a user principal. Identities are never physically
//! deleted: deactivation is the only destructive operation, so audit trail
//! references stay resolvable forever.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AuthError;

/// Username charset and length: 3 to 80 characters of letters, digits,
/// and underscores.
static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]{3,80}$").expect("username pattern is valid"));

/// Plausible email shape; full deliverability checking is out of scope.
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email pattern is valid"));

/// Maximum stored email length.
const EMAIL_MAX_LEN: usize = 120;

/// A user principal.
///
/// The password hash is stored but never serialized, so an `Identity`
/// can be returned to callers as-is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    /// Unique identifier.
    pub id: Uuid,

    /// Unique username.
    pub username: String,

    /// Unique email address, stored lowercase.
    pub email: String,

    /// PHC-formatted Argon2id hash. Never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,

    /// When the identity was registered.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Most recent successful authentication, if any.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub last_login: Option<OffsetDateTime>,

    /// Deactivated identities cannot authenticate and their sessions stop
    /// validating, but the row is never removed.
    pub active: bool,
}

impl Identity {
    /// Creates a new active identity with a fresh id.
    ///
    /// The username and email are assumed to be already normalized and
    /// format-checked (see [`normalize_username`] and [`normalize_email`]).
    #[must_use]
    pub fn new(username: String, email: String, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            username,
            email,
            password_hash,
            created_at: OffsetDateTime::now_utc(),
            last_login: None,
            active: true,
        }
    }
}

/// Trims and format-checks a username.
///
/// # Errors
///
/// Returns `AuthError::InvalidIdentity` if the trimmed username is not
/// 3-80 characters of `[A-Za-z0-9_]`.
pub fn normalize_username(username: &str) -> Result<String, AuthError> {
    let trimmed = username.trim();
    if USERNAME_RE.is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(AuthError::invalid_identity(
            "username",
            "must be 3-80 characters of letters, numbers, and underscores",
        ))
    }
}

/// Trims, lowercases, and format-checks an email address.
///
/// # Errors
///
/// Returns `AuthError::InvalidIdentity` if the address is implausible or
/// longer than 120 characters.
pub fn normalize_email(email: &str) -> Result<String, AuthError> {
    let normalized = email.trim().to_lowercase();
    if normalized.len() > EMAIL_MAX_LEN {
        return Err(AuthError::invalid_identity(
            "email",
            "must be at most 120 characters",
        ));
    }
    if EMAIL_RE.is_match(&normalized) {
        Ok(normalized)
    } else {
        Err(AuthError::invalid_identity(
            "email",
            "is not a valid email address",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert_eq!(normalize_username(" nurse1 ").unwrap(), "nurse1");
        assert!(normalize_username("ab").is_err());
        assert!(normalize_username("has space").is_err());
        assert!(normalize_username("semi;colon").is_err());
        assert!(normalize_username(&"x".repeat(81)).is_err());
    }

    #[test]
    fn email_is_lowercased() {
        assert_eq!(normalize_email(" N1@X.Org ").unwrap(), "n1@x.org");
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("a@b").is_err());
        let long = format!("{}@x.org", "a".repeat(120));
        assert!(normalize_email(&long).is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let identity = Identity::new(
            "nurse1".to_string(),
            "n1@x.org".to_string(),
            "$argon2id$secret".to_string(),
        );
        let value = serde_json::to_value(&identity).unwrap();
        assert!(value.get("password_hash").is_none());
        assert_eq!(value["username"], "nurse1");
        assert_eq!(value["active"], true);
    }
}
