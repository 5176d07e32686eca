//! Session type and token generation.
//!
//! A session is a time-bounded authorization grant tied to one identity.
//! Tokens are opaque 256-bit random values; the expiry slides forward on
//! every successful validation (idle timeout). Expired and Revoked are
//! both terminal states, re-authentication is required.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use time::OffsetDateTime;
use uuid::Uuid;

/// A session stored in the identity store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    /// Opaque session token presented by the caller.
    pub token: String,

    /// The identity this session authorizes.
    pub identity_id: Uuid,

    /// When the session was issued.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// Current idle deadline. Slides forward on each validation.
    #[serde(with = "time::serde::rfc3339")]
    pub expires_at: OffsetDateTime,

    /// Set once on explicit logout; revocation is terminal.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub revoked_at: Option<OffsetDateTime>,
}

impl Session {
    /// Issues a new session for an identity with the given idle timeout.
    #[must_use]
    pub fn issue(identity_id: Uuid, idle_timeout: Duration) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            token: Self::generate_token(),
            identity_id,
            created_at: now,
            expires_at: now + idle_timeout,
            revoked_at: None,
        }
    }

    /// Generates a new opaque session token.
    ///
    /// 256 bits of entropy from the thread RNG, base64url-encoded without
    /// padding (43 characters).
    #[must_use]
    pub fn generate_token() -> String {
        let mut bytes = [0u8; 32];
        rand::Rng::fill(&mut rand::thread_rng(), &mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    /// Returns `true` if the idle deadline has passed.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() > self.expires_at
    }

    /// Returns `true` if the session was explicitly revoked.
    #[must_use]
    pub fn is_revoked(&self) -> bool {
        self.revoked_at.is_some()
    }

    /// Returns `true` if the session still authorizes requests.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.is_expired() && !self.is_revoked()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_unique_and_urlsafe() {
        let a = Session::generate_token();
        let b = Session::generate_token();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(
            a.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn fresh_session_is_active() {
        let session = Session::issue(Uuid::new_v4(), Duration::from_secs(1800));
        assert!(session.is_active());
        assert!(!session.is_expired());
        assert!(!session.is_revoked());
    }

    #[test]
    fn past_deadline_means_expired() {
        let mut session = Session::issue(Uuid::new_v4(), Duration::from_secs(1800));
        session.expires_at = OffsetDateTime::now_utc() - time::Duration::seconds(1);
        assert!(session.is_expired());
        assert!(!session.is_active());
    }

    #[test]
    fn revocation_is_terminal() {
        let mut session = Session::issue(Uuid::new_v4(), Duration::from_secs(1800));
        session.revoked_at = Some(OffsetDateTime::now_utc());
        assert!(session.is_revoked());
        assert!(!session.is_active());
    }
}
