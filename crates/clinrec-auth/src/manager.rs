//! The credential manager.
//!
//! Orchestrates registration, authentication, session validation, and
//! revocation against the identity store. Holds no mutable state of its
//! own; every check re-reads the store.

use std::sync::Arc;

use time::OffsetDateTime;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::AuthResult;
use crate::config::AuthConfig;
use crate::error::AuthError;
use crate::identity::{Identity, normalize_email, normalize_username};
use crate::password::{hash_password, policy_violations, verify_password};
use crate::session::Session;
use crate::storage::{IdentityStorage, SessionStorage};

/// Issues and validates credentials and sessions.
pub struct CredentialManager {
    identities: Arc<dyn IdentityStorage>,
    sessions: Arc<dyn SessionStorage>,
    config: AuthConfig,
}

impl CredentialManager {
    /// Creates a credential manager over the given stores.
    pub fn new(
        identities: Arc<dyn IdentityStorage>,
        sessions: Arc<dyn SessionStorage>,
        config: AuthConfig,
    ) -> Self {
        Self {
            identities,
            sessions,
            config,
        }
    }

    /// Returns the configured session idle timeout.
    #[must_use]
    pub fn idle_timeout(&self) -> std::time::Duration {
        self.config.session_idle_timeout
    }

    /// Registers a new identity.
    ///
    /// Normalizes and format-checks the username and email, enforces the
    /// password policy, and stores only the Argon2id hash. The duplicate
    /// pre-checks are advisory; the store's `insert` is the authoritative
    /// uniqueness guard.
    ///
    /// # Errors
    ///
    /// `InvalidIdentity` on format failures, `WeakPassword` with every
    /// unmet rule, `DuplicateIdentity` on username/email collision.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> AuthResult<Identity> {
        let username = normalize_username(username)?;
        let email = normalize_email(email)?;

        let reasons = policy_violations(&self.config.password, password);
        if !reasons.is_empty() {
            return Err(AuthError::WeakPassword { reasons });
        }

        // Advisory pre-checks for friendlier errors; insert below decides.
        if self.identities.find_by_username(&username).await?.is_some() {
            return Err(AuthError::duplicate_identity("username"));
        }
        if self.identities.find_by_email(&email).await?.is_some() {
            return Err(AuthError::duplicate_identity("email"));
        }

        let identity = Identity::new(username, email, hash_password(password)?);
        self.identities.insert(&identity).await?;
        info!(identity_id = %identity.id, username = %identity.username, "identity registered");
        Ok(identity)
    }

    /// Authenticates a username/password pair and issues a session.
    ///
    /// On success updates the last-login timestamp and returns the
    /// identity together with a session expiring one idle timeout from
    /// now.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials`, uniformly, whether the username is unknown,
    /// the password mismatches, or the account is deactivated.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> AuthResult<(Identity, Session)> {
        let username = username.trim();
        let Some(identity) = self.identities.find_by_username(username).await? else {
            // Burn one hash so unknown usernames cost about as much as a
            // real verification.
            let _ = hash_password(password);
            debug!("authentication failed: unknown username");
            return Err(AuthError::InvalidCredentials);
        };

        if !verify_password(password, &identity.password_hash)? {
            debug!(identity_id = %identity.id, "authentication failed: password mismatch");
            return Err(AuthError::InvalidCredentials);
        }
        if !identity.active {
            warn!(identity_id = %identity.id, "authentication attempt on deactivated identity");
            return Err(AuthError::InvalidCredentials);
        }

        let now = OffsetDateTime::now_utc();
        self.identities.record_login(identity.id, now).await?;

        let session = Session::issue(identity.id, self.config.session_idle_timeout);
        self.sessions.insert(&session).await?;
        info!(identity_id = %identity.id, "session issued");

        let mut identity = identity;
        identity.last_login = Some(now);
        Ok((identity, session))
    }

    /// Validates a session token and slides its expiry forward.
    ///
    /// Session state is re-read from the store on every call.
    ///
    /// # Errors
    ///
    /// `SessionNotFound` for unknown or revoked tokens (and for sessions
    /// whose owner has been deactivated); `SessionExpired` once the idle
    /// deadline has passed, carrying the owning identity id for audit
    /// attribution.
    pub async fn validate_session(&self, token: &str) -> AuthResult<Identity> {
        let Some(session) = self.sessions.find(token).await? else {
            return Err(AuthError::SessionNotFound);
        };
        if session.is_revoked() {
            return Err(AuthError::SessionNotFound);
        }
        if session.is_expired() {
            return Err(AuthError::SessionExpired {
                identity_id: session.identity_id,
            });
        }

        let Some(identity) = self.identities.find_by_id(session.identity_id).await? else {
            return Err(AuthError::SessionNotFound);
        };
        if !identity.active {
            return Err(AuthError::SessionNotFound);
        }

        let new_deadline = OffsetDateTime::now_utc() + self.config.session_idle_timeout;
        self.sessions.extend(token, new_deadline).await?;
        Ok(identity)
    }

    /// Revokes a session. Idempotent.
    ///
    /// Returns the owning identity id only when this call performed the
    /// revocation.
    pub async fn invalidate(&self, token: &str) -> AuthResult<Option<Uuid>> {
        let owner = self
            .sessions
            .revoke(token, OffsetDateTime::now_utc())
            .await?;
        if let Some(identity_id) = owner {
            info!(identity_id = %identity_id, "session revoked");
        }
        Ok(owner)
    }

    /// Deactivates an identity. Its sessions stop validating immediately.
    pub async fn deactivate(&self, identity_id: Uuid) -> AuthResult<()> {
        self.identities.deactivate(identity_id).await?;
        warn!(identity_id = %identity_id, "identity deactivated");
        Ok(())
    }
}
