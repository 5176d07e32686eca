//! Storage traits for identities and sessions.
//!
//! The identity store owns both tables. Implementations must be
//! thread-safe (`Send + Sync`) and must enforce the uniqueness constraints
//! themselves: the credential manager's duplicate pre-checks are advisory
//! only.

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::AuthResult;
use crate::identity::Identity;
use crate::session::Session;

/// Persistence for user principals.
///
/// Implementations must hold uniqueness of both `username` and `email` at
/// all times; `insert` is the authoritative guard.
#[async_trait]
pub trait IdentityStorage: Send + Sync {
    /// Inserts a new identity.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::DuplicateIdentity` if the username or email is
    /// already registered, naming the colliding field.
    async fn insert(&self, identity: &Identity) -> AuthResult<()>;

    /// Looks up an identity by id.
    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Identity>>;

    /// Looks up an identity by exact username.
    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Identity>>;

    /// Looks up an identity by (lowercased) email.
    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Identity>>;

    /// Records a successful authentication time.
    async fn record_login(&self, id: Uuid, at: OffsetDateTime) -> AuthResult<()>;

    /// Marks an identity inactive. The only destructive identity
    /// operation; rows are never removed.
    async fn deactivate(&self, id: Uuid) -> AuthResult<()>;
}

/// Persistence for sessions.
///
/// Session state is re-read from the store on every authorization check;
/// there is no in-process cache to serve a session past its true expiry.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Stores a newly issued session.
    async fn insert(&self, session: &Session) -> AuthResult<()>;

    /// Looks up a session by token, regardless of its state.
    /// Callers check expiry and revocation themselves.
    async fn find(&self, token: &str) -> AuthResult<Option<Session>>;

    /// Slides the idle deadline of a session forward.
    /// A no-op for unknown tokens.
    async fn extend(&self, token: &str, expires_at: OffsetDateTime) -> AuthResult<()>;

    /// Revokes a session. Idempotent: revoking an unknown or already
    /// revoked token is not an error.
    ///
    /// Returns the owning identity id only when this call performed the
    /// transition to Revoked, so the caller can attribute the logout in
    /// the audit trail exactly once.
    async fn revoke(&self, token: &str, at: OffsetDateTime) -> AuthResult<Option<Uuid>>;
}
