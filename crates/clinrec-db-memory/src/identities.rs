//! In-memory identity store backend.
//!
//! Implements both halves of the identity store: principals and sessions.
//! Username and email uniqueness are checked under the table's write lock,
//! which is the authoritative guard for this backend.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use clinrec_auth::{AuthError, AuthResult, Identity, IdentityStorage, Session, SessionStorage};

#[derive(Default)]
struct IdentityTable {
    by_id: HashMap<Uuid, Identity>,
    username_index: HashMap<String, Uuid>,
    email_index: HashMap<String, Uuid>,
}

/// In-memory implementation of [`IdentityStorage`].
#[derive(Default)]
pub struct InMemoryIdentityStorage {
    table: RwLock<IdentityTable>,
}

impl InMemoryIdentityStorage {
    /// Creates an empty identity store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdentityStorage for InMemoryIdentityStorage {
    async fn insert(&self, identity: &Identity) -> AuthResult<()> {
        let mut table = self.table.write().await;
        if table.username_index.contains_key(&identity.username) {
            return Err(AuthError::duplicate_identity("username"));
        }
        if table.email_index.contains_key(&identity.email) {
            return Err(AuthError::duplicate_identity("email"));
        }
        table
            .username_index
            .insert(identity.username.clone(), identity.id);
        table.email_index.insert(identity.email.clone(), identity.id);
        table.by_id.insert(identity.id, identity.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AuthResult<Option<Identity>> {
        let table = self.table.read().await;
        Ok(table.by_id.get(&id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AuthResult<Option<Identity>> {
        let table = self.table.read().await;
        Ok(table
            .username_index
            .get(username)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn find_by_email(&self, email: &str) -> AuthResult<Option<Identity>> {
        let table = self.table.read().await;
        Ok(table
            .email_index
            .get(email)
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }

    async fn record_login(&self, id: Uuid, at: OffsetDateTime) -> AuthResult<()> {
        let mut table = self.table.write().await;
        if let Some(identity) = table.by_id.get_mut(&id) {
            identity.last_login = Some(at);
        }
        Ok(())
    }

    async fn deactivate(&self, id: Uuid) -> AuthResult<()> {
        let mut table = self.table.write().await;
        if let Some(identity) = table.by_id.get_mut(&id) {
            identity.active = false;
        }
        Ok(())
    }
}

/// In-memory implementation of [`SessionStorage`].
#[derive(Default)]
pub struct InMemorySessionStorage {
    sessions: RwLock<HashMap<String, Session>>,
}

impl InMemorySessionStorage {
    /// Creates an empty session store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionStorage for InMemorySessionStorage {
    async fn insert(&self, session: &Session) -> AuthResult<()> {
        let mut sessions = self.sessions.write().await;
        sessions.insert(session.token.clone(), session.clone());
        Ok(())
    }

    async fn find(&self, token: &str) -> AuthResult<Option<Session>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(token).cloned())
    }

    async fn extend(&self, token: &str, expires_at: OffsetDateTime) -> AuthResult<()> {
        let mut sessions = self.sessions.write().await;
        if let Some(session) = sessions.get_mut(token) {
            session.expires_at = expires_at;
        }
        Ok(())
    }

    async fn revoke(&self, token: &str, at: OffsetDateTime) -> AuthResult<Option<Uuid>> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(token) {
            Some(session) if session.revoked_at.is_none() => {
                session.revoked_at = Some(at);
                Ok(Some(session.identity_id))
            }
            // Unknown or already revoked: idempotent success, no owner.
            _ => Ok(None),
        }
    }
}
