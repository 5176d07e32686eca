//! The record service.
//!
//! Orchestrates every operation of the request/response surface: session
//! validation first, then the validation pipeline for mutations, then the
//! record store, and finally one security event per outcome. The service
//! holds its collaborators explicitly; nothing is read from global state.
//!
//! Record operations never touch the identity store, and no cross-store
//! transaction exists: a record store failure after a successful session
//! check is logged and surfaced without compensation.

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{error, info, warn};
use uuid::Uuid;

use clinrec_auth::{AuthError, CredentialManager, Identity, Session};
use clinrec_core::{
    FieldViolation, PatientId, SecurityEvent, SecurityEventKind, ServiceError, ServiceResult,
};
use clinrec_storage::{PageRequest, RecordPage, RecordStorage, StorageError, StoredRecord};
use clinrec_validation::{ValidationError, validate_new, validate_patch};

use crate::audit::SecurityEventSink;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The authenticated identity.
    pub identity: Identity,
    /// The issued session. The token and expiry travel back to the
    /// caller; the cookie helper in `clinrec-auth` wraps them for HTTP.
    pub session: Session,
}

/// The authentication-and-record-access service.
///
/// Construct one per process with concrete store backends and share it;
/// every operation takes the caller's session token explicitly.
pub struct RecordService {
    credentials: Arc<CredentialManager>,
    records: Arc<dyn RecordStorage>,
    audit: Arc<dyn SecurityEventSink>,
}

impl RecordService {
    /// Creates a record service over the given collaborators.
    pub fn new(
        credentials: Arc<CredentialManager>,
        records: Arc<dyn RecordStorage>,
        audit: Arc<dyn SecurityEventSink>,
    ) -> Self {
        Self {
            credentials,
            records,
            audit,
        }
    }

    // ==================== Authentication surface ====================

    /// Registers a new identity.
    ///
    /// # Errors
    ///
    /// `Validation` for format or password-policy failures, `DuplicateKey`
    /// when the username or email is taken.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> ServiceResult<Identity> {
        self.credentials
            .register(username, email, password)
            .await
            .map_err(map_auth_error)
    }

    /// Authenticates and issues a session.
    ///
    /// Emits `LoginSuccess` or `LoginFailure`.
    ///
    /// # Errors
    ///
    /// `Authentication`, uniformly, for any credential mismatch.
    pub async fn login(&self, username: &str, password: &str) -> ServiceResult<LoginOutcome> {
        match self.credentials.authenticate(username, password).await {
            Ok((identity, session)) => {
                self.audit
                    .record(SecurityEvent::for_actor(
                        SecurityEventKind::LoginSuccess,
                        identity.id,
                    ))
                    .await;
                Ok(LoginOutcome { identity, session })
            }
            Err(AuthError::InvalidCredentials) => {
                // No identity resolved; the event carries no actor.
                self.audit
                    .record(SecurityEvent::new(SecurityEventKind::LoginFailure, None, None))
                    .await;
                Err(ServiceError::Authentication)
            }
            Err(other) => Err(map_auth_error(other)),
        }
    }

    /// Revokes a session. Idempotent; acknowledged even for unknown
    /// tokens. Emits `Logout` when this call performed the revocation.
    pub async fn logout(&self, token: &str) -> ServiceResult<()> {
        let owner = self
            .credentials
            .invalidate(token)
            .await
            .map_err(map_auth_error)?;
        if let Some(identity_id) = owner {
            self.audit
                .record(SecurityEvent::for_actor(SecurityEventKind::Logout, identity_id))
                .await;
        }
        Ok(())
    }

    // ==================== Record surface ====================

    /// Creates a record from a raw payload.
    ///
    /// Emits `RecordCreated` on success, `ValidationRejected` when the
    /// payload fails the pipeline.
    ///
    /// # Errors
    ///
    /// `Authorization` without an Active session, `Validation` for
    /// pipeline rejections, `DuplicateKey` when the identifier exists.
    pub async fn create_record(
        &self,
        token: &str,
        fields: &Map<String, Value>,
    ) -> ServiceResult<StoredRecord> {
        let actor = self.authorize(token).await?;

        let record = match validate_new(fields) {
            Ok(record) => record,
            Err(err) => {
                // The target id is unknown until validation passes.
                self.audit
                    .record(SecurityEvent::for_actor(
                        SecurityEventKind::ValidationRejected,
                        actor.id,
                    ))
                    .await;
                return Err(map_validation_error(err));
            }
        };

        // Advisory pre-check; the store's uniqueness enforcement decides.
        if self
            .records
            .contains(record.patient_id)
            .await
            .map_err(map_storage_error)?
        {
            warn!(patient_id = %record.patient_id, "create rejected: identifier already present");
            return Err(ServiceError::duplicate_key("record", record.patient_id));
        }

        let stored = self
            .records
            .create(&record, actor.id)
            .await
            .map_err(map_storage_error)?;
        info!(patient_id = %stored.record.patient_id, actor = %actor.id, "record created");
        self.audit
            .record(SecurityEvent::for_record(
                SecurityEventKind::RecordCreated,
                actor.id,
                stored.record.patient_id,
            ))
            .await;
        Ok(stored)
    }

    /// Reads one record.
    ///
    /// # Errors
    ///
    /// `Authorization` without an Active session, `NotFound` otherwise.
    pub async fn get_record(&self, token: &str, id: PatientId) -> ServiceResult<StoredRecord> {
        self.authorize(token).await?;
        self.records
            .read(id)
            .await
            .map_err(map_storage_error)?
            .ok_or_else(|| ServiceError::not_found("record", id))
    }

    /// Applies a raw patch to a record.
    ///
    /// Emits `RecordUpdated` on success, `ValidationRejected` when the
    /// patch fails the pipeline (including identifier presence).
    ///
    /// # Errors
    ///
    /// `Authorization`, `ImmutableField` when the patch carries the
    /// identifier, `Validation` for other rejections, `NotFound` when the
    /// record is absent.
    pub async fn update_record(
        &self,
        token: &str,
        id: PatientId,
        fields: &Map<String, Value>,
    ) -> ServiceResult<StoredRecord> {
        let actor = self.authorize(token).await?;

        let patch = match validate_patch(fields) {
            Ok(patch) => patch,
            Err(err) => {
                self.audit
                    .record(SecurityEvent::for_record(
                        SecurityEventKind::ValidationRejected,
                        actor.id,
                        id,
                    ))
                    .await;
                return Err(map_validation_error(err));
            }
        };

        let updated = self
            .records
            .update(id, &patch)
            .await
            .map_err(map_storage_error)?;
        info!(patient_id = %id, actor = %actor.id, "record updated");
        self.audit
            .record(SecurityEvent::for_record(
                SecurityEventKind::RecordUpdated,
                actor.id,
                id,
            ))
            .await;
        Ok(updated)
    }

    /// Deletes one record. Emits `RecordDeleted` on success.
    ///
    /// # Errors
    ///
    /// `Authorization` without an Active session; `NotFound` when absent,
    /// including for repeated deletes.
    pub async fn delete_record(&self, token: &str, id: PatientId) -> ServiceResult<()> {
        let actor = self.authorize(token).await?;
        self.records.delete(id).await.map_err(map_storage_error)?;
        info!(patient_id = %id, actor = %actor.id, "record deleted");
        self.audit
            .record(SecurityEvent::for_record(
                SecurityEventKind::RecordDeleted,
                actor.id,
                id,
            ))
            .await;
        Ok(())
    }

    /// Lists records in insertion order.
    ///
    /// # Errors
    ///
    /// `Authorization` without an Active session, `Validation` for a
    /// malformed page token.
    pub async fn list_records(
        &self,
        token: &str,
        page_token: Option<&str>,
        page_size: Option<usize>,
    ) -> ServiceResult<RecordPage> {
        self.authorize(token).await?;
        let page = PageRequest::from_parts(page_token, page_size).map_err(map_storage_error)?;
        self.records.list(&page).await.map_err(map_storage_error)
    }

    /// Searches records by identifier or category term.
    ///
    /// An all-digit term looks up that exact identifier; any other term
    /// matches case-insensitively against the gender, work type, and
    /// smoking status categories. A blank term returns no records. Like
    /// reads and lists, searches emit no events.
    ///
    /// # Errors
    ///
    /// `Authorization` without an Active session.
    pub async fn search_records(
        &self,
        token: &str,
        term: &str,
    ) -> ServiceResult<Vec<StoredRecord>> {
        self.authorize(token).await?;
        let term = term.trim();
        if term.is_empty() {
            return Ok(Vec::new());
        }
        self.records.search(term).await.map_err(map_storage_error)
    }

    // ==================== Internals ====================

    /// Validates the session at the start of every operation.
    ///
    /// An expired session emits a `SessionExpired` event attributed to
    /// the session's owner before the `Authorization` error is returned.
    async fn authorize(&self, token: &str) -> ServiceResult<Identity> {
        match self.credentials.validate_session(token).await {
            Ok(identity) => Ok(identity),
            Err(AuthError::SessionExpired { identity_id }) => {
                self.audit
                    .record(SecurityEvent::for_actor(
                        SecurityEventKind::SessionExpired,
                        identity_id,
                    ))
                    .await;
                Err(ServiceError::authorization("session expired"))
            }
            Err(err) => Err(map_auth_error(err)),
        }
    }
}

/// Collapses credential manager errors into the service taxonomy.
fn map_auth_error(err: AuthError) -> ServiceError {
    match err {
        AuthError::InvalidCredentials => ServiceError::Authentication,
        AuthError::DuplicateIdentity { field } => ServiceError::duplicate_key("identity", field),
        AuthError::InvalidIdentity { field, reason } => {
            ServiceError::validation(vec![FieldViolation::new(field, reason)])
        }
        AuthError::WeakPassword { reasons } => ServiceError::validation(
            reasons
                .into_iter()
                .map(|reason| FieldViolation::new("password", reason))
                .collect(),
        ),
        AuthError::SessionNotFound => ServiceError::authorization("no active session"),
        AuthError::SessionExpired { .. } => ServiceError::authorization("session expired"),
        AuthError::Storage { message } => {
            error!(detail = %message, "identity store unavailable");
            ServiceError::StoreUnavailable
        }
        AuthError::Internal { message } => {
            error!(detail = %message, "internal auth failure");
            ServiceError::Internal
        }
    }
}

/// Collapses record store errors into the service taxonomy.
fn map_storage_error(err: StorageError) -> ServiceError {
    match err {
        StorageError::NotFound { id } => ServiceError::not_found("record", id),
        StorageError::DuplicateKey { id } => ServiceError::duplicate_key("record", id),
        StorageError::InvalidPageToken => ServiceError::validation(vec![FieldViolation::new(
            "page_token",
            "is not a valid page token",
        )]),
        StorageError::Unavailable { message } => {
            error!(detail = %message, "record store unavailable");
            ServiceError::StoreUnavailable
        }
        StorageError::Internal { message } => {
            error!(detail = %message, "internal record store failure");
            ServiceError::Internal
        }
    }
}

/// Collapses pipeline errors into the service taxonomy.
fn map_validation_error(err: ValidationError) -> ServiceError {
    match err {
        ValidationError::Invalid { violations } => ServiceError::validation(violations),
        ValidationError::ImmutableField { field } => ServiceError::immutable_field(field),
    }
}
