//! Security events emitted by the record service.
//!
//! Events describe security-relevant actions only: who did what to which
//! record, and when. They never carry passwords, session tokens, or record
//! field values, so the audit trail can be retained and shipped without
//! redaction.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::id::PatientId;

/// The kind of a security event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SecurityEventKind {
    /// Successful authentication.
    LoginSuccess,
    /// Failed authentication attempt. The actor is unknown by design.
    LoginFailure,
    /// Explicit session revocation.
    Logout,
    /// A session was presented after its idle deadline.
    SessionExpired,
    RecordCreated,
    RecordUpdated,
    RecordDeleted,
    /// A mutation payload was rejected by the validation pipeline.
    ValidationRejected,
}

/// One append-only audit trail entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    pub kind: SecurityEventKind,
    /// Identity that performed (or attempted) the action.
    /// `None` only for failed authentication, where no identity resolved.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<Uuid>,
    /// Record the action targeted, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<PatientId>,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

impl SecurityEvent {
    /// Creates an event stamped with the current time.
    #[must_use]
    pub fn new(kind: SecurityEventKind, actor: Option<Uuid>, target: Option<PatientId>) -> Self {
        Self {
            kind,
            actor,
            target,
            at: OffsetDateTime::now_utc(),
        }
    }

    /// Creates an event with an actor but no target record.
    #[must_use]
    pub fn for_actor(kind: SecurityEventKind, actor: Uuid) -> Self {
        Self::new(kind, Some(actor), None)
    }

    /// Creates an event with both an actor and a target record.
    #[must_use]
    pub fn for_record(kind: SecurityEventKind, actor: Uuid, target: PatientId) -> Self {
        Self::new(kind, Some(actor), Some(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::PatientId;

    #[test]
    fn event_serializes_without_absent_fields() {
        let event = SecurityEvent::new(SecurityEventKind::LoginFailure, None, None);
        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("actor").is_none());
        assert!(value.get("target").is_none());
        assert_eq!(value["kind"], "LoginFailure");
    }

    #[test]
    fn record_event_carries_target_id_only() {
        let actor = Uuid::new_v4();
        let target = PatientId::new(1001).unwrap();
        let event = SecurityEvent::for_record(SecurityEventKind::RecordCreated, actor, target);
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["target"], 1001);
        // The serialized form is exactly kind/actor/target/at.
        assert_eq!(value.as_object().unwrap().len(), 4);
    }
}
