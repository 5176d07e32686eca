//! Security event audit logging.
//!
//! The audit trail is an append-only sink of payload-free events: who did
//! what to which record, and when. Sinks never receive passwords, session
//! tokens, or record field values, because [`SecurityEvent`] cannot carry
//! them. Retention and rotation are external collaborator concerns.

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use clinrec_core::SecurityEvent;

/// Append-only sink for security events.
#[async_trait]
pub trait SecurityEventSink: Send + Sync {
    /// Appends one event. Sinks must not reorder or drop events.
    async fn record(&self, event: SecurityEvent);
}

/// Sink that appends events to the process log under the `audit` target.
///
/// Shipping those log lines to durable storage is the embedding process's
/// concern.
#[derive(Debug, Default)]
pub struct TracingSink;

impl TracingSink {
    /// Creates the tracing-backed sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SecurityEventSink for TracingSink {
    async fn record(&self, event: SecurityEvent) {
        info!(
            target: "audit",
            kind = ?event.kind,
            actor = event.actor.map(|id| id.to_string()),
            record = event.target.map(|id| id.to_string()),
            at = %event.at,
            "security event"
        );
    }
}

/// Sink that keeps events in memory, for tests and embedded inspection.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: RwLock<Vec<SecurityEvent>>,
}

impl MemorySink {
    /// Creates an empty in-memory sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every event recorded so far, in append order.
    pub async fn snapshot(&self) -> Vec<SecurityEvent> {
        self.events.read().await.clone()
    }
}

#[async_trait]
impl SecurityEventSink for MemorySink {
    async fn record(&self, event: SecurityEvent) {
        self.events.write().await.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinrec_core::SecurityEventKind;
    use uuid::Uuid;

    #[tokio::test]
    async fn memory_sink_preserves_append_order() {
        let sink = MemorySink::new();
        let actor = Uuid::new_v4();
        sink.record(SecurityEvent::for_actor(SecurityEventKind::LoginSuccess, actor))
            .await;
        sink.record(SecurityEvent::for_actor(SecurityEventKind::Logout, actor))
            .await;

        let events = sink.snapshot().await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, SecurityEventKind::LoginSuccess);
        assert_eq!(events[1].kind, SecurityEventKind::Logout);
    }
}
