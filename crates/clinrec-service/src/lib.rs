//! # clinrec-service
//!
//! The record service: orchestrates authorization, validation,
//! persistence, and audit logging for every operation on the
//! request/response surface.
//!
//! ```ignore
//! use std::sync::Arc;
//! use clinrec_auth::{AuthConfig, CredentialManager};
//! use clinrec_db_memory::{InMemoryIdentityStorage, InMemoryRecordStorage, InMemorySessionStorage};
//! use clinrec_service::{RecordService, TracingSink};
//!
//! let credentials = Arc::new(CredentialManager::new(
//!     Arc::new(InMemoryIdentityStorage::new()),
//!     Arc::new(InMemorySessionStorage::new()),
//!     AuthConfig::default(),
//! ));
//! let service = RecordService::new(
//!     credentials,
//!     Arc::new(InMemoryRecordStorage::new()),
//!     Arc::new(TracingSink::new()),
//! );
//! ```
//!
//! ## Modules
//!
//! - [`audit`] - Security event sink and implementations
//! - [`service`] - The record service itself

pub mod audit;
pub mod service;

pub use audit::{MemorySink, SecurityEventSink, TracingSink};
pub use service::{LoginOutcome, RecordService};
