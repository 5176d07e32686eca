//! # clinrec-core
//!
//! Core types for the ClinRec record-access subsystem.
//!
//! This crate provides:
//! - The validated patient record identifier
//! - The typed patient record model and its categorical enumerations
//! - Security event types for the audit trail
//! - The service-level error taxonomy shared by all crates
//!
//! ## Modules
//!
//! - [`id`] - Patient record identifier
//! - [`record`] - Normalized patient record and patch types
//! - [`events`] - Security events emitted by the record service
//! - [`error`] - `ServiceError` taxonomy

pub mod error;
pub mod events;
pub mod id;
pub mod record;

pub use error::{FieldViolation, ServiceError, ServiceResult};
pub use events::{SecurityEvent, SecurityEventKind};
pub use id::{PATIENT_ID_MAX, PATIENT_ID_MIN, PatientId, PatientIdError};
pub use record::{
    EverMarried, Gender, NormalizedRecord, RecordPatch, ResidenceType, SmokingStatus, WorkType,
};
