//! # clinrec-storage
//!
//! Record storage abstraction layer for ClinRec.
//!
//! This crate defines the [`RecordStorage`] trait that record store
//! backends implement, the stored-record envelope, opaque page tokens for
//! insertion-order listings, and the storage error taxonomy. Backends live
//! in their own crates (see `clinrec-db-memory`).

pub mod error;
pub mod traits;
pub mod types;

pub use error::StorageError;
pub use traits::RecordStorage;
pub use types::{
    DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageRequest, PageToken, RecordPage, StoredRecord,
};
