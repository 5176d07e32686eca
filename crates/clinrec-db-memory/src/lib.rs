//! # clinrec-db-memory
//!
//! In-memory storage backends for ClinRec.
//!
//! Implements the identity store ([`InMemoryIdentityStorage`],
//! [`InMemorySessionStorage`]) and the record store
//! ([`InMemoryRecordStorage`]) entirely in process memory. Used by the
//! test suites and by embedding callers that need no external database.
//! Uniqueness constraints are enforced under each table's write lock, the
//! in-memory equivalent of a unique index.

pub mod identities;
pub mod records;

pub use identities::{InMemoryIdentityStorage, InMemorySessionStorage};
pub use records::InMemoryRecordStorage;
