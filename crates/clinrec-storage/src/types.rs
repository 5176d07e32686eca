//! Storage types for the record storage abstraction layer.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use clinrec_core::{NormalizedRecord, RecordPatch};

use crate::error::StorageError;

/// Default page size for record listings.
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: usize = 100;

/// A patient record as stored in the record store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    /// The normalized record content.
    #[serde(flatten)]
    pub record: NormalizedRecord,

    /// Identity that created the record. Application-level reference into
    /// the independently owned identity store, not a store-enforced
    /// foreign key.
    pub created_by: Uuid,

    /// Monotonic insertion sequence, used for ordering and page tokens.
    pub sequence: u64,

    /// When the record was created.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// When the record was last updated.
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl StoredRecord {
    /// Creates a stored record envelope for a fresh insert.
    #[must_use]
    pub fn new(record: NormalizedRecord, created_by: Uuid, sequence: u64) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            record,
            created_by,
            sequence,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns a copy with the patch applied and the update timestamp
    /// bumped. Identifier, creator, sequence, and creation time are
    /// preserved.
    #[must_use]
    pub fn with_patch(&self, patch: &RecordPatch) -> Self {
        Self {
            record: patch.apply(&self.record),
            created_by: self.created_by,
            sequence: self.sequence,
            created_at: self.created_at,
            updated_at: OffsetDateTime::now_utc(),
        }
    }
}

/// An opaque, monotonic cursor into a record listing.
///
/// Wraps the insertion sequence of the last record already returned, so a
/// token issued for one page always sorts strictly before the token of any
/// later page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageToken(u64);

impl PageToken {
    /// Wraps the sequence of the last record on a page.
    #[must_use]
    pub fn after(sequence: u64) -> Self {
        Self(sequence)
    }

    /// Returns the sequence this token points past.
    #[must_use]
    pub fn last_sequence(&self) -> u64 {
        self.0
    }

    /// Encodes the token for the caller.
    #[must_use]
    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("seq:{}", self.0))
    }

    /// Decodes a caller-supplied token.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPageToken` for anything this store
    /// did not issue.
    pub fn decode(token: &str) -> Result<Self, StorageError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|_| StorageError::InvalidPageToken)?;
        let text = String::from_utf8(bytes).map_err(|_| StorageError::InvalidPageToken)?;
        let sequence = text
            .strip_prefix("seq:")
            .and_then(|rest| rest.parse::<u64>().ok())
            .ok_or(StorageError::InvalidPageToken)?;
        Ok(Self(sequence))
    }
}

/// Parameters of a record listing request.
#[derive(Debug, Clone, Default)]
pub struct PageRequest {
    /// Resume cursor from a previous page, if any.
    pub token: Option<PageToken>,
    /// Requested page size; clamped to `1..=MAX_PAGE_SIZE`, defaulting to
    /// `DEFAULT_PAGE_SIZE` when absent.
    pub size: Option<usize>,
}

impl PageRequest {
    /// Creates a request for the first page with the default size.
    #[must_use]
    pub fn first() -> Self {
        Self::default()
    }

    /// Builds a request from caller-supplied values.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::InvalidPageToken` if the token does not
    /// decode.
    pub fn from_parts(token: Option<&str>, size: Option<usize>) -> Result<Self, StorageError> {
        let token = token.map(PageToken::decode).transpose()?;
        Ok(Self { token, size })
    }

    /// The effective page size after clamping.
    #[must_use]
    pub fn effective_size(&self) -> usize {
        self.size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }
}

/// One page of a record listing, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecordPage {
    /// The records on this page.
    pub records: Vec<StoredRecord>,
    /// Token for the next page; `None` when this page is the last.
    pub next_token: Option<String>,
    /// Total number of records in the store at listing time.
    pub total: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_token_round_trips() {
        let token = PageToken::after(42);
        let encoded = token.encode();
        assert_eq!(PageToken::decode(&encoded).unwrap(), token);
    }

    #[test]
    fn page_tokens_are_monotonic() {
        // Lexical opacity aside, the wrapped cursor always increases.
        assert!(PageToken::after(7).last_sequence() < PageToken::after(8).last_sequence());
    }

    #[test]
    fn garbage_tokens_are_rejected() {
        assert!(matches!(
            PageToken::decode("!!not-base64!!"),
            Err(StorageError::InvalidPageToken)
        ));
        let wrong_shape = URL_SAFE_NO_PAD.encode("cursor=9");
        assert!(matches!(
            PageToken::decode(&wrong_shape),
            Err(StorageError::InvalidPageToken)
        ));
    }

    #[test]
    fn page_size_is_clamped() {
        assert_eq!(PageRequest::first().effective_size(), DEFAULT_PAGE_SIZE);
        let oversized = PageRequest {
            token: None,
            size: Some(10_000),
        };
        assert_eq!(oversized.effective_size(), MAX_PAGE_SIZE);
        let zero = PageRequest {
            token: None,
            size: Some(0),
        };
        assert_eq!(zero.effective_size(), 1);
    }
}
