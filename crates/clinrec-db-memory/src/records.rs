//! In-memory record store backend.
//!
//! Keeps records in a sequence-ordered map guarded by one `RwLock`, so the
//! duplicate-identifier check in `create` runs under the same write lock
//! as the insert. That check is the authoritative uniqueness guard for
//! this backend, the in-memory stand-in for a database unique index.

use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use clinrec_core::{NormalizedRecord, PatientId, RecordPatch};
use clinrec_storage::{
    PageRequest, PageToken, RecordPage, RecordStorage, StorageError, StoredRecord,
};

#[derive(Default)]
struct RecordTable {
    /// Records in insertion order, keyed by sequence.
    by_seq: BTreeMap<u64, StoredRecord>,
    /// Identifier index into `by_seq`.
    by_id: HashMap<PatientId, u64>,
}

/// In-memory implementation of [`RecordStorage`].
#[derive(Default)]
pub struct InMemoryRecordStorage {
    table: RwLock<RecordTable>,
    sequence: AtomicU64,
}

impl InMemoryRecordStorage {
    /// Creates an empty record store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStorage for InMemoryRecordStorage {
    async fn create(
        &self,
        record: &NormalizedRecord,
        created_by: Uuid,
    ) -> Result<StoredRecord, StorageError> {
        let mut table = self.table.write().await;
        if table.by_id.contains_key(&record.patient_id) {
            return Err(StorageError::duplicate_key(record.patient_id));
        }
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let stored = StoredRecord::new(record.clone(), created_by, sequence);
        table.by_id.insert(record.patient_id, sequence);
        table.by_seq.insert(sequence, stored.clone());
        Ok(stored)
    }

    async fn read(&self, id: PatientId) -> Result<Option<StoredRecord>, StorageError> {
        let table = self.table.read().await;
        Ok(table
            .by_id
            .get(&id)
            .and_then(|seq| table.by_seq.get(seq))
            .cloned())
    }

    async fn update(
        &self,
        id: PatientId,
        patch: &RecordPatch,
    ) -> Result<StoredRecord, StorageError> {
        let mut table = self.table.write().await;
        let Some(&sequence) = table.by_id.get(&id) else {
            return Err(StorageError::not_found(id));
        };
        let Some(current) = table.by_seq.get(&sequence) else {
            return Err(StorageError::internal(format!(
                "index points at missing sequence {sequence}"
            )));
        };
        let updated = current.with_patch(patch);
        table.by_seq.insert(sequence, updated.clone());
        Ok(updated)
    }

    async fn delete(&self, id: PatientId) -> Result<(), StorageError> {
        let mut table = self.table.write().await;
        let Some(sequence) = table.by_id.remove(&id) else {
            return Err(StorageError::not_found(id));
        };
        table.by_seq.remove(&sequence);
        Ok(())
    }

    async fn list(&self, page: &PageRequest) -> Result<RecordPage, StorageError> {
        let table = self.table.read().await;
        let size = page.effective_size();
        let start = match page.token {
            Some(token) => Bound::Excluded(token.last_sequence()),
            None => Bound::Unbounded,
        };

        let mut records: Vec<StoredRecord> = table
            .by_seq
            .range((start, Bound::Unbounded))
            .take(size + 1)
            .map(|(_, record)| record.clone())
            .collect();

        let next_token = if records.len() > size {
            records.truncate(size);
            records
                .last()
                .map(|record| PageToken::after(record.sequence).encode())
        } else {
            None
        };

        Ok(RecordPage {
            records,
            next_token,
            total: table.by_id.len() as u64,
        })
    }

    async fn search(&self, term: &str) -> Result<Vec<StoredRecord>, StorageError> {
        if term.is_empty() {
            return Ok(Vec::new());
        }
        let table = self.table.read().await;

        if term.chars().all(|c| c.is_ascii_digit()) {
            let found = term
                .parse::<i64>()
                .ok()
                .and_then(|value| PatientId::new(value).ok())
                .and_then(|id| table.by_id.get(&id))
                .and_then(|seq| table.by_seq.get(seq))
                .cloned();
            return Ok(found.into_iter().collect());
        }

        let needle = term.to_lowercase();
        Ok(table
            .by_seq
            .values()
            .filter(|stored| {
                let record = &stored.record;
                [
                    record.gender.as_str(),
                    record.work_type.as_str(),
                    record.smoking_status.as_str(),
                ]
                .iter()
                .any(|category| category.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }

    async fn contains(&self, id: PatientId) -> Result<bool, StorageError> {
        let table = self.table.read().await;
        Ok(table.by_id.contains_key(&id))
    }

    async fn count(&self) -> Result<u64, StorageError> {
        let table = self.table.read().await;
        Ok(table.by_id.len() as u64)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinrec_core::{EverMarried, Gender, ResidenceType, SmokingStatus, WorkType};

    fn record(id: i64) -> NormalizedRecord {
        NormalizedRecord {
            patient_id: PatientId::new(id).unwrap(),
            gender: Gender::Female,
            age: 52.0,
            hypertension: false,
            heart_disease: false,
            ever_married: EverMarried::Yes,
            work_type: WorkType::GovtJob,
            residence_type: ResidenceType::Rural,
            avg_glucose_level: 88.2,
            bmi: None,
            smoking_status: SmokingStatus::Unknown,
            stroke: false,
        }
    }

    #[tokio::test]
    async fn create_then_read_round_trips() {
        let store = InMemoryRecordStorage::new();
        let creator = Uuid::new_v4();
        let stored = store.create(&record(1001), creator).await.unwrap();
        assert_eq!(stored.sequence, 1);

        let fetched = store.read(stored.record.patient_id).await.unwrap().unwrap();
        assert_eq!(fetched, stored);
        assert_eq!(fetched.created_by, creator);
    }

    #[tokio::test]
    async fn duplicate_create_is_rejected_by_the_store() {
        let store = InMemoryRecordStorage::new();
        store.create(&record(1001), Uuid::new_v4()).await.unwrap();
        let err = store
            .create(&record(1001), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(err.is_duplicate_key());
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn update_bumps_updated_at_and_keeps_identity() {
        let store = InMemoryRecordStorage::new();
        let stored = store.create(&record(1001), Uuid::new_v4()).await.unwrap();
        let patch = RecordPatch {
            age: Some(53.0),
            ..RecordPatch::default()
        };
        let updated = store.update(stored.record.patient_id, &patch).await.unwrap();
        assert_eq!(updated.record.age, 53.0);
        assert_eq!(updated.created_at, stored.created_at);
        assert_eq!(updated.sequence, stored.sequence);
        assert!(updated.updated_at >= stored.updated_at);
    }

    #[tokio::test]
    async fn delete_is_not_found_after_removal() {
        let store = InMemoryRecordStorage::new();
        let id = PatientId::new(1001).unwrap();
        store.create(&record(1001), Uuid::new_v4()).await.unwrap();
        store.delete(id).await.unwrap();
        assert!(store.delete(id).await.unwrap_err().is_not_found());
        assert!(store.read(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn list_pages_in_insertion_order() {
        let store = InMemoryRecordStorage::new();
        for id in [30, 10, 20] {
            store.create(&record(id), Uuid::new_v4()).await.unwrap();
        }

        let first = store
            .list(&PageRequest {
                token: None,
                size: Some(2),
            })
            .await
            .unwrap();
        let ids: Vec<i64> = first
            .records
            .iter()
            .map(|r| r.record.patient_id.value())
            .collect();
        assert_eq!(ids, vec![30, 10]);
        assert_eq!(first.total, 3);

        let token = PageToken::decode(first.next_token.as_deref().unwrap()).unwrap();
        let second = store
            .list(&PageRequest {
                token: Some(token),
                size: Some(2),
            })
            .await
            .unwrap();
        let ids: Vec<i64> = second
            .records
            .iter()
            .map(|r| r.record.patient_id.value())
            .collect();
        assert_eq!(ids, vec![20]);
        assert!(second.next_token.is_none());
    }

    #[tokio::test]
    async fn search_matches_by_exact_identifier() {
        let store = InMemoryRecordStorage::new();
        store.create(&record(1001), Uuid::new_v4()).await.unwrap();
        store.create(&record(1002), Uuid::new_v4()).await.unwrap();

        let hits = store.search("1002").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.patient_id.value(), 1002);

        assert!(store.search("9999").await.unwrap().is_empty());
        // Out-of-range digits match nothing rather than erroring.
        assert!(store.search("1000000").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_matches_categories_case_insensitively() {
        let store = InMemoryRecordStorage::new();
        store.create(&record(1001), Uuid::new_v4()).await.unwrap();
        let smoker = NormalizedRecord {
            patient_id: PatientId::new(1002).unwrap(),
            work_type: WorkType::SelfEmployed,
            smoking_status: SmokingStatus::Smokes,
            ..record(1002)
        };
        store.create(&smoker, Uuid::new_v4()).await.unwrap();

        // Substring of the work_type category, any case.
        let hits = store.search("SELF-EMP").await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record.patient_id.value(), 1002);

        // Both records are Female; insertion order holds.
        let hits = store.search("female").await.unwrap();
        let ids: Vec<i64> = hits.iter().map(|r| r.record.patient_id.value()).collect();
        assert_eq!(ids, vec![1001, 1002]);

        assert!(store.search("retired").await.unwrap().is_empty());
        assert!(store.search("").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn exact_page_boundary_has_no_next_token() {
        let store = InMemoryRecordStorage::new();
        store.create(&record(1), Uuid::new_v4()).await.unwrap();
        store.create(&record(2), Uuid::new_v4()).await.unwrap();
        let page = store
            .list(&PageRequest {
                token: None,
                size: Some(2),
            })
            .await
            .unwrap();
        assert_eq!(page.records.len(), 2);
        assert!(page.next_token.is_none());
    }
}
