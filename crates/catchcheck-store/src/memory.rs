//! In-memory catch storage for development and testing.
//!
//! This implementation uses `RwLock::unwrap()` intentionally. Lock poisoning
//! only occurs when another thread panicked while holding the lock, which is
//! an unrecoverable state.

use async_trait::async_trait;
use catchcheck_core::error::{CatchError, Result};
use catchcheck_core::models::{Catch, CatchId, VerificationStatus};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::ports::CatchStore;

/// In-memory implementation of CatchStore
#[derive(Debug, Clone, Default)]
pub struct MemoryCatchStore {
    catches: Arc<RwLock<HashMap<CatchId, Catch>>>,
}

impl MemoryCatchStore {
    /// Create a new in-memory catch store
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.catches.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CatchStore for MemoryCatchStore {
    async fn save(&self, record: &Catch) -> Result<()> {
        let mut catches = self.catches.write().unwrap();
        if catches.contains_key(&record.id) {
            return Err(CatchError::PersistenceFailure {
                reason: format!("catch {} already exists", record.id),
            });
        }
        catches.insert(record.id, record.clone());
        Ok(())
    }

    async fn get(&self, id: CatchId) -> Result<Option<Catch>> {
        let catches = self.catches.read().unwrap();
        Ok(catches.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<Catch>> {
        let catches = self.catches.read().unwrap();
        let mut all: Vec<Catch> = catches.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn update_status(
        &self,
        id: CatchId,
        expected: VerificationStatus,
        status: VerificationStatus,
    ) -> Result<Catch> {
        let mut catches = self.catches.write().unwrap();
        let record =
            catches.get_mut(&id).ok_or_else(|| CatchError::CatchNotFound { id: id.to_string() })?;
        if record.verification_status != expected {
            return Err(CatchError::InvalidTransition { from: record.verification_status });
        }
        record.verification_status = status;
        record.is_suspicious = false;
        Ok(record.clone())
    }

    async fn verified_count(&self, submitter_id: &str) -> Result<usize> {
        let catches = self.catches.read().unwrap();
        Ok(catches
            .values()
            .filter(|c| {
                c.submitter.id == submitter_id
                    && c.verification_status == VerificationStatus::Verified
            })
            .count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::review_catch;
    use catchcheck_core::models::{CatchDraft, GroundRef, Submitter};

    fn create_test_catch(submitter: &str, status: VerificationStatus) -> Catch {
        let mut draft = CatchDraft::default();
        draft.species = "Carp".to_string();
        draft.ground = Some(GroundRef::Custom { name: "Zemplínska šírava".to_string() });
        let submitter = Submitter {
            id: submitter.to_string(),
            name: submitter.to_string(),
            avatar: String::new(),
        };
        let mut record = Catch::from_draft(&draft, submitter).unwrap();
        record.verification_status = status;
        record.is_suspicious = status == VerificationStatus::Pending;
        record
    }

    #[tokio::test]
    async fn test_save_and_get() {
        let store = MemoryCatchStore::new();
        let record = create_test_catch("u1", VerificationStatus::Verified);

        store.save(&record).await.unwrap();

        let retrieved = store.get(record.id).await.unwrap();
        assert_eq!(retrieved, Some(record));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_save_fails() {
        let store = MemoryCatchStore::new();
        let record = create_test_catch("u1", VerificationStatus::Verified);

        store.save(&record).await.unwrap();
        let err = store.save(&record).await.unwrap_err();

        assert!(matches!(err, CatchError::PersistenceFailure { .. }));
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let store = MemoryCatchStore::new();
        let mut older = create_test_catch("u1", VerificationStatus::Verified);
        older.created_at -= chrono::Duration::minutes(5);
        let newer = create_test_catch("u1", VerificationStatus::Pending);

        store.save(&older).await.unwrap();
        store.save(&newer).await.unwrap();

        let ids: Vec<_> = store.list().await.unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn test_verified_count_per_submitter() {
        let store = MemoryCatchStore::new();
        store.save(&create_test_catch("u1", VerificationStatus::Verified)).await.unwrap();
        store.save(&create_test_catch("u1", VerificationStatus::Pending)).await.unwrap();
        store.save(&create_test_catch("u2", VerificationStatus::Verified)).await.unwrap();

        assert_eq!(store.verified_count("u1").await.unwrap(), 1);
        assert_eq!(store.verified_count("u3").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_review_approves_pending() {
        let store = MemoryCatchStore::new();
        let record = create_test_catch("u1", VerificationStatus::Pending);
        store.save(&record).await.unwrap();

        let reviewed = review_catch(&store, record.id, true).await.unwrap();

        assert_eq!(reviewed.verification_status, VerificationStatus::Verified);
        assert!(!reviewed.is_suspicious);
        assert_eq!(store.verified_count("u1").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_review_rejects_non_pending() {
        let store = MemoryCatchStore::new();
        let record = create_test_catch("u1", VerificationStatus::Verified);
        store.save(&record).await.unwrap();

        let err = review_catch(&store, record.id, false).await.unwrap_err();

        assert!(matches!(err, CatchError::InvalidTransition { .. }));
        let stored = store.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.verification_status, VerificationStatus::Verified);
    }

    #[tokio::test]
    async fn test_update_status_checks_expected_status() {
        let store = MemoryCatchStore::new();
        let record = create_test_catch("u1", VerificationStatus::Pending);
        store.save(&record).await.unwrap();

        // Two administrators who both saw the catch as pending
        let first = store
            .update_status(record.id, VerificationStatus::Pending, VerificationStatus::Verified)
            .await
            .unwrap();
        let second = store
            .update_status(record.id, VerificationStatus::Pending, VerificationStatus::Rejected)
            .await
            .unwrap_err();

        assert_eq!(first.verification_status, VerificationStatus::Verified);
        assert!(matches!(
            second,
            CatchError::InvalidTransition { from: VerificationStatus::Verified }
        ));
        let stored = store.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.verification_status, VerificationStatus::Verified);
    }

    #[tokio::test]
    async fn test_review_unknown_catch() {
        let store = MemoryCatchStore::new();
        let err = review_catch(&store, CatchId::generate(), true).await.unwrap_err();
        assert!(matches!(err, CatchError::CatchNotFound { .. }));
    }
}
