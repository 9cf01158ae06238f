//! JSON-file catch storage
//!
//! All catches live in a single JSON array. Every write rewrites the whole
//! file through a sibling temp file and a rename, so a crash mid-write leaves
//! the previous contents intact.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use catchcheck_core::error::{CatchError, Result};
use catchcheck_core::models::{Catch, CatchId, VerificationStatus};
use tokio::sync::Mutex;

use crate::ports::CatchStore;

/// File-backed implementation of CatchStore
#[derive(Debug)]
pub struct JsonFileCatchStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileCatchStore {
    /// Open a store at `path`; the file is created on first save
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into(), lock: Mutex::new(()) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<Vec<Catch>> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(persistence(&self.path, e)),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|e| persistence(&self.path, e))
    }

    async fn write_all(&self, catches: &[Catch]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(|e| persistence(&self.path, e))?;
        }

        let json = serde_json::to_string_pretty(catches).map_err(|e| persistence(&self.path, e))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(|e| persistence(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(|e| persistence(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), catches = catches.len(), "catch file written");
        Ok(())
    }
}

#[async_trait]
impl CatchStore for JsonFileCatchStore {
    async fn save(&self, record: &Catch) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut catches = self.read_all().await?;
        if catches.iter().any(|c| c.id == record.id) {
            return Err(CatchError::PersistenceFailure {
                reason: format!("catch {} already exists", record.id),
            });
        }
        catches.push(record.clone());
        self.write_all(&catches).await
    }

    async fn get(&self, id: CatchId) -> Result<Option<Catch>> {
        let _guard = self.lock.lock().await;
        Ok(self.read_all().await?.into_iter().find(|c| c.id == id))
    }

    async fn list(&self) -> Result<Vec<Catch>> {
        let _guard = self.lock.lock().await;
        let mut catches = self.read_all().await?;
        catches.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(catches)
    }

    async fn update_status(
        &self,
        id: CatchId,
        expected: VerificationStatus,
        status: VerificationStatus,
    ) -> Result<Catch> {
        let _guard = self.lock.lock().await;
        let mut catches = self.read_all().await?;
        let record = catches
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CatchError::CatchNotFound { id: id.to_string() })?;
        if record.verification_status != expected {
            return Err(CatchError::InvalidTransition { from: record.verification_status });
        }
        record.verification_status = status;
        record.is_suspicious = false;
        let updated = record.clone();

        self.write_all(&catches).await?;
        Ok(updated)
    }

    async fn verified_count(&self, submitter_id: &str) -> Result<usize> {
        let _guard = self.lock.lock().await;
        Ok(self
            .read_all()
            .await?
            .iter()
            .filter(|c| {
                c.submitter.id == submitter_id
                    && c.verification_status == VerificationStatus::Verified
            })
            .count())
    }
}

fn persistence(path: &Path, err: impl std::fmt::Display) -> CatchError {
    CatchError::PersistenceFailure { reason: format!("{}: {}", path.display(), err) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::review_catch;
    use catchcheck_core::models::{CatchDraft, GroundRef, Submitter};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn create_test_catch(status: VerificationStatus) -> Catch {
        let mut draft = CatchDraft::default();
        draft.species = "Pike".to_string();
        draft.ground = Some(GroundRef::Catalog {
            id: "3-1370-1-1".to_string(),
            name: "Ružiná".to_string(),
        });
        let submitter =
            Submitter { id: "u1".to_string(), name: "Jano".to_string(), avatar: String::new() };
        let mut record = Catch::from_draft(&draft, submitter).unwrap();
        record.verification_status = status;
        record
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileCatchStore::new(dir.path().join("catches.json"));

        assert!(store.list().await.unwrap().is_empty());
        assert_eq!(store.verified_count("u1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_save_persists_across_instances() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("catches.json");
        let record = create_test_catch(VerificationStatus::Verified);

        JsonFileCatchStore::new(&path).save(&record).await.unwrap();

        let reopened = JsonFileCatchStore::new(&path);
        assert_eq!(reopened.get(record.id).await.unwrap(), Some(record));
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[tokio::test]
    async fn test_duplicate_save_fails() {
        let dir = TempDir::new().unwrap();
        let store = JsonFileCatchStore::new(dir.path().join("catches.json"));
        let record = create_test_catch(VerificationStatus::Pending);

        store.save(&record).await.unwrap();
        assert!(matches!(
            store.save(&record).await,
            Err(CatchError::PersistenceFailure { .. })
        ));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_persistence_failure() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catches.json");
        std::fs::write(&path, "{ not an array").unwrap();

        let store = JsonFileCatchStore::new(&path);
        let err = store.save(&create_test_catch(VerificationStatus::Pending)).await.unwrap_err();

        assert!(matches!(err, CatchError::PersistenceFailure { .. }));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not an array");
    }

    #[tokio::test]
    async fn test_review_is_written_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catches.json");
        let store = JsonFileCatchStore::new(&path);
        let mut record = create_test_catch(VerificationStatus::Pending);
        record.is_suspicious = true;
        store.save(&record).await.unwrap();

        review_catch(&store, record.id, false).await.unwrap();

        let stored = JsonFileCatchStore::new(&path).get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.verification_status, VerificationStatus::Rejected);
        assert!(!stored.is_suspicious);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_concurrent_reviews_apply_once() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(JsonFileCatchStore::new(dir.path().join("catches.json")));
        let record = create_test_catch(VerificationStatus::Pending);
        store.save(&record).await.unwrap();
        let id = record.id;

        let approve = tokio::spawn({
            let store = Arc::clone(&store);
            async move { review_catch(&*store, id, true).await }
        });
        let reject = tokio::spawn({
            let store = Arc::clone(&store);
            async move { review_catch(&*store, id, false).await }
        });
        let results = [approve.await.unwrap(), reject.await.unwrap()];

        let applied: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
        assert_eq!(applied.len(), 1);
        for result in &results {
            if let Err(e) = result {
                assert!(matches!(e, CatchError::InvalidTransition { .. }));
            }
        }
        let stored = store.get(record.id).await.unwrap().unwrap();
        assert_eq!(stored.verification_status, applied[0].verification_status);
    }
}
