use async_trait::async_trait;
use catchcheck_core::error::{CatchError, Result};
use catchcheck_core::models::{Catch, CatchId, VerificationStatus};
use catchcheck_core::verification;

/// Port for durable catch storage
#[async_trait]
pub trait CatchStore: Send + Sync {
    /// Store a newly finalized catch
    async fn save(&self, record: &Catch) -> Result<()>;

    /// Retrieve a catch by ID
    async fn get(&self, id: CatchId) -> Result<Option<Catch>>;

    /// List all catches, newest first
    async fn list(&self) -> Result<Vec<Catch>>;

    /// Set the verification status and clear the suspicion flag
    ///
    /// The write only happens if the stored status still equals `expected`;
    /// otherwise `InvalidTransition` reports the status found. The check and
    /// the write are atomic with respect to other updates.
    async fn update_status(
        &self,
        id: CatchId,
        expected: VerificationStatus,
        status: VerificationStatus,
    ) -> Result<Catch>;

    /// Number of verified catches submitted by a user
    async fn verified_count(&self, submitter_id: &str) -> Result<usize>;
}

/// Apply an administrator review to a stored catch
///
/// Only pending catches can be reviewed. A concurrent review that lands
/// first makes this one fail with `InvalidTransition`.
pub async fn review_catch(store: &dyn CatchStore, id: CatchId, approve: bool) -> Result<Catch> {
    let current = store
        .get(id)
        .await?
        .ok_or_else(|| CatchError::CatchNotFound { id: id.to_string() })?;

    let status = verification::review(current.verification_status, approve)?;
    let updated = store.update_status(id, current.verification_status, status).await?;

    tracing::info!(catch = %id, %status, "catch reviewed");
    Ok(updated)
}
