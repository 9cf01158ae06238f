//! Oracle port definitions

use async_trait::async_trait;
use catchcheck_core::error::Result;
use catchcheck_core::models::{Coordinate, GroundSuggestion, HealthReport, OracleVerdict};

/// Port for an external image-analysis service
///
/// Implementations are untrusted and fallible. Every failure, including a
/// response that does not match the expected shape, is reported as
/// `CatchError::OracleUnavailable`.
#[async_trait]
pub trait ImageOracle: Send + Sync {
    /// Species identification and fraud screening of a catch photo
    ///
    /// # Arguments
    /// * `image` - Encoded image bytes
    /// * `mime_type` - MIME type of `image` (e.g. "image/jpeg")
    async fn analyze(&self, image: &[u8], mime_type: &str) -> Result<OracleVerdict>;

    /// Health diagnostic of the fish in a photo
    async fn diagnose(&self, image: &[u8], mime_type: &str) -> Result<HealthReport>;

    /// Best-guess named fishing ground nearest to a coordinate
    ///
    /// Returns `Ok(None)` when the service found no match.
    async fn nearest_ground(&self, at: Coordinate) -> Result<Option<GroundSuggestion>>;

    /// Get the name/identifier of the underlying model
    fn model_name(&self) -> &str;
}
