//! Error types for catch submission

use std::path::PathBuf;
use thiserror::Error;

use crate::models::VerificationStatus;

#[derive(Debug, Error)]
pub enum CatchError {
    // Location errors
    #[error("Location unavailable: {reason}. Try: {remediation}")]
    LocationUnavailable { reason: String, remediation: String },

    // Oracle errors
    #[error("Image analysis unavailable: {reason}")]
    OracleUnavailable { reason: String },

    #[error("Submission rejected: detected object \"{detected_object}\" is not a fish")]
    RejectedContent { detected_object: String },

    // Image errors
    #[error("Invalid image: {reason}")]
    InvalidImage { reason: String },

    // Submission errors
    #[error("Submission not ready: missing {missing}")]
    SubmitNotReady { missing: String },

    #[error("No active draft. The submission flow was abandoned or already finalized")]
    NoActiveDraft,

    #[error("Invalid status transition from {from:?}")]
    InvalidTransition { from: VerificationStatus },

    // Persistence errors
    #[error("Failed to persist catch: {reason}")]
    PersistenceFailure { reason: String },

    #[error("Catch not found: {id}")]
    CatchNotFound { id: String },

    // Catalog errors
    #[error("Unknown fishing ground: {id}")]
    UnknownGround { id: String },

    #[error("Invalid ground catalog at {path}: {reason}")]
    CatalogInvalid { path: PathBuf, reason: String },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CatchError {
    /// Whether the user can retry within the same flow without retaking the photo
    pub fn is_retriable(&self) -> bool {
        !matches!(self, CatchError::RejectedContent { .. })
    }
}

impl From<serde_json::Error> for CatchError {
    fn from(err: serde_json::Error) -> Self {
        CatchError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CatchError>;
