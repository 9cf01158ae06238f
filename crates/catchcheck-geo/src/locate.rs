//! Deadline-bounded device geolocation
//!
//! GPS fixes may never arrive, so every acquisition races a timer. The
//! provider future is dropped when the deadline wins, and the timer is
//! dropped when the provider wins.

use std::time::Duration;

use async_trait::async_trait;
use catchcheck_core::error::{CatchError, Result};
use catchcheck_core::models::Coordinate;
use serde::Serialize;
use thiserror::Error;

/// Why the provider could not produce a position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GeolocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable")]
    Unavailable,
}

/// Port for a one-shot device position request
///
/// Providers do not need to enforce a timeout; [`acquire_position`] does.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn current_position(&self) -> std::result::Result<Coordinate, GeolocationError>;
}

/// Result of racing the provider against the deadline
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "coordinate", rename_all = "snake_case")]
pub enum LocationOutcome {
    Resolved(Coordinate),
    TimedOut,
    Denied,
    Unavailable,
}

impl LocationOutcome {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            LocationOutcome::Resolved(coordinate) => Some(*coordinate),
            _ => None,
        }
    }

    /// Convert into a coordinate or a `LocationUnavailable` error with
    /// guidance for manual ground selection
    pub fn into_result(self) -> Result<Coordinate> {
        let (reason, remediation) = match self {
            LocationOutcome::Resolved(coordinate) => return Ok(coordinate),
            LocationOutcome::TimedOut => (
                "GPS signal is weak, no fix before the deadline",
                "select the fishing ground manually from the list",
            ),
            LocationOutcome::Denied => (
                "location permission denied",
                "allow location access and try again, or select the ground manually",
            ),
            LocationOutcome::Unavailable => (
                "position unavailable",
                "enable GPS and try again, or select the ground manually",
            ),
        };
        Err(CatchError::LocationUnavailable {
            reason: reason.to_string(),
            remediation: remediation.to_string(),
        })
    }
}

/// Request a position, giving up after `deadline`
pub async fn acquire_position(
    provider: &dyn GeolocationProvider,
    deadline: Duration,
) -> LocationOutcome {
    let outcome = match tokio::time::timeout(deadline, provider.current_position()).await {
        Ok(Ok(coordinate)) if coordinate.is_valid() => LocationOutcome::Resolved(coordinate),
        Ok(Ok(coordinate)) => {
            tracing::warn!(%coordinate, "provider returned an out-of-range position");
            LocationOutcome::Unavailable
        }
        Ok(Err(GeolocationError::PermissionDenied)) => LocationOutcome::Denied,
        Ok(Err(GeolocationError::Unavailable)) => LocationOutcome::Unavailable,
        Err(_) => LocationOutcome::TimedOut,
    };

    match &outcome {
        LocationOutcome::Resolved(coordinate) => tracing::debug!(%coordinate, "position acquired"),
        other => tracing::warn!(outcome = ?other, ?deadline, "position not acquired"),
    }
    outcome
}

/// Provider that always reports the same answer
///
/// Used where no device GPS exists, e.g. when the position is passed on the
/// command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Option<Coordinate>);

#[async_trait]
impl GeolocationProvider for FixedPosition {
    async fn current_position(&self) -> std::result::Result<Coordinate, GeolocationError> {
        self.0.ok_or(GeolocationError::Unavailable)
    }
}
