//! Fail-closed access to the oracle
//!
//! This is the only place where an oracle failure is turned into the
//! synthetic review-requiring verdict.

use catchcheck_core::models::OracleVerdict;
use serde::{Deserialize, Serialize};

use crate::ports::ImageOracle;

/// Verdict for one image, with a marker when it was synthesized
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub verdict: OracleVerdict,

    /// `true` when the oracle failed and `verdict` is the fail-closed fallback
    pub degraded: bool,
}

/// Analyze an image, absorbing any oracle failure
///
/// On error the submission is allowed to continue with
/// `OracleVerdict::fail_closed()`, which always requires manual review.
pub async fn analyze_fail_closed(
    oracle: &dyn ImageOracle,
    image: &[u8],
    mime_type: &str,
) -> AnalysisOutcome {
    match oracle.analyze(image, mime_type).await {
        Ok(verdict) => {
            tracing::info!(
                model = oracle.model_name(),
                is_fish = verdict.is_fish,
                is_suspicious = verdict.is_suspicious,
                species = ?verdict.species,
                "image analyzed"
            );
            AnalysisOutcome { verdict, degraded: false }
        }
        Err(e) => {
            tracing::warn!(
                model = oracle.model_name(),
                error = %e,
                "image analysis failed, routing submission to manual review"
            );
            AnalysisOutcome { verdict: OracleVerdict::fail_closed(), degraded: true }
        }
    }
}
