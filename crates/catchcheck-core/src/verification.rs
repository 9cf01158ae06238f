//! Verification engine
//!
//! Decides whether a submission is auto-accepted, queued for manual review,
//! or blocked before any record is created.

use serde::{Deserialize, Serialize};

use crate::error::{CatchError, Result};
use crate::models::{CatchDraft, OracleVerdict, VerificationStatus};

/// Outcome of the verification rules for one submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "lowercase")]
pub enum Decision {
    /// The photo is not a fish; no record may be created
    Blocked { detected_object: String },
    /// A record is created with this status
    Record(VerificationStatus),
}

impl Decision {
    pub fn status(&self) -> Option<VerificationStatus> {
        match self {
            Decision::Blocked { .. } => None,
            Decision::Record(status) => Some(*status),
        }
    }

    /// Convert into the status to persist, or `RejectedContent` when blocked
    pub fn into_status(self) -> Result<VerificationStatus> {
        match self {
            Decision::Blocked { detected_object } => {
                Err(CatchError::RejectedContent { detected_object })
            }
            Decision::Record(status) => Ok(status),
        }
    }
}

/// Compute the verification decision
///
/// `verdict` is `None` only when no image was attached. Rules, in order:
/// a verdict with `is_fish == false` blocks the submission; competition
/// entries and suspicious verdicts go to `Pending`; everything else is
/// `Verified`.
pub fn compute_status(verdict: Option<&OracleVerdict>, has_competition_entry: bool) -> Decision {
    match verdict {
        Some(v) if !v.is_fish => {
            Decision::Blocked { detected_object: v.rejection_label().to_string() }
        }
        None if has_competition_entry => Decision::Record(VerificationStatus::Pending),
        None => Decision::Record(VerificationStatus::Verified),
        Some(v) if v.is_suspicious || has_competition_entry => {
            Decision::Record(VerificationStatus::Pending)
        }
        Some(_) => Decision::Record(VerificationStatus::Verified),
    }
}

/// Compute the decision for a draft
///
/// A draft that carries an image but no verdict is judged with the
/// fail-closed verdict, so it can never be auto-verified.
pub fn decide_for_draft(draft: &CatchDraft) -> Decision {
    let fallback;
    let verdict = match (&draft.image, &draft.verdict) {
        (_, Some(verdict)) => Some(verdict),
        (Some(_), None) => {
            fallback = OracleVerdict::fail_closed();
            Some(&fallback)
        }
        (None, None) => None,
    };
    compute_status(verdict, draft.has_competition_entry())
}

/// Apply an administrator review decision
///
/// Only `Pending` records can be reviewed.
pub fn review(current: VerificationStatus, approve: bool) -> Result<VerificationStatus> {
    match current {
        VerificationStatus::Pending if approve => Ok(VerificationStatus::Verified),
        VerificationStatus::Pending => Ok(VerificationStatus::Rejected),
        from => Err(CatchError::InvalidTransition { from }),
    }
}
