//! Per-session state shared by successive submission flows

use catchcheck_core::models::{Coordinate, Submitter};
use catchcheck_geo::LocationOutcome;

use crate::flow::DraftId;

/// State that outlives a single draft
///
/// The device is asked for its position automatically only once per
/// session; later flows start from the last known fix and the user can
/// still request a refresh explicitly.
#[derive(Debug, Clone)]
pub struct SessionContext {
    submitter: Submitter,
    location_requested: bool,
    location_denied: bool,
    last_fix: Option<Coordinate>,
    next_draft: u64,
}

impl SessionContext {
    pub fn new(submitter: Submitter) -> Self {
        Self {
            submitter,
            location_requested: false,
            location_denied: false,
            last_fix: None,
            next_draft: 1,
        }
    }

    pub fn submitter(&self) -> &Submitter {
        &self.submitter
    }

    /// Whether a newly opened flow should request the device position
    pub fn should_auto_locate(&self) -> bool {
        !self.location_requested
    }

    pub fn location_denied(&self) -> bool {
        self.location_denied
    }

    pub fn last_fix(&self) -> Option<Coordinate> {
        self.last_fix
    }

    pub(crate) fn mark_location_requested(&mut self) {
        self.location_requested = true;
    }

    /// Remember the result of a location request
    pub fn record_location(&mut self, outcome: &LocationOutcome) {
        self.location_requested = true;
        match outcome {
            LocationOutcome::Resolved(coordinate) => {
                self.last_fix = Some(*coordinate);
                self.location_denied = false;
            }
            LocationOutcome::Denied => self.location_denied = true,
            LocationOutcome::TimedOut | LocationOutcome::Unavailable => {}
        }
    }

    pub(crate) fn next_draft_id(&mut self) -> DraftId {
        let id = DraftId(self.next_draft);
        self.next_draft += 1;
        id
    }
}
