//! Catch submission state machine
//!
//! A flow owns one draft and moves it through
//! `Idle → Capturing → Compressing → Analyzing → Resolving → Assembling →
//! Saving → {Succeeded | Failed}`.
//!
//! Slow work (image analysis, geolocation) is split into `begin_*` calls that
//! hand out a ticket, `run_*` functions that do not borrow the flow, and
//! `apply_*` calls that write the result back. Every ticket carries the
//! draft id and a sequence number; results for an abandoned draft or a
//! superseded request are discarded.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use catchcheck_core::config::LayeredConfig;
use catchcheck_core::error::{CatchError, Result};
use catchcheck_core::models::catch::DEFAULT_DRAFT_POSITION;
use catchcheck_core::models::{Catch, CatchDraft, Coordinate, GroundRef, ImageAttachment};
use catchcheck_geo::{
    acquire_position, GeolocationProvider, GroundResolver, LocationOutcome, RankedGround,
};
use catchcheck_oracle::{analyze_fail_closed, AnalysisOutcome, ImageOracle};
use catchcheck_store::CatchStore;
use serde::Serialize;

use crate::compress::{compress_image, CompressionSettings};
use crate::session::SessionContext;

/// Identifies one opened draft within a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct DraftId(pub(crate) u64);

impl fmt::Display for DraftId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "draft-{}", self.0)
    }
}

/// Stage of the submission pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Capturing,
    Compressing,
    Analyzing,
    Resolving,
    Assembling,
    Saving,
    Succeeded,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Capturing => "capturing",
            Phase::Compressing => "compressing",
            Phase::Analyzing => "analyzing",
            Phase::Resolving => "resolving",
            Phase::Assembling => "assembling",
            Phase::Saving => "saving",
            Phase::Succeeded => "succeeded",
            Phase::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Whether a completed background result was written to the draft
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    /// The draft was abandoned or a newer request superseded this one
    Discarded,
}

/// Collaborators the flow talks to
#[derive(Clone)]
pub struct FlowServices {
    pub resolver: GroundResolver,
    pub oracle: Arc<dyn ImageOracle>,
    pub locator: Arc<dyn GeolocationProvider>,
    pub store: Arc<dyn CatchStore>,
}

/// Tunables for a flow
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowSettings {
    pub compression: CompressionSettings,
    pub location_timeout: Duration,
}

impl Default for FlowSettings {
    fn default() -> Self {
        Self {
            compression: CompressionSettings::default(),
            location_timeout: Duration::from_secs(20),
        }
    }
}

impl FlowSettings {
    pub fn from_config(config: &LayeredConfig) -> Self {
        Self {
            compression: CompressionSettings::from_config(config),
            location_timeout: config.location_timeout(),
        }
    }
}

/// Pending image analysis for one capture
pub struct AnalysisTicket {
    draft: DraftId,
    sequence: u64,
    image: ImageAttachment,
    oracle: Arc<dyn ImageOracle>,
}

impl AnalysisTicket {
    pub fn draft_id(&self) -> DraftId {
        self.draft
    }

    pub fn sequence(&self) -> u64 {
        self.sequence
    }
}

/// Result of [`run_analysis`], to be passed to [`SubmissionFlow::apply_analysis`]
#[derive(Debug, Clone)]
pub struct CompletedAnalysis {
    draft: DraftId,
    sequence: u64,
    pub outcome: AnalysisOutcome,
}

/// Pending device position request
pub struct LocationTicket {
    draft: DraftId,
    sequence: u64,
    deadline: Duration,
    locator: Arc<dyn GeolocationProvider>,
    resolver: GroundResolver,
}

impl LocationTicket {
    pub fn draft_id(&self) -> DraftId {
        self.draft
    }
}

/// Result of [`run_location`], to be passed to [`SubmissionFlow::apply_location`]
#[derive(Debug, Clone)]
pub struct CompletedLocation {
    draft: DraftId,
    sequence: u64,
    pub outcome: LocationOutcome,
    /// Nearest ground suggested for the acquired position
    pub ground: Option<GroundRef>,
}

/// Analyze the captured image; oracle failures yield the fail-closed verdict
pub async fn run_analysis(ticket: AnalysisTicket) -> CompletedAnalysis {
    let image = &ticket.image;
    let outcome = analyze_fail_closed(ticket.oracle.as_ref(), &image.bytes, &image.mime_type).await;
    CompletedAnalysis { draft: ticket.draft, sequence: ticket.sequence, outcome }
}

/// Acquire the device position and look up the nearest ground
pub async fn run_location(ticket: LocationTicket) -> CompletedLocation {
    let outcome = acquire_position(ticket.locator.as_ref(), ticket.deadline).await;
    let ground = match outcome.coordinate() {
        Some(at) => ticket
            .resolver
            .resolve_nearest(at)
            .await
            .map(|suggestion| ticket.resolver.to_ground_ref(&suggestion)),
        None => None,
    };
    CompletedLocation { draft: ticket.draft, sequence: ticket.sequence, outcome, ground }
}

/// Orchestrates a single catch draft from capture to storage
pub struct SubmissionFlow {
    session: SessionContext,
    services: FlowServices,
    settings: FlowSettings,
    draft_id: DraftId,
    draft: Option<CatchDraft>,
    phase: Phase,
    capture_seq: u64,
    location_seq: u64,
    location_pending: bool,
    ground_chosen: bool,
    last_error: Option<CatchError>,
}

impl SubmissionFlow {
    /// Open a new draft with default field values
    ///
    /// The draft starts at the session's last known position, if any.
    pub fn open(
        mut session: SessionContext,
        services: FlowServices,
        settings: FlowSettings,
    ) -> Self {
        let mut draft = CatchDraft::default();
        if let Some(fix) = session.last_fix() {
            draft.coordinates = fix;
        }
        let draft_id = session.next_draft_id();
        tracing::info!(
            draft = %draft_id,
            submitter = %session.submitter().id,
            "submission flow opened"
        );

        Self {
            session,
            services,
            settings,
            draft_id,
            draft: Some(draft),
            phase: Phase::Idle,
            capture_seq: 0,
            location_seq: 0,
            location_pending: false,
            ground_chosen: false,
            last_error: None,
        }
    }

    pub fn draft_id(&self) -> DraftId {
        self.draft_id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Most recent error surfaced by the flow
    pub fn last_error(&self) -> Option<&CatchError> {
        self.last_error.as_ref()
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Give the session back, e.g. to open the next flow
    pub fn into_session(self) -> SessionContext {
        self.session
    }

    /// Whether the device position should be requested on entry
    pub fn should_auto_locate(&self) -> bool {
        self.session.should_auto_locate()
    }

    pub fn is_locating(&self) -> bool {
        self.location_pending
    }

    pub fn draft(&self) -> Option<&CatchDraft> {
        self.draft.as_ref()
    }

    /// Mutable access for user field edits
    pub fn draft_mut(&mut self) -> Result<&mut CatchDraft> {
        self.draft.as_mut().ok_or(CatchError::NoActiveDraft)
    }

    // Location

    /// Start a position request; a newer request supersedes older ones
    pub fn begin_location(&mut self) -> Result<LocationTicket> {
        if self.draft.is_none() {
            return Err(CatchError::NoActiveDraft);
        }
        self.location_seq += 1;
        self.location_pending = true;
        self.session.mark_location_requested();

        Ok(LocationTicket {
            draft: self.draft_id,
            sequence: self.location_seq,
            deadline: self.settings.location_timeout,
            locator: Arc::clone(&self.services.locator),
            resolver: self.services.resolver.clone(),
        })
    }

    /// Write a position result to the draft
    ///
    /// A suggested ground is only applied when the user has not picked one
    /// manually. Failures are surfaced through [`SubmissionFlow::last_error`]
    /// and leave the draft as it was. Superseded results and results for an
    /// abandoned draft change neither the draft nor the session.
    pub fn apply_location(&mut self, done: CompletedLocation) -> Applied {
        if done.sequence != self.location_seq {
            tracing::debug!(
                draft = %done.draft,
                sequence = done.sequence,
                "superseded location result discarded"
            );
            return Applied::Discarded;
        }
        let draft = match self.draft.as_mut() {
            Some(draft) if done.draft == self.draft_id => draft,
            _ => {
                tracing::debug!(
                    draft = %done.draft,
                    "location result for inactive draft discarded"
                );
                return Applied::Discarded;
            }
        };

        self.session.record_location(&done.outcome);
        self.location_pending = false;
        match done.outcome.into_result() {
            Ok(coordinate) => {
                draft.coordinates = coordinate;
                if let (Some(ground), false) = (done.ground, self.ground_chosen) {
                    tracing::info!(
                        draft = %self.draft_id,
                        ground = %ground.name(),
                        "nearest ground applied"
                    );
                    draft.ground = Some(ground);
                }
                if matches!(self.last_error, Some(CatchError::LocationUnavailable { .. })) {
                    self.last_error = None;
                }
            }
            Err(e) => self.last_error = Some(e),
        }

        if self.phase == Phase::Resolving {
            self.transition(Phase::Assembling);
        }
        Applied::Updated
    }

    /// Request the position and apply it in one step
    pub async fn locate(&mut self) -> Result<Applied> {
        let ticket = self.begin_location()?;
        let done = run_location(ticket).await;
        Ok(self.apply_location(done))
    }

    /// Catalog grounds around the draft position, nearest first
    pub fn search_grounds(&self, query: &str) -> Vec<RankedGround> {
        let origin = self
            .draft
            .as_ref()
            .map(|d| d.coordinates)
            .or_else(|| self.session.last_fix())
            .unwrap_or(DEFAULT_DRAFT_POSITION);
        self.services.resolver.search(origin, query)
    }

    /// Pick a catalog ground by id
    pub fn select_ground(&mut self, ground_id: &str) -> Result<()> {
        let ground = self
            .services
            .resolver
            .catalog()
            .find(ground_id)
            .map(GroundRef::from)
            .ok_or_else(|| CatchError::UnknownGround { id: ground_id.to_string() })?;
        self.draft_mut()?.ground = Some(ground);
        self.ground_chosen = true;
        Ok(())
    }

    /// Use a free-text location name; a blank name clears the location
    pub fn set_custom_location(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        let draft = self.draft_mut()?;
        draft.ground = (!name.is_empty()).then(|| GroundRef::Custom { name: name.to_string() });
        self.ground_chosen = true;
        Ok(())
    }

    /// Override the draft position, e.g. from a map pick
    pub fn set_coordinates(&mut self, at: Coordinate) -> Result<()> {
        if !at.is_valid() {
            return Err(CatchError::LocationUnavailable {
                reason: format!("coordinate {} is out of range", at),
                remediation: "select the fishing ground manually from the list".to_string(),
            });
        }
        self.draft_mut()?.coordinates = at;
        Ok(())
    }

    // Capture and analysis

    /// Compress a captured photo and attach it to the draft
    ///
    /// Any verdict for a previous photo is dropped and in-flight analysis
    /// of it becomes stale. An undecodable photo moves the flow to `Failed`
    /// without touching the draft.
    pub fn begin_capture(&mut self, raw: &[u8]) -> Result<AnalysisTicket> {
        if self.draft.is_none() {
            return Err(CatchError::NoActiveDraft);
        }
        self.transition(Phase::Capturing);
        self.transition(Phase::Compressing);

        let image = match compress_image(raw, self.settings.compression) {
            Ok(image) => image,
            Err(e) => {
                let reason = match e {
                    CatchError::InvalidImage { reason } => reason,
                    other => other.to_string(),
                };
                tracing::warn!(draft = %self.draft_id, %reason, "captured photo rejected");
                self.transition(Phase::Failed);
                return Err(self.record(|| CatchError::InvalidImage { reason: reason.clone() }));
            }
        };

        self.capture_seq += 1;
        if let Some(draft) = self.draft.as_mut() {
            draft.image = Some(image.clone());
            draft.verdict = None;
        }
        self.clear_image_error();
        self.transition(Phase::Analyzing);

        Ok(AnalysisTicket {
            draft: self.draft_id,
            sequence: self.capture_seq,
            image,
            oracle: Arc::clone(&self.services.oracle),
        })
    }

    /// Write an analysis verdict to the draft
    ///
    /// A fish verdict pre-fills species, length and weight. A non-fish
    /// verdict is kept so the draft cannot be submitted until the photo is
    /// replaced.
    pub fn apply_analysis(&mut self, done: CompletedAnalysis) -> Applied {
        let draft = match self.draft.as_mut() {
            Some(draft) if done.draft == self.draft_id && done.sequence == self.capture_seq => {
                draft
            }
            _ => {
                tracing::debug!(
                    draft = %done.draft,
                    sequence = done.sequence,
                    current = self.capture_seq,
                    "stale analysis result discarded"
                );
                return Applied::Discarded;
            }
        };

        let verdict = done.outcome.verdict;
        let rejection = (!verdict.is_fish).then(|| verdict.rejection_label().to_string());
        if rejection.is_none() {
            draft.prefill_from(&verdict);
        }
        draft.verdict = Some(verdict);

        match rejection {
            Some(detected_object) => {
                tracing::info!(
                    draft = %self.draft_id,
                    detected = %detected_object,
                    "photo is not a fish"
                );
                self.last_error = Some(CatchError::RejectedContent { detected_object });
            }
            None => self.clear_image_error(),
        }

        let next = if self.location_pending { Phase::Resolving } else { Phase::Assembling };
        self.transition(next);
        Applied::Updated
    }

    /// Capture, analyze and apply in one step
    pub async fn capture(&mut self, raw: &[u8]) -> Result<Applied> {
        let ticket = self.begin_capture(raw)?;
        let done = run_analysis(ticket).await;
        Ok(self.apply_analysis(done))
    }

    /// Remove the photo and its verdict
    pub fn clear_image(&mut self) -> Result<()> {
        let draft = self.draft_mut()?;
        draft.image = None;
        draft.verdict = None;
        self.capture_seq += 1;
        self.clear_image_error();
        if matches!(self.phase, Phase::Analyzing | Phase::Failed) {
            self.transition(Phase::Assembling);
        }
        Ok(())
    }

    // Submission

    /// The draft if it can be submitted, or the reason it cannot
    ///
    /// A rejected photo takes precedence over missing fields.
    pub fn readiness(&self) -> Result<&CatchDraft> {
        let draft = self.draft.as_ref().ok_or(CatchError::NoActiveDraft)?;

        let mut missing = draft.missing_fields();
        if draft.image.is_some() {
            match &draft.verdict {
                Some(verdict) if !verdict.is_fish => {
                    return Err(CatchError::RejectedContent {
                        detected_object: verdict.rejection_label().to_string(),
                    });
                }
                Some(_) => {}
                None => missing.push("photo analysis"),
            }
        }

        if !missing.is_empty() {
            return Err(CatchError::SubmitNotReady { missing: missing.join(", ") });
        }
        Ok(draft)
    }

    /// Whether [`SubmissionFlow::submit`] would be accepted
    pub fn can_submit(&self) -> bool {
        self.phase != Phase::Saving && self.readiness().is_ok()
    }

    /// Verify and store the draft
    ///
    /// A draft that is not ready is refused and nothing changes. On a
    /// storage failure the flow returns to `Assembling` with the draft
    /// intact; it is not retried automatically.
    pub async fn submit(&mut self) -> Result<Catch> {
        let draft = self.readiness()?;
        let record = Catch::from_draft(draft, self.session.submitter().clone())?;

        self.transition(Phase::Saving);
        let store = Arc::clone(&self.services.store);
        match store.save(&record).await {
            Ok(()) => {
                tracing::info!(
                    draft = %self.draft_id,
                    catch = %record.id,
                    status = %record.verification_status,
                    species = %record.species,
                    "catch stored"
                );
                self.draft = None;
                self.last_error = None;
                self.transition(Phase::Succeeded);
                Ok(record)
            }
            Err(e) => {
                let reason = match e {
                    CatchError::PersistenceFailure { reason } => reason,
                    other => other.to_string(),
                };
                tracing::warn!(draft = %self.draft_id, %reason, "catch could not be stored");
                self.transition(Phase::Assembling);
                Err(self.record(|| CatchError::PersistenceFailure { reason: reason.clone() }))
            }
        }
    }

    /// Drop the draft; results that arrive later are discarded
    pub fn abandon(&mut self) {
        if self.draft.take().is_some() {
            tracing::info!(
                draft = %self.draft_id,
                phase = %self.phase,
                "submission flow abandoned"
            );
        }
        self.location_pending = false;
        self.transition(Phase::Idle);
    }

    fn transition(&mut self, next: Phase) {
        if self.phase != next {
            tracing::debug!(
                draft = %self.draft_id,
                from = %self.phase,
                to = %next,
                "phase changed"
            );
            self.phase = next;
        }
    }

    fn clear_image_error(&mut self) {
        if matches!(
            self.last_error,
            Some(CatchError::RejectedContent { .. } | CatchError::InvalidImage { .. })
        ) {
            self.last_error = None;
        }
    }

    fn record(&mut self, make: impl Fn() -> CatchError) -> CatchError {
        self.last_error = Some(make());
        make()
    }
}
