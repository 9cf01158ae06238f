//! Catchcheck Submit - Catch submission orchestration
//!
//! This crate drives a single catch draft from photo capture to a stored
//! record: image compression, fail-closed analysis, location resolution,
//! verification, and hand-off to the persistence collaborator.

pub mod compress;
pub mod flow;
pub mod session;

pub use compress::{compress_image, scaled_dimensions, CompressionSettings};
pub use flow::{
    run_analysis, run_location, AnalysisTicket, Applied, CompletedAnalysis, CompletedLocation,
    DraftId, FlowServices, FlowSettings, LocationTicket, Phase, SubmissionFlow,
};
pub use session::SessionContext;
