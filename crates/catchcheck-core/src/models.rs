pub mod catch;
pub mod coordinate;
pub mod ground;
pub mod verdict;

pub use catch::{
    Catch, CatchDraft, CatchId, FishingMethod, GroundRef, ImageAttachment, Submitter,
    VerificationStatus, WaterClarity,
};
pub use coordinate::Coordinate;
pub use ground::{FishingGround, GroundSuggestion};
pub use verdict::{AnalysisMode, HealthReport, HealthStatus, OracleVerdict};
