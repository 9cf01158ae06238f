use catchcheck_core::models::{
    Catch, Coordinate, GroundSuggestion, HealthReport, OracleVerdict, VerificationStatus,
};
use catchcheck_core::verification::Decision;
use catchcheck_geo::{LocationOutcome, RankedGround};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Output for grounds command
#[derive(Debug, Serialize)]
pub struct GroundsOutput {
    pub origin: Coordinate,
    pub query: String,
    pub grounds: Vec<RankedGround>,
    pub suggestion: Option<GroundSuggestion>,
}

/// Output for analyze command
#[derive(Debug, Serialize)]
pub struct AnalyzeOutput {
    pub model: String,
    pub width: u32,
    pub height: u32,
    pub compressed_bytes: usize,
    pub verdict: OracleVerdict,
    pub degraded: bool,
    pub decision: Decision,
}

/// Output for analyze --health
#[derive(Debug, Serialize)]
pub struct HealthOutput {
    pub model: String,
    pub report: HealthReport,
}

/// Output for submit command
#[derive(Debug, Serialize)]
pub struct SubmitOutput {
    pub catch: CatchSummary,
    pub location: Option<LocationOutcome>,
    pub analysis_degraded: bool,
    pub verified_catches: usize,
}

/// Output for list command
#[derive(Debug, Serialize)]
pub struct ListOutput {
    pub catches: Vec<CatchSummary>,
}

/// Stored catch without the photo payload
#[derive(Debug, Serialize)]
pub struct CatchSummary {
    pub id: String,
    pub submitter_id: String,
    pub species: String,
    pub length: f64,
    pub weight: f64,
    pub location_name: String,
    pub ground_id: Option<String>,
    pub coordinates: Option<Coordinate>,
    pub competition_id: Option<String>,
    pub has_photo: bool,
    pub verification_status: VerificationStatus,
    pub is_suspicious: bool,
    pub suspicion_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Catch> for CatchSummary {
    fn from(record: &Catch) -> Self {
        Self {
            id: record.id.to_string(),
            submitter_id: record.submitter.id.clone(),
            species: record.species.clone(),
            length: record.length,
            weight: record.weight,
            location_name: record.location_name.clone(),
            ground_id: record.ground_id.clone(),
            coordinates: (!record.is_location_private).then_some(record.coordinates),
            competition_id: record.competition_id.clone(),
            has_photo: record.image.is_some(),
            verification_status: record.verification_status,
            is_suspicious: record.is_suspicious,
            suspicion_reason: record.suspicion_reason.clone(),
            created_at: record.created_at,
        }
    }
}

/// Configuration value with source information
#[derive(Debug, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}

/// Output for config command
#[derive(Debug, Serialize)]
pub struct ConfigOutput {
    pub entries: Vec<ConfigEntry>,
    pub api_key_set: bool,
}
