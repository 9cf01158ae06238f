use chrono::{DateTime, Local, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{Coordinate, FishingGround, OracleVerdict};
use crate::error::{CatchError, Result};
use crate::verification::decide_for_draft;

/// Position used for a fresh draft until the device reports a fix
pub const DEFAULT_DRAFT_POSITION: Coordinate = Coordinate::new(48.66, 19.69);

/// Unique identifier for a finalized catch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CatchId(pub Uuid);

impl CatchId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for CatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for CatchId {
    type Err = CatchError;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s.trim()).map(CatchId).map_err(|_| CatchError::CatchNotFound {
            id: s.to_string(),
        })
    }
}

/// Lifecycle status of a persisted catch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Rejected,
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Rejected => "rejected",
        };
        f.write_str(name)
    }
}

/// Fishing technique
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FishingMethod {
    #[default]
    Spinning,
    Ledgering,
    Feeder,
    Float,
    FlyFishing,
    IceFishing,
}

impl FromStr for FishingMethod {
    type Err = CatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "spinning" => Ok(FishingMethod::Spinning),
            "ledgering" | "ledger" => Ok(FishingMethod::Ledgering),
            "feeder" => Ok(FishingMethod::Feeder),
            "float" => Ok(FishingMethod::Float),
            "fly-fishing" | "fly" => Ok(FishingMethod::FlyFishing),
            "ice-fishing" | "ice" => Ok(FishingMethod::IceFishing),
            _ => Err(CatchError::ConfigInvalid {
                key: "method".to_string(),
                reason: format!(
                    "Invalid fishing method: {}. \
                     Use spinning, ledgering, feeder, float, fly or ice",
                    s
                ),
            }),
        }
    }
}

/// Water clarity observed at the time of the catch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WaterClarity {
    #[default]
    Clear,
    SemiTurbid,
    Turbid,
    Muddy,
    AlgaeBloom,
}

impl FromStr for WaterClarity {
    type Err = CatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "clear" => Ok(WaterClarity::Clear),
            "semi-turbid" => Ok(WaterClarity::SemiTurbid),
            "turbid" => Ok(WaterClarity::Turbid),
            "muddy" => Ok(WaterClarity::Muddy),
            "algae-bloom" | "algae" => Ok(WaterClarity::AlgaeBloom),
            _ => Err(CatchError::ConfigInvalid {
                key: "water_clarity".to_string(),
                reason: format!(
                    "Invalid water clarity: {}. \
                     Use clear, semi-turbid, turbid, muddy or algae-bloom",
                    s
                ),
            }),
        }
    }
}

/// Where the catch was made
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GroundRef {
    /// Ground from the reference catalog
    Catalog { id: String, name: String },
    /// Ad-hoc location name not present in the catalog
    Custom { name: String },
}

impl GroundRef {
    pub fn name(&self) -> &str {
        match self {
            GroundRef::Catalog { name, .. } | GroundRef::Custom { name } => name,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            GroundRef::Catalog { id, .. } => Some(id),
            GroundRef::Custom { .. } => None,
        }
    }
}

impl From<&FishingGround> for GroundRef {
    fn from(ground: &FishingGround) -> Self {
        GroundRef::Catalog { id: ground.id.clone(), name: ground.name.clone() }
    }
}

/// Compressed photo attached to a draft
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAttachment {
    #[serde(with = "base64_bytes")]
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

impl fmt::Debug for ImageAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageAttachment")
            .field("bytes", &self.bytes.len())
            .field("mime_type", &self.mime_type)
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}

/// Identity of the angler submitting the catch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submitter {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub avatar: String,
}

/// In-progress, user-editable catch submission
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatchDraft {
    pub species: String,

    /// Length in centimetres
    pub length: Option<f64>,

    /// Weight in kilograms
    pub weight: Option<f64>,

    pub date: NaiveDate,
    pub time: NaiveTime,
    pub ground: Option<GroundRef>,
    pub coordinates: Coordinate,
    pub is_location_private: bool,
    pub bait: String,
    pub method: FishingMethod,

    /// Air temperature in °C
    pub temperature: f64,

    /// Atmospheric pressure in hPa
    pub pressure: f64,

    pub wind_speed: String,
    pub water_clarity: WaterClarity,
    pub competition_id: Option<String>,
    pub image: Option<ImageAttachment>,

    /// Verdict for the current image, if one has been analyzed
    pub verdict: Option<OracleVerdict>,
}

impl CatchDraft {
    /// Create a draft stamped with the given local date and time
    pub fn new(now: DateTime<Local>) -> Self {
        let time = now.time();
        Self {
            species: String::new(),
            length: None,
            weight: None,
            date: now.date_naive(),
            time: NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time),
            ground: None,
            coordinates: DEFAULT_DRAFT_POSITION,
            is_location_private: false,
            bait: String::new(),
            method: FishingMethod::default(),
            temperature: 15.0,
            pressure: 1013.0,
            wind_speed: "2".to_string(),
            water_clarity: WaterClarity::default(),
            competition_id: None,
            image: None,
            verdict: None,
        }
    }

    pub fn location_name(&self) -> Option<&str> {
        self.ground.as_ref().map(GroundRef::name).filter(|name| !name.trim().is_empty())
    }

    pub fn has_competition_entry(&self) -> bool {
        self.competition_id.as_deref().is_some_and(|id| !id.trim().is_empty())
    }

    /// Names of the fields that still block submission
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.species.trim().is_empty() {
            missing.push("species");
        }
        if self.location_name().is_none() {
            missing.push("location");
        }
        missing
    }

    /// Pre-fill species, length and weight from a positive verdict
    ///
    /// The verdict's species replaces the current one when present; length
    /// and weight are only filled when the user left them empty.
    pub fn prefill_from(&mut self, verdict: &OracleVerdict) {
        if !verdict.is_fish {
            return;
        }
        if let Some(species) = verdict.species.as_deref().filter(|s| !s.trim().is_empty()) {
            self.species = species.to_string();
        }
        if self.length.is_none() {
            self.length = verdict.estimated_length;
        }
        if self.weight.is_none() {
            self.weight = verdict.estimated_weight;
        }
    }
}

impl Default for CatchDraft {
    fn default() -> Self {
        Self::new(Local::now())
    }
}

/// Finalized catch record handed to persistence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catch {
    pub id: CatchId,
    pub submitter: Submitter,
    pub species: String,
    pub length: f64,
    pub weight: f64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub location_name: String,
    pub ground_id: Option<String>,
    pub coordinates: Coordinate,
    pub is_location_private: bool,
    pub bait: String,
    pub method: FishingMethod,
    pub temperature: f64,
    pub pressure: f64,
    pub wind_speed: String,
    pub water_clarity: WaterClarity,
    pub competition_id: Option<String>,
    pub image: Option<ImageAttachment>,
    pub likes: u32,
    pub comments_count: u32,
    pub verification_status: VerificationStatus,
    pub is_suspicious: bool,
    pub suspicion_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Catch {
    /// Build the immutable record from a completed draft
    ///
    /// The status comes from the verification rules. A photo judged not to
    /// be a fish yields `RejectedContent`, and a photo that has not been
    /// analyzed yet is refused as not ready.
    pub fn from_draft(draft: &CatchDraft, submitter: Submitter) -> Result<Self> {
        let mut missing = draft.missing_fields();
        if draft.image.is_some() && draft.verdict.is_none() {
            missing.push("photo analysis");
        }
        if !missing.is_empty() {
            return Err(CatchError::SubmitNotReady { missing: missing.join(", ") });
        }
        let status = decide_for_draft(draft).into_status()?;
        let ground = draft.ground.as_ref().ok_or_else(|| CatchError::SubmitNotReady {
            missing: "location".to_string(),
        })?;

        Ok(Self {
            id: CatchId::generate(),
            submitter,
            species: draft.species.trim().to_string(),
            length: draft.length.unwrap_or(0.0),
            weight: draft.weight.unwrap_or(0.0),
            date: draft.date,
            time: draft.time,
            location_name: ground.name().to_string(),
            ground_id: ground.id().map(str::to_string),
            coordinates: draft.coordinates,
            is_location_private: draft.is_location_private,
            bait: draft.bait.clone(),
            method: draft.method,
            temperature: draft.temperature,
            pressure: draft.pressure,
            wind_speed: draft.wind_speed.clone(),
            water_clarity: draft.water_clarity,
            competition_id: draft.competition_id.clone().filter(|id| !id.trim().is_empty()),
            image: draft.image.clone(),
            likes: 0,
            comments_count: 0,
            verification_status: status,
            is_suspicious: draft.verdict.as_ref().is_some_and(|v| v.is_suspicious),
            suspicion_reason: draft.verdict.as_ref().and_then(|v| v.suspicion_reason.clone()),
            created_at: Utc::now(),
        })
    }
}
