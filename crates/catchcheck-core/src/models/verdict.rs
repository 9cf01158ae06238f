use serde::{Deserialize, Serialize};
use std::fmt;

/// Structured judgment of the image oracle about one submitted photo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleVerdict {
    /// `false` is a hard rejection, independent of `is_suspicious`
    pub is_fish: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub species: Option<String>,

    /// Estimated length in centimetres
    #[serde(default, alias = "length", skip_serializing_if = "Option::is_none")]
    pub estimated_length: Option<f64>,

    /// Estimated weight in kilograms
    #[serde(default, alias = "weight", skip_serializing_if = "Option::is_none")]
    pub estimated_weight: Option<f64>,

    pub is_suspicious: bool,

    #[serde(default, alias = "fraudReason", skip_serializing_if = "Option::is_none")]
    pub suspicion_reason: Option<String>,

    #[serde(default, alias = "detectedObject", skip_serializing_if = "Option::is_none")]
    pub detected_object_label: Option<String>,
}

impl OracleVerdict {
    /// Conservative verdict used when the oracle could not be consulted.
    ///
    /// Lets the submission proceed but always routes it to manual review.
    pub fn fail_closed() -> Self {
        Self {
            is_fish: true,
            species: None,
            estimated_length: None,
            estimated_weight: None,
            is_suspicious: true,
            suspicion_reason: None,
            detected_object_label: None,
        }
    }

    /// Label shown to the user when the photo is rejected
    pub fn rejection_label(&self) -> &str {
        self.detected_object_label
            .as_deref()
            .filter(|label| !label.trim().is_empty())
            .unwrap_or("unknown object")
    }
}

/// Task mode requested from the oracle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisMode {
    /// Species identification plus fraud screening of a catch photo
    SpeciesCheck,
    /// Fish health diagnostic
    HealthDiagnostic,
    /// Nearest named fishing ground for a coordinate
    ProximityLookup,
}

impl fmt::Display for AnalysisMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AnalysisMode::SpeciesCheck => "species check",
            AnalysisMode::HealthDiagnostic => "health diagnostic",
            AnalysisMode::ProximityLookup => "proximity lookup",
        };
        f.write_str(name)
    }
}

/// Health condition reported by the diagnostic mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Injured,
    Parasites,
    Invasive,
}

/// Result of the oracle's health-diagnostic mode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    pub species: String,
    pub health_status: HealthStatus,
    pub diagnostic: String,
    pub recommendation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_closed_is_suspicious_fish() {
        let verdict = OracleVerdict::fail_closed();
        assert!(verdict.is_fish);
        assert!(verdict.is_suspicious);
        assert!(verdict.species.is_none());
    }

    #[test]
    fn test_deserialize_accepts_short_field_names() {
        let verdict: OracleVerdict = serde_json::from_str(
            r#"{"isFish":false,"isSuspicious":false,"detectedObject":"boot","length":0}"#,
        )
        .unwrap();
        assert!(!verdict.is_fish);
        assert_eq!(verdict.detected_object_label.as_deref(), Some("boot"));
        assert_eq!(verdict.estimated_length, Some(0.0));
    }

    #[test]
    fn test_rejection_label_fallback() {
        let mut verdict = OracleVerdict::fail_closed();
        assert_eq!(verdict.rejection_label(), "unknown object");
        verdict.detected_object_label = Some("  ".to_string());
        assert_eq!(verdict.rejection_label(), "unknown object");
        verdict.detected_object_label = Some("beer can".to_string());
        assert_eq!(verdict.rejection_label(), "beer can");
    }

    #[test]
    fn test_health_status_wire_format() {
        let json = serde_json::to_string(&HealthStatus::Parasites).unwrap();
        assert_eq!(json, "\"parasites\"");
    }
}
