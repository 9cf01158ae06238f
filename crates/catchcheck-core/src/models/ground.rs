use serde::{Deserialize, Serialize};

use super::Coordinate;

/// Registered fishing ground from the reference catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FishingGround {
    /// Stable catalog identifier (e.g. "3-1370-1-1")
    pub id: String,

    /// Display name
    pub name: String,

    /// Administrative region or owning organisation
    #[serde(default)]
    pub region: String,

    #[serde(alias = "lat")]
    pub latitude: f64,

    #[serde(alias = "lng")]
    pub longitude: f64,
}

impl FishingGround {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Case-insensitive substring match on name or id
    ///
    /// `needle` must already be lower-cased.
    pub fn matches(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle) || self.id.to_lowercase().contains(needle)
    }
}

/// Best-guess ground returned by the oracle's proximity lookup
///
/// The name may refer to a ground that is not in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundSuggestion {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ground(id: &str, name: &str) -> FishingGround {
        FishingGround {
            id: id.to_string(),
            name: name.to_string(),
            region: "MsO Žilina".to_string(),
            latitude: 49.2,
            longitude: 18.7,
        }
    }

    #[test]
    fn test_matches_name_case_insensitive() {
        let g = ground("4-0350-1-1", "Váh č. 19");
        assert!(g.matches("váh"));
        assert!(g.matches("č. 19"));
        assert!(!g.matches("hron"));
    }

    #[test]
    fn test_matches_id() {
        let g = ground("4-0350-1-1", "Váh");
        assert!(g.matches("0350"));
    }

    #[test]
    fn test_deserialize_short_keys() {
        let g: FishingGround =
            serde_json::from_str(r#"{"id":"A","name":"Hron","lat":48.1,"lng":19.2}"#).unwrap();
        assert_eq!(g.coordinate(), Coordinate::new(48.1, 19.2));
        assert_eq!(g.region, "");
    }
}
