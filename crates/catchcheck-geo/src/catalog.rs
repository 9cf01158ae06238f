//! Static fishing-ground catalog
//!
//! Loaded once at startup from either a JSON array of grounds or a GeoJSON
//! FeatureCollection of points, then shared read-only.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use catchcheck_core::error::{CatchError, Result};
use catchcheck_core::models::FishingGround;
use geojson::{feature::Id, Feature, GeoJson};
use serde_json::Value;

/// Immutable, cheaply cloneable ground catalog
#[derive(Debug, Clone, Default)]
pub struct GroundCatalog {
    grounds: Arc<[FishingGround]>,
}

impl GroundCatalog {
    /// Build a catalog from grounds, validating ids and coordinates
    pub fn from_grounds(grounds: Vec<FishingGround>) -> Result<Self> {
        Self::validated(grounds, Path::new("<inline>"))
    }

    /// Load a catalog file (JSON array or GeoJSON FeatureCollection)
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&content).map_err(|e| invalid(path, e))?;

        let grounds = if value.get("type").and_then(Value::as_str) == Some("FeatureCollection") {
            parse_feature_collection(value, path)?
        } else {
            serde_json::from_value(value).map_err(|e| invalid(path, e))?
        };

        let catalog = Self::validated(grounds, path)?;
        tracing::info!(path = %path.display(), grounds = catalog.len(), "ground catalog loaded");
        Ok(catalog)
    }

    fn validated(grounds: Vec<FishingGround>, path: &Path) -> Result<Self> {
        let mut seen = HashSet::new();
        for ground in &grounds {
            if ground.id.trim().is_empty() || ground.name.trim().is_empty() {
                let reason = format!("ground '{}' has an empty id or name", ground.id);
                return Err(invalid(path, reason));
            }
            if !ground.coordinate().is_valid() {
                let reason = format!(
                    "ground '{}' has invalid coordinates {}",
                    ground.id,
                    ground.coordinate()
                );
                return Err(invalid(path, reason));
            }
            if !seen.insert(ground.id.as_str()) {
                return Err(invalid(path, format!("duplicate ground id '{}'", ground.id)));
            }
        }
        Ok(Self { grounds: grounds.into() })
    }

    pub fn grounds(&self) -> &[FishingGround] {
        &self.grounds
    }

    pub fn len(&self) -> usize {
        self.grounds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.grounds.is_empty()
    }

    /// Exact lookup by catalog id
    pub fn find(&self, id: &str) -> Option<&FishingGround> {
        self.grounds.iter().find(|g| g.id == id)
    }

    /// Case-insensitive lookup by display name
    pub fn find_by_name(&self, name: &str) -> Option<&FishingGround> {
        let name = name.trim().to_lowercase();
        self.grounds.iter().find(|g| g.name.to_lowercase() == name)
    }
}

fn parse_feature_collection(value: Value, path: &Path) -> Result<Vec<FishingGround>> {
    let geojson = GeoJson::from_json_value(value).map_err(|e| invalid(path, e))?;
    let GeoJson::FeatureCollection(collection) = geojson else {
        return Err(invalid(path, "expected a FeatureCollection"));
    };

    collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| {
            feature_to_ground(feature)
                .map_err(|reason| invalid(path, format!("feature {}: {}", index, reason)))
        })
        .collect()
}

fn feature_to_ground(feature: &Feature) -> std::result::Result<FishingGround, String> {
    let geometry = feature.geometry.as_ref().ok_or("missing geometry")?;
    let geojson::Value::Point(position) = &geometry.value else {
        return Err("geometry is not a Point".to_string());
    };
    let (longitude, latitude) = match position.as_slice() {
        [lng, lat] => (*lng, *lat),
        _ => return Err("point must have exactly two coordinates".to_string()),
    };

    let id = match (feature.property("id"), &feature.id) {
        (Some(Value::String(id)), _) => id.clone(),
        (Some(Value::Number(n)), _) => n.to_string(),
        (_, Some(Id::String(id))) => id.clone(),
        (_, Some(Id::Number(n))) => n.to_string(),
        _ => return Err("missing id".to_string()),
    };

    let text = |key: &str| {
        feature.property(key).and_then(Value::as_str).unwrap_or_default().to_string()
    };

    Ok(FishingGround { id, name: text("name"), region: text("region"), latitude, longitude })
}

fn invalid(path: &Path, reason: impl ToString) -> CatchError {
    CatchError::CatalogInvalid { path: PathBuf::from(path), reason: reason.to_string() }
}
