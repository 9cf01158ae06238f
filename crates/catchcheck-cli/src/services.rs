//! Wiring of the engine's ports to concrete adapters

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use catchcheck_core::config::{LayeredConfig, ORACLE_API_KEY_ENV};
use catchcheck_core::error::{CatchError, Result as CoreResult};
use catchcheck_core::models::{Coordinate, GroundSuggestion, HealthReport, OracleVerdict};
use catchcheck_geo::{GroundCatalog, GroundResolver};
use catchcheck_oracle::{GeminiOracle, ImageOracle};
use catchcheck_store::JsonFileCatchStore;

use crate::cli::PositionArgs;

/// Stand-in used when no API key is configured
///
/// Every call fails, so photos are routed to manual review and ground
/// suggestions fall back to the catalog search.
pub struct UnconfiguredOracle;

impl UnconfiguredOracle {
    fn unavailable() -> CatchError {
        CatchError::OracleUnavailable { reason: format!("{} is not set", ORACLE_API_KEY_ENV) }
    }
}

#[async_trait]
impl ImageOracle for UnconfiguredOracle {
    async fn analyze(&self, _image: &[u8], _mime_type: &str) -> CoreResult<OracleVerdict> {
        Err(Self::unavailable())
    }

    async fn diagnose(&self, _image: &[u8], _mime_type: &str) -> CoreResult<HealthReport> {
        Err(Self::unavailable())
    }

    async fn nearest_ground(&self, _at: Coordinate) -> CoreResult<Option<GroundSuggestion>> {
        Err(Self::unavailable())
    }

    fn model_name(&self) -> &str {
        "unconfigured"
    }
}

/// Oracle for the configured model, requiring an API key
pub fn require_oracle(config: &LayeredConfig) -> Result<GeminiOracle> {
    let api_key = config.oracle_api_key()?;
    let oracle = GeminiOracle::new(&config.oracle_url.value, &config.oracle_model.value, api_key)?;
    Ok(oracle)
}

/// Oracle for the configured model, or a failing stand-in without an API key
pub fn oracle(config: &LayeredConfig) -> Arc<dyn ImageOracle> {
    match require_oracle(config) {
        Ok(oracle) => Arc::new(oracle),
        Err(e) => {
            tracing::warn!(
                error = %e,
                "oracle unavailable; photos will be queued for manual review"
            );
            Arc::new(UnconfiguredOracle)
        }
    }
}

pub fn catalog(path: &Path) -> Result<GroundCatalog> {
    GroundCatalog::load(path)
        .with_context(|| format!("Failed to load ground catalog from {}", path.display()))
}

pub fn resolver(
    catalog: GroundCatalog,
    oracle: Arc<dyn ImageOracle>,
    config: &LayeredConfig,
) -> GroundResolver {
    GroundResolver::new(catalog, oracle).with_limit(config.search_limit.value)
}

pub fn store(path: &Path) -> JsonFileCatchStore {
    JsonFileCatchStore::new(path)
}

/// Position given on the command line, if any
pub fn position(args: &PositionArgs) -> Result<Option<Coordinate>> {
    let (Some(lat), Some(lng)) = (args.lat, args.lng) else {
        return Ok(None);
    };
    let at = Coordinate::new(lat, lng);
    if !at.is_valid() {
        anyhow::bail!("Position {} is out of range", at);
    }
    Ok(Some(at))
}
