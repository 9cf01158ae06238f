use std::sync::Arc;

use catchcheck_core::config::MAX_SEARCH_LIMIT;
use catchcheck_core::models::{Coordinate, FishingGround, GroundRef, GroundSuggestion};
use catchcheck_oracle::ImageOracle;
use serde::Serialize;

use crate::catalog::GroundCatalog;
use crate::distance::distance_km;

/// Maximum number of grounds returned by a search
pub const DEFAULT_SEARCH_LIMIT: usize = MAX_SEARCH_LIMIT;

/// Ground with its distance from the search origin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedGround {
    pub ground: FishingGround,
    pub distance_km: f64,
}

/// Rank grounds by distance from `origin`, nearest first
///
/// Grounds at equal distance keep their catalog order.
pub fn rank_by_proximity(origin: Coordinate, catalog: &[FishingGround]) -> Vec<FishingGround> {
    ranked(origin, catalog).into_iter().map(|r| r.ground).collect()
}

/// Rank by proximity, keep grounds whose name or id contains `query`, and
/// return at most [`DEFAULT_SEARCH_LIMIT`] results
pub fn search(origin: Coordinate, query: &str, catalog: &[FishingGround]) -> Vec<FishingGround> {
    search_ranked(origin, query, catalog, DEFAULT_SEARCH_LIMIT)
        .into_iter()
        .map(|r| r.ground)
        .collect()
}

fn ranked(origin: Coordinate, catalog: &[FishingGround]) -> Vec<RankedGround> {
    let mut ranked: Vec<RankedGround> = catalog
        .iter()
        .map(|ground| RankedGround {
            distance_km: distance_km(origin, ground.coordinate()),
            ground: ground.clone(),
        })
        .collect();
    // sort_by is stable
    ranked.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    ranked
}

fn search_ranked(
    origin: Coordinate,
    query: &str,
    catalog: &[FishingGround],
    limit: usize,
) -> Vec<RankedGround> {
    let needle = query.trim().to_lowercase();
    ranked(origin, catalog)
        .into_iter()
        .filter(|r| needle.is_empty() || r.ground.matches(&needle))
        .take(limit)
        .collect()
}

/// Resolves device positions to fishing grounds
///
/// Combines the static catalog with the oracle's proximity lookup, which can
/// name grounds the catalog does not contain.
#[derive(Clone)]
pub struct GroundResolver {
    catalog: GroundCatalog,
    oracle: Arc<dyn ImageOracle>,
    limit: usize,
}

impl GroundResolver {
    pub fn new(catalog: GroundCatalog, oracle: Arc<dyn ImageOracle>) -> Self {
        Self { catalog, oracle, limit: DEFAULT_SEARCH_LIMIT }
    }

    /// Lower the search result cap; it never exceeds [`DEFAULT_SEARCH_LIMIT`]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.clamp(1, DEFAULT_SEARCH_LIMIT);
        self
    }

    pub fn catalog(&self) -> &GroundCatalog {
        &self.catalog
    }

    /// Manual search with distances, nearest first
    pub fn search(&self, origin: Coordinate, query: &str) -> Vec<RankedGround> {
        search_ranked(origin, query, self.catalog.grounds(), self.limit)
    }

    /// Ask the oracle for the nearest named ground
    ///
    /// Advisory only: any failure or an empty answer yields `None` and the
    /// caller falls back to [`GroundResolver::search`]. A suggestion that
    /// matches a catalog ground by id or name is replaced by the catalog's
    /// canonical id and name.
    pub async fn resolve_nearest(&self, at: Coordinate) -> Option<GroundSuggestion> {
        let suggestion = match self.oracle.nearest_ground(at).await {
            Ok(Some(suggestion)) => suggestion,
            Ok(None) => {
                tracing::info!(%at, "oracle found no ground near position");
                return None;
            }
            Err(e) => {
                tracing::warn!(%at, error = %e, "nearest ground lookup failed");
                return None;
            }
        };

        let canonical = suggestion
            .id
            .as_deref()
            .and_then(|id| self.catalog.find(id))
            .or_else(|| self.catalog.find_by_name(&suggestion.name));

        let resolved = match canonical {
            Some(ground) => {
                GroundSuggestion { id: Some(ground.id.clone()), name: ground.name.clone() }
            }
            None => suggestion,
        };
        tracing::debug!(%at, ground = %resolved.name, "nearest ground resolved");
        Some(resolved)
    }

    /// Convert a suggestion into a draft ground reference
    ///
    /// Only suggestions whose id exists in the catalog become catalog
    /// references; anything else is kept as an ad-hoc name.
    pub fn to_ground_ref(&self, suggestion: &GroundSuggestion) -> GroundRef {
        match suggestion.id.as_deref().and_then(|id| self.catalog.find(id)) {
            Some(ground) => GroundRef::from(ground),
            None => GroundRef::Custom { name: suggestion.name.clone() },
        }
    }
}
