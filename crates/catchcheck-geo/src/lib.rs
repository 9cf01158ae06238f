//! Catchcheck Geo - Distance, ground resolution, and device location
//!
//! This crate resolves a device position to fishing grounds: great-circle
//! distance, proximity ranking and text search over the static catalog,
//! oracle-assisted nearest-ground lookup, and deadline-bounded geolocation.

pub mod catalog;
pub mod distance;
pub mod locate;
pub mod resolver;

pub use catalog::GroundCatalog;
pub use distance::{distance_km, EARTH_RADIUS_KM};
pub use locate::{
    acquire_position, FixedPosition, GeolocationError, GeolocationProvider, LocationOutcome,
};
pub use resolver::{rank_by_proximity, search, GroundResolver, RankedGround, DEFAULT_SEARCH_LIMIT};
