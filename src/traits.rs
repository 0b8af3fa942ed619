//! Boundary contracts for routing providers.
//!
//! The planner never computes geography itself. Concrete adapters (OSRM,
//! OpenRouteService, the haversine estimator) implement these traits; tests
//! supply their own.

use serde::{Deserialize, Serialize};

use crate::error::RouteError;
use crate::polyline::Polyline;

/// A point on the map in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

impl From<(f64, f64)> for Coordinates {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self { lat, lng }
    }
}

/// What a routing provider returns for one origin/destination pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSummary {
    pub distance_miles: f64,
    pub duration_minutes: u32,
    /// Route geometry, origin first.
    pub geometry: Polyline,
}

/// Provides a drivable route between two points.
///
/// Implementations make a single synchronous request. Timeouts and transport
/// failures are reported as [`RouteError::RouteUnavailable`]; retrying and
/// caching are left to the caller.
pub trait RouteProvider {
    fn route(&self, origin: Coordinates, destination: Coordinates) -> Result<RouteSummary, RouteError>;
}

/// Resolves a free-form address to coordinates.
pub trait Geocoder {
    fn geocode(&self, query: &str) -> Result<Coordinates, RouteError>;
}

impl<T: RouteProvider + ?Sized> RouteProvider for &T {
    fn route(&self, origin: Coordinates, destination: Coordinates) -> Result<RouteSummary, RouteError> {
        (**self).route(origin, destination)
    }
}

impl<T: Geocoder + ?Sized> Geocoder for &T {
    fn geocode(&self, query: &str) -> Result<Coordinates, RouteError> {
        (**self).geocode(query)
    }
}
