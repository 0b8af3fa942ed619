//! Haversine route estimator (fallback when no routing service is reachable).
//!
//! Uses great-circle distance stretched by a detour factor and an assumed
//! average truck speed. Less accurate than a road network but always available.

use crate::error::RouteError;
use crate::polyline::Polyline;
use crate::traits::{Coordinates, RouteProvider, RouteSummary};

/// Average highway speed for a loaded truck.
const DEFAULT_SPEED_MPH: f64 = 55.0;

/// Roads are longer than the great circle.
const DEFAULT_DETOUR_FACTOR: f64 = 1.2;

/// Earth radius in miles.
const EARTH_RADIUS_MILES: f64 = 3958.8;

#[derive(Debug, Clone)]
pub struct HaversineRoutes {
    pub speed_mph: f64,
    pub detour_factor: f64,
}

impl Default for HaversineRoutes {
    fn default() -> Self {
        Self {
            speed_mph: DEFAULT_SPEED_MPH,
            detour_factor: DEFAULT_DETOUR_FACTOR,
        }
    }
}

impl HaversineRoutes {
    pub fn new(speed_mph: f64, detour_factor: f64) -> Self {
        Self {
            speed_mph,
            detour_factor,
        }
    }

    /// Great-circle distance in miles.
    pub fn haversine_miles(from: Coordinates, to: Coordinates) -> f64 {
        let lat1_rad = from.lat.to_radians();
        let lat2_rad = to.lat.to_radians();
        let delta_lat = (to.lat - from.lat).to_radians();
        let delta_lng = (to.lng - from.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().asin();

        EARTH_RADIUS_MILES * c
    }

    fn miles_to_minutes(&self, miles: f64) -> u32 {
        (miles / self.speed_mph * 60.0).round() as u32
    }
}

impl RouteProvider for HaversineRoutes {
    fn route(&self, origin: Coordinates, destination: Coordinates) -> Result<RouteSummary, RouteError> {
        if !(self.speed_mph.is_finite() && self.speed_mph > 0.0) {
            return Err(RouteError::RouteUnavailable(format!(
                "haversine estimator needs a positive speed, got {}",
                self.speed_mph
            )));
        }
        if !origin.is_valid() || !destination.is_valid() {
            return Err(RouteError::RouteUnavailable(
                "coordinates out of range".to_string(),
            ));
        }

        let distance_miles = Self::haversine_miles(origin, destination) * self.detour_factor;
        Ok(RouteSummary {
            distance_miles,
            duration_minutes: self.miles_to_minutes(distance_miles),
            geometry: Polyline::straight(origin, destination),
        })
    }
}
