//! Freight hubs across the continental US.
//!
//! Coordinates are city centers from OpenStreetMap.

use hos_planner::traits::Coordinates;

/// A named location with coordinates.
#[derive(Debug, Clone)]
pub struct Location {
    pub name: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, lat: f64, lng: f64) -> Self {
        Self { name, lat, lng }
    }

    pub fn coords(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

pub const LOS_ANGELES: Location = Location::new("Los Angeles, CA", 34.0522, -118.2437);
pub const LAS_VEGAS: Location = Location::new("Las Vegas, NV", 36.1699, -115.1398);
pub const RENO: Location = Location::new("Reno, NV", 39.5296, -119.8138);
pub const PHOENIX: Location = Location::new("Phoenix, AZ", 33.4484, -112.0740);
pub const SALT_LAKE_CITY: Location = Location::new("Salt Lake City, UT", 40.7608, -111.8910);
pub const DENVER: Location = Location::new("Denver, CO", 39.7392, -104.9903);
pub const DALLAS: Location = Location::new("Dallas, TX", 32.7767, -96.7970);
pub const KANSAS_CITY: Location = Location::new("Kansas City, MO", 39.0997, -94.5786);
pub const MEMPHIS: Location = Location::new("Memphis, TN", 35.1495, -90.0490);
pub const CHICAGO: Location = Location::new("Chicago, IL", 41.8781, -87.6298);
pub const ATLANTA: Location = Location::new("Atlanta, GA", 33.7490, -84.3880);
pub const NEW_YORK: Location = Location::new("New York, NY", 40.7128, -74.0060);

/// Origin/destination pairs from regional runs to coast-to-coast hauls.
pub const LANES: &[(Location, Location)] = &[
    (LAS_VEGAS, LOS_ANGELES),
    (LAS_VEGAS, RENO),
    (PHOENIX, DENVER),
    (SALT_LAKE_CITY, CHICAGO),
    (DALLAS, ATLANTA),
    (DENVER, MEMPHIS),
    (KANSAS_CITY, NEW_YORK),
    (LOS_ANGELES, NEW_YORK),
];
