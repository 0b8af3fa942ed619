//! OSRM HTTP adapter for point-to-point routes.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::RouteError;
use crate::polyline::{DEFAULT_PRECISION, Polyline};
use crate::traits::{Coordinates, RouteProvider, RouteSummary};

const METERS_PER_MILE: f64 = 1609.344;

#[derive(Debug, Clone)]
pub struct OsrmConfig {
    pub base_url: String,
    pub profile: String,
    pub timeout_secs: u64,
}

impl Default for OsrmConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            profile: "driving".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OsrmClient {
    config: OsrmConfig,
    client: reqwest::blocking::Client,
}

impl OsrmClient {
    pub fn new(config: OsrmConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn route_url(&self, origin: Coordinates, destination: Coordinates) -> String {
        format!(
            "{}/route/v1/{}/{:.6},{:.6};{:.6},{:.6}?overview=full&geometries=polyline",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            origin.lng,
            origin.lat,
            destination.lng,
            destination.lat
        )
    }
}

impl RouteProvider for OsrmClient {
    fn route(&self, origin: Coordinates, destination: Coordinates) -> Result<RouteSummary, RouteError> {
        let url = self.route_url(origin, destination);
        debug!(%url, "requesting OSRM route");

        let body = self
            .client
            .get(&url)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<OsrmRouteResponse>())
            .map_err(|err| {
                warn!(error = %err, "OSRM route request failed");
                RouteError::RouteUnavailable(format!("OSRM request failed: {err}"))
            })?;

        body.into_summary()
    }
}

#[derive(Debug, Deserialize)]
struct OsrmRouteResponse {
    code: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    routes: Vec<OsrmRoute>,
}

#[derive(Debug, Deserialize)]
struct OsrmRoute {
    /// Meters.
    distance: f64,
    /// Seconds.
    duration: f64,
    #[serde(default)]
    geometry: Option<String>,
}

impl OsrmRouteResponse {
    fn into_summary(self) -> Result<RouteSummary, RouteError> {
        if self.code != "Ok" {
            return Err(RouteError::RouteUnavailable(format!(
                "OSRM returned {}: {}",
                self.code,
                self.message.unwrap_or_default()
            )));
        }
        let route = self
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| RouteError::RouteUnavailable("OSRM returned no routes".to_string()))?;

        let geometry = match route.geometry {
            Some(encoded) => Polyline::decode(&encoded, DEFAULT_PRECISION)
                .map_err(|err| RouteError::RouteUnavailable(format!("bad OSRM geometry: {err}")))?,
            None => Polyline::default(),
        };

        Ok(RouteSummary {
            distance_miles: route.distance / METERS_PER_MILE,
            duration_minutes: (route.duration / 60.0).round() as u32,
            geometry,
        })
    }
}
