//! OpenRouteService adapter: address geocoding and heavy-goods-vehicle routing.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::RouteError;
use crate::polyline::{DEFAULT_PRECISION, Polyline};
use crate::traits::{Coordinates, Geocoder, RouteProvider, RouteSummary};

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "OPEN_ROUTE_API_KEY";

#[derive(Debug, Clone)]
pub struct OrsConfig {
    pub base_url: String,
    pub api_key: String,
    /// Routing profile; `driving-hgv` applies truck restrictions.
    pub profile: String,
    /// ISO country code limiting geocoder results.
    pub country: Option<String>,
    pub timeout_secs: u64,
}

impl Default for OrsConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openrouteservice.org".to_string(),
            api_key: String::new(),
            profile: "driving-hgv".to_string(),
            country: Some("US".to_string()),
            timeout_secs: 10,
        }
    }
}

impl OrsConfig {
    /// Default configuration with the key taken from `OPEN_ROUTE_API_KEY`.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var(API_KEY_ENV).ok().filter(|key| !key.is_empty())?;
        Some(Self {
            api_key,
            ..Self::default()
        })
    }
}

#[derive(Debug, Clone)]
pub struct OrsClient {
    config: OrsConfig,
    client: reqwest::blocking::Client,
}

impl OrsClient {
    pub fn new(config: OrsConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

impl Geocoder for OrsClient {
    fn geocode(&self, query: &str) -> Result<Coordinates, RouteError> {
        let failed = |reason: String| RouteError::GeocodeFailed {
            query: query.to_string(),
            reason,
        };

        let mut params = vec![
            ("api_key", self.config.api_key.as_str()),
            ("text", query),
            ("size", "1"),
        ];
        if let Some(country) = &self.config.country {
            params.push(("boundary.country", country.as_str()));
        }

        debug!(query, "geocoding address");
        let body = self
            .client
            .get(self.url("/geocode/search"))
            .query(&params)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<GeocodeResponse>())
            .map_err(|err| {
                warn!(query, error = %err, "geocoding request failed");
                failed(err.to_string())
            })?;

        body.first_match().ok_or_else(|| failed("no results".to_string()))
    }
}

impl RouteProvider for OrsClient {
    fn route(&self, origin: Coordinates, destination: Coordinates) -> Result<RouteSummary, RouteError> {
        let request = DirectionsRequest {
            coordinates: [[origin.lng, origin.lat], [destination.lng, destination.lat]],
            units: "mi",
        };
        let url = self.url(&format!("/v2/directions/{}", self.config.profile));

        debug!(%url, "requesting OpenRouteService directions");
        let body = self
            .client
            .post(url)
            .header("Authorization", &self.config.api_key)
            .json(&request)
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<DirectionsResponse>())
            .map_err(|err| {
                warn!(error = %err, "directions request failed");
                RouteError::RouteUnavailable(format!("OpenRouteService request failed: {err}"))
            })?;

        body.into_summary()
    }
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    features: Vec<GeocodeFeature>,
}

#[derive(Debug, Deserialize)]
struct GeocodeFeature {
    geometry: PointGeometry,
}

#[derive(Debug, Deserialize)]
struct PointGeometry {
    /// `[lng, lat]`.
    coordinates: Vec<f64>,
}

impl GeocodeResponse {
    fn first_match(self) -> Option<Coordinates> {
        let feature = self.features.into_iter().next()?;
        match feature.geometry.coordinates.as_slice() {
            [lng, lat, ..] => Some(Coordinates::new(*lat, *lng)),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize)]
struct DirectionsRequest {
    coordinates: [[f64; 2]; 2],
    units: &'static str,
}

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    #[serde(default)]
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    summary: DirectionsSummary,
    #[serde(default)]
    geometry: Option<String>,
}

/// Distance in the requested units (miles); duration in seconds. Both are
/// omitted when zero.
#[derive(Debug, Deserialize)]
struct DirectionsSummary {
    #[serde(default)]
    distance: f64,
    #[serde(default)]
    duration: f64,
}

impl DirectionsResponse {
    fn into_summary(self) -> Result<RouteSummary, RouteError> {
        let route = self.routes.into_iter().next().ok_or_else(|| {
            RouteError::RouteUnavailable("OpenRouteService returned no routes".to_string())
        })?;

        let geometry = match route.geometry {
            Some(encoded) => Polyline::decode(&encoded, DEFAULT_PRECISION).map_err(|err| {
                RouteError::RouteUnavailable(format!("bad OpenRouteService geometry: {err}"))
            })?,
            None => Polyline::default(),
        };

        Ok(RouteSummary {
            distance_miles: route.summary.distance,
            duration_minutes: (route.summary.duration / 60.0).round() as u32,
            geometry,
        })
    }
}
