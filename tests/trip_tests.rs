//! Trip facade tests against in-memory routing providers.

mod fixtures;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use hos_planner::haversine::HaversineRoutes;
use hos_planner::planner::PlanOptions;
use hos_planner::polyline::Polyline;
use hos_planner::traits::{Coordinates, Geocoder, RouteProvider, RouteSummary};
use hos_planner::trip::{StopPolicy, TripPlanner, TripRequest, resolve_addresses};
use hos_planner::{DayBoundary, DutyKind, HosRules, PlanError, RouteError, StopKind};

use fixtures::compliance::{assert_compliant, stop_labels};
use fixtures::us_cities::{DENVER, LANES, LAS_VEGAS, LOS_ANGELES};

/// Serves fixed legs keyed by origin/destination and counts requests.
struct TableRoutes {
    legs: Vec<(Coordinates, Coordinates, RouteSummary)>,
    calls: AtomicUsize,
}

impl TableRoutes {
    fn new() -> Self {
        Self {
            legs: Vec::new(),
            calls: AtomicUsize::new(0),
        }
    }

    fn with_leg(mut self, from: Coordinates, to: Coordinates, miles: f64, minutes: u32) -> Self {
        let summary = RouteSummary {
            distance_miles: miles,
            duration_minutes: minutes,
            geometry: Polyline::straight(from, to),
        };
        self.legs.push((from, to, summary));
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RouteProvider for TableRoutes {
    fn route(&self, origin: Coordinates, destination: Coordinates) -> Result<RouteSummary, RouteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.legs
            .iter()
            .find(|(from, to, _)| *from == origin && *to == destination)
            .map(|(_, _, summary)| summary.clone())
            .ok_or_else(|| RouteError::RouteUnavailable(format!("no road from {origin:?} to {destination:?}")))
    }
}

struct MapGeocoder(HashMap<&'static str, Coordinates>);

impl Geocoder for MapGeocoder {
    fn geocode(&self, query: &str) -> Result<Coordinates, RouteError> {
        self.0.get(query).copied().ok_or_else(|| RouteError::GeocodeFailed {
            query: query.to_string(),
            reason: "no results".to_string(),
        })
    }
}

fn la_vegas_denver() -> TableRoutes {
    TableRoutes::new()
        .with_leg(LOS_ANGELES.coords(), LAS_VEGAS.coords(), 100.0, 120)
        .with_leg(LAS_VEGAS.coords(), DENVER.coords(), 1900.0, 1800)
}

fn pickup_request(cycle_hours: f64) -> TripRequest {
    TripRequest::new(LOS_ANGELES.coords(), DENVER.coords(), cycle_hours).via_pickup(LAS_VEGAS.coords())
}

#[test]
fn test_derives_stops_from_route() {
    let provider = la_vegas_denver();
    let legs = vec![
        provider.route(LOS_ANGELES.coords(), LAS_VEGAS.coords()).unwrap(),
        provider.route(LAS_VEGAS.coords(), DENVER.coords()).unwrap(),
    ];
    let input = TripPlanner::new(&provider).trip_input(&legs, &pickup_request(12.0)).unwrap();

    assert_eq!(input.total_drive_minutes, 1920);
    assert_eq!(input.starting_cycle_hours, 12.0);
    let stops: Vec<_> = input
        .forced_stops
        .iter()
        .map(|stop| (stop.kind, stop.at_drive_minute, stop.duration_minutes))
        .collect();
    assert_eq!(
        stops,
        vec![
            (StopKind::Inspection, 0, 30),
            (StopKind::Pickup, 120, 60),
            (StopKind::Fuel, 973, 30),
            (StopKind::Dropoff, 1920, 60),
            (StopKind::Inspection, 1920, 15),
        ]
    );

    let fuel = input.forced_stops[2].location.as_ref().unwrap();
    assert_eq!(fuel.mile_marker, Some(1000.0));
    let pickup = input.forced_stops[1].location.as_ref().unwrap();
    assert_eq!(pickup.coordinates, Some(LAS_VEGAS.coords()));
}

#[test]
fn test_plan_trip_end_to_end() {
    let provider = la_vegas_denver();
    let planner = TripPlanner::new(&provider);
    let trip = planner.plan_trip(&pickup_request(12.0)).expect("trip plans");

    assert_eq!(provider.calls(), 2);
    assert_eq!(trip.route.total_miles, 2000.0);
    assert_eq!(trip.route.total_drive_minutes, 1920);
    assert_eq!(
        trip.route.locations,
        vec![LOS_ANGELES.coords(), LAS_VEGAS.coords(), DENVER.coords()]
    );
    assert_eq!(trip.route.geometry.points().len(), 3, "shared joint appears once");

    let segments = &trip.plan.segments;
    assert_compliant(segments, &HosRules::default(), 1920, 12 * 60);
    assert_eq!(
        stop_labels(segments),
        vec!["Pre-trip inspection", "Pickup", "Fuel", "Dropoff", "Post-trip inspection"]
    );
    assert_eq!(segments.last().map(|s| s.kind), Some(DutyKind::OnDutyNotDriving));
    assert_eq!(trip.plan.summary.total_driving_minutes, 1920);
    assert!(trip.plan.summary.total_resets >= 2);
}

#[test]
fn test_daily_miles_add_up_to_route_miles() {
    let provider = la_vegas_denver();
    let trip = TripPlanner::new(&provider).plan_trip(&pickup_request(0.0)).unwrap();

    let logged: f64 = trip.plan.logs.iter().map(|log| log.totals.miles).sum();
    assert!((logged - trip.route.total_miles).abs() < 1e-6, "{logged}");
    assert!((trip.plan.summary.total_miles - 2000.0).abs() < 1e-6);
    assert!(trip.plan.logs.iter().all(|log| log.totals.miles >= 0.0));
    assert!(trip.plan.logs[0].totals.miles > 0.0);
}

#[test]
fn test_fuel_interval_below_one_mile_rejected() {
    let provider = la_vegas_denver();
    let options = PlanOptions {
        rules: HosRules {
            fuel_stop_interval_miles: 1e-6,
            ..HosRules::default()
        },
        ..PlanOptions::default()
    };
    let planner = TripPlanner::new(&provider).with_options(options);
    let legs = vec![provider.route(LOS_ANGELES.coords(), LAS_VEGAS.coords()).unwrap()];

    assert!(matches!(
        planner.trip_input(&legs, &pickup_request(0.0)),
        Err(PlanError::InvalidInput(_))
    ));
    assert!(matches!(planner.plan_trip(&pickup_request(0.0)), Err(PlanError::InvalidInput(_))));
}

#[test]
fn test_without_pickup_routes_single_leg() {
    let provider = TableRoutes::new().with_leg(LOS_ANGELES.coords(), LAS_VEGAS.coords(), 270.0, 250);
    let planner = TripPlanner::new(&provider).with_stop_policy(StopPolicy::none());
    let request = TripRequest::new(LOS_ANGELES.coords(), LAS_VEGAS.coords(), 0.0);

    let trip = planner.plan_trip(&request).unwrap();
    assert_eq!(provider.calls(), 1);
    assert!(stop_labels(&trip.plan.segments).is_empty());
    assert_eq!(trip.plan.segments.len(), 1);
    assert_eq!(trip.plan.segments[0].end, 250);
}

#[test]
fn test_route_error_propagates_unchanged() {
    let provider = TableRoutes::new().with_leg(LOS_ANGELES.coords(), LAS_VEGAS.coords(), 270.0, 250);
    let planner = TripPlanner::new(&provider);

    let err = planner.plan_trip(&pickup_request(0.0)).unwrap_err();
    match err {
        PlanError::Route(RouteError::RouteUnavailable(message)) => assert!(message.contains("no road")),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_invalid_cycle_rejected_before_routing() {
    let provider = la_vegas_denver();
    let planner = TripPlanner::new(&provider);

    for hours in [-0.5, 70.5, f64::NAN] {
        let err = planner.plan_trip(&pickup_request(hours)).unwrap_err();
        assert!(matches!(err, PlanError::InvalidInput(_)), "{hours}");
    }
    assert_eq!(provider.calls(), 0);
}

#[test]
fn test_invalid_coordinates_rejected_before_routing() {
    let provider = la_vegas_denver();
    let planner = TripPlanner::new(&provider);
    let request = TripRequest::new(Coordinates::new(91.0, 0.0), DENVER.coords(), 0.0);

    assert!(matches!(planner.plan_trip(&request), Err(PlanError::InvalidInput(_))));
    assert_eq!(provider.calls(), 0);
}

#[test]
fn test_zero_distance_route_rejected() {
    let provider = TableRoutes::new().with_leg(DENVER.coords(), DENVER.coords(), 0.0, 0);
    let planner = TripPlanner::new(&provider);
    let request = TripRequest::new(DENVER.coords(), DENVER.coords(), 0.0);

    assert!(matches!(planner.plan_trip(&request), Err(PlanError::InvalidInput(_))));
}

#[test]
fn test_options_flow_into_plan() {
    let provider = la_vegas_denver();
    let options = PlanOptions {
        day_boundary: DayBoundary::DutyShift,
        ..PlanOptions::default()
    };
    let planner = TripPlanner::new(&provider).with_options(options);
    let trip = planner.plan_trip(&pickup_request(0.0)).unwrap();

    assert_eq!(planner.options().day_boundary, DayBoundary::DutyShift);
    for log in &trip.plan.logs {
        assert!(log.totals.driving_minutes <= 660);
    }
}

#[test]
fn test_resolve_addresses() {
    let geocoder = MapGeocoder(HashMap::from([
        ("Los Angeles, CA", LOS_ANGELES.coords()),
        ("Las Vegas, NV", LAS_VEGAS.coords()),
        ("Denver, CO", DENVER.coords()),
    ]));

    let request = resolve_addresses(&geocoder, "Los Angeles, CA", Some("Las Vegas, NV"), "Denver, CO", 8.0).unwrap();
    assert_eq!(request, pickup_request(8.0));

    let direct = resolve_addresses(&geocoder, "Los Angeles, CA", None, "Denver, CO", 8.0).unwrap();
    assert_eq!(direct.pickup, None);

    let err = resolve_addresses(&geocoder, "Los Angeles, CA", None, "Atlantis", 8.0).unwrap_err();
    assert_eq!(
        err,
        RouteError::GeocodeFailed {
            query: "Atlantis".to_string(),
            reason: "no results".to_string(),
        }
    );
}

#[test]
fn test_plan_trips_over_lanes() {
    let planner = TripPlanner::new(HaversineRoutes::default());
    let requests: Vec<_> = LANES
        .iter()
        .enumerate()
        .map(|(i, (from, to))| TripRequest::new(from.coords(), to.coords(), (i * 7) as f64))
        .collect();

    let parallel = planner.plan_trips(&requests);
    assert_eq!(parallel.len(), requests.len());
    for (request, result) in requests.iter().zip(parallel) {
        let trip = result.expect("lane plans");
        assert_eq!(Ok(trip.clone()), planner.plan_trip(request));
        assert_compliant(
            &trip.plan.segments,
            &planner.options().rules,
            trip.route.total_drive_minutes,
            (request.current_cycle_hours * 60.0).round() as u32,
        );
    }
}

#[test]
fn test_planned_trip_json() {
    let provider = la_vegas_denver();
    let trip = TripPlanner::new(&provider).plan_trip(&pickup_request(0.0)).unwrap();
    let json = serde_json::to_value(&trip).unwrap();

    assert_eq!(json["route"]["totalMiles"], 2000.0);
    assert_eq!(json["route"]["totalDriveMinutes"], 1920);
    assert_eq!(json["route"]["locations"][1]["lat"], LAS_VEGAS.lat);
    assert!(json["plan"]["logs"].as_array().is_some_and(|logs| !logs.is_empty()));
    assert_eq!(json["plan"]["logs"][0]["segments"][0]["locationHint"]["label"], "Pre-trip inspection");
}
