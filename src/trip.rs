//! Trip facade: validates a request, routes each leg, derives the forced
//! stops (inspections, pickup, dropoff, fuel by distance) and plans the duty
//! schedule.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{PlanError, RouteError};
use crate::itinerary::TripPlanResult;
use crate::planner::{
    self, DriveLeg, ForcedStop, MileageProfile, PlanOptions, StopKind, TripPlanInput, cycle_minutes_from_hours,
};
use crate::polyline::Polyline;
use crate::segment::LocationHint;
use crate::traits::{Coordinates, Geocoder, RouteProvider, RouteSummary};

/// Origin, optional pickup, destination and the driver's cycle usage.
#[derive(Debug, Clone, PartialEq)]
pub struct TripRequest {
    pub origin: Coordinates,
    pub pickup: Option<Coordinates>,
    pub destination: Coordinates,
    pub current_cycle_hours: f64,
}

impl TripRequest {
    pub fn new(origin: Coordinates, destination: Coordinates, current_cycle_hours: f64) -> Self {
        Self {
            origin,
            pickup: None,
            destination,
            current_cycle_hours,
        }
    }

    pub fn via_pickup(mut self, pickup: Coordinates) -> Self {
        self.pickup = Some(pickup);
        self
    }

    fn locations(&self) -> Vec<Coordinates> {
        let mut locations = vec![self.origin];
        locations.extend(self.pickup);
        locations.push(self.destination);
        locations
    }
}

/// On-duty work around the drive. A zero duration drops the stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopPolicy {
    pub pre_trip_inspection_minutes: u32,
    pub pickup_minutes: u32,
    pub dropoff_minutes: u32,
    pub post_trip_inspection_minutes: u32,
}

impl Default for StopPolicy {
    fn default() -> Self {
        Self {
            pre_trip_inspection_minutes: 30,
            pickup_minutes: 60,
            dropoff_minutes: 60,
            post_trip_inspection_minutes: 15,
        }
    }
}

impl StopPolicy {
    /// Drive only: no inspections, no loading time.
    pub fn none() -> Self {
        Self {
            pre_trip_inspection_minutes: 0,
            pickup_minutes: 0,
            dropoff_minutes: 0,
            post_trip_inspection_minutes: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteOverview {
    pub total_miles: f64,
    pub total_drive_minutes: u32,
    pub locations: Vec<Coordinates>,
    pub geometry: Polyline,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlannedTrip {
    pub route: RouteOverview,
    pub plan: TripPlanResult,
}

/// Plans trips against a routing provider.
#[derive(Debug, Clone)]
pub struct TripPlanner<P> {
    provider: P,
    options: PlanOptions,
    stops: StopPolicy,
}

impl<P: RouteProvider> TripPlanner<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            options: PlanOptions::default(),
            stops: StopPolicy::default(),
        }
    }

    pub fn with_options(mut self, options: PlanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_stop_policy(mut self, stops: StopPolicy) -> Self {
        self.stops = stops;
        self
    }

    pub fn options(&self) -> &PlanOptions {
        &self.options
    }

    pub fn plan_trip(&self, request: &TripRequest) -> Result<PlannedTrip, PlanError> {
        self.options.rules.validate()?;
        cycle_minutes_from_hours(request.current_cycle_hours, &self.options.rules)?;
        let locations = request.locations();
        if let Some(bad) = locations.iter().find(|location| !location.is_valid()) {
            return Err(PlanError::invalid(format!("invalid coordinates {bad:?}")));
        }

        let legs = locations
            .windows(2)
            .map(|pair| self.provider.route(pair[0], pair[1]))
            .collect::<Result<Vec<_>, RouteError>>()?;

        let total_miles: f64 = legs.iter().map(|leg| leg.distance_miles).sum();
        if legs.iter().any(|leg| !leg.distance_miles.is_finite() || leg.distance_miles < 0.0) {
            return Err(PlanError::invalid("route leg has a negative or undefined distance"));
        }
        if total_miles <= 0.0 {
            return Err(PlanError::invalid("route has no distance to drive"));
        }

        let input = self.trip_input(&legs, request)?;
        let plan = planner::plan(&input, &self.options)?;
        info!(
            miles = total_miles,
            drive_minutes = input.total_drive_minutes,
            days = plan.summary.total_days,
            resets = plan.summary.total_resets,
            "trip planned"
        );

        let mut geometry = Polyline::default();
        for leg in &legs {
            geometry.extend(leg.geometry.clone());
        }
        Ok(PlannedTrip {
            route: RouteOverview {
                total_miles,
                total_drive_minutes: input.total_drive_minutes,
                locations,
                geometry,
            },
            plan,
        })
    }

    /// Plans independent requests in parallel. Results keep the request order.
    pub fn plan_trips(&self, requests: &[TripRequest]) -> Vec<Result<PlannedTrip, PlanError>>
    where
        P: Sync,
    {
        requests.par_iter().map(|request| self.plan_trip(request)).collect()
    }

    /// Planner input for routed legs: the first leg ends at the pickup when
    /// the request has one.
    pub fn trip_input(&self, legs: &[RouteSummary], request: &TripRequest) -> Result<TripPlanInput, PlanError> {
        let rules = &self.options.rules;
        rules.validate()?;
        let mileage = MileageProfile::new(
            legs.iter()
                .map(|leg| DriveLeg {
                    drive_minutes: leg.duration_minutes,
                    miles: leg.distance_miles,
                })
                .collect(),
        );
        let total_minutes = mileage.total_drive_minutes();
        let total_miles = mileage.total_miles();
        let mut input = TripPlanInput::new(total_minutes).with_starting_cycle_hours(request.current_cycle_hours);

        let mut push = |at: u32, minutes: u32, kind: StopKind, hint: LocationHint| {
            if minutes > 0 {
                input.forced_stops.push(ForcedStop::new(at, minutes, kind).with_location(hint));
            }
        };

        push(
            0,
            self.stops.pre_trip_inspection_minutes,
            StopKind::Inspection,
            LocationHint::new("Pre-trip inspection").at(request.origin),
        );
        if let (Some(pickup), Some(first_leg)) = (request.pickup, legs.first()) {
            push(
                first_leg.duration_minutes,
                self.stops.pickup_minutes,
                StopKind::Pickup,
                LocationHint::new("Pickup")
                    .at_mile(first_leg.distance_miles)
                    .at(pickup),
            );
        }

        let mut mile = rules.fuel_stop_interval_miles;
        while mile < total_miles {
            if let Some(at) = mileage.drive_minute_at(mile).filter(|at| *at < total_minutes) {
                push(at, rules.fuel_stop_minutes, StopKind::Fuel, LocationHint::new("Fuel").at_mile(mile));
            }
            mile += rules.fuel_stop_interval_miles;
        }

        push(
            total_minutes,
            self.stops.dropoff_minutes,
            StopKind::Dropoff,
            LocationHint::new("Dropoff")
                .at_mile(total_miles)
                .at(request.destination),
        );
        push(
            total_minutes,
            self.stops.post_trip_inspection_minutes,
            StopKind::Inspection,
            LocationHint::new("Post-trip inspection").at(request.destination),
        );

        Ok(input.with_mileage(mileage))
    }
}

/// Geocodes a start/pickup/dropoff address triple into a request.
pub fn resolve_addresses<G: Geocoder>(
    geocoder: &G,
    start: &str,
    pickup: Option<&str>,
    dropoff: &str,
    current_cycle_hours: f64,
) -> Result<TripRequest, RouteError> {
    let origin = geocoder.geocode(start)?;
    let pickup = pickup.map(|address| geocoder.geocode(address)).transpose()?;
    let destination = geocoder.geocode(dropoff)?;

    Ok(TripRequest {
        origin,
        pickup,
        destination,
        current_cycle_hours,
    })
}
