//! Segment planner: greedy, time-ordered Hours-of-Service simulation.
//!
//! The planner consumes a total drive time and a list of forced stops and
//! emits contiguous [`DutySegment`]s. Before any segment that would break a
//! cap it inserts the rest the rule set demands, so every emitted schedule is
//! compliant by construction.

use std::collections::VecDeque;

use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, trace};

use crate::clock::DutyClock;
use crate::error::PlanError;
use crate::itinerary::{Assembler, DayBoundary, TripPlanResult};
use crate::rules::HosRules;
use crate::segment::{DutyKind, DutySegment, LocationHint};

/// Why the truck stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopKind {
    Fuel,
    Pickup,
    Dropoff,
    Inspection,
    Other,
}

impl StopKind {
    pub fn label(self) -> &'static str {
        match self {
            StopKind::Fuel => "Fuel",
            StopKind::Pickup => "Pickup",
            StopKind::Dropoff => "Dropoff",
            StopKind::Inspection => "Inspection",
            StopKind::Other => "Stop",
        }
    }
}

/// On-duty, not-driving work that must happen once a given amount of driving is done.
#[derive(Debug, Clone, PartialEq)]
pub struct ForcedStop {
    /// Driving minutes completed when the stop is reached.
    pub at_drive_minute: u32,
    pub duration_minutes: u32,
    pub kind: StopKind,
    pub location: Option<LocationHint>,
}

impl ForcedStop {
    pub fn new(at_drive_minute: u32, duration_minutes: u32, kind: StopKind) -> Self {
        Self {
            at_drive_minute,
            duration_minutes,
            kind,
            location: None,
        }
    }

    /// A fuel stop with the rule set's fueling time.
    pub fn fuel(at_drive_minute: u32, rules: &HosRules) -> Self {
        Self::new(at_drive_minute, rules.fuel_stop_minutes, StopKind::Fuel)
    }

    pub fn with_location(mut self, location: LocationHint) -> Self {
        self.location = Some(location);
        self
    }

    fn hint(&self) -> LocationHint {
        self.location
            .clone()
            .unwrap_or_else(|| LocationHint::new(self.kind.label()))
    }
}

/// Distance and drive time of one routed leg.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriveLeg {
    pub drive_minutes: u32,
    pub miles: f64,
}

/// Maps completed drive minutes to miles travelled, linear inside each leg.
///
/// An empty profile reports zero miles everywhere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MileageProfile {
    legs: Vec<DriveLeg>,
}

impl MileageProfile {
    pub fn new(legs: Vec<DriveLeg>) -> Self {
        Self { legs }
    }

    pub fn legs(&self) -> &[DriveLeg] {
        &self.legs
    }

    pub fn is_empty(&self) -> bool {
        self.legs.is_empty()
    }

    pub fn total_miles(&self) -> f64 {
        self.legs.iter().map(|leg| leg.miles).sum()
    }

    pub fn total_drive_minutes(&self) -> u32 {
        self.legs.iter().map(|leg| leg.drive_minutes).sum()
    }

    /// Miles covered once `drive_minute` minutes have been driven. Legs that
    /// take no drive time count as soon as driving has started.
    pub fn miles_at(&self, drive_minute: u32) -> f64 {
        if drive_minute == 0 {
            return 0.0;
        }
        let mut leg_start_minute = 0u32;
        let mut miles = 0.0;
        for leg in &self.legs {
            let leg_end_minute = leg_start_minute + leg.drive_minutes;
            if drive_minute < leg_end_minute {
                let fraction = f64::from(drive_minute - leg_start_minute) / f64::from(leg.drive_minutes);
                return miles + fraction * leg.miles;
            }
            miles += leg.miles;
            leg_start_minute = leg_end_minute;
        }
        miles
    }

    pub fn miles_between(&self, from_minute: u32, to_minute: u32) -> f64 {
        self.miles_at(to_minute) - self.miles_at(from_minute)
    }

    /// Drive minute at which `mile` is reached, interpolated inside its leg.
    /// `None` at or past the end of the route.
    pub fn drive_minute_at(&self, mile: f64) -> Option<u32> {
        let mut leg_start_mile = 0.0;
        let mut leg_start_minute = 0u32;
        for leg in &self.legs {
            let leg_end_mile = leg_start_mile + leg.miles;
            if leg.miles > 0.0 && mile < leg_end_mile {
                let fraction = (mile - leg_start_mile) / leg.miles;
                let into_leg = (fraction * f64::from(leg.drive_minutes)).round() as u32;
                return Some(leg_start_minute + into_leg);
            }
            leg_start_mile = leg_end_mile;
            leg_start_minute += leg.drive_minutes;
        }
        None
    }

    fn validate(&self, total_drive_minutes: u32) -> Result<(), PlanError> {
        if self.is_empty() {
            return Ok(());
        }
        if let Some(leg) = self.legs.iter().find(|leg| !leg.miles.is_finite() || leg.miles < 0.0) {
            return Err(PlanError::invalid(format!("leg distance {} is not a distance", leg.miles)));
        }
        if self.total_drive_minutes() != total_drive_minutes {
            return Err(PlanError::invalid(format!(
                "legs cover {} drive minutes but the trip has {total_drive_minutes}",
                self.total_drive_minutes()
            )));
        }
        Ok(())
    }
}

/// Everything the planner needs to know about one trip.
#[derive(Debug, Clone, PartialEq)]
pub struct TripPlanInput {
    pub total_drive_minutes: u32,
    pub forced_stops: Vec<ForcedStop>,
    /// On-duty hours already used in the rolling cycle.
    pub starting_cycle_hours: f64,
    /// Optional; fills the daily mileage totals.
    pub mileage: MileageProfile,
}

impl TripPlanInput {
    pub fn new(total_drive_minutes: u32) -> Self {
        Self {
            total_drive_minutes,
            forced_stops: Vec::new(),
            starting_cycle_hours: 0.0,
            mileage: MileageProfile::default(),
        }
    }

    pub fn with_mileage(mut self, mileage: MileageProfile) -> Self {
        self.mileage = mileage;
        self
    }

    pub fn with_starting_cycle_hours(mut self, hours: f64) -> Self {
        self.starting_cycle_hours = hours;
        self
    }

    pub fn with_stop(mut self, stop: ForcedStop) -> Self {
        self.forced_stops.push(stop);
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlanOptions {
    pub rules: HosRules,
    pub day_boundary: DayBoundary,
    /// Pad the last calendar sheet with off-duty time up to its end.
    pub fill_off_duty: bool,
}

/// Converts reported cycle hours to minutes, rejecting values outside the cycle.
pub(crate) fn cycle_minutes_from_hours(hours: f64, rules: &HosRules) -> Result<u32, PlanError> {
    if !hours.is_finite() || hours < 0.0 || hours > rules.max_cycle_hours() {
        return Err(PlanError::invalid(format!(
            "current cycle hours {hours} outside [0, {}]",
            rules.max_cycle_hours()
        )));
    }
    Ok((hours * 60.0).round() as u32)
}

fn stop_queue(input: &TripPlanInput, rules: &HosRules) -> Result<VecDeque<ForcedStop>, PlanError> {
    for stop in &input.forced_stops {
        if stop.at_drive_minute > input.total_drive_minutes {
            return Err(PlanError::invalid(format!(
                "{} stop at drive minute {} lies beyond the trip's {} drive minutes",
                stop.kind.label(),
                stop.at_drive_minute,
                input.total_drive_minutes
            )));
        }
        if stop.duration_minutes == 0 {
            return Err(PlanError::invalid(format!(
                "{} stop at drive minute {} has no duration",
                stop.kind.label(),
                stop.at_drive_minute
            )));
        }
        if stop.duration_minutes > rules.max_on_duty_window {
            return Err(PlanError::invalid(format!(
                "{} stop of {} minutes cannot fit in a {} minute on-duty window",
                stop.kind.label(),
                stop.duration_minutes,
                rules.max_on_duty_window
            )));
        }
    }

    let mut stops = input.forced_stops.clone();
    // Stable: stops sharing an offset keep their input order.
    stops.sort_by_key(|stop| stop.at_drive_minute);
    Ok(stops.into())
}

struct Simulation<'a> {
    rules: &'a HosRules,
    clock: DutyClock,
    now: u32,
    shift: u32,
    segments: Vec<DutySegment>,
}

impl<'a> Simulation<'a> {
    fn new(rules: &'a HosRules, cycle_minutes_used: u32) -> Self {
        Self {
            rules,
            clock: DutyClock::starting_at(cycle_minutes_used),
            now: 0,
            shift: 1,
            segments: Vec::new(),
        }
    }

    fn emit(&mut self, kind: DutyKind, minutes: u32, hint: Option<LocationHint>) {
        let start = self.now;
        self.now += minutes;
        trace!(?kind, start, end = self.now, shift = self.shift, "segment");
        self.segments.push(DutySegment {
            kind,
            start,
            end: self.now,
            location_hint: hint,
        });
    }

    fn drive(&mut self, minutes: u32) {
        self.clock.record_driving(minutes);
        self.emit(DutyKind::Driving, minutes, None);
    }

    fn work_stop(&mut self, stop: ForcedStop) {
        self.clock.record_on_duty(stop.duration_minutes);
        let hint = stop.hint();
        self.emit(DutyKind::OnDutyNotDriving, stop.duration_minutes, Some(hint));
    }

    fn take_break(&mut self) {
        let minutes = self.rules.break_minutes;
        self.clock.record_break(minutes);
        self.emit(DutyKind::Break, minutes, None);
    }

    fn take_reset(&mut self) {
        debug!(at = self.now, shift = self.shift, clock = ?self.clock, "daily reset");
        self.clock.reset_window();
        self.emit(DutyKind::SleeperBerth, self.rules.min_off_duty_reset, None);
        self.shift += 1;
    }

    fn restart_cycle(&mut self) -> Result<(), PlanError> {
        let Some(minutes) = self.rules.cycle_restart else {
            return Err(PlanError::CycleExhausted {
                cycle_minutes: self.clock.cycle_minutes_used,
            });
        };
        debug!(at = self.now, cycle = self.clock.cycle_minutes_used, "cycle restart");
        self.clock.restart_cycle();
        self.emit(DutyKind::OffDuty, minutes, None);
        self.shift += 1;
        Ok(())
    }
}

/// Runs the duty simulation and returns the raw segment sequence.
pub fn simulate(input: &TripPlanInput, rules: &HosRules) -> Result<Vec<DutySegment>, PlanError> {
    rules.validate()?;
    let cycle_minutes = cycle_minutes_from_hours(input.starting_cycle_hours, rules)?;
    let mut stops = stop_queue(input, rules)?;

    let mut sim = Simulation::new(rules, cycle_minutes);
    let mut driven = 0u32;

    loop {
        let remaining = input.total_drive_minutes - driven;
        let due = stops
            .front()
            .filter(|stop| stop.at_drive_minute == driven)
            .map(|stop| stop.duration_minutes);
        if remaining == 0 && due.is_none() {
            break;
        }

        // Rest is only owed ahead of more work, and it comes before a stop
        // reached at the same instant.
        let more_driving = remaining > 0;
        if (more_driving && rules.needs_cycle_restart(&sim.clock))
            || due.is_some_and(|minutes| !rules.stop_fits_cycle(&sim.clock, minutes))
        {
            sim.restart_cycle()?;
            continue;
        }
        if (more_driving && rules.needs_daily_reset(&sim.clock))
            || due.is_some_and(|minutes| !rules.stop_fits_window(&sim.clock, minutes))
        {
            sim.take_reset();
            continue;
        }
        if more_driving && rules.needs_break(&sim.clock) {
            if rules.break_exhausts_window(&sim.clock) {
                sim.take_reset();
            } else {
                sim.take_break();
            }
            continue;
        }

        if due.is_some() {
            if let Some(stop) = stops.pop_front() {
                sim.work_stop(stop);
            }
            continue;
        }

        let to_next_stop = stops
            .front()
            .map_or(remaining, |stop| stop.at_drive_minute - driven);
        let candidate = remaining.min(to_next_stop);
        let allowance = rules.drive_allowance(&sim.clock, candidate);
        if allowance.minutes == 0 {
            return Err(PlanError::invalid(format!(
                "rule set leaves no driving time at minute {}",
                sim.now
            )));
        }
        if let Some(limit) = allowance.limited_by {
            trace!(?limit, candidate, allowed = allowance.minutes, "drive chunk capped");
        }
        sim.drive(allowance.minutes);
        driven += allowance.minutes;
    }

    debug!(
        segments = sim.segments.len(),
        shifts = sim.shift,
        elapsed = sim.now,
        "simulation complete"
    );
    Ok(sim.segments)
}

/// Plans a trip end to end: simulation followed by day partitioning.
pub fn plan(input: &TripPlanInput, options: &PlanOptions) -> Result<TripPlanResult, PlanError> {
    input.mileage.validate(input.total_drive_minutes)?;
    let segments = simulate(input, &options.rules)?;
    let starting_cycle = cycle_minutes_from_hours(input.starting_cycle_hours, &options.rules)?;

    let assembler = Assembler::new(&options.rules, starting_cycle)
        .day_boundary(options.day_boundary)
        .fill_off_duty(options.fill_off_duty)
        .mileage(&input.mileage);
    assembler.into_result(segments)
}

/// Plans independent trips in parallel. Results keep the input order.
pub fn plan_many(inputs: &[TripPlanInput], options: &PlanOptions) -> Vec<Result<TripPlanResult, PlanError>> {
    inputs.par_iter().map(|input| plan(input, options)).collect()
}
