//! Itinerary assembly: partitions a segment sequence into daily log sheets.
//!
//! Aggregates are always recomputed from the segments of a day; nothing is
//! carried independently.

use serde::Serialize;

use crate::error::PlanError;
use crate::planner::MileageProfile;
use crate::rules::HosRules;
use crate::segment::{DutyKind, DutySegment};

const MINUTES_PER_DAY: u32 = 24 * 60;

/// Where one log sheet ends and the next begins.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBoundary {
    /// 24-hour sheets. The trip starts `start_minute_of_day` minutes after
    /// midnight of day 1; segments crossing midnight are split.
    Calendar { start_minute_of_day: u32 },
    /// A sheet closes when a daily reset or cycle restart completes.
    DutyShift,
}

impl Default for DayBoundary {
    fn default() -> Self {
        DayBoundary::Calendar {
            start_minute_of_day: 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DayTotals {
    pub driving_minutes: u32,
    pub on_duty_minutes: u32,
    pub off_duty_minutes: u32,
    /// Distance driven this day. Zero when the plan has no mileage profile.
    pub miles: f64,
    pub cycle_hours_used_end: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyLog {
    /// 1-based day index.
    pub day: u32,
    pub segments: Vec<DutySegment>,
    pub totals: DayTotals,
    /// A daily reset ended on this day.
    pub daily_reset: bool,
    /// A cycle restart ended on this day.
    pub cycle_restart: bool,
}

impl DailyLog {
    /// Minutes between the first segment's start and the last segment's end.
    pub fn covered_minutes(&self) -> u32 {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => last.end - first.start,
            _ => 0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripSummary {
    pub total_days: u32,
    pub total_breaks: u32,
    pub total_resets: u32,
    pub total_cycle_restarts: u32,
    pub total_driving_minutes: u32,
    pub total_on_duty_minutes: u32,
    pub total_miles: f64,
    /// Trip start to completion, rest included.
    pub trip_duration_minutes: u32,
    pub final_cycle_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TripPlanResult {
    pub logs: Vec<DailyLog>,
    pub summary: TripSummary,
    /// Unsplit planner output.
    #[serde(skip)]
    pub segments: Vec<DutySegment>,
}

/// Builds daily logs from planner output.
#[derive(Debug, Clone)]
pub struct Assembler<'a> {
    rules: &'a HosRules,
    starting_cycle_minutes: u32,
    day_boundary: DayBoundary,
    fill_off_duty: bool,
    mileage: Option<&'a MileageProfile>,
}

#[derive(Default)]
struct OpenDay {
    segments: Vec<DutySegment>,
    miles: f64,
    daily_reset: bool,
    cycle_restart: bool,
}

impl OpenDay {
    fn close(self, day: u32, cycle_minutes: u32) -> DailyLog {
        let mut totals = DayTotals {
            miles: self.miles,
            cycle_hours_used_end: f64::from(cycle_minutes) / 60.0,
            ..DayTotals::default()
        };
        for segment in &self.segments {
            let minutes = segment.duration();
            if segment.kind == DutyKind::Driving {
                totals.driving_minutes += minutes;
            }
            if segment.kind.is_on_duty() {
                totals.on_duty_minutes += minutes;
            } else {
                totals.off_duty_minutes += minutes;
            }
        }
        DailyLog {
            day,
            segments: self.segments,
            totals,
            daily_reset: self.daily_reset,
            cycle_restart: self.cycle_restart,
        }
    }
}

impl<'a> Assembler<'a> {
    pub fn new(rules: &'a HosRules, starting_cycle_minutes: u32) -> Self {
        Self {
            rules,
            starting_cycle_minutes,
            day_boundary: DayBoundary::default(),
            fill_off_duty: false,
            mileage: None,
        }
    }

    /// Route mileage used for the per-day distance totals.
    pub fn mileage(mut self, mileage: &'a MileageProfile) -> Self {
        self.mileage = Some(mileage);
        self
    }

    fn miles_driven(&self, piece: &DutySegment, driven_before: u32) -> f64 {
        match self.mileage {
            Some(profile) if piece.kind == DutyKind::Driving => {
                profile.miles_between(driven_before, driven_before + piece.duration())
            }
            _ => 0.0,
        }
    }

    pub fn day_boundary(mut self, day_boundary: DayBoundary) -> Self {
        self.day_boundary = day_boundary;
        self
    }

    pub fn fill_off_duty(mut self, fill: bool) -> Self {
        self.fill_off_duty = fill;
        self
    }

    fn is_daily_reset(&self, segment: &DutySegment) -> bool {
        segment.kind == DutyKind::SleeperBerth && segment.duration() >= self.rules.min_off_duty_reset
    }

    fn is_cycle_restart(&self, segment: &DutySegment) -> bool {
        segment.kind == DutyKind::OffDuty
            && self
                .rules
                .cycle_restart
                .is_some_and(|minutes| segment.duration() >= minutes)
    }

    /// Trip offset at which calendar day `day` (1-based) ends.
    fn calendar_day_end(&self, day: u32) -> Option<u32> {
        match self.day_boundary {
            DayBoundary::Calendar { start_minute_of_day } => {
                Some(day * MINUTES_PER_DAY - start_minute_of_day)
            }
            DayBoundary::DutyShift => None,
        }
    }

    /// Splits `segments` into daily logs.
    ///
    /// Fails with [`PlanError::InvalidSegmentSequence`] if the sequence does not
    /// start at offset 0, contains an empty segment, or has gaps or overlaps.
    pub fn assemble(&self, segments: &[DutySegment]) -> Result<Vec<DailyLog>, PlanError> {
        check_sequence(segments)?;
        if let DayBoundary::Calendar { start_minute_of_day } = self.day_boundary {
            if start_minute_of_day >= MINUTES_PER_DAY {
                return Err(PlanError::invalid(format!(
                    "start minute of day {start_minute_of_day} is not within a day"
                )));
            }
        }

        let mut logs = Vec::new();
        let mut open = OpenDay::default();
        let mut day = 1;
        let mut cycle = self.starting_cycle_minutes;
        let mut driven = 0u32;
        let mut shift_closed = false;

        for segment in segments {
            if shift_closed {
                logs.push(std::mem::take(&mut open).close(day, cycle));
                day += 1;
            }

            let mut piece = segment.clone();
            while let Some(day_end) = self.calendar_day_end(day).filter(|end| piece.end > *end) {
                if let Some((head, tail)) = piece.split_at(day_end) {
                    if head.kind.is_on_duty() {
                        cycle += head.duration();
                    }
                    open.miles += self.miles_driven(&head, driven);
                    if head.kind == DutyKind::Driving {
                        driven += head.duration();
                    }
                    open.segments.push(head);
                    piece = tail;
                }
                logs.push(std::mem::take(&mut open).close(day, cycle));
                day += 1;
            }

            if piece.kind.is_on_duty() {
                cycle += piece.duration();
            }
            open.miles += self.miles_driven(&piece, driven);
            if piece.kind == DutyKind::Driving {
                driven += piece.duration();
            }
            open.segments.push(piece);

            let restart = self.is_cycle_restart(segment);
            let reset = self.is_daily_reset(segment);
            if restart {
                cycle = 0;
                open.cycle_restart = true;
            } else if reset {
                open.daily_reset = true;
            }
            shift_closed = self.day_boundary == DayBoundary::DutyShift && (restart || reset);
        }

        if self.fill_off_duty {
            let last_end = segments.last().map_or(0, |segment| segment.end);
            if let Some(day_end) = self.calendar_day_end(day).filter(|end| *end > last_end) {
                open.segments
                    .push(DutySegment::new(DutyKind::OffDuty, last_end, day_end));
            }
        }
        logs.push(open.close(day, cycle));
        Ok(logs)
    }

    pub fn summarize(&self, segments: &[DutySegment], logs: &[DailyLog]) -> TripSummary {
        let mut summary = TripSummary {
            total_days: logs.len() as u32,
            trip_duration_minutes: segments.last().map_or(0, |segment| segment.end),
            final_cycle_hours: logs
                .last()
                .map_or(f64::from(self.starting_cycle_minutes) / 60.0, |log| {
                    log.totals.cycle_hours_used_end
                }),
            total_miles: logs.iter().map(|log| log.totals.miles).sum(),
            ..TripSummary::default()
        };
        for segment in segments {
            match segment.kind {
                DutyKind::Driving => summary.total_driving_minutes += segment.duration(),
                DutyKind::Break => summary.total_breaks += 1,
                _ => {}
            }
            if segment.kind.is_on_duty() {
                summary.total_on_duty_minutes += segment.duration();
            }
            if self.is_daily_reset(segment) {
                summary.total_resets += 1;
            }
            if self.is_cycle_restart(segment) {
                summary.total_cycle_restarts += 1;
            }
        }
        summary
    }

    /// Assembles and summarizes in one step.
    pub fn into_result(&self, segments: Vec<DutySegment>) -> Result<TripPlanResult, PlanError> {
        let logs = self.assemble(&segments)?;
        let summary = self.summarize(&segments, &logs);
        Ok(TripPlanResult {
            logs,
            summary,
            segments,
        })
    }
}

fn check_sequence(segments: &[DutySegment]) -> Result<(), PlanError> {
    let mut expected_start = 0;
    for (index, segment) in segments.iter().enumerate() {
        if segment.end <= segment.start {
            return Err(PlanError::InvalidSegmentSequence {
                index,
                reason: format!("segment [{}, {}) is empty or reversed", segment.start, segment.end),
            });
        }
        if segment.start != expected_start {
            let reason = if segment.start > expected_start {
                format!("gap from {expected_start} to {}", segment.start)
            } else {
                format!("overlap from {} to {expected_start}", segment.start)
            };
            return Err(PlanError::InvalidSegmentSequence { index, reason });
        }
        expected_start = segment.end;
    }
    Ok(())
}
