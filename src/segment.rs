//! Duty segments emitted by the planner.

use serde::Serialize;

use crate::traits::Coordinates;

/// Duty status of a scheduled interval, as drawn on a log sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DutyKind {
    Driving,
    OnDutyNotDriving,
    Break,
    SleeperBerth,
    OffDuty,
}

impl DutyKind {
    /// Counts toward the on-duty window and the cycle.
    pub fn is_on_duty(self) -> bool {
        matches!(self, DutyKind::Driving | DutyKind::OnDutyNotDriving)
    }
}

/// Where a forced stop happens.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationHint {
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mile_marker: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates: Option<Coordinates>,
}

impl LocationHint {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            mile_marker: None,
            coordinates: None,
        }
    }

    pub fn at_mile(mut self, mile: f64) -> Self {
        self.mile_marker = Some(mile);
        self
    }

    pub fn at(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }
}

/// One scheduled interval, in minutes from trip start. `end > start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DutySegment {
    pub kind: DutyKind,
    #[serde(rename = "startOffsetMinutes")]
    pub start: u32,
    #[serde(rename = "endOffsetMinutes")]
    pub end: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_hint: Option<LocationHint>,
}

impl DutySegment {
    pub fn new(kind: DutyKind, start: u32, end: u32) -> Self {
        Self {
            kind,
            start,
            end,
            location_hint: None,
        }
    }

    pub fn with_hint(mut self, hint: LocationHint) -> Self {
        self.location_hint = Some(hint);
        self
    }

    pub fn duration(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    /// Cuts the segment at `at`, keeping the kind and hint on both halves.
    /// Returns `None` unless `start < at < end`.
    pub fn split_at(&self, at: u32) -> Option<(DutySegment, DutySegment)> {
        if at <= self.start || at >= self.end {
            return None;
        }
        let head = DutySegment {
            end: at,
            ..self.clone()
        };
        let tail = DutySegment {
            start: at,
            ..self.clone()
        };
        Some((head, tail))
    }
}
