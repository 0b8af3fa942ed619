//! Hours-of-Service rule set.
//!
//! Every regulatory threshold the planner consults lives in [`HosRules`].
//! The planner never hardcodes a limit; alternative regimes are expressed as
//! different `HosRules` values.

use serde::{Deserialize, Serialize};

use crate::clock::DutyClock;
use crate::error::PlanError;

/// Driving allowed before a 30-minute break is required.
pub const MAX_DRIVE_BEFORE_BREAK: u32 = 8 * 60;
pub const BREAK_DURATION: u32 = 30;
pub const MAX_DRIVE_PER_WINDOW: u32 = 11 * 60;
pub const MAX_ON_DUTY_WINDOW: u32 = 14 * 60;
pub const MIN_OFF_DUTY_RESET: u32 = 10 * 60;
/// 70 hours in 8 days.
pub const MAX_CYCLE_ON_DUTY: u32 = 70 * 60;
pub const CYCLE_RESTART_DURATION: u32 = 34 * 60;
pub const FUEL_STOP_INTERVAL_MILES: f64 = 1000.0;
pub const FUEL_STOP_DURATION: u32 = 30;
/// Shortest fuel interval a rule set may ask for.
pub const MIN_FUEL_STOP_INTERVAL_MILES: f64 = 1.0;

/// Limit that bounded a drive allowance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DriveLimit {
    Break,
    DailyDriving,
    OnDutyWindow,
    Cycle,
}

/// Result of asking how long the driver may keep driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DriveAllowance {
    pub minutes: u32,
    /// `None` when the full proposed duration is allowed.
    pub limited_by: Option<DriveLimit>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HosRules {
    /// `None` for regimes exempt from the 30-minute break.
    pub break_after_driving: Option<u32>,
    pub break_minutes: u32,
    pub max_driving_per_window: u32,
    pub max_on_duty_window: u32,
    pub min_off_duty_reset: u32,
    pub max_cycle_on_duty: u32,
    /// Off-duty length that restarts the cycle; `None` disables restarts.
    pub cycle_restart: Option<u32>,
    pub fuel_stop_interval_miles: f64,
    pub fuel_stop_minutes: u32,
}

impl Default for HosRules {
    fn default() -> Self {
        Self {
            break_after_driving: Some(MAX_DRIVE_BEFORE_BREAK),
            break_minutes: BREAK_DURATION,
            max_driving_per_window: MAX_DRIVE_PER_WINDOW,
            max_on_duty_window: MAX_ON_DUTY_WINDOW,
            min_off_duty_reset: MIN_OFF_DUTY_RESET,
            max_cycle_on_duty: MAX_CYCLE_ON_DUTY,
            cycle_restart: Some(CYCLE_RESTART_DURATION),
            fuel_stop_interval_miles: FUEL_STOP_INTERVAL_MILES,
            fuel_stop_minutes: FUEL_STOP_DURATION,
        }
    }
}

impl HosRules {
    /// Carriers that do not operate every day: 60 hours in 7 days.
    pub fn sixty_hour_cycle() -> Self {
        Self {
            max_cycle_on_duty: 60 * 60,
            ..Self::default()
        }
    }

    pub fn without_break_requirement(mut self) -> Self {
        self.break_after_driving = None;
        self
    }

    pub fn without_cycle_restart(mut self) -> Self {
        self.cycle_restart = None;
        self
    }

    /// Cycle limit expressed in hours, as drivers report it.
    pub fn max_cycle_hours(&self) -> f64 {
        f64::from(self.max_cycle_on_duty) / 60.0
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        let positive = [
            ("break_minutes", self.break_minutes),
            ("max_driving_per_window", self.max_driving_per_window),
            ("max_on_duty_window", self.max_on_duty_window),
            ("min_off_duty_reset", self.min_off_duty_reset),
            ("max_cycle_on_duty", self.max_cycle_on_duty),
            ("fuel_stop_minutes", self.fuel_stop_minutes),
        ];
        for (name, value) in positive {
            if value == 0 {
                return Err(PlanError::invalid(format!("rule {name} must be positive")));
            }
        }
        if self.break_after_driving == Some(0) {
            return Err(PlanError::invalid("rule break_after_driving must be positive"));
        }
        if self.cycle_restart == Some(0) {
            return Err(PlanError::invalid("rule cycle_restart must be positive"));
        }
        if self.max_on_duty_window < self.max_driving_per_window {
            return Err(PlanError::invalid(
                "on-duty window must be at least as long as the driving limit",
            ));
        }
        if self.max_cycle_on_duty < self.max_on_duty_window {
            return Err(PlanError::invalid(
                "cycle limit must be at least as long as the on-duty window",
            ));
        }
        // A restart zeroes every counter, so it must also qualify as a reset.
        if self.cycle_restart.is_some_and(|restart| restart < self.min_off_duty_reset) {
            return Err(PlanError::invalid(
                "cycle restart must be at least as long as the daily reset",
            ));
        }
        if self.min_off_duty_reset < self.break_minutes {
            return Err(PlanError::invalid(
                "daily reset must be at least as long as the break",
            ));
        }
        if !(self.fuel_stop_interval_miles.is_finite()
            && self.fuel_stop_interval_miles >= MIN_FUEL_STOP_INTERVAL_MILES)
        {
            return Err(PlanError::invalid(format!(
                "fuel stop interval must be at least {MIN_FUEL_STOP_INTERVAL_MILES} mile"
            )));
        }
        Ok(())
    }

    pub fn needs_break(&self, clock: &DutyClock) -> bool {
        self.break_after_driving
            .is_some_and(|limit| clock.drive_since_break >= limit)
    }

    pub fn needs_daily_reset(&self, clock: &DutyClock) -> bool {
        clock.drive_in_window >= self.max_driving_per_window
            || clock.on_duty_window_elapsed >= self.max_on_duty_window
    }

    pub fn needs_cycle_restart(&self, clock: &DutyClock) -> bool {
        clock.cycle_minutes_used >= self.max_cycle_on_duty
    }

    /// True when taking a break now would leave no window to drive in afterwards.
    pub fn break_exhausts_window(&self, clock: &DutyClock) -> bool {
        clock.on_duty_window_elapsed + self.break_minutes >= self.max_on_duty_window
    }

    pub fn stop_fits_window(&self, clock: &DutyClock, minutes: u32) -> bool {
        clock.on_duty_window_elapsed + minutes <= self.max_on_duty_window
    }

    pub fn stop_fits_cycle(&self, clock: &DutyClock, minutes: u32) -> bool {
        clock.cycle_minutes_used + minutes <= self.max_cycle_on_duty
    }

    /// Largest duration up to `proposed` that keeps every cap satisfied.
    pub fn can_drive_for(&self, clock: &DutyClock, proposed: u32) -> u32 {
        self.drive_allowance(clock, proposed).minutes
    }

    pub fn drive_allowance(&self, clock: &DutyClock, proposed: u32) -> DriveAllowance {
        // Ordered so that on equal headroom the limit needing the longest rest wins.
        let headroom = [
            (
                DriveLimit::Cycle,
                self.max_cycle_on_duty.saturating_sub(clock.cycle_minutes_used),
            ),
            (
                DriveLimit::DailyDriving,
                self.max_driving_per_window.saturating_sub(clock.drive_in_window),
            ),
            (
                DriveLimit::OnDutyWindow,
                self.max_on_duty_window.saturating_sub(clock.on_duty_window_elapsed),
            ),
            (
                DriveLimit::Break,
                self.break_after_driving
                    .map_or(u32::MAX, |limit| limit.saturating_sub(clock.drive_since_break)),
            ),
        ];

        let mut allowance = DriveAllowance {
            minutes: proposed,
            limited_by: None,
        };
        for (limit, available) in headroom {
            if available < allowance.minutes {
                allowance = DriveAllowance {
                    minutes: available,
                    limited_by: Some(limit),
                };
            }
        }
        allowance
    }
}
