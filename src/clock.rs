//! Duty clock: the counters every Hours-of-Service decision reads.
//!
//! All values are whole minutes. The clock only records what happened; the
//! rule set decides what is allowed next.

use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyClock {
    /// Driving since the last qualifying break (or longer rest).
    pub drive_since_break: u32,
    /// Driving inside the current on-duty window.
    pub drive_in_window: u32,
    /// Wall-clock minutes since the current on-duty window opened.
    pub on_duty_window_elapsed: u32,
    /// On-duty minutes within the rolling cycle.
    pub cycle_minutes_used: u32,
}

impl DutyClock {
    /// A fresh shift for a driver who already used `cycle_minutes_used` of the cycle.
    pub fn starting_at(cycle_minutes_used: u32) -> Self {
        Self {
            cycle_minutes_used,
            ..Self::default()
        }
    }

    pub fn record_driving(&mut self, minutes: u32) {
        self.drive_since_break += minutes;
        self.drive_in_window += minutes;
        self.on_duty_window_elapsed += minutes;
        self.cycle_minutes_used += minutes;
    }

    /// On duty, not driving (fueling, loading, inspections).
    pub fn record_on_duty(&mut self, minutes: u32) {
        self.on_duty_window_elapsed += minutes;
        self.cycle_minutes_used += minutes;
    }

    /// A short rest clears the break counter but the window keeps running.
    pub fn record_break(&mut self, minutes: u32) {
        self.drive_since_break = 0;
        self.on_duty_window_elapsed += minutes;
    }

    /// A qualifying off-duty period closes the window. The cycle is untouched.
    pub fn reset_window(&mut self) {
        self.drive_since_break = 0;
        self.drive_in_window = 0;
        self.on_duty_window_elapsed = 0;
    }

    pub fn restart_cycle(&mut self) {
        self.reset_window();
        self.cycle_minutes_used = 0;
    }
}
