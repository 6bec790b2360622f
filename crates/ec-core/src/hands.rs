use std::f64::consts::TAU;

use chrono::Timelike;
use serde::Serialize;

/// Clock-face hand angles in radians, clockwise from twelve o'clock.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ClockHands {
    pub hour: f64,
    pub minute: f64,
    pub second: f64,
}

impl ClockHands {
    pub fn from_time<T: Timelike>(t: &T) -> Self {
        let h = f64::from(t.hour() % 12);
        let m = f64::from(t.minute());
        let s = f64::from(t.second());
        Self {
            hour: TAU * (h + m / 60.0) / 12.0,
            minute: TAU * (m + s / 60.0) / 60.0,
            second: TAU * s / 60.0,
        }
    }
}
