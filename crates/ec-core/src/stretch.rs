//! Instantaneous stretch factor of a fictitious second.
//!
//! The factor is the real duration of one fictitious second, in real seconds.
//! A half-sine modulation rises and falls across the day span and the night
//! span; outside both spans the factor is neutral (1.0).

use std::f64::consts::PI;

use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta, Timelike};
use serde::Serialize;

use crate::constants::{DAY_START_SECS, NIGHT_START_SECS, SECONDS_PER_DAY};
use crate::daynight::{DayNightDurations, Half};
use crate::solar::SolarEvents;

/// Seconds since local midnight, with sub-second precision.
pub fn seconds_of_day<T: Timelike>(t: &T) -> f64 {
    f64::from(t.num_seconds_from_midnight()) + f64::from(t.nanosecond() % 1_000_000_000) * 1e-9
}

/// Which part of the day an instant falls into.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Span {
    Day,
    Night,
    Neutral,
}

/// Span boundaries in seconds of day. `night_end` may exceed 24h when the
/// night crosses midnight.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boundaries {
    pub day_start: f64,
    pub day_end: f64,
    pub night_start: f64,
    pub night_end: f64,
}

impl Boundaries {
    /// Boundaries as seen from `offset`.
    pub fn new(durations: &DayNightDurations, events: &SolarEvents, offset: FixedOffset) -> Self {
        let sunrise = seconds_of_day(&events.sunrise.with_timezone(&offset));
        let sunset = seconds_of_day(&events.sunset.with_timezone(&offset));
        Self {
            day_start: DAY_START_SECS,
            day_end: sunrise + durations.day_seconds(),
            night_start: NIGHT_START_SECS,
            night_end: sunset + durations.night_seconds(),
        }
    }

    /// Locate `secs` and return its span with the half-sine modulation.
    pub fn modulation(&self, secs: f64) -> (Span, f64) {
        if let Some(t) = position_in(secs, self.day_start, self.day_end) {
            return (Span::Day, (t * PI).sin());
        }
        // An early-morning instant may still sit in the night that began
        // the previous evening.
        let night = position_in(secs, self.night_start, self.night_end)
            .or_else(|| position_in(secs + SECONDS_PER_DAY, self.night_start, self.night_end));
        match night {
            Some(t) => (Span::Night, -(t * PI).sin()),
            None => (Span::Neutral, 0.0),
        }
    }
}

/// Normalized position of `secs` in `[start, end)`, or `None` outside it.
fn position_in(secs: f64, start: f64, end: f64) -> Option<f64> {
    (secs >= start && secs < end).then(|| (secs - start) / (end - start))
}

/// Stretch factor for a modulation value: seconds run long in whichever half
/// is longer.
pub fn stretch_for(durations: &DayNightDurations, modulation: f64) -> f64 {
    let amplitude = durations.amplitude();
    match durations.longer_half() {
        Half::Night => 1.0 + amplitude * modulation,
        Half::Day | Half::Equal => 1.0 - amplitude * modulation,
    }
}

/// Real seconds taken by one fictitious second at `instant`.
///
/// Always within `[1 - amplitude, 1 + amplitude]`.
pub fn stretch_factor(
    instant: &DateTime<FixedOffset>,
    durations: &DayNightDurations,
    events: &SolarEvents,
) -> f64 {
    let bounds = Boundaries::new(durations, events, *instant.offset());
    let (_, modulation) = bounds.modulation(seconds_of_day(instant));
    stretch_for(durations, modulation)
}

/// One sample of a stretch profile.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ProfileSample {
    pub time: NaiveTime,
    pub span: Span,
    pub stretch: f64,
}

/// Sample the stretch factor over one local day seen from `offset`, every
/// `every`, starting at midnight.
///
/// Returns an empty profile when `every` is not positive.
pub fn stretch_profile(
    offset: FixedOffset,
    durations: &DayNightDurations,
    events: &SolarEvents,
    every: TimeDelta,
) -> Vec<ProfileSample> {
    let step = every.num_seconds();
    if step <= 0 {
        return Vec::new();
    }
    let bounds = Boundaries::new(durations, events, offset);
    (0..SECONDS_PER_DAY as i64)
        .step_by(step as usize)
        .filter_map(|secs| {
            let time = NaiveTime::from_num_seconds_from_midnight_opt(secs as u32, 0)?;
            let (span, modulation) = bounds.modulation(secs as f64);
            Some(ProfileSample {
                time,
                span,
                stretch: stretch_for(durations, modulation),
            })
        })
        .collect()
}
