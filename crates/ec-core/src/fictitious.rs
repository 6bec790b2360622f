//! Fictitious time of day and its anchoring to real sunrise/sunset.
//!
//! The fictitious day always runs 06:00 → 18:00 from sunrise to sunset and
//! 18:00 → 06:00 through the night. Anchoring integrates the stretch factor
//! from the most recent sunrise or sunset with a piecewise-constant sum over
//! fixed buckets (one hour by default). The bucket length is visible in the
//! result: a finer step follows the modulation more closely.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveTime, TimeDelta, Timelike};
use serde::{Deserialize, Serialize};

use crate::constants::{DAY_START_SECS, MIN_TICK_WAIT_SECS, NIGHT_START_SECS, SECONDS_PER_DAY};
use crate::daynight::DayNightDurations;
use crate::error::Result;
use crate::geo::GeoPosition;
use crate::solar::{SolarEventOracle, SolarEvents};
use crate::stretch::{seconds_of_day, stretch_factor};

/// Wall-clock style time of day with no date. Wraps at 24:00:00.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FictitiousTime(NaiveTime);

impl FictitiousTime {
    /// Build from seconds since midnight, wrapping into `[0, 86400)`.
    pub fn from_seconds(secs: f64) -> Self {
        let wrapped = secs.rem_euclid(SECONDS_PER_DAY);
        let mut whole = wrapped.floor();
        let mut nanos = ((wrapped - whole) * 1e9).round();
        if nanos >= 1e9 {
            whole += 1.0;
            nanos = 0.0;
        }
        let whole = (whole as u32) % (SECONDS_PER_DAY as u32);
        Self(
            NaiveTime::from_num_seconds_from_midnight_opt(whole, nanos as u32)
                .unwrap_or(NaiveTime::MIN),
        )
    }

    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, second).map(Self)
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn second(&self) -> u32 {
        self.0.second()
    }

    pub fn as_naive(&self) -> NaiveTime {
        self.0
    }

    pub fn seconds_of_day(&self) -> f64 {
        seconds_of_day(&self.0)
    }

    pub fn add_seconds(self, secs: f64) -> Self {
        Self::from_seconds(self.seconds_of_day() + secs)
    }

    /// Signed circular difference `self - other` in seconds, in `[-43200, 43200)`.
    pub fn offset_from(&self, other: &Self) -> f64 {
        let half = SECONDS_PER_DAY / 2.0;
        (self.seconds_of_day() - other.seconds_of_day() + half).rem_euclid(SECONDS_PER_DAY) - half
    }
}

impl fmt::Display for FictitiousTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour(), self.minute(), self.second())
    }
}

/// Which real event the fictitious clock was anchored to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Anchor {
    /// Anchored at sunrise, base 06:00:00.
    DayAnchored,
    /// Anchored at sunset, base 18:00:00.
    NightAnchored,
}

impl Anchor {
    pub fn base_time(self) -> FictitiousTime {
        match self {
            Anchor::DayAnchored => FictitiousTime::from_seconds(DAY_START_SECS),
            Anchor::NightAnchored => FictitiousTime::from_seconds(NIGHT_START_SECS),
        }
    }
}

/// Result of anchoring the fictitious clock at a real instant.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchored {
    pub anchor: Anchor,
    /// Real instant of the sunrise or sunset the clock counts from.
    pub anchor_instant: DateTime<FixedOffset>,
    pub elapsed_real_secs: f64,
    pub elapsed_fictitious_secs: f64,
    pub time: FictitiousTime,
}

/// Pick the anchor for `now` and the real seconds elapsed since it.
///
/// Between sunrise and sunset (by time of day) the clock is day-anchored.
/// Otherwise the most recent sunset governs, including early-morning
/// instants that belong to the previous evening's night.
pub fn select_anchor(now: &DateTime<FixedOffset>, events: &SolarEvents) -> (Anchor, f64) {
    let offset = *now.offset();
    let s_now = seconds_of_day(now);
    let s_rise = seconds_of_day(&events.sunrise.with_timezone(&offset));
    let s_set = seconds_of_day(&events.sunset.with_timezone(&offset));

    if s_now >= s_rise && s_now < s_set {
        (Anchor::DayAnchored, s_now - s_rise)
    } else {
        (Anchor::NightAnchored, (s_now - s_set).rem_euclid(SECONDS_PER_DAY))
    }
}

pub(crate) fn secs_to_delta(secs: f64) -> TimeDelta {
    TimeDelta::nanoseconds((secs * 1e9).round() as i64)
}

/// Piecewise-constant integral of the stretch factor over `elapsed_secs`
/// starting at `from`, sampled at the start of each `step_secs` bucket.
pub fn integrate(
    from: DateTime<FixedOffset>,
    elapsed_secs: f64,
    durations: &DayNightDurations,
    events: &SolarEvents,
    step_secs: u32,
) -> f64 {
    if elapsed_secs <= 0.0 {
        return 0.0;
    }
    let step = f64::from(step_secs.max(1));
    let full = (elapsed_secs / step).floor();
    let remainder = elapsed_secs - full * step;

    let bucket = |start: f64, len: f64| {
        let at = from + secs_to_delta(start);
        stretch_factor(&at, durations, events) * len
    };

    let mut total: f64 = (0..full as u64).map(|i| bucket(i as f64 * step, step)).sum();
    if remainder > 0.0 {
        total += bucket(full * step, remainder);
    }
    total
}

/// Anchor the fictitious clock at `now`.
///
/// At the anchor instant itself the result is exactly the base time.
pub fn advance(
    now: DateTime<FixedOffset>,
    durations: &DayNightDurations,
    events: &SolarEvents,
    step_secs: u32,
) -> Anchored {
    let (anchor, elapsed_real_secs) = select_anchor(&now, events);
    let anchor_instant = now - secs_to_delta(elapsed_real_secs);
    let elapsed_fictitious_secs =
        integrate(anchor_instant, elapsed_real_secs, durations, events, step_secs);
    Anchored {
        anchor,
        anchor_instant,
        elapsed_real_secs,
        elapsed_fictitious_secs,
        time: anchor.base_time().add_seconds(elapsed_fictitious_secs),
    }
}

/// Resolve today's solar events through `oracle`, then [`advance`].
pub fn anchor_with<O: SolarEventOracle + ?Sized>(
    oracle: &O,
    position: GeoPosition,
    now: DateTime<FixedOffset>,
    durations: &DayNightDurations,
    step_secs: u32,
) -> Result<Anchored> {
    let events = oracle.sunrise_and_sunset(position, now.date_naive(), *now.offset())?;
    Ok(advance(now, durations, &events, step_secs))
}

/// Advance by exactly one fictitious second. Returns the next time and the
/// real wait before the following tick (`stretch` seconds, floored at 1ms).
pub fn tick(current: FictitiousTime, stretch: f64) -> (FictitiousTime, Duration) {
    let wait = stretch.max(MIN_TICK_WAIT_SECS);
    (current.add_seconds(1.0), Duration::from_secs_f64(wait))
}
