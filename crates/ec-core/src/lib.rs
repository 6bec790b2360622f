//! Elastic day/night clock.
//!
//! One calendar day is always two fictitious 12-hour halves, day and night,
//! each stretched or compressed to fill the real daylight or darkness at a
//! location and date. This crate computes true day lengths from solar
//! declination, the instantaneous stretch of a fictitious second, and the
//! fictitious time of day obtained by integrating that stretch from the
//! most recent sunrise or sunset.
//!
//! Zero I/O: timezones, sunrise/sunset and "now" come in through traits.

pub mod constants;
pub mod daynight;
pub mod elastic;
pub mod error;
pub mod fictitious;
pub mod geo;
pub mod hands;
pub mod solar;
pub mod stretch;
pub mod time;
pub mod zone;

pub use daynight::{DayNightDurations, Half, compute_durations};
pub use elastic::{ElasticClock, Settings, Snapshot, Tick};
pub use error::{ClockError, Result, SolarError};
pub use fictitious::{Anchor, Anchored, FictitiousTime, advance, anchor_with, integrate, tick};
pub use geo::GeoPosition;
pub use hands::ClockHands;
pub use solar::{SolarEventOracle, SolarEvents, SunriseEquation};
pub use stretch::{ProfileSample, Span, stretch_factor, stretch_profile};
pub use time::{ManualClock, SystemClock, WallClock};
pub use zone::{FixedZone, NauticalZones, ResolvedZone, TimezoneResolver, resolve_zone};
