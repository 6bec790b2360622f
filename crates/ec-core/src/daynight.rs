//! True day and night lengths from solar declination.
//!
//! Uses the cosine declination approximation and the sunrise hour angle.
//! Only latitude matters here; longitude shifts sunrise, not day length.

use std::f64::consts::{PI, TAU};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::constants::{
    AXIAL_TILT_DEG, DAYS_PER_YEAR, HOURS_PER_DAY, POLAR_CIRCLE_DEG, SECONDS_PER_HOUR,
    SOLSTICE_OFFSET_DAYS,
};

/// Which half of the day lasts longer in real time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Half {
    Day,
    Night,
    Equal,
}

/// Hours of daylight and darkness for one date. `day_hours + night_hours == 24`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayNightDurations {
    pub day_hours: f64,
    pub night_hours: f64,
}

impl DayNightDurations {
    /// Build from the daylight length, clamped to `[0, 24]`.
    pub fn from_day_hours(day_hours: f64) -> Self {
        let day_hours = day_hours.clamp(0.0, HOURS_PER_DAY);
        Self {
            day_hours,
            night_hours: HOURS_PER_DAY - day_hours,
        }
    }

    /// Stretch amplitude: `|day - night| / 24`. Zero at the equinoxes, one
    /// under continuous day or night.
    pub fn amplitude(&self) -> f64 {
        (self.day_hours - self.night_hours).abs() / (self.day_hours + self.night_hours)
    }

    /// True when darkness outlasts daylight.
    pub fn nights_longer(&self) -> bool {
        self.night_hours > self.day_hours
    }

    pub fn longer_half(&self) -> Half {
        if self.nights_longer() {
            Half::Night
        } else if self.day_hours > self.night_hours {
            Half::Day
        } else {
            Half::Equal
        }
    }

    pub fn day_seconds(&self) -> f64 {
        self.day_hours * SECONDS_PER_HOUR
    }

    pub fn night_seconds(&self) -> f64 {
        self.night_hours * SECONDS_PER_HOUR
    }
}

/// Solar declination in radians for a 1-based day of year.
pub fn solar_declination(day_of_year: u32) -> f64 {
    let angle = TAU / DAYS_PER_YEAR * (f64::from(day_of_year) + SOLSTICE_OFFSET_DAYS);
    (-AXIAL_TILT_DEG * angle.cos()).to_radians()
}

/// Sunrise hour angle in radians, in `[0, π]`.
///
/// When `-tan(φ)·tan(δ)` leaves `[-1, 1]` the sun does not cross the horizon.
/// Beyond the polar circle this is read as continuous night (`0`), otherwise
/// continuous day (`π`). The sign of the declination is not consulted, so
/// polar day is reported as night too.
pub fn hour_angle(latitude: f64, declination: f64) -> f64 {
    let x = -latitude.to_radians().tan() * declination.tan();
    if (-1.0..=1.0).contains(&x) {
        return x.acos();
    }
    let fallback = if latitude.abs() > POLAR_CIRCLE_DEG {
        0.0
    } else {
        PI
    };
    tracing::debug!(latitude, x, fallback, "hour angle undefined, using polar fallback");
    fallback
}

/// Day and night lengths for `date` at `latitude` (degrees).
///
/// Pure and total for latitudes in `[-90, 90]`; callers validate the range.
pub fn compute_durations(date: NaiveDate, latitude: f64) -> DayNightDurations {
    let declination = solar_declination(date.ordinal());
    let h = hour_angle(latitude, declination);
    DayNightDurations::from_day_hours(HOURS_PER_DAY / PI * h)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_equator_is_twelve_hours() {
        let d = compute_durations(date(2024, 6, 21), 0.0);
        assert_abs_diff_eq!(d.day_hours, 12.0, epsilon = 1e-9);
        assert_abs_diff_eq!(d.night_hours, 12.0, epsilon = 1e-9);
    }

    #[test]
    fn test_paris_summer_longer_days() {
        let d = compute_durations(date(2024, 6, 21), 48.8566);
        assert!(d.day_hours > 15.5 && d.day_hours < 16.5, "got {}", d.day_hours);
        assert!(!d.nights_longer());
    }

    #[test]
    fn test_paris_winter_longer_nights() {
        let d = compute_durations(date(2024, 12, 21), 48.8566);
        assert!(d.day_hours > 7.5 && d.day_hours < 8.5, "got {}", d.day_hours);
        assert!(d.nights_longer());
    }

    #[test]
    fn test_hemispheres_mirror() {
        let north = compute_durations(date(2024, 6, 21), 40.0);
        let south = compute_durations(date(2024, 6, 21), -40.0);
        assert_abs_diff_eq!(north.day_hours, south.night_hours, epsilon = 1e-9);
    }

    #[test]
    fn test_polar_fallback_is_night() {
        // Above the polar circle both solstices report continuous night.
        let winter = compute_durations(date(2024, 12, 21), 80.0);
        let summer = compute_durations(date(2024, 6, 21), 80.0);
        assert_eq!(winter.day_hours, 0.0);
        assert_eq!(summer.day_hours, 0.0);
        assert_eq!(summer.night_hours, 24.0);
    }

    #[test]
    fn test_hour_angle_fallback_below_polar_circle() {
        // An out-of-domain argument below 66.5° is read as continuous day.
        assert_eq!(hour_angle(60.0, 1.2), PI);
        assert_eq!(hour_angle(70.0, 1.2), 0.0);
    }

    #[test]
    fn test_amplitude() {
        let d = DayNightDurations::from_day_hours(16.0);
        assert_abs_diff_eq!(d.amplitude(), 8.0 / 24.0, epsilon = 1e-12);
        assert_eq!(DayNightDurations::from_day_hours(12.0).amplitude(), 0.0);
        assert_eq!(DayNightDurations::from_day_hours(0.0).amplitude(), 1.0);
    }

    #[test]
    fn test_longer_half() {
        assert_eq!(DayNightDurations::from_day_hours(16.0).longer_half(), Half::Day);
        assert_eq!(DayNightDurations::from_day_hours(8.0).longer_half(), Half::Night);
        assert_eq!(DayNightDurations::from_day_hours(12.0).longer_half(), Half::Equal);
    }

    #[test]
    fn test_from_day_hours_clamps() {
        assert_eq!(DayNightDurations::from_day_hours(30.0).night_hours, 0.0);
        assert_eq!(DayNightDurations::from_day_hours(-1.0).day_hours, 0.0);
    }
}
