//! Sunrise and sunset lookup.
//!
//! [`SolarEventOracle`] is the seam the clock consumes; [`SunriseEquation`]
//! is the bundled implementation (the almanac sunrise equation).

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::SUN_ZENITH_DEG;
use crate::error::SolarError;
use crate::geo::GeoPosition;

/// Sunrise and sunset around a query instant, in the caller's offset.
///
/// `sunrise` belongs to the query date and `sunset` to the following date,
/// so that a night starting today can be bounded past midnight. Only the
/// time of day of each event is used by the clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarEvents {
    pub sunrise: DateTime<FixedOffset>,
    pub sunset: DateTime<FixedOffset>,
}

pub trait SolarEventOracle {
    /// Sunrise on `date` at `position`, in UTC.
    fn sunrise(&self, position: GeoPosition, date: NaiveDate) -> Result<DateTime<Utc>, SolarError>;

    /// Sunset on `date` at `position`, in UTC.
    fn sunset(&self, position: GeoPosition, date: NaiveDate) -> Result<DateTime<Utc>, SolarError>;

    /// Sunrise for `date` and sunset for `date + 1`, expressed in `offset`.
    fn sunrise_and_sunset(
        &self,
        position: GeoPosition,
        date: NaiveDate,
        offset: FixedOffset,
    ) -> Result<SolarEvents, SolarError> {
        let next = date.succ_opt().ok_or(SolarError::DateOutOfRange(date))?;
        let sunrise = self.sunrise(position, date)?.with_timezone(&offset);
        let sunset = self.sunset(position, next)?.with_timezone(&offset);
        Ok(SolarEvents { sunrise, sunset })
    }
}

/// Almanac sunrise equation. Accurate to a couple of minutes between the
/// polar circles.
#[derive(Clone, Copy, Debug)]
pub struct SunriseEquation {
    zenith_deg: f64,
}

impl SunriseEquation {
    pub fn new() -> Self {
        Self {
            zenith_deg: SUN_ZENITH_DEG,
        }
    }

    fn event(
        &self,
        position: GeoPosition,
        date: NaiveDate,
        rising: bool,
    ) -> Result<DateTime<Utc>, SolarError> {
        let n = f64::from(date.ordinal());
        let lng_hour = position.longitude() / 15.0;
        let approx_hour = if rising { 6.0 } else { 18.0 };
        let t = n + (approx_hour - lng_hour) / 24.0;

        // Sun's mean anomaly and true longitude
        let m = 0.9856 * t - 3.289;
        let l = (m
            + 1.916 * m.to_radians().sin()
            + 0.020 * (2.0 * m).to_radians().sin()
            + 282.634)
            .rem_euclid(360.0);

        // Right ascension, moved into the same quadrant as L, in hours
        let ra = (0.91764 * l.to_radians().tan())
            .atan()
            .to_degrees()
            .rem_euclid(360.0);
        let l_quadrant = (l / 90.0).floor() * 90.0;
        let ra_quadrant = (ra / 90.0).floor() * 90.0;
        let ra = (ra + l_quadrant - ra_quadrant) / 15.0;

        let sin_dec = 0.39782 * l.to_radians().sin();
        let cos_dec = sin_dec.asin().cos();

        let lat = position.latitude().to_radians();
        let cos_h =
            (self.zenith_deg.to_radians().cos() - sin_dec * lat.sin()) / (cos_dec * lat.cos());
        if cos_h > 1.0 {
            return Err(SolarError::NeverRises {
                date,
                latitude: position.latitude(),
            });
        }
        if cos_h < -1.0 {
            return Err(SolarError::NeverSets {
                date,
                latitude: position.latitude(),
            });
        }

        let h_deg = if rising {
            360.0 - cos_h.acos().to_degrees()
        } else {
            cos_h.acos().to_degrees()
        };
        let local_mean = h_deg / 15.0 + ra - 0.06571 * t - 6.622;
        let ut_hours = (local_mean - lng_hour).rem_euclid(24.0);

        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or(SolarError::DateOutOfRange(date))?
            .and_utc();
        Ok(midnight + TimeDelta::milliseconds((ut_hours * 3_600_000.0).round() as i64))
    }
}

impl Default for SunriseEquation {
    fn default() -> Self {
        Self::new()
    }
}

impl SolarEventOracle for SunriseEquation {
    fn sunrise(&self, position: GeoPosition, date: NaiveDate) -> Result<DateTime<Utc>, SolarError> {
        self.event(position, date, true)
    }

    fn sunset(&self, position: GeoPosition, date: NaiveDate) -> Result<DateTime<Utc>, SolarError> {
        self.event(position, date, false)
    }
}
