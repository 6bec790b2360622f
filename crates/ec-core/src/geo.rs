use std::fmt;

use crate::error::{ClockError, Result};

/// A point on the globe, in degrees. Always within range once constructed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoPosition {
    latitude: f64,
    longitude: f64,
}

impl GeoPosition {
    /// Validate and build a position.
    ///
    /// Rejects non-finite values, latitudes outside `[-90, 90]` and longitudes
    /// outside `[-180, 180]`.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ClockError::InvalidInput(format!(
                "latitude must be within [-90, 90], got {latitude}"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ClockError::InvalidInput(format!(
                "longitude must be within [-180, 180], got {longitude}"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Paris, the default location.
    pub fn paris() -> Self {
        Self {
            latitude: 48.8566,
            longitude: 2.3522,
        }
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.4}, {:.4})", self.latitude, self.longitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bounds() {
        assert!(GeoPosition::new(90.0, 180.0).is_ok());
        assert!(GeoPosition::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            GeoPosition::new(91.0, 0.0),
            Err(ClockError::InvalidInput(_))
        ));
        assert!(matches!(
            GeoPosition::new(0.0, -180.5),
            Err(ClockError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_rejects_nan() {
        assert!(GeoPosition::new(f64::NAN, 0.0).is_err());
        assert!(GeoPosition::new(0.0, f64::INFINITY).is_err());
    }
}
