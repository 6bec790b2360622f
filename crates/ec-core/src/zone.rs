use chrono::{FixedOffset, Offset, Utc};

use crate::error::{ClockError, Result};
use crate::geo::GeoPosition;

/// A timezone identifier with the fixed UTC offset to use for it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedZone {
    pub id: String,
    pub offset: FixedOffset,
}

impl ResolvedZone {
    pub fn utc() -> Self {
        Self {
            id: "Etc/UTC".to_string(),
            offset: Utc.fix(),
        }
    }

    /// Build from an offset in (possibly fractional) hours.
    pub fn from_hours(id: impl Into<String>, offset_hours: f64) -> Result<Self> {
        let secs = (offset_hours * 3600.0).round();
        let offset = (offset_hours.is_finite() && secs.abs() < 86_400.0)
            .then(|| FixedOffset::east_opt(secs as i32))
            .flatten()
            .ok_or_else(|| {
                ClockError::InvalidInput(format!("utc offset out of range: {offset_hours}h"))
            })?;
        Ok(Self {
            id: id.into(),
            offset,
        })
    }

    pub fn offset_hours(&self) -> f64 {
        f64::from(self.offset.local_minus_utc()) / 3600.0
    }
}

/// Maps coordinates to a timezone. `None` means no timezone is known there.
pub trait TimezoneResolver {
    fn resolve(&self, position: GeoPosition) -> Option<ResolvedZone>;
}

/// Nautical time zones: one hour per 15° of longitude, named `Etc/GMT±N`
/// (POSIX sign convention, so UTC+1 is `Etc/GMT-1`).
#[derive(Clone, Copy, Debug, Default)]
pub struct NauticalZones;

impl TimezoneResolver for NauticalZones {
    fn resolve(&self, position: GeoPosition) -> Option<ResolvedZone> {
        let hours = (position.longitude() / 15.0).round() as i32;
        let offset = FixedOffset::east_opt(hours * 3600)?;
        let id = if hours == 0 {
            "Etc/UTC".to_string()
        } else {
            format!("Etc/GMT{:+}", -hours)
        };
        Some(ResolvedZone { id, offset })
    }
}

/// Always answers with one configured zone.
#[derive(Clone, Debug)]
pub struct FixedZone(ResolvedZone);

impl FixedZone {
    pub fn new(zone: ResolvedZone) -> Self {
        Self(zone)
    }
}

impl TimezoneResolver for FixedZone {
    fn resolve(&self, _position: GeoPosition) -> Option<ResolvedZone> {
        Some(self.0.clone())
    }
}

/// Resolve a zone, falling back to UTC only when `assume_utc` is set.
pub fn resolve_zone<R: TimezoneResolver + ?Sized>(
    resolver: &R,
    position: GeoPosition,
    assume_utc: bool,
) -> Result<ResolvedZone> {
    match resolver.resolve(position) {
        Some(zone) => Ok(zone),
        None if assume_utc => {
            tracing::warn!(%position, "no timezone for location, assuming UTC");
            Ok(ResolvedZone::utc())
        }
        None => Err(ClockError::UnresolvedLocation {
            latitude: position.latitude(),
            longitude: position.longitude(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct OpenOcean;

    impl TimezoneResolver for OpenOcean {
        fn resolve(&self, _position: GeoPosition) -> Option<ResolvedZone> {
            None
        }
    }

    #[test]
    fn test_nautical_paris_is_utc() {
        let zone = NauticalZones.resolve(GeoPosition::paris()).unwrap();
        assert_eq!(zone.id, "Etc/UTC");
        assert_eq!(zone.offset_hours(), 0.0);
    }

    #[test]
    fn test_nautical_sign_convention() {
        let tokyo = NauticalZones
            .resolve(GeoPosition::new(35.68, 139.69).unwrap())
            .unwrap();
        assert_eq!(tokyo.id, "Etc/GMT-9");
        assert_eq!(tokyo.offset_hours(), 9.0);

        let new_york = NauticalZones
            .resolve(GeoPosition::new(40.71, -74.0).unwrap())
            .unwrap();
        assert_eq!(new_york.id, "Etc/GMT+5");
        assert_eq!(new_york.offset_hours(), -5.0);
    }

    #[test]
    fn test_dateline_resolves() {
        let zone = NauticalZones
            .resolve(GeoPosition::new(0.0, 180.0).unwrap())
            .unwrap();
        assert_eq!(zone.offset_hours(), 12.0);
    }

    #[test]
    fn test_unresolved_location() {
        let err = resolve_zone(&OpenOcean, GeoPosition::paris(), false).unwrap_err();
        assert!(matches!(err, ClockError::UnresolvedLocation { .. }));
        let zone = resolve_zone(&OpenOcean, GeoPosition::paris(), true).unwrap();
        assert_eq!(zone, ResolvedZone::utc());
    }

    #[test]
    fn test_fixed_zone_from_hours() {
        let zone = ResolvedZone::from_hours("Asia/Kolkata", 5.5).unwrap();
        assert_eq!(zone.offset.local_minus_utc(), 19_800);
        assert!(ResolvedZone::from_hours("bad", 30.0).is_err());
        assert!(ResolvedZone::from_hours("bad", f64::NAN).is_err());
        let fixed = FixedZone::new(zone.clone());
        assert_eq!(fixed.resolve(GeoPosition::paris()), Some(zone));
    }
}
