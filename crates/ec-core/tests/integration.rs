//! Integration tests exercising the full pipeline:
//! durations → solar events → stretch → anchor → ticks.

use approx::assert_abs_diff_eq;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, TimeDelta, TimeZone};
use ec_core::{
    Anchor, DayNightDurations, ElasticClock, FictitiousTime, GeoPosition, NauticalZones,
    ResolvedZone, Settings, SolarEventOracle, SolarEvents, SunriseEquation, TimezoneResolver,
    advance, anchor_with, compute_durations, integrate, stretch_factor,
};
use proptest::prelude::*;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn paris_zone() -> ResolvedZone {
    ResolvedZone::from_hours("Europe/Paris", 1.0).unwrap()
}

fn paris_events(day: NaiveDate) -> SolarEvents {
    SunriseEquation::new()
        .sunrise_and_sunset(GeoPosition::paris(), day, paris_zone().offset)
        .unwrap()
}

fn local(day: NaiveDate, h: u32, m: u32) -> DateTime<FixedOffset> {
    paris_zone()
        .offset
        .from_local_datetime(&day.and_hms_opt(h, m, 0).unwrap())
        .unwrap()
}

#[test]
fn paris_equinox_is_balanced() {
    let d = compute_durations(date(2024, 3, 20), 48.8566);
    assert!((d.day_hours - 12.0).abs() < 0.3, "day {}", d.day_hours);
    assert!((d.night_hours - 12.0).abs() < 0.3, "night {}", d.night_hours);
}

#[test]
fn equator_every_day_of_year() {
    let mut day = date(2024, 1, 1);
    while day.year() == 2024 {
        let d = compute_durations(day, 0.0);
        assert_abs_diff_eq!(d.day_hours, 12.0, epsilon = 0.05);
        assert_abs_diff_eq!(d.night_hours, 12.0, epsilon = 0.05);
        day = day.succ_opt().unwrap();
    }
}

#[test]
fn durations_are_bit_identical() {
    let a = compute_durations(date(2024, 8, 3), 51.5);
    let b = compute_durations(date(2024, 8, 3), 51.5);
    assert_eq!(a.day_hours.to_bits(), b.day_hours.to_bits());
    assert_eq!(a.night_hours.to_bits(), b.night_hours.to_bits());
}

#[test]
fn anchor_at_real_sunrise_and_sunset() {
    let day = date(2024, 3, 20);
    let d = compute_durations(day, 48.8566);
    let ev = paris_events(day);

    let morning = advance(ev.sunrise, &d, &ev, 3600);
    assert_eq!(morning.anchor, Anchor::DayAnchored);
    assert_eq!(morning.time, FictitiousTime::from_hms(6, 0, 0).unwrap());

    let evening = advance(ev.sunset, &d, &ev, 3600);
    assert_eq!(evening.anchor, Anchor::NightAnchored);
    assert_eq!(evening.time, FictitiousTime::from_hms(18, 0, 0).unwrap());
}

#[test]
fn anchor_with_oracle_matches_advance() {
    let day = date(2024, 6, 21);
    let d = compute_durations(day, 48.8566);
    let now = local(day, 15, 30);
    let via_oracle =
        anchor_with(&SunriseEquation::new(), GeoPosition::paris(), now, &d, 3600).unwrap();
    let direct = advance(now, &d, &paris_events(day), 3600);
    assert_eq!(via_oracle, direct);
}

#[test]
fn polar_night_surfaces_solar_error() {
    let svalbard = GeoPosition::new(78.22, 15.65).unwrap();
    let zone = NauticalZones.resolve(svalbard).unwrap();
    let now = zone.offset.with_ymd_and_hms(2024, 12, 21, 12, 0, 0).unwrap();
    let result = ElasticClock::start(
        svalbard,
        zone,
        Settings::default(),
        None,
        now,
        &SunriseEquation::new(),
    );
    assert!(matches!(result, Err(ec_core::ClockError::Solar(_))));
}

#[test]
fn free_running_clock_counts_one_second_per_tick() {
    // One real hour of ticks at Paris in June, walking real time by each wait.
    let day = date(2024, 6, 21);
    let oracle = SunriseEquation::new();
    let mut now = local(day, 10, 0);
    let mut clock = ElasticClock::start(
        GeoPosition::paris(),
        paris_zone(),
        Settings::default(),
        None,
        now,
        &oracle,
    )
    .unwrap();
    let started = clock.time();

    let mut ticks = 0u32;
    let end = now + TimeDelta::hours(1);
    while now < end {
        let tick = clock.step(now, &oracle).unwrap();
        // Long summer day: fictitious seconds are shorter than real ones.
        assert!(tick.snapshot.stretch_factor > 0.0 && tick.snapshot.stretch_factor <= 1.0);
        now += TimeDelta::from_std(tick.wait).unwrap();
        ticks += 1;
    }
    assert!(ticks >= 3600, "ticks {ticks}");
    assert_abs_diff_eq!(clock.time().offset_from(&started), f64::from(ticks), epsilon = 1e-6);
    assert_eq!(clock.ticks(), u64::from(ticks));
}

proptest! {
    #[test]
    fn day_plus_night_is_24(ordinal in 1u32..=366, latitude in -60.0f64..=60.0) {
        let day = NaiveDate::from_yo_opt(2024, ordinal).unwrap();
        let d = compute_durations(day, latitude);
        prop_assert!((d.day_hours + d.night_hours - 24.0).abs() < 1e-9);
        prop_assert!(d.day_hours >= 0.0 && d.night_hours >= 0.0);
    }

    #[test]
    fn stretch_within_amplitude(
        day_hours in 0.0f64..=24.0,
        rise_min in 180u32..540,
        set_min in 960u32..1320,
        now_min in 0u32..1440,
    ) {
        let utc = FixedOffset::east_opt(0).unwrap();
        let d = DayNightDurations::from_day_hours(day_hours);
        let base = date(2024, 5, 1).and_hms_opt(0, 0, 0).unwrap();
        let ev = SolarEvents {
            sunrise: utc.from_utc_datetime(&(base + TimeDelta::minutes(i64::from(rise_min)))),
            sunset: utc.from_utc_datetime(
                &(base + TimeDelta::days(1) + TimeDelta::minutes(i64::from(set_min))),
            ),
        };
        let now = utc.from_utc_datetime(&(base + TimeDelta::minutes(i64::from(now_min))));
        let s = stretch_factor(&now, &d, &ev);
        let a = d.amplitude();
        prop_assert!(s >= 1.0 - a - 1e-12 && s <= 1.0 + a + 1e-12);
        if a < 1.0 {
            prop_assert!(s > 0.0);
        }
    }

    #[test]
    fn integral_is_non_decreasing(
        day_hours in 1.0f64..=23.0,
        first in 0.0f64..40_000.0,
        extra in 0.0f64..10_000.0,
    ) {
        let utc = FixedOffset::east_opt(0).unwrap();
        let d = DayNightDurations::from_day_hours(day_hours);
        let ev = SolarEvents {
            sunrise: utc.with_ymd_and_hms(2024, 9, 1, 5, 30, 0).unwrap(),
            sunset: utc.with_ymd_and_hms(2024, 9, 2, 19, 15, 0).unwrap(),
        };
        let from = ev.sunrise;
        let a = integrate(from, first, &d, &ev, 3600);
        let b = integrate(from, first + extra, &d, &ev, 3600);
        prop_assert!(b >= a - 1e-9);
    }
}
