//! The running elastic clock.
//!
//! [`ElasticClock`] holds the fictitious time between ticks. It is anchored
//! once at start, then free-runs one fictitious second per [`ElasticClock::step`].
//! It re-anchors when the calendar date changes, or when the measured drift
//! against a fresh anchor exceeds an optional threshold.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate};
use serde::Serialize;

use crate::constants::{DEFAULT_DRIFT_CHECK_EVERY, DEFAULT_STEP_SECS};
use crate::daynight::{DayNightDurations, compute_durations};
use crate::error::{ClockError, Result};
use crate::fictitious::{Anchor, FictitiousTime, advance, tick};
use crate::geo::GeoPosition;
use crate::hands::ClockHands;
use crate::solar::{SolarEventOracle, SolarEvents};
use crate::stretch::stretch_factor;
use crate::zone::ResolvedZone;

/// Tuning for anchoring and drift handling.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Settings {
    /// Integration bucket used when anchoring, in real seconds.
    pub step_secs: u32,
    /// Measure drift every this many ticks. Zero disables measurement.
    pub drift_check_every: u64,
    /// Re-anchor when measured drift exceeds this many seconds.
    pub reanchor_threshold_secs: Option<f64>,
}

impl Settings {
    pub fn validate(&self) -> Result<()> {
        if self.step_secs == 0 {
            return Err(ClockError::InvalidInput(
                "integration step must be at least one second".to_string(),
            ));
        }
        if let Some(threshold) = self.reanchor_threshold_secs
            && !(threshold.is_finite() && threshold > 0.0)
        {
            return Err(ClockError::InvalidInput(format!(
                "re-anchor threshold must be positive, got {threshold}"
            )));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            step_secs: DEFAULT_STEP_SECS,
            drift_check_every: DEFAULT_DRIFT_CHECK_EVERY,
            reanchor_threshold_secs: None,
        }
    }
}

/// Everything a display needs for one tick.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Snapshot {
    pub real_time: DateTime<FixedOffset>,
    pub fictitious_time: FictitiousTime,
    pub stretch_factor: f64,
    pub day_hours: f64,
    pub night_hours: f64,
    pub anchor: Anchor,
    pub zone: String,
    pub hands: ClockHands,
}

/// A snapshot and the real time to wait before the next step.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub snapshot: Snapshot,
    pub wait: Duration,
}

pub struct ElasticClock {
    position: GeoPosition,
    zone: ResolvedZone,
    settings: Settings,
    /// Durations pinned to this date instead of following `now`.
    pinned_date: Option<NaiveDate>,
    date: NaiveDate,
    durations: DayNightDurations,
    anchor: Anchor,
    time: FictitiousTime,
    ticks: u64,
}

impl ElasticClock {
    /// Anchor a new clock at `now`.
    pub fn start<O: SolarEventOracle + ?Sized>(
        position: GeoPosition,
        zone: ResolvedZone,
        settings: Settings,
        pinned_date: Option<NaiveDate>,
        now: DateTime<FixedOffset>,
        oracle: &O,
    ) -> Result<Self> {
        settings.validate()?;
        let now = now.with_timezone(&zone.offset);
        let date = pinned_date.unwrap_or_else(|| now.date_naive());
        let durations = compute_durations(date, position.latitude());

        let mut clock = Self {
            position,
            zone,
            settings,
            pinned_date,
            date,
            durations,
            anchor: Anchor::DayAnchored,
            time: Anchor::DayAnchored.base_time(),
            ticks: 0,
        };
        let events = clock.events(&now, oracle)?;
        clock.reanchor(&now, &events);
        tracing::info!(
            position = %clock.position,
            zone = %clock.zone.id,
            day_hours = clock.durations.day_hours,
            night_hours = clock.durations.night_hours,
            anchor = ?clock.anchor,
            time = %clock.time,
            "elastic clock anchored"
        );
        Ok(clock)
    }

    pub fn position(&self) -> GeoPosition {
        self.position
    }

    pub fn zone(&self) -> &ResolvedZone {
        &self.zone
    }

    pub fn durations(&self) -> DayNightDurations {
        self.durations
    }

    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    pub fn time(&self) -> FictitiousTime {
        self.time
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    fn events<O: SolarEventOracle + ?Sized>(
        &self,
        now: &DateTime<FixedOffset>,
        oracle: &O,
    ) -> Result<SolarEvents> {
        Ok(oracle.sunrise_and_sunset(self.position, now.date_naive(), self.zone.offset)?)
    }

    fn reanchor(&mut self, now: &DateTime<FixedOffset>, events: &SolarEvents) {
        let anchored = advance(*now, &self.durations, events, self.settings.step_secs);
        self.anchor = anchored.anchor;
        self.time = anchored.time;
    }

    /// Seconds the held time runs ahead of a fresh anchor at `now`.
    pub fn drift<O: SolarEventOracle + ?Sized>(
        &self,
        now: DateTime<FixedOffset>,
        oracle: &O,
    ) -> Result<f64> {
        let now = now.with_timezone(&self.zone.offset);
        let events = self.events(&now, oracle)?;
        Ok(self.drift_against(&now, &events))
    }

    fn drift_against(&self, now: &DateTime<FixedOffset>, events: &SolarEvents) -> f64 {
        let fresh = advance(*now, &self.durations, events, self.settings.step_secs);
        self.time.offset_from(&fresh.time)
    }

    fn check_drift(&mut self, now: &DateTime<FixedOffset>, events: &SolarEvents) {
        let every = self.settings.drift_check_every;
        if every == 0 || self.ticks == 0 || self.ticks % every != 0 {
            return;
        }
        let drift = self.drift_against(now, events);
        tracing::debug!(ticks = self.ticks, drift_secs = drift, "drift measured");
        if let Some(threshold) = self.settings.reanchor_threshold_secs
            && drift.abs() > threshold
        {
            tracing::warn!(
                drift_secs = drift,
                threshold_secs = threshold,
                "drift above threshold, re-anchoring"
            );
            self.reanchor(now, events);
        }
    }

    /// Run one tick at real instant `now`.
    ///
    /// The returned snapshot shows the time *before* this tick's advance;
    /// the held time then moves forward by one fictitious second.
    pub fn step<O: SolarEventOracle + ?Sized>(
        &mut self,
        now: DateTime<FixedOffset>,
        oracle: &O,
    ) -> Result<Tick> {
        let now = now.with_timezone(&self.zone.offset);

        let today = now.date_naive();
        let date_changed = self.pinned_date.is_none() && today != self.date;
        if date_changed {
            tracing::info!(from = %self.date, to = %today, "calendar date changed, re-anchoring");
            self.date = today;
            self.durations = compute_durations(today, self.position.latitude());
        }

        let events = self.events(&now, oracle)?;
        if date_changed {
            self.reanchor(&now, &events);
        } else {
            self.check_drift(&now, &events);
        }

        let stretch = stretch_factor(&now, &self.durations, &events);
        let snapshot = self.snapshot(now, stretch);
        let (next, wait) = tick(self.time, stretch);
        self.time = next;
        self.ticks += 1;
        Ok(Tick { snapshot, wait })
    }

    fn snapshot(&self, real_time: DateTime<FixedOffset>, stretch: f64) -> Snapshot {
        Snapshot {
            real_time,
            fictitious_time: self.time,
            stretch_factor: stretch,
            day_hours: self.durations.day_hours,
            night_hours: self.durations.night_hours,
            anchor: self.anchor,
            zone: self.zone.id.clone(),
            hands: ClockHands::from_time(&self.time.as_naive()),
        }
    }
}
