/// Earth's axial tilt used by the declination approximation, in degrees.
pub const AXIAL_TILT_DEG: f64 = 23.44;

/// Length of the year in the declination model, in days.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Days between the December solstice and January 1st.
pub const SOLSTICE_OFFSET_DAYS: f64 = 10.0;

/// Latitude beyond which an undefined hour angle is read as continuous night.
pub const POLAR_CIRCLE_DEG: f64 = 66.5;

pub const HOURS_PER_DAY: f64 = 24.0;

pub const SECONDS_PER_HOUR: f64 = 3600.0;

pub const SECONDS_PER_DAY: f64 = 86_400.0;

/// Fictitious day half begins at 06:00.
pub const DAY_START_SECS: f64 = 6.0 * SECONDS_PER_HOUR;

/// Fictitious night half begins at 18:00.
pub const NIGHT_START_SECS: f64 = 18.0 * SECONDS_PER_HOUR;

/// Default integration bucket when anchoring: one hour.
pub const DEFAULT_STEP_SECS: u32 = 3600;

/// Default number of ticks between drift measurements.
pub const DEFAULT_DRIFT_CHECK_EVERY: u64 = 600;

/// Floor for the real wait between ticks. Polar amplitudes reach 1, which
/// would otherwise drive the stretch factor to zero.
pub const MIN_TICK_WAIT_SECS: f64 = 0.001;

/// Solar zenith at official sunrise/sunset (refraction + solar radius), degrees.
pub const SUN_ZENITH_DEG: f64 = 90.833;
