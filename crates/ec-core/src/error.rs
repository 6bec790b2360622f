use chrono::NaiveDate;

/// Errors raised by the elastic clock core.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClockError {
    /// Coordinates or settings outside their documented range.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No timezone (and therefore no UTC offset) for the coordinates.
    #[error("no timezone could be resolved for latitude {latitude}, longitude {longitude}")]
    UnresolvedLocation { latitude: f64, longitude: f64 },

    #[error(transparent)]
    Solar(#[from] SolarError),
}

/// Failures of a sunrise/sunset lookup.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolarError {
    #[error("the sun never rises on {date} at latitude {latitude}")]
    NeverRises { date: NaiveDate, latitude: f64 },

    #[error("the sun never sets on {date} at latitude {latitude}")]
    NeverSets { date: NaiveDate, latitude: f64 },

    #[error("date out of range: {0}")]
    DateOutOfRange(NaiveDate),
}

pub type Result<T> = std::result::Result<T, ClockError>;
