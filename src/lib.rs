//! Lunisolar: astronomical event times for the Chinese calendar
//!
//! This crate turns "an ephemeris gives a position at time T" into "at what
//! time does this angle reach X": solar terms, lunar phases, new moons,
//! rise/set/culmination and twilight, and the lunisolar month table with its
//! leap month.
//!
//! ```no_run
//! use lunisolar::Astronomy;
//!
//! let astronomy = Astronomy::analytic();
//! for month in astronomy.lunar_months(2023)? {
//!     println!("{} {} {} days", month.jd_ut, month.name(), month.days);
//! }
//! # Ok::<(), lunisolar::LunisolarError>(())
//! ```

use thiserror::Error;

pub mod almanac;
pub mod calendar;
pub mod config;
pub mod constants;
pub mod coordinates;
pub mod planetlib;
pub mod searchlib;
pub mod time;

// Re-export commonly used types
pub use almanac::twilight::{HorizonEvent, SunTwilightTimes, TransitKind, TwilightTimes};
pub use calendar::LunarMonth;
pub use config::AlmanacConfig;
pub use coordinates::angle::ParseError;
pub use coordinates::GeographicPosition;
pub use planetlib::{
    AnalyticEphemeris, Astronomy, Body, EphemerisError, EphemerisProvider, SharedEphemeris,
};
pub use time::{
    CalendarDay, CalendarTuple, EphemerisTime, JulianDay, JulianDayWithIndex, LocalJulianDay,
    TimeError,
};

/// Main error type for the lunisolar library
#[derive(Debug, Error)]
pub enum LunisolarError {
    #[error("Ephemeris error: {0}")]
    Ephemeris(#[from] EphemerisError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Time error: {0}")]
    Time(#[from] TimeError),

    #[error("{operation} did not converge on {target} after {iterations} iterations (last jd {jd})")]
    Convergence {
        operation: &'static str,
        target: f64,
        iterations: usize,
        jd: f64,
    },

    #[error("Batch stopped after {completed} events")]
    Batch {
        completed: usize,
        #[source]
        source: Box<LunisolarError>,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for lunisolar operations
pub type Result<T> = std::result::Result<T, LunisolarError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_batch_error_keeps_source() {
        let inner = LunisolarError::Ephemeris(EphemerisError::UnsupportedBody {
            body: "Pluto".to_string(),
            jd: 2_451_545.0,
        });
        let batch = LunisolarError::Batch {
            completed: 7,
            source: Box::new(inner),
        };

        assert_eq!(batch.to_string(), "Batch stopped after 7 events");
        let source = batch.source().unwrap().to_string();
        assert!(source.contains("Pluto"), "{}", source);
    }

    #[test]
    fn test_conversions() {
        let err: LunisolarError = "12x34".parse::<coordinates::angle::Angle>().unwrap_err().into();
        assert!(matches!(err, LunisolarError::Parse(_)));

        let err: LunisolarError = EphemerisError::Poisoned.into();
        assert!(err.to_string().starts_with("Ephemeris error"));
    }
}
