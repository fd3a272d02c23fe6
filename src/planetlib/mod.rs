//! Solar system bodies and the ephemeris facade
//!
//! [`Astronomy`] owns a [`SharedEphemeris`] handle and an [`AlmanacConfig`]
//! and turns raw provider output into typed body states. The event
//! computations (solar terms, phases, rise/set, the lunisolar calendar) are
//! implemented on it in the `almanac` and `calendar` modules.

pub mod analytic;
pub mod provider;

use std::collections::HashMap;
use std::f64::consts::PI;
use std::str::FromStr;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{AlmanacConfig, DeltaTModel};
use crate::constants::{ABERRATION_ARCSEC, ARCSEC_PER_RADIAN};
use crate::coordinates::angle::normalize_half;
use crate::coordinates::transform::{
    altitude_parallax, ecliptic_to_equatorial, equatorial_to_horizontal, horizontal_by_rotation,
    refraction_from_true, topocentric_parallax,
};
use crate::coordinates::{Ecliptic, Equatorial, GeographicPosition, Horizontal, HourAngle};
use crate::time::{EphemerisTime, JulianDay};

pub use analytic::AnalyticEphemeris;
pub use provider::{EphemerisProvider, NutationRecord, RawPosition, SharedEphemeris};

/// Error type for ephemeris queries
#[derive(Debug, Error)]
pub enum EphemerisError {
    #[error("{body} is not supported by this ephemeris (JD {jd})")]
    UnsupportedBody { body: String, jd: f64 },

    #[error("{body} at JD {jd} is outside the ephemeris range ({start_jd}..{end_jd})")]
    OutOfRange {
        body: String,
        jd: f64,
        start_jd: f64,
        end_jd: f64,
    },

    #[error("Ephemeris data unavailable: {0}")]
    DataUnavailable(String),

    #[error("Ephemeris lock poisoned by a panicked caller")]
    Poisoned,
}

/// Result type for ephemeris queries
pub type Result<T> = std::result::Result<T, EphemerisError>;

/// Enum representing the major solar system bodies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Body {
    Sun,
    Mercury,
    Venus,
    Moon,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
}

const ALL_BODIES: [Body; 10] = [
    Body::Sun,
    Body::Mercury,
    Body::Venus,
    Body::Moon,
    Body::Mars,
    Body::Jupiter,
    Body::Saturn,
    Body::Uranus,
    Body::Neptune,
    Body::Pluto,
];

lazy_static! {
    /// Lowercase English and Chinese names to bodies
    static ref BODY_NAMES: HashMap<String, Body> = {
        let mut m = HashMap::new();
        for body in ALL_BODIES {
            m.insert(body.name().to_lowercase(), body);
            m.insert(body.chinese_name().to_string(), body);
        }
        m
    };
}

impl Body {
    /// Get the body's name as a string
    pub fn name(&self) -> &'static str {
        match self {
            Body::Sun => "Sun",
            Body::Mercury => "Mercury",
            Body::Venus => "Venus",
            Body::Moon => "Moon",
            Body::Mars => "Mars",
            Body::Jupiter => "Jupiter",
            Body::Saturn => "Saturn",
            Body::Uranus => "Uranus",
            Body::Neptune => "Neptune",
            Body::Pluto => "Pluto",
        }
    }

    pub fn chinese_name(&self) -> &'static str {
        match self {
            Body::Sun => "太阳",
            Body::Mercury => "水星",
            Body::Venus => "金星",
            Body::Moon => "月亮",
            Body::Mars => "火星",
            Body::Jupiter => "木星",
            Body::Saturn => "土星",
            Body::Uranus => "天王星",
            Body::Neptune => "海王星",
            Body::Pluto => "冥王星",
        }
    }
}

impl FromStr for Body {
    type Err = EphemerisError;

    fn from_str(s: &str) -> Result<Self> {
        BODY_NAMES
            .get(&s.trim().to_lowercase())
            .copied()
            .ok_or_else(|| EphemerisError::DataUnavailable(format!("unknown body {:?}", s)))
    }
}

/// Geocentric ecliptic state of a body
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BodyState {
    pub ecliptic: Ecliptic,
    pub distance_au: f64,
    /// Radians per day
    pub lon_speed: f64,
    pub lat_speed: f64,
    /// AU per day
    pub dist_speed: f64,
}

impl From<RawPosition> for BodyState {
    fn from(raw: RawPosition) -> Self {
        Self {
            ecliptic: Ecliptic::new(raw.lon, raw.lat),
            distance_au: raw.distance_au,
            lon_speed: raw.lon_speed,
            lat_speed: raw.lat_speed,
            dist_speed: raw.dist_speed,
        }
    }
}

/// Obliquity and nutation at an instant, radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EclipticProperties {
    pub true_obliquity: f64,
    pub mean_obliquity: f64,
    pub nutation_longitude: f64,
    pub nutation_obliquity: f64,
}

impl From<NutationRecord> for EclipticProperties {
    fn from(record: NutationRecord) -> Self {
        Self {
            true_obliquity: record.true_obliquity,
            mean_obliquity: record.mean_obliquity,
            nutation_longitude: record.nutation_longitude,
            nutation_obliquity: record.nutation_obliquity,
        }
    }
}

/// A body as seen by an observer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObservedBodyState {
    pub state: BodyState,
    pub equatorial: Equatorial,
    /// Seen from the observer's position and elevation; equal to `equatorial` on the simple path
    pub topocentric: Equatorial,
    pub horizontal: Horizontal,
    pub hour_angle: HourAngle,
    /// Greenwich sidereal time, radians
    pub sidereal_time: f64,
}

/// Ephemeris facade shared by every event computation
#[derive(Debug, Clone)]
pub struct Astronomy {
    ephemeris: SharedEphemeris,
    config: AlmanacConfig,
}

impl Astronomy {
    /// Create a facade over `ephemeris` with the default configuration
    pub fn new(ephemeris: SharedEphemeris) -> Self {
        Self {
            ephemeris,
            config: AlmanacConfig::default(),
        }
    }

    /// A facade over the built-in analytic Sun/Moon ephemeris
    pub fn analytic() -> Self {
        Self::new(SharedEphemeris::new(AnalyticEphemeris::new()))
    }

    pub fn with_config(mut self, config: AlmanacConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &AlmanacConfig {
        &self.config
    }

    pub fn ephemeris(&self) -> &SharedEphemeris {
        &self.ephemeris
    }

    /// Pair a UT day with ΔT from the configured model
    pub fn ephemeris_time(&self, jd_ut: JulianDay) -> Result<EphemerisTime> {
        match self.config.delta_t_model {
            DeltaTModel::Table => Ok(EphemerisTime::new(jd_ut)),
            DeltaTModel::Provider => Ok(EphemerisTime::with_delta_t(
                jd_ut,
                self.ephemeris.delta_t(jd_ut)?,
            )),
        }
    }

    /// Julian day of a calendar date through the provider
    pub fn julian_day(&self, year: i32, month: u32, day: u32, hour: f64) -> Result<JulianDay> {
        self.ephemeris.julian_day(year, month, day, hour)
    }

    pub fn calendar_date(&self, jd: JulianDay) -> Result<(i32, u32, u32, f64)> {
        self.ephemeris.calendar_date(jd)
    }

    pub fn body_state(&self, body: Body, et: &EphemerisTime) -> Result<BodyState> {
        self.ephemeris.position(body, et).map(BodyState::from)
    }

    pub fn ecliptic_properties(&self, et: &EphemerisTime) -> Result<EclipticProperties> {
        self.ephemeris
            .ecliptic_nutation(et)
            .map(EclipticProperties::from)
    }

    /// Position of `body` for `observer`
    ///
    /// With `corrected` the longitude loses the fixed aberration constant,
    /// the true obliquity and apparent sidereal time are used, and the
    /// altitude gets refraction (above the horizon only) and parallax. The
    /// simple path uses the mean obliquity, mean sidereal time and the direct
    /// horizontal formula.
    pub fn observed_body_state(
        &self,
        body: Body,
        et: &EphemerisTime,
        observer: &GeographicPosition,
        corrected: bool,
    ) -> Result<ObservedBodyState> {
        let properties = self.ecliptic_properties(et)?;
        let state = self.body_state(body, et)?;

        let mut longitude = state.ecliptic.lon;
        if corrected {
            longitude -= ABERRATION_ARCSEC / ARCSEC_PER_RADIAN;
        }
        let obliquity = if corrected {
            properties.true_obliquity
        } else {
            properties.mean_obliquity
        };
        let equatorial =
            ecliptic_to_equatorial(Ecliptic::new(longitude, state.ecliptic.lat), obliquity);

        let sidereal_hours = if corrected {
            self.ephemeris.sidereal_time_precise(
                et,
                properties.true_obliquity,
                properties.nutation_longitude,
            )?
        } else {
            self.ephemeris.sidereal_time(et)?
        };
        let sidereal_time = sidereal_hours * PI / 12.0;
        let hour_angle = normalize_half(sidereal_time + observer.longitude - equatorial.ra);

        let horizontal = if corrected {
            let mut horizontal =
                horizontal_by_rotation(hour_angle, equatorial.dec, observer.latitude);
            if horizontal.alt > 0.0 {
                horizontal.alt += refraction_from_true(horizontal.alt);
            }
            horizontal.alt += altitude_parallax(horizontal.alt, state.distance_au);
            horizontal
        } else {
            equatorial_to_horizontal(hour_angle, equatorial.dec, observer.latitude)
        };

        let topocentric = if corrected {
            topocentric_parallax(
                equatorial,
                state.distance_au,
                hour_angle,
                observer.latitude,
                observer.elevation_km(),
            )
            .into()
        } else {
            equatorial
        };

        Ok(ObservedBodyState {
            state,
            equatorial,
            topocentric,
            horizontal,
            hour_angle,
            sidereal_time,
        })
    }
}
