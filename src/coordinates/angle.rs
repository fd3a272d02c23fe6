//! # Angle Utilities
//!
//! Radian normalization, tolerance comparison and degree-minute-second text
//! handling shared by the coordinate engine and the event solvers.
//!
//! ## Normalization ranges
//!
//! - [`normalize_positive`] maps any angle into `[0, 2π)`
//! - [`normalize_half`] maps any angle into `(-π, π]`
//!
//! ## Examples
//!
//! ```rust
//! use lunisolar::coordinates::angle::{Angle, normalize_positive};
//!
//! let longitude: Angle = "116°23'".parse().unwrap();
//! assert!((longitude.to_degrees() - 116.383_333).abs() < 1e-6);
//!
//! let wrapped = normalize_positive(-std::f64::consts::FRAC_PI_2);
//! assert!((wrapped - 1.5 * std::f64::consts::PI).abs() < 1e-12);
//! ```

use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::constants::TAU;

const DEGREE_SIGN: char = '\u{00B0}';
const MINUTE_SIGN: char = '\'';
const SECOND_SIGN: char = '"';
const PRIME: char = '\u{2032}';
const DOUBLE_PRIME: char = '\u{2033}';

/// Error raised for malformed degree-minute-second strings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("number without delimiter at position {position} in {input:?}")]
    NoDelimiter { input: String, position: usize },

    #[error("unknown symbol {symbol:?} at position {position} in {input:?}")]
    UnknownSymbol {
        input: String,
        symbol: char,
        position: usize,
    },

    #[error("invalid degrees in {input:?}")]
    InvalidDegrees { input: String },

    #[error("invalid minutes in {input:?}")]
    InvalidMinutes { input: String },

    #[error("invalid seconds in {input:?}")]
    InvalidSeconds { input: String },
}

/// Result type for angle parsing
pub type Result<T> = std::result::Result<T, ParseError>;

/// Internal representation format for angle values
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AngleFormat {
    /// Angle stored in degrees
    Degrees(f64),
    /// Angle stored in radians
    Radians(f64),
}

/// An angular measurement that remembers the unit it was given in
///
/// Parsed DMS text is stored as degrees, so `"39°54'"` reads back as 39.9
/// without a radian round trip. Computed values are usually radians.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Angle {
    angle: AngleFormat,
}

impl Angle {
    /// Creates an angle from a value in degrees
    pub fn from_degrees(degrees: f64) -> Self {
        Angle {
            angle: AngleFormat::Degrees(degrees),
        }
    }

    /// Creates an angle from a value in radians
    pub fn from_radians(radians: f64) -> Self {
        Angle {
            angle: AngleFormat::Radians(radians),
        }
    }

    /// Parses degree-minute-second text such as `116°23'` or `33° 23′ 22.5″`
    ///
    /// Degrees and minutes must be integers, seconds may carry a fraction.
    /// ASCII `'`/`"` and the Unicode prime/double-prime are both accepted.
    pub fn parse_dms(text: &str) -> Result<Self> {
        parse_dms_degrees(text).map(Angle::from_degrees)
    }

    /// Returns the angle value in degrees
    pub fn to_degrees(&self) -> f64 {
        match self.angle {
            AngleFormat::Degrees(deg) => deg,
            AngleFormat::Radians(rad) => rad * (180.0 / PI),
        }
    }

    /// Returns the angle value in radians
    pub fn to_radians(&self) -> f64 {
        match self.angle {
            AngleFormat::Degrees(deg) => deg * (PI / 180.0),
            AngleFormat::Radians(rad) => rad,
        }
    }

    /// Returns the internal format of this angle
    pub fn format(&self) -> AngleFormat {
        self.angle
    }

    /// Formats the angle as `D°M'S.ssss"`
    pub fn to_dms_string(&self) -> String {
        format_dms(self.to_degrees())
    }
}

/// Accepts either DMS text or a plain decimal number of degrees
impl FromStr for Angle {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().parse::<f64>() {
            Ok(degrees) => Ok(Angle::from_degrees(degrees)),
            Err(_) => Angle::parse_dms(s),
        }
    }
}

impl fmt::Display for Angle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dms_string())
    }
}

/// Parses degree-minute-second text into decimal degrees
pub fn parse_dms_degrees(text: &str) -> Result<f64> {
    let mut degrees = 0i64;
    let mut minutes = 0i64;
    let mut seconds = 0.0f64;

    // A number followed by whitespace must be closed by a delimiter next
    let mut number_ended = false;
    let mut buffer = String::new();

    for (position, ch) in text.chars().enumerate() {
        let ch = match ch {
            PRIME => MINUTE_SIGN,
            DOUBLE_PRIME => SECOND_SIGN,
            other => other,
        };

        if ch.is_ascii_digit() || ch == '.' {
            if number_ended {
                return Err(ParseError::NoDelimiter {
                    input: text.to_string(),
                    position,
                });
            }
            buffer.push(ch);
        } else if ch.is_whitespace() {
            if !buffer.is_empty() {
                number_ended = true;
            }
        } else if ch == DEGREE_SIGN {
            degrees = buffer.parse().map_err(|_| ParseError::InvalidDegrees {
                input: text.to_string(),
            })?;
            buffer.clear();
            number_ended = false;
        } else if ch == MINUTE_SIGN {
            minutes = buffer.parse().map_err(|_| ParseError::InvalidMinutes {
                input: text.to_string(),
            })?;
            buffer.clear();
            number_ended = false;
        } else if ch == SECOND_SIGN {
            seconds = buffer.parse().map_err(|_| ParseError::InvalidSeconds {
                input: text.to_string(),
            })?;
            buffer.clear();
            number_ended = false;
        } else {
            return Err(ParseError::UnknownSymbol {
                input: text.to_string(),
                symbol: ch,
                position,
            });
        }
    }

    if !buffer.is_empty() {
        return Err(ParseError::NoDelimiter {
            input: text.to_string(),
            position: text.chars().count(),
        });
    }

    Ok(degrees as f64 + minutes as f64 / 60.0 + seconds / 3600.0)
}

/// Formats decimal degrees as `D°M'S.ssss"`, with a leading `-` for negative input
pub fn format_dms(degrees: f64) -> String {
    let magnitude = degrees.abs();
    let whole = magnitude.trunc() as i64;
    let minutes = (magnitude * 60.0 % 60.0).trunc() as i64;
    let seconds = magnitude * 3600.0 % 60.0;
    let sign = if degrees < 0.0 { "-" } else { "" };

    format!(
        "{}{}{}{}{}{:.4}{}",
        sign, whole, DEGREE_SIGN, minutes, MINUTE_SIGN, seconds, SECOND_SIGN
    )
}

/// Maps an angle into `[0, 2π)`
pub fn normalize_positive(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Maps an angle into `(-π, π]`
pub fn normalize_half(angle: f64) -> f64 {
    let wrapped = normalize_positive(angle);
    if wrapped > PI {
        wrapped - TAU
    } else {
        wrapped
    }
}

/// Smallest multiple of `step` that is greater than or equal to `value`
pub fn next_multiple(value: f64, step: f64) -> f64 {
    (value / step).ceil() * step
}

/// Absolute-difference comparison with a tolerance of `10^-decimal_places`
pub fn floats_nearly_equal(a: f64, b: f64, decimal_places: i32) -> bool {
    (a - b).abs() < 10f64.powi(-decimal_places)
}

/// Signed distance from `a` to the nearest multiple of `b`, in `(-b/2, b/2]`
pub fn signed_remainder(a: f64, b: f64) -> f64 {
    let mut c = a / b;
    c -= c.floor();
    if c > 0.5 {
        c -= 1.0;
    }
    c * b
}

/// Shadow length of a unit-height gnomon for a body at `altitude`
///
/// Zero when the body is on or below the horizon.
pub fn shadow_length(altitude: f64) -> f64 {
    if altitude > 0.0 && altitude <= FRAC_PI_2 {
        (FRAC_PI_2 - altitude).tan()
    } else {
        0.0
    }
}
