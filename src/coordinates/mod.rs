//! Coordinate pairs used throughout the crate
//!
//! Every type here stores radians. The frames are kept as distinct types so
//! that ecliptic and equatorial angles are never mixed without an explicit
//! conversion through [`transform`].

pub mod angle;
pub mod transform;

use serde::{Deserialize, Serialize};

use crate::coordinates::angle::{normalize_positive, Angle, ParseError};

/// Signed angular distance of a body west of the local meridian, radians in `(-π, π]`
pub type HourAngle = f64;

/// A frame-agnostic (longitude, latitude) pair, the currency of the rotation engine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spherical {
    pub lon: f64,
    pub lat: f64,
}

impl Spherical {
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }
}

/// Ecliptic longitude and latitude
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ecliptic {
    pub lon: f64,
    pub lat: f64,
}

impl Ecliptic {
    /// Create ecliptic coordinates, normalizing longitude into `[0, 2π)`
    pub fn new(lon: f64, lat: f64) -> Self {
        Self {
            lon: normalize_positive(lon),
            lat,
        }
    }
}

/// Right ascension and declination
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Equatorial {
    pub ra: f64,
    pub dec: f64,
}

impl Equatorial {
    /// Create equatorial coordinates, normalizing right ascension into `[0, 2π)`
    pub fn new(ra: f64, dec: f64) -> Self {
        Self {
            ra: normalize_positive(ra),
            dec,
        }
    }
}

/// Azimuth and altitude
///
/// Azimuth is measured from the south, increasing westward, matching the
/// hour-angle convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Horizontal {
    pub az: f64,
    pub alt: f64,
}

impl Horizontal {
    pub fn new(az: f64, alt: f64) -> Self {
        Self { az, alt }
    }
}

macro_rules! spherical_conversions {
    ($frame:ty, $first:ident, $second:ident) => {
        impl From<$frame> for Spherical {
            fn from(value: $frame) -> Self {
                Spherical {
                    lon: value.$first,
                    lat: value.$second,
                }
            }
        }

        impl From<Spherical> for $frame {
            fn from(value: Spherical) -> Self {
                Self {
                    $first: value.lon,
                    $second: value.lat,
                }
            }
        }
    };
}

spherical_conversions!(Ecliptic, lon, lat);
spherical_conversions!(Equatorial, ra, dec);
spherical_conversions!(Horizontal, az, alt);

/// An observer on the Earth's surface
///
/// Longitude is negative west of Greenwich, latitude negative south of the
/// equator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeographicPosition {
    /// Longitude in radians
    pub longitude: f64,
    /// Latitude in radians
    pub latitude: f64,
    /// Height above sea level in meters
    #[serde(default)]
    pub elevation_m: f64,
}

impl GeographicPosition {
    /// Create a position from radians at sea level
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
            elevation_m: 0.0,
        }
    }

    /// Create a position from decimal degrees at sea level
    pub fn from_degrees(longitude: f64, latitude: f64) -> Self {
        Self::new(longitude.to_radians(), latitude.to_radians())
    }

    /// Create a position from two angle strings, DMS or decimal degrees
    pub fn parse(longitude: &str, latitude: &str) -> Result<Self, ParseError> {
        let lon: Angle = longitude.parse()?;
        let lat: Angle = latitude.parse()?;
        Ok(Self::new(lon.to_radians(), lat.to_radians()))
    }

    /// Set the observer's height above sea level
    pub fn with_elevation(mut self, elevation_m: f64) -> Self {
        self.elevation_m = elevation_m;
        self
    }

    /// Height above sea level in kilometers
    pub fn elevation_km(&self) -> f64 {
        self.elevation_m / 1000.0
    }
}
