//! Constants module for astronomical and calendar calculations

use std::f64::consts::PI;

// Astronomical distances
/// Astronomical Unit in kilometers
pub const AU_KM: f64 = 1.495_978_706_91e8;
/// Earth's equatorial radius in kilometers
pub const EARTH_EQUATORIAL_RADIUS_KM: f64 = 6_378.136_6;
/// Earth radius used by the observer-elevation term of the parallax correction
pub const PARALLAX_EARTH_RADIUS_KM: f64 = 6_378.14;
/// Ratio of Earth's polar to equatorial radius
pub const POLAR_EQUATORIAL_RATIO: f64 = 0.996_647_19;

// Time constants
/// Seconds in a day
pub const DAY_S: f64 = 86_400.0;
/// J2000.0 epoch as Julian date
pub const J2000: f64 = 2_451_545.0;
/// Offset between Julian date and Modified Julian date
pub const MJD_OFFSET: f64 = 2_400_000.5;
/// Days in a Julian century
pub const DAYS_PER_CENTURY: f64 = 36_525.0;
/// Mean length of the synodic month in days
pub const MEAN_SYNODIC_MONTH: f64 = 29.530_587_981;
/// Mean length of the tropical year in days
pub const MEAN_TROPICAL_YEAR: f64 = 365.2425;
/// China Standard Time offset from UT, in days
pub const CHINA_STANDARD_TIME_OFFSET: f64 = 8.0 / 24.0;

// Angles
/// Arcseconds per radian
pub const ARCSEC_PER_RADIAN: f64 = 180.0 * 3600.0 / PI;
/// Degrees to radians conversion factor
pub const DEG2RAD: f64 = PI / 180.0;
/// Radians to degrees conversion factor
pub const RAD2DEG: f64 = 180.0 / PI;
/// Tau (2*PI) for full circle
pub const TAU: f64 = 2.0 * PI;

// Corrections
/// Constant of annual aberration plus light time, in arcseconds
pub const ABERRATION_ARCSEC: f64 = 20.5;
/// Equatorial horizontal parallax of a body at 1 AU, in arcseconds
pub const HORIZONTAL_PARALLAX_ARCSEC: f64 = 8.794;

// Rise and set
/// Moon's mean rate of transit relative to the Sun's (lunar day is ~1/0.966 solar days)
pub const LUNAR_TRANSIT_RATE: f64 = 0.966;
/// Horizon depression for the Sun's upper limb with standard refraction, in arcminutes
pub const SUN_RISE_SET_ARCMIN: f64 = -50.0;
/// Standard horizontal refraction used for moonrise, in arcminutes
pub const MOON_HORIZON_REFRACTION_ARCMIN: f64 = 34.0;
/// Moon radius factor of the moonrise altitude (0.2725 semi-diameter plus parallax)
pub const MOON_RISE_SET_RADIUS_FACTOR: f64 = 0.7275;
