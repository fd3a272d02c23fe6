//! Built-in analytic ephemeris for the Sun and Moon
//!
//! The Sun comes from VSOP87 and the Moon from the ELP-2000/82 series as
//! implemented by the `astro` crate, with IAU 1980 nutation. Longitudes are
//! apparent (nutation included, plus annual aberration for the Sun) and speeds
//! are central differences.

use astro::{ecliptic, lunar, nutation, sun};

use super::provider::{EphemerisProvider, NutationRecord, RawPosition};
use super::{Body, EphemerisError, Result};
use crate::constants::{ARCSEC_PER_RADIAN, AU_KM, DAY_S};
use crate::coordinates::angle::{normalize_half, normalize_positive};
use crate::time::{calendar_from_julian_day, greenwich_mean_sidereal_time, JulianDay};

/// First and last Julian dates the series are evaluated for
pub const START_JD: f64 = 625_000.5;
pub const END_JD: f64 = 3_000_000.5;

/// Half-width of the central difference, days
const SPEED_STEP: f64 = 0.01;

/// Annual aberration constant times 1 AU, arcseconds
const SOLAR_ABERRATION_ARCSEC: f64 = 20.4898;

/// Analytic Sun/Moon provider
#[derive(Debug, Clone, Default)]
pub struct AnalyticEphemeris {
    delta_t: Option<f64>,
}

impl AnalyticEphemeris {
    pub fn new() -> Self {
        Self::default()
    }

    fn check_range(body: Body, jd: f64) -> Result<()> {
        if (START_JD..=END_JD).contains(&jd) {
            Ok(())
        } else {
            Err(EphemerisError::OutOfRange {
                body: body.name().to_string(),
                jd,
                start_jd: START_JD,
                end_jd: END_JD,
            })
        }
    }

    /// Longitude, latitude (radians) and distance (AU) without derivatives
    fn coordinates(body: Body, jd_et: f64) -> Result<(f64, f64, f64)> {
        let (nutation_longitude, _) = nutation::nutation(jd_et);
        match body {
            Body::Sun => {
                let (point, radius_au) = sun::geocent_ecl_pos(jd_et);
                let aberration = SOLAR_ABERRATION_ARCSEC / ARCSEC_PER_RADIAN / radius_au;
                Ok((
                    normalize_positive(point.long + nutation_longitude - aberration),
                    point.lat,
                    radius_au,
                ))
            }
            Body::Moon => {
                let (point, distance_km) = lunar::geocent_ecl_pos(jd_et);
                Ok((
                    normalize_positive(point.long + nutation_longitude),
                    point.lat,
                    distance_km / AU_KM,
                ))
            }
            other => Err(EphemerisError::UnsupportedBody {
                body: other.name().to_string(),
                jd: jd_et,
            }),
        }
    }

    fn own_delta_t(jd_ut: f64) -> f64 {
        let (year, month, _, _) = calendar_from_julian_day(jd_ut);
        astro::time::delta_t(year, month as u8) / DAY_S
    }

    fn configured_delta_t(&self, jd_ut: f64) -> f64 {
        self.delta_t.unwrap_or_else(|| Self::own_delta_t(jd_ut))
    }
}

impl EphemerisProvider for AnalyticEphemeris {
    fn set_delta_t(&mut self, delta_t: Option<f64>) {
        self.delta_t = delta_t;
    }

    fn position(&self, body: Body, jd_et: f64) -> Result<RawPosition> {
        Self::check_range(body, jd_et)?;
        let (lon, lat, distance_au) = Self::coordinates(body, jd_et)?;
        let (lon_before, lat_before, dist_before) = Self::coordinates(body, jd_et - SPEED_STEP)?;
        let (lon_after, lat_after, dist_after) = Self::coordinates(body, jd_et + SPEED_STEP)?;

        let span = 2.0 * SPEED_STEP;
        Ok(RawPosition {
            lon,
            lat,
            distance_au,
            lon_speed: normalize_half(lon_after - lon_before) / span,
            lat_speed: (lat_after - lat_before) / span,
            dist_speed: (dist_after - dist_before) / span,
        })
    }

    fn ecliptic_nutation(&self, jd_et: f64) -> Result<NutationRecord> {
        let (nutation_longitude, nutation_obliquity) = nutation::nutation(jd_et);
        let mean_obliquity = ecliptic::mn_oblq_IAU(jd_et);
        Ok(NutationRecord {
            true_obliquity: mean_obliquity + nutation_obliquity,
            mean_obliquity,
            nutation_longitude,
            nutation_obliquity,
        })
    }

    fn sidereal_time(&self, jd_ut: f64) -> Result<f64> {
        let gmst = greenwich_mean_sidereal_time(JulianDay(jd_ut), self.configured_delta_t(jd_ut));
        Ok(gmst.to_degrees() / 15.0)
    }

    fn sidereal_time_precise(
        &self,
        jd_ut: f64,
        true_obliquity: f64,
        nutation_longitude: f64,
    ) -> Result<f64> {
        let gmst = greenwich_mean_sidereal_time(JulianDay(jd_ut), self.configured_delta_t(jd_ut));
        let gast = normalize_positive(gmst + nutation_longitude * true_obliquity.cos());
        Ok(gast.to_degrees() / 15.0)
    }

    fn delta_t(&self, jd_ut: f64) -> Result<f64> {
        Ok(Self::own_delta_t(jd_ut))
    }
}
