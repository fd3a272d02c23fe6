//! The ephemeris capability and its lock-guarded handle
//!
//! A provider carries mutable configuration (the ΔT override) that every
//! query depends on. [`SharedEphemeris`] makes "configure, then query" one
//! critical section so concurrent callers never observe each other's
//! settings.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use super::{Body, EphemerisError, Result};
use crate::time::{self, EphemerisTime, JulianDay};

/// Raw ecliptic position of a body as returned by a provider
///
/// Angles in radians, distance in AU, speeds per day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawPosition {
    pub lon: f64,
    pub lat: f64,
    pub distance_au: f64,
    pub lon_speed: f64,
    pub lat_speed: f64,
    pub dist_speed: f64,
}

/// Obliquity and nutation at an instant, radians
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutationRecord {
    pub true_obliquity: f64,
    pub mean_obliquity: f64,
    pub nutation_longitude: f64,
    pub nutation_obliquity: f64,
}

/// Operations consumed from an ephemeris
///
/// `jd_et` arguments are Ephemeris Time Julian dates, `jd_ut` arguments are
/// UT. Sidereal times are returned in hours.
pub trait EphemerisProvider: Send {
    /// Override the ΔT (days) used for UT-based queries; `None` restores the
    /// provider's own model
    fn set_delta_t(&mut self, delta_t: Option<f64>);

    /// Apparent geocentric ecliptic position of `body`
    fn position(&self, body: Body, jd_et: f64) -> Result<RawPosition>;

    fn ecliptic_nutation(&self, jd_et: f64) -> Result<NutationRecord>;

    /// Greenwich mean sidereal time in hours
    fn sidereal_time(&self, jd_ut: f64) -> Result<f64>;

    /// Greenwich apparent sidereal time in hours, from the supplied obliquity and nutation
    fn sidereal_time_precise(
        &self,
        jd_ut: f64,
        true_obliquity: f64,
        nutation_longitude: f64,
    ) -> Result<f64>;

    /// The provider's own ΔT in days
    fn delta_t(&self, jd_ut: f64) -> Result<f64>;

    /// Julian date of a proleptic Gregorian date and decimal hour
    fn julian_day(&self, year: i32, month: u32, day: u32, hour: f64) -> f64 {
        time::julian_day_from_calendar(year, month as i32, day as i32, hour)
    }

    /// Calendar date and decimal hour of a Julian date
    fn calendar_date(&self, jd: f64) -> (i32, u32, u32, f64) {
        time::calendar_from_julian_day(jd)
    }
}

/// Cloneable handle serializing access to one provider
#[derive(Clone)]
pub struct SharedEphemeris {
    inner: Arc<Mutex<dyn EphemerisProvider>>,
}

impl SharedEphemeris {
    pub fn new<P: EphemerisProvider + 'static>(provider: P) -> Self {
        Self {
            inner: Arc::new(Mutex::new(provider)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, dyn EphemerisProvider + 'static>> {
        self.inner.lock().map_err(|_| EphemerisError::Poisoned)
    }

    /// Lock, apply the ΔT paired with `et`, then run `query`
    fn at<T>(
        &self,
        et: &EphemerisTime,
        query: impl FnOnce(&dyn EphemerisProvider) -> Result<T>,
    ) -> Result<T> {
        let mut provider = self.lock()?;
        provider.set_delta_t(Some(et.delta_t()));
        query(&*provider)
    }

    pub fn position(&self, body: Body, et: &EphemerisTime) -> Result<RawPosition> {
        self.at(et, |p| p.position(body, et.value()))
    }

    pub fn ecliptic_nutation(&self, et: &EphemerisTime) -> Result<NutationRecord> {
        self.at(et, |p| p.ecliptic_nutation(et.value()))
    }

    pub fn sidereal_time(&self, et: &EphemerisTime) -> Result<f64> {
        self.at(et, |p| p.sidereal_time(et.jd_ut().value()))
    }

    pub fn sidereal_time_precise(
        &self,
        et: &EphemerisTime,
        true_obliquity: f64,
        nutation_longitude: f64,
    ) -> Result<f64> {
        self.at(et, |p| {
            p.sidereal_time_precise(et.jd_ut().value(), true_obliquity, nutation_longitude)
        })
    }

    /// The provider's own ΔT in days, with any override cleared
    pub fn delta_t(&self, jd_ut: JulianDay) -> Result<f64> {
        let mut provider = self.lock()?;
        provider.set_delta_t(None);
        provider.delta_t(jd_ut.value())
    }

    pub fn julian_day(&self, year: i32, month: u32, day: u32, hour: f64) -> Result<JulianDay> {
        Ok(JulianDay(self.lock()?.julian_day(year, month, day, hour)))
    }

    pub fn calendar_date(&self, jd: JulianDay) -> Result<(i32, u32, u32, f64)> {
        Ok(self.lock()?.calendar_date(jd.value()))
    }
}

impl fmt::Debug for SharedEphemeris {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SharedEphemeris")
            .field("handles", &Arc::strong_count(&self.inner))
            .finish()
    }
}
