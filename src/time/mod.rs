//! Time module for Julian-day calendar arithmetic
//!
//! A [`JulianDay`] is a continuous day count on the UT axis. Calendar-unit
//! operations (start of month, add a year, ...) always decompose the value
//! into proleptic Gregorian calendar fields, adjust them and re-encode, so
//! month lengths and leap years are honoured. [`LocalJulianDay`] carries the
//! same operations for a day count shifted into a civil time zone, and
//! [`EphemerisTime`] pairs a UT instant with its ΔT.

pub mod delta_t;

use std::fmt;
use std::ops::{Add, Sub};

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    ARCSEC_PER_RADIAN, CHINA_STANDARD_TIME_OFFSET, DAYS_PER_CENTURY, DAY_S, J2000, MJD_OFFSET, TAU,
};
use crate::coordinates::angle::normalize_positive;

/// Julian day of the Unix epoch, 1970-01-01T00:00:00Z
const UNIX_EPOCH_JD: f64 = 2_440_587.5;

/// Error type for time operations
#[derive(Debug, Error)]
pub enum TimeError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Time out of range: {0}")]
    OutOfRange(String),

    #[error("Invalid UTC offset: {0:?}")]
    InvalidOffset(String),
}

/// Result type for time operations
pub type Result<T> = std::result::Result<T, TimeError>;

/// Calendar tuple for representing a date and time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarTuple {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: f64,
}

impl CalendarTuple {
    /// Hour of day as a decimal number
    pub fn decimal_hour(&self) -> f64 {
        self.hour as f64 + self.minute as f64 / 60.0 + self.second / 3600.0
    }
}

impl fmt::Display for CalendarTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02} {:02}:{:02}:{:06.3}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

/// Normalize a month value to the range 1-12, adjusting the year as needed
fn normalize_month(year: i32, month: i32) -> (i32, u32) {
    let month_0 = month - 1;
    let year_offset = month_0.div_euclid(12);
    let month_norm = month_0.rem_euclid(12);
    (year + year_offset, (month_norm + 1) as u32)
}

/// Julian day number (noon-based integer) of a proleptic Gregorian date
///
/// This follows the algorithm in the Explanatory Supplement to the
/// Astronomical Almanac 15.11. Months outside 1-12 roll the year and days
/// beyond the month's length roll forward linearly.
pub fn julian_day_number(year: i32, month: i32, day: i32) -> i64 {
    let (year, month) = normalize_month(year, month);
    let janfeb = month <= 2;
    let g = year as i64 + 4716 - if janfeb { 1 } else { 0 };
    let f = (month as i64 + 9) % 12;
    let e = 1461 * g / 4 + day as i64 - 1402;
    let j = e + (153 * f + 2) / 5;
    j + 38 - (g + 184) / 100 * 3 / 4
}

/// Proleptic Gregorian date of a Julian day number
pub fn calendar_date(julian_day_number: i64) -> (i32, u32, u32) {
    let f = julian_day_number + 1401 + (4 * julian_day_number + 274_277) / 146_097 * 3 / 4 - 38;
    let e = 4 * f + 3;
    let g = (e % 1461) / 4;
    let h = 5 * g + 2;

    let day = (h % 153) / 5 + 1;
    let month = ((h / 153) + 2) % 12 + 1;
    let year = e / 1461 - 4716 + (12 + 2 - month) / 12;

    (year as i32, month as u32, day as u32)
}

/// Continuous Julian date for a calendar date and decimal hour
pub fn julian_day_from_calendar(year: i32, month: i32, day: i32, hour: f64) -> f64 {
    julian_day_number(year, month, day) as f64 - 0.5 + hour / 24.0
}

/// Calendar date and decimal hour of a continuous Julian date
pub fn calendar_from_julian_day(jd: f64) -> (i32, u32, u32, f64) {
    let shifted = jd + 0.5;
    let whole = shifted.floor();
    let (year, month, day) = calendar_date(whole as i64);
    (year, month, day, (shifted - whole) * 24.0)
}

/// Day-count types that support calendar-aware arithmetic
///
/// Implementors only provide the raw value; every boundary operation goes
/// through the calendar decomposition.
pub trait CalendarDay: Copy + Sized {
    /// Raw day count
    fn days(self) -> f64;

    /// Wrap a raw day count
    fn from_days(days: f64) -> Self;

    /// Build from calendar fields
    fn from_calendar(year: i32, month: u32, day: u32, hour: u32, minute: u32, second: f64) -> Self {
        Self::from_days(julian_day_from_calendar(
            year,
            month as i32,
            day as i32,
            make_hours(hour as i64, minute as i64, second),
        ))
    }

    /// Decompose into calendar fields
    fn to_calendar(self) -> CalendarTuple {
        let (year, month, day, hours) = calendar_from_julian_day(self.days());
        // round to the microsecond so 59.9999999 s does not show up
        let micros = (hours * 3_600_000_000.0).round() as i64;
        let hour = (micros / 3_600_000_000).min(23);
        let minute = (micros - hour * 3_600_000_000) / 60_000_000;
        let second = (micros - hour * 3_600_000_000 - minute * 60_000_000) as f64 / 1e6;
        CalendarTuple {
            year,
            month,
            day,
            hour: hour as u32,
            minute: minute as u32,
            second,
        }
    }

    fn add_days(self, days: i64) -> Self {
        Self::from_days(self.days() + days as f64)
    }

    fn add_hours(self, hours: i64) -> Self {
        Self::from_days(self.days() + make_hours(hours, 0, 0.0) / 24.0)
    }

    fn add_minutes(self, minutes: i64) -> Self {
        Self::from_days(self.days() + make_hours(0, minutes, 0.0) / 24.0)
    }

    fn add_seconds(self, seconds: f64) -> Self {
        Self::from_days(self.days() + seconds / DAY_S)
    }

    /// Add calendar months, keeping day and time of day
    ///
    /// Day numbers past the end of the target month roll into the next one
    /// (Jan 31 + 1 month is Mar 2 or 3).
    fn add_months(self, months: i32) -> Self {
        let (year, month, day, hour) = calendar_from_julian_day(self.days());
        Self::from_days(julian_day_from_calendar(
            year,
            month as i32 + months,
            day as i32,
            hour,
        ))
    }

    /// Add calendar years, keeping month, day and time of day
    fn add_years(self, years: i32) -> Self {
        let (year, month, day, hour) = calendar_from_julian_day(self.days());
        Self::from_days(julian_day_from_calendar(
            year + years,
            month as i32,
            day as i32,
            hour,
        ))
    }

    /// 00:00:00 of the same day
    fn start_of_day(self) -> Self {
        let (year, month, day, _) = calendar_from_julian_day(self.days());
        Self::from_days(julian_day_from_calendar(year, month as i32, day as i32, 0.0))
    }

    fn midnight(self) -> Self {
        self.start_of_day()
    }

    /// 12:00:00 of the same day
    fn noon(self) -> Self {
        let (year, month, day, _) = calendar_from_julian_day(self.days());
        Self::from_days(julian_day_from_calendar(year, month as i32, day as i32, 12.0))
    }

    /// 23:59:59 of the same day
    fn end_of_day(self) -> Self {
        let (year, month, day, _) = calendar_from_julian_day(self.days());
        Self::from_days(julian_day_from_calendar(
            year,
            month as i32,
            day as i32,
            make_hours(23, 59, 59.0),
        ))
    }

    /// 00:00:00 on the first of the month
    fn start_of_month(self) -> Self {
        let (year, month, _, _) = calendar_from_julian_day(self.days());
        Self::from_days(julian_day_from_calendar(year, month as i32, 1, 0.0))
    }

    /// One second before the first of the next month
    fn end_of_month(self) -> Self {
        self.start_of_month().add_months(1).add_seconds(-1.0)
    }

    /// 00:00:00 on January 1st
    fn start_of_year(self) -> Self {
        let (year, _, _, _) = calendar_from_julian_day(self.days());
        Self::from_days(julian_day_from_calendar(year, 1, 1, 0.0))
    }

    /// December 31st, 23:59:59
    fn end_of_year(self) -> Self {
        let (year, _, _, _) = calendar_from_julian_day(self.days());
        Self::from_days(julian_day_from_calendar(year, 12, 31, make_hours(23, 59, 59.0)))
    }
}

/// Decimal hours from hours, minutes and seconds
pub fn make_hours(hour: i64, minute: i64, second: f64) -> f64 {
    hour as f64 + minute as f64 / 60.0 + second / 3600.0
}

/// A UT Julian date
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JulianDay(pub f64);

impl CalendarDay for JulianDay {
    fn days(self) -> f64 {
        self.0
    }

    fn from_days(days: f64) -> Self {
        JulianDay(days)
    }
}

impl JulianDay {
    pub fn new(jd: f64) -> Self {
        JulianDay(jd)
    }

    /// Raw Julian date
    pub fn value(self) -> f64 {
        self.0
    }

    /// Days since J2000.0 (2000-01-01T12:00 UT)
    pub fn to_jd2000(self) -> f64 {
        self.0 - J2000
    }

    pub fn from_jd2000(days: f64) -> Self {
        JulianDay(days + J2000)
    }

    /// Modified Julian date
    pub fn to_mjd(self) -> f64 {
        self.0 - MJD_OFFSET
    }

    pub fn from_mjd(mjd: f64) -> Self {
        JulianDay(mjd + MJD_OFFSET)
    }

    /// Shift an ET value back to UT
    pub fn from_ephemeris_time(jd_et: f64, delta_t: f64) -> Self {
        JulianDay(jd_et - delta_t)
    }

    /// This UT value expressed on the ET axis
    pub fn to_ephemeris_time(self, delta_t: f64) -> f64 {
        self.0 + delta_t
    }

    /// Express this instant in a zone `offset` days ahead of UT
    pub fn to_location(self, offset: f64) -> LocalJulianDay {
        LocalJulianDay(self.0 + offset)
    }

    /// Express this instant in China Standard Time (UTC+8)
    pub fn to_cst(self) -> LocalJulianDay {
        self.to_location(CHINA_STANDARD_TIME_OFFSET)
    }

    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        let seconds = dt.timestamp() as f64 + dt.timestamp_subsec_nanos() as f64 / 1e9;
        JulianDay(UNIX_EPOCH_JD + seconds / DAY_S)
    }

    /// Convert to a chrono timestamp, rounded to the millisecond
    pub fn to_datetime(self) -> Result<DateTime<Utc>> {
        let millis = ((self.0 - UNIX_EPOCH_JD) * DAY_S * 1000.0).round();
        if !millis.is_finite() || millis.abs() > i64::MAX as f64 {
            return Err(TimeError::OutOfRange(format!("JD {}", self.0)));
        }
        DateTime::<Utc>::from_timestamp_millis(millis as i64)
            .ok_or_else(|| TimeError::OutOfRange(format!("JD {}", self.0)))
    }
}

impl Add<f64> for JulianDay {
    type Output = JulianDay;

    fn add(self, days: f64) -> JulianDay {
        JulianDay(self.0 + days)
    }
}

impl Sub<f64> for JulianDay {
    type Output = JulianDay;

    fn sub(self, days: f64) -> JulianDay {
        JulianDay(self.0 - days)
    }
}

impl Sub<JulianDay> for JulianDay {
    type Output = f64;

    fn sub(self, other: JulianDay) -> f64 {
        self.0 - other.0
    }
}

impl From<DateTime<Utc>> for JulianDay {
    fn from(dt: DateTime<Utc>) -> Self {
        JulianDay::from_datetime(dt)
    }
}

impl fmt::Display for JulianDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} UT", self.to_calendar())
    }
}

/// A Julian day count shifted into a civil time zone
///
/// Calendar operations act on the local wall-clock date, e.g. the local
/// midnight rather than the UT one.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocalJulianDay(pub f64);

impl CalendarDay for LocalJulianDay {
    fn days(self) -> f64 {
        self.0
    }

    fn from_days(days: f64) -> Self {
        LocalJulianDay(days)
    }
}

impl LocalJulianDay {
    /// Back to UT, given the zone's offset in days
    pub fn to_julian_day(self, offset: f64) -> JulianDay {
        JulianDay(self.0 - offset)
    }
}

impl Sub<LocalJulianDay> for LocalJulianDay {
    type Output = f64;

    fn sub(self, other: LocalJulianDay) -> f64 {
        self.0 - other.0
    }
}

/// A UT instant paired with its ΔT, in days
///
/// Immutable: a different UT needs a new value so ΔT is recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EphemerisTime {
    jd_ut: JulianDay,
    delta_t: f64,
}

impl EphemerisTime {
    /// Pair `jd_ut` with ΔT from the empirical table
    pub fn new(jd_ut: JulianDay) -> Self {
        Self::with_delta_t(jd_ut, delta_t::delta_t_days(jd_ut.0))
    }

    /// Pair `jd_ut` with a ΔT (days) from another source
    pub fn with_delta_t(jd_ut: JulianDay, delta_t: f64) -> Self {
        Self { jd_ut, delta_t }
    }

    pub fn jd_ut(&self) -> JulianDay {
        self.jd_ut
    }

    /// ΔT in days
    pub fn delta_t(&self) -> f64 {
        self.delta_t
    }

    /// The Ephemeris Time Julian date
    pub fn value(&self) -> f64 {
        self.jd_ut.to_ephemeris_time(self.delta_t)
    }

    /// Julian centuries of ET since J2000.0
    pub fn centuries(&self) -> f64 {
        (self.value() - J2000) / DAYS_PER_CENTURY
    }
}

/// An event instant tagged with its position in a cycle
///
/// Solar terms use 0-23 (0 = spring equinox); lunar phases use 0-3
/// (0 = new moon).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct JulianDayWithIndex {
    pub jd_ut: JulianDay,
    pub index: usize,
}

impl JulianDayWithIndex {
    pub fn new(jd_ut: JulianDay, index: usize) -> Self {
        Self { jd_ut, index }
    }
}

/// Greenwich mean sidereal time in radians, `[0, 2π)`
///
/// Earth rotation angle plus the precession polynomial evaluated in ET
/// centuries; nutation is not included.
pub fn greenwich_mean_sidereal_time(jd_ut: JulianDay, delta_t: f64) -> f64 {
    let t = (jd_ut.to_ephemeris_time(delta_t) - J2000) / DAYS_PER_CENTURY;
    let era = TAU * (0.779_057_273_264 + 1.002_737_811_911_354_48 * (jd_ut.0 - J2000));
    let polynomial = 0.014_506
        + t * (4_612.157_399_66 + t * (1.396_677_21 + t * (-0.000_093_44 + t * 0.000_018_82)));
    normalize_positive(era + polynomial / ARCSEC_PER_RADIAN)
}

lazy_static! {
    static ref UTC_OFFSET: Regex =
        Regex::new(r"^(?i:utc|gmt)?\s*([+-])(\d{1,2})(?::?(\d{2}))?$").expect("valid offset pattern");
}

/// Parse a UTC offset such as `UTC+08:00`, `+8`, `-0530` or `Z` into hours
pub fn parse_utc_offset(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    if trimmed.eq_ignore_ascii_case("z")
        || trimmed.eq_ignore_ascii_case("utc")
        || trimmed.eq_ignore_ascii_case("gmt")
    {
        return Ok(0.0);
    }

    let caps = UTC_OFFSET
        .captures(trimmed)
        .ok_or_else(|| TimeError::InvalidOffset(text.to_string()))?;
    let hours: f64 = caps[2]
        .parse()
        .map_err(|_| TimeError::InvalidOffset(text.to_string()))?;
    let minutes: f64 = match caps.get(3) {
        Some(m) => m
            .as_str()
            .parse()
            .map_err(|_| TimeError::InvalidOffset(text.to_string()))?,
        None => 0.0,
    };
    if hours > 14.0 || minutes >= 60.0 {
        return Err(TimeError::InvalidOffset(text.to_string()));
    }

    let sign = if &caps[1] == "-" { -1.0 } else { 1.0 };
    Ok(sign * (hours + minutes / 60.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case(2000, 1, 1, 2_451_545)]
    #[case(2020, 1, 1, 2_458_850)]
    #[case(1969, 7, 20, 2_440_423)]
    #[case(1900, 1, 1, 2_415_021)]
    #[case(1582, 10, 15, 2_299_161)]
    #[case(-1000, 3, 1, 1_355_877)]
    fn test_julian_day_number(
        #[case] year: i32,
        #[case] month: i32,
        #[case] day: i32,
        #[case] expected: i64,
    ) {
        assert_eq!(julian_day_number(year, month, day), expected);
        assert_eq!(calendar_date(expected), (year, month as u32, day as u32));
    }

    #[test]
    fn test_month_overflow_rolls_year() {
        assert_eq!(julian_day_number(2020, 13, 1), julian_day_number(2021, 1, 1));
        assert_eq!(julian_day_number(2020, 0, 1), julian_day_number(2019, 12, 1));
        assert_eq!(julian_day_number(2020, -13, 1), julian_day_number(2018, 11, 1));
    }

    #[test]
    fn test_calendar_round_trip_sub_second() {
        for year in [1600, 1899, 1970, 2000, 2023, 2100, 2400] {
            for month in 1..=12 {
                for (day, hour) in [(1, 0.0), (15, 7.123_456), (28, 23.999)] {
                    let jd = julian_day_from_calendar(year, month, day, hour);
                    let (y, m, d, h) = calendar_from_julian_day(jd);
                    assert_eq!((y, m, d), (year, month as u32, day as u32));
                    assert!((h - hour).abs() * 3600.0 < 1e-3, "{} vs {}", h, hour);
                }
            }
        }
    }

    #[test]
    fn test_to_calendar_rounds_seconds() {
        let jd = JulianDay::from_calendar(2020, 9, 30, 4, 0, 0.0);
        let cal = jd.to_calendar();
        assert_eq!((cal.year, cal.month, cal.day, cal.hour, cal.minute), (2020, 9, 30, 4, 0));
        assert_abs_diff_eq!(cal.second, 0.0, epsilon = 1e-6);
        assert_eq!(cal.to_string(), "2020-09-30 04:00:00.000");
    }

    #[test]
    fn test_boundaries_follow_calendar() {
        let jd = JulianDay::from_calendar(2024, 2, 15, 17, 30, 0.0);

        assert_eq!(jd.start_of_day(), JulianDay::from_calendar(2024, 2, 15, 0, 0, 0.0));
        assert_eq!(jd.midnight(), jd.start_of_day());
        assert_eq!(jd.noon(), JulianDay::from_calendar(2024, 2, 15, 12, 0, 0.0));
        assert_eq!(jd.start_of_month(), JulianDay::from_calendar(2024, 2, 1, 0, 0, 0.0));
        assert_eq!(jd.start_of_year(), JulianDay::from_calendar(2024, 1, 1, 0, 0, 0.0));

        // leap February ends on the 29th
        let end = jd.end_of_month().to_calendar();
        assert_eq!((end.month, end.day, end.hour, end.minute), (2, 29, 23, 59));
        assert_abs_diff_eq!(end.second, 59.0, epsilon = 1e-3);

        let end = jd.end_of_year().to_calendar();
        assert_eq!((end.month, end.day, end.hour, end.minute), (12, 31, 23, 59));

        let end = jd.end_of_day().to_calendar();
        assert_eq!((end.day, end.hour, end.minute), (15, 23, 59));
    }

    #[test]
    fn test_add_calendar_units() {
        let jd = JulianDay::from_calendar(2021, 1, 31, 6, 0, 0.0);
        // 2021-02-31 rolls forward to 2021-03-03
        let cal = jd.add_months(1).to_calendar();
        assert_eq!((cal.year, cal.month, cal.day, cal.hour), (2021, 3, 3, 6));

        let cal = jd.add_months(-2).to_calendar();
        assert_eq!((cal.year, cal.month, cal.day), (2020, 12, 1));

        let leap = JulianDay::from_calendar(2020, 2, 29, 0, 0, 0.0);
        let cal = leap.add_years(1).to_calendar();
        assert_eq!((cal.year, cal.month, cal.day), (2021, 3, 1));

        assert_abs_diff_eq!(jd.add_days(3) - jd, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(jd.add_hours(6) - jd, 0.25, epsilon = 1e-9);
        assert_abs_diff_eq!(jd.add_minutes(-90) - jd, -1.0 / 16.0, epsilon = 1e-9);
        assert_abs_diff_eq!(jd.add_seconds(43_200.0) - jd, 0.5, epsilon = 1e-9);
    }

    #[test]
    fn test_local_day_boundaries() {
        // 2020-01-01 20:00 UT is already Jan 2 in CST
        let jd = JulianDay::from_calendar(2020, 1, 1, 20, 0, 0.0);
        let local = jd.to_cst();
        let cal = local.to_calendar();
        assert_eq!((cal.day, cal.hour), (2, 4));

        let local_midnight = local.start_of_day();
        let back = local_midnight.to_julian_day(CHINA_STANDARD_TIME_OFFSET).to_calendar();
        assert_eq!((back.day, back.hour), (1, 16));

        let tomorrow = local.add_days(1).start_of_day();
        assert_abs_diff_eq!(tomorrow - local_midnight, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_epoch_offsets() {
        let jd = JulianDay::new(J2000 + 1.5);
        assert_eq!(jd.to_jd2000(), 1.5);
        assert_eq!(JulianDay::from_jd2000(1.5), jd);
        assert_eq!(JulianDay::from_mjd(51_544.5), JulianDay::new(J2000));
        assert_abs_diff_eq!(JulianDay::new(J2000).to_mjd(), 51_544.5, epsilon = 1e-9);
        assert_abs_diff_eq!(jd.to_ephemeris_time(0.001), J2000 + 1.501, epsilon = 1e-9);
        assert_abs_diff_eq!(
            JulianDay::from_ephemeris_time(J2000 + 1.501, 0.001).value(),
            jd.value(),
            epsilon = 1e-9
        );
    }

    #[test]
    fn test_chrono_round_trip() {
        let dt = Utc.with_ymd_and_hms(2020, 9, 30, 4, 0, 0).unwrap();
        let jd = JulianDay::from(dt);
        assert_abs_diff_eq!(jd.value(), 2_459_122.666_666_7, epsilon = 1e-6);
        assert_eq!(jd.to_datetime().unwrap(), dt);

        assert!(JulianDay::new(f64::NAN).to_datetime().is_err());
    }

    #[test]
    fn test_ephemeris_time_is_paired() {
        let et = EphemerisTime::new(JulianDay::new(J2000));
        assert_abs_diff_eq!(et.delta_t() * DAY_S, 63.87, epsilon = 1e-9);
        assert_abs_diff_eq!(et.value(), J2000 + 63.87 / DAY_S, epsilon = 1e-12);
        assert_abs_diff_eq!(et.centuries(), 63.87 / DAY_S / DAYS_PER_CENTURY, epsilon = 1e-15);

        let custom = EphemerisTime::with_delta_t(JulianDay::new(J2000), 0.0);
        assert_eq!(custom.value(), J2000);
    }

    #[test]
    fn test_mean_sidereal_time_reference_case() {
        // 1987 April 10, 0h UT: 13h10m46.3668s
        let jd = JulianDay::new(2_446_895.5);
        let gmst = greenwich_mean_sidereal_time(jd, 55.0 / DAY_S);
        assert_abs_diff_eq!(gmst.to_degrees(), 197.693_195, epsilon = 1e-3);
    }

    #[rstest]
    #[case("UTC+08:00", 8.0)]
    #[case("+8", 8.0)]
    #[case("utc-05:30", -5.5)]
    #[case("GMT+0545", 5.75)]
    #[case("Z", 0.0)]
    #[case("UTC", 0.0)]
    fn test_parse_utc_offset(#[case] text: &str, #[case] expected: f64) {
        assert_abs_diff_eq!(parse_utc_offset(text).unwrap(), expected, epsilon = 1e-12);
    }

    #[rstest]
    #[case("UTC+15")]
    #[case("+08:75")]
    #[case("eight")]
    fn test_parse_utc_offset_rejects(#[case] text: &str) {
        assert!(matches!(
            parse_utc_offset(text),
            Err(TimeError::InvalidOffset(_))
        ));
    }
}
