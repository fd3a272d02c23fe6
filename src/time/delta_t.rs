//! Empirical ΔT (TT - UT) model
//!
//! Cubic segments in tenths of the segment span for historical years, joined
//! to a parabolic extrapolation `-20 + 31 * ((y - 1820) / 100)^2` over the
//! century after the last tabulated year.

use crate::constants::{DAY_S, J2000, MEAN_TROPICAL_YEAR};

/// `[start year, a0, a1, a2, a3]`, ΔT seconds = a0 + a1 t + a2 t² + a3 t³
const DELTA_T_SEGMENTS: [[f64; 5]; 20] = [
    [-4000.0, 108_371.7, -13_036.80, 392.000, 0.0000],
    [-500.0, 17_201.0, -627.82, 16.170, -0.3413],
    [-150.0, 12_200.6, -346.41, 5.403, -0.1593],
    [150.0, 9_113.8, -328.13, -1.647, 0.0377],
    [500.0, 5_707.5, -391.41, 0.915, 0.3145],
    [900.0, 2_203.4, -283.45, 13.034, -0.1778],
    [1300.0, 490.1, -57.35, 2.085, -0.0072],
    [1600.0, 120.0, -9.81, -1.532, 0.1403],
    [1700.0, 10.2, -0.91, 0.510, -0.0370],
    [1800.0, 13.4, -0.72, 0.202, -0.0193],
    [1830.0, 7.8, -1.81, 0.416, -0.0247],
    [1860.0, 8.3, -0.13, -0.406, 0.0292],
    [1880.0, -5.4, 0.32, -0.183, 0.0173],
    [1900.0, -2.3, 2.06, 0.169, -0.0135],
    [1920.0, 21.2, 1.69, -0.304, 0.0167],
    [1940.0, 24.2, 1.22, -0.064, 0.0031],
    [1960.0, 33.2, 0.51, 0.231, -0.0109],
    [1980.0, 51.0, 1.29, -0.026, 0.0032],
    [2000.0, 63.87, 0.1, 0.0, 0.0],
    [2005.0, 64.7, 0.4, 0.0, 0.0],
];

/// Last year covered by the table and its ΔT in seconds
const LAST_YEAR: f64 = 2015.0;
const LAST_DELTA_T: f64 = 69.0;

/// Secular acceleration used by the extrapolation, seconds per century²
const EXTRAPOLATION_ACCELERATION: f64 = 31.0;

fn parabolic(year: f64) -> f64 {
    let centuries = (year - 1820.0) / 100.0;
    -20.0 + EXTRAPOLATION_ACCELERATION * centuries * centuries
}

/// ΔT in seconds for a decimal year
pub fn delta_t_seconds(year: f64) -> f64 {
    if year >= LAST_YEAR {
        if year > LAST_YEAR + 100.0 {
            return parabolic(year);
        }
        // blend so the curve starts at the last tabulated value
        let offset = parabolic(LAST_YEAR) - LAST_DELTA_T;
        return parabolic(year) - offset * (LAST_YEAR + 100.0 - year) / 100.0;
    }

    let index = DELTA_T_SEGMENTS
        .iter()
        .enumerate()
        .position(|(i, _)| year < next_start(i))
        .unwrap_or(DELTA_T_SEGMENTS.len() - 1);

    let [start, a0, a1, a2, a3] = DELTA_T_SEGMENTS[index];
    let t = (year - start) / (next_start(index) - start) * 10.0;
    a0 + t * (a1 + t * (a2 + t * a3))
}

fn next_start(index: usize) -> f64 {
    DELTA_T_SEGMENTS
        .get(index + 1)
        .map(|row| row[0])
        .unwrap_or(LAST_YEAR)
}

/// Decimal year of a UT Julian day, counted in mean tropical years from J2000
pub fn decimal_year(jd_ut: f64) -> f64 {
    (jd_ut - J2000) / MEAN_TROPICAL_YEAR + 2000.0
}

/// ΔT in days for a UT Julian day
pub fn delta_t_days(jd_ut: f64) -> f64 {
    delta_t_seconds(decimal_year(jd_ut)) / DAY_S
}
