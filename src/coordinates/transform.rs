//! Coordinate transform engine
//!
//! Spherical rotations between the ecliptic, equatorial and horizontal
//! frames, the hour-angle inverse, and the refraction and parallax
//! corrections. All inputs and outputs are radians.

use std::f64::consts::{FRAC_PI_2, PI};

use nalgebra::{Rotation3, Vector3};
use serde::{Deserialize, Serialize};

use super::angle::normalize_positive;
use super::{Ecliptic, Equatorial, Horizontal, HourAngle, Spherical};
use crate::constants::{
    ARCSEC_PER_RADIAN, HORIZONTAL_PARALLAX_ARCSEC, PARALLAX_EARTH_RADIUS_KM, POLAR_EQUATORIAL_RATIO,
};

/// Horizontal coordinates from hour angle, declination and observer latitude
///
/// Azimuth is measured from the south and increases westward; it is undefined
/// (but finite) for an observer exactly at a pole.
pub fn equatorial_to_horizontal(
    hour_angle: HourAngle,
    declination: f64,
    latitude: f64,
) -> Horizontal {
    let (sin_h, cos_h) = hour_angle.sin_cos();
    let (sin_dec, cos_dec) = declination.sin_cos();
    let (sin_lat, cos_lat) = latitude.sin_cos();

    let alt = (sin_lat * sin_dec + cos_lat * cos_dec * cos_h)
        .clamp(-1.0, 1.0)
        .asin();
    let az = (cos_dec * sin_h).atan2(sin_lat * cos_dec * cos_h - cos_lat * sin_dec);

    Horizontal::new(normalize_positive(az), alt)
}

/// Outcome of inverting the altitude formula for the hour angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HourAngleSolution {
    /// The body crosses the altitude at `±H`
    Crossing(f64),
    /// The body stays above the altitude for the whole day
    AlwaysAbove,
    /// The body never climbs to the altitude
    AlwaysBelow,
}

impl HourAngleSolution {
    /// Hour-angle magnitude, saturated to π when the altitude is unreachable
    pub fn hour_angle(&self) -> f64 {
        match self {
            HourAngleSolution::Crossing(h) => *h,
            HourAngleSolution::AlwaysAbove | HourAngleSolution::AlwaysBelow => PI,
        }
    }

    pub fn is_saturated(&self) -> bool {
        !matches!(self, HourAngleSolution::Crossing(_))
    }
}

/// Solve `sin(alt) = sinφ sinδ + cosφ cosδ cos H` for `|H|`
pub fn solve_hour_angle(declination: f64, latitude: f64, altitude: f64) -> HourAngleSolution {
    let cos_h = (altitude.sin() - latitude.sin() * declination.sin())
        / (declination.cos() * latitude.cos());

    if cos_h > 1.0 {
        HourAngleSolution::AlwaysBelow
    } else if cos_h < -1.0 {
        HourAngleSolution::AlwaysAbove
    } else {
        HourAngleSolution::Crossing(cos_h.acos())
    }
}

/// Hour-angle magnitude at which a body reaches `altitude`
///
/// Returns π when the altitude cannot be reached (`|cos H| > 1`).
pub fn altitude_to_hour_angle(declination: f64, latitude: f64, altitude: f64) -> f64 {
    solve_hour_angle(declination, latitude, altitude).hour_angle()
}

/// Rotate a spherical pair about the x axis by `obliquity`
///
/// With a positive obliquity this takes ecliptic to equatorial coordinates;
/// passing the negated obliquity performs the inverse. The longitude of the
/// result is normalized into `[0, 2π)`.
pub fn ecliptic_equatorial_convert(coordinates: Spherical, obliquity: f64) -> Spherical {
    let (sin_lat, cos_lat) = coordinates.lat.sin_cos();
    let (sin_lon, cos_lon) = coordinates.lon.sin_cos();
    let direction = Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat);

    let rotated = Rotation3::from_axis_angle(&Vector3::x_axis(), obliquity) * direction;

    Spherical::new(
        normalize_positive(rotated.y.atan2(rotated.x)),
        rotated.z.clamp(-1.0, 1.0).asin(),
    )
}

pub fn ecliptic_to_equatorial(ecliptic: Ecliptic, obliquity: f64) -> Equatorial {
    ecliptic_equatorial_convert(ecliptic.into(), obliquity).into()
}

pub fn equatorial_to_ecliptic(equatorial: Equatorial, obliquity: f64) -> Ecliptic {
    ecliptic_equatorial_convert(equatorial.into(), -obliquity).into()
}

/// Horizontal coordinates through the rotation engine
///
/// Rotates `(90° - H, δ)` by the colatitude and reflects the longitude, which
/// yields the same azimuth convention as [`equatorial_to_horizontal`].
pub fn horizontal_by_rotation(hour_angle: HourAngle, declination: f64, latitude: f64) -> Horizontal {
    let rotated = ecliptic_equatorial_convert(
        Spherical::new(FRAC_PI_2 - hour_angle, declination),
        FRAC_PI_2 - latitude,
    );
    Horizontal::new(normalize_positive(FRAC_PI_2 - rotated.lon), rotated.lat)
}

/// Refraction for an apparent (observed) altitude; negative, subtract-to-true form
pub fn refraction_from_apparent(apparent_altitude: f64) -> f64 {
    -0.000_290_9 / (apparent_altitude + 0.002_227 / (apparent_altitude + 0.076_79)).tan()
}

/// Refraction to add to a true (geometric) altitude to approximate the apparent one
///
/// Only meaningful above the horizon; callers skip it for `altitude <= 0`.
pub fn refraction_from_true(true_altitude: f64) -> f64 {
    0.000_296_7 / (true_altitude + 0.003_138 / (true_altitude + 0.089_19)).tan()
}

/// Altitude shift from diurnal parallax on a spherical Earth (negative)
pub fn altitude_parallax(altitude: f64, distance_au: f64) -> f64 {
    -HORIZONTAL_PARALLAX_ARCSEC / ARCSEC_PER_RADIAN / distance_au * altitude.cos()
}

/// Topocentric right ascension and declination for an observer on the oblate Earth
///
/// Returns the shifted pair as `(ra, dec)` in a [`Spherical`].
pub fn topocentric_parallax(
    equatorial: Equatorial,
    distance_au: f64,
    hour_angle: HourAngle,
    latitude: f64,
    elevation_km: f64,
) -> Spherical {
    let sin_p = HORIZONTAL_PARALLAX_ARCSEC / ARCSEC_PER_RADIAN / distance_au;
    let u = (POLAR_EQUATORIAL_RATIO * latitude.tan()).atan();
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let height = elevation_km / PARALLAX_EARTH_RADIUS_KM;

    let sin_d = -sin_p * (u.sin() * POLAR_EQUATORIAL_RATIO + height * sin_lat);
    let cos_d = -sin_p * (u.cos() + height * cos_lat);
    let (sin_h, cos_h) = hour_angle.sin_cos();
    let (sin_dec, cos_dec) = equatorial.dec.sin_cos();

    let shift = (cos_d * sin_h).atan2(cos_dec + cos_d * cos_h);

    Spherical::new(
        normalize_positive(equatorial.ra + shift),
        ((sin_dec + sin_d) / (cos_dec + cos_d * cos_h) * shift.cos()).atan(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    const OBLIQUITY: f64 = 23.439_291_1 * PI / 180.0;

    #[test]
    fn test_equatorial_to_horizontal_reference_case() {
        // Venus over Washington, 1987 April 10 19:21 UT
        let hz = equatorial_to_horizontal(
            64.352_133_f64.to_radians(),
            (-6.719_892_f64).to_radians(),
            38.921_389_f64.to_radians(),
        );
        assert_abs_diff_eq!(hz.az.to_degrees(), 68.0337, epsilon = 1e-3);
        assert_abs_diff_eq!(hz.alt.to_degrees(), 15.1249, epsilon = 1e-3);
    }

    #[rstest]
    #[case(0.3, 0.2, 0.7)]
    #[case(-2.1, -0.4, 0.9)]
    #[case(2.9, 0.05, -0.6)]
    #[case(-0.01, 1.1, 0.2)]
    fn test_rotation_and_direct_formula_agree(
        #[case] hour_angle: f64,
        #[case] declination: f64,
        #[case] latitude: f64,
    ) {
        let direct = equatorial_to_horizontal(hour_angle, declination, latitude);
        let rotated = horizontal_by_rotation(hour_angle, declination, latitude);
        assert_abs_diff_eq!(direct.alt, rotated.alt, epsilon = 1e-12);
        assert_abs_diff_eq!(direct.az, rotated.az, epsilon = 1e-9);
    }

    #[test]
    fn test_meridian_transit_is_due_south() {
        let hz = equatorial_to_horizontal(0.0, 0.1, 0.7);
        assert_abs_diff_eq!(hz.az, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hz.alt, FRAC_PI_2 - 0.6, epsilon = 1e-12);
    }

    #[test]
    fn test_altitude_to_hour_angle_inverts_altitude() {
        let (dec, lat) = (0.3, 0.6);
        let h = altitude_to_hour_angle(dec, lat, 0.1);
        let hz = equatorial_to_horizontal(h, dec, lat);
        assert_abs_diff_eq!(hz.alt, 0.1, epsilon = 1e-12);
    }

    #[test]
    fn test_hour_angle_saturation() {
        // 85° declination never climbs to 80° altitude from the equator
        let dec = 85.0_f64.to_radians();
        let alt = 80.0_f64.to_radians();
        assert_eq!(altitude_to_hour_angle(dec, 0.0, alt), PI);
        assert_eq!(solve_hour_angle(dec, 0.0, alt), HourAngleSolution::AlwaysBelow);

        // a circumpolar star at 60° north never sets
        let circumpolar = solve_hour_angle(80.0_f64.to_radians(), 60.0_f64.to_radians(), 0.0);
        assert_eq!(circumpolar, HourAngleSolution::AlwaysAbove);
        assert!(circumpolar.is_saturated());
        assert_eq!(circumpolar.hour_angle(), PI);
    }

    #[test]
    fn test_ecliptic_to_equatorial_reference_case() {
        // Pollux
        let eq = Equatorial::new(116.328_942_f64.to_radians(), 28.026_183_f64.to_radians());
        let ecl = equatorial_to_ecliptic(eq, OBLIQUITY);
        assert_abs_diff_eq!(ecl.lon.to_degrees(), 113.215_630, epsilon = 1e-5);
        assert_abs_diff_eq!(ecl.lat.to_degrees(), 6.684_170, epsilon = 1e-5);

        let back = ecliptic_to_equatorial(ecl, OBLIQUITY);
        assert_abs_diff_eq!(back.ra, eq.ra, epsilon = 1e-12);
        assert_abs_diff_eq!(back.dec, eq.dec, epsilon = 1e-12);
    }

    #[test]
    fn test_solstice_point_maps_to_obliquity() {
        let eq = ecliptic_to_equatorial(Ecliptic::new(FRAC_PI_2, 0.0), OBLIQUITY);
        assert_abs_diff_eq!(eq.ra, FRAC_PI_2, epsilon = 1e-12);
        assert_abs_diff_eq!(eq.dec, OBLIQUITY, epsilon = 1e-12);
    }

    #[test]
    fn test_sign_flip_duality() {
        for i in 0..36 {
            for j in -8..=8 {
                let p = Spherical::new(i as f64 * 0.17, j as f64 * 0.18);
                let there = ecliptic_equatorial_convert(p, OBLIQUITY);
                let back = ecliptic_equatorial_convert(there, -OBLIQUITY);
                assert!((0.0..crate::constants::TAU).contains(&there.lon));
                assert_abs_diff_eq!(back.lat, p.lat, epsilon = 1e-12);
                assert_abs_diff_eq!(
                    normalize_positive(back.lon - p.lon + 1e-3),
                    1e-3,
                    epsilon = 1e-10
                );
            }
        }
    }

    #[test]
    fn test_refraction_magnitudes() {
        // about 29' at the horizon and 1' at 45 degrees for true altitudes
        let horizon = refraction_from_true(0.0).to_degrees() * 60.0;
        assert_abs_diff_eq!(horizon, 29.0, epsilon = 0.5);
        let mid = refraction_from_true(PI / 4.0).to_degrees() * 60.0;
        assert_abs_diff_eq!(mid, 1.0, epsilon = 0.05);

        let apparent = refraction_from_apparent(0.0).to_degrees() * 60.0;
        assert_abs_diff_eq!(apparent, -34.5, epsilon = 0.5);
    }

    #[test]
    fn test_altitude_parallax() {
        let moon = altitude_parallax(0.0, 384_400.0 / crate::constants::AU_KM);
        assert_abs_diff_eq!(moon.to_degrees(), -0.95, epsilon = 0.01);
        assert_abs_diff_eq!(altitude_parallax(FRAC_PI_2, 1.0), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn test_topocentric_parallax() {
        let eq = Equatorial::new(1.0, 0.0);
        let far = topocentric_parallax(eq, 1e9, 0.4, 0.7, 0.0);
        assert_abs_diff_eq!(far.lon, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(far.lat, 0.0, epsilon = 1e-12);

        // the Moon on the meridian seen from 40° north is pushed south
        let moon = topocentric_parallax(eq, 0.002_57, 0.0, 40.0_f64.to_radians(), 0.0);
        assert_abs_diff_eq!(moon.lon, 1.0, epsilon = 1e-12);
        assert!(moon.lat < -0.009 && moon.lat > -0.012);

        // east of the meridian it is pushed further east
        let east = topocentric_parallax(eq, 0.002_57, -1.0, 40.0_f64.to_radians(), 0.0);
        assert!(east.lon > 1.0);
    }
}
