//! Rise, set, culmination and twilight times
//!
//! Each event starts from an estimate near a transit, converts the hour
//! angle still to travel into a fraction of a rotation, and then runs a fixed
//! number of refinement passes that recompute the observed body state. The
//! passes are not a convergence loop; three are enough for the Sun and Moon.

use std::f64::consts::{FRAC_PI_2, PI};

use log::{debug, trace};
use serde::{Deserialize, Serialize};

use crate::constants::{
    ARCSEC_PER_RADIAN, AU_KM, EARTH_EQUATORIAL_RADIUS_KM, LUNAR_TRANSIT_RATE,
    MOON_HORIZON_REFRACTION_ARCMIN, MOON_RISE_SET_RADIUS_FACTOR, TAU,
};
use crate::coordinates::angle::{normalize_half, signed_remainder};
use crate::coordinates::transform::{solve_hour_angle, HourAngleSolution};
use crate::coordinates::{GeographicPosition, HourAngle};
use crate::planetlib::{Astronomy, Body, ObservedBodyState};
use crate::time::{CalendarDay, JulianDay};
use crate::Result;

/// Which meridian or horizon crossing to solve for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitKind {
    Rise,
    Set,
    UpperCulmination,
    LowerCulmination,
}

impl TransitKind {
    /// Whether the event is defined by an altitude rather than the meridian
    pub fn uses_altitude(self) -> bool {
        matches!(self, TransitKind::Rise | TransitKind::Set)
    }

    /// Days until the event from a body at `hour_angle`
    ///
    /// `target` is the hour-angle magnitude of the altitude crossing and
    /// `rate` the body's hour-angle rate in rotations per day. `wrap` takes
    /// the shortest way round, which the refinement passes need.
    pub fn day_offset(self, target: f64, hour_angle: HourAngle, rate: f64, wrap: bool) -> f64 {
        let remaining = match self {
            TransitKind::Rise => -target - hour_angle,
            TransitKind::Set => target - hour_angle,
            TransitKind::UpperCulmination => -hour_angle,
            TransitKind::LowerCulmination => PI - hour_angle,
        };
        let remaining = if wrap {
            normalize_half(remaining)
        } else {
            remaining
        };
        remaining / (TAU * rate)
    }
}

/// Time of an altitude event, tagged when the altitude is never reached
///
/// The saturated variants still carry the time the refinement settled on
/// (the nearest transit), but it is not a horizon crossing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HorizonEvent {
    Crossing(JulianDay),
    /// The body stays above the altitude all day (polar day)
    AlwaysAbove(JulianDay),
    /// The body never climbs to the altitude (polar night)
    AlwaysBelow(JulianDay),
}

impl HorizonEvent {
    fn from_solution(solution: HourAngleSolution, jd: JulianDay) -> Self {
        match solution {
            HourAngleSolution::Crossing(_) => HorizonEvent::Crossing(jd),
            HourAngleSolution::AlwaysAbove => HorizonEvent::AlwaysAbove(jd),
            HourAngleSolution::AlwaysBelow => HorizonEvent::AlwaysBelow(jd),
        }
    }

    /// The crossing time, or `None` for a saturated result
    pub fn time(&self) -> Option<JulianDay> {
        match self {
            HorizonEvent::Crossing(jd) => Some(*jd),
            _ => None,
        }
    }

    pub fn is_crossing(&self) -> bool {
        matches!(self, HorizonEvent::Crossing(_))
    }

    /// The settled time whether or not it is a crossing
    pub fn jd(&self) -> JulianDay {
        match self {
            HorizonEvent::Crossing(jd)
            | HorizonEvent::AlwaysAbove(jd)
            | HorizonEvent::AlwaysBelow(jd) => *jd,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TwilightTimes {
    pub rise: HorizonEvent,
    pub set: HorizonEvent,
    pub culmination: JulianDay,
    pub lower_culmination: JulianDay,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DawnDusk {
    pub dawn: HorizonEvent,
    pub dusk: HorizonEvent,
}

/// Sun rise/set/culmination plus the three twilights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunTwilightTimes {
    pub rise: HorizonEvent,
    pub set: HorizonEvent,
    pub culmination: JulianDay,
    pub lower_culmination: JulianDay,
    pub civil: DawnDusk,
    pub nautical: DawnDusk,
    pub astronomical: DawnDusk,
}

impl SunTwilightTimes {
    /// Length of daylight (set - rise) in days
    pub fn daylight(&self) -> Option<f64> {
        Some(self.set.time()? - self.rise.time()?)
    }

    /// Night within the civil day `offset_days` east of UT: midnight to
    /// astronomical dawn plus astronomical dusk to the next midnight, in days
    pub fn night(&self, offset_days: f64) -> Option<f64> {
        let dawn = self.astronomical.dawn.time()?.to_location(offset_days);
        let dusk = self.astronomical.dusk.time()?.to_location(offset_days);
        Some((dawn - dawn.midnight()) + (dusk.add_days(1).midnight() - dusk))
    }
}

/// One body's state at the estimate plus how to step from it
struct AltitudeSearch<'a> {
    astronomy: &'a Astronomy,
    body: Body,
    observer: &'a GeographicPosition,
    corrected: bool,
    rate: f64,
    estimate: JulianDay,
    state: ObservedBodyState,
}

impl AltitudeSearch<'_> {
    fn solution(&self, kind: TransitKind, state: &ObservedBodyState, altitude: f64) -> HourAngleSolution {
        if kind.uses_altitude() && altitude.abs() < FRAC_PI_2 {
            solve_hour_angle(state.equatorial.dec, self.observer.latitude, altitude)
        } else {
            HourAngleSolution::Crossing(0.0)
        }
    }

    fn solve(&self, kind: TransitKind, altitude: f64) -> Result<HorizonEvent> {
        let mut solution = self.solution(kind, &self.state, altitude);
        let mut jd = self.estimate
            + kind.day_offset(solution.hour_angle(), self.state.hour_angle, self.rate, false);

        for pass in 0..self.astronomy.config().refinement_passes {
            let et = self.astronomy.ephemeris_time(jd)?;
            let state =
                self.astronomy
                    .observed_body_state(self.body, &et, self.observer, self.corrected)?;
            solution = self.solution(kind, &state, altitude);
            jd = jd + kind.day_offset(solution.hour_angle(), state.hour_angle, self.rate, true);
            trace!(
                "{} {:?} pass {}: jd={:.8} hour angle={:.8}",
                self.body.name(),
                kind,
                pass + 1,
                jd.value(),
                state.hour_angle
            );
        }

        Ok(HorizonEvent::from_solution(solution, jd))
    }

    fn transit(&self, kind: TransitKind) -> Result<JulianDay> {
        Ok(self.solve(kind, FRAC_PI_2)?.jd())
    }
}

impl Astronomy {
    fn altitude_search<'a>(
        &'a self,
        body: Body,
        estimate: JulianDay,
        observer: &'a GeographicPosition,
        corrected: bool,
        rate: f64,
    ) -> Result<AltitudeSearch<'a>> {
        let et = self.ephemeris_time(estimate)?;
        let state = self.observed_body_state(body, &et, observer, corrected)?;
        Ok(AltitudeSearch {
            astronomy: self,
            body,
            observer,
            corrected,
            rate,
            estimate,
            state,
        })
    }

    /// Time `body` reaches `altitude` (radians) on the `kind` side of the
    /// transit nearest `jd`
    pub fn altitude_event(
        &self,
        body: Body,
        jd: JulianDay,
        observer: &GeographicPosition,
        altitude: f64,
        kind: TransitKind,
        corrected: bool,
    ) -> Result<HorizonEvent> {
        let rate = transit_rate(body);
        self.altitude_search(body, jd, observer, corrected, rate)?
            .solve(kind, altitude)
    }

    /// Rise, set and culminations of any body around `jd`
    ///
    /// `rise_set_altitude` is in radians; the geometric horizon is 0.
    pub fn body_twilight(
        &self,
        body: Body,
        jd: JulianDay,
        observer: &GeographicPosition,
        rise_set_altitude: f64,
        corrected: bool,
    ) -> Result<TwilightTimes> {
        let search = self.altitude_search(body, jd, observer, corrected, transit_rate(body))?;
        Ok(TwilightTimes {
            rise: search.solve(TransitKind::Rise, rise_set_altitude)?,
            set: search.solve(TransitKind::Set, rise_set_altitude)?,
            culmination: search.transit(TransitKind::UpperCulmination)?,
            lower_culmination: search.transit(TransitKind::LowerCulmination)?,
        })
    }

    /// Sun events for the local day containing `jd`
    ///
    /// Pass the UT instant of local noon (04:00 UT for UTC+8) so the
    /// culmination nearest it is the one of that day.
    pub fn sun_twilight(
        &self,
        jd: JulianDay,
        observer: &GeographicPosition,
        corrected: bool,
    ) -> Result<SunTwilightTimes> {
        let noon = jd - signed_remainder(jd.to_jd2000() + observer.longitude / TAU, 1.0);
        let angles = self.config().twilight;
        let search = self.altitude_search(Body::Sun, noon, observer, corrected, 1.0)?;

        let dawn_dusk = |degrees: f64| -> Result<DawnDusk> {
            Ok(DawnDusk {
                dawn: search.solve(TransitKind::Rise, degrees.to_radians())?,
                dusk: search.solve(TransitKind::Set, degrees.to_radians())?,
            })
        };

        let times = SunTwilightTimes {
            rise: search.solve(TransitKind::Rise, angles.rise_set.to_radians())?,
            set: search.solve(TransitKind::Set, angles.rise_set.to_radians())?,
            culmination: search.transit(TransitKind::UpperCulmination)?,
            lower_culmination: search.transit(TransitKind::LowerCulmination)?,
            civil: dawn_dusk(angles.civil)?,
            nautical: dawn_dusk(angles.nautical)?,
            astronomical: dawn_dusk(angles.astronomical)?,
        };
        debug!(
            "sun twilight near {:.6}: rise {:?} set {:?}",
            noon.value(),
            times.rise,
            times.set
        );
        Ok(times)
    }

    /// Moon events around the lunar transit nearest `jd`
    pub fn moon_twilight(
        &self,
        jd: JulianDay,
        observer: &GeographicPosition,
        corrected: bool,
    ) -> Result<TwilightTimes> {
        let delta_t = self.ephemeris_time(jd)?.delta_t();
        let transit = jd
            - signed_remainder(
                0.172_622_2 + 0.966_136_808_032_357 * jd.to_jd2000() - 0.0366 * delta_t
                    + observer.longitude / TAU,
                1.0,
            );

        let search =
            self.altitude_search(Body::Moon, transit, observer, corrected, LUNAR_TRANSIT_RATE)?;
        let altitude = moon_rise_set_altitude(search.state.state.distance_au);

        let times = TwilightTimes {
            rise: search.solve(TransitKind::Rise, altitude)?,
            set: search.solve(TransitKind::Set, altitude)?,
            culmination: search.transit(TransitKind::UpperCulmination)?,
            lower_culmination: search.transit(TransitKind::LowerCulmination)?,
        };
        debug!(
            "moon twilight near {:.6}: rise {:?} set {:?}",
            transit.value(),
            times.rise,
            times.set
        );
        Ok(times)
    }
}

/// Hour-angle rate of a body in rotations per day
fn transit_rate(body: Body) -> f64 {
    match body {
        Body::Moon => LUNAR_TRANSIT_RATE,
        _ => 1.0,
    }
}

/// Moon rise/set altitude: the semi-diameter and parallax term less horizon refraction
pub fn moon_rise_set_altitude(distance_au: f64) -> f64 {
    MOON_RISE_SET_RADIUS_FACTOR * EARTH_EQUATORIAL_RADIUS_KM / (distance_au * AU_KM)
        - MOON_HORIZON_REFRACTION_ARCMIN * 60.0 / ARCSEC_PER_RADIAN
}
