//! Root finders for angular event times
//!
//! Each finder takes a closure sampling the angular quantity at a UT Julian
//! day and returns the day at which it reaches a target angle (mod 2π).
//! The closures do the ephemeris work, so everything here is pure and can
//! be exercised with synthetic functions.

use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::constants::{MEAN_TROPICAL_YEAR, TAU};
use crate::coordinates::angle::{floats_nearly_equal, normalize_half, normalize_positive};
use crate::time::JulianDay;
use crate::{LunisolarError, Result};

/// An angle and its rate of change, radians and radians per day
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AngleSample {
    pub angle: f64,
    pub speed: f64,
}

impl AngleSample {
    pub fn new(angle: f64, speed: f64) -> Self {
        Self { angle, speed }
    }
}

/// A solved event time and the number of evaluations it took
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventTime {
    pub jd: JulianDay,
    pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    pub decimal_places: i32,
    pub max_iterations: usize,
    pub bisect_fallback: bool,
    pub bisect_step_days: f64,
    pub bisect_decimal_places: i32,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            decimal_places: 9,
            max_iterations: 64,
            bisect_fallback: true,
            bisect_step_days: 3.375,
            bisect_decimal_places: 6,
        }
    }
}

/// Velocity-extrapolated Newton iteration on an unwrapped angle
///
/// The angle is tracked as a continuous offset from its value at `start`,
/// each sample unwrapped against the angle the last step predicted, so
/// crossing 0/2π never produces a jump even when one step covers more than
/// half a turn. Iteration stops when two successive offsets agree to
/// `decimal_places`, and fails with [`LunisolarError::Convergence`] on a
/// non-finite step or when the ceiling is reached.
pub fn newton_angle<F>(
    target: f64,
    start: JulianDay,
    options: &SolverOptions,
    mut sample: F,
) -> Result<EventTime>
where
    F: FnMut(JulianDay) -> Result<AngleSample>,
{
    let first = sample(start)?;
    let target_delta = normalize_positive(target - first.angle);

    let mut jd = start;
    let mut speed = first.speed;
    let mut previous_angle = first.angle;
    let mut last_delta = 0.0;

    for iteration in 1..=options.max_iterations {
        let step = (target_delta - last_delta) / speed;
        if !step.is_finite() {
            return Err(LunisolarError::Convergence {
                operation: "newton",
                target,
                iterations: iteration,
                jd: jd.value(),
            });
        }

        jd = jd + step;
        let current = sample(jd)?;
        // unwrap against the predicted angle; a single step may exceed π
        let advance = step * speed;
        let delta =
            last_delta + advance + normalize_half(current.angle - (previous_angle + advance));
        trace!(
            "newton #{}: jd={:.9} delta={:.12} target_delta={:.12}",
            iteration,
            jd.value(),
            delta,
            target_delta
        );

        if floats_nearly_equal(delta, last_delta, options.decimal_places) {
            return Ok(EventTime {
                jd,
                iterations: iteration,
            });
        }

        last_delta = delta;
        previous_angle = current.angle;
        speed = current.speed;
    }

    Err(LunisolarError::Convergence {
        operation: "newton",
        target,
        iterations: options.max_iterations,
        jd: jd.value(),
    })
}

/// Step forward until a signed error changes sign, then bisect the bracket
///
/// Samples whose error magnitude exceeds `wrap_limit` are skipped as
/// brackets, which keeps the ±π wrap of an angular error from being
/// mistaken for a root. The final estimate interpolates linearly between the
/// bracket ends.
pub fn bracket_bisect<F>(
    start: JulianDay,
    max_steps: usize,
    wrap_limit: f64,
    options: &SolverOptions,
    mut error: F,
) -> Result<EventTime>
where
    F: FnMut(JulianDay) -> Result<f64>,
{
    let mut iterations = 1;
    let mut lo = start;
    let mut err_lo = error(lo)?;
    if err_lo == 0.0 {
        return Ok(EventTime { jd: lo, iterations });
    }

    let mut bracket = None;
    for _ in 0..max_steps {
        let hi = lo + options.bisect_step_days;
        let err_hi = error(hi)?;
        iterations += 1;

        let crosses = err_lo.signum() != err_hi.signum() || err_hi == 0.0;
        if crosses && err_lo.abs() <= wrap_limit && err_hi.abs() <= wrap_limit {
            bracket = Some((hi, err_hi));
            break;
        }
        lo = hi;
        err_lo = err_hi;
    }

    let (mut hi, mut err_hi) = bracket.ok_or(LunisolarError::Convergence {
        operation: "bracket",
        target: 0.0,
        iterations,
        jd: lo.value(),
    })?;

    let mut bisections = 0;
    while !floats_nearly_equal(lo.value(), hi.value(), options.bisect_decimal_places) {
        if bisections >= options.max_iterations {
            return Err(LunisolarError::Convergence {
                operation: "bisect",
                target: 0.0,
                iterations,
                jd: lo.value(),
            });
        }
        let mid = JulianDay((lo.value() + hi.value()) / 2.0);
        let err_mid = error(mid)?;
        iterations += 1;
        bisections += 1;

        if err_mid == 0.0 {
            return Ok(EventTime { jd: mid, iterations });
        }
        if err_mid.signum() == err_lo.signum() {
            lo = mid;
            err_lo = err_mid;
        } else {
            hi = mid;
            err_hi = err_mid;
        }
    }

    let jd = if err_hi != err_lo {
        lo + (hi - lo) * (-err_lo) / (err_hi - err_lo)
    } else {
        JulianDay((lo.value() + hi.value()) / 2.0)
    };
    Ok(EventTime { jd, iterations })
}

/// Bracket-and-bisect on `normalize_half(f(t) - target)`
///
/// Steps cover one mean tropical year, enough for the slowest body used.
pub fn bisect_angle<F>(
    target: f64,
    start: JulianDay,
    options: &SolverOptions,
    mut sample: F,
) -> Result<EventTime>
where
    F: FnMut(JulianDay) -> Result<AngleSample>,
{
    let max_steps = (MEAN_TROPICAL_YEAR / options.bisect_step_days).ceil() as usize + 1;
    bracket_bisect(start, max_steps, TAU / 4.0, options, |jd| {
        Ok(normalize_half(sample(jd)?.angle - target))
    })
    .map_err(|err| match err {
        LunisolarError::Convergence {
            operation,
            iterations,
            jd,
            ..
        } => LunisolarError::Convergence {
            operation,
            target,
            iterations,
            jd,
        },
        other => other,
    })
}

/// Newton iteration with bracket-and-bisect as the fallback
pub fn solve_angle<F>(
    target: f64,
    start: JulianDay,
    options: &SolverOptions,
    mut sample: F,
) -> Result<EventTime>
where
    F: FnMut(JulianDay) -> Result<AngleSample>,
{
    let result = match newton_angle(target, start, options, &mut sample) {
        Err(LunisolarError::Convergence { iterations, jd, .. }) if options.bisect_fallback => {
            warn!(
                "newton did not converge for target {:.9} after {} iterations (jd {:.6}), bisecting",
                target, iterations, jd
            );
            bisect_angle(target, start, options, &mut sample)
        }
        other => other,
    }?;

    debug!(
        "solved target {:.9} from {:.6}: jd={:.9} in {} iterations",
        target,
        start.value(),
        result.jd.value(),
        result.iterations
    );
    Ok(result)
}

/// Solve a sequence of targets, each starting from the previous solution
///
/// A target equal to its predecessor first advances the start by
/// `repeat_jump_days`, so the same event is not found twice. A failure
/// reports how many targets were solved before it.
pub fn solve_angle_sequence<F>(
    targets: &[f64],
    start: JulianDay,
    repeat_jump_days: f64,
    options: &SolverOptions,
    mut sample: F,
) -> Result<Vec<EventTime>>
where
    F: FnMut(JulianDay) -> Result<AngleSample>,
{
    let mut events: Vec<EventTime> = Vec::with_capacity(targets.len());
    let mut cursor = start;
    let mut previous: Option<f64> = None;

    for &target in targets {
        if previous.map_or(false, |p| floats_nearly_equal(p, target, options.decimal_places)) {
            cursor = cursor + repeat_jump_days;
        }

        let event = solve_angle(target, cursor, options, &mut sample).map_err(|err| {
            warn!(
                "batch stopped after {} of {} targets: {}",
                events.len(),
                targets.len(),
                err
            );
            LunisolarError::Batch {
                completed: events.len(),
                source: Box::new(err),
            }
        })?;

        cursor = event.jd;
        previous = Some(target);
        events.push(event);
    }

    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planetlib::EphemerisError;
    use approx::assert_abs_diff_eq;
    use std::f64::consts::PI;

    /// Angle advancing at a steady rate with a small periodic wobble
    fn wobbly(rate: f64) -> impl FnMut(JulianDay) -> Result<AngleSample> {
        move |jd: JulianDay| {
            let t = jd.value();
            let angle = rate * t + 0.01 * (t / 3.0).sin();
            let speed = rate + 0.01 / 3.0 * (t / 3.0).cos();
            Ok(AngleSample::new(normalize_positive(angle), speed))
        }
    }

    #[test]
    fn test_newton_finds_wrapped_target() {
        let options = SolverOptions::default();
        let mut f = wobbly(0.2);
        // start near 6.2 rad, target just past the wrap
        let start = JulianDay(31.0);
        let event = newton_angle(0.1, start, &options, &mut f).unwrap();
        let angle = f(event.jd).unwrap().angle;
        assert_abs_diff_eq!(normalize_half(angle - 0.1), 0.0, epsilon = 1e-9);
        assert!(event.jd > start);
        assert!(event.jd - start < TAU / 0.2);
    }

    #[test]
    fn test_newton_is_monotonic() {
        let options = SolverOptions::default();
        let mut seen = Vec::new();
        let target = 2.0;
        let start = JulianDay(0.0);
        let mut base = wobbly(0.2);
        let first = base(start).unwrap().angle;
        let event = newton_angle(target, start, &options, |jd| {
            let s = base(jd)?;
            seen.push(normalize_positive(s.angle - first));
            Ok(s)
        })
        .unwrap();

        // first entry is the start sample
        let gaps: Vec<f64> = seen[1..].iter().map(|d| (target - first - d).abs()).collect();
        for pair in gaps.windows(2) {
            assert!(
                pair[1] < pair[0] || pair[1] < 1e-9,
                "iterates did not approach the target: {:?}",
                gaps
            );
        }
        assert!(event.iterations >= 2);
    }

    #[test]
    fn test_newton_already_at_target() {
        let options = SolverOptions::default();
        let event = newton_angle(1.0, JulianDay(5.0), &options, |_| Ok(AngleSample::new(1.0, 0.3)))
            .unwrap();
        assert_eq!(event.jd, JulianDay(5.0));
        assert_eq!(event.iterations, 1);
    }

    #[test]
    fn test_zero_velocity_is_a_convergence_error() {
        let options = SolverOptions {
            bisect_fallback: false,
            ..SolverOptions::default()
        };
        let result = newton_angle(1.0, JulianDay(0.0), &options, |_| {
            Ok(AngleSample::new(0.5, 0.0))
        });
        assert!(matches!(
            result,
            Err(LunisolarError::Convergence {
                operation: "newton",
                ..
            })
        ));
    }

    #[test]
    fn test_fallback_bisects_when_velocity_is_wrong() {
        let options = SolverOptions::default();
        // true rate 0.2 rad/day, reported speed zero
        let event = solve_angle(PI, JulianDay(0.0), &options, |jd| {
            Ok(AngleSample::new(normalize_positive(0.2 * jd.value()), 0.0))
        })
        .unwrap();
        assert_abs_diff_eq!(event.jd.value(), PI / 0.2, epsilon = 1e-6);
    }

    #[test]
    fn test_bracket_skips_wrap_discontinuity() {
        let options = SolverOptions::default();
        // error starts near +π and wraps through -π before reaching zero
        let event = bisect_angle(0.0, JulianDay(0.0), &options, |jd| {
            Ok(AngleSample::new(normalize_positive(3.0 + 0.1 * jd.value()), 0.1))
        })
        .unwrap();
        assert_abs_diff_eq!(event.jd.value(), (TAU - 3.0) / 0.1, epsilon = 1e-6);
    }

    #[test]
    fn test_bracket_without_root_fails() {
        let options = SolverOptions::default();
        let result = bracket_bisect(JulianDay(0.0), 10, PI, &options, |_| Ok(1.0));
        assert!(matches!(
            result,
            Err(LunisolarError::Convergence {
                operation: "bracket",
                ..
            })
        ));
    }

    #[test]
    fn test_sequence_repeated_targets_advance() {
        let options = SolverOptions::default();
        let targets = [0.0, 0.0, PI];
        let rate = 0.2;
        let events = solve_angle_sequence(&targets, JulianDay(1.0), 15.0, &options, |jd| {
            Ok(AngleSample::new(normalize_positive(rate * jd.value()), rate))
        })
        .unwrap();

        let period = TAU / rate;
        assert_abs_diff_eq!(events[0].jd.value(), period, epsilon = 1e-6);
        assert_abs_diff_eq!(events[1].jd.value(), 2.0 * period, epsilon = 1e-6);
        assert_abs_diff_eq!(events[2].jd.value(), 2.5 * period, epsilon = 1e-6);
    }

    #[test]
    fn test_sequence_reports_completed_count() {
        let options = SolverOptions::default();
        let targets = [0.5, 1.0, 1.5, 2.0];
        let result = solve_angle_sequence(&targets, JulianDay(0.0), 1.0, &options, |jd| {
            if jd.value() > 6.0 {
                return Err(EphemerisError::DataUnavailable("past the end".to_string()).into());
            }
            Ok(AngleSample::new(normalize_positive(0.2 * jd.value()), 0.2))
        });

        match result {
            Err(LunisolarError::Batch { completed, source }) => {
                assert_eq!(completed, 2);
                assert!(matches!(*source, LunisolarError::Ephemeris(_)));
            }
            other => panic!("expected batch error, got {:?}", other),
        }
    }

    fn newton_only() -> SolverOptions {
        SolverOptions {
            bisect_fallback: false,
            ..SolverOptions::default()
        }
    }

    fn linear(rate: f64) -> impl FnMut(JulianDay) -> Result<AngleSample> {
        move |jd: JulianDay| Ok(AngleSample::new(normalize_positive(rate * jd.value()), rate))
    }

    #[test]
    fn test_newton_target_more_than_half_turn_ahead() {
        let options = newton_only();
        let event = newton_angle(5.0, JulianDay(0.0), &options, linear(0.2)).unwrap();
        assert_abs_diff_eq!(event.jd.value(), 25.0, epsilon = 1e-9);
        assert!(event.iterations <= 3);

        // almost a full turn ahead
        let event = newton_angle(0.0, JulianDay(1.0), &options, linear(0.2)).unwrap();
        assert_abs_diff_eq!(event.jd.value(), TAU / 0.2, epsilon = 1e-9);

        let event = newton_angle(5.0, JulianDay(0.0), &options, wobbly(0.2)).unwrap();
        let mut f = wobbly(0.2);
        let angle = f(event.jd).unwrap().angle;
        assert_abs_diff_eq!(normalize_half(angle - 5.0), 0.0, epsilon = 1e-9);
        assert!(event.jd.value() > 20.0 && event.jd.value() < 30.0);
    }

    #[test]
    fn test_sequence_repeats_without_fallback() {
        let options = newton_only();
        let period = TAU / 0.2;
        let events =
            solve_angle_sequence(&[0.0, 0.0, 0.0], JulianDay(1.0), 15.0, &options, linear(0.2))
                .unwrap();
        for (i, event) in events.iter().enumerate() {
            assert_abs_diff_eq!(event.jd.value(), (i + 1) as f64 * period, epsilon = 1e-6);
        }

        // targets equal within the tolerance count as a repeat
        let events =
            solve_angle_sequence(&[0.0, 1e-12], JulianDay(1.0), 15.0, &options, linear(0.2))
                .unwrap();
        assert_abs_diff_eq!(events[1].jd.value(), 2.0 * period, epsilon = 1e-6);
    }
}
