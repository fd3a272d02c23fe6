//! Solar terms, lunar phases and new moons
//!
//! Solar terms are the instants the Sun's apparent ecliptic longitude
//! reaches a multiple of 15°, index 0 being the spring equinox (0°). Lunar
//! phases are the instants the Moon-minus-Sun longitude reaches a multiple of
//! 90°, index 0 being the new moon.

pub mod twilight;

use log::{debug, warn};

use crate::constants::{MEAN_SYNODIC_MONTH, MEAN_TROPICAL_YEAR};
use crate::coordinates::angle::{next_multiple, normalize_half, normalize_positive};
use crate::planetlib::{Astronomy, Body};
use crate::searchlib::{solve_angle, solve_angle_sequence, AngleSample, EventTime};
use crate::time::{CalendarDay, JulianDay, JulianDayWithIndex};
use crate::{LunisolarError, Result};

/// Degrees between consecutive solar terms
pub const DEGREES_PER_SOLAR_TERM: f64 = 15.0;
pub const SOLAR_TERMS_PER_YEAR: usize = 24;

/// Degrees between consecutive lunar phases
pub const DEGREES_PER_LUNAR_PHASE: f64 = 90.0;
pub const LUNAR_PHASES_PER_MONTH: usize = 4;

/// Searches open this far before their start so an event exactly at the
/// start is not pushed to the next revolution
pub const SEARCH_LEAD_DAYS: f64 = 1e-4;

/// Start-estimate jump when a solar target repeats
pub const SOLAR_REPEAT_JUMP_DAYS: f64 = MEAN_TROPICAL_YEAR * 0.8;
/// Start-estimate jump when a lunar target repeats
pub const LUNAR_REPEAT_JUMP_DAYS: f64 = MEAN_SYNODIC_MONTH / 2.0;

/// Solar term names by index, starting at the spring equinox
pub const SOLAR_TERM_NAMES: [&str; SOLAR_TERMS_PER_YEAR] = [
    "春分", "清明", "谷雨", "立夏", "小满", "芒种", "夏至", "小暑", "大暑", "立秋", "处暑", "白露",
    "秋分", "寒露", "霜降", "立冬", "小雪", "大雪", "冬至", "小寒", "大寒", "立春", "雨水", "惊蛰",
];

pub const LUNAR_PHASE_NAMES: [&str; LUNAR_PHASES_PER_MONTH] = ["朔", "上弦", "望", "下弦"];

pub const LUNAR_MONTH_NAMES: [&str; 12] = [
    "正月", "二月", "三月", "四月", "五月", "六月", "七月", "八月", "九月", "十月", "冬月", "腊月",
];

pub const LEAP_MONTH_PREFIX: &str = "闰";

pub const LUNAR_DAY_NAMES: [&str; 30] = [
    "初一", "初二", "初三", "初四", "初五", "初六", "初七", "初八", "初九", "初十", "十一", "十二",
    "十三", "十四", "十五", "十六", "十七", "十八", "十九", "二十", "廿一", "廿二", "廿三", "廿四",
    "廿五", "廿六", "廿七", "廿八", "廿九", "三十",
];

pub fn solar_term_name(index: usize) -> &'static str {
    SOLAR_TERM_NAMES[index % SOLAR_TERMS_PER_YEAR]
}

pub fn lunar_phase_name(index: usize) -> &'static str {
    LUNAR_PHASE_NAMES[index % LUNAR_PHASES_PER_MONTH]
}

/// Name of a 0-based lunar month, with the leap prefix when `leap`
pub fn lunar_month_name(index: usize, leap: bool) -> String {
    let name = LUNAR_MONTH_NAMES[index % 12];
    if leap {
        format!("{}{}", LEAP_MONTH_PREFIX, name)
    } else {
        name.to_string()
    }
}

/// Name of a 0-based day of a lunar month
pub fn lunar_day_name(index: usize) -> &'static str {
    LUNAR_DAY_NAMES[index % 30]
}

impl Astronomy {
    /// Apparent solar longitude and its daily rate
    pub fn solar_longitude(&self, jd: JulianDay) -> Result<AngleSample> {
        let et = self.ephemeris_time(jd)?;
        let sun = self.body_state(Body::Sun, &et)?;
        Ok(AngleSample::new(sun.ecliptic.lon, sun.lon_speed))
    }

    /// Moon-minus-Sun ecliptic longitude and its daily rate
    pub fn lunar_solar_elongation(&self, jd: JulianDay) -> Result<AngleSample> {
        let et = self.ephemeris_time(jd)?;
        let sun = self.body_state(Body::Sun, &et)?;
        let moon = self.body_state(Body::Moon, &et)?;
        Ok(AngleSample::new(
            normalize_positive(moon.ecliptic.lon - sun.ecliptic.lon),
            moon.lon_speed - sun.lon_speed,
        ))
    }

    /// First instant at or after `start` the Sun reaches `longitude` (radians)
    pub fn solar_longitude_time(&self, start: JulianDay, longitude: f64) -> Result<EventTime> {
        solve_angle(
            longitude,
            start,
            &self.config().solver_options(),
            |jd| self.solar_longitude(jd),
        )
    }

    /// Times the Sun reaches each longitude in turn, starting at `start`
    pub fn solar_longitude_times(
        &self,
        start: JulianDay,
        longitudes: &[f64],
    ) -> Result<Vec<JulianDay>> {
        let events = solve_angle_sequence(
            longitudes,
            start,
            SOLAR_REPEAT_JUMP_DAYS,
            &self.config().solver_options(),
            |jd| self.solar_longitude(jd),
        )?;
        Ok(events.into_iter().map(|event| event.jd).collect())
    }

    /// Times the Moon-minus-Sun longitude reaches each value in turn
    ///
    /// `[π/2, π, 3π/2, 0]` from a new moon gives the next first quarter,
    /// full moon, last quarter and new moon.
    pub fn lunar_solar_elongation_times(
        &self,
        start: JulianDay,
        elongations: &[f64],
    ) -> Result<Vec<JulianDay>> {
        let events = solve_angle_sequence(
            elongations,
            start,
            LUNAR_REPEAT_JUMP_DAYS,
            &self.config().solver_options(),
            |jd| self.lunar_solar_elongation(jd),
        )?;
        Ok(events.into_iter().map(|event| event.jd).collect())
    }

    /// Solar terms between `start` and `end` inclusive
    pub fn solar_terms_range(
        &self,
        start: JulianDay,
        end: JulianDay,
    ) -> Result<Vec<JulianDayWithIndex>> {
        let mut jd = start - SEARCH_LEAD_DAYS;
        let first = self.solar_longitude(jd)?.angle.to_degrees();
        let mut longitude = next_multiple(first, DEGREES_PER_SOLAR_TERM);

        let mut terms = Vec::new();
        while jd <= end {
            let event = self
                .solar_longitude_time(jd, longitude.to_radians())
                .map_err(|err| {
                    warn!("solar terms stopped after {} terms: {}", terms.len(), err);
                    LunisolarError::Batch {
                        completed: terms.len(),
                        source: Box::new(err),
                    }
                })?;
            jd = event.jd;
            let index = (longitude / DEGREES_PER_SOLAR_TERM).round() as usize % SOLAR_TERMS_PER_YEAR;
            terms.push(JulianDayWithIndex::new(jd, index));
            longitude += DEGREES_PER_SOLAR_TERM;
        }

        // the loop always solves one term past the end
        if terms.last().map_or(false, |term| term.jd_ut > end) {
            terms.pop();
        }
        debug!(
            "{} solar terms between {:.6} and {:.6}",
            terms.len(),
            start.value(),
            end.value()
        );
        Ok(terms)
    }

    /// The 24 solar terms of a calendar year (UT)
    pub fn solar_terms(&self, year: i32) -> Result<Vec<JulianDayWithIndex>> {
        let (start, end) = self.year_bounds(year)?;
        let mut terms = self.solar_terms_range(start, end)?;
        terms.retain(|term| term.jd_ut < end);
        Ok(terms)
    }

    /// New moons, quarters and full moons between `start` and `end` inclusive
    pub fn lunar_phases_range(
        &self,
        start: JulianDay,
        end: JulianDay,
    ) -> Result<Vec<JulianDayWithIndex>> {
        let search_start = start - SEARCH_LEAD_DAYS;
        let first = self.lunar_solar_elongation(search_start)?.angle.to_degrees();
        let first_target = next_multiple(first, DEGREES_PER_LUNAR_PHASE);

        let quarter = MEAN_SYNODIC_MONTH / LUNAR_PHASES_PER_MONTH as f64;
        let count = ((end - start) / quarter).ceil().max(0.0) as usize + 1;
        let targets: Vec<f64> = (0..count)
            .map(|i| first_target + DEGREES_PER_LUNAR_PHASE * i as f64)
            .collect();
        let radians: Vec<f64> = targets.iter().map(|deg| deg.to_radians()).collect();

        let times = self.lunar_solar_elongation_times(search_start, &radians)?;
        let phases: Vec<JulianDayWithIndex> = times
            .into_iter()
            .zip(targets)
            .filter(|(jd, _)| *jd <= end)
            .map(|(jd, target)| {
                let index =
                    (target / DEGREES_PER_LUNAR_PHASE).round() as usize % LUNAR_PHASES_PER_MONTH;
                JulianDayWithIndex::new(jd, index)
            })
            .collect();

        debug!(
            "{} lunar phases between {:.6} and {:.6}",
            phases.len(),
            start.value(),
            end.value()
        );
        Ok(phases)
    }

    /// Lunar phases of a calendar year (UT)
    pub fn lunar_phases(&self, year: i32) -> Result<Vec<JulianDayWithIndex>> {
        let (start, end) = self.year_bounds(year)?;
        let mut phases = self.lunar_phases_range(start, end)?;
        phases.retain(|phase| phase.jd_ut < end);
        Ok(phases)
    }

    /// `count` consecutive new moons, the first at or after `start`
    pub fn new_moons(&self, start: JulianDay, count: usize) -> Result<Vec<JulianDay>> {
        self.lunar_solar_elongation_times(start - SEARCH_LEAD_DAYS, &vec![0.0; count])
    }

    /// The last new moon at or before `anchor`
    pub fn last_new_moon(&self, anchor: JulianDay) -> Result<JulianDay> {
        let candidates = self.new_moons(anchor - MEAN_SYNODIC_MONTH * 1.5, 3)?;
        candidates
            .into_iter()
            .rev()
            .find(|jd| *jd <= anchor)
            .ok_or(LunisolarError::Convergence {
                operation: "last_new_moon",
                target: 0.0,
                iterations: 3,
                jd: anchor.value(),
            })
    }

    /// January 1st 00:00 UT of `year` and of the following year
    fn year_bounds(&self, year: i32) -> Result<(JulianDay, JulianDay)> {
        let start = self.julian_day(year, 1, 1, 0.0)?;
        Ok((start, start.add_years(1)))
    }
}
