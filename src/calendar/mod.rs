//! Chinese lunisolar months
//!
//! A calendar year is built between two winter solstices. The month holding
//! the first solstice is the eleventh month; when the span holds thirteen new
//! moons, the first month without a principal term is the leap month and
//! repeats the number of the month before it. Day boundaries are taken in the
//! configured civil zone (UTC+8 by default).

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::almanac::lunar_month_name;
use crate::planetlib::Astronomy;
use crate::time::{CalendarDay, JulianDay, JulianDayWithIndex, LocalJulianDay};
use crate::{LunisolarError, Result};

/// 0-based index of the month containing the winter solstice
pub const WINTER_SOLSTICE_MONTH: usize = 10;

const WINTER_SOLSTICE_DEGREES: f64 = 270.0;

/// New moons generated per year; one more than the longest year needs
const NEW_MOONS_PER_YEAR: usize = 14;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LunarMonth {
    /// New moon that opens the month
    pub jd_ut: JulianDay,
    /// 0-based month index; a leap month shares the index of the month it follows
    pub index: usize,
    pub days: u32,
    pub leap: bool,
}

impl LunarMonth {
    /// Civil month number, 1-12
    pub fn month_number(&self) -> usize {
        self.index + 1
    }

    pub fn name(&self) -> String {
        lunar_month_name(self.index, self.leap)
    }
}

/// Whether a principal term (even index) falls in `[start, end)` of the civil zone
fn has_principal_term(
    terms: &[JulianDayWithIndex],
    offset: f64,
    start: LocalJulianDay,
    end: LocalJulianDay,
) -> bool {
    terms.iter().any(|term| {
        let local = term.jd_ut.to_location(offset);
        local >= start && local < end && term.index % 2 == 0
    })
}

impl Astronomy {
    /// Months from the eleventh month of `year - 1` up to the next eleventh month
    pub fn lunar_months(&self, year: i32) -> Result<Vec<LunarMonth>> {
        let offset = self.config().civil_offset_days();

        let search_start = self.julian_day(year - 1, 12, 1, 0.0)?;
        let solstice = WINTER_SOLSTICE_DEGREES.to_radians();
        let solstices = self.solar_longitude_times(search_start, &[solstice, solstice])?;
        let (first_solstice, next_solstice) = match solstices.as_slice() {
            [first, next] => (*first, *next),
            _ => {
                return Err(LunisolarError::Convergence {
                    operation: "winter_solstice",
                    target: solstice,
                    iterations: solstices.len(),
                    jd: search_start.value(),
                })
            }
        };

        let first_new_moon = self.last_new_moon(first_solstice)?;
        let next_new_moon = self.last_new_moon(next_solstice)?;
        let new_moons = self.new_moons(first_new_moon, NEW_MOONS_PER_YEAR)?;
        let terms = self.solar_terms_range(first_solstice, next_solstice)?;

        // twelve months when the thirteenth new moon is already the next anchor
        let has_leap = (new_moons[12] - next_new_moon).abs() > 0.5;
        let count = if has_leap { 13 } else { 12 };

        let mut leap_month: Option<usize> = None;
        let mut months = Vec::with_capacity(count);
        for (i, pair) in new_moons.windows(2).take(count).enumerate() {
            let start = pair[0].to_location(offset).start_of_day();
            let end = pair[1].to_location(offset).start_of_day();

            let index = WINTER_SOLSTICE_MONTH + i;
            if has_leap
                && leap_month.is_none()
                && !has_principal_term(&terms, offset, start, end)
            {
                leap_month = Some(index);
            }

            let shifted = match leap_month {
                Some(leap) if index >= leap => index - 1,
                _ => index,
            };
            months.push(LunarMonth {
                jd_ut: pair[0],
                index: shifted % 12,
                days: (end - start).round() as u32,
                leap: leap_month == Some(index),
            });
        }

        if has_leap && leap_month.is_none() {
            warn!("{} has thirteen lunar months but no month without a principal term", year);
        }
        debug!(
            "{} lunar months for {}, leap {:?}",
            months.len(),
            year,
            months.iter().find(|month| month.leap).map(LunarMonth::name)
        );
        Ok(months)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(2017, 5)]
    #[case(2020, 3)]
    #[case(2023, 1)]
    #[case(2025, 5)]
    fn test_leap_years(#[case] year: i32, #[case] leap_index: usize) {
        let astronomy = Astronomy::analytic();
        let months = astronomy.lunar_months(year).unwrap();
        assert_eq!(months.len(), 13);

        let leaps: Vec<&LunarMonth> = months.iter().filter(|month| month.leap).collect();
        assert_eq!(leaps.len(), 1);
        assert_eq!(leaps[0].index, leap_index);

        // the leap month follows the month whose number it repeats
        let position = months.iter().position(|month| month.leap).unwrap();
        assert_eq!(months[position - 1].index, leap_index);
        assert!(!months[position - 1].leap);
    }

    #[rstest]
    #[case(2019)]
    #[case(2021)]
    #[case(2022)]
    fn test_common_years(#[case] year: i32) {
        let astronomy = Astronomy::analytic();
        let months = astronomy.lunar_months(year).unwrap();
        assert_eq!(months.len(), 12);
        assert!(months.iter().all(|month| !month.leap));

        let indices: Vec<usize> = months.iter().map(|month| month.index).collect();
        assert_eq!(indices, vec![10, 11, 0, 1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_month_shape() {
        let astronomy = Astronomy::analytic();
        let months = astronomy.lunar_months(2020).unwrap();

        assert_eq!(months[0].index, WINTER_SOLSTICE_MONTH);
        assert_eq!(months[0].name(), "冬月");
        for pair in months.windows(2) {
            assert!(pair[0].jd_ut < pair[1].jd_ut);
        }
        for month in &months {
            assert!(month.days == 29 || month.days == 30, "{:?}", month);
        }

        // 2020 lunar new year: 2020-01-25 CST, new moon 2020-01-24 21:42 UT
        let first = months.iter().find(|month| month.index == 0).unwrap();
        let local = first.jd_ut.to_cst().to_calendar();
        assert_eq!((local.year, local.month, local.day), (2020, 1, 25));
        assert_eq!(first.month_number(), 1);

        let leap = months.iter().find(|month| month.leap).unwrap();
        assert_eq!(leap.name(), "闰四月");
    }
}
