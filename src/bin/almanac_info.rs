//! Almanac Information Tool
//!
//! Prints solar terms, lunar phases, lunisolar months and Sun/Moon
//! rise/set times computed with the built-in analytic ephemeris.
//!
//! Usage:
//!   cargo run --bin almanac_info -- terms --year 2023
//!   cargo run --bin almanac_info -- months --year 2023 --json
//!   cargo run --bin almanac_info -- sun --date 2020-09-30 --lon "116°23'" --lat "39°54'"
//!
//! Set `RUST_LOG=debug` to see solver diagnostics.

use std::path::PathBuf;

use chrono::{Datelike, NaiveDate};
use clap::{ArgAction, Parser, Subcommand};
use serde::Serialize;

use lunisolar::almanac::{lunar_phase_name, solar_term_name};
use lunisolar::almanac::twilight::{HorizonEvent, TwilightTimes};
use lunisolar::time::parse_utc_offset;
use lunisolar::{
    AlmanacConfig, Astronomy, CalendarDay, CalendarTuple, GeographicPosition, JulianDay,
};

/// Type alias for the error type used throughout this module
type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

/// Almanac Information Tool
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Computes solar terms, lunar phases, lunisolar months and rise/set times",
    long_about = None
)]
struct Args {
    /// Time zone for printed times, e.g. UTC+08:00
    #[arg(long, default_value = "UTC+08:00", global = true)]
    tz: String,

    /// Print JSON instead of a table
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    json: bool,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// The 24 solar terms of a year
    Terms {
        #[arg(long)]
        year: i32,
    },
    /// New moons, quarters and full moons of a year
    Phases {
        #[arg(long)]
        year: i32,
    },
    /// Lunisolar months from the eleventh month of the previous year
    Months {
        #[arg(long)]
        year: i32,
    },
    /// Sun rise, set, culmination and twilight for a local date
    Sun {
        #[command(flatten)]
        place: Place,
    },
    /// Moon rise, set and culmination for a local date
    Moon {
        #[command(flatten)]
        place: Place,
    },
}

#[derive(clap::Args, Debug)]
struct Place {
    /// Local date, YYYY-MM-DD
    #[arg(long)]
    date: String,

    /// Longitude, decimal degrees or DMS such as 116°23'
    #[arg(long, allow_hyphen_values = true)]
    lon: String,

    /// Latitude, decimal degrees or DMS such as 39°54'
    #[arg(long, allow_hyphen_values = true)]
    lat: String,

    /// Use the simple pipeline (no nutation, aberration, parallax or refraction)
    #[arg(long, action = ArgAction::SetTrue)]
    simple: bool,
}

#[derive(Serialize)]
struct EventRow {
    name: String,
    jd_ut: JulianDay,
    local: String,
}

#[derive(Serialize)]
struct MonthRow {
    name: String,
    index: usize,
    leap: bool,
    days: u32,
    jd_ut: JulianDay,
    local: String,
}

/// Prints a section header with a title and separator line
fn print_section_header(title: &str) {
    println!("\n{}:", title);
    println!("-------------------------------------------------------");
}

fn local_time(jd: JulianDay, offset_days: f64) -> CalendarTuple {
    jd.to_location(offset_days).to_calendar()
}

fn event_row(name: &str, jd: JulianDay, offset_days: f64) -> EventRow {
    EventRow {
        name: name.to_string(),
        jd_ut: jd,
        local: local_time(jd, offset_days).to_string(),
    }
}

fn horizon_row(name: &str, event: HorizonEvent, offset_days: f64) -> EventRow {
    let mut row = event_row(name, event.jd(), offset_days);
    match event {
        HorizonEvent::Crossing(_) => {}
        HorizonEvent::AlwaysAbove(_) => row.local = "always above".to_string(),
        HorizonEvent::AlwaysBelow(_) => row.local = "always below".to_string(),
    }
    row
}

fn transit_rows(times: &TwilightTimes, offset_days: f64) -> Vec<EventRow> {
    vec![
        horizon_row("rise", times.rise, offset_days),
        event_row("culmination", times.culmination, offset_days),
        horizon_row("set", times.set, offset_days),
        event_row("lower culmination", times.lower_culmination, offset_days),
    ]
}

fn print_rows<T: Serialize>(
    title: &str,
    rows: &[T],
    json: bool,
    line: impl Fn(&T) -> String,
) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(rows)?);
        return Ok(());
    }
    print_section_header(title);
    for row in rows {
        println!("{}", line(row));
    }
    Ok(())
}

/// UT instant of local noon on `date` in a zone `offset_days` east of UT
fn local_noon(date: &str, offset_days: f64) -> Result<JulianDay> {
    let date = NaiveDate::parse_from_str(date, "%Y-%m-%d")?;
    let noon = JulianDay::from_calendar(date.year(), date.month(), date.day(), 12, 0, 0.0);
    Ok(noon - offset_days)
}

fn observer(place: &Place) -> Result<GeographicPosition> {
    Ok(GeographicPosition::parse(&place.lon, &place.lat)?)
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => AlmanacConfig::from_file(path)?,
        None => AlmanacConfig::default(),
    };
    let astronomy = Astronomy::analytic().with_config(config);
    let offset_days = parse_utc_offset(&args.tz)? / 24.0;

    match &args.command {
        Command::Terms { year } => {
            let rows: Vec<EventRow> = astronomy
                .solar_terms(*year)?
                .into_iter()
                .map(|term| event_row(solar_term_name(term.index), term.jd_ut, offset_days))
                .collect();
            print_rows(&format!("Solar terms {}", year), &rows, args.json, |row| {
                format!("{:<4} {}", row.name, row.local)
            })?;
        }
        Command::Phases { year } => {
            let rows: Vec<EventRow> = astronomy
                .lunar_phases(*year)?
                .into_iter()
                .map(|phase| event_row(lunar_phase_name(phase.index), phase.jd_ut, offset_days))
                .collect();
            print_rows(&format!("Lunar phases {}", year), &rows, args.json, |row| {
                format!("{:<4} {}", row.name, row.local)
            })?;
        }
        Command::Months { year } => {
            let rows: Vec<MonthRow> = astronomy
                .lunar_months(*year)?
                .into_iter()
                .map(|month| MonthRow {
                    name: month.name(),
                    index: month.index,
                    leap: month.leap,
                    days: month.days,
                    jd_ut: month.jd_ut,
                    local: local_time(month.jd_ut, offset_days).to_string(),
                })
                .collect();
            print_rows(&format!("Lunar months {}", year), &rows, args.json, |row| {
                format!("{:<5} {:>2} days  new moon {}", row.name, row.days, row.local)
            })?;
        }
        Command::Sun { place } => {
            let observer = observer(place)?;
            let sun = astronomy.sun_twilight(
                local_noon(&place.date, offset_days)?,
                &observer,
                !place.simple,
            )?;
            let rows = vec![
                horizon_row("astronomical dawn", sun.astronomical.dawn, offset_days),
                horizon_row("nautical dawn", sun.nautical.dawn, offset_days),
                horizon_row("civil dawn", sun.civil.dawn, offset_days),
                horizon_row("rise", sun.rise, offset_days),
                event_row("culmination", sun.culmination, offset_days),
                horizon_row("set", sun.set, offset_days),
                horizon_row("civil dusk", sun.civil.dusk, offset_days),
                horizon_row("nautical dusk", sun.nautical.dusk, offset_days),
                horizon_row("astronomical dusk", sun.astronomical.dusk, offset_days),
                event_row("lower culmination", sun.lower_culmination, offset_days),
            ];
            print_rows(&format!("Sun {}", place.date), &rows, args.json, |row| {
                format!("{:<18} {}", row.name, row.local)
            })?;
            if !args.json {
                if let Some(daylight) = sun.daylight() {
                    println!("{:<18} {:.4} h", "daylight", daylight * 24.0);
                }
                if let Some(night) = sun.night(offset_days) {
                    println!("{:<18} {:.4} h", "night", night * 24.0);
                }
            }
        }
        Command::Moon { place } => {
            let observer = observer(place)?;
            let moon = astronomy.moon_twilight(
                local_noon(&place.date, offset_days)?,
                &observer,
                !place.simple,
            )?;
            let rows = transit_rows(&moon, offset_days);
            print_rows(&format!("Moon {}", place.date), &rows, args.json, |row| {
                format!("{:<18} {}", row.name, row.local)
            })?;
        }
    }

    Ok(())
}
