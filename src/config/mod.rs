//! Almanac configuration
//!
//! Every field has a default, so a JSON file only needs the values it
//! changes:
//!
//! ```json
//! { "delta_t_model": "provider", "twilight": { "civil": -6.5 } }
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::constants::SUN_RISE_SET_ARCMIN;
use crate::searchlib::SolverOptions;
use crate::{LunisolarError, Result};

/// Source of ΔT for one [`crate::planetlib::Astronomy`] instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaTModel {
    /// Built-in empirical table with parabolic extrapolation
    #[default]
    Table,
    /// The ephemeris provider's own model
    Provider,
}

/// Sun altitudes, in degrees, that define rise/set and the three twilights
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TwilightAngles {
    pub rise_set: f64,
    pub civil: f64,
    pub nautical: f64,
    pub astronomical: f64,
}

impl Default for TwilightAngles {
    fn default() -> Self {
        Self {
            rise_set: SUN_RISE_SET_ARCMIN / 60.0,
            civil: -6.0,
            nautical: -12.0,
            astronomical: -18.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AlmanacConfig {
    pub delta_t_model: DeltaTModel,
    /// Tolerance exponent of the Newton stopping test (radians)
    pub decimal_places: i32,
    /// Iteration ceiling for every iterative solver
    pub max_iterations: usize,
    /// Retry with bracket-and-bisect when Newton iteration does not converge
    pub bisect_fallback: bool,
    pub bisect_step_days: f64,
    /// Tolerance exponent of the bisection bracket (days)
    pub bisect_decimal_places: i32,
    /// Fixed refinement passes for rise/set/culmination
    pub refinement_passes: usize,
    /// Civil zone of the lunisolar calendar, hours east of UT
    pub civil_offset_hours: f64,
    pub twilight: TwilightAngles,
}

impl Default for AlmanacConfig {
    fn default() -> Self {
        Self {
            delta_t_model: DeltaTModel::Table,
            decimal_places: 9,
            max_iterations: 64,
            bisect_fallback: true,
            bisect_step_days: 27.0 * 0.125,
            bisect_decimal_places: 6,
            refinement_passes: 3,
            civil_offset_hours: 8.0,
            twilight: TwilightAngles::default(),
        }
    }
}

impl AlmanacConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delta_t_model(mut self, model: DeltaTModel) -> Self {
        self.delta_t_model = model;
        self
    }

    pub fn with_decimal_places(mut self, places: i32) -> Self {
        self.decimal_places = places;
        self
    }

    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    pub fn with_bisect_fallback(mut self, enabled: bool) -> Self {
        self.bisect_fallback = enabled;
        self
    }

    pub fn with_refinement_passes(mut self, passes: usize) -> Self {
        self.refinement_passes = passes;
        self
    }

    pub fn with_civil_offset_hours(mut self, hours: f64) -> Self {
        self.civil_offset_hours = hours;
        self
    }

    pub fn with_twilight(mut self, twilight: TwilightAngles) -> Self {
        self.twilight = twilight;
        self
    }

    /// Civil zone offset in days
    pub fn civil_offset_days(&self) -> f64 {
        self.civil_offset_hours / 24.0
    }

    /// Solver settings derived from this configuration
    pub fn solver_options(&self) -> SolverOptions {
        SolverOptions {
            decimal_places: self.decimal_places,
            max_iterations: self.max_iterations,
            bisect_fallback: self.bisect_fallback,
            bisect_step_days: self.bisect_step_days,
            bisect_decimal_places: self.bisect_decimal_places,
        }
    }

    /// Reject settings the solvers cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(LunisolarError::Config(
                "max_iterations must be positive".to_string(),
            ));
        }
        if self.refinement_passes == 0 {
            return Err(LunisolarError::Config(
                "refinement_passes must be positive".to_string(),
            ));
        }
        if !(1..=15).contains(&self.decimal_places) {
            return Err(LunisolarError::Config(format!(
                "decimal_places {} outside 1..=15",
                self.decimal_places
            )));
        }
        if !(1..=12).contains(&self.bisect_decimal_places) {
            return Err(LunisolarError::Config(format!(
                "bisect_decimal_places {} outside 1..=12",
                self.bisect_decimal_places
            )));
        }
        if !(self.bisect_step_days.is_finite() && self.bisect_step_days > 0.0) {
            return Err(LunisolarError::Config(format!(
                "bisect_step_days {} must be a positive number of days",
                self.bisect_step_days
            )));
        }
        if !(-14.0..=14.0).contains(&self.civil_offset_hours) {
            return Err(LunisolarError::Config(format!(
                "civil_offset_hours {} outside -14..=14",
                self.civil_offset_hours
            )));
        }
        Ok(())
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: AlmanacConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        log::debug!("loaded almanac config from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AlmanacConfig::default();
        assert_eq!(config.delta_t_model, DeltaTModel::Table);
        assert_eq!(config.decimal_places, 9);
        assert_eq!(config.refinement_passes, 3);
        assert_relative_eq!(config.bisect_step_days, 3.375);
        assert_relative_eq!(config.civil_offset_days(), 1.0 / 3.0);
        assert_relative_eq!(config.twilight.rise_set, -50.0 / 60.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = AlmanacConfig::from_json_str(
            r#"{ "delta_t_model": "provider", "twilight": { "civil": -6.5 } }"#,
        )
        .unwrap();
        assert_eq!(config.delta_t_model, DeltaTModel::Provider);
        assert_eq!(config.twilight.civil, -6.5);
        assert_eq!(config.twilight.nautical, -12.0);
        assert_eq!(config.max_iterations, 64);
    }

    #[test]
    fn test_validation_rejects() {
        let zero = AlmanacConfig::new().with_max_iterations(0);
        assert!(matches!(zero.validate(), Err(LunisolarError::Config(_))));

        let passes = AlmanacConfig::new().with_refinement_passes(0);
        assert!(passes.validate().is_err());

        assert!(matches!(
            AlmanacConfig::from_json_str(r#"{ "civil_offset_hours": 30 }"#),
            Err(LunisolarError::Config(_))
        ));
        assert!(matches!(
            AlmanacConfig::from_json_str("{ not json"),
            Err(LunisolarError::Json(_))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let config = AlmanacConfig::new()
            .with_decimal_places(10)
            .with_bisect_fallback(false)
            .with_civil_offset_hours(9.0);

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(config.to_json_string().unwrap().as_bytes())
            .unwrap();

        let loaded = AlmanacConfig::from_file(file.path()).unwrap();
        assert_eq!(loaded, config);

        assert!(matches!(
            AlmanacConfig::from_file("/nonexistent/almanac.json"),
            Err(LunisolarError::Io(_))
        ));
    }
}
