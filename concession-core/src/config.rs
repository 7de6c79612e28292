//! Report configuration: smoothing bounds, seasonal baseline and summary rules.
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when report configuration invariants are violated.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("JSON parse error: {0}")]
    Parse(String),
    #[error("window minimum {min} exceeds maximum {max}")]
    WindowMinExceedsMax { min: usize, max: usize },
    #[error("{field} must be between {min} and {max} (got {value})")]
    WindowRange {
        field: &'static str,
        min: usize,
        max: usize,
        value: usize,
    },
    #[error("{field} must be greater than zero (got {value:.4})")]
    NotPositive { field: &'static str, value: f64 },
    #[error("percent precision {value} exceeds {max} decimal places")]
    Precision { value: u32, max: u32 },
    #[error("species list must not be empty")]
    EmptySpecies,
}

/// Which deforestation rows feed the total used for the area percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeforestationScope {
    /// Only the selected concession's rows.
    #[default]
    Entity,
    /// Every row in the table, divided by the selected concession's area.
    Dataset,
}

/// Bounds for the user-selected symmetric moving average window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmoothingConfig {
    #[serde(default = "SmoothingConfig::default_window_min")]
    pub window_min: usize,
    #[serde(default = "SmoothingConfig::default_window_max")]
    pub window_max: usize,
    #[serde(default = "SmoothingConfig::default_window")]
    pub default_window: usize,
}

impl SmoothingConfig {
    const fn default_window_min() -> usize {
        10
    }

    const fn default_window_max() -> usize {
        200
    }

    const fn default_window() -> usize {
        50
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.window_min > self.window_max {
            return Err(ConfigError::WindowMinExceedsMax {
                min: self.window_min,
                max: self.window_max,
            });
        }
        if !(self.window_min..=self.window_max).contains(&self.default_window) {
            return Err(ConfigError::WindowRange {
                field: "smoothing.default_window",
                min: self.window_min,
                max: self.window_max,
                value: self.default_window,
            });
        }
        Ok(())
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            window_min: Self::default_window_min(),
            window_max: Self::default_window_max(),
            default_window: Self::default_window(),
        }
    }
}

/// Year-over-year baseline parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalConfig {
    /// Year compared against every earlier year.
    #[serde(default = "SeasonalConfig::default_cutoff_year")]
    pub cutoff_year: i32,
    /// Normal quantile of the two-sided band (1.96 for 95%).
    #[serde(default = "SeasonalConfig::default_confidence_z")]
    pub confidence_z: f64,
    #[serde(default = "SeasonalConfig::default_fire_smoothing")]
    pub fire_smoothing: usize,
    #[serde(default = "SeasonalConfig::default_weather_smoothing")]
    pub weather_smoothing: usize,
}

impl SeasonalConfig {
    const fn default_cutoff_year() -> i32 {
        2020
    }

    const fn default_confidence_z() -> f64 {
        1.96
    }

    const fn default_fire_smoothing() -> usize {
        10
    }

    const fn default_weather_smoothing() -> usize {
        2
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.confidence_z.is_finite() && self.confidence_z > 0.0) {
            return Err(ConfigError::NotPositive {
                field: "seasonal.confidence_z",
                value: self.confidence_z,
            });
        }
        Ok(())
    }
}

impl Default for SeasonalConfig {
    fn default() -> Self {
        Self {
            cutoff_year: Self::default_cutoff_year(),
            confidence_z: Self::default_confidence_z(),
            fire_smoothing: Self::default_fire_smoothing(),
            weather_smoothing: Self::default_weather_smoothing(),
        }
    }
}

/// Rules for the scalar summaries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    #[serde(default = "SummaryConfig::default_percent_precision")]
    pub percent_precision: u32,
    #[serde(default)]
    pub deforestation_scope: DeforestationScope,
    /// Ground area covered by one carbon raster pixel, in hectares.
    #[serde(default = "SummaryConfig::default_carbon_pixel_area_ha")]
    pub carbon_pixel_area_ha: f64,
}

impl SummaryConfig {
    pub const MAX_PRECISION: u32 = 10;

    const fn default_percent_precision() -> u32 {
        2
    }

    const fn default_carbon_pixel_area_ha() -> f64 {
        0.09
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.percent_precision > Self::MAX_PRECISION {
            return Err(ConfigError::Precision {
                value: self.percent_precision,
                max: Self::MAX_PRECISION,
            });
        }
        if !(self.carbon_pixel_area_ha.is_finite() && self.carbon_pixel_area_ha > 0.0) {
            return Err(ConfigError::NotPositive {
                field: "summary.carbon_pixel_area_ha",
                value: self.carbon_pixel_area_ha,
            });
        }
        Ok(())
    }
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            percent_precision: Self::default_percent_precision(),
            deforestation_scope: DeforestationScope::default(),
            carbon_pixel_area_ha: Self::default_carbon_pixel_area_ha(),
        }
    }
}

/// Complete report configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportConfig {
    #[serde(default)]
    pub smoothing: SmoothingConfig,
    #[serde(default)]
    pub seasonal: SeasonalConfig,
    #[serde(default)]
    pub summary: SummaryConfig,
    /// Species indicator columns considered for the wildlife summary.
    #[serde(default = "ReportConfig::default_species")]
    pub species: Vec<String>,
}

impl ReportConfig {
    fn default_species() -> Vec<String> {
        ["BUFFALO", "IMPALA", "LEOPARD", "LION", "PUKU"]
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// Parse and validate a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed or if validation fails.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every invariant of the configuration.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.smoothing.validate()?;
        self.seasonal.validate()?;
        self.summary.validate()?;
        if self.species.is_empty() {
            return Err(ConfigError::EmptySpecies);
        }
        Ok(())
    }
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            smoothing: SmoothingConfig::default(),
            seasonal: SeasonalConfig::default(),
            summary: SummaryConfig::default(),
            species: Self::default_species(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let cfg = ReportConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.smoothing.default_window, 50);
        assert_eq!(cfg.seasonal.cutoff_year, 2020);
        assert_eq!(cfg.summary.deforestation_scope, DeforestationScope::Entity);
    }

    #[test]
    fn empty_json_takes_defaults() {
        let cfg = ReportConfig::from_json("{}").unwrap();
        assert_eq!(cfg, ReportConfig::default());
    }

    #[test]
    fn partial_json_overrides_fields() {
        let cfg = ReportConfig::from_json(
            r#"{ "seasonal": { "cutoff_year": 2019 }, "summary": { "deforestation_scope": "dataset" } }"#,
        )
        .unwrap();
        assert_eq!(cfg.seasonal.cutoff_year, 2019);
        assert!((cfg.seasonal.confidence_z - 1.96).abs() < f64::EPSILON);
        assert_eq!(cfg.summary.deforestation_scope, DeforestationScope::Dataset);
    }

    #[test]
    fn rejects_inverted_window_bounds() {
        let err = ReportConfig::from_json(r#"{ "smoothing": { "window_min": 300 } }"#).unwrap_err();
        assert_eq!(err, ConfigError::WindowMinExceedsMax { min: 300, max: 200 });
    }

    #[test]
    fn rejects_default_window_outside_bounds() {
        let err = ReportConfig::from_json(r#"{ "smoothing": { "default_window": 5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::WindowRange { value: 5, .. }));
    }

    #[test]
    fn rejects_non_positive_z_and_pixel_area() {
        let err = ReportConfig::from_json(r#"{ "seasonal": { "confidence_z": 0.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::NotPositive { field: "seasonal.confidence_z", .. }));
        let err = ReportConfig::from_json(r#"{ "summary": { "carbon_pixel_area_ha": -1.0 } }"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NotPositive {
                field: "summary.carbon_pixel_area_ha",
                ..
            }
        ));
    }

    #[test]
    fn rejects_bad_json_and_empty_species() {
        assert!(matches!(
            ReportConfig::from_json("not json"),
            Err(ConfigError::Parse(_))
        ));
        assert_eq!(
            ReportConfig::from_json(r#"{ "species": [] }"#).unwrap_err(),
            ConfigError::EmptySpecies
        );
    }
}
