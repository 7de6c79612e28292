//! Concession Report Engine
//!
//! Platform-agnostic aggregation of precomputed Earth observation tables for a
//! single land concession. This crate computes summaries, rolling means and
//! seasonal baselines; loading tables and rendering text are left to callers.

pub mod config;
pub mod entity;
pub mod error;
pub mod numbers;
pub mod report;
pub mod rolling;
pub mod seasonal;
pub mod summary;
pub mod tables;

// Re-export commonly used types
pub use config::{ConfigError, DeforestationScope, ReportConfig};
pub use entity::{IndicatorPresence, indicator_presence, resolve_entity, species_presence};
pub use error::{ErrorKind, ReportError};
pub use report::{
    ConcessionProfile, ConcessionReport, ConcessionView, ContextError, ReportContext, Selection,
    TableSource, TrendSeries, VegetationIndex, WeatherReport,
};
pub use rolling::{DatedValue, symmetric_moving_average};
pub use seasonal::{BandPoint, DayComparison, SeasonalComparison, historical_band, seasonal_band};
pub use summary::{
    CarbonSummary, DeforestationSummary, WaterShare, WaterSummary, carbon_summary, cost_per_area,
    deforestation_summary, percent, water_summary,
};
pub use tables::{
    CarbonBin, ConcessionRecord, DeforestationYear, EntityKeyed, EvapotranspirationObservation,
    FireObservation, Tables, VegetationObservation, WaterClassArea, WeatherObservation,
    filter_entity,
};

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;

    #[derive(Clone, Default)]
    struct FixtureSource {
        tables: Tables,
    }

    impl TableSource for FixtureSource {
        type Error = Infallible;

        fn load_tables(&self) -> Result<Tables, Self::Error> {
            Ok(self.tables.clone())
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("disk on fire")]
    struct BrokenDisk;

    struct BrokenSource;

    impl TableSource for BrokenSource {
        type Error = BrokenDisk;

        fn load_tables(&self) -> Result<Tables, Self::Error> {
            Err(BrokenDisk)
        }
    }

    #[test]
    fn context_loads_from_source() {
        let source = FixtureSource {
            tables: Tables::from_json(
                r#"{ "concessions": [
                    { "name": "Chifunda", "area_km2": 10.0, "total_fees": 25.0, "outfitter": "-" }
                ] }"#,
            )
            .unwrap(),
        };
        let ctx = ReportContext::load(&source, ReportConfig::default()).unwrap();
        assert_eq!(ctx.concession_names(), vec!["Chifunda"]);
        let profile = ctx.concession("Chifunda").unwrap().profile().unwrap();
        assert_eq!(profile.cost_per_km2, 3);
        assert_eq!(profile.wildlife, IndicatorPresence::None);
    }

    #[test]
    fn context_surfaces_source_and_config_errors() {
        let err = ReportContext::load(&BrokenSource, ReportConfig::default()).unwrap_err();
        assert_eq!(err.to_string(), "failed to load tables: disk on fire");

        let mut config = ReportConfig::default();
        config.species.clear();
        let err = ReportContext::load(&FixtureSource::default(), config).unwrap_err();
        assert!(matches!(
            err,
            ContextError::Report(ReportError::Config(ConfigError::EmptySpecies))
        ));
    }
}
