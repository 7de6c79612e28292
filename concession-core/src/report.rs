//! Immutable report context and the per-concession views built from it.
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::config::{DeforestationScope, ReportConfig};
use crate::entity::{IndicatorPresence, resolve_entity, species_presence};
use crate::error::ReportError;
use crate::rolling::{DatedValue, symmetric_moving_average};
use crate::seasonal::{SeasonalComparison, seasonal_band};
use crate::summary::{
    CarbonSummary, DeforestationSummary, WaterSummary, carbon_summary, cost_per_area,
    deforestation_summary, water_summary,
};
use crate::tables::{
    CarbonBin, ConcessionRecord, DeforestationYear, EvapotranspirationObservation,
    FireObservation, Tables, VegetationObservation, WaterClassArea, WeatherObservation,
    filter_entity,
};

/// Vegetation index plotted for a concession.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VegetationIndex {
    /// Normalized Difference Vegetation Index
    #[default]
    Ndvi,
    /// Enhanced Vegetation Index
    Evi,
}

impl VegetationIndex {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ndvi => "Normalized Difference Vegetation Index (NDVI)",
            Self::Evi => "Enhanced Vegetation Index (EVI)",
        }
    }

    const fn pick(self, row: &VegetationObservation) -> f64 {
        match self {
            Self::Ndvi => row.ndvi,
            Self::Evi => row.evi,
        }
    }
}

/// A user's current choices. Each session owns one; the context is shared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub concession: String,
    #[serde(default)]
    pub vegetation_index: VegetationIndex,
    /// Symmetric window, in samples on either side, for the evapotranspiration trend.
    pub evapotranspiration_window: usize,
    #[serde(default)]
    pub weather_variable: Option<String>,
    /// Symmetric window for the weather variable trend.
    pub weather_window: usize,
}

impl Selection {
    /// A selection of `concession` with the configured default windows.
    #[must_use]
    pub fn new(concession: impl Into<String>, config: &ReportConfig) -> Self {
        Self {
            concession: concession.into(),
            vegetation_index: VegetationIndex::default(),
            evapotranspiration_window: config.smoothing.default_window,
            weather_variable: None,
            weather_window: config.smoothing.default_window,
        }
    }
}

/// Scalar attributes of the selected concession.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcessionProfile {
    pub name: String,
    pub outfitter: String,
    pub area_km2: f64,
    pub total_fees: f64,
    pub cost_per_km2: i64,
    pub wildlife: IndicatorPresence,
    pub population: Option<f64>,
}

/// Raw and smoothed versions of one dated series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries {
    pub window: usize,
    pub raw: Vec<DatedValue>,
    pub smoothed: Vec<DatedValue>,
}

/// Every view of one concession, ready for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcessionReport {
    pub profile: ConcessionProfile,
    pub vegetation_index: VegetationIndex,
    pub vegetation: Vec<DatedValue>,
    pub evapotranspiration: TrendSeries,
    pub deforestation: DeforestationSummary,
    pub water: WaterSummary,
    pub fires: Vec<DatedValue>,
    pub fire_season: SeasonalComparison,
    pub carbon: Option<CarbonSummary>,
    pub weather: Option<WeatherReport>,
}

/// Weather variable trend and its seasonal comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub variable: String,
    pub trend: TrendSeries,
    pub season: SeasonalComparison,
}

/// Loads the report tables from wherever they live.
/// Platform-specific implementations should provide this.
pub trait TableSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load every table the report reads.
    ///
    /// # Errors
    ///
    /// Returns an error if any table cannot be loaded or parsed.
    fn load_tables(&self) -> Result<Tables, Self::Error>;
}

/// Error raised while building a [`ReportContext`] from a [`TableSource`].
#[derive(Debug, Error)]
pub enum ContextError<E: std::error::Error + 'static> {
    #[error("failed to load tables: {0}")]
    Source(#[source] E),
    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Loaded tables plus configuration, built once and read by every selection.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportContext {
    tables: Tables,
    config: ReportConfig,
}

impl ReportContext {
    /// Wrap already-loaded tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(tables: Tables, config: ReportConfig) -> Result<Self, ReportError> {
        config.validate()?;
        log::debug!(
            "report context: {} concessions, {} vegetation, {} evapotranspiration, {} fire, {} weather rows",
            tables.concessions.len(),
            tables.vegetation.len(),
            tables.evapotranspiration.len(),
            tables.fires.len(),
            tables.weather.len(),
        );
        Ok(Self { tables, config })
    }

    /// Load tables from `source` and build the context.
    ///
    /// # Errors
    ///
    /// Returns an error if loading fails or the configuration is invalid.
    pub fn load<S: TableSource>(
        source: &S,
        config: ReportConfig,
    ) -> Result<Self, ContextError<S::Error>> {
        let tables = source.load_tables().map_err(ContextError::Source)?;
        Ok(Self::new(tables, config)?)
    }

    #[must_use]
    pub const fn tables(&self) -> &Tables {
        &self.tables
    }

    #[must_use]
    pub const fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Identifiers of every concession, in table order.
    #[must_use]
    pub fn concession_names(&self) -> Vec<&str> {
        self.tables.concession_names()
    }

    /// Resolve `id` and open a view over its rows.
    ///
    /// # Errors
    ///
    /// Returns a not-found error when `id` is absent or ambiguous.
    pub fn concession(&self, id: &str) -> Result<ConcessionView<'_>, ReportError> {
        let record = resolve_entity(&self.tables.concessions, id)?;
        Ok(ConcessionView { ctx: self, record })
    }

    /// Build every view for `selection`.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by any view.
    pub fn report(&self, selection: &Selection) -> Result<ConcessionReport, ReportError> {
        let view = self.concession(&selection.concession)?;
        let weather = match &selection.weather_variable {
            Some(variable) => Some(view.weather(variable, selection.weather_window)?),
            None => None,
        };
        Ok(ConcessionReport {
            profile: view.profile()?,
            vegetation_index: selection.vegetation_index,
            vegetation: view.vegetation(selection.vegetation_index),
            evapotranspiration: view.evapotranspiration(selection.evapotranspiration_window)?,
            deforestation: view.deforestation()?,
            water: view.water()?,
            fires: view.fires(),
            fire_season: view.fire_season()?,
            carbon: view.carbon()?,
            weather,
        })
    }
}

/// One resolved concession and the context it was resolved in.
#[derive(Debug, Clone, Copy)]
pub struct ConcessionView<'a> {
    ctx: &'a ReportContext,
    record: &'a ConcessionRecord,
}

impl ConcessionView<'_> {
    #[must_use]
    pub const fn record(&self) -> &ConcessionRecord {
        self.record
    }

    fn id(&self) -> &str {
        &self.record.name
    }

    fn rows<T>(&self, table: &'static str, rows: &[T]) -> Vec<T>
    where
        T: crate::tables::EntityKeyed + Clone,
    {
        let subset = filter_entity(rows, self.id());
        log::debug!("{}: {} {table} rows", self.id(), subset.len());
        if subset.is_empty() && !rows.is_empty() {
            log::warn!("{} has no rows in the {table} table", self.id());
        }
        subset
    }

    /// Scalar attributes with cost per km² and wildlife presence.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero or negative area or negative species counts.
    pub fn profile(&self) -> Result<ConcessionProfile, ReportError> {
        let record = self.record;
        Ok(ConcessionProfile {
            name: record.name.clone(),
            outfitter: record.outfitter.clone(),
            area_km2: record.area_km2,
            total_fees: record.total_fees,
            cost_per_km2: cost_per_area(record.total_fees, record.area_km2)?,
            wildlife: species_presence(record, &self.ctx.config.species)?,
            population: record.population,
        })
    }

    /// The selected vegetation index as a dated series.
    #[must_use]
    pub fn vegetation(&self, index: VegetationIndex) -> Vec<DatedValue> {
        self.rows::<VegetationObservation>("vegetation", &self.ctx.tables.vegetation)
            .iter()
            .map(|row| DatedValue::new(row.date, index.pick(row)))
            .collect()
    }

    /// Daily evapotranspiration and its symmetric moving average.
    ///
    /// # Errors
    ///
    /// Returns an error if `window` is outside the configured bounds or the
    /// series is not in date order.
    pub fn evapotranspiration(&self, window: usize) -> Result<TrendSeries, ReportError> {
        let raw: Vec<DatedValue> = self
            .rows::<EvapotranspirationObservation>(
                "evapotranspiration",
                &self.ctx.tables.evapotranspiration,
            )
            .iter()
            .map(|row| DatedValue::new(row.date, row.evapotranspiration))
            .collect();
        self.trend(raw, window)
    }

    fn trend(&self, raw: Vec<DatedValue>, window: usize) -> Result<TrendSeries, ReportError> {
        let bounds = &self.ctx.config.smoothing;
        if !(bounds.window_min..=bounds.window_max).contains(&window) {
            return Err(ReportError::WindowOutOfRange {
                min: bounds.window_min,
                max: bounds.window_max,
                value: window,
            });
        }
        let smoothed = symmetric_moving_average(&raw, window)?;
        Ok(TrendSeries {
            window,
            raw,
            smoothed,
        })
    }

    /// Annual tree cover loss and the share of the concession it covers.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero-area concession.
    pub fn deforestation(&self) -> Result<DeforestationSummary, ReportError> {
        let all = &self.ctx.tables.deforestation;
        let years = self.rows::<DeforestationYear>("deforestation", all);
        let summary_cfg = &self.ctx.config.summary;
        let numerator: &[DeforestationYear] = match summary_cfg.deforestation_scope {
            DeforestationScope::Entity => &years[..],
            DeforestationScope::Dataset => &all[..],
        };
        deforestation_summary(
            numerator,
            years.clone(),
            self.record.area_km2,
            summary_cfg.percent_precision,
        )
    }

    /// Surface water composition and the share of the concession ever under water.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero-area concession.
    pub fn water(&self) -> Result<WaterSummary, ReportError> {
        let rows = self.rows::<WaterClassArea>("water", &self.ctx.tables.water);
        water_summary(
            &rows,
            self.record.area_km2,
            self.ctx.config.summary.percent_precision,
        )
    }

    /// Daily fire detections.
    #[must_use]
    pub fn fires(&self) -> Vec<DatedValue> {
        self.rows::<FireObservation>("fires", &self.ctx.tables.fires)
            .iter()
            .map(|row| DatedValue::new(row.date, row.fires))
            .collect()
    }

    /// This year's fires against the band of earlier years.
    ///
    /// # Errors
    ///
    /// Returns an error if the fire series is not in date order.
    pub fn fire_season(&self) -> Result<SeasonalComparison, ReportError> {
        let seasonal = &self.ctx.config.seasonal;
        seasonal_band(
            &self.fires(),
            seasonal.cutoff_year,
            seasonal.confidence_z,
            seasonal.fire_smoothing,
        )
    }

    /// Carbon stock, or `None` when the concession has no carbon histogram.
    ///
    /// # Errors
    ///
    /// Returns an error when the histogram holds no carbon at all.
    pub fn carbon(&self) -> Result<Option<CarbonSummary>, ReportError> {
        let bins = self.rows::<CarbonBin>("carbon", &self.ctx.tables.carbon);
        if bins.is_empty() {
            return Ok(None);
        }
        let summary_cfg = &self.ctx.config.summary;
        carbon_summary(
            &bins,
            summary_cfg.carbon_pixel_area_ha,
            summary_cfg.percent_precision,
        )
        .map(Some)
    }

    /// Weather variables observed for this concession, sorted by name.
    #[must_use]
    pub fn weather_variables(&self) -> Vec<String> {
        self.ctx
            .tables
            .weather
            .iter()
            .filter(|row| row.block == self.id())
            .map(|row| row.variable.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Trend and seasonal comparison of one weather variable.
    ///
    /// # Errors
    ///
    /// Returns an error if the variable has no observations, `window` is out
    /// of bounds, or the series is not in date order.
    pub fn weather(&self, variable: &str, window: usize) -> Result<WeatherReport, ReportError> {
        let raw: Vec<DatedValue> = self
            .rows::<WeatherObservation>("weather", &self.ctx.tables.weather)
            .iter()
            .filter(|row| row.variable == variable)
            .map(|row| DatedValue::new(row.date, row.value))
            .collect();
        if raw.is_empty() {
            return Err(ReportError::UnknownVariable {
                name: variable.to_string(),
            });
        }
        let seasonal = &self.ctx.config.seasonal;
        let season = seasonal_band(
            &raw,
            seasonal.cutoff_year,
            seasonal.confidence_z,
            seasonal.weather_smoothing,
        )?;
        Ok(WeatherReport {
            variable: variable.to_string(),
            trend: self.trend(raw, window)?,
            season,
        })
    }
}
