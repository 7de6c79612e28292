//! Row types of the precomputed tables and the per-entity filter.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A row that belongs to exactly one concession.
pub trait EntityKeyed {
    /// Identifier of the concession this row belongs to.
    fn entity(&self) -> &str;
}

/// One concession (hunting block) and its scalar attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConcessionRecord {
    pub name: String,
    pub area_km2: f64,
    pub total_fees: f64,
    pub outfitter: String,
    /// Species indicator name to documented count.
    #[serde(default)]
    pub species: BTreeMap<String, i64>,
    #[serde(default)]
    pub population: Option<f64>,
}

/// Daily vegetation indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VegetationObservation {
    pub block: String,
    pub date: NaiveDate,
    pub ndvi: f64,
    pub evi: f64,
}

/// Daily evapotranspiration in millimetres.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvapotranspirationObservation {
    pub block: String,
    pub date: NaiveDate,
    pub evapotranspiration: f64,
}

/// Daily count of fire detections above the intensity threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FireObservation {
    pub block: String,
    pub date: NaiveDate,
    pub fires: f64,
}

/// Daily weather or fire-danger variable, keyed by variable name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    pub block: String,
    pub date: NaiveDate,
    pub variable: String,
    pub value: f64,
}

/// Annual tree cover loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeforestationYear {
    pub block: String,
    pub year: i32,
    pub hectares: f64,
}

/// Area ever covered by one surface water class or transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterClassArea {
    pub block: String,
    pub water_label: String,
    pub area_km2: f64,
}

/// One histogram bin of above-ground carbon density.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonBin {
    pub block: String,
    /// Carbon density of the bin, tonnes per hectare.
    pub carbon_density: f64,
    /// Number of raster pixels in the bin.
    pub pixels: u64,
    #[serde(default)]
    pub forest: bool,
}

macro_rules! keyed_by {
    ($field:ident => $($ty:ty),+ $(,)?) => {
        $(
            impl EntityKeyed for $ty {
                fn entity(&self) -> &str {
                    &self.$field
                }
            }
        )+
    };
}

keyed_by!(name => ConcessionRecord);
keyed_by!(
    block => VegetationObservation,
    EvapotranspirationObservation,
    FireObservation,
    WeatherObservation,
    DeforestationYear,
    WaterClassArea,
    CarbonBin,
);

/// Every table the report reads, as loaded by a [`crate::TableSource`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Tables {
    pub concessions: Vec<ConcessionRecord>,
    #[serde(default)]
    pub vegetation: Vec<VegetationObservation>,
    #[serde(default)]
    pub evapotranspiration: Vec<EvapotranspirationObservation>,
    #[serde(default)]
    pub deforestation: Vec<DeforestationYear>,
    #[serde(default)]
    pub water: Vec<WaterClassArea>,
    #[serde(default)]
    pub fires: Vec<FireObservation>,
    #[serde(default)]
    pub carbon: Vec<CarbonBin>,
    #[serde(default)]
    pub weather: Vec<WeatherObservation>,
}

impl Tables {
    /// Parse a bundle of tables from a single JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into valid tables.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Identifiers of every concession, in table order.
    #[must_use]
    pub fn concession_names(&self) -> Vec<&str> {
        self.concessions.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Rows belonging to `id`, in their original order. Empty when nothing matches.
#[must_use]
pub fn filter_entity<T>(rows: &[T], id: &str) -> Vec<T>
where
    T: EntityKeyed + Clone,
{
    rows.iter().filter(|row| row.entity() == id).cloned().collect()
}
