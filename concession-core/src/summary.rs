//! Scalar summaries: ratios, cost per area, deforestation, surface water and carbon.
use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::numbers::{round_f64_to_i64, round_to, u64_to_f64};
use crate::tables::{CarbonBin, DeforestationYear, WaterClassArea};

/// Hectares per square kilometre.
pub const HECTARES_PER_KM2: f64 = 100.0;
/// Tonnes per megatonne.
pub const TONNES_PER_MEGATONNE: f64 = 1_000_000.0;

fn ensure_quantity(field: &'static str, value: f64) -> Result<f64, ReportError> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(ReportError::InvalidQuantity { field, value })
    }
}

/// `round(100 * part / whole, precision)`.
///
/// # Errors
///
/// Returns [`ReportError::DivisionByZero`] when `whole` is zero and
/// [`ReportError::InvalidQuantity`] when either input is negative or not finite.
pub fn percent(
    quantity: &'static str,
    part: f64,
    whole: f64,
    precision: u32,
) -> Result<f64, ReportError> {
    let part = ensure_quantity(quantity, part)?;
    let whole = ensure_quantity(quantity, whole)?;
    if whole == 0.0 {
        return Err(ReportError::DivisionByZero { quantity });
    }
    Ok(round_to(100.0 * part / whole, precision))
}

/// Fees per square kilometre, rounded to whole currency units.
///
/// # Errors
///
/// Returns [`ReportError::DivisionByZero`] for a zero area and
/// [`ReportError::InvalidQuantity`] for negative or non-finite inputs.
pub fn cost_per_area(fees: f64, area_km2: f64) -> Result<i64, ReportError> {
    let fees = ensure_quantity("total_fees", fees)?;
    let area = ensure_quantity("area_km2", area_km2)?;
    if area == 0.0 {
        return Err(ReportError::DivisionByZero { quantity: "area_km2" });
    }
    Ok(round_f64_to_i64(fees / area))
}

/// Tree cover loss totals for one concession.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeforestationSummary {
    pub total_hectares: f64,
    pub percent_of_area: f64,
    pub years: Vec<DeforestationYear>,
}

/// Summarize tree cover loss. `numerator_rows` feeds the total; `years` is the
/// concession's own per-year breakdown.
///
/// # Errors
///
/// Returns [`ReportError::DivisionByZero`] for a zero-area concession and
/// [`ReportError::InvalidQuantity`] for negative hectares.
pub fn deforestation_summary(
    numerator_rows: &[DeforestationYear],
    years: Vec<DeforestationYear>,
    area_km2: f64,
    precision: u32,
) -> Result<DeforestationSummary, ReportError> {
    let mut total_hectares = 0.0;
    for row in numerator_rows {
        total_hectares += ensure_quantity("hectares", row.hectares)?;
    }
    let area_ha = ensure_quantity("area_km2", area_km2)? * HECTARES_PER_KM2;
    let percent_of_area = percent("deforestation", total_hectares, area_ha, precision)?;
    Ok(DeforestationSummary {
        total_hectares,
        percent_of_area,
        years,
    })
}

/// One water class and its share of the total water area.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterShare {
    pub label: String,
    pub area_km2: f64,
    pub share_percent: f64,
}

/// Surface water composition for one concession.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterSummary {
    pub total_area_km2: f64,
    pub percent_of_area: f64,
    pub classes: Vec<WaterShare>,
}

/// Summarize surface water classes for a concession of `area_km2`.
///
/// # Errors
///
/// Returns [`ReportError::DivisionByZero`] for a zero-area concession and
/// [`ReportError::InvalidQuantity`] for negative class areas.
pub fn water_summary(
    rows: &[WaterClassArea],
    area_km2: f64,
    precision: u32,
) -> Result<WaterSummary, ReportError> {
    let mut raw_total = 0.0;
    for row in rows {
        raw_total += ensure_quantity("water area_km2", row.area_km2)?;
    }
    let total_area_km2 = round_to(raw_total, precision);
    let percent_of_area = percent("water", total_area_km2, area_km2, precision)?;
    let classes = rows
        .iter()
        .map(|row| {
            let share_percent = if raw_total > 0.0 {
                round_to(100.0 * row.area_km2 / raw_total, precision)
            } else {
                0.0
            };
            WaterShare {
                label: row.water_label.clone(),
                area_km2: row.area_km2,
                share_percent,
            }
        })
        .collect();
    Ok(WaterSummary {
        total_area_km2,
        percent_of_area,
        classes,
    })
}

/// Above-ground carbon stock for one concession.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CarbonSummary {
    pub total_megatonnes: f64,
    pub forest_megatonnes: f64,
    pub forest_percent: f64,
    pub per_hectare: f64,
}

/// Sum a carbon density histogram into megatonnes.
///
/// # Errors
///
/// Returns [`ReportError::DivisionByZero`] when the histogram holds no carbon
/// and [`ReportError::InvalidQuantity`] for negative densities or pixel area.
pub fn carbon_summary(
    bins: &[CarbonBin],
    pixel_area_ha: f64,
    precision: u32,
) -> Result<CarbonSummary, ReportError> {
    let pixel_area_ha = ensure_quantity("carbon_pixel_area_ha", pixel_area_ha)?;
    let mut total_tonnes = 0.0;
    let mut forest_tonnes = 0.0;
    let mut hectares = 0.0;
    for bin in bins {
        let density = ensure_quantity("carbon_density", bin.carbon_density)?;
        let bin_hectares = u64_to_f64(bin.pixels) * pixel_area_ha;
        let tonnes = density * bin_hectares;
        total_tonnes += tonnes;
        hectares += bin_hectares;
        if bin.forest {
            forest_tonnes += tonnes;
        }
    }
    let forest_percent = percent("total carbon", forest_tonnes, total_tonnes, precision)?;
    let per_hectare = if hectares > 0.0 {
        round_to(total_tonnes / hectares, precision)
    } else {
        0.0
    };
    Ok(CarbonSummary {
        total_megatonnes: round_to(total_tonnes / TONNES_PER_MEGATONNE, precision),
        forest_megatonnes: round_to(forest_tonnes / TONNES_PER_MEGATONNE, precision),
        forest_percent,
        per_hectare,
    })
}
