//! Year-over-year seasonal baseline and anomaly flags.
//!
//! Observations are aligned on day-of-year. Years before the cutoff form the
//! historical baseline; the cutoff year itself is compared against it.
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::ReportError;
use crate::numbers::{mean, sample_std_dev, usize_to_f64};
use crate::rolling::{DatedValue, ensure_ascending, symmetric_moving_average};

/// Historical mean and confidence band for one day-of-year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub day_of_year: u32,
    pub mean: f64,
    pub lower: f64,
    pub upper: f64,
    /// Number of historical years observed on this day.
    pub samples: usize,
}

impl BandPoint {
    /// Whether `value` falls strictly outside the band.
    #[must_use]
    pub fn is_anomalous(&self, value: f64) -> bool {
        value < self.lower || value > self.upper
    }
}

/// Current-year value for one day-of-year, compared against the band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayComparison {
    pub day_of_year: u32,
    pub value: f64,
    /// `None` when no historical year observed this day.
    pub anomalous: Option<bool>,
}

/// Historical band plus the current year's (smoothed) overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalComparison {
    pub cutoff_year: i32,
    pub historical_years: Vec<i32>,
    pub band: Vec<BandPoint>,
    pub current: Vec<DayComparison>,
}

impl SeasonalComparison {
    /// Days of the current year whose value left the band.
    #[must_use]
    pub fn anomalous_days(&self) -> Vec<u32> {
        self.current
            .iter()
            .filter(|day| day.anomalous == Some(true))
            .map(|day| day.day_of_year)
            .collect()
    }

    /// Band point for `day_of_year`, if the baseline covers it.
    #[must_use]
    pub fn band_for(&self, day_of_year: u32) -> Option<&BandPoint> {
        band_lookup(&self.band, day_of_year)
    }
}

fn band_lookup(band: &[BandPoint], day_of_year: u32) -> Option<&BandPoint> {
    band.binary_search_by_key(&day_of_year, |point| point.day_of_year)
        .ok()
        .map(|idx| &band[idx])
}

/// Per day-of-year `mean ± z * stderr` over `historical`, with the sample
/// standard deviation. A day seen in a single year has a zero-width band.
#[must_use]
pub fn historical_band(historical: &[DatedValue], z: f64) -> Vec<BandPoint> {
    let mut by_day: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for point in historical {
        by_day.entry(point.date.ordinal()).or_default().push(point.value);
    }
    by_day
        .into_iter()
        .filter_map(|(day_of_year, values)| {
            let mean = mean(&values)?;
            let stderr = sample_std_dev(&values, mean) / usize_to_f64(values.len()).sqrt();
            let half_width = z * stderr;
            Some(BandPoint {
                day_of_year,
                mean,
                lower: mean - half_width,
                upper: mean + half_width,
                samples: values.len(),
            })
        })
        .collect()
}

/// Build the seasonal comparison of `series` for `cutoff_year`.
///
/// The current-year values are smoothed with a symmetric moving average of
/// `smoothing_window` samples before being compared to the band. Years after
/// the cutoff are ignored.
///
/// # Errors
///
/// Returns [`ReportError::UnorderedSeries`] if dates are not strictly ascending.
pub fn seasonal_band(
    series: &[DatedValue],
    cutoff_year: i32,
    z: f64,
    smoothing_window: usize,
) -> Result<SeasonalComparison, ReportError> {
    ensure_ascending(series)?;

    let historical: Vec<DatedValue> = series
        .iter()
        .copied()
        .filter(|point| point.date.year() < cutoff_year)
        .collect();
    let current: Vec<DatedValue> = series
        .iter()
        .copied()
        .filter(|point| point.date.year() == cutoff_year)
        .collect();

    let mut historical_years: Vec<i32> = historical.iter().map(|p| p.date.year()).collect();
    historical_years.dedup();

    let band = historical_band(&historical, z);
    let current = symmetric_moving_average(&current, smoothing_window)?
        .into_iter()
        .map(|point| {
            let day_of_year = point.date.ordinal();
            DayComparison {
                day_of_year,
                value: point.value,
                anomalous: band_lookup(&band, day_of_year)
                    .map(|band| band.is_anomalous(point.value)),
            }
        })
        .collect();
    let comparison = SeasonalComparison {
        cutoff_year,
        historical_years,
        band,
        current,
    };

    if comparison.current.is_empty() {
        log::warn!("no observations for seasonal cutoff year {cutoff_year}");
    }
    Ok(comparison)
}
