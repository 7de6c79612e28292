//! Dated series and the symmetric moving average.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::numbers::usize_to_f64;

/// A single (date, value) point of a chart series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DatedValue {
    pub date: NaiveDate,
    pub value: f64,
}

impl DatedValue {
    #[must_use]
    pub const fn new(date: NaiveDate, value: f64) -> Self {
        Self { date, value }
    }
}

/// Check that dates are strictly ascending.
///
/// # Errors
///
/// Returns [`ReportError::UnorderedSeries`] at the first pair out of order.
pub fn ensure_ascending(series: &[DatedValue]) -> Result<(), ReportError> {
    for pair in series.windows(2) {
        if pair[1].date <= pair[0].date {
            return Err(ReportError::UnorderedSeries {
                previous: pair[0].date,
                next: pair[1].date,
            });
        }
    }
    Ok(())
}

/// Mean over `[i - window, i + window]` for every point, with the window
/// clamped at both ends of the series. A window of 0 returns the input values.
///
/// # Errors
///
/// Returns [`ReportError::UnorderedSeries`] if dates are not strictly ascending.
pub fn symmetric_moving_average(
    series: &[DatedValue],
    window: usize,
) -> Result<Vec<DatedValue>, ReportError> {
    ensure_ascending(series)?;
    if window == 0 {
        return Ok(series.to_vec());
    }

    let last = series.len().saturating_sub(1);
    Ok(series
        .iter()
        .enumerate()
        .map(|(i, point)| {
            let start = i.saturating_sub(window);
            let end = i.saturating_add(window).min(last);
            let sum: f64 = series[start..=end].iter().map(|p| p.value).sum();
            DatedValue::new(point.date, sum / usize_to_f64(end - start + 1))
        })
        .collect())
}
