//! Numeric conversion helpers centralizing safe numeric casts and rounding.

use num_traits::cast::cast;

/// Round `value` to `precision` decimal places, half away from zero.
#[must_use]
pub fn round_to(value: f64, precision: u32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let exponent = i32::try_from(precision).unwrap_or(i32::MAX);
    let scale = 10f64.powi(exponent);
    if !scale.is_finite() {
        return value;
    }
    (value * scale).round() / scale
}

/// Round a f64 and clamp it to the i64 range, returning 0 for NaN values.
#[must_use]
pub fn round_f64_to_i64(value: f64) -> i64 {
    if value.is_nan() {
        return 0;
    }
    let min = cast::<i64, f64>(i64::MIN).unwrap_or(f64::MIN);
    let max = cast::<i64, f64>(i64::MAX).unwrap_or(f64::MAX);
    let clamped = value.clamp(min, max).round();
    cast::<f64, i64>(clamped).unwrap_or(0)
}

/// Convert a sample count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn usize_to_f64(value: usize) -> f64 {
    cast::<usize, f64>(value).unwrap_or(0.0)
}

/// Convert a pixel count to f64 while allowing precision loss in a single location.
#[must_use]
pub fn u64_to_f64(value: u64) -> f64 {
    cast::<u64, f64>(value).unwrap_or(0.0)
}

/// Arithmetic mean, `None` for an empty slice.
#[must_use]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / usize_to_f64(values.len()))
}

/// Sample standard deviation (n - 1 denominator), zero for fewer than two values.
#[must_use]
pub fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / usize_to_f64(values.len() - 1)).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_to_handles_precision_and_non_finite() {
        assert!((round_to(3.14159, 2) - 3.14).abs() < f64::EPSILON);
        assert!((round_to(2.5, 0) - 3.0).abs() < f64::EPSILON);
        assert!(round_to(f64::NAN, 2).is_nan());
        assert!((round_to(1.005_1, 10) - 1.005_1).abs() < 1e-12);
    }

    #[test]
    fn rounders_cover_ranges() {
        assert_eq!(round_f64_to_i64(499.5), 500);
        assert_eq!(round_f64_to_i64(f64::NAN), 0);
        assert_eq!(round_f64_to_i64(f64::MAX), i64::MAX);
    }

    #[test]
    fn pixel_counts_convert_exactly_below_two_pow_53() {
        assert!((u64_to_f64(500_000) - 500_000.0).abs() < f64::EPSILON);
        assert!(u64_to_f64(0).abs() < f64::EPSILON);
        assert!((u64_to_f64(1 << 53) - 9_007_199_254_740_992.0).abs() < f64::EPSILON);
    }

    #[test]
    fn mean_and_std_dev() {
        assert_eq!(mean(&[]), None);
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let m = mean(&values).unwrap();
        assert!((m - 5.0).abs() < f64::EPSILON);
        let sd = sample_std_dev(&values, m);
        assert!((sd - (32.0f64 / 7.0).sqrt()).abs() < 1e-12);
        assert!(sample_std_dev(&[3.0], 3.0).abs() < f64::EPSILON);
    }
}
