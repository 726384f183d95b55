//! Robust aggregation helpers.
//!
//! Noisy detections are always aggregated with medians, never running
//! means; a couple of outlier observations must not shift the result.

/// Median of a sequence. Returns `None` for an empty input.
///
/// Even-length inputs average the two middle elements.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if sorted.is_empty() {
        return None;
    }
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        Some(sorted[n / 2])
    } else {
        Some(0.5 * (sorted[n / 2 - 1] + sorted[n / 2]))
    }
}

/// Mean and population standard deviation.
pub fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Value at the given percentile (0..=100), nearest-rank on a sorted copy.
pub fn percentile(values: &[f64], pct: f64) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted: Vec<f64> = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = (pct / 100.0 * (sorted.len() - 1) as f64).round() as usize;
    Some(sorted[rank.min(sorted.len() - 1)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_handles_odd_even_and_empty() {
        assert_eq!(median(&[]), None);
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 2.0, 3.0]), Some(2.5));
    }

    #[test]
    fn median_shrugs_off_outliers() {
        let m = median(&[81.0, 81.0, 81.0, 81.0, 400.0]).unwrap();
        assert!((m - 81.0).abs() < 1e-12);
    }

    #[test]
    fn percentile_bounds() {
        let vals = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&vals, 0.0), Some(1.0));
        assert_eq!(percentile(&vals, 100.0), Some(5.0));
        assert_eq!(percentile(&vals, 50.0), Some(3.0));
    }
}
