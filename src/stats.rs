// =============================================================================
// Log-return statistics
// =============================================================================
//
// Small numeric helpers shared by the benchmark trackers: log-returns of a
// price path, sample mean, and population standard deviation.
// =============================================================================

/// Log-returns of consecutive prices: `ln(p[i+1]) - ln(p[i])`.
///
/// Non-positive prices have no logarithm; any window containing one is
/// skipped, so the result may be shorter than `prices.len() - 1`.
pub fn log_returns(prices: &[f64]) -> Vec<f64> {
    prices
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0)
        .map(|w| w[1].ln() - w[0].ln())
        .collect()
}

/// Arithmetic mean. Returns 0.0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (divisor `n`, not `n - 1`).
/// Returns 0.0 for an empty slice.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let m = mean(values);
    let var = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    var.sqrt()
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn log_returns_of_constant_path_are_zero() {
        let r = log_returns(&[100.0, 100.0, 100.0]);
        assert_eq!(r.len(), 2);
        for v in r {
            assert!(v.abs() < EPS);
        }
    }

    #[test]
    fn log_returns_match_ratio_logs() {
        let r = log_returns(&[100.0, 110.0, 99.0]);
        assert_eq!(r.len(), 2);
        assert!((r[0] - (110.0f64 / 100.0).ln()).abs() < EPS);
        assert!((r[1] - (99.0f64 / 110.0).ln()).abs() < EPS);
    }

    #[test]
    fn log_returns_skip_non_positive_prices() {
        let r = log_returns(&[100.0, 0.0, 110.0]);
        assert!(r.is_empty());
    }

    #[test]
    fn mean_and_std_of_empty_are_zero() {
        assert_eq!(mean(&[]), 0.0);
        assert_eq!(std_dev(&[]), 0.0);
    }

    #[test]
    fn mean_basic() {
        assert!((mean(&[1.0, 2.0, 3.0, 4.0]) - 2.5).abs() < EPS);
    }

    #[test]
    fn std_dev_is_population_flavoured() {
        // Population std of [2, 4, 4, 4, 5, 5, 7, 9] is exactly 2.
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((std_dev(&v) - 2.0).abs() < EPS);
    }

    #[test]
    fn std_dev_of_constants_is_zero() {
        assert!(std_dev(&[5.0; 10]).abs() < EPS);
    }
}
