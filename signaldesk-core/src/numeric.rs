//! Small numeric helpers shared by the aggregators and the backtest summary.

/// Round half away from zero to `dp` decimal places.
pub fn round_dp(value: f64, dp: i32) -> f64 {
    let factor = 10f64.powi(dp);
    (value * factor).round() / factor
}

/// `100 * part / whole`, 0 when `whole` is 0.
pub fn percent_of(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    100.0 * part as f64 / whole as f64
}

pub fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n - 1 denominator).
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding() {
        assert_eq!(round_dp(1.23456, 2), 1.23);
        assert_eq!(round_dp(66.666, 1), 66.7);
        assert_eq!(round_dp(-2.5, 0), -3.0);
    }

    #[test]
    fn percent_of_empty_is_zero() {
        assert_eq!(percent_of(0, 0), 0.0);
        assert_eq!(percent_of(3, 5), 60.0);
    }

    #[test]
    fn std_dev_known_values() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert!((mean_f64(&v) - 5.0).abs() < 1e-12);
        assert!((std_dev(&v) - 2.138_089_935).abs() < 1e-6);
    }
}
