//! Summary statistics over load counters.

/// Population standard deviation of `values`; `0.0` for an empty slice.
pub fn std_deviation(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|v| *v as f64).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|v| {
            let d = *v as f64 - mean;
            d * d
        })
        .sum::<f64>()
        / n;
    variance.sqrt()
}

/// Coefficient of variation (std deviation / mean); `0.0` when the mean is 0.
pub fn coefficient_of_variation(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().map(|v| *v as f64).sum::<f64>() / values.len() as f64;
    if mean == 0.0 {
        return 0.0;
    }
    std_deviation(values) / mean
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        assert_eq!(std_deviation(&[]), 0.0);
        assert_eq!(coefficient_of_variation(&[]), 0.0);
    }

    #[test]
    fn test_uniform_is_zero() {
        assert_eq!(std_deviation(&[5, 5, 5, 5]), 0.0);
    }

    #[test]
    fn test_known_value() {
        // mean 5, squared deviations sum to 32 over 8 values
        assert!((std_deviation(&[2, 4, 4, 4, 5, 5, 7, 9]) - 2.0).abs() < 1e-12);
        assert!((coefficient_of_variation(&[2, 4, 4, 4, 5, 5, 7, 9]) - 0.4).abs() < 1e-12);
    }
}
