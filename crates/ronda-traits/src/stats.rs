//! Statistical utility functions shared by the evaluation and smoothing crates.
//!
//! All helpers operate on slices of already-filtered finite values and return
//! `None` rather than NaN when a statistic is undefined.

/// Minimum threshold for standard deviation to avoid division by zero.
/// Values below this threshold are treated as zero variance.
pub const MIN_STD_THRESHOLD: f64 = 1e-10;

/// Arithmetic mean, `None` for an empty slice.
///
/// # Examples
///
/// ```
/// use ronda_traits::stats::mean;
///
/// assert_eq!(mean(&[1.0, 2.0, 3.0]), Some(2.0));
/// assert_eq!(mean(&[]), None);
/// ```
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Population standard deviation (N denominator), `None` for an empty slice.
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let variance = values.iter().map(|x| (x - m).powi(2)).sum::<f64>() / values.len() as f64;
    Some(variance.sqrt())
}

/// Returns true when a dispersion estimate is too small to divide by.
pub const fn is_degenerate_std(std: f64) -> bool {
    !std.is_finite() || std < MIN_STD_THRESHOLD
}

/// Compounds simple returns: `prod(1 + r) - 1`.
pub fn compound(returns: impl IntoIterator<Item = f64>) -> f64 {
    returns.into_iter().fold(1.0, |acc, r| acc * (1.0 + r)) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_mean_and_std() {
        let values = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_relative_eq!(mean(&values).unwrap(), 5.0);
        assert_relative_eq!(population_std(&values).unwrap(), 2.0);
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(population_std(&[]), None);
        assert_eq!(population_std(&[3.0]), Some(0.0));
    }

    #[test]
    fn test_degenerate_std() {
        assert!(is_degenerate_std(0.0));
        assert!(is_degenerate_std(1e-14));
        assert!(is_degenerate_std(f64::NAN));
        assert!(!is_degenerate_std(0.01));
    }

    #[test]
    fn test_compound() {
        assert_relative_eq!(compound([0.1, -0.1]), 1.1 * 0.9 - 1.0);
        assert_relative_eq!(compound(std::iter::empty()), 0.0);
    }
}
