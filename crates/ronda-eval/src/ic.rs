//! Information Coefficient (IC) calculations.
//!
//! The rank IC of a bucket is the Spearman rank correlation between the
//! factor values and the forward returns of the assets aligned in that
//! bucket. The Pearson IC is the plain linear correlation of the same pairs.

use crate::align::{AlignedObservation, AlignedPanel};
use ndarray::{Array1, ArrayView1};
use ronda_traits::{Observation, TimeSeries};

/// Rank IC between factor values and forward returns.
///
/// Values are ranked ascending with tied values sharing the average of their
/// ranks, then correlated. Returns [`Observation::Missing`] for mismatched
/// lengths, fewer than two pairs, or a constant side (zero rank variance).
///
/// # Example
///
/// ```rust
/// use ronda_eval::rank_ic;
/// use ronda_traits::Observation;
///
/// let factors = [1.0, 2.0, 3.0, 4.0];
/// let returns = [0.01, 0.02, -0.01, 0.03];
/// let ic = rank_ic(&factors, &returns).value().unwrap();
/// assert!((ic - 0.4).abs() < 1e-12);
/// ```
pub fn rank_ic(factors: &[f64], forward_returns: &[f64]) -> Observation {
    if factors.len() != forward_returns.len() || factors.len() < 2 {
        return Observation::Missing;
    }

    let factor_ranks = compute_ranks(factors);
    let return_ranks = compute_ranks(forward_returns);

    correlation(factor_ranks.view(), return_ranks.view())
}

/// Pearson correlation between factor values and forward returns.
pub fn pearson_ic(factors: &[f64], forward_returns: &[f64]) -> Observation {
    if factors.len() != forward_returns.len() || factors.len() < 2 {
        return Observation::Missing;
    }

    correlation(ArrayView1::from(factors), ArrayView1::from(forward_returns))
}

/// Rank IC for one aligned bucket; missing when the bucket is degenerate.
pub fn bucket_rank_ic(obs: &AlignedObservation) -> Observation {
    if obs.is_degenerate() {
        return Observation::Missing;
    }
    rank_ic(obs.factors(), obs.returns())
}

/// Pearson IC for one aligned bucket; missing when the bucket is degenerate.
pub fn bucket_pearson_ic(obs: &AlignedObservation) -> Observation {
    if obs.is_degenerate() {
        return Observation::Missing;
    }
    pearson_ic(obs.factors(), obs.returns())
}

/// Rank IC per bucket, in bucket order.
pub fn ic_series(aligned: &AlignedPanel) -> TimeSeries {
    aligned
        .iter()
        .map(|obs| (obs.bucket(), bucket_rank_ic(obs)))
        .collect()
}

/// Pearson IC per bucket, in bucket order.
pub fn pearson_ic_series(aligned: &AlignedPanel) -> TimeSeries {
    aligned
        .iter()
        .map(|obs| (obs.bucket(), bucket_pearson_ic(obs)))
        .collect()
}

/// Compute 1-based ranks of values, ties receiving their average rank.
///
/// The sort key is (value, original position), so the result does not depend
/// on sort stability.
pub fn compute_ranks(values: &[f64]) -> Array1<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_unstable_by(|&a, &b| values[a].total_cmp(&values[b]).then(a.cmp(&b)));

    let mut ranks = Array1::zeros(n);
    let mut i = 0;

    while i < n {
        let mut j = i;
        // Find ties
        while j < n && values[order[j]] == values[order[i]] {
            j += 1;
        }

        // Positions i..j hold ranks i+1..=j
        let avg_rank = (i + j + 1) as f64 / 2.0;
        for &idx in &order[i..j] {
            ranks[idx] = avg_rank;
        }

        i = j;
    }

    ranks
}

fn correlation(x: ArrayView1<'_, f64>, y: ArrayView1<'_, f64>) -> Observation {
    let (Some(mean_x), Some(mean_y)) = (x.mean(), y.mean()) else {
        return Observation::Missing;
    };

    let dx = &x - mean_x;
    let dy = &y - mean_y;

    let cov = dx.dot(&dy);
    let var_x = dx.dot(&dx);
    let var_y = dy.dot(&dy);

    if var_x == 0.0 || var_y == 0.0 {
        return Observation::Missing;
    }

    Observation::from_finite(cov / (var_x.sqrt() * var_y.sqrt()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_rank_ic_perfect_correlation() {
        let scores = [1.0, 2.0, 3.0, 4.0, 5.0];
        let returns = [0.01, 0.02, 0.03, 0.04, 0.05];
        assert_relative_eq!(rank_ic(&scores, &returns).value().unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rank_ic_negative_correlation() {
        let scores = [5.0, 4.0, 3.0, 2.0, 1.0];
        let returns = [0.01, 0.02, 0.03, 0.04, 0.05];
        assert_relative_eq!(rank_ic(&scores, &returns).value().unwrap(), -1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_rank_ic_matches_spearman_formula() {
        // rank(returns) = [2, 3, 1, 4]; sum d^2 = 6; 1 - 6*6/(4*15) = 0.4
        let scores = [1.0, 2.0, 3.0, 4.0];
        let returns = [0.01, 0.02, -0.01, 0.03];
        assert_relative_eq!(
            rank_ic(&scores, &returns).value().unwrap(),
            0.4,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rank_ic_invariant_under_monotonic_transform() {
        let scores = [0.3, -1.2, 2.5, 0.9, 1.1, -0.4];
        let returns = [0.02, -0.01, 0.015, 0.0, 0.03, -0.02];
        let base = rank_ic(&scores, &returns).value().unwrap();

        let scaled: Vec<f64> = scores.iter().map(|s| 7.5 * s).collect();
        let cubed: Vec<f64> = scores.iter().map(|s| s.powi(3) + 1.0).collect();
        assert_relative_eq!(rank_ic(&scaled, &returns).value().unwrap(), base, epsilon = 1e-12);
        assert_relative_eq!(rank_ic(&cubed, &returns).value().unwrap(), base, epsilon = 1e-12);
    }

    #[test]
    fn test_rank_ic_degenerate_inputs() {
        assert!(rank_ic(&[1.0], &[0.01]).is_missing());
        assert!(rank_ic(&[1.0, 2.0], &[0.01]).is_missing());
        // Constant factor has no rank dispersion
        assert!(rank_ic(&[1.0, 1.0, 1.0], &[0.01, 0.02, 0.03]).is_missing());
    }

    #[test]
    fn test_pearson_ic() {
        let scores = [1.0, 2.0, 3.0];
        let returns = [2.0, 4.0, 6.0];
        assert_relative_eq!(pearson_ic(&scores, &returns).value().unwrap(), 1.0, epsilon = 1e-12);
        assert!(pearson_ic(&[1.0, 2.0], &[3.0, 3.0]).is_missing());
    }

    #[test]
    fn test_compute_ranks() {
        let ranks = compute_ranks(&[3.0, 1.0, 2.0, 5.0, 4.0]);
        assert_eq!(ranks.to_vec(), vec![3.0, 1.0, 2.0, 5.0, 4.0]);
    }

    #[test]
    fn test_compute_ranks_with_ties() {
        let ranks = compute_ranks(&[1.0, 2.0, 2.0, 3.0]);
        assert_relative_eq!(ranks[0], 1.0);
        assert_relative_eq!(ranks[1], 2.5);
        assert_relative_eq!(ranks[2], 2.5);
        assert_relative_eq!(ranks[3], 4.0);
    }

    #[test]
    fn test_compute_ranks_all_tied() {
        let ranks = compute_ranks(&[7.0, 7.0, 7.0]);
        assert_eq!(ranks.to_vec(), vec![2.0, 2.0, 2.0]);
    }
}
