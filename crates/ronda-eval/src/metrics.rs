//! Summary statistics over per-bucket series.
//!
//! Every reduction here skips missing observations. A statistic with no
//! defined value is `None`, never zero or NaN.

use ronda_traits::stats::{self, MIN_STD_THRESHOLD};
use ronda_traits::{Result, RondaError, TimeSeries};
use serde::{Deserialize, Serialize};

/// Running sum of the observed values.
///
/// A missing input point yields a missing output point; the sum carries over
/// to the next observed bucket.
pub fn cumulative_sum(series: &TimeSeries) -> TimeSeries {
    let mut acc = 0.0;
    series
        .iter()
        .map(|p| {
            let value = p.value.map(|v| {
                acc += v;
                acc
            });
            (p.bucket, value)
        })
        .collect()
}

/// Compounded return curve: running `prod(1 + r) - 1` over observed values.
///
/// Missing points stay missing and leave the running product untouched.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use ronda_eval::metrics::cumulative_returns;
/// use ronda_traits::{Observation, TimeSeries};
///
/// let t = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let series: TimeSeries = vec![
///     (t(1), Observation::Value(0.1)),
///     (t(2), Observation::Missing),
///     (t(3), Observation::Value(0.1)),
/// ]
/// .into_iter()
/// .collect();
///
/// let curve = cumulative_returns(&series);
/// assert!(curve.get(&t(2)).unwrap().is_missing());
/// assert!((curve.last_observed().unwrap() - 0.21).abs() < 1e-12);
/// ```
pub fn cumulative_returns(series: &TimeSeries) -> TimeSeries {
    let mut wealth = 1.0;
    series
        .iter()
        .map(|p| {
            let value = p.value.map(|r| {
                wealth *= 1.0 + r;
                wealth - 1.0
            });
            (p.bucket, value)
        })
        .collect()
}

/// Compounded return over all observed buckets, `None` if none.
pub fn total_return(series: &TimeSeries) -> Option<f64> {
    if series.n_observed() == 0 {
        return None;
    }
    Some(stats::compound(series.observed()))
}

/// Annualized compounded return: `(1 + total)^(scale / n) - 1`, with `n` the
/// number of observed buckets.
pub fn annualized_return(series: &TimeSeries, bucket_to_year_scale: f64) -> Option<f64> {
    let n = series.n_observed();
    let total = total_return(series)?;
    let annualized = (1.0 + total).powf(bucket_to_year_scale / n as f64) - 1.0;
    annualized.is_finite().then_some(annualized)
}

/// Mean of the observed values.
pub fn mean_observed(series: &TimeSeries) -> Option<f64> {
    let values: Vec<f64> = series.observed().collect();
    stats::mean(&values)
}

/// Mean divided by population standard deviation.
///
/// # Errors
///
/// Returns [`RondaError::DegenerateInput`] with fewer than two values or a
/// standard deviation below [`MIN_STD_THRESHOLD`].
pub fn information_ratio(values: &[f64]) -> Result<f64> {
    if values.len() < 2 {
        return Err(RondaError::DegenerateInput(format!(
            "information ratio needs at least 2 observations, got {}",
            values.len()
        )));
    }

    let mean = stats::mean(values).unwrap_or(0.0);
    let std = stats::population_std(values).unwrap_or(0.0);
    if stats::is_degenerate_std(std) {
        return Err(RondaError::DegenerateInput(format!(
            "standard deviation {std:e} is below {MIN_STD_THRESHOLD:e}"
        )));
    }

    Ok(mean / std)
}

/// Reduction of the IC series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcSummary {
    /// Mean rank IC
    pub mean: Option<f64>,
    /// Population standard deviation of rank IC
    pub std: Option<f64>,
    /// Mean over standard deviation; `None` when degenerate
    pub icir: Option<f64>,
    /// Mean Pearson IC
    pub pearson_mean: Option<f64>,
    /// Fraction of observed rank ICs above zero
    pub win_rate: Option<f64>,
    /// Number of buckets with a rank IC
    pub n_obs: usize,
}

impl IcSummary {
    /// Reduces the rank and Pearson IC series.
    pub fn calculate(rank_ic: &TimeSeries, pearson_ic: &TimeSeries) -> Self {
        let values: Vec<f64> = rank_ic.observed().collect();
        let n_obs = values.len();

        let win_rate = (n_obs > 0)
            .then(|| values.iter().filter(|&&ic| ic > 0.0).count() as f64 / n_obs as f64);

        Self {
            mean: stats::mean(&values),
            std: stats::population_std(&values),
            icir: information_ratio(&values).ok(),
            pearson_mean: mean_observed(pearson_ic),
            win_rate,
            n_obs,
        }
    }

    /// The ICIR, or why it is undefined.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::DegenerateInput`] when fewer than two IC
    /// observations exist or the IC standard deviation is zero.
    pub fn icir(&self) -> Result<f64> {
        if self.n_obs < 2 {
            return Err(RondaError::DegenerateInput(format!(
                "ICIR needs at least 2 IC observations, got {}",
                self.n_obs
            )));
        }
        self.icir.ok_or_else(|| {
            RondaError::DegenerateInput(format!(
                "IC standard deviation is zero over {} observations",
                self.n_obs
            ))
        })
    }
}

/// Return and risk figures of one portfolio series.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PerformanceStats {
    /// Compounded return over all observed buckets
    pub total_return: Option<f64>,
    /// Annualized compounded return
    pub annualized_return: Option<f64>,
    /// Population standard deviation scaled by `sqrt(scale)`
    pub annualized_volatility: Option<f64>,
    /// Mean over standard deviation, scaled by `sqrt(scale)`
    pub sharpe_ratio: Option<f64>,
    /// Largest peak-to-trough decline of the compounded curve
    pub max_drawdown: Option<f64>,
    /// Number of observed buckets
    pub n_obs: usize,
}

impl PerformanceStats {
    /// Computes performance figures for a per-bucket return series.
    pub fn calculate(returns: &TimeSeries, bucket_to_year_scale: f64) -> Self {
        let values: Vec<f64> = returns.observed().collect();
        let n_obs = values.len();
        let scale_sqrt = bucket_to_year_scale.sqrt();

        let std = if n_obs >= 2 {
            stats::population_std(&values)
        } else {
            None
        };

        let sharpe_ratio = information_ratio(&values).ok().map(|ir| ir * scale_sqrt);

        let curve: Vec<f64> = cumulative_returns(returns).observed().collect();

        Self {
            total_return: total_return(returns),
            annualized_return: annualized_return(returns, bucket_to_year_scale),
            annualized_volatility: std.map(|s| s * scale_sqrt),
            sharpe_ratio,
            max_drawdown: (!curve.is_empty()).then(|| max_drawdown(&curve)),
            n_obs,
        }
    }
}

/// Maximum drawdown of a compounded return curve, as a fraction of the peak
/// wealth.
pub fn max_drawdown(cumulative_returns: &[f64]) -> f64 {
    let mut max_dd = 0.0;
    let mut peak = 0.0;

    for &cum_ret in cumulative_returns {
        if cum_ret > peak {
            peak = cum_ret;
        }
        let dd = (peak - cum_ret) / (1.0 + peak);
        if dd > max_dd {
            max_dd = dd;
        }
    }

    max_dd
}
