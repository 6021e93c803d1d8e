//! The factor evaluation pipeline.
//!
//! [`FactorEvaluator`] runs alignment, rank correlation, grouping, portfolio
//! aggregation and reduction in that order, and returns one immutable
//! [`EvaluationResult`]. It holds no state besides its configuration, so a
//! single evaluator can serve any number of independent calls.

use crate::align::{AlignmentSummary, align};
use crate::config::{EvaluatorConfig, ValidatedConfig};
use crate::group::QuantileGrouper;
use crate::ic::{ic_series, pearson_ic_series};
use crate::metrics::{
    IcSummary, PerformanceStats, annualized_return, cumulative_returns, cumulative_sum,
    mean_observed, total_return,
};
use crate::portfolio::PortfolioAggregator;
use ronda_traits::{FactorPanel, Result, ReturnPanel, TimeSeries};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// Scalar summaries of an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// IC reduction
    pub ic: IcSummary,
    /// Annualized return of each quantile group
    pub group_annualized: Vec<Option<f64>>,
    /// Total compounded return of each quantile group
    pub group_total: Vec<Option<f64>>,
    /// Long cohort performance
    pub long: PerformanceStats,
    /// Short cohort performance
    pub short: PerformanceStats,
    /// Long-short spread performance
    pub long_short: PerformanceStats,
    /// Long-minus-benchmark performance
    pub excess: PerformanceStats,
    /// Mean long cohort turnover
    pub mean_long_turnover: Option<f64>,
    /// Mean long-short book turnover
    pub mean_long_short_turnover: Option<f64>,
}

/// Everything an evaluation produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    /// Alignment facts
    pub alignment: AlignmentSummary,
    /// Rank IC per bucket
    pub rank_ic: TimeSeries,
    /// Pearson IC per bucket
    pub pearson_ic: TimeSeries,
    /// Running sum of rank IC
    pub cumulative_ic: TimeSeries,
    /// Return series per quantile group, lowest factor values first
    pub group_returns: Vec<TimeSeries>,
    /// Compounded curve per quantile group
    pub cumulative_group_returns: Vec<TimeSeries>,
    /// Long cohort returns
    pub long_returns: TimeSeries,
    /// Short cohort returns
    pub short_returns: TimeSeries,
    /// Long minus short
    pub long_short_returns: TimeSeries,
    /// Equal-weighted universe returns
    pub benchmark_returns: TimeSeries,
    /// Long minus benchmark
    pub excess_returns: TimeSeries,
    /// Compounded long cohort curve
    pub cumulative_long_returns: TimeSeries,
    /// Compounded short cohort curve
    pub cumulative_short_returns: TimeSeries,
    /// Compounded long-short curve
    pub cumulative_long_short_returns: TimeSeries,
    /// Compounded excess curve
    pub cumulative_excess_returns: TimeSeries,
    /// Long cohort turnover
    pub long_turnover: TimeSeries,
    /// Long-short book turnover
    pub long_short_turnover: TimeSeries,
    /// Scalar summaries
    pub summary: SummaryStatistics,
}

impl EvaluationResult {
    /// Number of quantile groups.
    pub fn group_num(&self) -> usize {
        self.group_returns.len()
    }

    /// The ICIR, or why it is undefined.
    ///
    /// # Errors
    ///
    /// See [`IcSummary::icir`].
    pub fn icir(&self) -> Result<f64> {
        self.summary.ic.icir()
    }
}

/// Evaluates factor panels against return panels.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use ronda_eval::{EvaluatorConfig, FactorEvaluator};
/// use ronda_traits::Panel;
///
/// let t = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let mut factor = Panel::new();
/// let mut returns = Panel::new();
/// for (asset, f, r) in [("A", 1.0, 0.01), ("B", 2.0, 0.02), ("C", 3.0, -0.01), ("D", 4.0, 0.03)] {
///     factor.insert(t, asset, f);
///     returns.insert(t, asset, r);
/// }
///
/// let config = EvaluatorConfig { group_num: 2, ..Default::default() }.validate().unwrap();
/// let result = FactorEvaluator::new(config).evaluate(&factor, &returns).unwrap();
///
/// let ic = result.rank_ic.last_observed().unwrap();
/// assert!((ic - 0.4).abs() < 1e-12);
/// ```
#[derive(Debug, Clone)]
pub struct FactorEvaluator {
    config: ValidatedConfig,
}

impl FactorEvaluator {
    /// Creates an evaluator from a validated configuration.
    pub const fn new(config: ValidatedConfig) -> Self {
        Self { config }
    }

    /// Validates a configuration and creates an evaluator from it.
    ///
    /// # Errors
    ///
    /// Returns the configuration error from [`EvaluatorConfig::validate`].
    pub fn from_config(config: EvaluatorConfig) -> Result<Self> {
        Ok(Self::new(config.validate()?))
    }

    /// The configuration in use.
    pub const fn config(&self) -> &ValidatedConfig {
        &self.config
    }

    /// Evaluates a factor panel against a forward return panel.
    ///
    /// # Errors
    ///
    /// Returns [`ronda_traits::RondaError::Configuration`] if the panels share
    /// no bucket. Degenerate buckets never fail the evaluation; their
    /// statistics are missing in the result.
    pub fn evaluate(&self, factor: &FactorPanel, returns: &ReturnPanel) -> Result<EvaluationResult> {
        let factor: Cow<'_, FactorPanel> = if self.config.invert_factor() {
            Cow::Owned(factor.map_values(|v| -v))
        } else {
            Cow::Borrowed(factor)
        };

        let aligned = align(&factor, returns, self.config.min_aligned_assets())?;

        let rank_ic = ic_series(&aligned);
        let pearson_ic = pearson_ic_series(&aligned);
        tracing::debug!(
            n_ic = rank_ic.n_observed(),
            n_buckets = rank_ic.len(),
            "computed IC series"
        );

        let grouper = QuantileGrouper::from_config(&self.config);
        let portfolios = PortfolioAggregator::new(grouper).aggregate(&aligned);
        tracing::debug!(
            group_num = portfolios.group_returns.len(),
            n_long = portfolios.long_returns.n_observed(),
            n_long_short = portfolios.long_short_returns.n_observed(),
            "aggregated portfolio returns"
        );

        let scale = self.config.bucket_to_year_scale();
        let ic_summary = IcSummary::calculate(&rank_ic, &pearson_ic);

        let summary = SummaryStatistics {
            group_annualized: portfolios
                .group_returns
                .iter()
                .map(|s| annualized_return(s, scale))
                .collect(),
            group_total: portfolios.group_returns.iter().map(total_return).collect(),
            long: PerformanceStats::calculate(&portfolios.long_returns, scale),
            short: PerformanceStats::calculate(&portfolios.short_returns, scale),
            long_short: PerformanceStats::calculate(&portfolios.long_short_returns, scale),
            excess: PerformanceStats::calculate(&portfolios.excess_returns, scale),
            mean_long_turnover: mean_observed(&portfolios.long_turnover),
            mean_long_short_turnover: mean_observed(&portfolios.long_short_turnover),
            ic: ic_summary,
        };

        tracing::info!(
            n_buckets = aligned.len(),
            n_degenerate = aligned.summary().n_degenerate,
            mean_ic = ?summary.ic.mean,
            icir = ?summary.ic.icir,
            long_short_annualized = ?summary.long_short.annualized_return,
            "factor evaluation complete"
        );

        Ok(EvaluationResult {
            alignment: aligned.summary().clone(),
            cumulative_ic: cumulative_sum(&rank_ic),
            rank_ic,
            pearson_ic,
            cumulative_group_returns: portfolios
                .group_returns
                .iter()
                .map(cumulative_returns)
                .collect(),
            cumulative_long_returns: cumulative_returns(&portfolios.long_returns),
            cumulative_short_returns: cumulative_returns(&portfolios.short_returns),
            cumulative_long_short_returns: cumulative_returns(&portfolios.long_short_returns),
            cumulative_excess_returns: cumulative_returns(&portfolios.excess_returns),
            group_returns: portfolios.group_returns,
            long_returns: portfolios.long_returns,
            short_returns: portfolios.short_returns,
            long_short_returns: portfolios.long_short_returns,
            benchmark_returns: portfolios.benchmark_returns,
            excess_returns: portfolios.excess_returns,
            long_turnover: portfolios.long_turnover,
            long_short_turnover: portfolios.long_short_turnover,
            summary,
        })
    }
}

/// Validates `config` and evaluates `factor` against `returns` in one call.
///
/// # Errors
///
/// Returns a configuration error for an invalid configuration or panels that
/// share no bucket.
pub fn evaluate(
    factor: &FactorPanel,
    returns: &ReturnPanel,
    config: EvaluatorConfig,
) -> Result<EvaluationResult> {
    FactorEvaluator::from_config(config)?.evaluate(factor, returns)
}
