#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! The pipeline runs in a fixed order:
//! - [`align`]: pair factor and return values per bucket
//! - [`ic`]: rank and Pearson IC per bucket
//! - [`group`]: quantile groups and long/short cohorts
//! - [`portfolio`]: per-bucket group, cohort and benchmark returns, turnover
//! - [`metrics`]: scalar summaries and cumulative curves
//!
//! # Example
//!
//! ```rust,ignore
//! use ronda_eval::{EvaluatorConfig, FactorEvaluator};
//!
//! let config = EvaluatorConfig { group_num: 5, ..Default::default() }.validate()?;
//! let result = FactorEvaluator::new(config).evaluate(&factor_panel, &return_panel)?;
//! println!("mean IC: {:?}", result.summary.ic.mean);
//! ```

pub mod align;
pub mod config;
pub mod evaluator;
pub mod group;
pub mod ic;
pub mod metrics;
pub mod portfolio;

// Re-export main types
pub use align::{AlignedObservation, AlignedPanel, AlignmentSummary, align};
pub use config::{EvaluatorConfig, ValidatedConfig};
pub use evaluator::{EvaluationResult, FactorEvaluator, SummaryStatistics, evaluate};
pub use group::{BucketPartition, GroupAssignment, LongShortCohort, QuantileGrouper};
pub use ic::{compute_ranks, ic_series, pearson_ic, pearson_ic_series, rank_ic};
pub use metrics::{IcSummary, PerformanceStats};
pub use portfolio::{PortfolioAggregator, PortfolioSeries, Side};
