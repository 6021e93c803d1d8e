#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # ronda
//!
//! ronda is an umbrella crate that re-exports all ronda sub-crates for
//! convenience.
//!
//! ## Quick Start
//!
//! ```rust
//! use chrono::NaiveDate;
//! use ronda::{EvaluatorConfig, FactorEvaluator, Panel};
//!
//! # fn main() -> ronda::Result<()> {
//! let t = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let mut factor = Panel::new();
//! let mut returns = Panel::new();
//! for (asset, f, r) in [("A", 1.0, 0.01), ("B", 2.0, 0.02), ("C", 3.0, 0.03)] {
//!     factor.insert(t, asset, f);
//!     returns.insert(t, asset, r);
//! }
//!
//! let config = EvaluatorConfig { group_num: 3, ..Default::default() }.validate()?;
//! let result = FactorEvaluator::new(config).evaluate(&factor, &returns)?;
//! let ic = result.rank_ic.last_observed().unwrap_or_default();
//! assert!((ic - 1.0).abs() < 1e-12);
//! # Ok(())
//! # }
//! ```
//!
//! ## Crate Organization
//!
//! - [`traits`] - Panels, observations, time series and the error type
//! - [`eval`] - The evaluation engine
//! - [`smooth`] - Optional per-asset factor smoothing
//!
//! ## Pipeline
//!
//! 1. **Alignment** keeps, per bucket, the assets present in both panels
//! 2. **Rank IC** correlates factor ranks with return ranks per bucket
//! 3. **Grouping** splits each bucket into quantile groups and long/short cohorts
//! 4. **Aggregation** computes equal-weighted returns and turnover per bucket
//! 5. **Reduction** summarizes the per-bucket series

/// Version information for the ronda crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// ============================================================================
// Core Types
// ============================================================================

/// Core types for ronda.
///
/// - [`Panel`] - Values keyed by (bucket, asset)
/// - [`Observation`] - A per-bucket statistic or an explicit missing marker
/// - [`TimeSeries`] - Bucket-ordered observations
pub mod traits {
    pub use ronda_traits::*;
}

// Re-export error types
pub use ronda_traits::{Result, RondaError};

// Re-export common types
pub use ronda_traits::{AssetId, Bucket, FactorPanel, Observation, Panel, ReturnPanel, TimeSeries};

// ============================================================================
// Evaluation
// ============================================================================

/// Factor evaluation.
///
/// ## Information Coefficient (IC)
///
/// Spearman correlation between factor values and forward returns within
/// one bucket:
///
/// ```text
/// IC_t = corr(rank(factor_t), rank(return_t))
/// ```
///
/// ## ICIR
///
/// ```text
/// ICIR = mean(IC) / std(IC)
/// ```
///
/// ## Turnover
///
/// ```text
/// Turnover_t = |long_t Δ long_{t-1}| / |long_t ∪ long_{t-1}|
/// ```
pub mod eval {
    pub use ronda_eval::*;
}

pub use ronda_eval::{EvaluationResult, EvaluatorConfig, FactorEvaluator, ValidatedConfig, evaluate};

// ============================================================================
// Smoothing
// ============================================================================

/// Per-asset smoothing applied to a factor panel before evaluation.
pub mod smooth {
    pub use ronda_smooth::*;
}

pub use ronda_smooth::{Smoother, SmoothingMethod, SmoothingPipeline};

// ============================================================================
// Prelude
// ============================================================================

/// Prelude module for convenient imports.
///
/// ```rust
/// use ronda::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        EvaluationResult, EvaluatorConfig, FactorEvaluator, Observation, Panel, Result,
        RondaError, Smoother, SmoothingPipeline, TimeSeries,
    };
}
