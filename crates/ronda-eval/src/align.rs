//! Panel alignment.
//!
//! Pairs factor scores with forward returns bucket by bucket. Only assets
//! with a finite value in both panels for the same bucket are kept; nothing
//! is filled forward or backward.

use ronda_traits::{AssetId, Bucket, FactorPanel, Result, ReturnPanel, RondaError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// The assets present in both panels for one bucket, with their paired values.
///
/// Assets are stored in ascending id order.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedObservation {
    bucket: Bucket,
    assets: Vec<AssetId>,
    factors: Vec<f64>,
    returns: Vec<f64>,
    degenerate: bool,
}

impl AlignedObservation {
    /// Builds an observation from `(asset, factor, forward_return)` triples.
    ///
    /// Triples are re-sorted by asset id; the first occurrence of a duplicate
    /// id wins. Non-finite values are dropped.
    pub fn new(
        bucket: Bucket,
        rows: impl IntoIterator<Item = (AssetId, f64, f64)>,
        min_assets: usize,
    ) -> Self {
        let mut sorted: BTreeMap<AssetId, (f64, f64)> = BTreeMap::new();
        for (asset, factor, ret) in rows {
            if factor.is_finite() && ret.is_finite() {
                sorted.entry(asset).or_insert((factor, ret));
            }
        }

        let n = sorted.len();
        let mut assets = Vec::with_capacity(n);
        let mut factors = Vec::with_capacity(n);
        let mut returns = Vec::with_capacity(n);
        for (asset, (factor, ret)) in sorted {
            assets.push(asset);
            factors.push(factor);
            returns.push(ret);
        }

        Self {
            bucket,
            assets,
            factors,
            returns,
            degenerate: n < min_assets,
        }
    }

    /// The bucket this observation belongs to.
    pub const fn bucket(&self) -> Bucket {
        self.bucket
    }

    /// Aligned asset ids, ascending.
    pub fn assets(&self) -> &[AssetId] {
        &self.assets
    }

    /// Factor values, parallel to [`Self::assets`].
    pub fn factors(&self) -> &[f64] {
        &self.factors
    }

    /// Forward returns, parallel to [`Self::assets`].
    pub fn returns(&self) -> &[f64] {
        &self.returns
    }

    /// Number of aligned assets.
    pub fn len(&self) -> usize {
        self.assets.len()
    }

    /// Returns whether no asset is aligned in this bucket.
    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    /// Whether the bucket has too few assets for per-bucket statistics.
    pub const fn is_degenerate(&self) -> bool {
        self.degenerate
    }

    /// Iterates `(asset, factor, forward_return)` in asset order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64, f64)> {
        self.assets
            .iter()
            .zip(self.factors.iter().zip(self.returns.iter()))
            .map(|(asset, (&f, &r))| (asset.as_str(), f, r))
    }
}

/// Key facts about an alignment, for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlignmentSummary {
    /// First bucket shared by both panels
    pub start: Option<Bucket>,
    /// Last bucket shared by both panels
    pub end: Option<Bucket>,
    /// Buckets present in either panel
    pub n_buckets: usize,
    /// Buckets present in both panels
    pub n_common_buckets: usize,
    /// Distinct assets aligned in at least one bucket
    pub n_assets: usize,
    /// Total aligned (bucket, asset) pairs
    pub n_observations: usize,
    /// Buckets flagged degenerate
    pub n_degenerate: usize,
}

/// The full aligned view of a factor panel against a return panel.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedPanel {
    observations: Vec<AlignedObservation>,
    summary: AlignmentSummary,
}

impl AlignedPanel {
    /// Per-bucket observations in chronological order.
    pub fn observations(&self) -> &[AlignedObservation] {
        &self.observations
    }

    /// Alignment summary.
    pub const fn summary(&self) -> &AlignmentSummary {
        &self.summary
    }

    /// Number of buckets (degenerate ones included).
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Returns whether there are no buckets.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    /// Iterates observations in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = &AlignedObservation> {
        self.observations.iter()
    }
}

/// Aligns a factor panel with a return panel.
///
/// Produces one [`AlignedObservation`] for every bucket present in either
/// panel, restricted to the assets present (with finite values) in both.
/// Buckets with fewer than `min_assets` aligned assets are kept and flagged
/// degenerate.
///
/// # Errors
///
/// Returns [`RondaError::Configuration`] if the panels share no bucket.
///
/// # Example
///
/// ```rust
/// use chrono::NaiveDate;
/// use ronda_eval::align;
/// use ronda_traits::Panel;
///
/// let t = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let mut factor = Panel::new();
/// let mut returns = Panel::new();
/// factor.insert(t, "A", 1.0);
/// factor.insert(t, "B", 2.0);
/// returns.insert(t, "B", 0.01);
/// returns.insert(t, "C", 0.02);
///
/// let aligned = align(&factor, &returns, 2).unwrap();
/// assert_eq!(aligned.observations()[0].assets(), ["B".to_string()]);
/// assert!(aligned.observations()[0].is_degenerate());
/// ```
pub fn align(factor: &FactorPanel, returns: &ReturnPanel, min_assets: usize) -> Result<AlignedPanel> {
    let factor_buckets: BTreeSet<&Bucket> = factor.buckets().collect();
    let return_buckets: BTreeSet<&Bucket> = returns.buckets().collect();

    let common: Vec<&Bucket> = factor_buckets.intersection(&return_buckets).copied().collect();
    if common.is_empty() {
        return Err(RondaError::Configuration(format!(
            "factor panel ({} buckets) and return panel ({} buckets) share no bucket",
            factor_buckets.len(),
            return_buckets.len()
        )));
    }

    let all: BTreeSet<&Bucket> = factor_buckets.union(&return_buckets).copied().collect();
    let mut observations = Vec::with_capacity(all.len());
    let mut aligned_assets: BTreeSet<AssetId> = BTreeSet::new();

    for bucket in all {
        let rows: Vec<(AssetId, f64, f64)> = match (factor.bucket(bucket), returns.bucket(bucket)) {
            (Some(f_row), Some(r_row)) => f_row
                .iter()
                .filter_map(|(asset, &f)| r_row.get(asset).map(|&r| (asset.clone(), f, r)))
                .collect(),
            _ => Vec::new(),
        };
        let obs = AlignedObservation::new(*bucket, rows, min_assets);
        aligned_assets.extend(obs.assets().iter().cloned());
        observations.push(obs);
    }

    let summary = AlignmentSummary {
        start: common.first().map(|b| **b),
        end: common.last().map(|b| **b),
        n_buckets: observations.len(),
        n_common_buckets: common.len(),
        n_assets: aligned_assets.len(),
        n_observations: observations.iter().map(AlignedObservation::len).sum(),
        n_degenerate: observations.iter().filter(|o| o.is_degenerate()).count(),
    };

    tracing::debug!(
        n_buckets = summary.n_buckets,
        n_common_buckets = summary.n_common_buckets,
        n_assets = summary.n_assets,
        n_degenerate = summary.n_degenerate,
        "aligned factor and return panels"
    );

    Ok(AlignedPanel {
        observations,
        summary,
    })
}
