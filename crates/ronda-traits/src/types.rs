//! Common types used throughout ronda.
//!
//! A [`Panel`] holds one real value per (time bucket, asset) key. Factor
//! scores and forward returns share this representation. Every per-bucket
//! series the engine derives is a [`TimeSeries`] of [`Observation`]s, where
//! an undefined statistic is an explicit [`Observation::Missing`] rather than
//! a zero or a NaN.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Time bucket identifier. Daily data uses midnight of the trading day.
pub use chrono::NaiveDateTime as Bucket;

/// An asset identifier, unique within a bucket.
pub type AssetId = String;

/// Values keyed by (bucket, asset).
///
/// Buckets iterate in chronological order and assets within a bucket iterate
/// in ascending id order. An asset absent from a bucket is simply not a key.
/// Non-finite values may be stored; consumers treat them as absent.
///
/// # Example
///
/// ```
/// use chrono::NaiveDate;
/// use ronda_traits::Panel;
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap().and_hms_opt(0, 0, 0).unwrap();
/// let mut panel = Panel::new();
/// panel.insert(day, "000001", 0.5);
/// panel.insert(day, "000002", -1.2);
///
/// assert_eq!(panel.len(), 2);
/// assert_eq!(panel.get(&day, "000002"), Some(-1.2));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Panel {
    data: BTreeMap<Bucket, BTreeMap<AssetId, f64>>,
}

/// Panel of factor scores.
pub type FactorPanel = Panel;

/// Panel of forward realized returns.
pub type ReturnPanel = Panel;

impl Panel {
    /// Creates an empty panel.
    pub const fn new() -> Self {
        Self {
            data: BTreeMap::new(),
        }
    }

    /// Inserts a value, returning the previous value for the key if any.
    pub fn insert(&mut self, bucket: Bucket, asset: impl Into<AssetId>, value: f64) -> Option<f64> {
        self.data
            .entry(bucket)
            .or_default()
            .insert(asset.into(), value)
    }

    /// Looks up the value for one (bucket, asset) key.
    pub fn get(&self, bucket: &Bucket, asset: &str) -> Option<f64> {
        self.data.get(bucket)?.get(asset).copied()
    }

    /// Returns the cross-section stored for a bucket.
    pub fn bucket(&self, bucket: &Bucket) -> Option<&BTreeMap<AssetId, f64>> {
        self.data.get(bucket)
    }

    /// Iterates buckets in chronological order.
    pub fn buckets(&self) -> impl Iterator<Item = &Bucket> {
        self.data.keys()
    }

    /// Iterates (bucket, cross-section) pairs in chronological order.
    pub fn iter(&self) -> impl Iterator<Item = (&Bucket, &BTreeMap<AssetId, f64>)> {
        self.data.iter()
    }

    /// Number of distinct buckets.
    pub fn n_buckets(&self) -> usize {
        self.data.len()
    }

    /// Total number of stored (bucket, asset) values.
    pub fn len(&self) -> usize {
        self.data.values().map(BTreeMap::len).sum()
    }

    /// Returns whether the panel stores no values.
    pub fn is_empty(&self) -> bool {
        self.data.values().all(BTreeMap::is_empty)
    }

    /// All distinct asset ids present in any bucket.
    pub fn assets(&self) -> BTreeSet<&str> {
        self.data
            .values()
            .flat_map(|row| row.keys().map(String::as_str))
            .collect()
    }

    /// Applies `f` to every value, keeping the key space unchanged.
    pub fn map_values(&self, f: impl Fn(f64) -> f64) -> Self {
        let data = self
            .data
            .iter()
            .map(|(bucket, row)| {
                let row = row
                    .iter()
                    .map(|(asset, &value)| (asset.clone(), f(value)))
                    .collect();
                (*bucket, row)
            })
            .collect();
        Self { data }
    }

    /// Regroups the panel by asset: each asset's finite values in
    /// chronological order.
    pub fn asset_series(&self) -> BTreeMap<&str, Vec<(Bucket, f64)>> {
        let mut out: BTreeMap<&str, Vec<(Bucket, f64)>> = BTreeMap::new();
        for (bucket, row) in &self.data {
            for (asset, &value) in row {
                if value.is_finite() {
                    out.entry(asset.as_str()).or_default().push((*bucket, value));
                }
            }
        }
        out
    }
}

impl FromIterator<(Bucket, AssetId, f64)> for Panel {
    fn from_iter<I: IntoIterator<Item = (Bucket, AssetId, f64)>>(iter: I) -> Self {
        let mut panel = Self::new();
        for (bucket, asset, value) in iter {
            panel.insert(bucket, asset, value);
        }
        panel
    }
}

/// A per-bucket statistic that is either defined or explicitly missing.
///
/// Serializes as a number or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, derive_more::Display)]
#[serde(from = "Option<f64>", into = "Option<f64>")]
pub enum Observation {
    /// A defined, finite value.
    #[display("{_0}")]
    Value(f64),
    /// No observation for this bucket.
    #[default]
    #[display("NA")]
    Missing,
}

impl Observation {
    /// Wraps a value, mapping NaN and infinities to [`Observation::Missing`].
    pub const fn from_finite(value: f64) -> Self {
        if value.is_finite() {
            Self::Value(value)
        } else {
            Self::Missing
        }
    }

    /// The defined value, if any.
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(v),
            Self::Missing => None,
        }
    }

    /// Returns true when no value is present.
    pub const fn is_missing(self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Transforms a defined value; the result is re-checked for finiteness.
    pub fn map(self, f: impl FnOnce(f64) -> f64) -> Self {
        match self {
            Self::Value(v) => Self::from_finite(f(v)),
            Self::Missing => Self::Missing,
        }
    }
}

impl From<Option<f64>> for Observation {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Self::Missing, Self::from_finite)
    }
}

impl From<Observation> for Option<f64> {
    fn from(obs: Observation) -> Self {
        obs.value()
    }
}

/// One point of a [`TimeSeries`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// The bucket this point belongs to.
    pub bucket: Bucket,
    /// The statistic for the bucket.
    pub value: Observation,
}

/// A bucket-ordered series of observations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TimeSeries {
    points: Vec<Point>,
}

impl TimeSeries {
    /// Creates an empty series.
    pub const fn new() -> Self {
        Self { points: Vec::new() }
    }

    /// Creates an empty series with room for `capacity` points.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    /// Appends a point. Callers push buckets in chronological order.
    pub fn push(&mut self, bucket: Bucket, value: Observation) {
        self.points.push(Point { bucket, value });
    }

    /// Number of points, missing ones included.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All points in bucket order.
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Iterates points in bucket order.
    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    /// Iterates buckets in order.
    pub fn buckets(&self) -> impl Iterator<Item = Bucket> + '_ {
        self.points.iter().map(|p| p.bucket)
    }

    /// Iterates observations in order.
    pub fn values(&self) -> impl Iterator<Item = Observation> + '_ {
        self.points.iter().map(|p| p.value)
    }

    /// Iterates only the defined values, skipping missing buckets.
    pub fn observed(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().filter_map(|p| p.value.value())
    }

    /// Number of defined values.
    pub fn n_observed(&self) -> usize {
        self.observed().count()
    }

    /// The observation at a bucket, if the bucket is part of the series.
    pub fn get(&self, bucket: &Bucket) -> Option<Observation> {
        self.points
            .binary_search_by(|p| p.bucket.cmp(bucket))
            .ok()
            .map(|i| self.points[i].value)
    }

    /// The last defined value.
    pub fn last_observed(&self) -> Option<f64> {
        self.points.iter().rev().find_map(|p| p.value.value())
    }
}

impl FromIterator<(Bucket, Observation)> for TimeSeries {
    fn from_iter<I: IntoIterator<Item = (Bucket, Observation)>>(iter: I) -> Self {
        Self {
            points: iter
                .into_iter()
                .map(|(bucket, value)| Point { bucket, value })
                .collect(),
        }
    }
}
