//! Per-bucket portfolio returns and turnover.
//!
//! Every bucket is rebalanced from scratch: each quantile group and each
//! cohort holds its assets equal-weighted for that bucket's forward return.
//! Turnover compares the composition of consecutive non-degenerate buckets.

use crate::align::{AlignedObservation, AlignedPanel};
use crate::group::{BucketPartition, QuantileGrouper};
use ronda_traits::{AssetId, Bucket, Observation, TimeSeries};
use std::collections::BTreeSet;

/// Side of a position in the long-short book.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Side {
    /// Long cohort
    Long,
    /// Short cohort
    Short,
}

/// Returns of every portfolio for one bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketReturns {
    /// Bucket
    pub bucket: Bucket,
    /// Equal-weighted return of each quantile group
    pub groups: Vec<Observation>,
    /// Equal-weighted return of the long cohort
    pub long: Observation,
    /// Equal-weighted return of the short cohort
    pub short: Observation,
    /// Long minus short
    pub long_short: Observation,
    /// Equal-weighted return of all aligned assets
    pub benchmark: Observation,
    /// Long minus benchmark
    pub excess: Observation,
}

impl BucketReturns {
    /// All-missing returns for a degenerate bucket.
    pub fn missing(bucket: Bucket, group_num: usize) -> Self {
        Self {
            bucket,
            groups: vec![Observation::Missing; group_num],
            long: Observation::Missing,
            short: Observation::Missing,
            long_short: Observation::Missing,
            benchmark: Observation::Missing,
            excess: Observation::Missing,
        }
    }

    /// Computes the returns of one non-degenerate bucket from its partition.
    pub fn calculate(obs: &AlignedObservation, partition: &BucketPartition) -> Self {
        let returns = obs.returns();
        let groups = (0..partition.groups.group_num())
            .map(|g| mean_return(returns, partition.groups.members(g)))
            .collect();

        let long = mean_return(returns, partition.cohort.long());
        let short = mean_return(returns, partition.cohort.short());
        let benchmark = Observation::from(ronda_traits::stats::mean(returns));

        Self {
            bucket: obs.bucket(),
            groups,
            long,
            short,
            long_short: difference(long, short),
            benchmark,
            excess: difference(long, benchmark),
        }
    }
}

/// Equal-weighted mean return of the assets at `positions`; missing if empty.
fn mean_return(returns: &[f64], positions: &[usize]) -> Observation {
    if positions.is_empty() {
        return Observation::Missing;
    }
    let sum: f64 = positions.iter().map(|&i| returns[i]).sum();
    Observation::from_finite(sum / positions.len() as f64)
}

const fn difference(a: Observation, b: Observation) -> Observation {
    match (a, b) {
        (Observation::Value(x), Observation::Value(y)) => Observation::from_finite(x - y),
        _ => Observation::Missing,
    }
}

/// Fraction of composition that changed between two holdings:
/// `|prev Δ curr| / |prev ∪ curr|`, zero when both are empty.
///
/// # Example
///
/// ```rust
/// use ronda_eval::portfolio::set_turnover;
/// use std::collections::BTreeSet;
///
/// let prev: BTreeSet<&str> = ["A", "B"].into_iter().collect();
/// let curr: BTreeSet<&str> = ["B", "C"].into_iter().collect();
/// assert!((set_turnover(&prev, &curr) - 2.0 / 3.0).abs() < 1e-12);
/// ```
pub fn set_turnover<T: Ord>(prev: &BTreeSet<T>, curr: &BTreeSet<T>) -> f64 {
    let union = prev.union(curr).count();
    if union == 0 {
        return 0.0;
    }
    let changed = prev.symmetric_difference(curr).count();
    changed as f64 / union as f64
}

/// Tracks cohort composition across buckets to measure turnover.
#[derive(Debug, Clone, Default)]
pub struct TurnoverTracker {
    prev_long: Option<BTreeSet<AssetId>>,
    prev_book: Option<BTreeSet<(AssetId, Side)>>,
}

impl TurnoverTracker {
    /// Creates a tracker with no history.
    pub const fn new() -> Self {
        Self {
            prev_long: None,
            prev_book: None,
        }
    }

    /// Records one non-degenerate bucket and returns (long turnover,
    /// long-short turnover) relative to the previous recorded bucket. Both are
    /// missing on the first call.
    pub fn update(
        &mut self,
        obs: &AlignedObservation,
        partition: &BucketPartition,
    ) -> (Observation, Observation) {
        let long = partition.cohort.long_assets(obs);
        let book: BTreeSet<(AssetId, Side)> = long
            .iter()
            .map(|a| (a.clone(), Side::Long))
            .chain(
                partition
                    .cohort
                    .short_assets(obs)
                    .into_iter()
                    .map(|a| (a, Side::Short)),
            )
            .collect();

        let long_turnover = self
            .prev_long
            .as_ref()
            .map_or(Observation::Missing, |prev| {
                Observation::Value(set_turnover(prev, &long))
            });
        let book_turnover = self
            .prev_book
            .as_ref()
            .map_or(Observation::Missing, |prev| {
                Observation::Value(set_turnover(prev, &book))
            });

        self.prev_long = Some(long);
        self.prev_book = Some(book);

        (long_turnover, book_turnover)
    }
}

/// Per-bucket portfolio series for a whole evaluation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PortfolioSeries {
    /// Return series of each quantile group, indexed by group
    pub group_returns: Vec<TimeSeries>,
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
    /// Long cohort turnover
    pub long_turnover: TimeSeries,
    /// Long-short book turnover
    pub long_short_turnover: TimeSeries,
}

impl PortfolioSeries {
    fn with_groups(group_num: usize, capacity: usize) -> Self {
        Self {
            group_returns: (0..group_num)
                .map(|_| TimeSeries::with_capacity(capacity))
                .collect(),
            long_returns: TimeSeries::with_capacity(capacity),
            short_returns: TimeSeries::with_capacity(capacity),
            long_short_returns: TimeSeries::with_capacity(capacity),
            benchmark_returns: TimeSeries::with_capacity(capacity),
            excess_returns: TimeSeries::with_capacity(capacity),
            long_turnover: TimeSeries::with_capacity(capacity),
            long_short_turnover: TimeSeries::with_capacity(capacity),
        }
    }

    fn push(&mut self, returns: BucketReturns, turnover: (Observation, Observation)) {
        let bucket = returns.bucket;
        for (series, value) in self.group_returns.iter_mut().zip(returns.groups) {
            series.push(bucket, value);
        }
        self.long_returns.push(bucket, returns.long);
        self.short_returns.push(bucket, returns.short);
        self.long_short_returns.push(bucket, returns.long_short);
        self.benchmark_returns.push(bucket, returns.benchmark);
        self.excess_returns.push(bucket, returns.excess);
        self.long_turnover.push(bucket, turnover.0);
        self.long_short_turnover.push(bucket, turnover.1);
    }
}

/// Builds group and cohort portfolios bucket by bucket.
#[derive(Debug, Clone, Copy)]
pub struct PortfolioAggregator {
    grouper: QuantileGrouper,
}

impl PortfolioAggregator {
    /// Creates an aggregator around a grouper.
    pub const fn new(grouper: QuantileGrouper) -> Self {
        Self { grouper }
    }

    /// Computes every per-bucket portfolio series.
    ///
    /// Degenerate buckets yield missing returns and missing turnover, and do
    /// not reset the turnover reference: the next non-degenerate bucket is
    /// compared with the last non-degenerate one.
    pub fn aggregate(&self, aligned: &AlignedPanel) -> PortfolioSeries {
        let group_num = self.grouper.group_num();
        let mut series = PortfolioSeries::with_groups(group_num, aligned.len());
        let mut tracker = TurnoverTracker::new();

        for obs in aligned.iter() {
            if obs.is_degenerate() {
                series.push(
                    BucketReturns::missing(obs.bucket(), group_num),
                    (Observation::Missing, Observation::Missing),
                );
                continue;
            }

            let partition = self.grouper.partition(obs);
            let returns = BucketReturns::calculate(obs, &partition);
            let turnover = tracker.update(obs, &partition);
            series.push(returns, turnover);
        }

        series
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;

    fn day(d: u32) -> Bucket {
        NaiveDate::from_ymd_opt(2024, 5, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn obs(d: u32, rows: &[(&str, f64, f64)]) -> AlignedObservation {
        AlignedObservation::new(
            day(d),
            rows.iter().map(|(a, f, r)| (a.to_string(), *f, *r)),
            2,
        )
    }

    #[test]
    fn test_bucket_returns_two_groups() {
        let o = obs(
            1,
            &[
                ("A", 1.0, 0.01),
                ("B", 2.0, 0.02),
                ("C", 3.0, -0.01),
                ("D", 4.0, 0.03),
            ],
        );
        let grouper = QuantileGrouper::new(2, 90.0, 10.0).unwrap();
        let returns = BucketReturns::calculate(&o, &grouper.partition(&o));

        assert_relative_eq!(returns.groups[0].value().unwrap(), 0.015, epsilon = 1e-12);
        assert_relative_eq!(returns.groups[1].value().unwrap(), 0.01, epsilon = 1e-12);
        assert_relative_eq!(returns.long.value().unwrap(), 0.03);
        assert_relative_eq!(returns.short.value().unwrap(), 0.01);
        assert_relative_eq!(returns.long_short.value().unwrap(), 0.02, epsilon = 1e-12);
        assert_relative_eq!(returns.benchmark.value().unwrap(), 0.0125, epsilon = 1e-12);
        assert_relative_eq!(returns.excess.value().unwrap(), 0.0175, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_group_is_missing() {
        let o = obs(1, &[("A", 1.0, 0.01), ("B", 2.0, 0.02)]);
        let grouper = QuantileGrouper::new(3, 90.0, 10.0).unwrap();
        let returns = BucketReturns::calculate(&o, &grouper.partition(&o));

        assert!(returns.groups[0].value().is_some());
        assert!(returns.groups[1].value().is_some());
        assert!(returns.groups[2].is_missing());
    }

    #[test]
    fn test_empty_cohort_makes_spread_missing() {
        let o = obs(1, &[("A", 1.0, 0.01), ("B", 2.0, 0.02), ("C", 3.0, 0.03)]);
        let grouper = QuantileGrouper::new(1, 90.0, 10.0).unwrap();
        let part = grouper.partition(&o);

        let empty = BucketPartition {
            groups: part.groups.clone(),
            cohort: Default::default(),
        };
        let returns = BucketReturns::calculate(&o, &empty);
        assert!(returns.long.is_missing());
        assert!(returns.long_short.is_missing());
        assert!(returns.excess.is_missing());
        assert!(returns.benchmark.value().is_some());
    }

    #[test]
    fn test_set_turnover() {
        let a: BTreeSet<&str> = ["A", "B"].into_iter().collect();
        let b: BTreeSet<&str> = ["A", "B"].into_iter().collect();
        let c: BTreeSet<&str> = ["C", "D"].into_iter().collect();
        let empty: BTreeSet<&str> = BTreeSet::new();

        assert_eq!(set_turnover(&a, &b), 0.0);
        assert_eq!(set_turnover(&a, &c), 1.0);
        assert_eq!(set_turnover(&empty, &empty), 0.0);
        assert_eq!(set_turnover(&a, &empty), 1.0);
    }

    #[test]
    fn test_aggregate_turnover_skips_degenerate_buckets() {
        let mut f = ronda_traits::Panel::new();
        let mut r = ronda_traits::Panel::new();
        // Bucket 1: D on top. Bucket 2: degenerate. Bucket 3: D on top again.
        for (a, v) in [("A", 1.0), ("B", 2.0), ("C", 3.0), ("D", 4.0)] {
            f.insert(day(1), a, v);
            r.insert(day(1), a, 0.01);
            f.insert(day(3), a, v);
            r.insert(day(3), a, 0.02);
        }
        f.insert(day(2), "A", 1.0);
        r.insert(day(2), "A", 0.05);
        // Bucket 4: C on top
        for (a, v) in [("A", 1.0), ("B", 2.0), ("C", 5.0), ("D", 4.0)] {
            f.insert(day(4), a, v);
            r.insert(day(4), a, 0.0);
        }

        let aligned = crate::align::align(&f, &r, 2).unwrap();
        let grouper = QuantileGrouper::new(2, 90.0, 10.0).unwrap();
        let series = PortfolioAggregator::new(grouper).aggregate(&aligned);

        let turnover: Vec<Observation> = series.long_turnover.values().collect();
        assert_eq!(
            turnover,
            vec![
                Observation::Missing,
                Observation::Missing,
                Observation::Value(0.0),
                Observation::Value(1.0),
            ]
        );
        assert!(series.group_returns[0].get(&day(2)).unwrap().is_missing());
        assert_eq!(series.group_returns.len(), 2);
        assert!(
            series
                .long_turnover
                .observed()
                .all(|t| (0.0..=1.0).contains(&t))
        );
    }

    #[test]
    fn test_long_short_book_turnover_counts_sides() {
        let grouper = QuantileGrouper::new(2, 90.0, 10.0).unwrap();
        let mut tracker = TurnoverTracker::new();

        let first = obs(1, &[("A", 1.0, 0.0), ("B", 2.0, 0.0), ("C", 3.0, 0.0)]);
        let (l, b) = tracker.update(&first, &grouper.partition(&first));
        assert!(l.is_missing() && b.is_missing());

        // A and C swap sides: long {A}, short {C}
        let second = obs(2, &[("A", 3.0, 0.0), ("B", 2.0, 0.0), ("C", 1.0, 0.0)]);
        let (l, b) = tracker.update(&second, &grouper.partition(&second));
        assert_eq!(l, Observation::Value(1.0));
        assert_eq!(b, Observation::Value(1.0));
    }
}
