//! Quantile grouping and long/short cohort selection.
//!
//! Within a bucket, assets are sorted by factor value ascending with ties
//! broken by asset id. The sorted sequence is cut into `G` contiguous groups
//! whose sizes differ by at most one, earlier groups absorbing the remainder.
//! Independently, each asset's percentile rank in the same order decides
//! long/short cohort membership.

use crate::align::AlignedObservation;
use crate::config::{ValidatedConfig, check_group_num, check_percentiles};
use ronda_traits::{AssetId, Result};
use std::collections::BTreeSet;

/// Sizes of `group_num` groups partitioning `n` assets.
///
/// # Example
///
/// ```rust
/// use ronda_eval::group::group_sizes;
///
/// assert_eq!(group_sizes(10, 3), vec![4, 3, 3]);
/// assert_eq!(group_sizes(2, 4), vec![1, 1, 0, 0]);
/// ```
pub fn group_sizes(n: usize, group_num: usize) -> Vec<usize> {
    if group_num == 0 {
        return Vec::new();
    }
    let base = n / group_num;
    let remainder = n % group_num;
    (0..group_num)
        .map(|g| base + usize::from(g < remainder))
        .collect()
}

/// Percentile rank in `[0, 100]` of the asset at `position` in an ascending
/// order of `n` assets: `100 * position / (n - 1)`.
///
/// With distinct values this matches the linear-interpolation percentile
/// convention: the asset at `position` is at or above the `p`-th percentile
/// exactly when its rank is at least `p`.
pub const fn percentile_rank(position: usize, n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    100.0 * position as f64 / (n - 1) as f64
}

/// Group membership for one bucket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupAssignment {
    /// Per group, positions into the aligned observation
    members: Vec<Vec<usize>>,
    /// Per aligned asset position, its group
    labels: Vec<usize>,
}

impl GroupAssignment {
    /// Number of groups (including empty ones).
    pub fn group_num(&self) -> usize {
        self.members.len()
    }

    /// Positions (into the aligned observation) of the assets in `group`.
    pub fn members(&self, group: usize) -> &[usize] {
        self.members.get(group).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Group index of the asset at `position` of the aligned observation.
    pub fn group_of(&self, position: usize) -> Option<usize> {
        self.labels.get(position).copied()
    }

    /// Group index of an asset by id.
    pub fn group_of_asset(&self, obs: &AlignedObservation, asset: &str) -> Option<usize> {
        let position = obs
            .assets()
            .binary_search_by(|a| a.as_str().cmp(asset))
            .ok()?;
        self.group_of(position)
    }

    /// Size of every group.
    pub fn sizes(&self) -> Vec<usize> {
        self.members.iter().map(Vec::len).collect()
    }
}

/// Long and short cohorts for one bucket.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LongShortCohort {
    long: Vec<usize>,
    short: Vec<usize>,
}

impl LongShortCohort {
    /// Positions of the long cohort, ascending factor order.
    pub fn long(&self) -> &[usize] {
        &self.long
    }

    /// Positions of the short cohort, ascending factor order.
    pub fn short(&self) -> &[usize] {
        &self.short
    }

    /// Asset ids of the long cohort.
    pub fn long_assets(&self, obs: &AlignedObservation) -> BTreeSet<AssetId> {
        self.long.iter().map(|&i| obs.assets()[i].clone()).collect()
    }

    /// Asset ids of the short cohort.
    pub fn short_assets(&self, obs: &AlignedObservation) -> BTreeSet<AssetId> {
        self.short.iter().map(|&i| obs.assets()[i].clone()).collect()
    }
}

/// Groups and cohorts for one bucket, derived from one sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketPartition {
    /// Quantile group membership
    pub groups: GroupAssignment,
    /// Long/short cohorts
    pub cohort: LongShortCohort,
}

/// Assigns assets to quantile groups and long/short cohorts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuantileGrouper {
    group_num: usize,
    long_percentile: f64,
    short_percentile: f64,
}

impl QuantileGrouper {
    /// Creates a grouper.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `group_num` is zero, either threshold
    /// is outside `[0, 100]`, or `short_percentile >= long_percentile`.
    pub fn new(group_num: usize, long_percentile: f64, short_percentile: f64) -> Result<Self> {
        check_group_num(group_num)?;
        check_percentiles(long_percentile, short_percentile)?;
        Ok(Self {
            group_num,
            long_percentile,
            short_percentile,
        })
    }

    /// Creates a grouper from an already validated configuration.
    pub const fn from_config(config: &ValidatedConfig) -> Self {
        Self {
            group_num: config.group_num(),
            long_percentile: config.long_percentile(),
            short_percentile: config.short_percentile(),
        }
    }

    /// Number of groups.
    pub const fn group_num(&self) -> usize {
        self.group_num
    }

    /// Positions of the observation's assets sorted by (factor, asset id).
    pub fn sort_order(obs: &AlignedObservation) -> Vec<usize> {
        let factors = obs.factors();
        let assets = obs.assets();
        let mut order: Vec<usize> = (0..obs.len()).collect();
        // Adding 0.0 folds -0.0 into 0.0 so signed zeros tie on asset id
        order.sort_unstable_by(|&a, &b| {
            (factors[a] + 0.0)
                .total_cmp(&(factors[b] + 0.0))
                .then_with(|| assets[a].cmp(&assets[b]))
        });
        order
    }

    /// Quantile groups of one bucket.
    pub fn assign(&self, obs: &AlignedObservation) -> GroupAssignment {
        self.partition(obs).groups
    }

    /// Long/short cohorts of one bucket.
    pub fn cohorts(&self, obs: &AlignedObservation) -> LongShortCohort {
        self.partition(obs).cohort
    }

    /// Quantile groups and long/short cohorts of one bucket.
    pub fn partition(&self, obs: &AlignedObservation) -> BucketPartition {
        let order = Self::sort_order(obs);
        let n = order.len();

        let mut members = Vec::with_capacity(self.group_num);
        let mut labels = vec![0; n];
        let mut start = 0;
        for (group, size) in group_sizes(n, self.group_num).into_iter().enumerate() {
            let slice = &order[start..start + size];
            for &pos in slice {
                labels[pos] = group;
            }
            members.push(slice.to_vec());
            start += size;
        }

        let mut cohort = LongShortCohort::default();
        for (rank_pos, &pos) in order.iter().enumerate() {
            let pct = percentile_rank(rank_pos, n);
            if pct >= self.long_percentile {
                cohort.long.push(pos);
            }
            if pct <= self.short_percentile {
                cohort.short.push(pos);
            }
        }

        BucketPartition {
            groups: GroupAssignment { members, labels },
            cohort,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn obs(rows: &[(&str, f64)]) -> AlignedObservation {
        let bucket = NaiveDate::from_ymd_opt(2024, 1, 2)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        AlignedObservation::new(
            bucket,
            rows.iter().map(|(a, f)| (a.to_string(), *f, 0.0)),
            2,
        )
    }

    fn ids(o: &AlignedObservation, positions: &[usize]) -> Vec<String> {
        positions.iter().map(|&p| o.assets()[p].clone()).collect()
    }

    #[test]
    fn test_group_sizes_balanced() {
        for n in 0..40 {
            for g in 1..12 {
                let sizes = group_sizes(n, g);
                assert_eq!(sizes.len(), g);
                assert_eq!(sizes.iter().sum::<usize>(), n);
                let max = *sizes.iter().max().unwrap();
                let min = *sizes.iter().min().unwrap();
                assert!(max - min <= 1, "n={n} g={g} sizes={sizes:?}");
                // Earlier groups take the remainder
                assert!(sizes.windows(2).all(|w| w[0] >= w[1]));
            }
        }
    }

    #[test]
    fn test_partition_two_groups() {
        let o = obs(&[("D", 4.0), ("A", 1.0), ("C", 3.0), ("B", 2.0)]);
        let grouper = QuantileGrouper::new(2, 90.0, 10.0).unwrap();
        let groups = grouper.assign(&o);

        assert_eq!(ids(&o, groups.members(0)), vec!["A", "B"]);
        assert_eq!(ids(&o, groups.members(1)), vec!["C", "D"]);
        assert_eq!(groups.group_of_asset(&o, "C"), Some(1));
        assert_eq!(groups.group_of_asset(&o, "Z"), None);
    }

    #[test]
    fn test_ties_broken_by_asset_id() {
        let o = obs(&[("C", 1.0), ("A", 1.0), ("B", 1.0), ("D", 1.0)]);
        let grouper = QuantileGrouper::new(2, 90.0, 10.0).unwrap();
        let part = grouper.partition(&o);

        assert_eq!(ids(&o, part.groups.members(0)), vec!["A", "B"]);
        assert_eq!(ids(&o, part.groups.members(1)), vec!["C", "D"]);
        assert_eq!(part.cohort.long_assets(&o).into_iter().collect::<Vec<_>>(), vec!["D"]);
        assert_eq!(part.cohort.short_assets(&o).into_iter().collect::<Vec<_>>(), vec!["A"]);
    }

    #[test]
    fn test_signed_zeros_tie_on_asset_id() {
        let o = obs(&[("A", 0.0), ("B", -0.0)]);
        let grouper = QuantileGrouper::new(2, 90.0, 10.0).unwrap();
        let part = grouper.partition(&o);

        assert_eq!(ids(&o, part.groups.members(0)), vec!["A"]);
        assert_eq!(ids(&o, part.groups.members(1)), vec!["B"]);
        assert_eq!(part.cohort.short_assets(&o).into_iter().collect::<Vec<_>>(), vec!["A"]);
        assert_eq!(part.cohort.long_assets(&o).into_iter().collect::<Vec<_>>(), vec!["B"]);
    }

    #[test]
    fn test_fewer_assets_than_groups_leaves_empty_groups() {
        let o = obs(&[("A", 1.0), ("B", 2.0), ("C", 3.0)]);
        let grouper = QuantileGrouper::new(5, 90.0, 10.0).unwrap();
        let groups = grouper.assign(&o);

        assert_eq!(groups.sizes(), vec![1, 1, 1, 0, 0]);
        assert!(groups.members(4).is_empty());
        assert!(groups.members(99).is_empty());
    }

    #[test]
    fn test_cohorts_use_percentile_rank() {
        let rows: Vec<(String, f64)> = (0..21).map(|i| (format!("S{i:02}"), i as f64)).collect();
        let rows: Vec<(&str, f64)> = rows.iter().map(|(a, f)| (a.as_str(), *f)).collect();
        let o = obs(&rows);
        let grouper = QuantileGrouper::new(10, 90.0, 10.0).unwrap();
        let cohort = grouper.cohorts(&o);

        // Ranks 0, 5, ..., 100: positions 18..=20 are >= 90, 0..=2 are <= 10
        assert_eq!(ids(&o, cohort.long()), vec!["S18", "S19", "S20"]);
        assert_eq!(ids(&o, cohort.short()), vec!["S00", "S01", "S02"]);
    }

    #[test]
    fn test_percentile_rank_bounds() {
        assert_eq!(percentile_rank(0, 5), 0.0);
        assert_eq!(percentile_rank(4, 5), 100.0);
        assert_eq!(percentile_rank(2, 5), 50.0);
        assert_eq!(percentile_rank(0, 1), 0.0);
    }

    #[test]
    fn test_grouper_rejects_bad_parameters() {
        assert!(QuantileGrouper::new(0, 90.0, 10.0).is_err());
        assert!(QuantileGrouper::new(10, 120.0, 10.0).is_err());
        assert!(QuantileGrouper::new(10, 40.0, 60.0).is_err());
    }
}
