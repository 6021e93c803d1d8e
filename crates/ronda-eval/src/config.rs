//! Evaluation configuration.
//!
//! [`EvaluatorConfig`] is the plain, serializable record users fill in.
//! [`EvaluatorConfig::validate`] checks it once and yields a
//! [`ValidatedConfig`], the only form the engine accepts.

use ronda_traits::{Result, RondaError};
use serde::{Deserialize, Serialize};

/// Configuration for a factor evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorConfig {
    /// Number of quantile groups
    pub group_num: usize,
    /// Factor percentile rank at or above which an asset joins the long cohort
    pub long_percentile: f64,
    /// Factor percentile rank at or below which an asset joins the short cohort
    pub short_percentile: f64,
    /// Number of buckets per year, used to annualize returns.
    ///
    /// Defaults to 252, which assumes one bucket per trading day. Intraday or
    /// weekly buckets must set this explicitly.
    pub bucket_to_year_scale: f64,
    /// Negate factor values before evaluation
    pub invert_factor: bool,
    /// Buckets with fewer aligned assets than this are degenerate
    pub min_aligned_assets: usize,
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        Self {
            group_num: 10,
            long_percentile: 90.0,
            short_percentile: 10.0,
            bucket_to_year_scale: 252.0,
            invert_factor: false,
            min_aligned_assets: 2,
        }
    }
}

impl EvaluatorConfig {
    /// Validates every field and returns the engine-ready configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RondaError::Configuration`] if:
    /// - `group_num` is zero
    /// - either percentile is outside `[0, 100]`, or `short_percentile >= long_percentile`
    /// - `bucket_to_year_scale` is not a positive finite number
    /// - `min_aligned_assets` is below 2
    ///
    /// # Example
    ///
    /// ```rust
    /// use ronda_eval::EvaluatorConfig;
    ///
    /// let config = EvaluatorConfig { group_num: 5, ..Default::default() }
    ///     .validate()
    ///     .unwrap();
    /// assert_eq!(config.group_num(), 5);
    ///
    /// let bad = EvaluatorConfig { short_percentile: 95.0, ..Default::default() };
    /// assert!(bad.validate().is_err());
    /// ```
    pub fn validate(self) -> Result<ValidatedConfig> {
        check_group_num(self.group_num)?;
        check_percentiles(self.long_percentile, self.short_percentile)?;

        if !self.bucket_to_year_scale.is_finite() || self.bucket_to_year_scale <= 0.0 {
            return Err(RondaError::Configuration(format!(
                "bucket_to_year_scale must be a positive number, got {}",
                self.bucket_to_year_scale
            )));
        }

        if self.min_aligned_assets < 2 {
            return Err(RondaError::Configuration(format!(
                "min_aligned_assets must be at least 2, got {}",
                self.min_aligned_assets
            )));
        }

        Ok(ValidatedConfig(self))
    }
}

pub(crate) fn check_group_num(group_num: usize) -> Result<()> {
    if group_num == 0 {
        return Err(RondaError::Configuration(
            "group_num must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

pub(crate) fn check_percentiles(long: f64, short: f64) -> Result<()> {
    let in_range = |p: f64| (0.0..=100.0).contains(&p);
    if !in_range(long) || !in_range(short) {
        return Err(RondaError::Configuration(format!(
            "percentile thresholds must lie in [0, 100], got long={long}, short={short}"
        )));
    }
    if short >= long {
        return Err(RondaError::Configuration(format!(
            "short_percentile ({short}) must be below long_percentile ({long})"
        )));
    }
    Ok(())
}

/// An [`EvaluatorConfig`] that passed validation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ValidatedConfig(EvaluatorConfig);

impl ValidatedConfig {
    /// Number of quantile groups (at least 1).
    pub const fn group_num(&self) -> usize {
        self.0.group_num
    }

    /// Long cohort threshold in percent.
    pub const fn long_percentile(&self) -> f64 {
        self.0.long_percentile
    }

    /// Short cohort threshold in percent.
    pub const fn short_percentile(&self) -> f64 {
        self.0.short_percentile
    }

    /// Buckets per year.
    pub const fn bucket_to_year_scale(&self) -> f64 {
        self.0.bucket_to_year_scale
    }

    /// Whether factor values are negated before evaluation.
    pub const fn invert_factor(&self) -> bool {
        self.0.invert_factor
    }

    /// Minimum aligned assets for a non-degenerate bucket.
    pub const fn min_aligned_assets(&self) -> usize {
        self.0.min_aligned_assets
    }

    /// The underlying configuration record.
    pub const fn as_config(&self) -> &EvaluatorConfig {
        &self.0
    }
}

impl TryFrom<EvaluatorConfig> for ValidatedConfig {
    type Error = RondaError;

    fn try_from(config: EvaluatorConfig) -> Result<Self> {
        config.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EvaluatorConfig::default();
        assert_eq!(config.group_num, 10);
        assert_eq!(config.long_percentile, 90.0);
        assert_eq!(config.short_percentile, 10.0);
        assert!(!config.invert_factor);

        let validated = config.validate().unwrap();
        assert_eq!(validated.min_aligned_assets(), 2);
    }

    #[test]
    fn test_zero_groups_rejected() {
        let config = EvaluatorConfig {
            group_num: 0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_percentiles_out_of_range_rejected() {
        for (long, short) in [(101.0, 10.0), (90.0, -1.0), (f64::NAN, 10.0)] {
            let config = EvaluatorConfig {
                long_percentile: long,
                short_percentile: short,
                ..Default::default()
            };
            assert!(config.validate().is_err(), "long={long} short={short}");
        }
    }

    #[test]
    fn test_short_not_below_long_rejected() {
        let config = EvaluatorConfig {
            long_percentile: 50.0,
            short_percentile: 50.0,
            ..Default::default()
        };
        assert!(config.validate().unwrap_err().is_configuration());
    }

    #[test]
    fn test_scale_and_min_assets_rejected() {
        let config = EvaluatorConfig {
            bucket_to_year_scale: 0.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = EvaluatorConfig {
            min_aligned_assets: 1,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: EvaluatorConfig =
            serde_json::from_str(r#"{"group_num": 5, "bucket_to_year_scale": 52.0}"#).unwrap();
        assert_eq!(config.group_num, 5);
        assert_eq!(config.bucket_to_year_scale, 52.0);
        assert_eq!(config.long_percentile, 90.0);
    }
}
