//! Chaining smoothers and describing them as data.

use ronda_traits::{FactorPanel, Result, RondaError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::ema::Ema;
use crate::rolling::{RollingMean, RollingStd, ZScore};
use crate::smoother::Smoother;

/// A smoothing step described by its parameters.
///
/// Parses from the compact `kind:param` form: `mean:5`, `std:5`, `zscore:20`,
/// `ema:0.3`.
///
/// # Examples
///
/// ```rust
/// use ronda_smooth::SmoothingMethod;
///
/// let method: SmoothingMethod = "zscore:20".parse().unwrap();
/// assert_eq!(method, SmoothingMethod::ZScore { window: 20 });
/// assert!("median:3".parse::<SmoothingMethod>().is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum SmoothingMethod {
    /// Trailing mean
    RollingMean {
        /// Window length
        window: usize,
    },
    /// Trailing sample standard deviation
    RollingStd {
        /// Window length
        window: usize,
    },
    /// Trailing z-score
    ZScore {
        /// Window length
        window: usize,
    },
    /// Exponential moving average
    Ema {
        /// Smoothing factor in (0, 1]
        alpha: f64,
    },
}

impl SmoothingMethod {
    /// Build the smoother, validating its parameter.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for a zero window or an alpha outside
    /// `(0, 1]`.
    pub fn build(self) -> Result<Box<dyn Smoother>> {
        Ok(match self {
            Self::RollingMean { window } => Box::new(RollingMean::new(window)?),
            Self::RollingStd { window } => Box::new(RollingStd::new(window)?),
            Self::ZScore { window } => Box::new(ZScore::new(window)?),
            Self::Ema { alpha } => Box::new(Ema::new(alpha)?),
        })
    }
}

impl fmt::Display for SmoothingMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RollingMean { window } => write!(f, "mean:{window}"),
            Self::RollingStd { window } => write!(f, "std:{window}"),
            Self::ZScore { window } => write!(f, "zscore:{window}"),
            Self::Ema { alpha } => write!(f, "ema:{alpha}"),
        }
    }
}

impl FromStr for SmoothingMethod {
    type Err = RondaError;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, param) = s.split_once(':').ok_or_else(|| {
            RondaError::Configuration(format!("smoothing spec '{s}' must look like kind:param"))
        })?;
        let param = param.trim();

        let window = || {
            param.parse::<usize>().map_err(|e| {
                RondaError::Configuration(format!("invalid window '{param}' in '{s}': {e}"))
            })
        };

        match kind.trim().to_ascii_lowercase().as_str() {
            "mean" | "rolling_mean" => Ok(Self::RollingMean { window: window()? }),
            "std" | "rolling_std" => Ok(Self::RollingStd { window: window()? }),
            "zscore" | "z" => Ok(Self::ZScore { window: window()? }),
            "ema" => {
                let alpha = param.parse::<f64>().map_err(|e| {
                    RondaError::Configuration(format!("invalid alpha '{param}' in '{s}': {e}"))
                })?;
                Ok(Self::Ema { alpha })
            }
            other => Err(RondaError::Configuration(format!(
                "unknown smoothing method '{other}' (expected mean, std, zscore or ema)"
            ))),
        }
    }
}

/// An ordered sequence of smoothers applied one after another.
#[derive(Default)]
pub struct SmoothingPipeline {
    steps: Vec<Box<dyn Smoother>>,
}

impl fmt::Debug for SmoothingPipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.steps.iter().map(|s| s.name()))
            .finish()
    }
}

impl SmoothingPipeline {
    /// Create an empty pipeline; applying it returns the panel unchanged.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a pipeline from method descriptions.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error among the methods.
    pub fn from_methods(methods: &[SmoothingMethod]) -> Result<Self> {
        let steps = methods
            .iter()
            .map(|m| m.build())
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { steps })
    }

    /// Append a step.
    pub fn with(mut self, step: impl Smoother + 'static) -> Self {
        self.steps.push(Box::new(step));
        self
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns whether the pipeline has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Apply every step in order.
    pub fn apply(&self, panel: &FactorPanel) -> FactorPanel {
        let mut current = panel.clone();
        for step in &self.steps {
            let before = current.len();
            current = step.smooth(&current);
            tracing::debug!(
                step = %step.name(),
                before,
                after = current.len(),
                "applied smoothing step"
            );
        }
        current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::NaiveDate;
    use ronda_traits::{Bucket, Panel};

    fn day(d: u32) -> Bucket {
        NaiveDate::from_ymd_opt(2024, 7, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_methods() {
        assert_eq!(
            "mean:5".parse::<SmoothingMethod>().unwrap(),
            SmoothingMethod::RollingMean { window: 5 }
        );
        assert_eq!(
            "std:10".parse::<SmoothingMethod>().unwrap(),
            SmoothingMethod::RollingStd { window: 10 }
        );
        assert_eq!(
            "EMA:0.3".parse::<SmoothingMethod>().unwrap(),
            SmoothingMethod::Ema { alpha: 0.3 }
        );
        assert!("mean".parse::<SmoothingMethod>().is_err());
        assert!("mean:x".parse::<SmoothingMethod>().is_err());
        assert!("mean:-1".parse::<SmoothingMethod>().is_err());
    }

    #[test]
    fn test_display_round_trips() {
        for spec in ["mean:5", "std:3", "zscore:20", "ema:0.25"] {
            let method: SmoothingMethod = spec.parse().unwrap();
            assert_eq!(method.to_string(), spec);
        }
    }

    #[test]
    fn test_method_serde() {
        let json = serde_json::to_string(&SmoothingMethod::Ema { alpha: 0.5 }).unwrap();
        assert_eq!(json, r#"{"method":"ema","alpha":0.5}"#);
        let back: SmoothingMethod = serde_json::from_str(r#"{"method":"z_score","window":4}"#).unwrap();
        assert_eq!(back, SmoothingMethod::ZScore { window: 4 });
    }

    #[test]
    fn test_build_validates() {
        assert!(SmoothingMethod::RollingMean { window: 0 }.build().is_err());
        assert!(SmoothingMethod::Ema { alpha: 2.0 }.build().is_err());
        assert!(SmoothingPipeline::from_methods(&[
            SmoothingMethod::RollingMean { window: 3 },
            SmoothingMethod::Ema { alpha: 0.0 },
        ])
        .is_err());
    }

    #[test]
    fn test_pipeline_applies_steps_in_order() {
        let mut panel = Panel::new();
        for (d, v) in [(1, 1.0), (2, 3.0), (3, 5.0)] {
            panel.insert(day(d), "A", v);
        }

        let pipeline = SmoothingPipeline::new()
            .with(RollingMean::new(2).unwrap())
            .with(RollingStd::new(2).unwrap());
        assert_eq!(pipeline.len(), 2);

        // Means: 1, 2, 4; std of (1, 2) and (2, 4)
        let out = pipeline.apply(&panel);
        assert_eq!(out.get(&day(1), "A"), None);
        assert_relative_eq!(out.get(&day(2), "A").unwrap(), 0.5_f64.sqrt());
        assert_relative_eq!(out.get(&day(3), "A").unwrap(), 2.0_f64.sqrt());
    }

    #[test]
    fn test_empty_pipeline_is_identity() {
        let mut panel = Panel::new();
        panel.insert(day(1), "A", 1.0);
        let pipeline = SmoothingPipeline::new();
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.apply(&panel), panel);
    }
}
