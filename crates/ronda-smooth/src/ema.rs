//! Exponential moving average.

use ronda_traits::{Observation, Result, RondaError};
use serde::{Deserialize, Serialize};

use crate::smoother::Smoother;

/// Recursive exponential moving average: `y[0] = x[0]`,
/// `y[t] = alpha * x[t] + (1 - alpha) * y[t-1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ema {
    alpha: f64,
}

impl Ema {
    /// Create an EMA with smoothing factor `alpha`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless `0 < alpha <= 1`.
    pub fn new(alpha: f64) -> Result<Self> {
        if !(alpha > 0.0 && alpha <= 1.0) {
            return Err(RondaError::Configuration(format!(
                "EMA alpha must lie in (0, 1], got {alpha}"
            )));
        }
        Ok(Self { alpha })
    }

    /// EMA whose weights decay like a `span`-period window: `alpha = 2 / (span + 1)`.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `span` is zero.
    pub fn from_span(span: usize) -> Result<Self> {
        crate::rolling::check_window(span)?;
        Self::new(2.0 / (span as f64 + 1.0))
    }

    /// Smoothing factor.
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }
}

impl Smoother for Ema {
    fn smooth_series(&self, values: &[f64]) -> Vec<Observation> {
        let mut prev: Option<f64> = None;
        values
            .iter()
            .map(|&x| {
                let y = prev.map_or(x, |p| self.alpha.mul_add(x, (1.0 - self.alpha) * p));
                prev = Some(y);
                Observation::from_finite(y)
            })
            .collect()
    }

    fn name(&self) -> String {
        format!("ema({})", self.alpha)
    }
}
