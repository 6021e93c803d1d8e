//! Trailing-window smoothers.
//!
//! Windows have a minimum of one period: the first points of an asset use
//! whatever history exists so far.

use ndarray::ArrayView1;
use ronda_traits::stats::is_degenerate_std;
use ronda_traits::{Observation, Result, RondaError};
use serde::{Deserialize, Serialize};

use crate::smoother::Smoother;

pub(crate) fn check_window(window: usize) -> Result<()> {
    if window == 0 {
        return Err(RondaError::Configuration(
            "smoothing window must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// The trailing window ending at `i`, at most `window` long.
fn trailing(values: &[f64], i: usize, window: usize) -> ArrayView1<'_, f64> {
    let start = (i + 1).saturating_sub(window);
    ArrayView1::from(&values[start..=i])
}

/// Sample standard deviation of a window; undefined for a single point.
fn window_std(view: ArrayView1<'_, f64>) -> Option<f64> {
    (view.len() >= 2).then(|| view.std(1.0))
}

/// Trailing mean over `window` observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingMean {
    window: usize,
}

impl RollingMean {
    /// Create a rolling mean.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `window` is zero.
    pub fn new(window: usize) -> Result<Self> {
        check_window(window)?;
        Ok(Self { window })
    }

    /// Window length.
    pub const fn window(&self) -> usize {
        self.window
    }
}

impl Smoother for RollingMean {
    fn smooth_series(&self, values: &[f64]) -> Vec<Observation> {
        (0..values.len())
            .map(|i| Observation::from(trailing(values, i, self.window).mean()))
            .collect()
    }

    fn name(&self) -> String {
        format!("rolling_mean({})", self.window)
    }
}

/// Trailing sample standard deviation over `window` observations.
///
/// The first point of every asset has no defined value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollingStd {
    window: usize,
}

impl RollingStd {
    /// Create a rolling standard deviation.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `window` is zero.
    pub fn new(window: usize) -> Result<Self> {
        check_window(window)?;
        Ok(Self { window })
    }

    /// Window length.
    pub const fn window(&self) -> usize {
        self.window
    }
}

impl Smoother for RollingStd {
    fn smooth_series(&self, values: &[f64]) -> Vec<Observation> {
        (0..values.len())
            .map(|i| Observation::from(window_std(trailing(values, i, self.window))))
            .collect()
    }

    fn name(&self) -> String {
        format!("rolling_std({})", self.window)
    }
}

/// Distance from the trailing mean in units of trailing standard deviation.
///
/// Zero where the standard deviation is zero or undefined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZScore {
    window: usize,
}

impl ZScore {
    /// Create a rolling z-score.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `window` is zero.
    pub fn new(window: usize) -> Result<Self> {
        check_window(window)?;
        Ok(Self { window })
    }

    /// Window length.
    pub const fn window(&self) -> usize {
        self.window
    }
}

impl Smoother for ZScore {
    fn smooth_series(&self, values: &[f64]) -> Vec<Observation> {
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let view = trailing(values, i, self.window);
                let mean = view.mean().unwrap_or(v);
                match window_std(view) {
                    Some(std) if !is_degenerate_std(std) => Observation::from_finite((v - mean) / std),
                    _ => Observation::Value(0.0),
                }
            })
            .collect()
    }

    fn name(&self) -> String {
        format!("zscore({})", self.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn values(obs: &[Observation]) -> Vec<Option<f64>> {
        obs.iter().map(|o| o.value()).collect()
    }

    #[test]
    fn test_rolling_mean_min_periods_one() {
        let out = RollingMean::new(3).unwrap().smooth_series(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(values(&out), vec![Some(1.0), Some(1.5), Some(2.0), Some(3.0), Some(4.0)]);
    }

    #[test]
    fn test_rolling_mean_window_one_is_identity() {
        let input = [0.3, -1.0, 2.5];
        let out = RollingMean::new(1).unwrap().smooth_series(&input);
        assert_eq!(values(&out), input.map(Some).to_vec());
    }

    #[test]
    fn test_rolling_std() {
        let out = RollingStd::new(2).unwrap().smooth_series(&[1.0, 3.0, 3.0]);
        assert!(out[0].is_missing());
        assert_relative_eq!(out[1].value().unwrap(), 2.0_f64.sqrt());
        assert_relative_eq!(out[2].value().unwrap(), 0.0);
    }

    #[test]
    fn test_zscore() {
        let out = ZScore::new(3).unwrap().smooth_series(&[1.0, 1.0, 4.0]);
        // First point has no std; second has zero std
        assert_eq!(out[0], Observation::Value(0.0));
        assert_eq!(out[1], Observation::Value(0.0));
        // mean 2, sample std sqrt(3)
        assert_relative_eq!(out[2].value().unwrap(), 2.0 / 3.0_f64.sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_zero_window_rejected() {
        assert!(RollingMean::new(0).unwrap_err().is_configuration());
        assert!(RollingStd::new(0).unwrap_err().is_configuration());
        assert!(ZScore::new(0).unwrap_err().is_configuration());
    }
}
