//! Core trait definition for factor smoothers.

use ronda_traits::{FactorPanel, Observation, Panel};

/// Transforms each asset's factor history independently.
///
/// Implementors only describe how one asset's chronological sequence of
/// finite values is transformed. [`Smoother::smooth`] applies that to every
/// asset of a panel; a point that comes out missing is dropped from the
/// output panel. All implementations must be thread-safe (Send + Sync).
///
/// # Examples
///
/// ```rust
/// use ronda_smooth::Smoother;
/// use ronda_traits::Observation;
///
/// struct Demean;
///
/// impl Smoother for Demean {
///     fn smooth_series(&self, values: &[f64]) -> Vec<Observation> {
///         let mean = values.iter().sum::<f64>() / values.len() as f64;
///         values.iter().map(|v| Observation::from_finite(v - mean)).collect()
///     }
///
///     fn name(&self) -> String {
///         "demean".to_string()
///     }
/// }
/// ```
pub trait Smoother: Send + Sync {
    /// Transform one asset's values, given oldest first.
    ///
    /// # Returns
    ///
    /// One observation per input value, in the same order.
    fn smooth_series(&self, values: &[f64]) -> Vec<Observation>;

    /// Short label including parameters, used for logging.
    fn name(&self) -> String;

    /// Apply the transform to every asset of a panel.
    ///
    /// Non-finite input values are skipped before the transform sees the
    /// asset's sequence, so a gap never breaks a rolling window.
    fn smooth(&self, panel: &FactorPanel) -> FactorPanel {
        let mut out = Panel::new();
        for (asset, points) in panel.asset_series() {
            let values: Vec<f64> = points.iter().map(|(_, v)| *v).collect();
            let smoothed = self.smooth_series(&values);
            for ((bucket, _), obs) in points.iter().zip(smoothed) {
                if let Observation::Value(v) = obs {
                    out.insert(*bucket, asset, v);
                }
            }
        }
        out
    }
}
