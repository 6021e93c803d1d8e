#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! # Examples
//!
//! ```rust
//! use chrono::NaiveDate;
//! use ronda_smooth::{SmoothingMethod, SmoothingPipeline};
//! use ronda_traits::Panel;
//!
//! let t = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let mut factor = Panel::new();
//! factor.insert(t(1), "A", 1.0);
//! factor.insert(t(2), "A", 3.0);
//!
//! let methods: Vec<SmoothingMethod> = vec!["mean:2".parse().unwrap()];
//! let smoothed = SmoothingPipeline::from_methods(&methods).unwrap().apply(&factor);
//! assert_eq!(smoothed.get(&t(2), "A"), Some(2.0));
//! ```

mod ema;
mod pipeline;
mod rolling;
mod smoother;

// Re-export main types
pub use ema::Ema;
pub use pipeline::{SmoothingMethod, SmoothingPipeline};
pub use rolling::{RollingMean, RollingStd, ZScore};
pub use smoother::Smoother;
