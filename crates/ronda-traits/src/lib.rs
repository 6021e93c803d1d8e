#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/ronda/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core type definitions for the ronda factor evaluation engine.
//!
//! This crate provides the foundational data model: time-bucketed panels of
//! per-asset values, the explicit "no observation" marker, and the error type
//! shared by the evaluation and smoothing crates.

/// The version of the ronda-traits crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Module declarations
pub mod error;
pub mod stats;
pub mod types;

// Re-exports
pub use error::{Result, RondaError};
pub use types::{AssetId, Bucket, FactorPanel, Observation, Panel, Point, ReturnPanel, TimeSeries};
