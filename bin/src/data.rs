//! Data loading utilities for the ronda CLI.
//!
//! Panels are read from wide CSV files: the first column holds the bucket,
//! every other column is one asset, and empty cells are missing values.

use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use ronda_traits::{Bucket, Panel, RondaError};
use std::collections::BTreeMap;
use std::path::Path;

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y/%m/%d %H:%M:%S"];
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"];

/// Load a wide CSV file into a panel.
///
/// With `normalize_ids`, exchange suffixes are stripped from asset columns
/// (`000001.SZ` becomes `000001`).
pub(crate) fn load_panel(path: &Path, normalize_ids: bool) -> Result<Panel> {
    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(10_000))
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .with_context(|| format!("failed to open {}", path.display()))?
        .finish()
        .with_context(|| format!("failed to parse {}", path.display()))?;

    let panel = panel_from_frame(&df, normalize_ids)
        .with_context(|| format!("invalid panel in {}", path.display()))?;

    tracing::debug!(
        path = %path.display(),
        n_buckets = panel.n_buckets(),
        n_values = panel.len(),
        "loaded panel"
    );

    Ok(panel)
}

/// Convert a wide frame (bucket column followed by asset columns) into a panel.
pub(crate) fn panel_from_frame(df: &DataFrame, normalize_ids: bool) -> Result<Panel> {
    let columns = df.get_columns();
    let Some((bucket_col, asset_cols)) = columns.split_first() else {
        return Err(RondaError::InvalidData("panel file has no columns".to_string()).into());
    };
    if asset_cols.is_empty() {
        return Err(RondaError::InvalidData("panel file has no asset columns".to_string()).into());
    }

    let bucket_strings = bucket_col.as_materialized_series().cast(&DataType::String)?;
    let buckets = bucket_strings
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, cell)| {
            let cell = cell.ok_or_else(|| {
                RondaError::InvalidData(format!("missing bucket in row {}", row + 1))
            })?;
            parse_bucket(cell)
        })
        .collect::<std::result::Result<Vec<Bucket>, RondaError>>()?;

    let mut panel = Panel::new();
    let mut sources: BTreeMap<&str, &str> = BTreeMap::new();
    for col in asset_cols {
        let name = col.name().as_str();
        let asset = if normalize_ids {
            normalize_asset_id(name)
        } else {
            name
        };
        if let Some(previous) = sources.insert(asset, name) {
            return Err(RondaError::InvalidData(format!(
                "columns '{previous}' and '{name}' both map to asset '{asset}'"
            ))
            .into());
        }

        let values = col.as_materialized_series().cast(&DataType::Float64)?;
        for (bucket, value) in buckets.iter().zip(values.f64()?.into_iter()) {
            if let Some(v) = value {
                panel.insert(*bucket, asset, v);
            }
        }
    }

    Ok(panel)
}

/// Parse a bucket label: a date-time or a date (read as midnight).
pub(crate) fn parse_bucket(s: &str) -> std::result::Result<Bucket, RondaError> {
    let s = s.trim();
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| RondaError::InvalidData(format!("unrecognized bucket '{s}'")))
}

/// Strip an exchange suffix from an asset id.
pub(crate) fn normalize_asset_id(id: &str) -> &str {
    match id.split_once('.') {
        Some((code, _)) if !code.is_empty() => code,
        _ => id,
    }
}
