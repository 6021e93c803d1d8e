//! CLI subcommand modules.
//!
//! This module contains the implementations for all ronda CLI subcommands.

pub(crate) mod eval;
pub(crate) mod summary;

use crate::data;
use anyhow::Result;
use clap::Args;
use ronda_traits::Panel;
use std::path::PathBuf;

/// Input files shared by every subcommand.
#[derive(Debug, Args)]
pub(crate) struct PanelArgs {
    /// Wide CSV of factor values (first column bucket, one column per asset)
    #[arg(short, long)]
    pub(crate) factor: PathBuf,

    /// Wide CSV of forward returns, same layout as the factor file
    #[arg(short, long)]
    pub(crate) returns: PathBuf,

    /// Keep exchange suffixes (e.g. `.SZ`) on return-panel asset ids
    #[arg(long)]
    pub(crate) keep_suffix: bool,
}

impl PanelArgs {
    /// Load the factor and return panels.
    pub(crate) fn load(&self) -> Result<(Panel, Panel)> {
        let factor = data::load_panel(&self.factor, false)?;
        let returns = data::load_panel(&self.returns, !self.keep_suffix)?;
        Ok((factor, returns))
    }
}
