//! Alignment summary command implementation.

use super::PanelArgs;
use crate::report::{self, OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use ronda_eval::align;

/// Arguments of `ronda summary`.
#[derive(Debug, Args)]
pub(crate) struct SummaryArgs {
    #[command(flatten)]
    pub(crate) panels: PanelArgs,

    /// Buckets with fewer aligned assets than this are reported as degenerate
    #[arg(long, default_value_t = 2)]
    pub(crate) min_assets: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

/// Print how the two panels line up, without evaluating.
pub(crate) fn run(args: &SummaryArgs) -> Result<()> {
    let (factor, returns) = args.panels.load()?;
    let aligned = align(&factor, &returns, args.min_assets)?;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(aligned.summary())
                .context("failed to serialize alignment summary")?;
            println!("{json}");
        }
        OutputFormat::Text => report::print_alignment(aligned.summary()),
    }

    Ok(())
}
