//! ronda CLI binary.
//!
//! Provides command-line interface for the ronda factor evaluation engine.

mod cmd;
mod data;
mod report;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ronda")]
#[command(about = "Evaluate the predictive power of factor panels", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a factor panel against forward returns
    Eval(cmd::eval::EvalArgs),

    /// Show how a factor panel aligns with a return panel
    Summary(cmd::summary::SummaryArgs),
}

fn main() {
    dotenvy::dotenv().ok();
    init_logging();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

/// Log to stderr so JSON on stdout stays parseable. `RONDA_LOG` takes
/// precedence over `RUST_LOG`.
fn init_logging() {
    let filter = EnvFilter::try_from_env("RONDA_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Eval(args) => cmd::eval::run(&args)?,
        Commands::Summary(args) => cmd::summary::run(&args)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_eval_flags() {
        let cli = Cli::try_parse_from([
            "ronda", "eval", "--factor", "f.csv", "--returns", "r.csv", "--groups", "5",
            "--smooth", "mean:3", "--smooth", "ema:0.5", "--format", "json",
        ])
        .unwrap();

        let Commands::Eval(args) = cli.command else {
            panic!("expected eval subcommand");
        };
        assert_eq!(args.groups, Some(5));
        assert_eq!(args.smooth.len(), 2);
        assert_eq!(args.format, report::OutputFormat::Json);
    }

    #[test]
    fn test_parse_rejects_bad_smoothing() {
        let result = Cli::try_parse_from([
            "ronda", "eval", "--factor", "f.csv", "--returns", "r.csv", "--smooth", "median:3",
        ]);
        assert!(result.is_err());
    }
}
