//! Evaluation command implementation.

use super::PanelArgs;
use crate::report::{self, OutputFormat};
use anyhow::{Context, Result};
use clap::Args;
use ronda_eval::{EvaluatorConfig, FactorEvaluator};
use ronda_smooth::{SmoothingMethod, SmoothingPipeline};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Arguments of `ronda eval`.
#[derive(Debug, Args)]
pub(crate) struct EvalArgs {
    #[command(flatten)]
    pub(crate) panels: PanelArgs,

    /// JSON file with evaluator settings; flags override its fields
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Number of quantile groups
    #[arg(short, long)]
    pub(crate) groups: Option<usize>,

    /// Percentile rank at or above which assets are held long
    #[arg(long)]
    pub(crate) long: Option<f64>,

    /// Percentile rank at or below which assets are held short
    #[arg(long)]
    pub(crate) short: Option<f64>,

    /// Buckets per year, for annualization
    #[arg(long)]
    pub(crate) scale: Option<f64>,

    /// Negate factor values before evaluating
    #[arg(long)]
    pub(crate) invert: bool,

    /// Smoothing step applied to the factor first (mean:N, std:N, zscore:N, ema:ALPHA); repeatable
    #[arg(long)]
    pub(crate) smooth: Vec<SmoothingMethod>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub(crate) format: OutputFormat,
}

impl EvalArgs {
    /// Resolve the evaluator configuration: defaults, then file, then flags.
    ///
    /// Warns when the annualization scale falls back to its daily default.
    pub(crate) fn config(&self) -> Result<EvaluatorConfig> {
        let (config, scale_explicit) = self.resolve_config()?;
        if !scale_explicit {
            tracing::warn!(
                bucket_to_year_scale = config.bucket_to_year_scale,
                "annualization scale not set, assuming daily buckets; pass --scale for other frequencies"
            );
        }
        Ok(config)
    }

    /// The merged configuration, and whether the scale was set by the file or a flag.
    fn resolve_config(&self) -> Result<(EvaluatorConfig, bool)> {
        let (mut config, mut scale_explicit) = match &self.config {
            Some(path) => load_config(path)?,
            None => (EvaluatorConfig::default(), false),
        };

        if let Some(groups) = self.groups {
            config.group_num = groups;
        }
        if let Some(long) = self.long {
            config.long_percentile = long;
        }
        if let Some(short) = self.short {
            config.short_percentile = short;
        }
        if let Some(scale) = self.scale {
            config.bucket_to_year_scale = scale;
            scale_explicit = true;
        }
        if self.invert {
            config.invert_factor = true;
        }

        Ok((config, scale_explicit))
    }
}

/// Read a JSON config file; the flag reports whether it names the scale.
fn load_config(path: &Path) -> Result<(EvaluatorConfig, bool)> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))?;
    let scale_explicit = value.get("bucket_to_year_scale").is_some();
    let config = serde_json::from_value(value)
        .with_context(|| format!("invalid evaluator config in {}", path.display()))?;
    Ok((config, scale_explicit))
}

/// Evaluate a factor file against a return file and print the result.
pub(crate) fn run(args: &EvalArgs) -> Result<()> {
    let evaluator = FactorEvaluator::from_config(args.config()?)?;
    let pipeline = SmoothingPipeline::from_methods(&args.smooth)?;

    let (factor, returns) = args.panels.load()?;
    tracing::info!(
        factor_buckets = factor.n_buckets(),
        factor_assets = factor.assets().len(),
        return_buckets = returns.n_buckets(),
        return_assets = returns.assets().len(),
        "loaded panels"
    );

    let factor = if pipeline.is_empty() {
        factor
    } else {
        tracing::info!(steps = ?args.smooth, "smoothing factor panel");
        pipeline.apply(&factor)
    };

    let result = evaluator.evaluate(&factor, &returns)?;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&result)
                .context("failed to serialize evaluation result")?;
            println!("{json}");
        }
        OutputFormat::Text => report::print_evaluation(&result, evaluator.config()),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> EvalArgs {
        EvalArgs {
            panels: PanelArgs {
                factor: PathBuf::from("f.csv"),
                returns: PathBuf::from("r.csv"),
                keep_suffix: false,
            },
            config: None,
            groups: None,
            long: None,
            short: None,
            scale: None,
            invert: false,
            smooth: Vec::new(),
            format: OutputFormat::Text,
        }
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = EvalArgs {
            groups: Some(5),
            long: Some(80.0),
            invert: true,
            ..args()
        };
        let config = args.config().unwrap();
        assert_eq!(config.group_num, 5);
        assert_eq!(config.long_percentile, 80.0);
        assert_eq!(config.short_percentile, 10.0);
        assert!(config.invert_factor);
    }

    #[test]
    fn test_flags_override_config_file() {
        let path = std::env::temp_dir().join(format!("ronda-config-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"group_num": 4, "bucket_to_year_scale": 52.0}"#).unwrap();

        let args = EvalArgs {
            config: Some(path.clone()),
            groups: Some(3),
            ..args()
        };
        let config = args.config().unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.group_num, 3);
        assert_eq!(config.bucket_to_year_scale, 52.0);
        assert_eq!(config.long_percentile, 90.0);
    }

    #[test]
    fn test_scale_explicit_tracks_its_source() {
        let (config, explicit) = args().resolve_config().unwrap();
        assert_eq!(config.bucket_to_year_scale, 252.0);
        assert!(!explicit);

        let (_, explicit) = EvalArgs { scale: Some(48.0 * 252.0), ..args() }
            .resolve_config()
            .unwrap();
        assert!(explicit);

        let path = std::env::temp_dir().join(format!("ronda-scale-{}.json", std::process::id()));
        std::fs::write(&path, r#"{"group_num": 4}"#).unwrap();
        let without = EvalArgs { config: Some(path.clone()), ..args() }.resolve_config();
        std::fs::write(&path, r#"{"bucket_to_year_scale": 52.0}"#).unwrap();
        let with = EvalArgs { config: Some(path.clone()), ..args() }.resolve_config();
        std::fs::remove_file(&path).unwrap();

        assert!(!without.unwrap().1);
        let (config, explicit) = with.unwrap();
        assert!(explicit);
        assert_eq!(config.bucket_to_year_scale, 52.0);
    }

    #[test]
    fn test_end_to_end_on_csv_files() {
        let dir = std::env::temp_dir();
        let id = std::process::id();
        let factor = dir.join(format!("ronda-e2e-factor-{id}.csv"));
        let returns = dir.join(format!("ronda-e2e-returns-{id}.csv"));
        std::fs::write(&factor, "date,A,B,C,D\n2024-01-02,1,2,3,4\n2024-01-03,4,3,2,1\n").unwrap();
        std::fs::write(
            &returns,
            "date,A.SZ,B.SZ,C.SZ,D.SZ\n2024-01-02,0.01,0.02,-0.01,0.03\n2024-01-03,0.02,0.0,0.01,-0.01\n",
        )
        .unwrap();

        let args = EvalArgs {
            panels: PanelArgs {
                factor: factor.clone(),
                returns: returns.clone(),
                keep_suffix: false,
            },
            groups: Some(2),
            format: OutputFormat::Json,
            ..args()
        };
        let outcome = run(&args);
        std::fs::remove_file(&factor).unwrap();
        std::fs::remove_file(&returns).unwrap();
        outcome.unwrap();
    }
}
