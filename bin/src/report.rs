//! Text rendering of evaluation results.

use clap::ValueEnum;
use ronda_eval::metrics::PerformanceStats;
use ronda_eval::{AlignmentSummary, EvaluationResult, ValidatedConfig};

/// How results are written to stdout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable tables
    Text,
    /// Pretty-printed JSON
    Json,
}

/// Format an optional number, `NA` when absent.
fn num(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "NA".to_string(), |v| format!("{v:.precision$}"))
}

/// Format an optional fraction as a percentage, `NA` when absent.
fn pct(value: Option<f64>) -> String {
    value.map_or_else(|| "NA".to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn section(title: &str) {
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("{title}");
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
}

/// Print the alignment block.
pub(crate) fn print_alignment(summary: &AlignmentSummary) {
    let bucket = |b: Option<ronda_traits::Bucket>| {
        b.map_or_else(|| "NA".to_string(), |b| b.to_string())
    };

    println!("Alignment:");
    println!("  First Bucket:      {:>20}", bucket(summary.start));
    println!("  Last Bucket:       {:>20}", bucket(summary.end));
    println!("  Buckets:           {:>20}", summary.n_buckets);
    println!("  Common Buckets:    {:>20}", summary.n_common_buckets);
    println!("  Degenerate:        {:>20}", summary.n_degenerate);
    println!("  Assets:            {:>20}", summary.n_assets);
    println!("  Observations:      {:>20}", summary.n_observations);
    println!();
}

fn print_performance(label: &str, stats: &PerformanceStats) {
    println!("{label}:");
    println!("  Total Return:      {:>10}", pct(stats.total_return));
    println!("  Annualized Return: {:>10}", pct(stats.annualized_return));
    println!("  Annualized Vol:    {:>10}", pct(stats.annualized_volatility));
    println!("  Sharpe Ratio:      {:>10}", num(stats.sharpe_ratio, 2));
    println!("  Max Drawdown:      {:>10}", pct(stats.max_drawdown));
    println!("  Buckets:           {:>10}", stats.n_obs);
    println!();
}

/// Print a full evaluation report.
pub(crate) fn print_evaluation(result: &EvaluationResult, config: &ValidatedConfig) {
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║                     Factor Evaluation                        ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    println!("Groups:   {}", config.group_num());
    println!(
        "Cohorts:  long >= {}th pct, short <= {}th pct",
        config.long_percentile(),
        config.short_percentile()
    );
    println!("Scale:    {} buckets/year", config.bucket_to_year_scale());
    if config.invert_factor() {
        println!("Factor:   inverted");
    }
    println!();

    print_alignment(&result.alignment);

    section("INFORMATION COEFFICIENT");
    let ic = &result.summary.ic;
    println!("  Mean Rank IC:      {:>10}", num(ic.mean, 4));
    println!("  IC Std Dev:        {:>10}", num(ic.std, 4));
    match ic.icir() {
        Ok(icir) => println!("  ICIR:              {icir:>10.4}"),
        Err(e) => println!("  ICIR:              {:>10}  ({e})", "NA"),
    }
    println!("  Mean Pearson IC:   {:>10}", num(ic.pearson_mean, 4));
    println!("  IC Win Rate:       {:>10}", pct(ic.win_rate));
    println!("  Observations:      {:>10}", ic.n_obs);
    println!();

    section("QUANTILE GROUPS");
    println!("{:<8} {:>14} {:>14} {:>10}", "Group", "Total", "Annualized", "Buckets");
    for (g, series) in result.group_returns.iter().enumerate() {
        println!(
            "{:<8} {:>14} {:>14} {:>10}",
            g + 1,
            pct(result.summary.group_total[g]),
            pct(result.summary.group_annualized[g]),
            series.n_observed()
        );
    }
    println!();

    section("PORTFOLIOS");
    print_performance("Long", &result.summary.long);
    print_performance("Short", &result.summary.short);
    print_performance("Long-Short", &result.summary.long_short);
    print_performance("Excess over Benchmark", &result.summary.excess);

    println!("Turnover:");
    println!("  Long Cohort:       {:>10}", pct(result.summary.mean_long_turnover));
    println!("  Long-Short Book:   {:>10}", pct(result.summary.mean_long_short_turnover));
    println!();
}
