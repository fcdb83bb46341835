//! stockvol CLI Module
//!
//! Command-line interface for quality checks, feature transformation and
//! sample data generation.

use clap::{Parser, Subcommand};
use colored::*;
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::config::{GateMode, PipelineConfig};
use crate::features::FeatureTransformer;
use crate::frame::io;
use crate::pipeline::Pipeline;
use crate::quality::QualityChecker;
use crate::synthetic::SyntheticOhlcv;

// ─── Styling helpers ───────────────────────────────────────────────────────────

fn dim(s: &str) -> ColoredString   { s.truecolor(100, 100, 100) }
fn accent(s: &str) -> ColoredString { s.truecolor(120, 170, 255) }
fn muted(s: &str) -> ColoredString  { s.truecolor(140, 140, 140) }
fn ok(s: &str) -> ColoredString     { s.truecolor(100, 210, 120) }
fn bad(s: &str) -> ColoredString    { s.truecolor(235, 100, 100) }

fn step_ok(msg: &str) {
    println!("  {} {}", ok("✓"), msg);
}

fn step_fail(msg: &str) {
    println!("  {} {}", bad("✗"), msg);
}

fn step_run(msg: &str) {
    print!("  {} {}... ", accent("›"), msg);
}

fn step_done(detail: &str) {
    println!("{} {}", ok("done"), dim(detail));
}

fn section(title: &str) {
    println!();
    println!("  {}", title.white().bold());
    println!("  {}", dim(&"─".repeat(56)));
}

fn kv(key: &str, val: &str) {
    println!("  {:<14} {}", muted(key), val.white());
}

// ─── CLI definition ────────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(name = "stockvol")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Data-quality gate and feature engineering for stock volatility prediction")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run data quality checks on a raw OHLCV file
    Check {
        /// Input data file (CSV or Parquet)
        #[arg(short, long)]
        data: PathBuf,

        /// Minimum number of rows
        #[arg(long, default_value = "100")]
        min_rows: usize,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,

        /// Also write the text report to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// Engineer features and targets without the quality gate
    Transform {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: PathBuf,

        /// Prediction horizon in bars
        #[arg(long, default_value = "1")]
        horizon: usize,

        /// Symbol used in the output file name
        #[arg(long, default_value = "AAPL")]
        symbol: String,
    },

    /// Quality gate, transform and persist in one step
    Run {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,

        /// Output directory (overrides config and environment)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pipeline config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Continue when quality checks fail
        #[arg(long)]
        advisory: bool,
    },

    /// Write a synthetic OHLCV file
    Generate {
        /// Output CSV file
        #[arg(short, long)]
        output: PathBuf,

        /// Number of bars
        #[arg(long, default_value = "500")]
        rows: usize,

        /// Random seed
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Daily bars instead of hourly
        #[arg(long)]
        daily: bool,

        /// Add a symbol column
        #[arg(long)]
        symbol: Option<String>,
    },

    /// Show data information
    Info {
        /// Input data file
        #[arg(short, long)]
        data: PathBuf,
    },
}

/// Dispatch a parsed command line
pub fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Check { data, min_rows, json, report } => {
            cmd_check(&data, min_rows, json, report.as_deref())
        }
        Commands::Transform { data, output, horizon, symbol } => {
            cmd_transform(&data, &output, horizon, &symbol)
        }
        Commands::Run { data, output, config, advisory } => {
            cmd_run(&data, output.as_deref(), config.as_deref(), advisory)
        }
        Commands::Generate { output, rows, seed, daily, symbol } => {
            cmd_generate(&output, rows, seed, daily, symbol)
        }
        Commands::Info { data } => cmd_info(&data),
    }
}

// ─── Commands ──────────────────────────────────────────────────────────────────

pub fn cmd_check(
    data_path: &Path,
    min_rows: usize,
    json: bool,
    report_path: Option<&Path>,
) -> anyhow::Result<()> {
    let frame = io::read_frame(data_path)?;

    let mut checker = QualityChecker::default();
    let report = checker.run_all_checks(&frame, min_rows);
    let text = report.render(frame.shape(), chrono::Local::now().naive_local());

    if json {
        println!("{}", report.to_json()?);
    } else {
        section("Quality");
        kv("File", &data_path.display().to_string());
        kv("Shape", &format!("{} rows × {} cols", frame.height(), frame.width()));
        println!();
        for (check, passed) in report.checks() {
            if *passed {
                step_ok(check.name());
            } else {
                step_fail(check.name());
            }
        }
        if !report.issues().is_empty() {
            println!();
            for issue in report.issues() {
                println!("  {} {}", bad("•"), issue);
            }
        }
        println!();
    }

    if let Some(path) = report_path {
        std::fs::write(path, &text)?;
        if !json {
            step_ok(&format!("Report written to {}", path.display()));
            println!();
        }
    }

    if !report.all_passed() {
        anyhow::bail!("{} quality issue(s) found", report.issues().len());
    }
    Ok(())
}

pub fn cmd_transform(
    data_path: &Path,
    output_dir: &Path,
    horizon: usize,
    symbol: &str,
) -> anyhow::Result<()> {
    section("Transform");

    step_run("Loading data");
    let start = Instant::now();
    let frame = io::read_frame(data_path)?;
    step_done(&format!("{} rows × {} cols in {:?}", frame.height(), frame.width(), start.elapsed()));

    step_run("Engineering features");
    let start = Instant::now();
    let transformer = FeatureTransformer::default();
    let (features, spec) = transformer.transform(&frame, horizon)?;
    step_done(&format!("{} rows, {} features in {:?}", features.height(), spec.len(), start.elapsed()));

    std::fs::create_dir_all(output_dir)?;
    let stem = crate::pipeline::output_stem(symbol, chrono::Local::now().naive_local());
    let data_out = output_dir.join(format!("{}.csv", stem));
    let spec_out = output_dir.join(format!("{}_features.json", stem));

    step_run(&format!("Saving → {}", data_out.display()));
    features.write_csv(&data_out)?;
    spec.save(&spec_out)?;
    step_done(&format!("{} dropped rows", frame.height() - features.height()));

    println!();
    Ok(())
}

pub fn cmd_run(
    data_path: &Path,
    output_dir: Option<&Path>,
    config_path: Option<&Path>,
    advisory: bool,
) -> anyhow::Result<()> {
    section("Pipeline");

    let mut config = match config_path {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    }
    .with_env_overrides();
    if advisory {
        config = config.with_gate(GateMode::Advisory);
    }
    if let Some(dir) = output_dir {
        config = config.with_output_dir(dir);
    }

    kv("Symbol", &config.symbol);
    kv("Horizon", &config.horizon.to_string());
    kv("Gate", &format!("{:?}", config.gate).to_lowercase());
    println!();

    step_run("Loading data");
    let frame = io::read_frame(data_path)?;
    step_done(&format!("{} rows × {} cols", frame.height(), frame.width()));

    let pipeline = Pipeline::new(config);
    step_run("Checking and transforming");
    let start = Instant::now();
    let output = match pipeline.run(&frame) {
        Ok(output) => output,
        Err(e) => {
            println!("{}", bad("failed"));
            return Err(e.into());
        }
    };
    step_done(&format!("{:?}", start.elapsed()));

    if output.report.all_passed() {
        step_ok("All quality checks passed");
    } else {
        for issue in output.report.issues() {
            step_fail(issue);
        }
    }

    let files = pipeline.persist(&output, &pipeline.config().output_dir)?;

    println!();
    kv("Rows", &output.features.height().to_string());
    kv("Features", &output.spec.len().to_string());
    kv("Data", &files.data.display().to_string());
    kv("Feature list", &files.features.display().to_string());
    kv("Baseline", &files.baseline.display().to_string());
    kv("Report", &files.report.display().to_string());
    println!();

    Ok(())
}

pub fn cmd_generate(
    output: &Path,
    rows: usize,
    seed: u64,
    daily: bool,
    symbol: Option<String>,
) -> anyhow::Result<()> {
    section("Generate");

    let step = if daily {
        chrono::Duration::days(1)
    } else {
        chrono::Duration::hours(1)
    };
    let mut generator = SyntheticOhlcv::new(rows).with_seed(seed).with_step(step);
    if let Some(symbol) = symbol {
        generator = generator.with_symbol(symbol);
    }

    step_run(&format!("Generating {} bars", rows));
    let frame = generator.generate()?;
    io::write_csv(&frame, output)?;
    step_done(&output.display().to_string());

    println!();
    Ok(())
}

pub fn cmd_info(data_path: &Path) -> anyhow::Result<()> {
    section("Data Info");

    let df = io::read_polars(data_path)?;
    let frame = io::from_polars(&df)?;

    kv("File", &data_path.display().to_string());
    kv("Rows", &df.height().to_string());
    kv("Columns", &df.width().to_string());
    kv("Memory", &format!("{:.2} MB", df.estimated_size() as f64 / 1024.0 / 1024.0));
    match frame.index().timestamps() {
        Some(ts) if !ts.is_empty() => {
            kv("From", &ts[0].to_string());
            kv("To", &ts[ts.len() - 1].to_string());
        }
        Some(_) => {}
        None => kv("Index", "not a timestamp index"),
    }
    println!();

    println!("  {:<20} {:<12} {:>6}", muted("Column"), muted("Type"), muted("Nulls"));
    println!("  {}", dim(&"─".repeat(42)));

    for col in df.get_columns() {
        println!(
            "  {:<20} {:<12} {:>6}",
            col.name().as_str(),
            format!("{:?}", col.dtype()).truecolor(140, 140, 140),
            col.null_count(),
        );
    }

    println!();
    Ok(())
}
