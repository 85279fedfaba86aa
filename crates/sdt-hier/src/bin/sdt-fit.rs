//! Fit a hierarchical SDT model to a CSV of response counts.
//!
//! # Usage
//!
//! ```bash
//! # Participant-intercept model on aggregate counts
//! sdt-fit --data sdt_data.csv
//!
//! # Matrix hierarchy on trial-level data, JSON report
//! sdt-fit --data trials.csv --trials --model matrix --json
//!
//! # Settings from a file, overridden on the command line
//! sdt-fit --data sdt_data.csv --config fit.json --chains 8
//! ```

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use sdt_hier::data::{load_aggregate_csv, load_trial_csv};
use sdt_hier::{fit_rows, Config, Hierarchy, JsonSink, Report, ReportSink, TerminalSink};

/// Hierarchical Bayesian signal detection model fitting
#[derive(Parser, Debug)]
#[command(name = "sdt-fit")]
#[command(about = "Fit a hierarchical Bayesian SDT model to hit / false-alarm counts")]
#[command(version)]
struct Args {
    /// CSV file with columns pnum, condition, hits, nSignal, false_alarms, nNoise
    #[arg(short, long)]
    data: PathBuf,

    /// Read trial-level data (pnum, condition, signal, response) and aggregate it
    #[arg(long)]
    trials: bool,

    /// Model variant: matrix (P×C latent cells) or intercept (per-participant offsets)
    #[arg(short, long, default_value = "intercept")]
    model: Hierarchy,

    /// JSON file with sampling settings; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Retained draws per chain
    #[arg(long)]
    draws: Option<usize>,

    /// Warmup iterations per chain
    #[arg(long)]
    tune: Option<usize>,

    /// Number of chains
    #[arg(long)]
    chains: Option<usize>,

    /// Target acceptance statistic, in (0, 1)
    #[arg(long)]
    target_accept: Option<f64>,

    /// Base RNG seed
    #[arg(long)]
    seed: Option<u64>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sdt_hier=info")),
        )
        .with_writer(io::stderr)
        .init();

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> sdt_hier::Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::from_json_file(path)?,
        None => Config::default(),
    };
    if let Some(n) = args.draws {
        config.draws = n;
    }
    if let Some(n) = args.tune {
        config.tune = n;
    }
    if let Some(n) = args.chains {
        config.chains = n;
    }
    if let Some(p) = args.target_accept {
        config.target_accept = p;
    }
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    config.validate()?;

    let rows = if args.trials {
        load_trial_csv(&args.data)?
    } else {
        load_aggregate_csv(&args.data)?
    };
    tracing::info!(rows = rows.len(), path = %args.data.display(), "loaded data");

    let fit = fit_rows(&rows, args.model, &config)?;
    let report = Report::from_fit(&fit)?;

    if args.json {
        JsonSink::new(io::stdout().lock()).emit(&report)
    } else {
        TerminalSink::new(io::stdout().lock()).emit(&report)
    }
}
