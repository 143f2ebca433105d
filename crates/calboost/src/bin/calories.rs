//! Calories-burnt prediction run.
//!
//! Loads the exercise and calories tables, explores them, trains a gradient
//! boosted regressor on an 80/20 split and prints the test mean absolute error.
//!
//! Usage:
//!   calories [--exercise PATH] [--calories PATH] [--config FILE] [--plot-dir DIR] [--report-json FILE] [-v|-q]
//!
//! Examples:
//!   # Defaults: ./exercise.csv and ./calories.csv, figures kept in memory
//!   calories
//!
//!   # Write SVG figures and a JSON report
//!   calories --plot-dir figures --report-json report.json
//!
//!   # Hyperparameters from a TOML file, with debug logging
//!   calories --config run.toml -v

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use calboost::pipeline::{self, PipelineConfig};

#[derive(Parser, Debug)]
#[command(name = "calories", version, about = "Predict calories burnt with gradient boosted trees")]
struct Args {
    /// Exercise table CSV (overrides the config file).
    #[arg(long)]
    exercise: Option<PathBuf>,

    /// Calories table CSV (overrides the config file).
    #[arg(long)]
    calories: Option<PathBuf>,

    /// TOML run configuration.
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Directory for SVG figures.
    #[arg(long)]
    plot_dir: Option<PathBuf>,

    /// Write a JSON run report here.
    #[arg(long)]
    report_json: Option<PathBuf>,

    /// Worker threads: 0 = all cores, 1 = sequential.
    #[arg(long)]
    threads: Option<usize>,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    /// Only errors. The MAE line is always printed.
    #[arg(short, long)]
    quiet: bool,
}

impl Args {
    fn default_directive(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::from_toml_file(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => PipelineConfig::default(),
        };
        if let Some(path) = &self.exercise {
            config.exercise_path = path.clone();
        }
        if let Some(path) = &self.calories {
            config.calories_path = path.clone();
        }
        if let Some(dir) = &self.plot_dir {
            config.plot_dir = Some(dir.clone());
        }
        if let Some(threads) = self.threads {
            config.model.n_threads = threads;
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // RUST_LOG wins over the flags.
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(args.default_directive()))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = args.pipeline_config()?;
    tracing::debug!(?config, "run configuration");

    let report = pipeline::run(&config).with_context(|| {
        format!(
            "calories run failed (exercise: {}, calories: {})",
            config.exercise_path.display(),
            config.calories_path.display()
        )
    })?;

    println!("Mean Absolute Error =  {}", report.mae);

    if let Some(path) = &args.report_json {
        report
            .write_json(path)
            .with_context(|| format!("writing report {}", path.display()))?;
        tracing::info!(path = %path.display(), "wrote run report");
    }

    Ok(())
}
