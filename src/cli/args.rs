//! Command-line argument definitions for the waterframe tool
//!
//! This module defines the CLI interface using the clap derive API. QC
//! settings are layered: built-in defaults, then an optional JSON
//! configuration file, then individual flags.

use crate::config::QcConfig;
use crate::error::{Result, WaterFrameError};
use crate::models::AggregationMethod;
use crate::resample::ResampleRule;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

/// CLI arguments for the WaterFrame quality-control tool
///
/// Runs OceanSITES-style quality control on ocean-observatory time series
/// stored as CSV or Parquet tables.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "waterframe",
    version,
    about = "Quality-control flagging and resampling of ocean-observatory time series",
    long_about = "Reads a CSV or Parquet table of TIME (and optionally DEPTH) indexed \
                  measurements with paired _QC flag columns, runs range, flat and spike \
                  tests, resamples to coarser time steps and reports flag statistics."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Increase logging verbosity
    #[arg(
        short = 'v',
        long = "verbose",
        global = true,
        action = clap::ArgAction::Count,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run the QC tests and write the flagged table
    Qc(QcArgs),
    /// Aggregate a table into coarser time buckets
    Resample(ResampleArgs),
    /// Describe a table and its flag statistics
    Info(InfoArgs),
}

/// Arguments for the qc command
#[derive(Debug, Clone, Parser)]
pub struct QcArgs {
    /// Input table (.csv or .parquet)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output table (.csv or .parquet)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,

    /// Parameters to check; all parameters when omitted
    #[arg(short = 'p', long = "parameter", value_name = "NAME")]
    pub parameters: Vec<String>,

    /// JSON file with QC settings
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Spike test window (0 selects it from the series length)
    #[arg(long = "window", value_name = "N")]
    pub window: Option<usize>,

    /// Spike test threshold in rolling standard deviations
    #[arg(long = "threshold", value_name = "X")]
    pub threshold: Option<f64>,

    /// Spike test influence of flagged samples, in [0, 1]
    #[arg(long = "influence", value_name = "X")]
    pub influence: Option<f64>,

    /// Flat test window (0 selects the default of 3)
    #[arg(long = "flat-window", value_name = "N")]
    pub flat_window: Option<usize>,

    /// Add missing _QC columns (all 0) before running the tests
    #[arg(long = "init-flags")]
    pub init_flags: bool,

    /// Leave untouched rows at flag 0 instead of marking them good
    #[arg(long = "no-finalize")]
    pub no_finalize: bool,

    /// Report format
    #[arg(long = "output-format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Arguments for the resample command
#[derive(Debug, Clone, Parser)]
pub struct ResampleArgs {
    /// Input table (.csv or .parquet)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Output table (.csv or .parquet)
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: PathBuf,

    /// Bucket width, e.g. 30min, H, D, 2D, W, M
    #[arg(short = 'r', long = "rule", value_name = "RULE")]
    pub rule: ResampleRule,

    /// Aggregation applied to each bucket (mean, max, min)
    #[arg(short = 'm', long = "method", default_value = "mean")]
    pub method: AggregationMethod,
}

/// Arguments for the info command
#[derive(Debug, Clone, Parser)]
pub struct InfoArgs {
    /// Input table (.csv or .parquet)
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Report format
    #[arg(long = "output-format", value_enum, default_value = "human")]
    pub output_format: OutputFormat,
}

/// Output format options for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON format for scripting
    Json,
}

impl Args {
    /// Get the log level based on verbosity settings
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }
}

fn require_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(WaterFrameError::configuration(format!(
            "Input file does not exist: {}",
            path.display()
        )));
    }
    Ok(())
}

impl QcArgs {
    pub fn validate(&self) -> Result<()> {
        require_file(&self.input)?;
        if let Some(config) = &self.config {
            require_file(config)?;
        }
        Ok(())
    }

    /// Build the QC configuration: defaults, then the config file, then flags
    pub fn build_config(&self) -> Result<QcConfig> {
        let mut config = match &self.config {
            Some(path) => QcConfig::from_json_file(path)?,
            None => QcConfig::default(),
        };

        if let Some(window) = self.window {
            config = config.with_spike_window(window);
        }
        if let Some(threshold) = self.threshold {
            config = config.with_spike_threshold(threshold);
        }
        if let Some(influence) = self.influence {
            config = config.with_spike_influence(influence);
        }
        if let Some(window) = self.flat_window {
            config = config.with_flat_window(window);
        }
        if self.no_finalize {
            config = config.without_finalize();
        }

        config.validate()?;
        Ok(config)
    }
}

impl ResampleArgs {
    pub fn validate(&self) -> Result<()> {
        require_file(&self.input)
    }
}

impl InfoArgs {
    pub fn validate(&self) -> Result<()> {
        require_file(&self.input)
    }
}
