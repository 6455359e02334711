//! Command-line parsing for the `mptfit` model fitter.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! fitting and reporting code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::ModelSpec;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "mptfit", version, about = "Power-law, log-log parabola and Kelvin fits for MSD curves")]
pub struct Cli {
    /// Enable debug logging (otherwise `RUST_LOG` decides, default `warn`).
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fit a model to a CSV of observations and print diagnostics.
    Fit(FitArgs),
    /// Generate a synthetic data set as CSV.
    Sample(SampleArgs),
}

/// Options for fitting.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// CSV with `x`, `y` and optional `weight` columns.
    #[arg(short, long, value_name = "CSV")]
    pub input: PathBuf,

    /// Model family to fit.
    #[arg(short, long, value_enum, default_value_t = ModelSpec::Power)]
    pub model: ModelSpec,

    /// Number of Kelvin elements (ignored for other models).
    #[arg(long, default_value_t = 1)]
    pub terms: usize,

    /// Explicit starting point, comma separated, in parameter order.
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub initial_guess: Option<Vec<f64>>,

    /// Solver evaluation budget multiplier.
    #[arg(long, default_value_t = 200)]
    pub patience: usize,

    /// Render an ASCII log-log plot in the terminal.
    #[arg(long)]
    pub plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 20)]
    pub height: usize,

    /// Print the per-point fitted values and residuals.
    #[arg(long)]
    pub table: bool,

    /// Print the full result as JSON instead of the text summary.
    #[arg(long)]
    pub json: bool,
}

/// Options for synthetic data generation.
#[derive(Debug, Args, Clone)]
pub struct SampleArgs {
    /// Model family to sample from.
    #[arg(short, long, value_enum, default_value_t = ModelSpec::Power)]
    pub model: ModelSpec,

    /// Amplitude(s); one per Kelvin element.
    #[arg(short, long, value_delimiter = ',', default_value = "1.0")]
    pub a: Vec<f64>,

    /// Exponent, or rate(s) for Kelvin.
    #[arg(short, long, value_delimiter = ',', default_value = "1.0", allow_hyphen_values = true)]
    pub b: Vec<f64>,

    /// Log-log curvature (parabolic model only).
    #[arg(short, long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub c: f64,

    /// Number of points.
    #[arg(short = 'n', long, default_value_t = 50)]
    pub points: usize,

    /// Smallest `x`.
    #[arg(long, default_value_t = 0.01)]
    pub x_min: f64,

    /// Largest `x`.
    #[arg(long, default_value_t = 10.0)]
    pub x_max: f64,

    /// Log-scale noise standard deviation.
    #[arg(long, default_value_t = 0.05)]
    pub noise: f64,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Output CSV (stdout when omitted).
    #[arg(short, long, value_name = "CSV")]
    pub output: Option<PathBuf>,
}
