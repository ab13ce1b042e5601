//! Command-line parsing for the asymmetric-error curve fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the parsing/fitting code.
//!
//! Every flag can also be supplied through an `ASYMFIT_*` environment variable
//! (a `.env` file in the working directory is loaded first).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "asymfit",
    version,
    about = "Fit a + b*cos(x)^n to point clouds with asymmetric errors"
)]
pub struct Cli {
    /// Log level or flexi_logger spec (e.g. `info`, `debug,asym_fit::math=trace`).
    #[arg(long, global = true, env = "ASYMFIT_LOG", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Parse a table, fit the model, print the parameter report and render the chart.
    Fit(FitArgs),
    /// Write a synthetic table in the input layout.
    Generate(GenerateArgs),
    /// Print the parameter report stored in a fit JSON file.
    Show(ShowArgs),
}

/// Options for fitting.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Input table (comma-separated, 37 columns per row).
    #[arg(short, long, env = "ASYMFIT_INPUT", default_value = "fit_data.csv")]
    pub input: PathBuf,

    /// Field delimiter.
    #[arg(long, env = "ASYMFIT_DELIMITER", default_value_t = ',')]
    pub delimiter: char,

    /// Suffix of the chart file name. The chart is an SVG image, `fit<suffix>.svg`.
    #[arg(short, long, env = "ASYMFIT_SUFFIX", default_value = "_ver1_1_20250616")]
    pub suffix: String,

    /// Directory the SVG chart is written to (created if missing).
    #[arg(long, env = "ASYMFIT_OUT_DIR", default_value = "pic/fit")]
    pub out_dir: PathBuf,

    /// Chart title.
    #[arg(long, env = "ASYMFIT_TITLE", default_value = "ver1")]
    pub title: String,

    /// Lower edge of the fit domain (degrees).
    #[arg(long, env = "ASYMFIT_X_MIN")]
    pub x_min: Option<f64>,

    /// Upper edge of the fit domain (degrees).
    #[arg(long, env = "ASYMFIT_X_MAX")]
    pub x_max: Option<f64>,

    /// Solver budget, in multiples of (parameters + 1) model evaluations.
    #[arg(long, env = "ASYMFIT_MAX_ITER", default_value_t = 200)]
    pub max_iter: usize,

    /// Skip chart rendering.
    #[arg(long)]
    pub no_chart: bool,

    /// Hide the fit statistics box on the chart.
    #[arg(long)]
    pub no_stats: bool,

    /// Print a terminal preview of the fit.
    #[arg(long)]
    pub ascii: bool,

    /// Preview width (columns).
    #[arg(long, default_value_t = 90)]
    pub width: usize,

    /// Preview height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export per-point residuals to CSV.
    #[arg(long, env = "ASYMFIT_EXPORT_RESIDUALS")]
    pub export_residuals: Option<PathBuf>,

    /// Export the fit (parameters, covariance, curve grid) to JSON.
    #[arg(long, env = "ASYMFIT_EXPORT_FIT")]
    pub export_fit: Option<PathBuf>,
}

impl Default for FitArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("fit_data.csv"),
            delimiter: ',',
            suffix: "_ver1_1_20250616".to_string(),
            out_dir: PathBuf::from("pic/fit"),
            title: "ver1".to_string(),
            x_min: None,
            x_max: None,
            max_iter: 200,
            no_chart: false,
            no_stats: false,
            ascii: false,
            width: 90,
            height: 25,
            export_residuals: None,
            export_fit: None,
        }
    }
}

/// Options for synthetic table generation.
#[derive(Debug, Args, Clone)]
pub struct GenerateArgs {
    /// Output table path.
    #[arg(short, long, default_value = "fit_data.csv")]
    pub output: PathBuf,

    /// Number of rows (5 points each).
    #[arg(long, default_value_t = 20)]
    pub rows: usize,

    /// Random seed.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// True offset `a`.
    #[arg(long, default_value_t = 60.0)]
    pub a: f64,

    /// True amplitude `b`.
    #[arg(long, default_value_t = 80.0)]
    pub b: f64,

    /// True exponent `n`.
    #[arg(long, default_value_t = 1.5)]
    pub n: f64,

    /// Standard deviation of the y noise.
    #[arg(long, default_value_t = 2.0)]
    pub noise: f64,

    /// Symmetric x uncertainty (degrees).
    #[arg(long, default_value_t = 0.5)]
    pub x_err: f64,
}

/// Options for replaying a saved fit.
#[derive(Debug, Args, Clone)]
pub struct ShowArgs {
    /// Fit JSON file produced by `asymfit fit --export-fit`.
    #[arg(value_name = "JSON")]
    pub fit: PathBuf,
}
