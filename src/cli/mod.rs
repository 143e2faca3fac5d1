//! Command-line parsing for the difficulty forecaster.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the cleaning/forecast code.
//!
//! Dataset options also read `DIFFCAST_*` environment variables (a `.env` file
//! is loaded before parsing).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "diffcast", version, about = "Bitcoin difficulty trend and what-if projections")]
pub struct Cli {
    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Directory for the log file written in TUI mode.
    #[arg(long, global = true, env = "DIFFCAST_LOG_DIR", default_value = "logs")]
    pub log_dir: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the dataset preview, linear trend, and what-if projections.
    Report(ReportArgs),
    /// Plot difficulty over time (with trend) or hash rate vs. difficulty.
    Plot(PlotArgs),
    /// Write the cleaned series and/or the forecast to files.
    Export(ExportArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same session as `diffcast report`, but lets you move the
    /// what-if inputs and see the projections update.
    Tui(DataArgs),
}

/// Dataset location and what-if inputs, shared by every subcommand.
#[derive(Debug, Args, Clone)]
pub struct DataArgs {
    /// CSV with `Date`, `DiffLast`, `HashRate`, `BlkCnt` columns.
    #[arg(short = 'd', long = "data", env = "DIFFCAST_DATA", default_value = "bitcoin.csv")]
    pub data: PathBuf,

    /// Hash-rate increase in percent (clamped to 0..=200). Defaults to 20.
    #[arg(short = 'f', long, env = "DIFFCAST_FACTOR", allow_negative_numbers = true)]
    pub factor: Option<i64>,

    /// Manual hash-rate override, same units as the dataset. Defaults to the
    /// last observed hash rate; zero or less skips that projection.
    #[arg(long, env = "DIFFCAST_HASHRATE", allow_negative_numbers = true, value_parser = parse_finite_f64)]
    pub hashrate: Option<f64>,
}

/// Accept any finite number; `NaN` and infinities cannot be saved to JSON.
fn parse_finite_f64(s: &str) -> Result<f64, String> {
    let v: f64 = s.trim().parse().map_err(|e| format!("'{s}' is not a number: {e}"))?;
    if v.is_finite() {
        Ok(v)
    } else {
        Err(format!("'{s}' is not a finite number"))
    }
}

/// Options for the text report.
#[derive(Debug, Args, Clone)]
pub struct ReportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Number of most recent rows in the preview table.
    #[arg(long, default_value_t = 5)]
    pub preview: usize,

    /// Disable the terminal plots.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,

    /// Export the cleaned series (with fitted values) to CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the fitted model and projections to JSON.
    #[arg(long = "export-forecast")]
    pub export_forecast: Option<PathBuf>,
}

/// Which chart to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PlotKind {
    /// Difficulty over time with the fitted trend.
    Trend,
    /// Hash rate vs. difficulty.
    Scatter,
    /// Both charts.
    All,
}

/// Options for plotting.
#[derive(Debug, Args)]
pub struct PlotArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Plot a forecast JSON produced by `diffcast export --forecast` instead
    /// of loading the dataset.
    #[arg(long, value_name = "JSON")]
    pub forecast: Option<PathBuf>,

    /// Which chart to draw.
    #[arg(long, value_enum, default_value_t = PlotKind::All)]
    pub kind: PlotKind,

    /// Plot width (columns).
    #[arg(long, default_value_t = 100)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 25)]
    pub height: usize,
}

/// Options for exporting.
#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub data: DataArgs,

    /// Write the cleaned series (with fitted values) to this CSV path.
    #[arg(long, value_name = "CSV", required_unless_present = "forecast")]
    pub series: Option<PathBuf>,

    /// Write the fitted model and projections to this JSON path.
    #[arg(long, value_name = "JSON")]
    pub forecast: Option<PathBuf>,
}
