//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs logging
//! - loads and cleans the dataset, fits the trend, evaluates the what-ifs
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing::{error, info};

use crate::cli::{Command, DataArgs, ExportArgs, PlotArgs, PlotKind, ReportArgs};
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::logs::{LogTarget, init_logs};

pub mod pipeline;

/// Dropped rows listed in the report before it summarizes the rest.
const DROPPED_ROWS_SHOWN: usize = 5;

/// Entry point for the `diffcast` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `diffcast` and `diffcast -d btc.csv` behave like `diffcast report ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let target = match (&cli.command, cli.log_json) {
        (Command::Tui(_), _) => LogTarget::File(&cli.log_dir),
        (_, true) => LogTarget::StderrJson,
        (_, false) => LogTarget::Stderr,
    };
    let _log_guard = init_logs(target)?;

    let result = match cli.command {
        Command::Report(args) => handle_report(args),
        Command::Plot(args) => handle_plot(args),
        Command::Export(args) => handle_export(args),
        Command::Tui(args) => crate::tui::run(config_from_data_args(&args)),
    };
    if let Err(err) = &result {
        error!(exit_code = err.exit_code(), "{err}");
    }
    result
}

fn handle_report(args: ReportArgs) -> Result<(), AppError> {
    let config = report_config_from_args(&args);
    let run = pipeline::run(&config)?;
    let session = &run.session;

    println!("{}", crate::report::format_load_banner(session));
    println!("{}", crate::report::format_dataset_summary(session.stats()));
    if !session.dropped().is_empty() {
        println!("{}", crate::report::format_dropped_rows(session.dropped(), DROPPED_ROWS_SHOWN));
    }
    println!("{}", crate::report::format_preview(session.series().tail(config.preview_rows)));

    if config.plot {
        println!("Difficulty over time (o = actual, - = trend):");
        println!(
            "{}",
            crate::plot::render_difficulty_plot(session.series(), session.fitted(), config.plot_width, config.plot_height)
        );
        println!("HashRate vs Difficulty:");
        println!(
            "{}",
            crate::plot::render_scatter_plot(session.series(), config.plot_width, config.plot_height)
        );
    }

    println!("{}", crate::report::format_trend(session));
    println!("{}", crate::report::format_projections(&run.projections));

    // Optional exports.
    if let Some(path) = &config.export_series {
        crate::io::export::write_series_csv(path, session)?;
    }
    if let Some(path) = &config.export_forecast {
        crate::io::forecast::write_forecast_json(path, session, &run.projections)?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    if let Some(path) = &args.forecast {
        let forecast = crate::io::forecast::read_forecast_json(path)?;
        info!(path = %path.display(), "plotting saved forecast");
        println!("Forecast from {} ({} .. {}):", forecast.source, forecast.first_date, forecast.last_date);
        println!(
            "{}",
            crate::plot::render_forecast_file_plot(&forecast, args.width, args.height)
        );
        return Ok(());
    }

    let run = pipeline::run(&config_from_data_args(&args.data))?;
    let session = &run.session;

    if matches!(args.kind, PlotKind::Trend | PlotKind::All) {
        println!("Difficulty over time (o = actual, - = trend):");
        println!(
            "{}",
            crate::plot::render_difficulty_plot(session.series(), session.fitted(), args.width, args.height)
        );
    }
    if matches!(args.kind, PlotKind::Scatter | PlotKind::All) {
        println!("HashRate vs Difficulty:");
        println!(
            "{}",
            crate::plot::render_scatter_plot(session.series(), args.width, args.height)
        );
    }
    Ok(())
}

fn handle_export(args: ExportArgs) -> Result<(), AppError> {
    let run = pipeline::run(&config_from_data_args(&args.data))?;

    if let Some(path) = &args.series {
        crate::io::export::write_series_csv(path, &run.session)?;
        println!("Wrote {}", path.display());
    }
    if let Some(path) = &args.forecast {
        crate::io::forecast::write_forecast_json(path, &run.session, &run.projections)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

pub fn config_from_data_args(args: &DataArgs) -> RunConfig {
    RunConfig {
        data_path: args.data.clone(),
        factor_percent: args.factor,
        manual_hash_rate: args.hashrate,
        preview_rows: 5,
        plot: false,
        plot_width: 100,
        plot_height: 25,
        export_series: None,
        export_forecast: None,
    }
}

pub fn report_config_from_args(args: &ReportArgs) -> RunConfig {
    RunConfig {
        preview_rows: args.preview,
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_series: args.export.clone(),
        export_forecast: args.export_forecast.clone(),
        ..config_from_data_args(&args.data)
    }
}

/// Rewrite argv so `diffcast` defaults to `diffcast report`.
///
/// Rules:
/// - `diffcast`                        -> `diffcast report`
/// - `diffcast -d btc.csv ...`         -> `diffcast report -d btc.csv ...`
/// - `diffcast --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("report".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "plot" | "export" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "report flags".
    if arg1.starts_with('-') {
        argv.insert(1, "report".to_string());
        return argv;
    }

    // Otherwise, leave as-is.
    argv
}
