//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - sets up logging
//! - runs the fit pipeline and prints the report
//! - writes optional exports
//! - generates synthetic tables and replays saved fits

use clap::Parser;
use flexi_logger::{Logger, LoggerHandle};
use log::{debug, info};

use crate::cli::{Command, FitArgs, GenerateArgs, ShowArgs};
use crate::domain::{ChartStyle, FitConfig, FitDomain};
use crate::error::AppError;
use crate::models::CurveModel;

pub mod pipeline;

/// Entry point for the `asymfit` binary.
pub fn run() -> Result<(), AppError> {
    // Missing `.env` is the normal case.
    let _ = dotenvy::dotenv();

    // `asymfit` and `asymfit --input x.csv` behave like `asymfit fit ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    let _logger = setup_logging(&cli.log_level)?;
    debug!("{cli:?}");

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Generate(args) => handle_generate(args),
        Command::Show(args) => handle_show(args),
    }
}

/// Start stderr logging with a flexi_logger spec (`warn`, `info,asym_fit::math=trace`, ...).
///
/// The returned handle must stay alive for the duration of the run.
pub fn setup_logging(spec: &str) -> Result<LoggerHandle, AppError> {
    Logger::try_with_str(spec)
        .and_then(|logger| logger.log_to_stderr().start())
        .map_err(|e| AppError::new(2, format!("Logger initialization failed: {e}")))
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = fit_config_from_args(&args)?;
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(
            &config.input.display().to_string(),
            &run.table,
            run.points.len(),
            &run.fit.selection,
            &run.model,
            &run.fit.result,
        )
    );

    if config.ascii {
        let x_range = config
            .chart
            .as_ref()
            .map(|s| s.x_range)
            .unwrap_or_else(|| ChartStyle::default().x_range);
        let plot = crate::plot::render_ascii_plot(
            &run.residuals,
            &run.model,
            &run.fit.result,
            x_range,
            config.ascii_width,
            config.ascii_height,
        );
        println!("{plot}");
    }

    println!("{}", crate::report::format_param_report(&run.fit.result));

    if let Some(path) = &run.chart_path {
        println!("Chart: {}", path.display());
    }

    // Optional exports.
    if let Some(path) = &config.export_residuals {
        crate::io::export::write_residuals_csv(path, &run.residuals)?;
        info!("wrote residuals to {}", path.display());
    }
    if let Some(path) = &config.export_fit {
        let file = crate::io::fit_file::fit_file(&run.model, &run.fit.result, &config.input);
        crate::io::fit_file::write_fit_json(path, &file)?;
        info!("wrote fit to {}", path.display());
    }

    Ok(())
}

fn handle_generate(args: GenerateArgs) -> Result<(), AppError> {
    let spec = crate::data::SampleSpec {
        rows: args.rows,
        seed: args.seed,
        params: [args.a, args.b, args.n],
        noise: args.noise,
        x_err: args.x_err,
        ..crate::data::SampleSpec::default()
    };
    let rows = crate::data::generate_rows(&spec)?;
    crate::data::write_table(&args.output, &rows)?;

    println!(
        "Wrote {} row(s) ({} points) to {}",
        rows.len(),
        rows.len() * crate::io::expand::POINTS_PER_ROW,
        args.output.display()
    );
    Ok(())
}

fn handle_show(args: ShowArgs) -> Result<(), AppError> {
    let file = crate::io::fit_file::read_fit_json(&args.fit)?;

    println!("Model: {} ({})", file.model, file.formula);
    println!("Input: {}", file.input);
    println!(
        "chi2 / ndf = {} / {}",
        crate::report::fmt_sig(file.result.chi2, 6),
        file.result.ndf
    );
    println!("{}", crate::report::format_param_report(&file.result));
    Ok(())
}

/// Build the pipeline configuration from CLI flags.
pub fn fit_config_from_args(args: &FitArgs) -> Result<FitConfig, AppError> {
    if !args.delimiter.is_ascii() {
        return Err(AppError::new(2, "Delimiter must be a single ASCII character."));
    }

    let domain = match (args.x_min, args.x_max) {
        (None, None) => None,
        (lo, hi) => {
            let model = crate::models::CosinePower::default();
            let default = model.domain();
            let defined = model.defined_range();
            let d = FitDomain::new(lo.unwrap_or(default.min), hi.unwrap_or(default.max));
            if !d.is_valid() {
                return Err(AppError::new(
                    2,
                    format!("Invalid fit domain [{}, {}].", d.min, d.max),
                ));
            }
            if !d.within(&defined) {
                return Err(AppError::new(
                    2,
                    format!(
                        "Fit domain [{}, {}] leaves [{}, {}], where cos(x)^n is defined.",
                        d.min, d.max, defined.min, defined.max
                    ),
                ));
            }
            Some(d)
        }
    };

    let chart = (!args.no_chart).then(|| ChartStyle {
        title: args.title.clone(),
        show_fit_stats: !args.no_stats,
        ..ChartStyle::default()
    });

    Ok(FitConfig {
        input: args.input.clone(),
        delimiter: args.delimiter as u8,
        domain,
        max_iter: args.max_iter,
        out_dir: args.out_dir.clone(),
        suffix: args.suffix.clone(),
        chart,
        ascii: args.ascii,
        ascii_width: args.width,
        ascii_height: args.height,
        export_residuals: args.export_residuals.clone(),
        export_fit: args.export_fit.clone(),
    })
}

/// Rewrite argv so `asymfit` defaults to `asymfit fit`.
///
/// Rules:
/// - `asymfit`                       -> `asymfit fit`
/// - `asymfit --input x.csv ...`     -> `asymfit fit --input x.csv ...`
/// - `asymfit --help/--version/-h`   -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "generate" | "show");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
        return argv;
    }

    argv
}
