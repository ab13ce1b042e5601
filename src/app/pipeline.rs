//! Shared "fit pipeline" logic.
//!
//! parse table -> expand rows to points -> fit -> residuals -> chart
//!
//! The CLI front-end focuses on presentation (printing and exports).

use std::path::PathBuf;

use log::info;

use crate::domain::{FitConfig, Point, PointResidual};
use crate::error::FitError;
use crate::fit::{Fit, FitEngine};
use crate::io::ParsedTable;
use crate::math::LevenbergMarquardt;
use crate::models::{CosinePower, CurveModel};

/// All computed outputs of a single `asymfit fit` run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub table: ParsedTable,
    pub points: Vec<Point>,
    pub model: CosinePower,
    pub fit: Fit,
    pub residuals: Vec<PointResidual>,
    /// Where the chart was written, if rendering was enabled.
    pub chart_path: Option<PathBuf>,
}

/// Execute the full fitting pipeline and return the computed outputs.
pub fn run_fit(config: &FitConfig) -> Result<RunOutput, FitError> {
    // 1) Parse and expand.
    let table = crate::io::read_table(&config.input, config.delimiter)?;
    if !table.short_rows.is_empty() {
        info!(
            "{} row(s) skipped for having fewer than {} columns",
            table.short_rows.len(),
            crate::io::expand::MIN_COLUMNS
        );
    }
    let points = crate::io::expand_rows(&table.rows);
    info!(
        "read {} row(s), expanded to {} point(s)",
        table.rows.len(),
        points.len()
    );

    // 2) Fit.
    let model = match config.domain {
        Some(domain) => CosinePower::with_domain(domain),
        None => CosinePower::default(),
    };
    let engine = FitEngine::new(LevenbergMarquardt::with_max_iter(config.max_iter));
    let fit = engine.fit(&points, &model, model.domain())?;

    // 3) Residuals.
    let residuals = crate::report::compute_residuals(&points, &fit.selection, &model, &fit.result);

    // 4) Chart.
    let chart_path = match &config.chart {
        Some(style) => {
            std::fs::create_dir_all(&config.out_dir)
                .map_err(|e| FitError::io("create output directory", &config.out_dir, e))?;
            let path = config.chart_path();
            crate::plot::render_chart(&path, &residuals, &model, &fit.result, style)?;
            info!("wrote chart to {}", path.display());
            Some(path)
        }
        None => None,
    };

    Ok(RunOutput {
        table,
        points,
        model,
        fit,
        residuals,
        chart_path,
    })
}
