//! Read/write fit JSON files.
//!
//! A fit file is the portable record of a run:
//! - model identity and formula
//! - the fit result (parameters, errors, covariance, chi2, ndf, domain)
//! - a sampled curve grid over the fit domain for quick re-plotting
//!
//! The schema is defined by `domain::FitFile`.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use crate::domain::{CurveGrid, FitFile, FitResult};
use crate::error::FitError;
use crate::models::CurveModel;

const GRID_POINTS: usize = 101;

/// Build the serializable record for a fit.
pub fn fit_file(model: &dyn CurveModel, fit: &FitResult, input: &Path) -> FitFile {
    FitFile {
        tool: "asymfit".to_string(),
        model: model.name().to_string(),
        formula: model.formula().to_string(),
        input: input.display().to_string(),
        result: fit.clone(),
        grid: build_grid(model, fit, GRID_POINTS),
    }
}

/// Write a fit JSON file.
pub fn write_fit_json(path: &Path, file: &FitFile) -> Result<(), FitError> {
    let out = File::create(path).map_err(|e| FitError::io("create fit JSON", path, e))?;
    serde_json::to_writer_pretty(BufWriter::new(out), file)
        .map_err(|e| FitError::io("write fit JSON", path, e.into()))?;
    Ok(())
}

/// Read a fit JSON file.
pub fn read_fit_json(path: &Path) -> Result<FitFile, FitError> {
    let file = File::open(path).map_err(|e| FitError::io("open fit JSON", path, e))?;
    serde_json::from_reader(BufReader::new(file))
        .map_err(|e| FitError::io("parse fit JSON", path, e.into()))
}

/// Sample the fitted curve on `n` evenly spaced points across the fit domain.
pub fn build_grid(model: &dyn CurveModel, fit: &FitResult, n: usize) -> CurveGrid {
    let n = n.max(2);
    let params = fit.values();
    let (x0, x1) = (fit.domain.min, fit.domain.max);

    let mut x = Vec::with_capacity(n);
    let mut y = Vec::with_capacity(n);
    for i in 0..n {
        let u = i as f64 / (n as f64 - 1.0);
        let xi = x0 + u * (x1 - x0);
        x.push(xi);
        y.push(model.eval(xi, &params));
    }

    CurveGrid { x, y }
}
