//! Export per-point results to CSV.
//!
//! The export is meant to be easy to consume in spreadsheets or downstream scripts.

use std::path::Path;

use crate::domain::PointResidual;
use crate::error::FitError;

/// Write per-point residuals to a CSV file.
pub fn write_residuals_csv(path: &Path, residuals: &[PointResidual]) -> Result<(), FitError> {
    let mut writer = csv::Writer::from_path(path)?;

    writer.write_record([
        "line", "slot", "x", "y", "x_err_low", "x_err_high", "y_err_low", "y_err_high", "y_fit",
        "residual", "sigma", "pull", "used",
    ])?;

    for r in residuals {
        let p = &r.point;
        writer.write_record([
            p.line.to_string(),
            p.slot.to_string(),
            p.x.to_string(),
            p.y.to_string(),
            p.x_err_low.to_string(),
            p.x_err_high.to_string(),
            p.y_err_low.to_string(),
            p.y_err_high.to_string(),
            format!("{:.10}", r.y_fit),
            format!("{:.10}", r.residual),
            opt_num(r.sigma),
            opt_num(r.pull()),
            r.used.to_string(),
        ])?;
    }

    writer
        .flush()
        .map_err(|e| FitError::io("write residual CSV", path, e))?;
    Ok(())
}

fn opt_num(v: f64) -> String {
    if v.is_finite() { format!("{v:.10}") } else { String::new() }
}
