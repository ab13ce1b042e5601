//! Synthetic measurement tables in the fixed 37-column input layout.
//!
//! Useful for demos and for exercising the full pipeline without real data.
//! Generation is seeded, so the same settings always produce the same file.

use std::path::Path;

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::error::{AppError, FitError};
use crate::io::expand::{Field, POINTS_PER_ROW, SCHEMA_COLUMNS, column};
use crate::models::{CosinePower, CurveModel};

/// Settings for a synthetic table.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSpec {
    pub rows: usize,
    pub seed: u64,
    /// True `(a, b, n)`.
    pub params: [f64; 3],
    /// Standard deviation of the Gaussian noise added to y.
    pub noise: f64,
    /// Symmetric x uncertainty written to both x error blocks.
    pub x_err: f64,
    pub x_range: (f64, f64),
}

impl Default for SampleSpec {
    fn default() -> Self {
        Self {
            rows: 20,
            seed: 42,
            params: [60.0, 80.0, 1.5],
            noise: 2.0,
            x_err: 0.5,
            x_range: (5.0, 90.0),
        }
    }
}

/// Generate table rows (each `SCHEMA_COLUMNS` wide).
///
/// Per point: x uniform in `x_range`, y = f(x) + N(0, noise), the noiseless
/// value in the simulated block, and asymmetric y errors scattered around
/// `noise` (upper side wider than lower).
pub fn generate_rows(spec: &SampleSpec) -> Result<Vec<Vec<f64>>, AppError> {
    if spec.rows == 0 {
        return Err(AppError::new(2, "Row count must be > 0."));
    }
    if !(spec.noise.is_finite() && spec.noise >= 0.0 && spec.x_err.is_finite() && spec.x_err >= 0.0) {
        return Err(AppError::new(2, "Noise and x error must be finite and >= 0."));
    }
    let (x0, x1) = spec.x_range;
    if !(x0.is_finite() && x1.is_finite() && x1 > x0) {
        return Err(AppError::new(2, "Invalid x range for sample generation."));
    }

    let model = CosinePower::default();
    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| AppError::new(4, format!("Noise distribution error: {e}")))?;

    let mut rows = Vec::with_capacity(spec.rows);
    for i in 0..spec.rows {
        let mut row = vec![0.0; SCHEMA_COLUMNS];
        row[0] = i as f64;

        for slot in 0..POINTS_PER_ROW {
            let x = rng.gen_range(x0..=x1);
            let truth = model.eval(x, &spec.params);
            let y = truth + spec.noise * normal.sample(&mut rng);
            let err_high = spec.noise * rng.gen_range(1.0..=1.5);
            let err_low = spec.noise * rng.gen_range(0.5..=1.0);

            row[column(Field::Y, slot)] = y;
            row[column(Field::X, slot)] = x;
            row[column(Field::SimulatedY, slot)] = truth;
            row[column(Field::YErrHigh, slot)] = err_high;
            row[column(Field::YErrLow, slot)] = err_low;
            row[column(Field::XErrHigh, slot)] = spec.x_err;
            row[column(Field::XErrLow, slot)] = spec.x_err;
        }
        rows.push(row);
    }

    Ok(rows)
}

/// Write rows as headerless comma-separated text.
pub fn write_table(path: &Path, rows: &[Vec<f64>]) -> Result<(), FitError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;
    for row in rows {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer
        .flush()
        .map_err(|e| FitError::io("write table", path, e))?;
    Ok(())
}
