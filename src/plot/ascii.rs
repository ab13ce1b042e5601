//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements:
//! - fitted points: `o`
//! - points left out of the fit (but with y > 0): `x`
//! - fitted curve: `-`

use crate::domain::{FitResult, PointResidual};
use crate::io::fit_file::build_grid;
use crate::models::CurveModel;

/// Render a plot for an in-memory fit result over the given x/y window.
pub fn render_ascii_plot(
    residuals: &[PointResidual],
    model: &dyn CurveModel,
    fit: &FitResult,
    x_range: (f64, f64),
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);
    let (x_min, x_max) = x_range;

    let grid_curve = build_grid(model, fit, width);
    let curve: Vec<(f64, f64)> = grid_curve.x.into_iter().zip(grid_curve.y).collect();

    let (y_min, y_max) = y_range(residuals, &curve).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = pad_range(y_min, y_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];

    // Draw curve first (so points can overlay).
    for &(x, y) in &curve {
        if !(x.is_finite() && y.is_finite()) || x < x_min || x > x_max {
            continue;
        }
        let cx = map_x(x, x_min, x_max, width);
        let cy = map_y(y, y_min, y_max, height);
        grid[cy][cx] = '-';
    }

    for r in residuals.iter().filter(|r| r.point.y > 0.0) {
        let p = &r.point;
        if !(p.x.is_finite() && p.y.is_finite()) || p.x < x_min || p.x > x_max {
            continue;
        }
        let cx = map_x(p.x, x_min, x_max, width);
        let cy = map_y(p.y, y_min, y_max, height);
        grid[cy][cx] = if r.used { 'o' } else { 'x' };
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: x=[{x_min:.1}, {x_max:.1}] | y=[{y_min:.2}, {y_max:.2}]\n"
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

fn y_range(residuals: &[PointResidual], curve: &[(f64, f64)]) -> Option<(f64, f64)> {
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for r in residuals.iter().filter(|r| r.point.y > 0.0 && r.point.y.is_finite()) {
        min_y = min_y.min(r.point.y);
        max_y = max_y.max(r.point.y);
    }
    for &(_, y) in curve.iter().filter(|(_, y)| y.is_finite()) {
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }

    if min_y.is_finite() && max_y.is_finite() && max_y > min_y {
        Some((min_y, max_y))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

fn map_x(x: f64, x_min: f64, x_max: f64, width: usize) -> usize {
    let u = ((x - x_min) / (x_max - x_min)).clamp(0.0, 1.0);
    (u * (width as f64 - 1.0)).round() as usize
}

fn map_y(y: f64, y_min: f64, y_max: f64, height: usize) -> usize {
    let v = ((y - y_min) / (y_max - y_min)).clamp(0.0, 1.0);
    // Row 0 is the top of the plot.
    ((1.0 - v) * (height as f64 - 1.0)).round() as usize
}
