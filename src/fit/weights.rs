//! Effective per-point uncertainty for asymmetric errors.
//!
//! For a point `(x, y)` and the current curve value `f = f(x)`:
//!
//! - the y error on the side of the curve is used: `y_err_high` when the curve
//!   lies above the point, `y_err_low` otherwise
//! - the x error is propagated through the slope `f'(x)`; the side is the one
//!   the point would have to move along to reach the curve
//!
//! ```text
//! σ² = σy² + (f'(x) · σx)²
//! ```
//!
//! A side with zero error falls back to the opposite side.

use crate::domain::Point;

fn pick(primary: f64, fallback: f64) -> f64 {
    if primary > 0.0 { primary } else { fallback }
}

/// Effective σ for `point` given the curve value `f` and slope at `point.x`.
///
/// Returns `0.0` only when the point has no usable error for this curve.
pub fn effective_sigma(point: &Point, f: f64, slope: f64) -> f64 {
    let above = f > point.y;
    let sy = if above {
        pick(point.y_err_high.abs(), point.y_err_low.abs())
    } else {
        pick(point.y_err_low.abs(), point.y_err_high.abs())
    };

    // Horizontal shift that would move the curve onto the point: (y - f) / slope.
    let slope = if slope.is_finite() { slope } else { 0.0 };
    let shift_left = (point.y - f) * slope < 0.0;
    let sx = if shift_left {
        pick(point.x_err_low.abs(), point.x_err_high.abs())
    } else {
        pick(point.x_err_high.abs(), point.x_err_low.abs())
    };

    let sx_y = slope * sx;
    (sy * sy + sx_y * sx_y).sqrt()
}
